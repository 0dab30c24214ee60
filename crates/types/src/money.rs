//! Monetary values in integer minor-currency units.
//!
//! All prices in the system are stored and transported as whole centavos.
//! Display code divides by 100 and formats with pt-BR grouping ('.') and
//! decimal (',') separators, always with exactly two decimal places.

/// Errors that can occur when parsing monetary input.
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    /// The input did not contain a parseable amount
    #[error("invalid monetary amount: {0:?}")]
    Invalid(String),
}

/// An amount of money in centavos (hundredths of a real).
///
/// The inner value is signed so that differences (e.g. month-over-month
/// deltas) can be represented; persisted prices are always non-negative.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Centavos(pub i64);

impl Centavos {
    pub const ZERO: Centavos = Centavos(0);

    /// Returns the raw value in centavos.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Formats the amount without a currency symbol, e.g. `1.234,56`.
    pub fn format_plain(self) -> String {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let reais = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, ch) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}{},{:02}", if negative { "-" } else { "" }, grouped, cents)
    }

    /// Formats the amount as a pt-BR currency string, e.g. `R$ 1.234,56`.
    pub fn format_brl(self) -> String {
        format!("R$ {}", self.format_plain())
    }

    /// Parses user input in pt-BR notation back into centavos.
    ///
    /// Accepts an optional `R$` prefix, '.' thousands separators and a ','
    /// decimal separator with up to two decimal digits: `"R$ 1.234,5"` parses
    /// to `Centavos(123_450)`.
    pub fn parse_brl(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();

        if cleaned.is_empty() || cleaned.matches(',').count() > 1 {
            return Err(MoneyError::Invalid(input.to_owned()));
        }

        let (whole, frac) = match cleaned.split_once(',') {
            Some((w, f)) => (w.replace('.', ""), f.to_owned()),
            None => (cleaned.replace('.', ""), String::new()),
        };

        if frac.len() > 2 || frac.chars().any(|c| !c.is_ascii_digit()) {
            return Err(MoneyError::Invalid(input.to_owned()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyError::Invalid(input.to_owned()))?
        };

        let mut frac_value: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse()
                .map_err(|_| MoneyError::Invalid(input.to_owned()))?
        };
        if frac.len() == 1 {
            frac_value *= 10;
        }

        Ok(Centavos(whole * 100 + frac_value))
    }
}

impl std::ops::Add for Centavos {
    type Output = Centavos;

    fn add(self, rhs: Centavos) -> Centavos {
        Centavos(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Centavos {
    fn add_assign(&mut self, rhs: Centavos) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Centavos {
    fn sum<I: Iterator<Item = Centavos>>(iter: I) -> Centavos {
        iter.fold(Centavos::ZERO, |acc, c| acc + c)
    }
}

impl std::fmt::Display for Centavos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_brl())
    }
}
