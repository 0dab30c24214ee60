//! Validated primitive types shared across the suprident workspace.

mod money;
mod text;

pub use money::{Centavos, MoneyError};
pub use text::{NonEmptyText, TextError};
