use crate::db::DbError;

/// Crate-wide error taxonomy.
///
/// Variants map onto the externally-visible failure classes: validation and
/// authorisation errors are rejected before any mutation, `PartialDelivery`
/// marks the one state where evidence was recorded but list statuses were
/// not advanced, and `Db` covers everything the store itself refuses.
#[derive(Debug, thiserror::Error)]
pub enum SupridentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("administrator privileges required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("nothing to deliver: target has no filled lists")]
    NothingToDeliver,

    #[error(
        "delivery partially applied: confirmation {confirmation_id} was recorded \
         but the list status update did not complete; check status before retrying"
    )]
    PartialDelivery {
        confirmation_id: String,
        #[source]
        source: DbError,
    },

    #[error("database error: {0}")]
    Db(#[from] DbError),
}

pub type SupridentResult<T> = std::result::Result<T, SupridentError>;
