use sea_orm::{DbErr, SqlErr};

/// Classification helpers for database errors.
pub trait DbErrExt {
    /// True when the statement was rejected by a unique or primary-key constraint.
    fn is_unique_violation(&self) -> bool;
}

impl DbErrExt for DbErr {
    fn is_unique_violation(&self) -> bool {
        matches!(self.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }
}
