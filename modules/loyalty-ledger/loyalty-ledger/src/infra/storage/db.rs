use sea_orm::{DbErr, TransactionError};

use crate::domain::error::DomainError;

pub(super) fn db_err(e: DbErr) -> DomainError {
    DomainError::store(e.to_string())
}

pub(super) fn tx_err(e: TransactionError<DomainError>) -> DomainError {
    match e {
        TransactionError::Connection(e) => db_err(e),
        TransactionError::Transaction(e) => e,
    }
}
