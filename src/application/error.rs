use thiserror::Error;

use crate::domain::{Amount, ClientId, NegativeAmountError};

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Client already exists: {0}")]
    ClientAlreadyExists(String),

    #[error("Insufficient funds for client {client_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        client_id: ClientId,
        balance: Amount,
        requested: Amount,
    },

    #[error(transparent)]
    NegativeAmount(#[from] NegativeAmountError),

    #[error("Failed to write statement: {0}")]
    Output(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Storage(#[from] anyhow::Error),
}
