use std::future::Future;

use anyhow::{Result, bail};
use thiserror::Error;

use crate::domain::{Amount, Client, ClientId, Operation, OperationType};

/// Returned (inside `anyhow::Error`) by `save_client` when the name is taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Client name already taken: {0}")]
pub struct DuplicateClientName(pub String);

/// Lookup and registration of account holders.
pub trait ClientRepository {
    fn exists_by_id(&self, client_id: ClientId) -> impl Future<Output = Result<bool>> + Send;

    /// Register the client. Fails with [`DuplicateClientName`] when the name is taken.
    fn save_client(&self, client: &Client) -> impl Future<Output = Result<()>> + Send;

    fn find_client_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Client>>> + Send;
}

/// Append-only operation log, one ledger per client.
///
/// Implementations own isolation between concurrent appends for the same client:
/// the service reads the latest balance and then saves, with nothing in between.
pub trait OperationRepository {
    /// Most recent operation by date (latest insert wins on equal dates).
    fn find_latest_operation(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<Option<Operation>>> + Send;

    /// Every operation of the client, in no particular order.
    fn find_all_by_client_id(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<Vec<Operation>>> + Send;

    /// Append the operation and return it with its assigned identity.
    fn save(&self, operation: Operation) -> impl Future<Output = Result<Operation>> + Send;
}

/// Balance the ledger must show before `operation` for the append to be consistent.
pub fn expected_previous_balance(operation: &Operation) -> Result<Amount> {
    let previous = match operation.operation_type {
        OperationType::Deposit => operation.balance.subtract(&operation.amount)?,
        OperationType::Withdrawal => operation.balance.add(&operation.amount)?,
    };
    Ok(previous)
}

/// Optimistic append check: the operation must extend the ledger from `previous`.
/// A mismatch means another write landed between the balance read and this append.
pub fn check_append(previous: &Amount, operation: &Operation) -> Result<()> {
    let expected = expected_previous_balance(operation)?;
    if &expected != previous {
        bail!(
            "Ledger of client {} changed concurrently: expected balance {}, found {}",
            operation.client_id,
            expected,
            previous
        );
    }
    Ok(())
}
