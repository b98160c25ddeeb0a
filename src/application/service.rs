use chrono::{Duration, NaiveDateTime};

use crate::domain::{
    Amount, Client, ClientId, Clock, Operation, OperationType, Statement, SystemClock,
    WITHDRAWAL_LABEL, current_balance, sort_most_recent_first,
};
use crate::render::StatementWriter;
use crate::storage::{ClientRepository, DuplicateClientName, OperationRepository};

use super::BankError;

/// Application service for a client's account: deposits, withdrawals and statements.
/// This is the primary interface for any client (CLI, tests, embedding).
///
/// Holds no ledger state of its own. Every call checks that the client exists, then
/// reads the log, then (if everything validated) appends to it.
pub struct BankService<R, W, K = SystemClock> {
    repo: R,
    writer: W,
    clock: K,
}

impl<R, W, K> BankService<R, W, K>
where
    R: ClientRepository + OperationRepository,
    W: StatementWriter,
    K: Clock,
{
    pub fn new(repo: R, writer: W, clock: K) -> Self {
        Self {
            repo,
            writer,
            clock,
        }
    }

    // ========================
    // Client operations
    // ========================

    /// Register a new client with an empty ledger.
    pub async fn open_account(&self, name: impl Into<String>) -> Result<Client, BankError> {
        let name = name.into();
        if self.repo.find_client_by_name(&name).await?.is_some() {
            return Err(BankError::ClientAlreadyExists(name));
        }

        let client = Client::new(name, self.clock.now());
        // A concurrent registration can still win the race past the lookup above
        self.repo
            .save_client(&client)
            .await
            .map_err(|err| match err.downcast::<DuplicateClientName>() {
                Ok(DuplicateClientName(name)) => BankError::ClientAlreadyExists(name),
                Err(err) => BankError::Storage(err),
            })?;
        Ok(client)
    }

    /// Get a client by name.
    pub async fn find_client(&self, name: &str) -> Result<Client, BankError> {
        self.repo
            .find_client_by_name(name)
            .await?
            .ok_or_else(|| BankError::ClientNotFound(name.to_string()))
    }

    async fn ensure_client_exists(&self, client_id: ClientId) -> Result<(), BankError> {
        if !self.repo.exists_by_id(client_id).await? {
            return Err(BankError::ClientNotFound(client_id.to_string()));
        }
        Ok(())
    }

    async fn read_balance(&self, client_id: ClientId) -> Result<Amount, BankError> {
        let latest = self.repo.find_latest_operation(client_id).await?;
        Ok(current_balance(latest.as_ref()))
    }

    /// Date for the next operation. When the clock reads earlier than the latest
    /// operation, the new one is placed just after it so it becomes the latest.
    fn next_date(&self, latest: Option<&Operation>) -> NaiveDateTime {
        let now = self.clock.now();
        match latest {
            Some(latest) if latest.date > now => latest.date + Duration::milliseconds(1),
            _ => now,
        }
    }

    /// Current time as seen by this service.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ========================
    // Ledger operations
    // ========================

    /// Credit the account and return the saved operation.
    pub async fn deposit(
        &self,
        client_id: ClientId,
        amount: Amount,
        label: impl Into<String>,
    ) -> Result<Operation, BankError> {
        self.ensure_client_exists(client_id).await?;

        let latest = self.repo.find_latest_operation(client_id).await?;
        let new_balance = current_balance(latest.as_ref()).add(&amount)?;

        let operation = Operation::new(
            client_id,
            OperationType::Deposit,
            amount,
            new_balance,
            self.next_date(latest.as_ref()),
            label,
        );
        Ok(self.repo.save(operation).await?)
    }

    /// Debit the account and return the saved operation.
    /// Nothing is saved when the amount exceeds the current balance.
    pub async fn withdraw(
        &self,
        client_id: ClientId,
        amount: Amount,
    ) -> Result<Operation, BankError> {
        self.ensure_client_exists(client_id).await?;

        let latest = self.repo.find_latest_operation(client_id).await?;
        let balance = current_balance(latest.as_ref());
        let new_balance = match balance.subtract(&amount) {
            Ok(new_balance) => new_balance,
            Err(_) => {
                return Err(BankError::InsufficientFunds {
                    client_id,
                    balance,
                    requested: amount,
                });
            }
        };

        let operation = Operation::new(
            client_id,
            OperationType::Withdrawal,
            amount,
            new_balance,
            self.next_date(latest.as_ref()),
            WITHDRAWAL_LABEL,
        );
        Ok(self.repo.save(operation).await?)
    }

    /// Current balance, derived from the latest operation.
    pub async fn balance(&self, client_id: ClientId) -> Result<Amount, BankError> {
        self.ensure_client_exists(client_id).await?;
        self.read_balance(client_id).await
    }

    /// Every operation of the client, newest first.
    pub async fn history(&self, client_id: ClientId) -> Result<Vec<Operation>, BankError> {
        self.ensure_client_exists(client_id).await?;

        let mut operations = self.repo.find_all_by_client_id(client_id).await?;
        sort_most_recent_first(&mut operations);
        Ok(operations)
    }

    // ========================
    // Statements
    // ========================

    /// Build a statement of the whole ledger and hand it to the statement writer.
    pub async fn print_account_statement(&self, client_id: ClientId) -> Result<(), BankError> {
        self.ensure_client_exists(client_id).await?;

        let operations = self.repo.find_all_by_client_id(client_id).await?;
        let statement = Statement::new(client_id, operations, self.clock.now());

        self.writer.write(&statement)?;
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}
