use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::BankService;
use crate::domain::{Amount, Client, Clock, Operation};
use crate::render::StatementWriter;
use crate::storage::{ClientRepository, OperationRepository};

/// Full account snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub version: String,
    pub exported_at: NaiveDateTime,
    pub client: Client,
    pub balance: Amount,
    pub operations: Vec<Operation>,
}

/// Exporter for converting a client's ledger to CSV or JSON
pub struct Exporter<'a, R, W, K> {
    service: &'a BankService<R, W, K>,
}

impl<'a, R, W, K> Exporter<'a, R, W, K>
where
    R: ClientRepository + OperationRepository,
    W: StatementWriter,
    K: Clock,
{
    pub fn new(service: &'a BankService<R, W, K>) -> Self {
        Self { service }
    }

    /// Export the client's operations to CSV, newest first. Amounts keep full precision.
    pub async fn export_operations_csv<O: Write>(&self, client: &Client, writer: O) -> Result<usize> {
        let operations = self.service.history(client.id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id", "client", "type", "amount", "balance", "date", "label",
        ])?;

        let mut count = 0;
        for operation in &operations {
            csv_writer.write_record([
                operation.id.map(|id| id.to_string()).unwrap_or_default(),
                client.name.clone(),
                operation.operation_type.to_string(),
                operation.amount.to_string(),
                operation.balance.to_string(),
                operation.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                operation.label.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the client, its balance and its operations as a JSON snapshot
    pub async fn export_account_json<O: Write>(
        &self,
        client: &Client,
        mut writer: O,
    ) -> Result<AccountSnapshot> {
        let balance = self.service.balance(client.id).await?;
        let operations = self.service.history(client.id).await?;

        let snapshot = AccountSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: self.service.now(),
            client: client.clone(),
            balance,
            operations,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
