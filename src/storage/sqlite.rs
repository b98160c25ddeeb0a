use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Amount, Client, ClientId, Operation, OperationType};

use super::{
    ClientRepository, DuplicateClientName, MIGRATION_001_INITIAL, OperationRepository, check_append,
};

/// Fixed-width so that lexical order in SQL matches chronological order.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

/// SQLite-backed store for clients and their operation logs.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::debug!(database_url, "connecting to database");
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        tracing::debug!("database schema is up to date");
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<Client> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Client {
            id: Uuid::parse_str(&id_str).context("Invalid client ID")?,
            name: row.get("name"),
            created_at: parse_date(&created_at_str).context("Invalid created_at timestamp")?,
        })
    }

    fn row_to_operation(row: &sqlx::sqlite::SqliteRow) -> Result<Operation> {
        let id_str: String = row.get("id");
        let client_id_str: String = row.get("client_id");
        let type_str: String = row.get("operation_type");
        let amount_str: String = row.get("amount");
        let balance_str: String = row.get("balance");
        let date_str: String = row.get("date");

        Ok(Operation {
            id: Some(Uuid::parse_str(&id_str).context("Invalid operation ID")?),
            client_id: Uuid::parse_str(&client_id_str).context("Invalid client ID")?,
            operation_type: OperationType::from_str(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid operation type: {}", type_str))?,
            amount: amount_str
                .parse()
                .with_context(|| format!("Invalid amount: {}", amount_str))?,
            balance: balance_str
                .parse()
                .with_context(|| format!("Invalid balance: {}", balance_str))?,
            date: parse_date(&date_str).context("Invalid operation date")?,
            label: row.get("label"),
        })
    }
}

fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(value, DATE_FORMAT)?)
}

impl ClientRepository for SqliteRepository {
    async fn exists_by_id(&self, client_id: ClientId) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM clients WHERE id = ?) as found")
            .bind(client_id.to_string())
            .fetch_one(&self.pool)
            .await
            .context("Failed to check client existence")?;

        Ok(row.get::<i64, _>("found") != 0)
    }

    async fn save_client(&self, client: &Client) -> Result<()> {
        let result = sqlx::query("INSERT INTO clients (id, name, created_at) VALUES (?, ?, ?)")
            .bind(client.id.to_string())
            .bind(&client.name)
            .bind(format_date(&client.created_at))
            .execute(&self.pool)
            .await;

        if let Err(sqlx::Error::Database(err)) = &result {
            if err.is_unique_violation() {
                return Err(DuplicateClientName(client.name.clone()).into());
            }
        }
        result.context("Failed to save client")?;

        tracing::debug!(client_id = %client.id, name = %client.name, "saved client");
        Ok(())
    }

    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT id, name, created_at FROM clients WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch client by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_client(&row)?)),
            None => Ok(None),
        }
    }
}

impl OperationRepository for SqliteRepository {
    async fn find_latest_operation(&self, client_id: ClientId) -> Result<Option<Operation>> {
        let row = sqlx::query(
            r#"
            SELECT id, client_id, operation_type, amount, balance, date, label
            FROM operations
            WHERE client_id = ?
            ORDER BY date DESC, sequence DESC
            LIMIT 1
            "#,
        )
        .bind(client_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch latest operation")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_operation(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all_by_client_id(&self, client_id: ClientId) -> Result<Vec<Operation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, operation_type, amount, balance, date, label
            FROM operations
            WHERE client_id = ?
            ORDER BY sequence
            "#,
        )
        .bind(client_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list operations")?;

        rows.iter().map(Self::row_to_operation).collect()
    }

    /// Append inside a transaction, refusing the write when the ledger moved
    /// since the caller read its balance.
    async fn save(&self, operation: Operation) -> Result<Operation> {
        let client_id = operation.client_id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            SELECT balance
            FROM operations
            WHERE client_id = ?
            ORDER BY date DESC, sequence DESC
            LIMIT 1
            "#,
        )
        .bind(&client_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read current balance")?;

        let previous: Amount = match row {
            Some(row) => {
                let balance_str: String = row.get("balance");
                balance_str
                    .parse()
                    .with_context(|| format!("Invalid balance: {}", balance_str))?
            }
            None => Amount::zero(),
        };
        check_append(&previous, &operation)?;

        let saved = operation.with_id(Uuid::new_v4());
        sqlx::query(
            r#"
            INSERT INTO operations (id, sequence, client_id, operation_type, amount, balance, date, label)
            VALUES (?, (SELECT COALESCE(MAX(sequence), 0) + 1 FROM operations), ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(saved.id.map(|id| id.to_string()))
        .bind(&client_id)
        .bind(saved.operation_type.as_str())
        .bind(saved.amount.to_string())
        .bind(saved.balance.to_string())
        .bind(format_date(&saved.date))
        .bind(&saved.label)
        .execute(&mut *tx)
        .await
        .context("Failed to save operation")?;

        tx.commit().await.context("Failed to commit operation")?;

        tracing::debug!(
            client_id = %saved.client_id,
            operation_type = %saved.operation_type,
            amount = %saved.amount,
            balance = %saved.balance,
            "appended operation"
        );
        Ok(saved)
    }
}
