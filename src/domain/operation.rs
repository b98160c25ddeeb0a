use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, ClientId};

pub type OperationId = Uuid;

/// Label stored on every withdrawal.
pub const WITHDRAWAL_LABEL: &str = "withdrawal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Deposit,
    Withdrawal,
}

impl OperationType {
    /// Name shown on statements and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSIT",
            OperationType::Withdrawal => "WITHDRAWAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEPOSIT" => Some(OperationType::Deposit),
            "WITHDRAWAL" => Some(OperationType::Withdrawal),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One deposit or withdrawal on a client's ledger.
/// Operations are append-only: once saved they are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Assigned by the repository on save
    pub id: Option<OperationId>,
    pub client_id: ClientId,
    pub operation_type: OperationType,
    /// Magnitude of the movement (the type tag carries the direction)
    pub amount: Amount,
    /// Account balance right after this operation
    pub balance: Amount,
    pub date: NaiveDateTime,
    pub label: String,
}

impl Operation {
    /// Create an operation that has not been persisted yet.
    pub fn new(
        client_id: ClientId,
        operation_type: OperationType,
        amount: Amount,
        balance: Amount,
        date: NaiveDateTime,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            client_id,
            operation_type,
            amount,
            balance,
            date,
            label: label.into(),
        }
    }

    pub fn with_id(mut self, id: OperationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
