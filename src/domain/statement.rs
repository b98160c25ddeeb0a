use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ClientId, Operation};

/// Point-in-time view of a client's ledger, built on demand for printing.
/// Operations keep the order the repository returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub account_id: ClientId,
    pub operations: Vec<Operation>,
    pub date: NaiveDateTime,
}

impl Statement {
    pub fn new(account_id: ClientId, operations: Vec<Operation>, date: NaiveDateTime) -> Self {
        Self {
            account_id,
            operations,
            date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
