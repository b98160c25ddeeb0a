use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use uuid::Uuid;

use crate::domain::{Client, ClientId, Operation, current_balance, latest_operation};

use super::{ClientRepository, DuplicateClientName, OperationRepository, check_append};

#[derive(Debug, Default)]
struct State {
    clients: Vec<Client>,
    /// Insertion order doubles as the tie-breaker for equal dates
    operations: Vec<Operation>,
}

/// Process-local repository. Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("In-memory repository lock poisoned"))
    }

    fn latest_for(state: &State, client_id: ClientId) -> Option<Operation> {
        // Newest inserts first, so the first maximum found is also the last appended
        let operations: Vec<Operation> = state
            .operations
            .iter()
            .rev()
            .filter(|operation| operation.client_id == client_id)
            .cloned()
            .collect();
        latest_operation(&operations).cloned()
    }
}

impl ClientRepository for InMemoryRepository {
    async fn exists_by_id(&self, client_id: ClientId) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.clients.iter().any(|client| client.id == client_id))
    }

    async fn save_client(&self, client: &Client) -> Result<()> {
        let mut state = self.lock()?;
        if state.clients.iter().any(|c| c.name == client.name) {
            return Err(DuplicateClientName(client.name.clone()).into());
        }
        state.clients.push(client.clone());
        Ok(())
    }

    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>> {
        let state = self.lock()?;
        Ok(state.clients.iter().find(|c| c.name == name).cloned())
    }
}

impl OperationRepository for InMemoryRepository {
    async fn find_latest_operation(&self, client_id: ClientId) -> Result<Option<Operation>> {
        let state = self.lock()?;
        Ok(Self::latest_for(&state, client_id))
    }

    async fn find_all_by_client_id(&self, client_id: ClientId) -> Result<Vec<Operation>> {
        let state = self.lock()?;
        Ok(state
            .operations
            .iter()
            .filter(|operation| operation.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn save(&self, operation: Operation) -> Result<Operation> {
        let mut state = self.lock()?;
        let latest = Self::latest_for(&state, operation.client_id);
        check_append(&current_balance(latest.as_ref()), &operation)?;

        let saved = operation.with_id(Uuid::new_v4());
        state.operations.push(saved.clone());
        Ok(saved)
    }
}
