//! In-memory ticket store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::base::types::{Res, TriageResult};

use super::{GenericTicketStore, NewTicket, TicketRecord, TicketStore};

impl TicketStore {
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(MemoryTicketStore::default()),
        }
    }
}

/// Ticket store that lives for the process lifetime.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<Vec<TicketRecord>>,
}

#[async_trait]
impl GenericTicketStore for MemoryTicketStore {
    #[instrument(name = "MemoryTicketStore::create", skip_all)]
    async fn create(&self, ticket: NewTicket) -> Res<TicketRecord> {
        let record = TicketRecord::open(ticket);
        debug!("Created ticket {}.", record.id);

        self.tickets.write().await.push(record.clone());

        Ok(record)
    }

    async fn list(&self) -> Res<Vec<TicketRecord>> {
        Ok(self.tickets.read().await.clone())
    }

    async fn get(&self, id: &str) -> Res<Option<TicketRecord>> {
        Ok(self.tickets.read().await.iter().find(|t| t.id == id).cloned())
    }

    #[instrument(name = "MemoryTicketStore::apply_triage", skip(self, result))]
    async fn apply_triage(&self, id: &str, result: &TriageResult) -> Res<Option<TicketRecord>> {
        let mut tickets = self.tickets.write().await;

        Ok(tickets.iter_mut().find(|t| t.id == id).map(|record| {
            record.apply(result);
            record.clone()
        }))
    }
}
