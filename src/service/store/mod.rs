//! Ticket storage.
//!
//! The triage pipeline never stores anything; this is where the HTTP layer
//! keeps tickets and the triage results applied to them.

pub mod memory;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::base::types::{Priority, Res, Ticket, TriageResult};

// Traits.

/// Generic ticket store trait that backends must implement.
#[async_trait]
pub trait GenericTicketStore: Send + Sync + 'static {
    /// Store a new open ticket and return it.
    async fn create(&self, ticket: NewTicket) -> Res<TicketRecord>;

    /// All tickets, in creation order.
    async fn list(&self) -> Res<Vec<TicketRecord>>;

    /// A ticket by id, if it exists.
    async fn get(&self, id: &str) -> Res<Option<TicketRecord>>;

    /// Copy a triage result onto a ticket and return the updated record.
    ///
    /// The update is atomic per call. Two concurrent triages of the same
    /// ticket are applied in whatever order they finish.
    async fn apply_triage(&self, id: &str, result: &TriageResult) -> Res<Option<TicketRecord>>;
}

// Structs.

/// Ticket store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TicketStore {
    inner: Arc<dyn GenericTicketStore>,
}

impl Deref for TicketStore {
    type Target = dyn GenericTicketStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TicketStore {
    pub fn new(inner: Arc<dyn GenericTicketStore>) -> Self {
        Self { inner }
    }
}

// Data types.

/// Body of a ticket creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub user_id: String,
    pub title: String,
    pub description: String,
}

/// A stored ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Option<Priority>,
    pub priority_score: Option<f64>,
    pub rationale: Option<String>,
    pub assignee: Option<String>,
    pub assignee_reason: Option<String>,
    pub first_reply: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TicketRecord {
    /// A fresh, untriaged ticket with a random id.
    pub fn open(ticket: NewTicket) -> Self {
        let now = Utc::now().to_rfc3339();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: ticket.user_id,
            title: ticket.title,
            description: ticket.description,
            status: "open".to_string(),
            priority: None,
            priority_score: None,
            rationale: None,
            assignee: None,
            assignee_reason: None,
            first_reply: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The fields the triage pipeline reads.
    pub fn ticket(&self) -> Ticket {
        Ticket::new(self.title.clone(), self.description.clone())
    }

    /// Overwrite the triage fields with `result`.
    pub fn apply(&mut self, result: &TriageResult) {
        self.priority = Some(result.priority);
        self.priority_score = Some(result.priority_score);
        self.rationale = Some(result.rationale.clone());
        self.assignee = Some(result.assignee.clone());
        self.assignee_reason = Some(result.assignee_reason.clone());
        self.first_reply = Some(result.first_reply.clone());
        self.updated_at = Utc::now().to_rfc3339();
    }
}
