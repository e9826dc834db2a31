//! HTTP routes of the helpdesk service.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::time::timeout;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::{
    base::types::{Employer, Ticket, TriageResult},
    service::store::{NewTicket, TicketRecord, TicketStore},
    triage::Triager,
};

use super::error::ApiError;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub triager: Triager,
    pub store: TicketStore,
    pub triage_timeout: Duration,
}

/// Response of `POST /tickets-with-triage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketWithTriage {
    pub ticket: TicketRecord,
    pub triage_result: TriageResult,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/employers", get(list_employers))
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/{id}", get(get_ticket))
        .route("/tickets/{id}/triage", post(triage_ticket))
        .route("/tickets-with-triage", post(create_and_triage_ticket))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Helpdesk Ticket System API with AI-powered triage" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_employers(State(state): State<AppState>) -> Json<Vec<Employer>> {
    Json(state.triager.index().roster().to_vec())
}

async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<TicketRecord>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn get_ticket(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<TicketRecord>, ApiError> {
    let ticket = state.store.get(&id).await?.ok_or_else(ticket_not_found)?;

    Ok(Json(ticket))
}

#[instrument(skip_all)]
async fn create_ticket(State(state): State<AppState>, Json(body): Json<NewTicket>) -> Result<Json<TicketRecord>, ApiError> {
    let ticket = state.store.create(body).await?;
    info!("Created ticket {}.", ticket.id);

    Ok(Json(ticket))
}

#[instrument(skip_all)]
async fn triage_ticket(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<TriageResult>, ApiError> {
    let ticket = state.store.get(&id).await?.ok_or_else(ticket_not_found)?;

    let result = run_triage(&state, &ticket.ticket()).await?;
    state.store.apply_triage(&id, &result).await?.ok_or_else(ticket_not_found)?;

    Ok(Json(result))
}

#[instrument(skip_all)]
async fn create_and_triage_ticket(State(state): State<AppState>, Json(body): Json<NewTicket>) -> Result<Json<TicketWithTriage>, ApiError> {
    let created = state.store.create(body).await?;
    info!("Created ticket {}.", created.id);

    let triage_result = run_triage(&state, &created.ticket()).await?;
    let ticket = state.store.apply_triage(&created.id, &triage_result).await?.ok_or_else(ticket_not_found)?;

    Ok(Json(TicketWithTriage { ticket, triage_result }))
}

/// Triage under the configured deadline; expiry is reported as retryable.
async fn run_triage(state: &AppState, ticket: &Ticket) -> Result<TriageResult, ApiError> {
    match timeout(state.triage_timeout, state.triager.triage(ticket)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ApiError::TimedOut(state.triage_timeout.as_secs())),
    }
}

fn ticket_not_found() -> ApiError {
    ApiError::NotFound("Ticket not found".to_string())
}
