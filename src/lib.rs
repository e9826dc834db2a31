//! Library root for `ticket-triage`.
//!
//! Ticket-triage is a helpdesk service that, for every incoming ticket:
//! - Infers a priority (P0–P3) with a zero-shot text classifier
//! - Routes it to the specialist whose skills are semantically closest
//! - Drafts a rationale and a first reply to the ticket author
//!
//! The triage pipeline lives in [`triage`]; models sit behind the narrow
//! embedding and classification traits in [`service`], so any backend (or a
//! test double) can be plugged in.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod triage;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the ticket-triage runtime:
/// - Loads the roster and builds the inference backends
/// - Embeds the roster into the skill index
/// - Serves the HTTP API until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting ticket-triage ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
