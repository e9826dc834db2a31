//! Request handling for ticket-triage.
//!
//! This module provides the HTTP surface of the helpdesk:
//! - Creating, listing and looking up tickets
//! - Triaging tickets and persisting the result onto the ticket
//! - Mapping triage failures onto HTTP errors

pub mod error;
pub mod http;
