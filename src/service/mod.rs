//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by ticket-triage:
//! - Embedding backends (e.g., OpenAI, Hugging Face, local hashing)
//! - Zero-shot classification backends
//! - Ticket storage
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod classify;
pub mod embed;
pub mod huggingface;
pub mod store;
