//! Core components, types, and utilities for ticket-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The specialist roster.
//! - Common types, result handling and the typed triage errors.

pub mod config;
pub mod error;
pub mod roster;
pub mod types;
