//! The triage pipeline.
//!
//! - `index`: roster skill embeddings and nearest-specialist lookup.
//! - `priority`: zero-shot priority classification.
//! - `reply`: deterministic first-reply text.
//! - `orchestrator`: the `Triager` that composes the three.

pub mod index;
pub mod orchestrator;
pub mod priority;
pub mod reply;

pub use index::{EmbeddingIndex, EmbeddingRecord, SkillMatch};
pub use orchestrator::Triager;
pub use priority::{PRIORITY_LABELS, PriorityAssessment, PriorityClassifier};
