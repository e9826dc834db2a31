use std::fmt;

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A specialist that tickets can be routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    pub id: String,
    pub name: String,
    pub skills: Vec<String>,
}

impl Employer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, skills: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The text embedded for this employer's skill set.
    pub fn skill_text(&self) -> String {
        self.skills.join(", ")
    }
}

/// The parts of a ticket that triage looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub title: String,
    pub description: String,
}

impl Ticket {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Combined `"{title}: {description}"` text fed to both models.
    pub fn text(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of triaging a single ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub priority: Priority,
    pub priority_score: f64,
    pub rationale: String,
    pub assignee: String,
    pub assignee_reason: String,
    pub first_reply: String,
}
