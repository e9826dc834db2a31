//! The specialist roster tickets are routed to.

use std::path::Path;

use anyhow::Context;
use tracing::{info, instrument};

use super::types::{Employer, Res};

/// The built-in roster used when no roster file is configured.
pub fn default_roster() -> Vec<Employer> {
    vec![
        Employer::new("emp1", "Alice", &["Python", "Machine Learning", "Flask"]),
        Employer::new("emp2", "Bob", &["Java", "Spring Boot", "Microservices"]),
        Employer::new("emp3", "Charlie", &["JavaScript", "React", "Node.js"]),
        Employer::new("emp4", "Diana", &["SQL", "PostgreSQL", "Data Modeling"]),
        Employer::new("emp5", "Ethan", &["AWS", "Docker", "Kubernetes"]),
        Employer::new("emp6", "Fiona", &["TensorFlow", "Deep Learning", "NLP"]),
        Employer::new("emp7", "George", &["C++", "Linux", "Embedded Systems"]),
        Employer::new("emp8", "Hannah", &["Cybersecurity", "Networking", "Firewalls"]),
        Employer::new("emp9", "Ian", &["Data Engineering", "Airflow", "ETL"]),
        Employer::new("emp10", "Jane", &["UI/UX", "Figma", "Frontend Design"]),
    ]
}

/// Load the roster from `path`, or fall back to [`default_roster`].
///
/// The file is a JSON array of `{ "id", "name", "skills" }` objects.
#[instrument(skip_all)]
pub fn load_roster(path: Option<&Path>) -> Res<Vec<Employer>> {
    let roster = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read roster file `{}`", path.display()))?;
            serde_json::from_str::<Vec<Employer>>(&raw).with_context(|| format!("Failed to parse roster file `{}`", path.display()))?
        }
        None => default_roster(),
    };

    validate_roster(&roster)?;

    info!("Loaded roster with {} specialists.", roster.len());

    Ok(roster)
}

/// Reject rosters that cannot be triaged against.
pub fn validate_roster(roster: &[Employer]) -> Res<()> {
    if roster.is_empty() {
        return Err(anyhow::anyhow!("The roster must contain at least one specialist."));
    }

    for employer in roster {
        if employer.id.trim().is_empty() {
            return Err(anyhow::anyhow!("Every specialist needs a non-empty id."));
        }

        if employer.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Specialist `{}` needs a non-empty name.", employer.id));
        }

        if employer.skills.is_empty() {
            return Err(anyhow::anyhow!("Specialist `{}` needs at least one skill.", employer.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_is_valid() {
        let roster = default_roster();

        assert_eq!(roster.len(), 10);
        assert_eq!(roster[0].id, "emp1");
        assert_eq!(roster[0].skill_text(), "Python, Machine Learning, Flask");
        assert!(validate_roster(&roster).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_inputs() {
        assert!(validate_roster(&[]).is_err());
        assert!(validate_roster(&[Employer::new("emp1", "Alice", &[])]).is_err());
        assert!(validate_roster(&[Employer::new("", "Alice", &["Rust"])]).is_err());
        assert!(validate_roster(&[Employer::new("emp1", " ", &["Rust"])]).is_err());
    }

    #[test]
    fn test_load_roster_from_file() {
        let path = std::env::temp_dir().join(format!("ticket-triage-roster-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"id": "ops", "name": "Olga", "skills": ["Terraform", "Nomad"]}]"#).unwrap();

        let roster = load_roster(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(roster, vec![Employer::new("ops", "Olga", &["Terraform", "Nomad"])]);
    }

    #[test]
    fn test_load_roster_without_path_uses_default() {
        assert_eq!(load_roster(None).unwrap(), default_roster());
    }
}
