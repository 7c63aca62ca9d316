use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A target role a résumé can be analyzed against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub name: String,
    pub category: String,
    pub description: String,
    pub required_skills: Vec<String>,
}

/// Read-only catalog of role requirements, loaded once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct RoleCatalog {
    roles: Vec<RoleRequirement>,
}

impl RoleCatalog {
    /// Loads the catalog from a JSON file, falling back to the built-in
    /// defaults when no path is configured or the file is missing.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) if std::path::Path::new(p).exists() => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read role catalog at '{p}'"))?;
                let roles: Vec<RoleRequirement> = serde_json::from_str(&raw)
                    .with_context(|| format!("Role catalog at '{p}' is not valid JSON"))?;
                info!("Loaded {} roles from {p}", roles.len());
                Ok(Self { roles })
            }
            _ => {
                let catalog = Self::builtin();
                info!("Using built-in role catalog ({} roles)", catalog.roles.len());
                Ok(catalog)
            }
        }
    }

    pub fn builtin() -> Self {
        let mk = |name: &str, category: &str, description: &str, skills: &[&str]| {
            RoleRequirement {
                name: name.to_string(),
                category: category.to_string(),
                description: description.to_string(),
                required_skills: skills.iter().map(|s| s.to_string()).collect(),
            }
        };

        Self {
            roles: vec![
                mk(
                    "Backend Developer",
                    "Software Development",
                    "Designs and maintains server-side applications, APIs, and data stores.",
                    &["python", "java", "sql", "rest api", "docker", "git"],
                ),
                mk(
                    "Frontend Developer",
                    "Software Development",
                    "Builds responsive, accessible user interfaces for web applications.",
                    &["javascript", "typescript", "react", "html", "css", "git"],
                ),
                mk(
                    "Full Stack Developer",
                    "Software Development",
                    "Works across the stack from database design to user interface.",
                    &["javascript", "node", "sql", "react", "rest api", "docker"],
                ),
                mk(
                    "Data Scientist",
                    "Data Science & Analytics",
                    "Extracts insight from data through statistics and machine learning.",
                    &["python", "pandas", "sql", "machine learning", "statistics"],
                ),
                mk(
                    "Data Analyst",
                    "Data Science & Analytics",
                    "Turns raw data into reports and dashboards that drive decisions.",
                    &["sql", "excel", "python", "tableau", "data visualization"],
                ),
                mk(
                    "DevOps Engineer",
                    "Cloud & Infrastructure",
                    "Automates build, deployment, and monitoring of production systems.",
                    &["linux", "docker", "kubernetes", "ci/cd", "terraform", "aws"],
                ),
                mk(
                    "Machine Learning Engineer",
                    "Data Science & Analytics",
                    "Productionizes models and builds the pipelines that feed them.",
                    &["python", "tensorflow", "pytorch", "machine learning", "docker"],
                ),
            ],
        }
    }

    pub fn all(&self) -> &[RoleRequirement] {
        &self.roles
    }

    /// Case-insensitive lookup by role name.
    pub fn get(&self, name: &str) -> Option<&RoleRequirement> {
        let wanted = name.trim().to_lowercase();
        self.roles.iter().find(|r| r.name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_nonempty() {
        assert!(!RoleCatalog::builtin().all().is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = RoleCatalog::builtin();
        let role = catalog.get("backend developer");
        assert!(role.is_some());
        assert_eq!(role.map(|r| r.name.as_str()), Some("Backend Developer"));
    }

    #[test]
    fn test_lookup_trims_whitespace() {
        let catalog = RoleCatalog::builtin();
        assert!(catalog.get("  Data Scientist ").is_some());
    }

    #[test]
    fn test_unknown_role_is_none() {
        assert!(RoleCatalog::builtin().get("Astronaut").is_none());
    }

    #[test]
    fn test_load_without_path_uses_builtin() {
        let catalog = RoleCatalog::load(None).unwrap();
        assert_eq!(catalog.all().len(), RoleCatalog::builtin().all().len());
    }

    #[test]
    fn test_every_builtin_role_has_skills() {
        for role in RoleCatalog::builtin().all() {
            assert!(
                !role.required_skills.is_empty(),
                "role {} has no skills",
                role.name
            );
        }
    }
}
