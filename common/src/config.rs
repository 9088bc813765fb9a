//! Configuration loading.
//!
//! Every service reads its configuration from environment variables, with an
//! optional `.env` file in the working directory as a fallback source.

use std::env;
use std::ops::RangeInclusive;

use crate::models::environment::Environment;

/// Default Redshift port used when an environment does not override it.
pub const DEFAULT_WAREHOUSE_PORT: u16 = 5439;

/// Environments available when `WAREHOUSE_ENVIRONMENTS` is not set, with
/// their default database names.
const DEFAULT_ENVIRONMENTS: [(&str, &str); 3] = [
    ("Migration", "rsdev01"),
    ("Modernization", "rs_edw_db"),
    ("IBD", "rs_edw_prd"),
];

/// Server configuration shared by all services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name, used in logs and response metadata.
    pub service_name: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Timeout for opening a warehouse connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Earliest selectable fiscal year.
    pub fiscal_year_min: i32,
    /// Latest selectable fiscal year.
    pub fiscal_year_max: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "warehouse-fetcher".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            connect_timeout_secs: 10,
            fiscal_year_min: 2020,
            fiscal_year_max: 2025,
        }
    }
}

impl AppConfig {
    /// Loads configuration for the named service.
    ///
    /// `SERVER_PORT` is left to the caller since each service has its own
    /// default port.
    pub fn load_with_service(service_name: &str) -> Self {
        let defaults = Self::default();
        Self {
            service_name: service_name.to_string(),
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: defaults.port,
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            fiscal_year_min: env_parse("FISCAL_YEAR_MIN").unwrap_or(defaults.fiscal_year_min),
            fiscal_year_max: env_parse("FISCAL_YEAR_MAX").unwrap_or(defaults.fiscal_year_max),
        }
    }

    /// Fiscal years the form offers.
    pub fn fiscal_years(&self) -> RangeInclusive<i32> {
        self.fiscal_year_min..=self.fiscal_year_max
    }
}

/// URLs of sibling services.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    /// Base URL of the SQL-fix advisor service.
    pub ai_service: String,
}

impl ServiceUrls {
    /// Loads service URLs from `AI_SERVICE_URL`.
    pub fn load() -> Self {
        Self {
            ai_service: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8083".to_string()),
        }
    }
}

/// Chat-completion provider settings for the advisor.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` disables outbound calls.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl LlmConfig {
    /// Loads `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL`.
    pub fn load() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
        }
    }
}

/// Fixed set of named warehouse environments.
///
/// Loaded once at startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRegistry {
    environments: Vec<Environment>,
}

impl EnvironmentRegistry {
    /// Creates a registry from already-built descriptors.
    pub fn new(environments: Vec<Environment>) -> Self {
        Self { environments }
    }

    /// Loads environments from `WAREHOUSE_ENVIRONMENTS` and the per-environment
    /// `WAREHOUSE_<NAME>_*` variables.
    pub fn load() -> Self {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Loads environments through an arbitrary variable lookup.
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let names: Vec<String> = match lookup("WAREHOUSE_ENVIRONMENTS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_ENVIRONMENTS
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        };

        let environments = names
            .into_iter()
            .map(|name| {
                let prefix = format!("WAREHOUSE_{}", env_key(&name));
                let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));
                let default_database = DEFAULT_ENVIRONMENTS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, db)| db.to_string())
                    .unwrap_or_default();

                Environment {
                    host: var("HOST").unwrap_or_default(),
                    database: var("DATABASE").unwrap_or(default_database),
                    user: var("USER").unwrap_or_default(),
                    password: var("PASSWORD").unwrap_or_default(),
                    port: var("PORT")
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(DEFAULT_WAREHOUSE_PORT),
                    name,
                }
            })
            .collect();

        Self { environments }
    }

    /// Looks up an environment by its exact name.
    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// All environments in declaration order.
    pub fn all(&self) -> &[Environment] {
        &self.environments
    }

    /// Environment names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.name.clone()).collect()
    }
}

/// Load .env file from the working directory (best-effort, no error if missing).
pub fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if let Ok(content) = std::fs::read_to_string(env_path) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');
                // Only set if not already set by the environment
                if env::var(key).is_err() {
                    env::set_var(key, value);
                }
            }
        }
    }
}

/// Parses an environment variable, ignoring missing or malformed values.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Turns an environment name into the upper-case key fragment used in
/// variable names ("Modernization" -> "MODERNIZATION", "eu-west" -> "EU_WEST").
fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_environments() {
        let registry = EnvironmentRegistry::load_from(lookup(&[]));
        assert_eq!(registry.names(), vec!["Migration", "Modernization", "IBD"]);

        let ibd = registry.get("IBD").unwrap();
        assert_eq!(ibd.database, "rs_edw_prd");
        assert_eq!(ibd.port, DEFAULT_WAREHOUSE_PORT);
    }

    #[test]
    fn test_environment_overrides() {
        let registry = EnvironmentRegistry::load_from(lookup(&[
            ("WAREHOUSE_ENVIRONMENTS", "Migration, eu-west"),
            ("WAREHOUSE_MIGRATION_HOST", "dev.example.com"),
            ("WAREHOUSE_MIGRATION_USER", "analyst"),
            ("WAREHOUSE_EU_WEST_DATABASE", "edw"),
            ("WAREHOUSE_EU_WEST_PORT", "5440"),
        ]));

        assert_eq!(registry.names(), vec!["Migration", "eu-west"]);
        let migration = registry.get("Migration").unwrap();
        assert_eq!(migration.host, "dev.example.com");
        assert_eq!(migration.user, "analyst");
        assert_eq!(migration.database, "rsdev01");

        let eu = registry.get("eu-west").unwrap();
        assert_eq!(eu.database, "edw");
        assert_eq!(eu.port, 5440);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = EnvironmentRegistry::load_from(lookup(&[]));
        assert!(registry.get("ibd").is_none());
    }

    #[test]
    fn test_fiscal_years_default_range() {
        let config = AppConfig::default();
        let years: Vec<i32> = config.fiscal_years().collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024, 2025]);
    }
}
