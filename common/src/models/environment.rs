//! Warehouse environment models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Connection credentials for one named warehouse environment.
///
/// Internal only; responses use [`EnvironmentItem`].
#[derive(Clone, Deserialize)]
pub struct Environment {
    /// Display name, also the lookup key.
    pub name: String,
    /// Warehouse host.
    pub host: String,
    /// Database name.
    pub database: String,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Warehouse port.
    pub port: u16,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .finish()
    }
}

/// Environment descriptor for API responses (excludes credentials).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnvironmentItem {
    /// Environment name.
    pub name: String,
    /// Warehouse host.
    pub host: String,
    /// Database name.
    pub database: String,
    /// Warehouse port.
    pub port: u16,
}

impl From<&Environment> for EnvironmentItem {
    fn from(env: &Environment) -> Self {
        Self {
            name: env.name.clone(),
            host: env.host.clone(),
            database: env.database.clone(),
            port: env.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let env = Environment {
            name: "IBD".into(),
            host: "prd.example.com".into(),
            database: "rs_edw_prd".into(),
            user: "etl".into(),
            password: "hunter2".into(),
            port: 5439,
        };
        let printed = format!("{:?}", env);
        assert!(!printed.contains("hunter2"));

        let item = serde_json::to_value(EnvironmentItem::from(&env)).unwrap();
        assert!(item.get("password").is_none());
        assert!(item.get("user").is_none());
    }
}
