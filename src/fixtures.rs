#[cfg(test)]
pub mod test {
    use confique::Config;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};

    use crate::document::Document;

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct AppConfig {
        /// Database connection string.
        pub database_url: String,

        /// API key for the upstream service.
        pub api_key: Option<String>,

        /// Enable debug mode.
        #[config(default = false)]
        pub debug: bool,

        /// Request timeout in seconds.
        #[config(default = 30)]
        pub timeout: u32,

        /// Upper bound on open connections.
        pub max_connections: Option<u32>,

        /// Connection pool settings.
        #[config(nested)]
        pub pool: PoolConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct PoolConfig {
        #[config(default = 5)]
        pub size: u32,

        #[config(default = 300)]
        pub recycle_secs: u64,
    }

    /// Globals plus `dev` and `prod` profiles with templated secrets.
    pub fn sample_document() -> Document {
        let Value::Object(doc) = json!({
            "database_url": "default_db",
            "debug": false,
            "timeout": 30,
            "pool": {"size": 5},
            "profiles": {
                "dev": {
                    "database_url": "${TEST_DB_URL-postgresql://localhost:5432/dev}",
                    "api_key": "${TEST_API_KEY-dev_key_123}",
                    "debug": true,
                    "max_connections": 10,
                    "pool": {"recycle_secs": 60}
                },
                "prod": {
                    "database_url": "${PROD_DB_URL-postgresql://prod:5432/prod}",
                    "api_key": "${PROD_API_KEY-prod_key_456}",
                    "debug": false,
                    "max_connections": 100
                }
            }
        }) else {
            unreachable!()
        };
        doc
    }

    #[test]
    fn app_config_requires_database_url() {
        assert!(AppConfig::builder().load().is_err());
    }

    #[test]
    fn pool_config_loads_defaults() {
        let pool = PoolConfig::builder().load().unwrap();
        assert_eq!(pool.size, 5);
        assert_eq!(pool.recycle_secs, 300);
    }
}
