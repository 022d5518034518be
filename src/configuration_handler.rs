use crate::configuration::Configuration;
use std::time::Duration;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConfigurationHandler {
    bind_address: String,
    database_url: Option<String>,
    operation_timeout: Duration,
    seed_demo_data: bool,
}

impl ConfigurationHandler {
    /// Loads `.env` (when present) and reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let database_url = lookup("DATABASE_URL");
        let operation_timeout = lookup("OPERATION_TIMEOUT_SECS")
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS));
        let seed_demo_data = lookup("SEED_DEMO_DATA")
            .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            bind_address,
            database_url,
            operation_timeout,
            seed_demo_data,
        }
    }

    /// CLI arguments win over the environment.
    pub fn apply_overrides(
        mut self,
        bind_address: Option<String>,
        database_url: Option<String>,
        demo: bool,
    ) -> Self {
        if let Some(addr) = bind_address {
            self.bind_address = addr;
        }
        if let Some(url) = database_url {
            self.database_url = Some(url);
        }
        if demo {
            self.seed_demo_data = true;
        }
        self
    }
}

impl Configuration for ConfigurationHandler {
    fn bind_address(&self) -> String {
        self.bind_address.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    fn seed_demo_data(&self) -> bool {
        self.seed_demo_data
    }
}
