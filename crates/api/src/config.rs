/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Uids allowed to run restore and purge, from comma-separated
    /// `ADMIN_UIDS`. Authentication itself happens at the identity
    /// provider; this list only gates the danger-zone endpoints.
    pub admin_uids: Vec<String>,
    /// Per-commit operation ceiling for bulk writes (default: `400`).
    pub store_batch_limit: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ADMIN_UIDS`           | (empty)                    |
    /// | `STORE_BATCH_LIMIT`    | `400`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_uids: Vec<String> = std::env::var("ADMIN_UIDS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_batch_limit = parse_batch_limit(
            &std::env::var("STORE_BATCH_LIMIT")
                .unwrap_or_else(|_| postmap_store::DEFAULT_BATCH_LIMIT.to_string()),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admin_uids,
            store_batch_limit,
        }
    }

    /// Whether `uid` may run the danger-zone endpoints.
    pub fn is_admin(&self, uid: &str) -> bool {
        self.admin_uids.iter().any(|admin| admin == uid)
    }
}

/// Parse the per-commit operation ceiling. A zero limit would make
/// batch partitioning impossible, so it is rejected at startup rather
/// than mid-request.
fn parse_batch_limit(raw: &str) -> usize {
    raw.parse()
        .ok()
        .filter(|limit| *limit > 0)
        .expect("STORE_BATCH_LIMIT must be a positive integer")
}
