use std::env;
use std::path::PathBuf;

/// Hub configuration derived from environment variables.
///
/// A `.env` file in the working directory is loaded first (see `main`), so
/// the same variables can be kept next to the database for local runs.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub port: u16,
    /// Bearer token issued by the identity provider.  Empty ⇒ auth disabled.
    pub token: String,

    // ── Database ───────────────────────────────────────────────────
    pub db_path: PathBuf,
    pub db_pool_size: u32,

    // ── Frontend ───────────────────────────────────────────────────
    pub static_dir: PathBuf,

    // ── Demo data ──────────────────────────────────────────────────
    pub seed_demo: bool,
    pub seed_days: u32,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env_str(name, default))
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("FLEET_HUB_BIND", "127.0.0.1"),
            port: env_parse("FLEET_HUB_PORT", 8080),
            token: env_str("FLEET_HUB_TOKEN", ""),
            db_path: env_path("FLEET_HUB_DB", "fleet_dashboard.db"),
            db_pool_size: env_parse("FLEET_HUB_DB_POOL_SIZE", 4),
            static_dir: env_path("FLEET_HUB_STATIC_DIR", "frontend/dist"),
            seed_demo: env_bool("FLEET_HUB_SEED_DEMO", false),
            seed_days: env_parse("FLEET_HUB_SEED_DAYS", 50),
        }
    }

    /// Configuration pointing at `db_path` with everything else defaulted and
    /// auth disabled.
    #[cfg(test)]
    pub fn for_db(db_path: PathBuf) -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 0,
            token: String::new(),
            db_path,
            db_pool_size: 2,
            static_dir: PathBuf::from("frontend/dist"),
            seed_demo: false,
            seed_days: 50,
        }
    }
}
