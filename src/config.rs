const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Filter directives handed to [`crate::logging::init_tracing`].
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Loads `.env` (if present) before reading the environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self { log_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_reads_and_falls_back() {
        std::env::set_var("RUST_LOG", "  ");
        assert_eq!(Config::from_env().log_level, "info");
        std::env::set_var("RUST_LOG", "graphan_core=debug");
        assert_eq!(Config::from_env().log_level, "graphan_core=debug");
        std::env::remove_var("RUST_LOG");
        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(Config::default().log_level, "info");
    }
}
