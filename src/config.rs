// Configuration module for diffsel
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Name prefix that marks a node as a test entry point
    /// (DIFFSEL_TEST_PREFIX)
    pub test_prefix: String,

    /// Class-level boolean binding that disables test collection for a scope
    /// when set to false (DIFFSEL_COLLECT_MARKER)
    pub collect_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            test_prefix: "test_".to_string(),
            collect_marker: "__test__".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("DIFFSEL_TEST_PREFIX") {
            if val.is_empty() {
                eprintln!(
                    "diffsel: Warning: DIFFSEL_TEST_PREFIX is empty, using default: {}",
                    config.test_prefix
                );
            } else {
                config.test_prefix = val;
            }
        }

        if let Ok(val) = env::var("DIFFSEL_COLLECT_MARKER") {
            if val.is_empty() {
                eprintln!(
                    "diffsel: Warning: DIFFSEL_COLLECT_MARKER is empty, using default: {}",
                    config.collect_marker
                );
            } else {
                config.collect_marker = val;
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}
