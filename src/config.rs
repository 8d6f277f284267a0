//! Centralized configuration for dbfkit handles.
//!
//! Single place for tunables instead of scattering env lookups;
//! DbfConfig::from_env() keeps the env-variable surface stable.

/// Per-handle configuration.
#[derive(Clone, Debug)]
pub struct DbfConfig {
    /// Trim leading/trailing ASCII spaces from string attribute reads.
    /// Env: DBF_TRIM_WHITESPACE (default true; "0|false|off|no" => false)
    pub trim_strings: bool,
}

impl Default for DbfConfig {
    fn default() -> Self {
        Self { trim_strings: true }
    }
}

impl DbfConfig {
    /// Загрузить конфигурацию из переменных окружения.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("DBF_TRIM_WHITESPACE") {
            let s = v.trim().to_ascii_lowercase();
            if s == "0" || s == "false" || s == "off" || s == "no" {
                cfg.trim_strings = false;
            }
        }
        cfg
    }
}
