//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: explicit `--config` path, else `$XDG_CONFIG_HOME/termkit/termkit.toml`
//! 3. Environment variables: `TERMKIT_*` prefix (`__` section separator)
//!
//! Loading never fails: a missing or unreadable file yields defaults, a
//! type-mismatched key yields that key's default plus a printed warning.
//! Unknown keys are ignored for forward compatibility.

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cli::output;

/// External API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// JSON endpoint returning `{"ip": "..."}`
    pub ip_api: String,
    /// Exchange-rate API base URL; the source currency code is appended
    pub currency_api: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ip_api: "https://api.ipify.org?format=json".into(),
            currency_api: "https://api.exchangerate-api.com/v4/latest/".into(),
        }
    }
}

/// Timeout/retry policy for network-backed commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Additional attempts after the first failure
    pub max_retries: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

/// Defaults for the password generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecurityConfig {
    pub password_length: u16,
    pub include_special_chars: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_length: 16,
            include_special_chars: true,
        }
    }
}

/// Unified configuration for termkit.
///
/// Constructed once at startup and passed by reference into the dispatcher;
/// read-only for the process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub network: NetworkConfig,
    pub security: SecurityConfig,
}

/// Get the XDG config directory for termkit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "termkit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("termkit.toml"))
}

/// Expand `~` and `$VAR` in a user-supplied config path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

impl Settings {
    /// Load settings with layered precedence. Never fails; problems are
    /// reported as warnings and the affected keys keep their defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut settings = Self::default();

        let path = explicit
            .map(expand_path)
            .or_else(global_config_path);

        if let Some(path) = path {
            settings.apply_file(&path);
        }

        settings.apply_env_overrides();
        settings
    }

    /// Merge a TOML file into self, key by key. Missing file is silently
    /// skipped; a malformed file or a type-mismatched key warns and keeps
    /// the current value.
    fn apply_file(&mut self, path: &Path) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                output::warning(&format!("could not read {}: {}", path.display(), e));
                return;
            }
        };

        let root: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => {
                output::warning(&format!("could not parse {}: {}", path.display(), e));
                return;
            }
        };

        take_string(&root, "api", "ip_api", &mut self.api.ip_api);
        take_string(&root, "api", "currency_api", &mut self.api.currency_api);
        take_u64(&root, "network", "timeout_secs", &mut self.network.timeout_secs);
        take_u32(&root, "network", "max_retries", &mut self.network.max_retries);
        take_u16(
            &root,
            "security",
            "password_length",
            &mut self.security.password_length,
        );
        take_bool(
            &root,
            "security",
            "include_special_chars",
            &mut self.security.include_special_chars,
        );
    }

    /// Apply `TERMKIT_*` environment variables as explicit overrides.
    ///
    /// Uses the config crate just for env var parsing, e.g.
    /// `TERMKIT_NETWORK__TIMEOUT_SECS=30`.
    fn apply_env_overrides(&mut self) {
        let built = Config::builder()
            .add_source(
                Environment::with_prefix("TERMKIT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build();

        let cfg = match built {
            Ok(cfg) => cfg,
            Err(e) => {
                output::warning(&format!("could not read environment overrides: {e}"));
                return;
            }
        };

        if let Ok(val) = cfg.get_string("api.ip_api") {
            self.api.ip_api = val;
        }
        if let Ok(val) = cfg.get_string("api.currency_api") {
            self.api.currency_api = val;
        }
        if let Ok(val) = cfg.get_int("network.timeout_secs") {
            match u64::try_from(val) {
                Ok(v) => self.network.timeout_secs = v,
                Err(_) => output::warning("TERMKIT_NETWORK__TIMEOUT_SECS must be non-negative"),
            }
        }
        if let Ok(val) = cfg.get_int("network.max_retries") {
            match u32::try_from(val) {
                Ok(v) => self.network.max_retries = v,
                Err(_) => output::warning("TERMKIT_NETWORK__MAX_RETRIES must be non-negative"),
            }
        }
        if let Ok(val) = cfg.get_int("security.password_length") {
            match u16::try_from(val) {
                Ok(v) => self.security.password_length = v,
                Err(_) => output::warning("TERMKIT_SECURITY__PASSWORD_LENGTH out of range"),
            }
        }
        if let Ok(val) = cfg.get_bool("security.include_special_chars") {
            self.security.include_special_chars = val;
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        // Settings contains only plain scalars; serialization cannot fail
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Generate a commented template config file.
    pub fn template() -> String {
        r#"# termkit configuration
#
# Location: ~/.config/termkit/termkit.toml (or --config <path>)
# Every key is optional; unset keys use built-in defaults.
# Environment overrides: TERMKIT_<SECTION>__<KEY>, e.g.
#   TERMKIT_NETWORK__TIMEOUT_SECS=30

[api]
# JSON endpoint returning {"ip": "..."}
# ip_api = "https://api.ipify.org?format=json"

# Exchange-rate API base URL (source currency code is appended)
# currency_api = "https://api.exchangerate-api.com/v4/latest/"

[network]
# Request timeout in seconds for network-backed commands
# timeout_secs = 10

# Additional attempts after the first failure
# max_retries = 3

[security]
# Default password length for `utils password`
# password_length = 16

# Include special characters by default
# include_special_chars = true
"#
        .to_string()
    }
}

fn lookup<'a>(root: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    root.get(section).and_then(|s| s.get(key))
}

fn warn_type(section: &str, key: &str, expected: &str, got: &toml::Value) {
    output::warning(&format!(
        "config key {section}.{key}: expected {expected}, got {} - using default",
        got.type_str()
    ));
}

fn take_string(root: &toml::Value, section: &str, key: &str, slot: &mut String) {
    if let Some(value) = lookup(root, section, key) {
        match value.as_str() {
            Some(s) => *slot = s.to_string(),
            None => warn_type(section, key, "string", value),
        }
    }
}

fn take_bool(root: &toml::Value, section: &str, key: &str, slot: &mut bool) {
    if let Some(value) = lookup(root, section, key) {
        match value.as_bool() {
            Some(b) => *slot = b,
            None => warn_type(section, key, "boolean", value),
        }
    }
}

fn take_u64(root: &toml::Value, section: &str, key: &str, slot: &mut u64) {
    if let Some(value) = lookup(root, section, key) {
        match value.as_integer().and_then(|i| u64::try_from(i).ok()) {
            Some(i) => *slot = i,
            None => warn_type(section, key, "non-negative integer", value),
        }
    }
}

fn take_u32(root: &toml::Value, section: &str, key: &str, slot: &mut u32) {
    if let Some(value) = lookup(root, section, key) {
        match value.as_integer().and_then(|i| u32::try_from(i).ok()) {
            Some(i) => *slot = i,
            None => warn_type(section, key, "non-negative integer", value),
        }
    }
}

fn take_u16(root: &toml::Value, section: &str, key: &str, slot: &mut u16) {
    if let Some(value) = lookup(root, section, key) {
        match value.as_integer().and_then(|i| u16::try_from(i).ok()) {
            Some(i) => *slot = i,
            None => warn_type(section, key, "non-negative integer", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_from_toml(content: &str) -> Settings {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        let mut settings = Settings::default();
        settings.apply_file(file.path());
        settings
    }

    #[test]
    fn given_missing_file_when_loading_then_uses_defaults() {
        let mut settings = Settings::default();
        settings.apply_file(Path::new("/nonexistent/termkit.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_empty_file_when_loading_then_matches_missing_file_defaults() {
        let from_empty = settings_from_toml("");
        assert_eq!(from_empty, Settings::default());
    }

    #[test]
    fn given_partial_file_when_loading_then_merges_over_defaults() {
        let settings = settings_from_toml("[network]\ntimeout_secs = 30\n");
        assert_eq!(settings.network.timeout_secs, 30);
        assert_eq!(settings.network.max_retries, 3);
        assert_eq!(settings.api, ApiConfig::default());
    }

    #[test]
    fn given_type_mismatch_when_loading_then_falls_back_to_default() {
        let settings = settings_from_toml("[network]\ntimeout_secs = \"fast\"\n");
        assert_eq!(settings.network.timeout_secs, 10);
    }

    #[test]
    fn given_negative_integer_when_loading_then_falls_back_to_default() {
        let settings = settings_from_toml("[network]\nmax_retries = -1\n");
        assert_eq!(settings.network.max_retries, 3);
    }

    #[test]
    fn given_unknown_keys_when_loading_then_ignores_them() {
        let settings = settings_from_toml(
            "[api]\nfuture_api = \"https://example.com\"\n[experimental]\nshiny = true\n",
        );
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_malformed_file_when_loading_then_uses_defaults() {
        let settings = settings_from_toml("this is not [toml");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_default_settings_when_rendered_then_round_trips() {
        let settings = Settings::default();
        let rendered = settings.to_toml();
        let parsed: Settings = toml::from_str(&rendered).expect("parse rendered config");
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_tilde_path_when_expanding_then_resolves_home() {
        let expanded = expand_path(Path::new("~/termkit.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
