//! TOML-based configuration for Beacon.
//!
//! Supports a config file (beacon.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [analytics]
//! property_id = "123456789"
//! access_token = "${GA_ACCESS_TOKEN}"
//! timeout_secs = 30
//!
//! [chat]
//! channel_id = "702871548872228994"
//! bot_token = "${DISCORD_TOKEN}"
//! message_limit = 2000
//!
//! [report]
//! label = "MAINNET"
//! kinds = ["single_day", "multi_metric_window"]
//!
//! [schedule]
//! times = ["06:00"]  # UTC
//! run_on_start = false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::delivery::{DEFAULT_API_BASE, DISCORD_MESSAGE_LIMIT};
use crate::report::{ReportKind, DEFAULT_LABEL};

/// Default analytics endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Text placed in front of the failure message when a report cannot be built.
pub const DEFAULT_ERROR_PREFIX: &str = "Error generating stats report: ";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid schedule time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Analytics backend configuration.
    pub analytics: AnalyticsSettings,

    /// Chat delivery configuration.
    pub chat: ChatSettings,

    /// Report content configuration.
    pub report: ReportSettings,

    /// Scheduled driver configuration.
    pub schedule: ScheduleSettings,
}

/// Analytics backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Property (view) id every query targets.
    pub property_id: String,

    /// `reports:batchGet` endpoint.
    pub endpoint: String,

    /// Bearer token (supports ${ENV_VAR} expansion).
    pub access_token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            property_id: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: "${GA_ACCESS_TOKEN}".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AnalyticsSettings {
    /// Property id with environment variables expanded.
    pub fn resolved_property_id(&self) -> Result<String, SettingsError> {
        let id = expand_env_vars(&self.property_id)?;
        if id.trim().is_empty() {
            return Err(SettingsError::MissingSetting("analytics.property_id"));
        }
        Ok(id)
    }

    /// Access token with environment variables expanded.
    pub fn resolved_access_token(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.access_token)
    }
}

/// Chat delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatSettings {
    /// REST base URL.
    pub api_base: String,

    /// Channel the digest is posted to.
    pub channel_id: String,

    /// Bot token (supports ${ENV_VAR} expansion).
    pub bot_token: String,

    /// Maximum characters per message.
    pub message_limit: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            channel_id: String::new(),
            bot_token: "${DISCORD_TOKEN}".to_string(),
            message_limit: DISCORD_MESSAGE_LIMIT,
            timeout_secs: 30,
        }
    }
}

impl ChatSettings {
    /// Message limit; zero (rejected by [`Settings::validate`]) maps to the
    /// Discord default.
    pub fn limit(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.message_limit)
            .or_else(|| NonZeroUsize::new(DISCORD_MESSAGE_LIMIT))
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Channel id with environment variables expanded.
    pub fn resolved_channel_id(&self) -> Result<String, SettingsError> {
        let id = expand_env_vars(&self.channel_id)?;
        if id.trim().is_empty() {
            return Err(SettingsError::MissingSetting("chat.channel_id"));
        }
        Ok(id)
    }

    /// Bot token with environment variables expanded.
    pub fn resolved_bot_token(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.bot_token)
    }
}

/// Report content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Label shown in report titles.
    pub label: String,

    /// Kinds included in each digest, in order.
    pub kinds: Vec<ReportKind>,

    /// Prefix of the fallback message sent when generation fails.
    pub error_prefix: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            kinds: ReportKind::ALL.to_vec(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }
}

/// Scheduled driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Daily fire times in UTC, as HH:MM.
    pub times: Vec<String>,

    /// Run once immediately when the driver starts.
    pub run_on_start: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            times: vec!["06:00".to_string()],
            run_on_start: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from an explicit path or the default locations.
    ///
    /// Searches in order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. Environment variable `BEACON_CONFIG`
    /// 3. `./beacon.toml`
    /// 4. `~/.config/beacon/config.toml`
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = env::var("BEACON_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("beacon.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("beacon").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Check values that cannot be expressed in the types.
    ///
    /// Secrets and ids are resolved lazily, so missing environment variables
    /// are reported by the command that needs them.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.chat.message_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "chat.message_limit must be greater than zero".to_string(),
            ));
        }
        if self.report.kinds.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "report.kinds must name at least one report kind".to_string(),
            ));
        }
        crate::schedule::Schedule::from_settings(&self.schedule)?;
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("BEACON_TEST_VAR", "hello");
        assert_eq!(expand_env_vars("${BEACON_TEST_VAR}").unwrap(), "hello");
        assert_eq!(
            expand_env_vars("prefix_${BEACON_TEST_VAR}_suffix").unwrap(),
            "prefix_hello_suffix"
        );
        env::remove_var("BEACON_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("BEACON_TEST_VAR2", "world");
        assert_eq!(expand_env_vars("$BEACON_TEST_VAR2").unwrap(), "world");
        assert_eq!(expand_env_vars("$BEACON_TEST_VAR2!").unwrap(), "world!");
        env::remove_var("BEACON_TEST_VAR2");
    }

    #[test]
    fn test_expand_env_vars_lone_dollar() {
        assert_eq!(expand_env_vars("costs $ 5").unwrap(), "costs $ 5");
        assert_eq!(expand_env_vars("plain").unwrap(), "plain");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${NONEXISTENT_BEACON_VAR_12345}");
        assert!(matches!(result, Err(SettingsError::MissingEnvVar(name)) if name == "NONEXISTENT_BEACON_VAR_12345"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[analytics]
property_id = "123456789"
access_token = "static-token"
timeout_secs = 10

[chat]
channel_id = "702871548872228994"
bot_token = "bot"
message_limit = 1500

[report]
label = "TESTNET"
kinds = ["last_7_days"]
error_prefix = "Oops: "

[schedule]
times = ["06:00", "18:30"]
run_on_start = true
"#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert_eq!(settings.analytics.property_id, "123456789");
        assert_eq!(settings.analytics.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.analytics.timeout_secs, 10);
        assert_eq!(settings.chat.limit().get(), 1500);
        assert_eq!(settings.chat.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.report.label, "TESTNET");
        assert_eq!(settings.report.kinds, vec![ReportKind::MultiMetricWindow]);
        assert_eq!(settings.report.error_prefix, "Oops: ");
        assert_eq!(settings.schedule.times.len(), 2);
        assert!(settings.schedule.run_on_start);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.chat.message_limit, 2000);
        assert_eq!(settings.report.kinds, ReportKind::ALL.to_vec());
        assert_eq!(settings.report.error_prefix, DEFAULT_ERROR_PREFIX);
        assert_eq!(settings.report.label, "MAINNET");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut settings = Settings::default();
        settings.chat.message_limit = 0;

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidConfig(_))
        ));
        assert_eq!(settings.chat.limit().get(), DISCORD_MESSAGE_LIMIT);
    }

    #[test]
    fn test_validate_rejects_bad_time() {
        let mut settings = Settings::default();
        settings.schedule.times = vec!["25:00".to_string()];

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_unknown_kind_fails_to_parse() {
        let result: Result<Settings, _> = toml::from_str("[report]\nkinds = [\"monthly\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_ids_are_reported() {
        let settings = Settings::default();
        assert!(matches!(
            settings.analytics.resolved_property_id(),
            Err(SettingsError::MissingSetting("analytics.property_id"))
        ));
        assert!(matches!(
            settings.chat.resolved_channel_id(),
            Err(SettingsError::MissingSetting("chat.channel_id"))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Settings::from_file("/definitely/not/here/beacon.toml");
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }
}
