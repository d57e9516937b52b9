//! Configuration module for Beacon.
//!
//! Handles the config file, environment variable expansion and defaults.
//! Only the collaborators and the driver read configuration; the report
//! pipeline itself takes none.

mod settings;

pub use settings::{
    expand_env_vars, AnalyticsSettings, ChatSettings, ReportSettings, ScheduleSettings, Settings,
    SettingsError, DEFAULT_ENDPOINT, DEFAULT_ERROR_PREFIX,
};
