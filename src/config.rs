use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::recurrence::MonthlyRule;
use crate::error::ConfigError;

pub const CONFIG_VERSION: u64 = 1;

const DEFAULT_RETENTION_HOURS: i64 = 24;

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("taskboard")
}

fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("taskboard")
        .join("snapshot.json")
}

fn default_admin_roles() -> Vec<String> {
    vec!["office assistant".into(), "founder".into()]
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct TaskboardConfig {
    pub version: u64,
    /// Exported collections the CLI reads and writes.
    pub snapshot_path: PathBuf,
    /// Role names that get the admin dashboard.
    pub admin_roles: Vec<String>,
    pub monthly_rule: MonthlyRule,
    /// Days ahead a due date counts as "soon".
    pub soon_window_days: i64,
    /// Days between using a template and its tasks falling due.
    pub template_lead_days: i64,
    /// Days before a template's due date its tasks are created automatically.
    pub template_activation_window_days: i64,
    /// Completed tasks untouched for longer than this are purged.
    pub completed_retention_hours: i64,
    pub debug_logging: bool,
}

impl Default for TaskboardConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            snapshot_path: default_snapshot_path(),
            admin_roles: default_admin_roles(),
            monthly_rule: MonthlyRule::EveryMonth,
            soon_window_days: 2,
            template_lead_days: 10,
            template_activation_window_days: 5,
            completed_retention_hours: DEFAULT_RETENTION_HOURS,
            debug_logging: false,
        }
    }
}

impl TaskboardConfig {
    pub fn default_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Read the config file. A missing file is the defaults; an unreadable one
    /// is reported together with the defaults to fall back on.
    pub fn load(path: &Path) -> Result<Self, (ConfigError, Self)> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                let path = path.display().to_string();
                return Err((ConfigError::Io { path, source }, Self::default()));
            }
        };
        serde_json::from_str(&content).map_err(|source| {
            let path = path.display().to_string();
            (ConfigError::Parse { path, source }, Self::default())
        })
    }

    /// Write the config as pretty JSON, creating the directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// How long completed tasks are kept. Negative or out-of-range values fall
    /// back to the default.
    pub fn completed_retention(&self) -> TimeDelta {
        TimeDelta::try_hours(self.completed_retention_hours)
            .filter(|retention| *retention >= TimeDelta::zero())
            .unwrap_or_else(|| {
                log::warn!(
                    "completed_retention_hours {} is out of range, using {}",
                    self.completed_retention_hours,
                    DEFAULT_RETENTION_HOURS
                );
                TimeDelta::hours(DEFAULT_RETENTION_HOURS)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: TaskboardConfig =
            serde_json::from_str(r#"{"monthly_rule": "skip_anchor_month", "soon_window_days": 3}"#).unwrap();
        assert_eq!(config.monthly_rule, MonthlyRule::SkipAnchorMonth);
        assert_eq!(config.soon_window_days, 3);
        assert_eq!(config.template_lead_days, 10);
        assert_eq!(config.admin_roles, default_admin_roles());
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("taskboard-config-does-not-exist.json");
        assert_eq!(TaskboardConfig::load(&path).unwrap(), TaskboardConfig::default());
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join(format!("taskboard-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        let config = TaskboardConfig {
            debug_logging: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(TaskboardConfig::load(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unparseable_file_reports_error_with_defaults() {
        let dir = std::env::temp_dir().join(format!("taskboard-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let (error, fallback) = TaskboardConfig::load(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert_eq!(fallback, TaskboardConfig::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn huge_retention_falls_back_to_default() {
        let config: TaskboardConfig =
            serde_json::from_str(r#"{"completed_retention_hours": 9223372036854775807}"#).unwrap();
        assert_eq!(config.completed_retention(), TimeDelta::hours(24));

        let negative = TaskboardConfig {
            completed_retention_hours: -5,
            ..Default::default()
        };
        assert_eq!(negative.completed_retention(), TimeDelta::hours(24));

        let custom = TaskboardConfig {
            completed_retention_hours: 48,
            ..Default::default()
        };
        assert_eq!(custom.completed_retention(), TimeDelta::hours(48));
    }
}
