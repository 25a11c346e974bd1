//! Configuration management for the task API.
//!
//! Configuration is read from environment variables (a `.env` file in the
//! working directory is loaded first by the binary):
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `LOG_LEVEL` - Optional. Default log level when `RUST_LOG` is unset. Defaults to `info`.
//! - `TASK_STORE` - Optional. `memory` or `file`. Defaults to `memory`.
//! - `TASK_STORE_PATH` - Optional. JSON file for the `file` store. Defaults to `./data/tasks.json`.
//! - `TASK_TITLE_MAX_LEN` - Optional. Defaults to `100`.
//! - `TASK_DESCRIPTION_MAX_LEN` - Optional. Defaults to `1000`.
//! - `TASK_DESCRIPTION_REQUIRED` - Optional. Defaults to `true`.
//! - `TASK_PRIORITY_REQUIRED` - Optional. Defaults to `true`.
//! - `TASK_PRIORITY_MIN` / `TASK_PRIORITY_MAX` - Optional. Defaults to `1` / `5`.
//! - `TASK_PRIORITY_LABELS` - Optional. Comma list; switches priority to labels.
//! - `TASK_USER_NAME_MAX_LEN` - Optional. Defaults to `50`.
//! - `TASK_ALLOWED_LOCATIONS` - Optional. Comma list of accepted locations.
//! - `TASK_STRICT_FIELDS` - Optional. Reject unknown fields. Defaults to `false`.
//! - `TASK_REPORT_ALL_ERRORS` - Optional. Defaults to `true`.
//! - `TASK_DUPLICATE_POLICY` - Optional. `allow`, `title` or `title_per_user`. Defaults to `allow`.
//! - `TASK_VALIDATION_STATUS` - Optional. `422` or `400`. Defaults to `422`.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::task::{DuplicatePolicy, PriorityRule, TaskSchema, TaskStoreType};
use crate::util::{parse_bool, parse_list};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// HTTP status used for schema validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStatus {
    BadRequest,
    #[default]
    UnprocessableEntity,
}

impl ValidationStatus {
    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::UnprocessableEntity => 422,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub store_type: TaskStoreType,

    /// Snapshot path for the file store
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: TaskStoreType::Memory,
            path: PathBuf::from("./data/tasks.json"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Log level applied when `RUST_LOG` is unset
    pub log_level: String,

    pub store: StoreConfig,

    /// Field rules for task creation
    pub schema: TaskSchema,

    pub duplicate_policy: DuplicatePolicy,

    pub validation_status: ValidationStatus,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            store: StoreConfig::default(),
            schema: TaskSchema::default(),
            duplicate_policy: DuplicatePolicy::default(),
            validation_status: ValidationStatus::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set to something
    /// that cannot be parsed, or if the priority bounds are inverted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or(defaults.host);
        let port = parse_number(&get, "PORT", defaults.port)?;
        let log_level = get("LOG_LEVEL")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or(defaults.log_level);

        let store_type = match get("TASK_STORE") {
            Some(value) => TaskStoreType::parse(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TASK_STORE".to_string(),
                    format!("unknown store type '{}'", value),
                )
            })?,
            None => defaults.store.store_type,
        };
        let store = StoreConfig {
            store_type,
            path: get("TASK_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store.path),
        };

        let schema = Self::schema_from(&get, defaults.schema)?;

        let duplicate_policy = match get("TASK_DUPLICATE_POLICY") {
            Some(value) => DuplicatePolicy::parse(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TASK_DUPLICATE_POLICY".to_string(),
                    format!("unknown policy '{}'", value),
                )
            })?,
            None => defaults.duplicate_policy,
        };

        let validation_status = match get("TASK_VALIDATION_STATUS").as_deref().map(str::trim) {
            None => defaults.validation_status,
            Some("400") => ValidationStatus::BadRequest,
            Some("422") => ValidationStatus::UnprocessableEntity,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "TASK_VALIDATION_STATUS".to_string(),
                    format!("expected 400 or 422, got '{}'", other),
                ))
            }
        };

        Ok(Self {
            host,
            port,
            log_level,
            store,
            schema,
            duplicate_policy,
            validation_status,
        })
    }

    fn schema_from<G>(get: &G, defaults: TaskSchema) -> Result<TaskSchema, ConfigError>
    where
        G: Fn(&str) -> Option<String>,
    {
        let priority_rule = match get("TASK_PRIORITY_LABELS").map(|v| parse_list(&v)) {
            Some(labels) if !labels.is_empty() => PriorityRule::Labels(labels),
            _ => {
                let (default_min, default_max) = match defaults.priority_rule {
                    PriorityRule::Range { min, max } => (min, max),
                    PriorityRule::Labels(_) => (1, 5),
                };
                let min = parse_number(get, "TASK_PRIORITY_MIN", default_min)?;
                let max = parse_number(get, "TASK_PRIORITY_MAX", default_max)?;
                if min > max {
                    return Err(ConfigError::InvalidValue(
                        "TASK_PRIORITY_MIN".to_string(),
                        format!("{} is greater than TASK_PRIORITY_MAX {}", min, max),
                    ));
                }
                PriorityRule::Range { min, max }
            }
        };

        let schema = TaskSchema {
            title_max_len: parse_number(get, "TASK_TITLE_MAX_LEN", defaults.title_max_len)?,
            description_max_len: parse_number(
                get,
                "TASK_DESCRIPTION_MAX_LEN",
                defaults.description_max_len,
            )?,
            description_required: parse_flag(
                get,
                "TASK_DESCRIPTION_REQUIRED",
                defaults.description_required,
            )?,
            priority_required: parse_flag(
                get,
                "TASK_PRIORITY_REQUIRED",
                defaults.priority_required,
            )?,
            priority_rule,
            user_name_max_len: parse_number(
                get,
                "TASK_USER_NAME_MAX_LEN",
                defaults.user_name_max_len,
            )?,
            allowed_locations: get("TASK_ALLOWED_LOCATIONS")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.allowed_locations),
            strict_fields: parse_flag(get, "TASK_STRICT_FIELDS", defaults.strict_fields)?,
            report_all_errors: parse_flag(
                get,
                "TASK_REPORT_ALL_ERRORS",
                defaults.report_all_errors,
            )?,
        };

        for (name, value) in [
            ("TASK_TITLE_MAX_LEN", schema.title_max_len),
            ("TASK_DESCRIPTION_MAX_LEN", schema.description_max_len),
            ("TASK_USER_NAME_MAX_LEN", schema.user_name_max_len),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(
                    name.to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }

        Ok(schema)
    }
}

fn parse_number<G, T>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, name: &str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => parse_bool(&value).ok_or_else(|| {
            ConfigError::InvalidValue(
                name.to_string(),
                format!("expected a boolean, got '{}'", value),
            )
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store.store_type, TaskStoreType::Memory);
        assert_eq!(config.schema.title_max_len, 100);
        assert_eq!(config.schema.description_max_len, 1000);
        assert!(config.schema.description_required);
        assert_eq!(config.schema.priority_rule, PriorityRule::Range { min: 1, max: 5 });
        assert_eq!(config.schema.user_name_max_len, 50);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Allow);
        assert_eq!(config.validation_status.code(), 422);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("TASK_STORE", "file"),
            ("TASK_STORE_PATH", "/tmp/tasks.json"),
            ("TASK_TITLE_MAX_LEN", "255"),
            ("TASK_DESCRIPTION_REQUIRED", "false"),
            ("TASK_ALLOWED_LOCATIONS", "Ames, Boone"),
            ("TASK_DUPLICATE_POLICY", "title_per_user"),
            ("TASK_VALIDATION_STATUS", "400"),
            ("TASK_STRICT_FIELDS", "yes"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store.store_type, TaskStoreType::File);
        assert_eq!(config.store.path, PathBuf::from("/tmp/tasks.json"));
        assert_eq!(config.schema.title_max_len, 255);
        assert!(!config.schema.description_required);
        assert_eq!(config.schema.allowed_locations, vec!["Ames", "Boone"]);
        assert!(config.schema.strict_fields);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::RejectTitlePerUser);
        assert_eq!(config.validation_status, ValidationStatus::BadRequest);
    }

    #[test]
    fn test_priority_labels_override_range() {
        let config = load(&[("TASK_PRIORITY_LABELS", "low,medium,high")]).unwrap();
        assert_eq!(
            config.schema.priority_rule,
            PriorityRule::Labels(vec![
                "low".to_string(),
                "medium".to_string(),
                "high".to_string()
            ])
        );
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("PORT", "  "), ("TASK_STORE", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.store.store_type, TaskStoreType::Memory);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            vec![("PORT", "eighty")],
            vec![("TASK_STORE", "sqlite")],
            vec![("TASK_TITLE_MAX_LEN", "0")],
            vec![("TASK_PRIORITY_MIN", "5"), ("TASK_PRIORITY_MAX", "1")],
            vec![("TASK_DESCRIPTION_REQUIRED", "sometimes")],
            vec![("TASK_DUPLICATE_POLICY", "never")],
            vec![("TASK_VALIDATION_STATUS", "418")],
        ] {
            let err = load(&vars).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == vars[0].0));
        }
    }
}
