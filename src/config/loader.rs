//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::validate::validate_record;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Semantic validation of a parsed configuration.
///
/// Returns all errors, not just the first. The per-node checks are the
/// same validators the compile pass gates on; surfacing them here means a
/// bad record fails the load instead of being silently skipped later.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push("listener.bind_address must not be empty".to_string());
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push("listener.request_timeout_secs must be positive".to_string());
    }

    for (i, reserved) in config.reserved_prefixes.iter().enumerate() {
        if reserved.trim().is_empty() {
            errors.push(format!("reserved_prefixes[{}] must not be blank", i));
        }
    }

    for (i, record) in config.routes.iter().enumerate() {
        if let Err(node_errors) = validate_record(record) {
            for err in node_errors {
                errors.push(format!("routes[{}]: {}", i, err));
            }
        }
        // Children are validated again by the builders; here only the top
        // level gates the load, matching how partial trees degrade.
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_top_level_record() {
        let config: AppConfig = toml::from_str(
            r#"
            [[routes]]
            kind = "route"
            uri = "x"
        "#,
        )
        .unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("routes[0]"));
    }

    #[test]
    fn test_validate_accepts_full_tree() {
        let config: AppConfig = toml::from_str(
            r#"
            reserved_prefixes = ["admin", "api"]

            [[routes]]
            kind = "group"
            prefix = "blog"

            [[routes.children]]
            kind = "route"
            uri = "post/{slug}"
            methods = ["GET"]
            action = "view:blog.post"
        "#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_reserved_prefix_rejected() {
        let config: AppConfig = toml::from_str(r#"reserved_prefixes = ["  "]"#).unwrap();
        assert!(validate_config(&config).is_err());
    }
}
