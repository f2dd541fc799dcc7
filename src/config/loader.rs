//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding `upstream.base_url`.
pub const ENV_UPSTREAM_URL: &str = "UPSTREAM_URL";
/// Environment variable overriding `cors.default_origin`.
pub const ENV_ALLOWED_ORIGIN: &str = "ALLOWED_ORIGIN";
/// Environment variable overriding `static_files.root`.
pub const ENV_STATIC_ROOT: &str = "STATIC_ROOT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value `{}` for environment variable {}", value, var)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file into a configuration without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from a variable lookup (normally `std::env::var`).
///
/// Empty values are ignored so `PORT=` behaves like an unset variable.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(port) = get(ENV_PORT) {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: ENV_PORT, value: port.clone() })?;
    }
    if let Some(url) = get(ENV_UPSTREAM_URL) {
        config.upstream.base_url = url;
    }
    if let Some(origin) = get(ENV_ALLOWED_ORIGIN) {
        config.cors.default_origin = origin;
    }
    if let Some(root) = get(ENV_STATIC_ROOT) {
        config.static_files.root = root;
    }
    Ok(())
}

/// Build the startup configuration: file (or defaults), then environment, then validation.
pub fn load_startup_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("PORT", "9000"),
                ("UPSTREAM_URL", "https://example.org/api"),
                ("ALLOWED_ORIGIN", "http://localhost:5173"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.upstream.base_url, "https://example.org/api");
        assert_eq!(config.cors.default_origin, "http://localhost:5173");
        assert_eq!(config.static_files.root, "./docs");
    }

    #[test]
    fn test_empty_port_falls_back_to_default() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, lookup(&[("PORT", "")])).unwrap();
        assert_eq!(config.listener.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_load_config_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\nbase_url = \"not a url\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("not a valid URL"));
    }

    #[test]
    fn test_load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 3000\n\n[cors]\nmode = \"wildcard\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 3000);
    }
}
