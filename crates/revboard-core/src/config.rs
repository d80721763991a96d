use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("REVBOARD_ENV", "development"));
    let bind_addr = parse_addr("REVBOARD_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REVBOARD_LOG_LEVEL", "info");
    let upstream_base_url = or_default(
        "REVBOARD_UPSTREAM_BASE_URL",
        "https://api.pms.example.com/v1",
    );
    let upstream_api_key = lookup("REVBOARD_UPSTREAM_API_KEY").ok();
    let account_id = parse_account_id(lookup("REVBOARD_ACCOUNT_ID").ok().as_deref());
    let force_mock = parse_bool("REVBOARD_FORCE_MOCK", "false")?;
    let upstream_timeout_secs = parse_u64("REVBOARD_UPSTREAM_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        upstream_api_key,
        account_id,
        force_mock,
        upstream_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Parse the upstream account id, treating a non-numeric value as absent.
///
/// An unset or unparseable account id resolves to `None` so the review
/// loader can still run against the mock source; refusing mock mode with
/// no usable account id is the loader's call, not a startup failure.
fn parse_account_id(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    match raw.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(
                value = raw,
                "REVBOARD_ACCOUNT_ID is not numeric; treating as unset"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_development() {
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.upstream_base_url, "https://api.pms.example.com/v1");
        assert!(cfg.upstream_api_key.is_none());
        assert!(cfg.account_id.is_none());
        assert!(!cfg.force_mock);
        assert_eq!(cfg.upstream_timeout_secs, 30);
    }

    #[test]
    fn build_app_config_reads_upstream_overrides() {
        let mut map = HashMap::new();
        map.insert("REVBOARD_UPSTREAM_BASE_URL", "http://localhost:8080/v1");
        map.insert("REVBOARD_UPSTREAM_API_KEY", "key-123");
        map.insert("REVBOARD_ACCOUNT_ID", "61148");
        map.insert("REVBOARD_FORCE_MOCK", "true");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.upstream_base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.upstream_api_key.as_deref(), Some("key-123"));
        assert_eq!(cfg.account_id, Some(61148));
        assert!(cfg.force_mock);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = HashMap::new();
        map.insert("REVBOARD_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVBOARD_BIND_ADDR"),
            "expected InvalidEnvVar(REVBOARD_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_force_mock() {
        let mut map = HashMap::new();
        map.insert("REVBOARD_FORCE_MOCK", "yes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVBOARD_FORCE_MOCK"),
            "expected InvalidEnvVar(REVBOARD_FORCE_MOCK), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map = HashMap::new();
        map.insert("REVBOARD_UPSTREAM_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVBOARD_UPSTREAM_TIMEOUT_SECS"),
            "expected InvalidEnvVar(REVBOARD_UPSTREAM_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn parse_account_id_accepts_numeric() {
        assert_eq!(parse_account_id(Some("42")), Some(42));
        assert_eq!(parse_account_id(Some(" 42 ")), Some(42));
    }

    #[test]
    fn parse_account_id_treats_non_numeric_as_unset() {
        assert_eq!(parse_account_id(Some("forty-two")), None);
        assert_eq!(parse_account_id(None), None);
    }
}
