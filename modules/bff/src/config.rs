use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Gateway configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the session service
    pub auth_service_url: String,
    /// Base URL of the user/profile service
    pub user_service_url: String,
    /// Sent as `X-Internal-Secret` on upstream calls when set
    pub internal_secret: Option<String>,
    /// Bound on each upstream call
    pub upstream_timeout: Duration,
    /// Externally reachable base URL of this gateway, used for avatar links
    pub public_base_url: String,
    /// Object-store URL prefix that is rewritten to the image proxy
    pub avatar_internal_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_service_url = lookup("AUTH_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))?;
        let user_service_url = lookup("USER_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(ConfigError::Missing("USER_SERVICE_URL"))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        // APP_PORT is the older name for the same setting
        let port = lookup("PORT")
            .or_else(|| lookup("APP_PORT"))
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                    key: "PORT",
                    reason: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(8000);

        let timeout_ms = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "UPSTREAM_TIMEOUT_MS",
                reason: e.to_string(),
            })?,
            None => 5_000,
        };
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "UPSTREAM_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let internal_secret = lookup("INTERNAL_SHARED_SECRET").filter(|s| !s.is_empty());

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let avatar_internal_prefix =
            lookup("AVATAR_INTERNAL_PREFIX").unwrap_or_else(|| "http://minio:9000/".to_string());

        Ok(Config {
            host,
            port,
            auth_service_url,
            user_service_url,
            internal_secret,
            upstream_timeout: Duration::from_millis(timeout_ms),
            public_base_url,
            avatar_internal_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    const UPSTREAMS: [(&str, &str); 2] = [
        ("AUTH_SERVICE_URL", "http://auth-service:8080/"),
        ("USER_SERVICE_URL", "http://user-service:8081"),
    ];

    #[test]
    fn test_defaults() {
        let config = config(&UPSTREAMS).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.auth_service_url, "http://auth-service:8080");
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.public_base_url, "http://localhost:8000");
        assert_eq!(config.avatar_internal_prefix, "http://minio:9000/");
        assert!(config.internal_secret.is_none());
    }

    #[test]
    fn test_app_port_fallback() {
        let mut vars = UPSTREAMS.to_vec();
        vars.push(("APP_PORT", "9000"));
        assert_eq!(config(&vars).unwrap().port, 9000);

        vars.push(("PORT", "9100"));
        assert_eq!(config(&vars).unwrap().port, 9100);
    }

    #[test]
    fn test_upstreams_required() {
        assert!(matches!(
            config(&[("USER_SERVICE_URL", "http://user-service:8081")]),
            Err(ConfigError::Missing("AUTH_SERVICE_URL"))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut vars = UPSTREAMS.to_vec();
        vars.push(("UPSTREAM_TIMEOUT_MS", "0"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::Invalid { key: "UPSTREAM_TIMEOUT_MS", .. })
        ));
    }
}
