use anyhow::Context;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Model used when nothing more specific is configured.
pub const GLOBAL_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Upstream timeouts are never shorter than this.
pub const MIN_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "oracle_relay=info,tower_http=debug,axum::rejection=info";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
}

/// Everything the relay needs to talk to the completion provider
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: Option<String>,
    /// Models a caller may request per call; empty means the request field is ignored.
    pub allowed_models: Vec<String>,
    pub magicball: EndpointSettings,
    pub astro: EndpointSettings,
}

/// Per-endpoint generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSettings {
    pub model_override: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl EndpointSettings {
    pub fn magicball_defaults() -> Self {
        Self {
            model_override: None,
            max_tokens: 1200,
            temperature: 0.85,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn astro_defaults() -> Self {
        Self {
            model_override: None,
            max_tokens: 3500,
            temperature: 0.8,
            timeout: Duration::from_secs(90),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let magicball =
            endpoint_settings(&var, "MAGICBALL", EndpointSettings::magicball_defaults())?;
        let astro = endpoint_settings(&var, "ASTRO", EndpointSettings::astro_defaults())?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 3000)?,
            upstream: UpstreamConfig {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                default_model: var("OPENAI_MODEL"),
                allowed_models: var("OPENAI_ALLOWED_MODELS")
                    .map(|list| {
                        list.split(',')
                            .map(str::trim)
                            .filter(|m| !m.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
                magicball,
                astro,
            },
        })
    }

    /// Convenience for tests and tools: configuration from a fixed set of pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Self> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl UpstreamConfig {
    /// Resolves the model identifier for one call.
    ///
    /// Precedence: explicit per-call value (only when listed in `allowed_models`),
    /// then the endpoint override, then the configured default chat model, then
    /// [`GLOBAL_DEFAULT_MODEL`].
    pub fn resolve_model(&self, settings: &EndpointSettings, explicit: Option<&str>) -> String {
        let explicit = explicit.map(str::trim).filter(|m| !m.is_empty());
        let permitted = explicit.filter(|m| self.allowed_models.iter().any(|a| a == *m));
        if let (Some(requested), None) = (explicit, permitted) {
            warn!("Ignoring requested model {:?}, not in OPENAI_ALLOWED_MODELS", requested);
        }

        [
            permitted,
            settings.model_override.as_deref(),
            self.default_model.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(GLOBAL_DEFAULT_MODEL)
        .to_string()
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("allowed_models", &self.allowed_models)
            .field("magicball", &self.magicball)
            .field("astro", &self.astro)
            .finish()
    }
}

fn endpoint_settings<F>(
    var: &F,
    prefix: &str,
    defaults: EndpointSettings,
) -> anyhow::Result<EndpointSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let timeout_ms = parse_or(
        var,
        &format!("{prefix}_TIMEOUT_MS"),
        defaults.timeout.as_millis() as u64,
    )?;
    let mut timeout = Duration::from_millis(timeout_ms);
    if timeout < MIN_UPSTREAM_TIMEOUT {
        warn!(
            "{}_TIMEOUT_MS={} is below the {}s floor, using the floor",
            prefix,
            timeout_ms,
            MIN_UPSTREAM_TIMEOUT.as_secs()
        );
        timeout = MIN_UPSTREAM_TIMEOUT;
    }

    Ok(EndpointSettings {
        model_override: var(&format!("OPENAI_{prefix}_MODEL")).or(defaults.model_override),
        max_tokens: parse_or(var, &format!("{prefix}_MAX_TOKENS"), defaults.max_tokens)?,
        temperature: parse_or(var, &format!("{prefix}_TEMPERATURE"), defaults.temperature)?,
        timeout,
    })
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid number, got {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_pairs(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.upstream.api_key, None);
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.magicball, EndpointSettings::magicball_defaults());
        assert_eq!(config.upstream.astro, EndpointSettings::astro_defaults());
        assert!(config.upstream.astro.timeout > config.upstream.magicball.timeout);
        assert!(config.upstream.astro.max_tokens > config.upstream.magicball.max_tokens);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_pairs(&[
            ("PORT", "8081"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9999/v1/"),
            ("ASTRO_MAX_TOKENS", "4000"),
            ("MAGICBALL_TEMPERATURE", "0.8"),
            ("ASTRO_TIMEOUT_MS", "120000"),
        ])
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.upstream.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.upstream.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
        assert_eq!(config.upstream.astro.max_tokens, 4000);
        assert_eq!(config.upstream.magicball.temperature, 0.8);
        assert_eq!(config.upstream.astro.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_timeout_floor() {
        let config = Config::from_pairs(&[("MAGICBALL_TIMEOUT_MS", "500")]).unwrap();
        assert_eq!(config.upstream.magicball.timeout, MIN_UPSTREAM_TIMEOUT);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = Config::from_pairs(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = Config::from_pairs(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.upstream.api_key, None);
    }

    #[test]
    fn test_model_precedence() {
        let bare = Config::from_pairs(&[]).unwrap().upstream;
        assert_eq!(
            bare.resolve_model(&bare.astro, None),
            GLOBAL_DEFAULT_MODEL
        );

        let config = Config::from_pairs(&[
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_ASTRO_MODEL", "gpt-4.1"),
            ("OPENAI_ALLOWED_MODELS", "o3-mini, gpt-4o-mini"),
        ])
        .unwrap()
        .upstream;
        assert_eq!(config.resolve_model(&config.magicball, None), "gpt-4o");
        assert_eq!(config.resolve_model(&config.astro, None), "gpt-4.1");
        assert_eq!(
            config.resolve_model(&config.magicball, Some("gpt-4o-mini")),
            "gpt-4o-mini"
        );
        assert_eq!(
            config.resolve_model(&config.astro, Some("o3-mini")),
            "o3-mini"
        );
        assert_eq!(config.resolve_model(&config.astro, Some("  ")), "gpt-4.1");
    }

    #[test]
    fn test_endpoint_model_overrides() {
        let config = Config::from_pairs(&[
            ("OPENAI_MAGICBALL_MODEL", "gpt-4o-mini"),
            ("OPENAI_ASTRO_MODEL", "gpt-4o"),
        ])
        .unwrap();
        assert_eq!(
            config.upstream.magicball.model_override.as_deref(),
            Some("gpt-4o-mini")
        );
        assert_eq!(config.upstream.astro.model_override.as_deref(), Some("gpt-4o"));
        assert_eq!(config.upstream.magicball.max_tokens, 1200);
    }

    #[test]
    fn test_unlisted_request_model_is_ignored() {
        let config = Config::from_pairs(&[("OPENAI_MODEL", "gpt-4o-mini")])
            .unwrap()
            .upstream;
        assert!(config.allowed_models.is_empty());
        assert_eq!(
            config.resolve_model(&config.astro, Some("o1-pro")),
            "gpt-4o-mini"
        );

        let listed = Config::from_pairs(&[("OPENAI_ALLOWED_MODELS", "gpt-4o")])
            .unwrap()
            .upstream;
        assert_eq!(listed.allowed_models, vec!["gpt-4o".to_string()]);
        assert_eq!(
            listed.resolve_model(&listed.astro, Some("o1-pro")),
            GLOBAL_DEFAULT_MODEL
        );
        assert_eq!(listed.resolve_model(&listed.astro, Some(" gpt-4o ")), "gpt-4o");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::from_pairs(&[("OPENAI_API_KEY", "sk-secret-value")]).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("***"));
    }
}
