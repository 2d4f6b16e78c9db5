use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default request body limit for uploads (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub uploads: UploadConfig,
    /// Directory served for any path that is not an API route.
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Staging directory for files attached to in-flight requests.
    pub dir: String,
    pub max_bytes: usize,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let mut common = core_config::Config::load()?;
        if let Ok(port) = env::var("PORT") {
            common.port = port
                .parse()
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid PORT {}: {}", port, e)))?;
        }

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RelayConfig {
            common,
            gemini: GeminiSettings {
                api_key: get_env("GEMINI_API_KEY", None, is_prod)?,
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                temperature: Some(parse_env(
                    "GEMINI_TEMPERATURE",
                    get_env("GEMINI_TEMPERATURE", Some("0.5"), is_prod)?,
                )?),
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
            },
            uploads: UploadConfig {
                dir: get_env("UPLOAD_DIR", Some("uploads"), is_prod)?,
                max_bytes: parse_env(
                    "MAX_UPLOAD_BYTES",
                    get_env(
                        "MAX_UPLOAD_BYTES",
                        Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            static_dir: get_env("STATIC_DIR", Some("public"), is_prod)?,
        })
    }
}

fn parse_env<T>(key: &str, raw: String) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_rejects_garbage() {
        let err = parse_env::<f32>("GEMINI_TEMPERATURE", "warm".to_string()).unwrap_err();
        assert!(err.to_string().contains("GEMINI_TEMPERATURE"));
    }

    #[test]
    fn parse_env_accepts_numbers() {
        let bytes: usize = parse_env("MAX_UPLOAD_BYTES", "1024".to_string()).unwrap();
        assert_eq!(bytes, 1024);
    }

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("GENAI_RELAY_TEST_UNSET_VARIABLE", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        assert!(get_env("GENAI_RELAY_TEST_UNSET_VARIABLE", Some("fallback"), true).is_err());
    }
}
