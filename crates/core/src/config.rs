use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the hosted data service.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub anon_key: SecretString,
    pub timeout_secs: u64,
}

/// Optional operator credentials. When present, commands that need an
/// authenticated principal sign in with these before touching customer rows.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub anon_key: Option<String>,
    pub auth_email: Option<String>,
    pub auth_password: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                base_url: String::new(),
                anon_key: String::new().into(),
                timeout_secs: 30,
            },
            auth: AuthConfig { email: None, password: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    remote: Option<RemotePatch>,
    auth: Option<AuthPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RemotePatch {
    base_url: Option<String>,
    anon_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthPatch {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("trackline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(remote) = patch.remote {
            if let Some(base_url) = remote.base_url {
                self.remote.base_url = base_url;
            }
            if let Some(anon_key_value) = remote.anon_key {
                self.remote.anon_key = secret_value(anon_key_value);
            }
            if let Some(timeout_secs) = remote.timeout_secs {
                self.remote.timeout_secs = timeout_secs;
            }
        }

        if let Some(auth) = patch.auth {
            if let Some(email) = auth.email {
                self.auth.email = Some(email);
            }
            if let Some(password_value) = auth.password {
                self.auth.password = Some(secret_value(password_value));
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TRACKLINE_REMOTE_BASE_URL") {
            self.remote.base_url = value;
        }
        if let Some(value) = read_env("TRACKLINE_REMOTE_ANON_KEY") {
            self.remote.anon_key = secret_value(value);
        }
        if let Some(value) = read_env("TRACKLINE_REMOTE_TIMEOUT_SECS") {
            self.remote.timeout_secs = parse_u64("TRACKLINE_REMOTE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TRACKLINE_AUTH_EMAIL") {
            self.auth.email = Some(value);
        }
        if let Some(value) = read_env("TRACKLINE_AUTH_PASSWORD") {
            self.auth.password = Some(secret_value(value));
        }

        let log_level =
            read_env("TRACKLINE_LOGGING_LEVEL").or_else(|| read_env("TRACKLINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TRACKLINE_LOGGING_FORMAT").or_else(|| read_env("TRACKLINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.remote.base_url = base_url;
        }
        if let Some(anon_key) = overrides.anon_key {
            self.remote.anon_key = secret_value(anon_key);
        }
        if let Some(auth_email) = overrides.auth_email {
            self.auth.email = Some(auth_email);
        }
        if let Some(auth_password) = overrides.auth_password {
            self.auth.password = Some(secret_value(auth_password));
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_remote(&self.remote)?;
        validate_auth(&self.auth)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    /// True when both operator credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.auth.email.is_some() && self.auth.password.is_some()
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("trackline.toml"), PathBuf::from("config/trackline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_remote(remote: &RemoteConfig) -> Result<(), ConfigError> {
    let base_url = remote.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::Validation(
            "remote.base_url is required (the project URL of the hosted data service)".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "remote.base_url must be an http(s) URL".to_string(),
        ));
    }

    if remote.anon_key.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "remote.anon_key is required (the service's publishable API key)".to_string(),
        ));
    }

    if remote.timeout_secs == 0 || remote.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "remote.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    match (&auth.email, &auth.password) {
        (Some(email), _) if !email.contains('@') => Err(ConfigError::Validation(
            "auth.email does not look like an email address".to_string(),
        )),
        (Some(_), None) => Err(ConfigError::Validation(
            "auth.password is required when auth.email is set".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::Validation(
            "auth.email is required when auth.password is set".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if LEVELS.contains(&logging.level.trim().to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "logging.level `{}` is not one of trace|debug|info|warn|error",
            logging.level
        )))
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn base_overrides() -> ConfigOverrides {
        ConfigOverrides {
            base_url: Some("https://demo.example.dev".to_string()),
            anon_key: Some("public-anon-key".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn defaults_fail_validation_without_remote_settings() {
        let err = AppConfig::load(LoadOptions::default()).expect_err("must fail");
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn overrides_satisfy_validation() {
        let config = AppConfig::load(LoadOptions {
            overrides: base_overrides(),
            ..LoadOptions::default()
        })
        .expect("load");

        assert_eq!(config.remote.base_url, "https://demo.example.dev");
        assert_eq!(config.remote.anon_key.expose_secret(), "public-anon-key");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(!config.has_credentials());
    }

    #[test]
    fn file_values_are_applied_and_overridden_by_explicit_overrides() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "[remote]\nbase_url = \"https://from-file.example.dev\"\nanon_key = \"file-key\"\ntimeout_secs = 10\n\n[logging]\nlevel = \"debug\"\nformat = \"json\""
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                base_url: Some("https://override.example.dev".to_string()),
                ..ConfigOverrides::default()
            },
        })
        .expect("load");

        assert_eq!(config.remote.base_url, "https://override.example.dev");
        assert_eq!(config.remote.anon_key.expose_secret(), "file-key");
        assert_eq!(config.remote.timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn missing_required_file_is_reported() {
        let err = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            require_file: true,
            overrides: base_overrides(),
        })
        .expect_err("must fail");

        assert!(matches!(err, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn password_without_email_is_rejected() {
        let err = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                auth_password: Some("hunter2".to_string()),
                ..base_overrides()
            },
            ..LoadOptions::default()
        })
        .expect_err("must fail");

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                base_url: Some("postgres://localhost".to_string()),
                ..base_overrides()
            },
            ..LoadOptions::default()
        })
        .expect_err("must fail");

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unterminated_interpolation_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "[remote]\nbase_url = \"${{UNCLOSED\"").expect("write config");

        let err = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: base_overrides(),
        })
        .expect_err("must fail");

        assert!(matches!(err, ConfigError::UnterminatedInterpolation));
    }
}
