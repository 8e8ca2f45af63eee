//! Configuration for lexdata bots and tools.
//!
//! TOML profiles (one per wiki / account), password resolution (env +
//! keyring + plaintext), and translation to a `lexdata_api::SessionBuilder`.
//! Environment variables prefixed `LEXDATA_` override the file, with `__`
//! separating nested keys (`LEXDATA_DEFAULTS__MAXLAG=10`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use lexdata_api::{
    HttpAuth, MaxlagPolicy, SessionBuilder, TlsMode, TransportConfig, WIKIDATA_API_URL,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Service name for keyring entries (`<profile>/password`).
pub const KEYRING_SERVICE: &str = "lexdata";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("no password or token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named wiki/account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

/// Settings applied to every profile unless the profile overrides them.
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// `maxlag` sent with writes.
    #[serde(default = "default_maxlag")]
    pub maxlag: u32,

    /// `maxlag` sent with the login request.
    #[serde(default = "default_login_maxlag")]
    pub login_maxlag: u32,

    /// Maxlag retries per request; unset retries forever.
    pub max_maxlag_retries: Option<u32>,

    /// Identifying user agent; the library default is used when unset.
    pub user_agent: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            maxlag: default_maxlag(),
            login_maxlag: default_login_maxlag(),
            max_maxlag_retries: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_maxlag() -> u32 {
    5
}
fn default_login_maxlag() -> u32 {
    30
}

/// A named wiki/account profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Action API endpoint (`.../w/api.php`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Login name; `Account@BotName` for bot passwords.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Look the password up in the system keyring.
    #[serde(default = "default_true")]
    pub keyring: bool,

    /// Pre-issued CSRF token, used instead of a password login.
    pub token: Option<String>,

    /// HTTP basic auth in front of the wiki.
    pub http_username: Option<String>,
    pub http_password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub timeout: Option<u64>,
    pub maxlag: Option<u32>,
    pub max_maxlag_retries: Option<u32>,
    pub user_agent: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
            password_env: None,
            keyring: true,
            token: None,
            http_username: None,
            http_password: None,
            ca_cert: None,
            timeout: None,
            maxlag: None,
            max_maxlag_retries: None,
            user_agent: None,
        }
    }
}

fn default_endpoint() -> String {
    WIKIDATA_API_URL.into()
}
fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "lexdata", "lexdata").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lexdata");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is not
/// an error; the defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LEXDATA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the login password for a profile.
///
/// `None` when the profile has no username (anonymous or token sessions)
/// or no source yields a password. Sources, first hit wins:
/// 1. the variable named by `password_env`
/// 2. `LEXDATA_PASSWORD`
/// 3. the system keyring, entry `<profile>/password` (if `keyring`)
/// 4. plaintext `password`
///
/// The keyring is queried synchronously; call this outside async code or
/// through `spawn_blocking`.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    profile.username.as_ref()?;

    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var("LEXDATA_PASSWORD") {
        return Some(SecretString::from(pw));
    }

    // 3. System keyring
    if profile.keyring {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        {
            if let Ok(pw) = entry.get_password() {
                return Some(SecretString::from(pw));
            }
        }
    }

    // 4. Plaintext in config
    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password)?;
    Ok(())
}

// ── Translation to session settings ─────────────────────────────────

/// HTTP client settings for a profile.
pub fn profile_transport(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let mut transport = TransportConfig::default()
        .with_timeout(Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)));
    if let Some(agent) = profile.user_agent.as_ref().or(defaults.user_agent.as_ref()) {
        transport = transport.with_user_agent(agent.as_str());
    }
    if let Some(ref ca_path) = profile.ca_cert {
        transport.tls = TlsMode::CustomCa(ca_path.clone());
    }
    transport
}

/// Maxlag behaviour for a profile.
pub fn profile_policy(profile: &Profile, defaults: &Defaults) -> MaxlagPolicy {
    MaxlagPolicy {
        maxlag: profile.maxlag.unwrap_or(defaults.maxlag),
        login_maxlag: defaults.login_maxlag,
        max_retries: profile.max_maxlag_retries.or(defaults.max_maxlag_retries),
        ..MaxlagPolicy::default()
    }
}

/// Build a `SessionBuilder` for a profile. Call `connect()` on the result
/// to log in.
pub fn profile_to_session_builder(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionBuilder, ConfigError> {
    let api_url: Url = profile
        .endpoint
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {}", profile.endpoint),
        })?;

    let mut builder = SessionBuilder::new(api_url)
        .transport(profile_transport(profile, defaults))
        .policy(profile_policy(profile, defaults));

    if let Some(ref username) = profile.username {
        builder = builder.username(username.as_str());
    }
    if let Some(password) = resolve_password(profile, profile_name) {
        builder = builder.password(password);
    } else if let Some(ref token) = profile.token {
        builder = builder.token(SecretString::from(token.clone()));
    } else if profile.username.is_some() {
        return Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
        });
    }

    match (&profile.http_username, &profile.http_password) {
        (Some(username), Some(password)) => {
            builder = builder.http_auth(HttpAuth {
                username: username.clone(),
                password: SecretString::from(password.clone()),
            });
        }
        (None, None) => {}
        _ => {
            return Err(ConfigError::Validation {
                field: "http_username".into(),
                reason: "http_username and http_password must be set together".into(),
            });
        }
    }

    Ok(builder)
}

/// Load the config and build a `SessionBuilder` for `profile_name` (or
/// the default profile).
pub fn session_builder(profile_name: Option<&str>) -> Result<SessionBuilder, ConfigError> {
    let config = load_config()?;
    let (name, profile) = config.profile(profile_name)?;
    profile_to_session_builder(profile, name, &config.defaults)
}
