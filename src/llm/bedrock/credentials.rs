//! AWS credential and region resolution
//!
//! Environment variables first, then the shared `~/.aws/credentials` and
//! `~/.aws/config` files for the selected profile.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_PROFILE: &str = "default";

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

// Keep secrets out of debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
    pub fn from_env() -> Option<Self> {
        let access_key_id = non_blank(env::var("AWS_ACCESS_KEY_ID").ok())?;
        let secret_access_key = non_blank(env::var("AWS_SECRET_ACCESS_KEY").ok())?;
        Some(Self::new(
            access_key_id,
            secret_access_key,
            non_blank(env::var("AWS_SESSION_TOKEN").ok()),
        ))
    }

    /// Credentials from one profile of a shared credentials file
    pub fn from_profile(contents: &str, profile: &str) -> Option<Self> {
        let sections = parse_ini(contents);
        let section = sections.get(profile)?;
        Some(Self::new(
            non_blank(section.get("aws_access_key_id").cloned())?,
            non_blank(section.get("aws_secret_access_key").cloned())?,
            non_blank(section.get("aws_session_token").cloned()),
        ))
    }
}

/// Profile name: configured, else `AWS_PROFILE`, else `default`
pub fn profile_name(configured: Option<&str>) -> String {
    non_blank(configured.map(str::to_string))
        .or_else(|| non_blank(env::var("AWS_PROFILE").ok()))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Resolve credentials for a profile
pub fn resolve_credentials(profile: &str) -> Result<Credentials, ConfigError> {
    if let Some(credentials) = Credentials::from_env() {
        debug!("Using AWS credentials from environment");
        return Ok(credentials);
    }

    let path = shared_file("AWS_SHARED_CREDENTIALS_FILE", "credentials")?;
    debug!("Reading AWS profile '{}' from {}", profile, path.display());
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;

    Credentials::from_profile(&contents, profile).ok_or_else(|| ConfigError::MissingField {
        section: format!("aws profile {}", profile),
        field: "aws_access_key_id/aws_secret_access_key".to_string(),
    })
}

/// Resolve the region: configured, else environment, else the profile in `~/.aws/config`
pub fn resolve_region(configured: Option<&str>, profile: &str) -> Result<String, ConfigError> {
    if let Some(region) = non_blank(configured.map(str::to_string))
        .or_else(|| non_blank(env::var("AWS_REGION").ok()))
        .or_else(|| non_blank(env::var("AWS_DEFAULT_REGION").ok()))
    {
        return Ok(region);
    }

    let missing = || ConfigError::MissingField {
        section: "bedrock".to_string(),
        field: "awsRegion".to_string(),
    };

    let path = shared_file("AWS_CONFIG_FILE", "config")?;
    let contents = fs::read_to_string(&path).map_err(|_| missing())?;
    region_from_config(&contents, profile).ok_or_else(missing)
}

/// `region` from a shared config file, where non-default profiles are `[profile name]`
pub fn region_from_config(contents: &str, profile: &str) -> Option<String> {
    let sections = parse_ini(contents);
    let key = if profile == DEFAULT_PROFILE {
        DEFAULT_PROFILE.to_string()
    } else {
        format!("profile {}", profile)
    };
    sections
        .get(&key)
        .or_else(|| sections.get(profile))
        .and_then(|s| non_blank(s.get("region").cloned()))
}

fn shared_file(env_var: &str, name: &str) -> Result<PathBuf, ConfigError> {
    if let Some(path) = non_blank(env::var(env_var).ok()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".aws").join(name))
        .ok_or(ConfigError::HomeDirNotFound)
}

/// Minimal INI reader for the AWS shared files: `[section]` headers and
/// `key = value` lines, `#`/`;` comments.
fn parse_ini(contents: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    sections
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
