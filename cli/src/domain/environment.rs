//! Platform environment decoding.
//!
//! The platform passes routes, service relationships and project variables
//! as base64-encoded JSON documents. This module turns them into one
//! immutable [`EnvironmentContext`]; variable lookup is injected so nothing
//! here touches the process environment.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::error::DeployError;
use crate::domain::routes::{RouteEntry, RouteTable, classify};
use crate::domain::settings::DeploySettings;

pub const ROUTES_VAR: &str = "PLATFORM_ROUTES";
pub const RELATIONSHIPS_VAR: &str = "PLATFORM_RELATIONSHIPS";
pub const VARIABLES_VAR: &str = "PLATFORM_VARIABLES";
pub const BRANCH_VAR: &str = "PLATFORM_ENVIRONMENT";

// ── Typed views ──────────────────────────────────────────────────────────────

/// Connection parameters of the primary database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbCredentials {
    pub host: String,
    pub name: String,
    pub user: String,
    /// Empty when the service has no password.
    pub password: String,
}

/// Location of the Redis service used for cache backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub scheme: String,
    pub port: u16,
}

/// Administrative account and backend URL segment.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    /// Backend front name, e.g. `admin` for `/admin`.
    pub url: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("email", &self.email)
            .field("password", &"****")
            .field("url", &self.url)
            .finish()
    }
}

/// Application run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationMode {
    #[default]
    Production,
    Developer,
}

impl ApplicationMode {
    /// Parse an exact mode name; anything else is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "production" => Some(Self::Production),
            "developer" => Some(Self::Developer),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for ApplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Project variables ────────────────────────────────────────────────────────

/// Free-form project variables with the documented defaults.
#[derive(Debug, Clone, Default)]
pub struct DeploymentVariables {
    values: Map<String, Value>,
}

impl DeploymentVariables {
    pub const DEFAULTS: &'static [(&'static str, &'static str)] = &[
        ("ADMIN_USERNAME", "admin"),
        ("ADMIN_FIRSTNAME", "John"),
        ("ADMIN_LASTNAME", "Doe"),
        ("ADMIN_EMAIL", "john@example.com"),
        ("ADMIN_PASSWORD", "admin12"),
        ("ADMIN_URL", "admin"),
    ];

    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// A set variable as text. `null` and structured values count as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The variable, or its documented default.
    #[must_use]
    pub fn get_or_default(&self, key: &str) -> String {
        self.get(key).unwrap_or_else(|| {
            Self::DEFAULTS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_default()
        })
    }

    #[must_use]
    pub fn admin(&self) -> AdminCredentials {
        AdminCredentials {
            username: self.get_or_default("ADMIN_USERNAME"),
            firstname: self.get_or_default("ADMIN_FIRSTNAME"),
            lastname: self.get_or_default("ADMIN_LASTNAME"),
            email: self.get_or_default("ADMIN_EMAIL"),
            password: self.get_or_default("ADMIN_PASSWORD"),
            url: self.get_or_default("ADMIN_URL"),
        }
    }

    /// `APPLICATION_MODE`, silently dropped unless it names a known mode.
    #[must_use]
    pub fn application_mode(&self) -> Option<ApplicationMode> {
        self.get("APPLICATION_MODE")
            .as_deref()
            .and_then(ApplicationMode::parse)
    }
}

// ── Context ──────────────────────────────────────────────────────────────────

/// Everything a deploy run needs from the platform, decoded once.
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
    pub routes: RouteTable,
    pub db: DbCredentials,
    pub redis: RedisConfig,
    pub admin: AdminCredentials,
    /// Validated `APPLICATION_MODE`, `None` when unset or invalid.
    pub mode: Option<ApplicationMode>,
    /// Git branch of the environment, when the platform exposes it.
    pub branch: Option<String>,
}

impl EnvironmentContext {
    /// Decode the platform environment.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Configuration`] if a transport variable is
    /// missing or undecodable, or if a configured relationship is absent.
    pub fn load(
        lookup: impl Fn(&str) -> Option<String>,
        settings: &DeploySettings,
    ) -> Result<Self, DeployError> {
        let routes: Map<String, Value> = decode_document(ROUTES_VAR, lookup(ROUTES_VAR))?;
        let relationships: Map<String, Value> =
            decode_document(RELATIONSHIPS_VAR, lookup(RELATIONSHIPS_VAR))?;
        let variables = DeploymentVariables::new(decode_document(
            VARIABLES_VAR,
            lookup(VARIABLES_VAR),
        )?);

        let routes = classify_routes(&routes)?;
        let db = database_credentials(&relationships, &settings.database_service)?;
        let redis = redis_config(&relationships, &settings.cache_service)?;

        Ok(Self {
            routes,
            db,
            redis,
            admin: variables.admin(),
            mode: variables.application_mode(),
            branch: lookup(BRANCH_VAR).filter(|b| !b.is_empty()),
        })
    }

    /// Mode to enforce: the configured one, production otherwise.
    #[must_use]
    pub fn desired_mode(&self) -> ApplicationMode {
        self.mode.unwrap_or_default()
    }

    #[must_use]
    pub fn is_primary_branch(&self, primary: &str) -> bool {
        self.branch.as_deref() == Some(primary)
    }
}

/// Decode one base64 JSON transport variable.
///
/// An empty JSON array is accepted as an empty object, since that is how the
/// platform encodes an empty map.
///
/// # Errors
///
/// Returns [`DeployError::Configuration`] naming `name` when the variable is
/// unset, not base64, not JSON, or not of the expected shape.
pub fn decode_document<T: DeserializeOwned>(
    name: &str,
    raw: Option<String>,
) -> Result<T, DeployError> {
    let raw = raw.ok_or_else(|| DeployError::configuration(format!("{name} is not set")))?;
    let bytes = BASE64_STANDARD
        .decode(raw.trim())
        .map_err(|e| DeployError::configuration(format!("{name} is not valid base64: {e}")))?;
    let mut value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| DeployError::configuration(format!("{name} is not valid JSON: {e}")))?;
    if matches!(&value, Value::Array(items) if items.is_empty()) {
        value = Value::Object(Map::new());
    }
    serde_json::from_value(value)
        .map_err(|e| DeployError::configuration(format!("{name} has an unexpected shape: {e}")))
}

fn classify_routes(raw: &Map<String, Value>) -> Result<RouteTable, DeployError> {
    let mut entries = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        let entry: RouteEntry = serde_json::from_value(value.clone()).map_err(|e| {
            DeployError::configuration(format!("{ROUTES_VAR} route '{key}' is invalid: {e}"))
        })?;
        entries.push((key.as_str(), entry));
    }
    Ok(classify(entries.iter().map(|(k, e)| (*k, e))))
}

#[derive(Deserialize)]
struct DatabaseRelationship {
    host: String,
    path: String,
    username: String,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
struct RedisRelationship {
    host: String,
    #[serde(default)]
    scheme: Option<String>,
    port: Value,
}

/// First instance of the named relationship, deserialized.
fn first_instance<T: DeserializeOwned>(
    relationships: &Map<String, Value>,
    service: &str,
) -> Result<T, DeployError> {
    let first = relationships
        .get(service)
        .and_then(|list| list.get(0))
        .ok_or_else(|| {
            DeployError::configuration(format!(
                "relationship '{service}' not found in {RELATIONSHIPS_VAR}"
            ))
        })?;
    serde_json::from_value(first.clone()).map_err(|e| {
        DeployError::configuration(format!("relationship '{service}' is invalid: {e}"))
    })
}

fn database_credentials(
    relationships: &Map<String, Value>,
    service: &str,
) -> Result<DbCredentials, DeployError> {
    let rel: DatabaseRelationship = first_instance(relationships, service)?;
    Ok(DbCredentials {
        host: rel.host,
        name: rel.path,
        user: rel.username,
        password: rel.password.unwrap_or_default(),
    })
}

fn redis_config(
    relationships: &Map<String, Value>,
    service: &str,
) -> Result<RedisConfig, DeployError> {
    let rel: RedisRelationship = first_instance(relationships, service)?;
    let port = match &rel.port {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        DeployError::configuration(format!(
            "relationship '{service}' has an invalid port: {}",
            rel.port
        ))
    })?;
    Ok(RedisConfig {
        host: rel.host,
        scheme: rel.scheme.unwrap_or_else(|| "redis".to_string()),
        port,
    })
}
