//! Route classification.
//!
//! Turns the platform route document into two ordered maps, keyed by the
//! route's domain suffix, that the installer and the URL rewrite consume.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::error::DeployError;

/// Placeholder the platform substitutes with the environment's own domain.
pub const DEFAULT_DOMAIN_TOKEN: &str = "{default}";

pub const PREFIX_SECURE: &str = "https://";
pub const PREFIX_UNSECURE: &str = "http://";

/// Route type as declared by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Upstream,
    #[serde(other)]
    Other,
}

/// One value of the platform route document.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "type")]
    pub kind: RouteKind,
    /// Route as written in the routes configuration, e.g. `https://{default}/`.
    #[serde(default)]
    pub original_url: String,
}

/// Which scheme bucket a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlBucket {
    Unsecure,
    Secure,
}

impl UrlBucket {
    /// Name used in `web/<bucket>/base_url` config paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsecure => "unsecure",
            Self::Secure => "secure",
        }
    }

    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Unsecure => PREFIX_UNSECURE,
            Self::Secure => PREFIX_SECURE,
        }
    }
}

/// Classified routes. The empty suffix is the primary base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    pub unsecure: IndexMap<String, String>,
    pub secure: IndexMap<String, String>,
}

impl RouteTable {
    #[must_use]
    pub fn bucket(&self, bucket: UrlBucket) -> &IndexMap<String, String> {
        match bucket {
            UrlBucket::Unsecure => &self.unsecure,
            UrlBucket::Secure => &self.secure,
        }
    }

    /// Look up the URL for `suffix`, failing when the platform declared none.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::MissingRoute`] if the bucket has no such suffix.
    pub fn url(&self, bucket: UrlBucket, suffix: &str) -> Result<&str, DeployError> {
        self.bucket(bucket)
            .get(suffix)
            .map(String::as_str)
            .ok_or_else(|| DeployError::MissingRoute {
                bucket: bucket.as_str().to_string(),
                suffix: suffix.to_string(),
            })
    }

    /// Both buckets in the order the URL rewrite walks them.
    pub fn iter_buckets(&self) -> impl Iterator<Item = (UrlBucket, &IndexMap<String, String>)> {
        [
            (UrlBucket::Unsecure, &self.unsecure),
            (UrlBucket::Secure, &self.secure),
        ]
        .into_iter()
    }
}

/// Classify platform routes into secure and unsecure buckets.
///
/// Routes are visited in document order; later routes win for the same
/// suffix. When no secure route exists the unsecure bucket serves both.
pub fn classify<'a, I>(routes: I) -> RouteTable
where
    I: IntoIterator<Item = (&'a str, &'a RouteEntry)>,
{
    let mut table = RouteTable::default();

    for (key, entry) in routes {
        if entry.kind != RouteKind::Upstream {
            continue;
        }

        let suffix = url_host(&entry.original_url).replace(DEFAULT_DOMAIN_TOKEN, "");

        if key.starts_with(PREFIX_UNSECURE) {
            table.unsecure.insert(suffix, key.to_string());
        } else if key.starts_with(PREFIX_SECURE) {
            table.secure.insert(suffix, key.to_string());
        }
    }

    if table.secure.is_empty() {
        table.secure = table.unsecure.clone();
    }

    table
}

/// Host component of a URL, without userinfo or port.
///
/// Tolerates the platform's `{default}` placeholder, which generic URL
/// parsers reject.
#[must_use]
pub fn url_host(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return "";
    };
    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    if host.starts_with('[') {
        return host.split_inclusive(']').next().unwrap_or(host);
    }
    host.split(':').next().unwrap_or(host)
}
