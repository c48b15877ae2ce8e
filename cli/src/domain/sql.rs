//! SQL statements issued during an update.
//!
//! Every literal goes through [`sql_quote`]; nothing else in the crate
//! assembles SQL.

use crate::domain::credential::Credential;
use crate::domain::environment::AdminCredentials;
use crate::domain::routes::{RouteTable, UrlBucket};

/// Row id of the admin account created by the installer.
pub const ADMIN_USER_ID: u32 = 1;

/// Stand-in for `.` in domains stored by older environments.
pub const DOT_PLACEHOLDER: &str = "---";

/// Quote `value` as a MySQL string literal.
#[must_use]
pub fn sql_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Terminate `statement` with `;` if it is not already.
#[must_use]
pub fn terminate(statement: &str) -> String {
    if statement.ends_with(';') {
        statement.to_string()
    } else {
        format!("{statement};")
    }
}

/// Reset the admin account to the configured identity and password.
#[must_use]
pub fn update_admin_user(admin: &AdminCredentials, password: &Credential) -> String {
    format!(
        "update admin_user set firstname = {}, lastname = {}, email = {}, username = {}, password = {} where user_id = {};",
        sql_quote(&admin.firstname),
        sql_quote(&admin.lastname),
        sql_quote(&admin.email),
        sql_quote(&admin.username),
        sql_quote(&password.to_string()),
        sql_quote(&ADMIN_USER_ID.to_string()),
    )
}

/// Base URL updates for every classified route, unsecure bucket first.
///
/// The primary route replaces the default-scope value. Other routes replace
/// any stored value for their domain, matched both literally and with dots
/// written as [`DOT_PLACEHOLDER`].
#[must_use]
pub fn update_base_urls(routes: &RouteTable) -> Vec<String> {
    routes
        .iter_buckets()
        .flat_map(|(bucket, urls)| {
            urls.iter()
                .map(move |(suffix, url)| update_base_url(bucket, suffix, url))
        })
        .collect()
}

fn update_base_url(bucket: UrlBucket, suffix: &str, url: &str) -> String {
    let path = sql_quote(&format!("web/{}/base_url", bucket.as_str()));
    if suffix.is_empty() {
        return format!(
            "update core_config_data set value = {} where path = {path} and scope_id = '0';",
            sql_quote(url),
        );
    }
    let like = format!("{}{suffix}%", bucket.prefix());
    let like_placeholder = format!(
        "{}{}%",
        bucket.prefix(),
        suffix.replace('.', DOT_PLACEHOLDER)
    );
    format!(
        "update core_config_data set value = {} where path = {path} and (value like {} or value like {});",
        sql_quote(url),
        sql_quote(&like),
        sql_quote(&like_placeholder),
    )
}
