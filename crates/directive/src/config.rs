//! The typed loginsrv configuration and its defaults.

use rand::{Rng, distr::Alphanumeric};
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

/// Provider name to provider options, e.g. `simple` to `{bob: secret}`.
pub type Providers = BTreeMap<String, BTreeMap<String, String>>;

/// Backend providers, each bound through a directive of the same name.
pub const BACKENDS: &[&str] = &["htpasswd", "httpupstream", "osiam", "simple"];

/// OAuth providers, each bound through a directive of the same name.
pub const OAUTH_PROVIDERS: &[&str] = &["bitbucket", "facebook", "github", "gitlab", "google"];

static DEFAULT_SECRET: LazyLock<String> = LazyLock::new(|| generate_secret(32));

/// Configuration of a login handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoginConfig {
    pub host: String,
    pub port: String,
    pub log_level: String,
    pub text_logging: bool,
    #[serde(serialize_with = "redacted")]
    pub jwt_secret: String,
    pub jwt_secret_file: String,
    pub jwt_algo: String,
    #[serde(serialize_with = "human_duration")]
    pub jwt_expiry: Duration,
    pub jwt_refreshes: u32,
    pub success_url: String,
    pub redirect: bool,
    pub redirect_query_parameter: String,
    pub redirect_check_referer: bool,
    pub redirect_host_file: String,
    pub logout_url: String,
    pub template: String,
    pub login_path: String,
    pub cookie_name: String,
    /// Zero means a session cookie.
    #[serde(serialize_with = "human_duration")]
    pub cookie_expiry: Duration,
    pub cookie_domain: String,
    pub cookie_http_only: bool,
    pub cookie_secure: bool,
    pub backends: Providers,
    pub oauth: Providers,
    #[serde(serialize_with = "human_duration")]
    pub grace_period: Duration,
    pub user_file: String,
    pub user_endpoint: String,
    pub user_endpoint_token: String,
    #[serde(serialize_with = "human_duration")]
    pub user_endpoint_timeout: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: "6789".into(),
            log_level: "info".into(),
            text_logging: false,
            jwt_secret: DEFAULT_SECRET.clone(),
            jwt_secret_file: String::new(),
            jwt_algo: "HS512".into(),
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
            jwt_refreshes: 0,
            success_url: "/".into(),
            redirect: true,
            redirect_query_parameter: "backTo".into(),
            redirect_check_referer: true,
            redirect_host_file: String::new(),
            logout_url: String::new(),
            template: String::new(),
            login_path: "/login".into(),
            cookie_name: "jwt_token".into(),
            cookie_expiry: Duration::ZERO,
            cookie_domain: String::new(),
            cookie_http_only: true,
            cookie_secure: true,
            backends: Providers::new(),
            oauth: Providers::new(),
            grace_period: Duration::from_secs(5),
            user_file: String::new(),
            user_endpoint: String::new(),
            user_endpoint_token: String::new(),
            user_endpoint_timeout: Duration::from_secs(5),
        }
    }
}

impl LoginConfig {
    /// Defaults for a config embedded in a host server.
    ///
    /// Host, port and log level belong to the host, so they are cleared and
    /// the directive registry does not expose them.
    pub fn for_directive() -> Self {
        Self {
            host: String::new(),
            port: String::new(),
            log_level: String::new(),
            ..Self::default()
        }
    }

    /// Whether any backend or oauth provider is configured.
    pub fn has_providers(&self) -> bool {
        !self.backends.is_empty() || !self.oauth.is_empty()
    }
}

fn generate_secret(length: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

fn redacted<S: Serializer>(secret: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if secret.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("<redacted>")
    }
}

fn human_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*duration))
}
