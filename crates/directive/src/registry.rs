//! Directive name to config field bindings.
//!
//! Each [`Field`] carries a tagged setter that knows how to parse one string
//! argument into the field's native type. The registry is built from the
//! declared schema and gives O(1) lookup by directive name.

use crate::{
    config::{BACKENDS, LoginConfig, OAUTH_PROVIDERS, Providers},
    error::FieldError,
};
use std::{collections::HashMap, fmt, time::Duration};

/// Directives that belong to the host server when embedded.
const HOST_FIELDS: &[&str] = &["host", "port", "log-level"];

/// The type a field's argument is parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Integer,
    Duration,
    Options,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "string",
            Self::Flag => "bool",
            Self::Integer => "int",
            Self::Duration => "duration",
            Self::Options => "options",
        };
        f.pad(name)
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Text(fn(&mut LoginConfig) -> &mut String),
    Flag(fn(&mut LoginConfig) -> &mut bool),
    Integer(fn(&mut LoginConfig) -> &mut u32),
    Duration(fn(&mut LoginConfig) -> &mut Duration),
    Options {
        provider: &'static str,
        target: fn(&mut LoginConfig) -> &mut Providers,
    },
}

/// A config field reachable by directive name.
#[derive(Clone, Copy)]
pub struct Field {
    name: &'static str,
    usage: &'static str,
    slot: Slot,
}

impl Field {
    fn text(
        name: &'static str,
        usage: &'static str,
        slot: fn(&mut LoginConfig) -> &mut String,
    ) -> Self {
        Self {
            name,
            usage,
            slot: Slot::Text(slot),
        }
    }

    fn flag(
        name: &'static str,
        usage: &'static str,
        slot: fn(&mut LoginConfig) -> &mut bool,
    ) -> Self {
        Self {
            name,
            usage,
            slot: Slot::Flag(slot),
        }
    }

    fn integer(
        name: &'static str,
        usage: &'static str,
        slot: fn(&mut LoginConfig) -> &mut u32,
    ) -> Self {
        Self {
            name,
            usage,
            slot: Slot::Integer(slot),
        }
    }

    fn duration(
        name: &'static str,
        usage: &'static str,
        slot: fn(&mut LoginConfig) -> &mut Duration,
    ) -> Self {
        Self {
            name,
            usage,
            slot: Slot::Duration(slot),
        }
    }

    fn options(
        provider: &'static str,
        usage: &'static str,
        target: fn(&mut LoginConfig) -> &mut Providers,
    ) -> Self {
        Self {
            name: provider,
            usage,
            slot: Slot::Options { provider, target },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn usage(&self) -> &'static str {
        self.usage
    }

    pub fn kind(&self) -> FieldKind {
        match self.slot {
            Slot::Text(_) => FieldKind::Text,
            Slot::Flag(_) => FieldKind::Flag,
            Slot::Integer(_) => FieldKind::Integer,
            Slot::Duration(_) => FieldKind::Duration,
            Slot::Options { .. } => FieldKind::Options,
        }
    }

    /// Parse `value` and write it into the field.
    ///
    /// The config is untouched when parsing fails.
    pub fn set(&self, config: &mut LoginConfig, value: &str) -> Result<(), FieldError> {
        match self.slot {
            Slot::Text(slot) => *slot(config) = value.to_owned(),
            Slot::Flag(slot) => *slot(config) = parse_flag(value)?,
            Slot::Integer(slot) => {
                *slot(config) = value.parse().map_err(|source| FieldError::Integer {
                    value: value.to_owned(),
                    source,
                })?;
            }
            Slot::Duration(slot) => {
                *slot(config) =
                    humantime::parse_duration(value).map_err(|source| FieldError::Duration {
                        value: value.to_owned(),
                        source,
                    })?;
            }
            Slot::Options { provider, target } => {
                let options = parse_options(value)?;
                target(config).insert(provider.to_owned(), options);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Lookup table of bindable fields.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: HashMap<&'static str, Field>,
}

impl FieldRegistry {
    /// Every field of [`LoginConfig`].
    pub fn all() -> Self {
        let fields = schema().into_iter().map(|f| (f.name, f)).collect();
        Self { fields }
    }

    /// The fields settable from inside a host's `login` block.
    pub fn for_directive() -> Self {
        Self::all().without(HOST_FIELDS)
    }

    /// Drop the named fields from the registry.
    pub fn without(mut self, names: &[&str]) -> Self {
        for name in names {
            self.fields.remove(*name);
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields sorted by name.
    pub fn fields(&self) -> Vec<&Field> {
        let mut fields: Vec<_> = self.fields.values().collect();
        fields.sort_by_key(|f| f.name);
        fields
    }
}

/// The declared schema of [`LoginConfig`].
fn schema() -> Vec<Field> {
    let mut fields = vec![
        Field::text("host", "The host to listen on", |c| &mut c.host),
        Field::text("port", "The port to listen on", |c| &mut c.port),
        Field::text("log-level", "The log level", |c| &mut c.log_level),
        Field::flag("text-logging", "Log in text format instead of json", |c| &mut c.text_logging),
        Field::text("jwt-secret", "The secret to sign the jwt token", |c| &mut c.jwt_secret),
        Field::text("jwt-secret-file", "Path to a file containing the jwt secret", |c| {
            &mut c.jwt_secret_file
        }),
        Field::text("jwt-algo", "The signing algorithm to use (HS256, HS384, HS512)", |c| {
            &mut c.jwt_algo
        }),
        Field::duration("jwt-expiry", "The expiry duration for the jwt token", |c| &mut c.jwt_expiry),
        Field::integer("jwt-refreshes", "The maximum number of jwt token refreshes", |c| {
            &mut c.jwt_refreshes
        }),
        Field::text("success-url", "The url to redirect after login", |c| &mut c.success_url),
        Field::flag("redirect", "Allow dynamic overwriting of the success url", |c| &mut c.redirect),
        Field::text("redirect-query-parameter", "Query parameter for the redirect target", |c| {
            &mut c.redirect_query_parameter
        }),
        Field::flag("redirect-check-referer", "Check the referer header on redirects", |c| {
            &mut c.redirect_check_referer
        }),
        Field::text("redirect-host-file", "File with hosts allowed as redirect targets", |c| {
            &mut c.redirect_host_file
        }),
        Field::text("logout-url", "The url or path to redirect after logout", |c| &mut c.logout_url),
        Field::text("template", "An alternative template for the login form", |c| &mut c.template),
        Field::text("login-path", "The path of the login resource", |c| &mut c.login_path),
        Field::text("cookie-name", "The name of the jwt cookie", |c| &mut c.cookie_name),
        Field::duration("cookie-expiry", "The expiry duration for the cookie, 0 for session", |c| {
            &mut c.cookie_expiry
        }),
        Field::text("cookie-domain", "The optional domain parameter for the cookie", |c| {
            &mut c.cookie_domain
        }),
        Field::flag("cookie-http-only", "Set the cookie with the http only flag", |c| {
            &mut c.cookie_http_only
        }),
        Field::flag("cookie-secure", "Set the secure flag on the cookie", |c| &mut c.cookie_secure),
        Field::duration("grace-period", "Graceful shutdown grace period", |c| &mut c.grace_period),
        Field::text("user-file", "A yaml file with user specific data for the tokens", |c| {
            &mut c.user_file
        }),
        Field::text("user-endpoint", "URL of an endpoint providing user specific data", |c| {
            &mut c.user_endpoint
        }),
        Field::text("user-endpoint-token", "Authentication token used for the user endpoint", |c| {
            &mut c.user_endpoint_token
        }),
        Field::duration("user-endpoint-timeout", "Timeout used for the user endpoint", |c| {
            &mut c.user_endpoint_timeout
        }),
    ];
    fields.extend(
        BACKENDS
            .iter()
            .map(|&p| Field::options(p, "Backend options: key1=value1,key2=value2", |c| &mut c.backends)),
    );
    fields.extend(
        OAUTH_PROVIDERS
            .iter()
            .map(|&p| Field::options(p, "OAuth options: client_id=..,client_secret=..", |c| &mut c.oauth)),
    );
    fields
}

/// Boolean syntax as accepted by command line flags.
fn parse_flag(value: &str) -> Result<bool, FieldError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(FieldError::Flag(value.to_owned())),
    }
}

fn parse_options(value: &str) -> Result<std::collections::BTreeMap<String, String>, FieldError> {
    let options = value
        .split(',')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .ok_or_else(|| FieldError::Options(value.to_owned()))
        })
        .collect::<Result<std::collections::BTreeMap<_, _>, _>>()?;
    if options.is_empty() {
        return Err(FieldError::Options(value.to_owned()));
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use crate::{
        config::LoginConfig,
        registry::{FieldKind, FieldRegistry, schema},
    };
    use std::time::Duration;

    #[test]
    fn directive_registry_excludes_host_fields() {
        let all = FieldRegistry::all();
        let registry = FieldRegistry::for_directive();
        for name in ["host", "port", "log-level"] {
            assert!(all.lookup(name).is_some());
            assert!(registry.lookup(name).is_none());
        }
        assert_eq!(all.len(), registry.len() + 3);
    }

    #[test]
    fn every_name_is_unique() {
        let declared = schema().len();
        assert_eq!(declared, 27 + 4 + 5);
        assert_eq!(FieldRegistry::all().len(), declared);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = FieldRegistry::for_directive();
        assert!(registry.lookup("cookie-name").is_some());
        assert!(registry.lookup("Cookie-Name").is_none());
    }

    #[test]
    fn sets_each_kind() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let set = |config: &mut LoginConfig, name: &str, value: &str| {
            registry.lookup(name).unwrap().set(config, value).unwrap();
        };

        set(&mut config, "cookie-name", "auth");
        set(&mut config, "cookie-secure", "F");
        set(&mut config, "jwt-refreshes", "3");
        set(&mut config, "jwt-expiry", "1h 30m");
        set(&mut config, "simple", "bob=secret,alice=pw");

        assert_eq!(config.cookie_name, "auth");
        assert!(!config.cookie_secure);
        assert_eq!(config.jwt_refreshes, 3);
        assert_eq!(config.jwt_expiry, Duration::from_secs(90 * 60));
        assert_eq!(config.backends["simple"]["bob"], "secret");
        assert_eq!(config.backends["simple"]["alice"], "pw");
        assert!(config.oauth.is_empty());
    }

    #[test]
    fn provider_directive_replaces_previous_options() {
        let registry = FieldRegistry::for_directive();
        let github = registry.lookup("github").unwrap();
        assert_eq!(github.kind(), FieldKind::Options);

        let mut config = LoginConfig::for_directive();
        github.set(&mut config, "client_id=a,client_secret=b").unwrap();
        github.set(&mut config, "client_id=c,").unwrap();
        assert_eq!(config.oauth["github"].len(), 1);
        assert_eq!(config.oauth["github"]["client_id"], "c");
    }

    #[test]
    fn rejects_malformed_values() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let before = config.clone();

        for (name, value) in [
            ("redirect", "yes"),
            ("jwt-refreshes", "-1"),
            ("grace-period", "soon"),
            ("htpasswd", "file"),
        ] {
            let err = registry.lookup(name).unwrap().set(&mut config, value);
            assert!(err.is_err(), "{name} accepted {value:?}");
        }
        assert_eq!(config, before);
    }

    #[test]
    fn without_drops_named_fields() {
        let names = vec!["cookie-name".to_string(), "github".to_string()];
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let registry = FieldRegistry::all().without(&names);

        assert!(registry.lookup("cookie-name").is_none());
        assert!(registry.lookup("github").is_none());
        assert!(registry.lookup("cookie-domain").is_some());
        assert_eq!(registry.len(), FieldRegistry::all().len() - 2);
    }

    #[test]
    fn provider_needs_at_least_one_option() {
        let registry = FieldRegistry::for_directive();
        let simple = registry.lookup("simple").unwrap();
        let mut config = LoginConfig::for_directive();

        for value in ["", ",", ",,"] {
            assert!(simple.set(&mut config, value).is_err(), "accepted {value:?}");
        }
        assert!(config.backends.is_empty());
        assert!(!config.has_providers());
    }

    #[test]
    fn option_error_message() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let err = registry.lookup("osiam").unwrap().set(&mut config, "endpoint").unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider options have to be in the form 'key1=value1,key2=value2', but were \"endpoint\""
        );
    }
}
