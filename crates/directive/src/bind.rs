use crate::{config::LoginConfig, error::Diagnostic, registry::FieldRegistry, token::Directive};
use tracing::{debug, warn};

/// Binds sub-directives onto a [`LoginConfig`] through a [`FieldRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Binder<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> Binder<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self { registry }
    }

    /// Apply each directive to `config` in order.
    ///
    /// Every directive takes exactly one argument. Names missing from the
    /// registry are skipped and returned so the caller can report them;
    /// a later directive with the same name overwrites an earlier one.
    ///
    /// The first malformed directive stops binding. Directives bound before
    /// it stay applied to `config`.
    pub fn bind<I>(
        &self,
        config: &mut LoginConfig,
        directives: I,
    ) -> Result<Vec<Directive>, Diagnostic>
    where
        I: IntoIterator<Item = Directive>,
    {
        let mut skipped = Vec::new();

        for directive in directives {
            let [value] = directive.args.as_slice() else {
                return Err(Diagnostic::new(
                    format!(
                        "Wrong number of arguments for {}: {:?}",
                        directive.name, directive.args
                    ),
                    directive.position,
                ));
            };

            let Some(field) = self.registry.lookup(&directive.name) else {
                warn!(
                    directive = %directive.name,
                    position = %directive.position,
                    "unknown login directive, skipping"
                );
                skipped.push(directive);
                continue;
            };

            field.set(config, value).map_err(|e| {
                Diagnostic::new(
                    format!("Invalid value for {}: {e}", directive.name),
                    directive.position.clone(),
                )
            })?;
            debug!(directive = %directive.name, kind = %field.kind(), "bound login directive");
        }

        Ok(skipped)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        bind::Binder,
        config::LoginConfig,
        registry::FieldRegistry,
        token::{Directive, Position},
    };

    fn at(line: usize) -> Position {
        Position::new("Caddyfile", line)
    }

    fn directive(name: &str, args: &[&str], line: usize) -> Directive {
        Directive::new(name, args.iter().copied(), at(line))
    }

    #[test]
    fn binds_only_the_named_field() {
        let registry = FieldRegistry::for_directive();
        let binder = Binder::new(&registry);

        let mut config = LoginConfig::for_directive();
        let skipped = binder
            .bind(&mut config, [directive("cookie-name", &["auth"], 2)])
            .unwrap();

        let expected = LoginConfig {
            cookie_name: "auth".into(),
            ..LoginConfig::for_directive()
        };
        assert!(skipped.is_empty());
        assert_eq!(config, expected);
    }

    #[test]
    fn order_does_not_matter() {
        let registry = FieldRegistry::for_directive();
        let binder = Binder::new(&registry);
        let a = directive("success-url", &["/home"], 2);
        let b = directive("cookie-domain", &["example.com"], 3);

        let mut forward = LoginConfig::for_directive();
        binder.bind(&mut forward, [a.clone(), b.clone()]).unwrap();
        let mut backward = LoginConfig::for_directive();
        binder.bind(&mut backward, [b, a]).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.success_url, "/home");
        assert_eq!(forward.cookie_domain, "example.com");
    }

    #[test]
    fn last_write_wins() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        Binder::new(&registry)
            .bind(
                &mut config,
                [
                    directive("login-path", &["/first"], 2),
                    directive("login-path", &["/second"], 3),
                ],
            )
            .unwrap();
        assert_eq!(config.login_path, "/second");
    }

    #[test]
    fn wrong_argument_count_is_fatal() {
        let registry = FieldRegistry::for_directive();
        let binder = Binder::new(&registry);

        let mut config = LoginConfig::for_directive();
        let err = binder
            .bind(&mut config, [directive("cookie-name", &[], 4)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments for cookie-name: [] (Caddyfile:4)"
        );

        let err = binder
            .bind(&mut config, [directive("simple", &["a=b", "c=d"], 7)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments for simple: [\"a=b\", \"c=d\"] (Caddyfile:7)"
        );
        assert!(config.backends.is_empty());
    }

    #[test]
    fn arity_is_checked_before_lookup() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let err = Binder::new(&registry)
            .bind(&mut config, [directive("no-such-thing", &["a", "b"], 3)])
            .unwrap_err();
        assert!(err.to_string().contains("no-such-thing"));
    }

    #[test]
    fn earlier_directives_stay_bound_after_failure() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let result = Binder::new(&registry).bind(
            &mut config,
            [
                directive("cookie-name", &["kept"], 2),
                directive("redirect", &["maybe"], 3),
                directive("logout-url", &["/bye"], 4),
            ],
        );

        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for redirect: invalid boolean \"maybe\" (Caddyfile:3)"
        );
        assert_eq!(config.cookie_name, "kept");
        assert!(config.logout_url.is_empty());
    }

    #[test]
    fn unknown_directives_are_skipped() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let skipped = Binder::new(&registry)
            .bind(
                &mut config,
                [
                    directive("proxy-header", &["X-User"], 2),
                    directive("cookie-name", &["after"], 3),
                ],
            )
            .unwrap();

        assert_eq!(skipped, vec![directive("proxy-header", &["X-User"], 2)]);
        assert_eq!(config.cookie_name, "after");
    }

    #[test]
    fn host_fields_are_not_bindable() {
        let registry = FieldRegistry::for_directive();
        let mut config = LoginConfig::for_directive();
        let skipped = Binder::new(&registry)
            .bind(
                &mut config,
                [
                    directive("host", &["0.0.0.0"], 2),
                    directive("port", &["80"], 3),
                    directive("log-level", &["debug"], 4),
                ],
            )
            .unwrap();

        assert_eq!(skipped.len(), 3);
        assert_eq!(config, LoginConfig::for_directive());
    }
}
