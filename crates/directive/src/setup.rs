//! Setup of `login` directive occurrences.

use crate::{
    bind::Binder,
    config::LoginConfig,
    error::{Diagnostic, Error},
    registry::FieldRegistry,
    secret::{SecretProvider, reconcile},
    token::{Block, Directive},
};
use tracing::{debug, info};

/// Keyword of the directive handled by [`setup`].
pub const DIRECTIVE: &str = "login";

/// Builds the request handler for a bound configuration.
pub trait HandlerFactory {
    type Handler;

    fn construct(&self, config: LoginConfig) -> anyhow::Result<Self::Handler>;
}

impl<F, H> HandlerFactory for F
where
    F: Fn(LoginConfig) -> anyhow::Result<H>,
{
    type Handler = H;

    fn construct(&self, config: LoginConfig) -> anyhow::Result<H> {
        self(config)
    }
}

/// The host's middleware chain.
pub trait MiddlewareChain<H> {
    /// Serve requests under `path` with `handler`, ahead of the rest of the
    /// chain.
    fn add_middleware(&mut self, path: String, handler: H);
}

/// Set up every `login` block in `blocks`.
///
/// Each occurrence is bound, has its secret reconciled against `secrets`,
/// and is turned into a handler by `factory` before being registered with
/// `chain`. Blocks with another keyword are ignored. The first error stops
/// setup; the failing occurrence registers nothing.
///
/// Returns the unknown sub-directives that were skipped, across all blocks.
pub fn setup<I, P, F, C>(
    blocks: I,
    secrets: &P,
    factory: &F,
    chain: &mut C,
) -> Result<Vec<Directive>, Error>
where
    I: IntoIterator<Item = Block>,
    P: SecretProvider + ?Sized,
    F: HandlerFactory + ?Sized,
    C: MiddlewareChain<F::Handler> + ?Sized,
{
    let registry = FieldRegistry::for_directive();
    let binder = Binder::new(&registry);
    let mut skipped = Vec::new();

    for block in blocks {
        if !block.is(DIRECTIVE) {
            debug!(directive = %block.keyword.name, "not a login block, ignoring");
            continue;
        }

        let Block { keyword, body } = block;
        let path = match <[String; 1]>::try_from(keyword.args) {
            Ok([path]) => path,
            Err(args) if args.is_empty() => {
                return Err(Diagnostic::new(
                    format!("Missing path argument for {DIRECTIVE} directive"),
                    keyword.position,
                )
                .into());
            }
            Err(args) => {
                return Err(Diagnostic::new(
                    format!("Too many arguments for {DIRECTIVE} directive {args:?}"),
                    keyword.position,
                )
                .into());
            }
        };

        let mut config = LoginConfig::for_directive();
        skipped.extend(binder.bind(&mut config, body)?);
        let config = reconcile(config, secrets);

        info!(
            %path,
            position = %keyword.position,
            login_path = %config.login_path,
            cookie = %config.cookie_name,
            "mounting login handler"
        );
        let handler = factory.construct(config)?;
        chain.add_middleware(path, handler);
    }

    Ok(skipped)
}
