//! Middleware chain collecting login handlers for an `axum` app.
//!
//! ```rust,ignore
//! use loginsrv_axum::{Chain, construct};
//! use loginsrv_directive::{ProcessEnv, parse, setup};
//!
//! let mut chain = Chain::default();
//! setup(parse("Caddyfile", &source)?, &ProcessEnv::default(), &construct, &mut chain)?;
//! let app = chain.apply(axum::Router::new().route("/", get(index)));
//! ```

use crate::{
    auth::{TokenAuth, jwt::JwtValidator},
    handler::LoginHandler,
    layer::LoginLayer,
};
use axum::Router;
use loginsrv_directive::MiddlewareChain;
use tracing::debug;

/// Login layer as mounted by [`Chain::apply`].
pub type MountedLayer = LoginLayer<TokenAuth<JwtValidator>, Router>;

/// Login handlers registered by setup, in registration order.
#[derive(Clone, Default)]
pub struct Chain {
    mounts: Vec<(String, LoginHandler)>,
}

impl Chain {
    /// Registered scope paths and their handlers.
    pub fn mounts(&self) -> impl Iterator<Item = (&str, &LoginHandler)> {
        self.mounts.iter().map(|(path, handler)| (path.as_str(), handler))
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// One layer per registered handler.
    pub fn layers(&self) -> Vec<MountedLayer> {
        self.mounts
            .iter()
            .map(|(path, handler)| {
                LoginLayer::new(
                    path.as_str(),
                    handler.authenticator().clone(),
                    handler.router().clone(),
                )
            })
            .collect()
    }

    /// Wrap `router` with every registered handler.
    ///
    /// The first registered handler ends up outermost and sees requests first.
    pub fn apply(&self, router: Router) -> Router {
        self.layers()
            .into_iter()
            .rev()
            .fold(router, |router, layer| router.layer(layer))
    }
}

impl MiddlewareChain<LoginHandler> for Chain {
    fn add_middleware(&mut self, path: String, handler: LoginHandler) {
        debug!(%path, "registering login middleware");
        self.mounts.push((path, handler));
    }
}
