//! Path-scoped login middleware.
//!
//! Every request is authenticated; valid claims are inserted into the request
//! extensions so later handlers can see who is logged in. Requests are never
//! rejected here. Requests whose path starts with the scope path are served
//! by the login handler, everything else continues down the chain.

use crate::auth::Authenticator;
use futures::future::BoxFuture;
use http::{Request, Response};
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::ServiceExt;
use tracing::trace;

/// Tower [`Layer`](tower::Layer) that applies [`LoginService`].
#[derive(Clone)]
pub struct LoginLayer<A, H> {
    path: Arc<str>,
    authenticator: A,
    handler: H,
}

impl<A, H> LoginLayer<A, H> {
    pub fn new(path: impl Into<Arc<str>>, authenticator: A, handler: H) -> Self {
        Self {
            path: path.into(),
            authenticator,
            handler,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<A, H, S> tower::Layer<S> for LoginLayer<A, H>
where
    A: Clone,
    H: Clone,
{
    type Service = LoginService<A, H, S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoginService {
            path: self.path.clone(),
            authenticator: self.authenticator.clone(),
            handler: self.handler.clone(),
            inner,
        }
    }
}

/// Tower service that routes the scope path to the login handler.
#[derive(Clone)]
pub struct LoginService<A, H, S> {
    path: Arc<str>,
    authenticator: A,
    handler: H,
    inner: S,
}

impl<A, H, S, B> tower::Service<Request<B>> for LoginService<A, H, S>
where
    A: Authenticator,
    S: tower::Service<Request<B>, Response = Response<axum::body::Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send,
    H: tower::Service<Request<B>, Response = S::Response, Error = S::Error>
        + Clone
        + Send
        + 'static,
    H::Future: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let path = self.path.clone();
        let authenticator = self.authenticator.clone();
        let handler = self.handler.clone();
        let mut inner = self.inner.clone();
        // swap to ensure poll_ready state is preserved
        std::mem::swap(&mut self.inner, &mut inner);

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let claims = authenticator.authenticate(&parts).await;

            let mut req = Request::from_parts(parts, body);
            match claims {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                }
                Err(err) => trace!(error = %err, "request carries no valid token"),
            }

            if req.uri().path().starts_with(&*path) {
                handler.oneshot(req).await
            } else {
                inner.call(req).await
            }
        })
    }
}
