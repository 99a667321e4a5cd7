//! # loginsrv-axum
//!
//! Mounts loginsrv handlers into an [axum](https://docs.rs/axum) app.
//!
//! [`construct`] is the handler factory for
//! [`loginsrv_directive::setup`], and [`Chain`] is the middleware chain it
//! registers into. Once setup is done, [`Chain::apply`] wraps the app's
//! router with one [`LoginLayer`] per `login` block:
//!
//! ```rust,ignore
//! use loginsrv_axum::{Chain, construct};
//! use loginsrv_directive::{ProcessEnv, parse, setup};
//!
//! let mut chain = Chain::default();
//! setup(parse("Caddyfile", &source)?, &ProcessEnv::default(), &construct, &mut chain)?;
//!
//! let app = chain.apply(axum::Router::new().route("/", get(index)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub use axum;

pub mod auth;
pub mod chain;
pub mod handler;
pub mod layer;

pub use chain::Chain;
pub use handler::{LoginHandler, construct};
pub use layer::{LoginLayer, LoginService};
