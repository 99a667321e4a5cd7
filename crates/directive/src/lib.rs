//! # loginsrv-directive
//!
//! Turns `login` directive blocks from a host server's configuration file
//! into a typed [`LoginConfig`] and hands it to a handler factory.
//!
//! ```text
//! login /login {
//!     simple      bob=secret
//!     cookie-name auth
//!     jwt-expiry  1h
//! }
//! ```
//!
//! Setup runs per block occurrence: the sub-directives are bound onto the
//! config through the [`FieldRegistry`], the signing secret is reconciled
//! with the process environment, and the constructed handler is registered
//! with the host's middleware chain.
//!
//! ```rust,ignore
//! use loginsrv_directive::{ProcessEnv, parse, setup};
//!
//! let blocks = parse("Caddyfile", &source)?;
//! setup(blocks, &ProcessEnv::default(), &factory, &mut chain)?;
//! ```

pub mod bind;
pub mod config;
pub mod error;
pub mod registry;
pub mod secret;
pub mod setup;
pub mod token;

pub use bind::Binder;
pub use config::{LoginConfig, Providers};
pub use error::{Diagnostic, Error, FieldError};
pub use registry::{Field, FieldKind, FieldRegistry};
pub use secret::{MemorySecret, ProcessEnv, SECRET_ENV, SecretProvider, reconcile};
pub use setup::{DIRECTIVE, HandlerFactory, MiddlewareChain, setup};
pub use token::{Block, Directive, Position, parse};
