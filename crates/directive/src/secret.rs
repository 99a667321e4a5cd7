//! Signing secret reconciliation.
//!
//! Several `login` blocks in one process must sign and verify tokens with the
//! same secret. The first block to run seeds a shared [`SecretProvider`] with
//! its secret. A stored secret, whether seeded by an earlier block or exported
//! by the operator before startup, takes precedence over what a block declares.

use crate::config::LoginConfig;
use std::{
    borrow::Cow,
    env::VarError,
    sync::{Mutex, PoisonError},
};
use tracing::{debug, info, warn};

/// Environment variable holding the token signing secret.
pub const SECRET_ENV: &str = "JWT_SECRET";

/// Process-wide storage for the signing secret.
pub trait SecretProvider {
    /// The stored secret, if one was set. An empty value counts as set.
    fn lookup(&self) -> Option<String>;

    /// Store `secret` for later lookups.
    fn store(&self, secret: &str);
}

/// Secret stored in a process environment variable.
#[derive(Debug, Clone)]
pub struct ProcessEnv {
    var: Cow<'static, str>,
}

impl ProcessEnv {
    pub fn new(var: impl Into<Cow<'static, str>>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for ProcessEnv {
    fn default() -> Self {
        Self::new(SECRET_ENV)
    }
}

impl SecretProvider for ProcessEnv {
    fn lookup(&self) -> Option<String> {
        match std::env::var(&*self.var) {
            Ok(secret) => Some(secret),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(raw)) => {
                warn!(var = %self.var, "jwt secret is not valid unicode, replacing invalid bytes");
                Some(raw.to_string_lossy().into_owned())
            }
        }
    }

    fn store(&self, secret: &str) {
        // SAFETY: setup runs on the host's single initialization thread,
        // before any request handling reads the environment.
        unsafe { std::env::set_var(&*self.var, secret) };
    }
}

/// Secret kept in memory, for hosts that do not want the environment touched.
#[derive(Debug, Default)]
pub struct MemorySecret {
    slot: Mutex<Option<String>>,
}

impl MemorySecret {
    /// A provider that already holds `secret`.
    pub fn with(secret: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(secret.into())),
        }
    }
}

impl SecretProvider for MemorySecret {
    fn lookup(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, secret: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(secret.to_owned());
    }
}

/// Resolve the signing secret of `config` against `secrets`.
///
/// A stored secret replaces the configured one. Without a stored secret the
/// configured one is stored, so every later call observes the same value.
pub fn reconcile<P>(mut config: LoginConfig, secrets: &P) -> LoginConfig
where
    P: SecretProvider + ?Sized,
{
    match secrets.lookup() {
        Some(secret) => {
            debug!("using stored jwt secret");
            config.jwt_secret = secret;
        }
        None => {
            info!("storing jwt secret for later login blocks");
            secrets.store(&config.jwt_secret);
        }
    }
    config
}
