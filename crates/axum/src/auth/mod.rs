//! Request authentication for login-protected routes.
//!
//! An [`Authenticator`] looks at the request head and produces claims. The
//! bundled [`TokenAuth`] pulls a token out of the request and hands it to a
//! [`Validator`], such as the HMAC [`JwtValidator`](jwt::JwtValidator).
//!
//! ```rust,ignore
//! use loginsrv_axum::auth::{TokenAuth, jwt::JwtValidator};
//!
//! let validator = JwtValidator::new(&config.jwt_secret, &config.jwt_algo)?;
//! let auth = TokenAuth::new(&config.cookie_name, validator);
//! ```

mod token;

pub mod jwt;

pub use token::TokenAuth;

/// Trait for authenticating incoming requests.
///
/// On success, `Claims` is inserted into `http::Extensions`.
pub trait Authenticator: Clone + Send + Sync + 'static {
    /// The claims type produced on successful authentication.
    type Claims: Clone + Send + Sync + 'static;

    /// The error type returned on authentication failure.
    type Error: std::fmt::Display + Send;

    /// Authenticate the request and return claims, or an error.
    fn authenticate(
        &self,
        parts: &http::request::Parts,
    ) -> impl Future<Output = Result<Self::Claims, Self::Error>> + Send;
}

/// Trait for validating a credential string (e.g., a JWT).
///
/// Wrap an implementation in [`TokenAuth`], which handles finding the
/// credential in the request.
///
/// ```rust,ignore
/// use loginsrv_axum::auth::{TokenAuth, Validator};
///
/// #[derive(Clone)]
/// struct Fixed;
///
/// impl Validator for Fixed {
///     type Claims = String;
///     type Error = String;
///
///     async fn validate(&self, credential: &str) -> Result<String, String> {
///         if credential == "secret" {
///             Ok("bob".into())
///         } else {
///             Err("invalid".into())
///         }
///     }
/// }
///
/// let auth = TokenAuth::new("jwt_token", Fixed);
/// ```
pub trait Validator: Clone + Send + Sync + 'static {
    /// The claims type produced on successful validation.
    type Claims: Clone + Send + Sync + 'static;

    /// The error type returned on validation failure.
    type Error: std::fmt::Display + Send;

    /// Validate the credential string and return claims, or an error.
    fn validate(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Self::Claims, Self::Error>> + Send;
}
