//! The login handler built from a bound [`LoginConfig`].
//!
//! Credential checks and token issuing live with the configured backends;
//! this handler serves the session side of the login resource:
//!
//! - `GET` answers with the caller's [`UserInfo`] as JSON, or `403` without a
//!   valid token;
//! - `DELETE`, or any request with `?logout=true`, expires the token cookie
//!   and redirects to `logout-url` when one is set;
//! - other methods get `405`.

use crate::auth::{
    TokenAuth,
    jwt::{JwtValidator, UserInfo},
};
use anyhow::{Result, bail};
use axum::{
    Json, Router,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use http::{HeaderValue, Method, StatusCode, header};
use loginsrv_directive::LoginConfig;
use std::sync::Arc;
use tracing::{debug, warn};

/// A login handler and the authenticator for its tokens.
#[derive(Clone)]
pub struct LoginHandler {
    config: Arc<LoginConfig>,
    auth: TokenAuth<JwtValidator>,
    router: Router,
}

impl LoginHandler {
    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    pub fn authenticator(&self) -> &TokenAuth<JwtValidator> {
        &self.auth
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Build the login handler for `config`.
///
/// Fails when no backend or oauth provider is configured, or when the
/// signing secret and algorithm cannot validate tokens.
pub fn construct(config: LoginConfig) -> Result<LoginHandler> {
    if !config.has_providers() {
        bail!("No login backends or oauth provider configured");
    }
    let validator = JwtValidator::new(&config.jwt_secret, &config.jwt_algo)?;
    let auth = TokenAuth::new(config.cookie_name.clone(), validator);

    let config = Arc::new(config);
    let router = Router::new().fallback(serve).with_state(config.clone());
    Ok(LoginHandler {
        config,
        auth,
        router,
    })
}

async fn serve(State(config): State<Arc<LoginConfig>>, request: Request) -> Response {
    if request.method() == Method::DELETE || wants_logout(&request) {
        return logout(&config);
    }
    if request.method() != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match request.extensions().get::<UserInfo>() {
        Some(user) => Json(user.clone()).into_response(),
        None => (StatusCode::FORBIDDEN, "not logged in").into_response(),
    }
}

fn wants_logout(request: &Request) -> bool {
    request
        .uri()
        .query()
        .is_some_and(|query| query.split('&').any(|pair| pair == "logout=true"))
}

fn logout(config: &LoginConfig) -> Response {
    debug!(cookie = %config.cookie_name, "logging out");

    let mut response = if config.logout_url.is_empty() {
        (StatusCode::OK, "logged out").into_response()
    } else {
        match HeaderValue::from_str(&config.logout_url) {
            Ok(location) => {
                let mut response = StatusCode::SEE_OTHER.into_response();
                response.headers_mut().insert(header::LOCATION, location);
                response
            }
            Err(e) => {
                warn!(url = %config.logout_url, error = %e, "invalid logout url");
                (StatusCode::OK, "logged out").into_response()
            }
        }
    };

    match HeaderValue::from_str(&expired_cookie(config)) {
        Ok(cookie) => {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Err(e) => warn!(cookie = %config.cookie_name, error = %e, "invalid cookie"),
    }
    response
}

fn expired_cookie(config: &LoginConfig) -> String {
    let mut cookie = format!(
        "{}=delete; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0",
        config.cookie_name
    );
    if !config.cookie_domain.is_empty() {
        cookie.push_str("; Domain=");
        cookie.push_str(&config.cookie_domain);
    }
    if config.cookie_http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}
