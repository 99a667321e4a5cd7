//! Token extraction from the `Authorization` header or a cookie.

use crate::auth::{Authenticator, Validator};
use http::{header, request::Parts};

/// Token authenticator.
///
/// Takes the token from `Authorization: Bearer <token>`, falling back to the
/// named cookie, and passes it to the inner [`Validator`].
#[derive(Clone)]
pub struct TokenAuth<V> {
    cookie: String,
    validator: V,
}

impl<V> TokenAuth<V> {
    pub fn new(cookie: impl Into<String>, validator: V) -> Self {
        Self {
            cookie: cookie.into(),
            validator,
        }
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }
}

impl<V> Authenticator for TokenAuth<V>
where
    V: Validator,
{
    type Claims = V::Claims;
    type Error = String;

    async fn authenticate(&self, parts: &Parts) -> Result<Self::Claims, Self::Error> {
        let token = bearer_token(parts)
            .or_else(|| cookie_value(parts, &self.cookie))
            .ok_or_else(|| "missing token".to_string())?;

        self.validator
            .validate(token)
            .await
            .map_err(|e| e.to_string())
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use crate::auth::{Authenticator, TokenAuth, Validator};
    use http::Request;

    #[derive(Clone)]
    struct Echo;

    impl Validator for Echo {
        type Claims = String;
        type Error = String;

        async fn validate(&self, token: &str) -> Result<String, String> {
            if token == "bad" {
                Err("invalid token".into())
            } else {
                Ok(token.to_owned())
            }
        }
    }

    async fn authenticate(req: Request<()>) -> Result<String, String> {
        let (parts, ()) = req.into_parts();
        TokenAuth::new("jwt_token", Echo).authenticate(&parts).await
    }

    #[tokio::test]
    async fn reads_bearer_header() {
        let req = Request::builder()
            .header("authorization", "Bearer abc")
            .body(())
            .unwrap();
        assert_eq!(authenticate(req).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn falls_back_to_cookie() {
        let req = Request::builder()
            .header("cookie", "theme=dark; jwt_token=from-cookie")
            .body(())
            .unwrap();
        assert_eq!(authenticate(req).await.unwrap(), "from-cookie");
    }

    #[tokio::test]
    async fn header_takes_precedence_over_cookie() {
        let req = Request::builder()
            .header("authorization", "Bearer header")
            .header("cookie", "jwt_token=cookie")
            .body(())
            .unwrap();
        assert_eq!(authenticate(req).await.unwrap(), "header");
    }

    #[tokio::test]
    async fn missing_token() {
        let req = Request::builder()
            .header("authorization", "Basic Ym9iOnNlY3JldA==")
            .header("cookie", "other=1")
            .body(())
            .unwrap();
        assert_eq!(authenticate(req).await.unwrap_err(), "missing token");
    }

    #[tokio::test]
    async fn validator_error_is_reported() {
        let req = Request::builder()
            .header("cookie", "jwt_token=bad")
            .body(())
            .unwrap();
        assert_eq!(authenticate(req).await.unwrap_err(), "invalid token");
    }
}
