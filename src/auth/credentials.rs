/// Credential extraction from the `Authorization` header
///
/// Two schemes are recognized, `Bearer <token>` and `ApiKey <key>`. The
/// scheme is matched case-sensitively and the header must be exactly two
/// parts separated by a single space.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Authorization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Bearer,
    ApiKey,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential parsed out of request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub scheme: Scheme,
    pub value: String,
}

/// Extract `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract(headers, Scheme::Bearer).map(|c| c.value)
}

/// Extract `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract(headers, Scheme::ApiKey).map(|c| c.value)
}

/// Extract a credential under `scheme`
///
/// # Errors
/// - `AuthError::MissingCredential` if there is no `Authorization` header
/// - `AuthError::MalformedCredential` if the scheme differs, the value is
///   empty, or the header is not exactly `<scheme> <value>`
pub fn extract(headers: &HeaderMap, scheme: Scheme) -> Result<Credential, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(value), None) if name == scheme.as_str() && !value.is_empty() => {
            Ok(Credential {
                scheme,
                value: value.to_string(),
            })
        }
        _ => Err(AuthError::MalformedCredential),
    }
}

/// Compare a presented secret with the expected one in constant time
///
/// Only the length can leak; the content of a same-length key cannot.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_api_key() {
        assert_eq!(api_key(&headers("ApiKey f271c81ff7084ee5")).unwrap(), "f271c81ff7084ee5");
    }

    #[test]
    fn test_missing_header() {
        let result = bearer_token(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingCredential)));

        let result = api_key(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[test]
    fn test_malformed_headers() {
        let cases = vec![
            ("bearer abc", "lowercase scheme"),
            ("Bearer", "no value"),
            ("Bearer ", "empty value"),
            ("Bearer  abc", "double space"),
            ("Bearer abc def", "three parts"),
            ("Basic abc", "other scheme"),
            ("ApiKey abc", "wrong scheme for bearer"),
            ("Bearerabc", "no separator"),
        ];

        for (value, reason) in cases {
            let result = bearer_token(&headers(value));
            assert!(
                matches!(result, Err(AuthError::MalformedCredential)),
                "Should reject {}: {:?}",
                reason,
                value
            );
        }
    }

    #[test]
    fn test_api_key_rejects_bearer_scheme() {
        let result = api_key(&headers("Bearer abc"));
        assert!(matches!(result, Err(AuthError::MalformedCredential)));
    }

    #[test]
    fn test_extract_reports_scheme() {
        let credential = extract(&headers("ApiKey k"), Scheme::ApiKey).unwrap();
        assert_eq!(credential.scheme, Scheme::ApiKey);
        assert_eq!(credential.value, "k");
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("f271c81ff7084ee5", "f271c81ff7084ee5"));
        assert!(!secrets_match("f271c81ff7084ee5", "f271c81ff7084ee6"));
        assert!(!secrets_match("f271c81ff7084ee", "f271c81ff7084ee5"));
        assert!(!secrets_match("", "f271c81ff7084ee5"));
        assert!(secrets_match("", ""));
    }
}
