//! Stateless session tokens.
//!
//! A session is an HS256-signed JWT carried in an HTTP-only cookie. The
//! server keeps no record of issued tokens: a session ends when the cookie
//! expires or the client drops it. There is no revocation list, so a leaked
//! token stays valid until its expiry unless the signing secret is rotated.

use anyhow::Result;
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::policy::Role;

/// Cookie name the browser sends back on every request.
pub const SESSION_COOKIE: &str = "accessToken";

/// Fixed session lifetime.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Verified content of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id
    pub sub: String,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with the process-wide secret.
///
/// Constructed once at startup; verification is pure CPU work and safe to
/// run concurrently from every request.
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(SESSION_TTL_HOURS))
    }

    #[must_use]
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a signed token for an authenticated employee.
    pub fn issue(&self, id: &str, username: &str, name: &str, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: id.to_string(),
            username: username.to_string(),
            name: name.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))
    }

    /// Verify signature and expiry, returning the claims only when both
    /// hold. Every failure mode (garbage input, bad signature, expired)
    /// collapses to `None`; callers treat that as "no session".
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

/// Build the login cookie: HTTP-only, whole-site, 24 h, secure when the
/// deployment says so.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}

/// Expired empty cookie that makes the browser drop the session.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Pull the raw session token out of the Cookie header, if any.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    Cookie::split_parse(raw)
        .filter_map(std::result::Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn codec() -> SessionCodec {
        SessionCodec::new("unit-test-secret")
    }

    fn issue(codec: &SessionCodec) -> String {
        codec
            .issue("emp-1", "somchai", "Somchai J.", Role::Sales)
            .unwrap()
    }

    #[test]
    fn round_trip_preserves_claims() {
        let codec = codec();
        let token = issue(&codec);

        let claims = codec.decode(&token).expect("fresh token should decode");
        assert_eq!(claims.sub, "emp-1");
        assert_eq!(claims.username, "somchai");
        assert_eq!(claims.name, "Somchai J.");
        assert_eq!(claims.role, Role::Sales);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_is_idempotent() {
        let codec = codec();
        let token = issue(&codec);

        let first = codec.decode(&token).unwrap();
        let second = codec.decode(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expired_token_reads_as_absent() {
        // Well past the default validation leeway
        let codec = SessionCodec::with_ttl("unit-test-secret", Duration::minutes(-5));
        let token = issue(&codec);

        assert!(codec.decode(&token).is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec();
        let token = issue(&codec);

        // Flip one character in each segment of the compact form
        let bytes = token.as_bytes();
        for idx in [5, token.find('.').unwrap() + 2, token.len() - 2] {
            let mut forged = bytes.to_vec();
            forged[idx] = if forged[idx] == b'A' { b'B' } else { b'A' };
            let forged = String::from_utf8(forged).unwrap();
            assert!(codec.decode(&forged).is_none(), "tampered at byte {idx}");
        }
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = issue(&codec());
        let other = SessionCodec::new("a-different-secret");

        assert!(other.decode(&token).is_none());
    }

    #[test]
    fn garbage_never_panics() {
        let codec = codec();
        assert!(codec.decode("").is_none());
        assert!(codec.decode("invalid.token.here").is_none());
        assert!(codec.decode("no-dots-at-all").is_none());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), true);
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("accessToken=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));

        let dev_cookie = session_cookie("tok".to_string(), false);
        assert!(!dev_cookie.to_string().contains("Secure"));
    }

    #[test]
    fn token_extraction_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=abc.def.ghi; lang=th"),
        );

        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));

        let empty = HeaderMap::new();
        assert!(token_from_headers(&empty).is_none());
    }
}
