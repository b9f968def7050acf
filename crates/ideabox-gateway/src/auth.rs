// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP Basic authentication middleware for the moderation API.
//!
//! Credentials are compared through their SHA-256 digests so the comparison
//! time does not depend on how many leading bytes match.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

const REALM: &str = "Basic realm=\"Ideabox\"";

/// Expected credentials for the moderation API.
#[derive(Clone)]
pub struct BasicAuth {
    username_digest: [u8; 32],
    password_digest: [u8; 32],
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username_digest: digest(username.as_bytes()),
            password_digest: digest(password.as_bytes()),
        }
    }

    /// Checks an `Authorization` header value.
    pub fn verify(&self, header_value: &str) -> bool {
        let Some(encoded) = header_value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(credentials) = String::from_utf8(decoded) else {
            return false;
        };
        let Some((user, pass)) = credentials.split_once(':') else {
            return false;
        };

        // Both halves are always evaluated.
        let user_ok = digest(user.as_bytes()) == self.username_digest;
        let pass_ok = digest(pass.as_bytes()) == self.password_digest;
        user_ok & pass_ok
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("credentials", &"[redacted]")
            .finish()
    }
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Rejects requests without valid Basic credentials.
pub async fn basic_auth_middleware(
    State(auth): State<BasicAuth>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| auth.verify(v));

    if authorized {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "rejecting unauthenticated request");
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_for(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[test]
    fn accepts_matching_credentials() {
        let auth = BasicAuth::new("admin", "s3cret");
        assert!(auth.verify(&header_for("admin", "s3cret")));
    }

    #[test]
    fn rejects_wrong_password() {
        let auth = BasicAuth::new("admin", "s3cret");
        assert!(!auth.verify(&header_for("admin", "guess")));
        assert!(!auth.verify(&header_for("root", "s3cret")));
    }

    #[test]
    fn password_may_contain_colon() {
        let auth = BasicAuth::new("admin", "a:b");
        assert!(auth.verify(&header_for("admin", "a:b")));
    }

    #[test]
    fn rejects_malformed_headers() {
        let auth = BasicAuth::new("admin", "s3cret");
        assert!(!auth.verify("Bearer abc"));
        assert!(!auth.verify("Basic !!!not-base64"));
        assert!(!auth.verify(&format!("Basic {}", STANDARD.encode("no-colon"))));
    }

    #[test]
    fn debug_redacts_credentials() {
        let debug = format!("{:?}", BasicAuth::new("admin", "s3cret"));
        assert!(!debug.contains("admin"));
        assert!(debug.contains("[redacted]"));
    }
}
