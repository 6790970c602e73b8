//! Caller identity — the seam to the upstream session layer.
//!
//! Authentication itself happens in front of this service. A session
//! provider only answers "who is calling?" for an inbound request, and the
//! HTTP layer decides whether an anonymous caller may proceed.

use axum::http::HeaderMap;

use uiforge_config::SessionConfig;

/// An authenticated caller, typically an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the caller identity of a request.
pub trait SessionProvider: Send + Sync {
    fn identity(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Reads the identity from a header set by a trusted proxy.
#[derive(Debug, Clone)]
pub struct HeaderSessionProvider {
    header: String,
}

impl HeaderSessionProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.identity_header.as_str())
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

impl SessionProvider for HeaderSessionProvider {
    fn identity(&self, headers: &HeaderMap) -> Option<Identity> {
        let value = headers.get(self.header.as_str())?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| Identity::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_configured_header() {
        let provider = HeaderSessionProvider::new("X-User-Email");
        let mut headers = HeaderMap::new();
        headers.insert("x-user-email", HeaderValue::from_static(" ada@example.com "));

        let identity = provider.identity(&headers).unwrap();
        assert_eq!(identity.as_str(), "ada@example.com");
        assert_eq!(provider.header(), "x-user-email");
    }

    #[test]
    fn test_missing_or_blank_header_is_anonymous() {
        let provider = HeaderSessionProvider::from_config(&SessionConfig::default());
        let mut headers = HeaderMap::new();
        assert!(provider.identity(&headers).is_none());

        headers.insert("x-user-email", HeaderValue::from_static("   "));
        assert!(provider.identity(&headers).is_none());
    }

    #[test]
    fn test_non_ascii_header_is_anonymous() {
        let provider = HeaderSessionProvider::new("x-user-email");
        let mut headers = HeaderMap::new();
        headers.insert("x-user-email", HeaderValue::from_bytes(b"\xffbad").unwrap());
        assert!(provider.identity(&headers).is_none());
    }
}
