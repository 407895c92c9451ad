use http::{HeaderMap, HeaderName, HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::{GatewayError, Result},
    transport::OutboundRequest,
};

/// How the auth token is attached to outbound requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Token sent verbatim in the named header (e.g. `x-api-key`)
    Header(HeaderName),
}

/// Static description of one upstream provider
///
/// Built once at startup and shared read-only. A missing token is not an
/// error until a request is actually built for this provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    name: String,
    base_url: String,
    path: String,
    auth_token: Option<SecretString>,
    auth_scheme: AuthScheme,
    extra_headers: HeaderMap,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, base_url: &str, path: &str) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            path: path.to_owned(),
            auth_token: None,
            auth_scheme: AuthScheme::Bearer,
            extra_headers: HeaderMap::new(),
        }
    }

    /// Attach the credential; empty tokens are treated as absent
    #[must_use]
    pub fn with_auth(mut self, token: Option<SecretString>, scheme: AuthScheme) -> Self {
        self.auth_token = token.filter(|token| !token.expose_secret().trim().is_empty());
        self.auth_scheme = scheme;
        self
    }

    /// Add headers sent with every request to this provider
    ///
    /// # Errors
    ///
    /// Returns an error if a header name or value is not valid HTTP
    pub fn with_headers<'a>(mut self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> anyhow::Result<Self> {
        for (name, value) in headers {
            let name = HeaderName::try_from(name)
                .map_err(|e| anyhow::anyhow!("invalid header name '{name}' for provider '{}': {e}", self.name))?;
            let value = HeaderValue::try_from(value)
                .map_err(|e| anyhow::anyhow!("invalid header value for '{name}' on provider '{}': {e}", self.name))?;
            self.extra_headers.insert(name, value);
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credential(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Primary endpoint of this provider
    pub fn endpoint_url(&self) -> String {
        self.url_for(&self.path)
    }

    /// Resolve a path against the base URL with exactly one separator
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Start an authenticated request to `url`
    ///
    /// # Errors
    ///
    /// Fails with `MissingCredential` when no auth token is configured
    pub fn request(&self, method: Method, url: String) -> Result<OutboundRequest> {
        let token = self.auth_token.as_ref().ok_or_else(|| {
            GatewayError::missing_credential(format!("no API key configured for provider '{}'", self.name))
                .for_provider(&self.name)
        })?;

        let mut headers = self.extra_headers.clone();
        let (name, value) = match &self.auth_scheme {
            AuthScheme::Bearer => (
                http::header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            AuthScheme::Header(name) => (name.clone(), token.expose_secret().to_owned()),
        };
        let mut value = HeaderValue::try_from(value).map_err(|_| {
            GatewayError::missing_credential(format!("API key for provider '{}' is not a valid header", self.name))
                .for_provider(&self.name)
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);

        Ok(OutboundRequest::new(method, url).with_headers(headers))
    }
}

/// Join a base URL and a path with exactly one `/` between them
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        base.to_owned()
    } else {
        format!("{base}/{path}")
    }
}
