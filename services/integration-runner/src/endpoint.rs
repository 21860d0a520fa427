//! Endpoint registry.
//!
//! Static mapping from logical service name to base URL, resolved once per
//! run and never mutated afterwards.

use url::Url;

use crate::error::RunnerError;

/// Gateway service name.
pub const GATEWAY: &str = "api-gateway";
/// Auth service name.
pub const AUTH: &str = "auth-service";
/// Work (content) service name.
pub const WORK: &str = "work-service";
/// Tag service name.
pub const TAG: &str = "tag-service";
/// Search service name.
pub const SEARCH: &str = "search-service";

/// A named service base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    name: String,
    base_url: Url,
}

impl ServiceEndpoint {
    /// Parse a base URL for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self, RunnerError> {
        let base_url = Url::parse(base_url).map_err(|e| RunnerError::invalid_url(base_url, e))?;
        Self::from_url(name, base_url)
    }

    /// Wrap an already parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidUrl`] for non-http(s) schemes.
    pub fn from_url(name: impl Into<String>, base_url: Url) -> Result<Self, RunnerError> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RunnerError::invalid_url(
                base_url.as_str(),
                "scheme must be http or https",
            ));
        }
        Ok(Self {
            name: name.into(),
            base_url,
        })
    }

    /// Logical service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an absolute route (`/api/v1/...`) against the base URL.
    ///
    /// Any path on the base URL is kept as a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidUrl`] when the joined URL is malformed.
    pub fn url(&self, route: &str) -> Result<Url, RunnerError> {
        let prefix = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{prefix}/{}", route.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| RunnerError::invalid_url(joined.clone(), e))
    }
}

/// Ordered set of endpoints; iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<ServiceEndpoint>,
}

impl EndpointRegistry {
    /// Build a registry, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::DuplicateEndpoint`] if a name repeats.
    pub fn new(endpoints: Vec<ServiceEndpoint>) -> Result<Self, RunnerError> {
        for (i, endpoint) in endpoints.iter().enumerate() {
            if endpoints[..i].iter().any(|e| e.name == endpoint.name) {
                return Err(RunnerError::DuplicateEndpoint(endpoint.name.clone()));
            }
        }
        Ok(Self { endpoints })
    }

    /// Build a registry from `(name, base_url)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed URLs or duplicate names.
    pub fn from_pairs<I, N, U>(pairs: I) -> Result<Self, RunnerError>
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: AsRef<str>,
    {
        let endpoints = pairs
            .into_iter()
            .map(|(name, url)| ServiceEndpoint::new(name, url.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(endpoints)
    }

    /// Look up an endpoint by name.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::UnknownEndpoint`] when absent.
    pub fn get(&self, name: &str) -> Result<&ServiceEndpoint, RunnerError> {
        self.endpoints
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| RunnerError::UnknownEndpoint(name.to_string()))
    }

    /// Resolve `route` on the named endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or malformed routes.
    pub fn url(&self, name: &str, route: &str) -> Result<Url, RunnerError> {
        self.get(name)?.url(route)
    }

    /// Endpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceEndpoint> {
        self.endpoints.iter()
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no endpoints are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_keeps_prefix() {
        let endpoint = ServiceEndpoint::new(GATEWAY, "http://localhost:8080/edge/").unwrap();
        let url = endpoint.url("/api/v1/my/works").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/edge/api/v1/my/works");
    }

    #[test]
    fn test_url_join_without_prefix() {
        let endpoint = ServiceEndpoint::new(WORK, "http://localhost:8082").unwrap();
        let url = endpoint.url("health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/health");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = ServiceEndpoint::new(AUTH, "grpc://localhost:50051");
        assert!(matches!(result, Err(RunnerError::InvalidUrl { .. })));
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let registry = EndpointRegistry::from_pairs([
            (GATEWAY, "http://localhost:8080"),
            (AUTH, "http://localhost:8081"),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(AUTH).unwrap().name(), AUTH);
        let names: Vec<_> = registry.iter().map(ServiceEndpoint::name).collect();
        assert_eq!(names, vec![GATEWAY, AUTH]);
        assert!(matches!(
            registry.get(SEARCH),
            Err(RunnerError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let result = EndpointRegistry::from_pairs([
            (WORK, "http://localhost:8082"),
            (WORK, "http://localhost:9082"),
        ]);
        assert!(matches!(result, Err(RunnerError::DuplicateEndpoint(_))));
    }
}
