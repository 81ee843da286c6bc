//! Path classification.

/// Closed set of route categories. Each category selects one authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    PublicAsset,
    PublicRoute,
    OpenApi,
    ProtectedApi,
    ProtectedRoute,
    Root,
}

impl RouteCategory {
    /// Whether the gate has to look at the credential to decide.
    #[must_use]
    pub const fn inspects_credential(self) -> bool {
        matches!(self, Self::PublicRoute | Self::ProtectedRoute | Self::Root)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicAsset => "public_asset",
            Self::PublicRoute => "public_route",
            Self::OpenApi => "open_api",
            Self::ProtectedApi => "protected_api",
            Self::ProtectedRoute => "protected_route",
            Self::Root => "root",
        }
    }
}

const DEFAULT_API_PREFIX: &str = "/api/";
const DEFAULT_PROTECTED_API_PREFIX: &str = "/api/protected/";
const DEFAULT_ALWAYS_PROTECTED_API: &[&str] = &["/api/restaurant"];
const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/signin", "/signup", "/api/signin", "/api/signup"];
const DEFAULT_ASSET_PREFIX: &str = "/_next/";
const DEFAULT_FAVICON: &str = "/favicon.ico";

/// Ordered classification rules. First match wins; unknown paths are protected.
#[derive(Debug, Clone)]
pub struct RouteRules {
    api_prefix: String,
    protected_api_prefix: String,
    always_protected_api: Vec<String>,
    public_routes: Vec<String>,
    asset_prefix: String,
    favicon: String,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            protected_api_prefix: DEFAULT_PROTECTED_API_PREFIX.to_string(),
            always_protected_api: to_owned(DEFAULT_ALWAYS_PROTECTED_API),
            public_routes: to_owned(DEFAULT_PUBLIC_ROUTES),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            favicon: DEFAULT_FAVICON.to_string(),
        }
    }
}

impl RouteRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_public_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_always_protected_api<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.always_protected_api = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Classify a request path.
    ///
    /// Pure function of `path`: the same input always yields the same category.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteCategory {
        if path.starts_with(&self.api_prefix)
            && !path.starts_with(&self.protected_api_prefix)
            && !self.always_protected_api.iter().any(|p| p == path)
        {
            return RouteCategory::OpenApi;
        }

        if path.starts_with(&self.protected_api_prefix) {
            return RouteCategory::ProtectedApi;
        }

        if self.public_routes.iter().any(|p| p == path) {
            return RouteCategory::PublicRoute;
        }

        // Anything with a dot is assumed to be a static file.
        if path.starts_with(&self.asset_prefix) || path.starts_with(&self.favicon) || path.contains('.')
        {
            return RouteCategory::PublicAsset;
        }

        if path == "/" {
            return RouteCategory::Root;
        }

        RouteCategory::ProtectedRoute
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
