//! Which paths the gate is mounted on at all.

/// Framework-internal paths the gate is never invoked for.
pub const EXCLUDED_PREFIXES: &[&str] = &["_next/static", "_next/image", "favicon.ico"];

/// Equivalent of the `/((?!_next/static|_next/image|favicon.ico).*)` route matcher.
#[derive(Debug, Clone)]
pub struct Matcher {
    excluded: Vec<String>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            excluded: EXCLUDED_PREFIXES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Matcher {
    /// `true` when the gate should run for `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        !self.excluded.iter().any(|prefix| rest.starts_with(prefix.as_str()))
    }
}
