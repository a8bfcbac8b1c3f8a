//! Invocation scope.
//!
//! Decides whether the gate runs for a request at all. Framework internals
//! and static assets are skipped; API and RPC paths are always gated.
//!
//! # Design Decisions
//! - Forced includes are checked first and win over any exclusion
//! - An extension matches when a `.` anywhere in the path is followed by it,
//!   so `/app.css` and `/fonts/x.woff2` are both skipped
//! - Pass-through extensions shadow shorter excluded ones (`.json` vs `.js`)

use crate::config::ScopeConfig;
use crate::routing::matcher::{PatternError, PatternSet};

/// Compiled invocation scope.
#[derive(Debug, Clone)]
pub struct InvocationScope {
    always_include: PatternSet,
    excluded_prefixes: Vec<String>,
    excluded_extensions: Vec<String>,
    passthrough_extensions: Vec<String>,
}

impl InvocationScope {
    /// Build the scope from configuration.
    pub fn from_config(config: &ScopeConfig) -> Result<Self, PatternError> {
        Ok(Self {
            always_include: PatternSet::compile(&config.always_include)?,
            excluded_prefixes: config.excluded_prefixes.clone(),
            excluded_extensions: config.excluded_extensions.clone(),
            passthrough_extensions: config.passthrough_extensions.clone(),
        })
    }

    /// Returns true if the gate must run for this path.
    pub fn should_run(&self, path: &str) -> bool {
        if self.always_include.matches_path(path) {
            return true;
        }
        !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &str) -> bool {
        if self.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return true;
        }
        self.has_excluded_extension(path)
    }

    fn has_excluded_extension(&self, path: &str) -> bool {
        path.match_indices('.').any(|(idx, _)| {
            let rest = &path[idx + 1..];
            if self
                .passthrough_extensions
                .iter()
                .any(|ext| rest.starts_with(ext.as_str()))
            {
                return false;
            }
            self.excluded_extensions
                .iter()
                .any(|ext| rest.starts_with(ext.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> InvocationScope {
        InvocationScope::from_config(&ScopeConfig::default()).unwrap()
    }

    #[test]
    fn static_assets_are_skipped() {
        let scope = scope();
        for path in [
            "/logo.png",
            "/app.css",
            "/bundle.js",
            "/index.html",
            "/fonts/inter.woff2",
            "/photo.jpeg",
            "/site.webmanifest",
            "/reports/q3.xlsx",
        ] {
            assert!(!scope.should_run(path), "{path} should be skipped");
        }
    }

    #[test]
    fn framework_internals_are_skipped() {
        let scope = scope();
        assert!(!scope.should_run("/_next/static/chunks/main.js"));
        assert!(!scope.should_run("/_next/image"));
    }

    #[test]
    fn pages_are_gated() {
        let scope = scope();
        assert!(scope.should_run("/"));
        assert!(scope.should_run("/dashboard/settings"));
        assert!(scope.should_run("/sign-in"));
    }

    #[test]
    fn json_is_not_mistaken_for_js() {
        let scope = scope();
        assert!(scope.should_run("/manifest.json"));
        assert!(!scope.should_run("/manifest.js"));
        assert!(!scope.should_run("/component.jsx"));
    }

    #[test]
    fn api_and_rpc_always_run() {
        let scope = scope();
        assert!(scope.should_run("/api/users"));
        assert!(scope.should_run("/trpc/post.list"));
        assert!(scope.should_run("/api/export/report.csv"));
        assert!(scope.should_run("/api/_next/thing"));
    }
}
