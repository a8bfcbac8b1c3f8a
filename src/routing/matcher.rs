//! Route pattern matching.
//!
//! # Responsibilities
//! - Compile route patterns such as `/dashboard(.*)` into matchers
//! - Answer "does this path match any pattern" for a request
//!
//! # Design Decisions
//! - Text outside parentheses is literal; a parenthesized group is a regex
//! - Every pattern is anchored at both ends
//! - Path matching is case-sensitive and ignores the query string
//! - Compiled once at startup, immutable afterwards

use regex::Regex;
use thiserror::Error;

/// Error compiling a route pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with '/'")]
    NotAbsolute(String),

    #[error("pattern `{0}` has unbalanced parentheses")]
    Unbalanced(String),

    #[error("pattern `{pattern}` is not a valid expression: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single compiled path pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let mut expr = String::from("^");
        let mut literal = String::new();
        let mut group = String::new();
        let mut depth = 0usize;

        for c in pattern.chars() {
            match c {
                '(' => {
                    if depth == 0 {
                        expr.push_str(&regex::escape(&literal));
                        literal.clear();
                    }
                    depth += 1;
                    group.push(c);
                }
                ')' => {
                    if depth == 0 {
                        return Err(PatternError::Unbalanced(pattern.to_string()));
                    }
                    depth -= 1;
                    group.push(c);
                    if depth == 0 {
                        expr.push_str(&group);
                        group.clear();
                    }
                }
                _ if depth > 0 => group.push(c),
                _ => literal.push(c),
            }
        }

        if depth != 0 {
            return Err(PatternError::Unbalanced(pattern.to_string()));
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if the path (without query) matches.
    pub fn matches_path(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// An ordered, immutable set of route patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<RoutePattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| RoutePattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First pattern matching the path, in declaration order.
    pub fn find(&self, path: &str) -> Option<&RoutePattern> {
        self.patterns.iter().find(|p| p.matches_path(path))
    }

    /// Returns true if any pattern matches the path.
    pub fn matches_path(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Paths that require a signed-in user.
#[derive(Debug, Clone, Default)]
pub struct ProtectedRoutes {
    set: PatternSet,
}

impl ProtectedRoutes {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            set: PatternSet::compile(patterns)?,
        })
    }

    /// Returns true if the path requires an authenticated session.
    pub fn is_protected(&self, path: &str) -> bool {
        self.set.matches_path(path)
    }

    /// The pattern that protects this path, if any.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        self.set.find(path).map(RoutePattern::as_str)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
