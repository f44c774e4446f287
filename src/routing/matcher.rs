//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (exact, case-sensitive)
//! - Match request path (exact or prefix, case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Methods compare as strings; an unknown method simply matches nothing
//!   method-specific
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use std::fmt;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request line matches this condition.
    fn matches(&self, method: &str, path: &str) -> bool;
}

/// Matches one HTTP method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: String,
}

impl MethodMatcher {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &str, _path: &str) -> bool {
        method == self.method
    }
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct PathExactMatcher {
    path: String,
}

impl PathExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for PathExactMatcher {
    fn matches(&self, _method: &str, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, _method: &str, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, method: &str, path: &str) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(method, path))
    }
}
