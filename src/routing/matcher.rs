//! Stream target matching logic.
//!
//! # Responsibilities
//! - Match the URL scheme (http or https only)
//! - Match the hostname against the trusted domain suffix
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Hostname matching is case-insensitive (the URL parser lowercases hosts)
//! - Suffix matching requires the leading dot, so "eviliwara.tv" never matches ".iwara.tv"
//! - No regex; plain string comparison

use url::Url;

/// Trait for matching a candidate upstream URL against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &Url) -> bool;
}

/// Matches an allowed set of schemes.
#[derive(Debug, Clone)]
pub struct SchemeMatcher {
    schemes: Vec<String>,
}

impl SchemeMatcher {
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemes: schemes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn http() -> Self {
        Self::new(["http", "https"])
    }
}

impl Matcher for SchemeMatcher {
    fn matches(&self, url: &Url) -> bool {
        self.schemes.iter().any(|s| s == url.scheme())
    }
}

/// Matches hostnames ending with a fixed suffix.
#[derive(Debug, Clone)]
pub struct HostSuffixMatcher {
    suffix: String,
}

impl HostSuffixMatcher {
    /// The suffix is normalized to lowercase for case-insensitive matching.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into().to_lowercase(),
        }
    }
}

impl Matcher for HostSuffixMatcher {
    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host.to_lowercase().ends_with(&self.suffix))
            .unwrap_or(false)
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
    fn matches(&self, url: &Url) -> bool {
        self.matchers.iter().all(|m| m.matches(url))
    }
}
