//! Route patterns: named regexes that classify requests by `METHOD URI`.
//!
//! Patterns are plain data until compiled into a [`RouteTable`]. Each pattern
//! is matched against the probe string `"<METHOD> <URI>"` (method
//! uppercased) and must match at the start of the probe; add a trailing `$`
//! for a full match. Patterns are tried in the order given and the first
//! match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// A named route pattern as supplied by the caller or the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePattern {
    /// Symbolic handler name reported for matching requests.
    pub handler: String,
    /// Regular expression tested against `"<METHOD> <URI>"`.
    pub pattern: String,
}

impl RoutePattern {
    pub fn new(handler: impl Into<String>, pattern: impl Into<String>) -> Self {
        RoutePattern {
            handler: handler.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    handler: String,
    regex: Regex,
}

/// The result of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub handler: &'a str,
    /// Capture groups 1..n in order; a group that did not participate is
    /// an empty string.
    pub params: Vec<String>,
}

/// Compiled, ordered route patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile patterns in order. Fails on the first pattern that is not a
    /// valid regex.
    pub fn compile<'a, I>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RoutePattern>,
    {
        let routes = patterns
            .into_iter()
            .map(|p| {
                let regex = Regex::new(&format!("^(?:{})", p.pattern)).map_err(|source| {
                    ParseError::InvalidPattern {
                        handler: p.handler.clone(),
                        source,
                    }
                })?;
                Ok(CompiledRoute {
                    handler: p.handler.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RouteTable { routes })
    }

    /// Compile from `(handler, pattern)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let patterns: Vec<RoutePattern> = pairs
            .iter()
            .map(|(handler, pattern)| RoutePattern::new(*handler, *pattern))
            .collect();
        Self::compile(&patterns)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handler names in evaluation order.
    pub fn handlers(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.handler.as_str())
    }

    /// The string patterns are matched against.
    pub fn probe(method: &str, uri: &str) -> String {
        format!("{} {}", method.to_uppercase(), uri)
    }

    /// Classify a request; `None` when no pattern matches.
    pub fn classify(&self, method: &str, uri: &str) -> Option<RouteMatch<'_>> {
        let probe = Self::probe(method, uri);
        self.routes.iter().find_map(|route| {
            route.regex.captures(&probe).map(|caps| RouteMatch {
                handler: route.handler.as_str(),
                params: caps
                    .iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect(),
            })
        })
    }
}
