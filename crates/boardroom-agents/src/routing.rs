//! Keyword routing from message text to a responder persona.
//!
//! Routing is deliberately heuristic: an ordered list of keyword categories,
//! evaluated first-match-wins against the whole tokens of the lowercased
//! message, with a fixed default when nothing matches. Selection is pure,
//! deterministic, and total.

use crate::{AgentError, AgentRegistry};
use std::collections::HashSet;

/// One routing category: a keyword set bound to a persona id.
#[derive(Debug, Clone)]
pub struct RouteCategory {
    /// Persona that answers when this category matches.
    pub agent_id: String,
    /// Keywords matched against message tokens. Stored lowercase.
    pub keywords: Vec<String>,
}

impl RouteCategory {
    /// Builds a category, lowercasing every keyword.
    pub fn new(agent_id: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            agent_id: agent_id.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

/// Ordered keyword router with a fixed default persona.
///
/// Categories are evaluated in construction order and never re-ordered at
/// runtime; the first category whose keyword set intersects the message's
/// token set wins.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    categories: Vec<RouteCategory>,
    default_agent: String,
}

impl RoutingTable {
    /// Builds a routing table, validating every bound id against the registry.
    pub fn new(
        categories: Vec<RouteCategory>,
        default_agent: impl Into<String>,
        registry: &AgentRegistry,
    ) -> Result<Self, AgentError> {
        let default_agent = default_agent.into();
        for category in &categories {
            if !registry.contains(&category.agent_id) {
                return Err(AgentError::UnknownRouteTarget(category.agent_id.clone()));
            }
        }
        if !registry.contains(&default_agent) {
            return Err(AgentError::UnknownRouteTarget(default_agent));
        }
        Ok(Self {
            categories,
            default_agent,
        })
    }

    /// The canonical category list for the builtin roster.
    ///
    /// Priority: marketing, then design, then engineering, then knowledge;
    /// everything else falls through to the chief of staff.
    pub fn builtin(registry: &AgentRegistry) -> Result<Self, AgentError> {
        Self::new(
            vec![
                RouteCategory::new(
                    "aurora",
                    &["marketing", "brand", "campaign", "audience", "customers"],
                ),
                RouteCategory::new("helios", &["design", "ui", "ux", "interface", "visual"]),
                RouteCategory::new(
                    "hephaestus",
                    &[
                        "tech",
                        "code",
                        "api",
                        "backend",
                        "infrastructure",
                        "architecture",
                        "system",
                    ],
                ),
                RouteCategory::new(
                    "athena",
                    &[
                        "data",
                        "analysis",
                        "research",
                        "knowledge",
                        "metrics",
                        "statistics",
                    ],
                ),
            ],
            "elara",
            registry,
        )
    }

    /// Picks the responder persona id for a message.
    ///
    /// Never fails; an unmatched message is the default-routing case, not an
    /// error.
    pub fn select(&self, message: &str) -> &str {
        let tokens = tokenize(message);
        for category in &self.categories {
            if category
                .keywords
                .iter()
                .any(|keyword| tokens.contains(keyword.as_str()))
            {
                return &category.agent_id;
            }
        }
        &self.default_agent
    }

    /// The persona id used when no category matches.
    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }
}

/// Splits a message into lowercase alphanumeric tokens.
///
/// Keywords match whole tokens only, so "marketing" does not fire on
/// "remarketing".
fn tokenize(message: &str) -> HashSet<String> {
    message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
