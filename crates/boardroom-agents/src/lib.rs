//! Persona roster, keyword routing, and prompt composition.
//!
//! Everything in this crate is configuration and string work: the registry is
//! an immutable lookup table built once at startup, the routing table is an
//! ordered whole-token keyword match with a fixed default, and the composer
//! interpolates a fixed template from persona, meeting context, and a bounded
//! history tail. No I/O happens here.

use thiserror::Error;

/// Errors surfaced by roster construction, lookup, and routing validation.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No persona is registered under the requested id.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    /// Two personas were registered under the same id.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(String),
    /// A routing rule or default points at an id missing from the registry.
    #[error("route target is not a registered agent: {0}")]
    UnknownRouteTarget(String),
}

pub mod prompt;
pub mod registry;
pub mod routing;

pub use prompt::{
    PromptComposer, PromptPair, DEFAULT_COMPANY, DEFAULT_HISTORY_LIMIT, DEFAULT_TURN_CHAR_LIMIT,
};
pub use registry::AgentRegistry;
pub use routing::{RouteCategory, RoutingTable};
