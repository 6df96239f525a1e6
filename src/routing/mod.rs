//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (verb, path)
//!     → router.rs (scan registered routes)
//!     → matcher.rs (match path template, capture variables)
//!     → Return: Matched route + captures, MethodNotAllowed or NotFound
//!
//! Route Registration (at startup):
//!     Route declarations
//!     → Parse templates
//!     → Resolve field paths against request schemas
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - Most specific match wins (literal segments, then registration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathTemplate, Segment, TemplateError};
pub use router::{Lookup, Route, RouteDefinition, RouteError, RouteMatch, RouteTable};
