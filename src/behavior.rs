//! # Behavior Identities and Contribution Kinds
//!
//! This module provides the vocabulary of the delegation chain: behaviors name
//! the capabilities a composite can resolve, and contributions describe how one
//! participant implements one behavior.
//!
//! ## Core Concepts
//!
//! ### Behaviors
//! A [`Behavior`] is a string-backed identity such as `"get_border_points"`.
//! Composites resolve behaviors; participants declare which behaviors they
//! contribute to. Behaviors are cheap to clone, hashable, ordered, and
//! serializable, so they work as map keys and as fields in layout files.
//!
//! ### Contributions
//! A [`Contribution`] is the declarative form of a participant's
//! implementation:
//! - **Terminal**: return this participant's segment with no deferral (the
//!   base of a chain)
//! - **Defer**: prefix this participant's segment onto the result of the next
//!   declaring participant in the resolution order
//! - **Dispatch**: prefix this participant's segment onto the result of
//!   resolving a different behavior on the same composite, from the top
//!
//! ### Segments
//! The text one participant contributes is its *segment*, `"<Tag>.<behavior>"`.
//! Chained segments are joined with [`CHAIN_SEPARATOR`].
//!
//! ## Examples
//!
//! ```rust
//! use mixchain::{Behavior, Contribution};
//!
//! let border: Behavior = "get_border_points".into();
//! assert_eq!(border.segment_for("Shape"), "Shape.get_border_points");
//!
//! let dispatch = Contribution::dispatch("get_border_points");
//! assert_eq!(dispatch.dispatch_target(), Some(&border));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between chained segments in a composed value.
pub const CHAIN_SEPARATOR: &str = " <- ";

/// Names a capability that a composite can resolve.
///
/// Behaviors are plain string identities; two behaviors are the same
/// capability exactly when their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Behavior(String);

impl Behavior {
    /// Create a behavior from a name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Behavior(name.into())
    }

    /// Get the behavior's name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Format the segment a participant with the given tag contributes
    /// for this behavior
    pub fn segment_for(&self, tag: &str) -> String {
        format!("{}.{}", tag, self.0)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Behavior {
    fn from(s: &str) -> Self {
        Behavior(s.to_string())
    }
}

impl From<String> for Behavior {
    fn from(s: String) -> Self {
        Behavior(s)
    }
}

impl From<Behavior> for String {
    fn from(behavior: Behavior) -> Self {
        behavior.0
    }
}

impl AsRef<str> for Behavior {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Describes how one participant implements one behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contribution {
    /// Return the participant's segment with no deferral (base of the chain)
    Terminal,

    /// Prefix the participant's segment onto the result of the next declaring
    /// participant in the resolution order
    Defer,

    /// Prefix the participant's segment onto the result of resolving another
    /// behavior on the same composite, from the top
    Dispatch(Behavior),
}

impl Contribution {
    /// Create a dispatching contribution targeting another behavior
    pub fn dispatch<B: Into<Behavior>>(target: B) -> Self {
        Contribution::Dispatch(target.into())
    }

    /// Check if this contribution terminates a chain
    pub fn is_terminal(&self) -> bool {
        matches!(self, Contribution::Terminal)
    }

    /// Check if this contribution defers to the next participant
    pub fn is_defer(&self) -> bool {
        matches!(self, Contribution::Defer)
    }

    /// Get the dispatched behavior, if this contribution dispatches
    pub fn dispatch_target(&self) -> Option<&Behavior> {
        match self {
            Contribution::Dispatch(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contribution::Terminal => write!(f, "terminal"),
            Contribution::Defer => write!(f, "defer"),
            Contribution::Dispatch(target) => write!(f, "dispatch({})", target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_identity() {
        let behavior = Behavior::new("get_border_points");
        assert_eq!(behavior.name(), "get_border_points");
        assert_eq!(behavior.to_string(), "get_border_points");

        let same: Behavior = "get_border_points".into();
        assert_eq!(behavior, same);
    }

    #[test]
    fn test_segment_formatting() {
        let behavior = Behavior::new("get_border_points");
        assert_eq!(behavior.segment_for("Shape"), "Shape.get_border_points");
        assert_eq!(
            behavior.segment_for("BezierMixin"),
            "BezierMixin.get_border_points"
        );
    }

    #[test]
    fn test_behavior_conversions() {
        let from_str: Behavior = "draw".into();
        assert_eq!(from_str.name(), "draw");

        let from_string: Behavior = "draw".to_string().into();
        assert_eq!(from_str, from_string);

        let back: String = from_str.into();
        assert_eq!(back, "draw");
    }

    #[test]
    fn test_behavior_ordering() {
        let a = Behavior::new("a");
        let b = Behavior::new("b");
        assert!(a < b);
    }

    #[test]
    fn test_contribution_helpers() {
        assert!(Contribution::Terminal.is_terminal());
        assert!(Contribution::Defer.is_defer());
        assert!(!Contribution::Defer.is_terminal());

        let dispatch = Contribution::dispatch("get_border_points");
        assert_eq!(
            dispatch.dispatch_target(),
            Some(&Behavior::new("get_border_points"))
        );
        assert_eq!(Contribution::Terminal.dispatch_target(), None);
    }

    #[test]
    fn test_contribution_display() {
        assert_eq!(Contribution::Terminal.to_string(), "terminal");
        assert_eq!(Contribution::Defer.to_string(), "defer");
        assert_eq!(
            Contribution::dispatch("get_border_points").to_string(),
            "dispatch(get_border_points)"
        );
    }

    #[test]
    fn test_serialization() {
        let behavior = Behavior::new("get_border_points");
        let json_str = serde_json::to_string(&behavior).unwrap();
        assert_eq!(json_str, "\"get_border_points\"");
        let deserialized: Behavior = serde_json::from_str(&json_str).unwrap();
        assert_eq!(behavior, deserialized);

        let contribution = Contribution::dispatch("get_border_points");
        let json_str = serde_json::to_string(&contribution).unwrap();
        let deserialized: Contribution = serde_json::from_str(&json_str).unwrap();
        assert_eq!(contribution, deserialized);
    }
}
