//! # Participant System - The Building Blocks of a Composite
//!
//! This module provides the participant system, the units that contribute to a
//! delegation chain. A participant has a tag, declares the behaviors it takes
//! part in, and when consulted receives a [`Chain`] through which it either
//! terminates the chain, defers to the next declaring participant, or
//! dispatches another behavior on the same composite.
//!
//! ## Core Components
//!
//! ### Participant Trait
//! The fundamental abstraction for implementing custom participants:
//!
//! ```rust
//! use mixchain::{Behavior, Chain, Participant, ResolveError};
//!
//! struct Base;
//!
//! impl Participant for Base {
//!     fn tag(&self) -> &str {
//!         "Base"
//!     }
//!
//!     fn behaviors(&self) -> Vec<Behavior> {
//!         vec!["draw".into()]
//!     }
//!
//!     fn invoke(&self, chain: Chain<'_>) -> Result<String, ResolveError> {
//!         Ok(chain.segment())
//!     }
//! }
//! ```
//!
//! ### MixinParticipant
//! A declarative participant described by a behavior-to-contribution map,
//! built with `with_terminal`, `with_defer`, and `with_dispatch`. Its
//! contributions are statically known, so [`Composite::validate`] can check
//! orders containing it before any resolution runs.
//!
//! ### FunctionParticipant
//! For rapid prototyping, create participants from closures:
//!
//! ```rust
//! use mixchain::FunctionParticipant;
//!
//! let shouty = FunctionParticipant::new("Shouty", ["draw"], |chain| {
//!     Ok(chain.segment().to_uppercase())
//! });
//! ```
//!
//! Closure failures surface as [`ResolveError::ParticipantFailed`]; chain
//! errors returned from `delegate` or `dispatch` pass through unchanged.
//!
//! [`Composite::validate`]: crate::Composite::validate

use crate::behavior::{Behavior, CHAIN_SEPARATOR, Contribution};
use crate::composite::{Chain, ResolveError};
use std::collections::HashMap;

// Type alias to keep the closure signature readable
type InvokeFn = Box<
    dyn Fn(Chain<'_>) -> Result<String, Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
>;

/// Core trait for implementing participants.
///
/// A participant is consulted only for behaviors it declares; the composite
/// skips it everywhere else. Implementations must be stateless with respect
/// to resolution: `invoke` takes `&self`, so repeated resolutions of the same
/// composite yield identical values.
pub trait Participant: Send + Sync {
    /// The participant's tag, used as the prefix of its segments
    fn tag(&self) -> &str;

    /// The behaviors this participant declares
    fn behaviors(&self) -> Vec<Behavior>;

    /// Whether this participant declares the given behavior
    fn declares(&self, behavior: &Behavior) -> bool {
        self.behaviors().contains(behavior)
    }

    /// Contribute to the chain for the behavior carried by `chain`
    fn invoke(&self, chain: Chain<'_>) -> Result<String, ResolveError>;

    /// The statically known contribution for a behavior, if any.
    ///
    /// Used by composite validation; participants with opaque logic return
    /// `None` and are only checkable at resolution time.
    fn contribution(&self, _behavior: &Behavior) -> Option<Contribution> {
        None
    }
}

/// A declarative participant described by a behavior-to-contribution map
pub struct MixinParticipant {
    tag: String,
    contributions: HashMap<Behavior, Contribution>,
}

impl MixinParticipant {
    /// Create a participant with the given tag and no contributions yet
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into(),
            contributions: HashMap::new(),
        }
    }

    /// Declare a terminal contribution for a behavior
    pub fn with_terminal<B: Into<Behavior>>(mut self, behavior: B) -> Self {
        self.contributions
            .insert(behavior.into(), Contribution::Terminal);
        self
    }

    /// Declare a deferring contribution for a behavior
    pub fn with_defer<B: Into<Behavior>>(mut self, behavior: B) -> Self {
        self.contributions
            .insert(behavior.into(), Contribution::Defer);
        self
    }

    /// Declare a contribution that dispatches another behavior
    pub fn with_dispatch<B: Into<Behavior>, T: Into<Behavior>>(
        mut self,
        behavior: B,
        target: T,
    ) -> Self {
        self.contributions
            .insert(behavior.into(), Contribution::Dispatch(target.into()));
        self
    }
}

impl Participant for MixinParticipant {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn behaviors(&self) -> Vec<Behavior> {
        let mut behaviors: Vec<Behavior> = self.contributions.keys().cloned().collect();
        behaviors.sort();
        behaviors
    }

    fn declares(&self, behavior: &Behavior) -> bool {
        self.contributions.contains_key(behavior)
    }

    fn invoke(&self, chain: Chain<'_>) -> Result<String, ResolveError> {
        match self.contributions.get(chain.behavior()) {
            Some(Contribution::Terminal) => Ok(chain.segment()),
            Some(Contribution::Defer) => {
                let segment = chain.segment();
                let rest = chain.delegate()?;
                Ok(format!("{segment}{CHAIN_SEPARATOR}{rest}"))
            }
            Some(Contribution::Dispatch(target)) => {
                let segment = chain.segment();
                let rest = chain.dispatch(target.clone())?;
                Ok(format!("{segment}{CHAIN_SEPARATOR}{rest}"))
            }
            // Only reachable through a direct invoke for an undeclared
            // behavior; act as a pure pass-through.
            None => chain.delegate(),
        }
    }

    fn contribution(&self, behavior: &Behavior) -> Option<Contribution> {
        self.contributions.get(behavior).cloned()
    }
}

/// A closure-backed participant for quick prototyping and custom logic
pub struct FunctionParticipant {
    tag: String,
    behaviors: Vec<Behavior>,
    invoke_fn: InvokeFn,
}

impl FunctionParticipant {
    /// Create a participant from a closure.
    ///
    /// The closure receives the [`Chain`] and produces the participant's
    /// composed result for every behavior in `behaviors`.
    pub fn new<S, I, B, F>(tag: S, behaviors: I, invoke_fn: F) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = B>,
        B: Into<Behavior>,
        F: Fn(Chain<'_>) -> Result<String, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            tag: tag.into(),
            behaviors: behaviors.into_iter().map(Into::into).collect(),
            invoke_fn: Box::new(invoke_fn),
        }
    }
}

impl Participant for FunctionParticipant {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn behaviors(&self) -> Vec<Behavior> {
        self.behaviors.clone()
    }

    fn invoke(&self, chain: Chain<'_>) -> Result<String, ResolveError> {
        let behavior = chain.behavior().clone();
        (self.invoke_fn)(chain).map_err(|error| match error.downcast::<ResolveError>() {
            // Chain errors surfaced through `?` inside the closure keep
            // their original kind.
            Ok(resolve_error) => *resolve_error,
            Err(other) => ResolveError::ParticipantFailed {
                tag: self.tag.clone(),
                behavior,
                message: other.to_string(),
            },
        })
    }
}

#[cfg(feature = "builtin-shapes")]
pub mod builtin;
