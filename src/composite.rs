//! # Composite Resolution System
//!
//! This module provides the delegation chain resolver, the engine that composes
//! a single string value from an ordered sequence of participants.
//!
//! ## Architecture
//!
//! ### Composite as an Ordered Sequence
//! A [`Composite`] is a fixed ordered sequence of participants plus a
//! [`ResolveConfig`]. The sequence is fixed at construction time: `Composite`
//! has no mutators, so a composite resolved twice yields the same value both
//! times.
//!
//! ### Resolution Order
//! For a behavior B, the resolution order is the subsequence of the
//! composite's full order restricted to participants that declare B,
//! preserving relative order. This is the only ordering rule; there is no
//! linearization algorithm.
//!
//! ### The Chain Context
//! Each consulted participant receives a [`Chain`], the explicit
//! "call the next one" handle. It exposes the participant's segment and two
//! consuming continuations:
//! - [`Chain::delegate`] runs the next declaring participant in the
//!   resolution order
//! - [`Chain::dispatch`] re-roots resolution of another behavior on the same
//!   composite
//!
//! Both continuations take `self` by value, so a participant can follow at
//! most one of them per invocation.
//!
//! ## Execution Guarantees
//!
//! ### Safety
//! - **Dispatch Cycle Detection**: a behavior already being dispatched cannot
//!   be dispatched again
//! - **Dispatch Depth Limiting**: configurable maximum nesting of
//!   cross-behavior dispatches
//! - **Terminal Validation**: [`Composite::validate`] rejects orders whose
//!   last declaring participant is known to defer
//!
//! ### Observability
//! - **Resolution Path Tracking**: complete record of contributed segments in
//!   order
//! - **Consultation Counting**: how many participants took part
//! - **Resolution Ids**: unique id per resolve call for correlation in logs
//!
//! ## Example
//!
//! ```rust
//! use mixchain::{Composite, MixinParticipant};
//!
//! let composite = Composite::builder()
//!     .participant(MixinParticipant::new("BezierMixin").with_defer("get_border_points"))
//!     .participant(MixinParticipant::new("Shape").with_terminal("get_border_points"))
//!     .build();
//!
//! let value = composite.resolve("get_border_points").unwrap();
//! assert_eq!(value, "BezierMixin.get_border_points <- Shape.get_border_points");
//! ```

use crate::behavior::{Behavior, Contribution};
use crate::participant::Participant;
use std::sync::Arc;

/// Errors that can occur during composite resolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// The composite contains no participants
    #[error("composite has no participants")]
    EmptyComposite,

    /// No participant in the composite declares the requested behavior
    #[error("no participant declares behavior '{0}'")]
    UndeclaredBehavior(Behavior),

    /// The resolution order for a behavior ran out without a terminal
    /// contribution
    #[error("resolution order for '{behavior}' lacks a terminal implementation")]
    MissingTerminalImplementation { behavior: Behavior },

    /// A behavior already being dispatched was dispatched again
    #[error("dispatch cycle detected: {}", .path.join(" -> "))]
    DispatchCycle { path: Vec<String> },

    /// Maximum cross-behavior dispatch depth exceeded
    #[error("maximum dispatch depth exceeded: {0}")]
    DispatchDepthExceeded(usize),

    /// A participant's implementation failed
    #[error("participant '{tag}' failed resolving '{behavior}': {message}")]
    ParticipantFailed {
        tag: String,
        behavior: Behavior,
        message: String,
    },
}

/// Configuration for composite resolution
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolveConfig {
    /// Maximum nesting of cross-behavior dispatches before terminating
    pub max_dispatch_depth: usize,
    /// Whether to detect and reject dispatch cycles
    pub detect_dispatch_cycles: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: 16,
            detect_dispatch_cycles: true,
        }
    }
}

/// Traced outcome of one resolve call
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Unique id for this resolve call
    pub resolution_id: String,
    /// The behavior that was resolved
    pub behavior: Behavior,
    /// The composed value
    pub value: String,
    /// Contributed segments in contribution order
    pub path: Vec<String>,
    /// Number of participants consulted
    pub participants_consulted: usize,
    /// Number of cross-behavior dispatches taken
    pub dispatches: usize,
}

/// Mutable bookkeeping threaded through one resolve call
struct ResolveState {
    path: Vec<String>,
    consulted: usize,
    dispatches: usize,
    dispatch_stack: Vec<Behavior>,
}

/// The explicit "call the next one" context handed to a participant.
///
/// Consuming `self` in [`Chain::delegate`] and [`Chain::dispatch`] makes
/// "at most one continuation per invocation" a compile-time property.
pub struct Chain<'a> {
    composite: &'a Composite,
    behavior: &'a Behavior,
    order: &'a [usize],
    position: usize,
    state: &'a mut ResolveState,
}

impl Chain<'_> {
    /// The behavior currently being resolved
    pub fn behavior(&self) -> &Behavior {
        self.behavior
    }

    /// The tag of the participant this chain was handed to
    pub fn tag(&self) -> &str {
        self.composite.participants[self.order[self.position]].tag()
    }

    /// The segment this participant contributes, `"<Tag>.<behavior>"`
    pub fn segment(&self) -> String {
        self.behavior.segment_for(self.tag())
    }

    /// Whether a further declaring participant exists in the resolution order
    pub fn has_next(&self) -> bool {
        self.position + 1 < self.order.len()
    }

    /// The tag of the next declaring participant, if any
    pub fn peek_next(&self) -> Option<&str> {
        self.order
            .get(self.position + 1)
            .map(|&index| self.composite.participants[index].tag())
    }

    /// Continue with the next declaring participant in the resolution order.
    ///
    /// Fails with [`ResolveError::MissingTerminalImplementation`] when the
    /// order is already exhausted.
    pub fn delegate(self) -> Result<String, ResolveError> {
        self.composite
            .resolve_at(self.behavior, self.order, self.position + 1, self.state)
    }

    /// Re-root resolution of another behavior on the same composite.
    ///
    /// The dispatched behavior is resolved from the top of the composite's
    /// order, not from this participant's position.
    pub fn dispatch<B: Into<Behavior>>(self, behavior: B) -> Result<String, ResolveError> {
        let target = behavior.into();

        if self.composite.config.detect_dispatch_cycles
            && self.state.dispatch_stack.contains(&target)
        {
            let mut path: Vec<String> = self
                .state
                .dispatch_stack
                .iter()
                .map(ToString::to_string)
                .collect();
            path.push(target.to_string());
            return Err(ResolveError::DispatchCycle { path });
        }

        // The stack's first frame is the root behavior; only dispatched
        // frames count toward the depth limit.
        if self.state.dispatch_stack.len() - 1 >= self.composite.config.max_dispatch_depth {
            return Err(ResolveError::DispatchDepthExceeded(
                self.composite.config.max_dispatch_depth,
            ));
        }

        tracing::debug!(from = %self.behavior, to = %target, "dispatching across behaviors");
        self.state.dispatches += 1;
        self.state.dispatch_stack.push(target.clone());
        let result = self.composite.resolve_behavior(&target, self.state);
        self.state.dispatch_stack.pop();
        result
    }
}

/// A fixed ordered sequence of participants defining one resolution order
pub struct Composite {
    participants: Vec<Arc<dyn Participant>>,
    config: ResolveConfig,
}

impl Composite {
    /// Start building a composite
    pub fn builder() -> CompositeBuilder {
        CompositeBuilder::new()
    }

    /// Get the resolution configuration
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Number of participants in the composite
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the composite has no participants
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant tags in declared order
    pub fn tags(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.tag()).collect()
    }

    /// Tags of the participants that declare the given behavior, in
    /// declared order
    pub fn resolution_order(&self, behavior: &Behavior) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|p| p.declares(behavior))
            .map(|p| p.tag())
            .collect()
    }

    /// Resolve a behavior to its composed value
    pub fn resolve<B: Into<Behavior>>(&self, behavior: B) -> Result<String, ResolveError> {
        self.resolve_traced(behavior).map(|resolution| resolution.value)
    }

    /// Resolve a behavior, returning the full resolution trace
    pub fn resolve_traced<B: Into<Behavior>>(
        &self,
        behavior: B,
    ) -> Result<Resolution, ResolveError> {
        let behavior = behavior.into();
        if self.participants.is_empty() {
            return Err(ResolveError::EmptyComposite);
        }

        let resolution_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            %behavior,
            participants = self.participants.len(),
            id = %resolution_id,
            "resolving behavior"
        );

        let mut state = ResolveState {
            path: Vec::new(),
            consulted: 0,
            dispatches: 0,
            dispatch_stack: vec![behavior.clone()],
        };

        let value = self.resolve_behavior(&behavior, &mut state)?;

        tracing::debug!(
            %behavior,
            consulted = state.consulted,
            dispatches = state.dispatches,
            id = %resolution_id,
            "resolution complete"
        );

        Ok(Resolution {
            resolution_id,
            behavior,
            value,
            path: state.path,
            participants_consulted: state.consulted,
            dispatches: state.dispatches,
        })
    }

    /// Check the composite's static integrity.
    ///
    /// For every behavior declared by any participant, the last declaring
    /// participant whose contribution is statically known must not defer.
    /// Opaque participants are only checkable at resolution time.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.participants.is_empty() {
            return Err(ResolveError::EmptyComposite);
        }

        let mut behaviors: Vec<Behavior> = Vec::new();
        for participant in &self.participants {
            for behavior in participant.behaviors() {
                if !behaviors.contains(&behavior) {
                    behaviors.push(behavior);
                }
            }
        }

        for behavior in behaviors {
            let last = self
                .participants
                .iter()
                .rev()
                .find(|p| p.declares(&behavior));

            if let Some(participant) = last {
                if matches!(
                    participant.contribution(&behavior),
                    Some(Contribution::Defer)
                ) {
                    return Err(ResolveError::MissingTerminalImplementation { behavior });
                }
            }
        }

        Ok(())
    }

    fn resolve_behavior(
        &self,
        behavior: &Behavior,
        state: &mut ResolveState,
    ) -> Result<String, ResolveError> {
        let order: Vec<usize> = self
            .participants
            .iter()
            .enumerate()
            .filter(|(_, p)| p.declares(behavior))
            .map(|(index, _)| index)
            .collect();

        if order.is_empty() {
            return Err(ResolveError::UndeclaredBehavior(behavior.clone()));
        }

        self.resolve_at(behavior, &order, 0, state)
    }

    fn resolve_at(
        &self,
        behavior: &Behavior,
        order: &[usize],
        position: usize,
        state: &mut ResolveState,
    ) -> Result<String, ResolveError> {
        let Some(&index) = order.get(position) else {
            return Err(ResolveError::MissingTerminalImplementation {
                behavior: behavior.clone(),
            });
        };

        let participant = &self.participants[index];
        state.consulted += 1;
        state.path.push(behavior.segment_for(participant.tag()));
        tracing::trace!(tag = participant.tag(), %behavior, "consulting participant");

        let chain = Chain {
            composite: self,
            behavior,
            order,
            position,
            state,
        };
        participant.invoke(chain)
    }
}

/// Builder for creating composites
pub struct CompositeBuilder {
    participants: Vec<Arc<dyn Participant>>,
    config: ResolveConfig,
}

impl Default for CompositeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeBuilder {
    /// Create a new composite builder
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
            config: ResolveConfig::default(),
        }
    }

    /// Append a participant to the order
    pub fn participant(mut self, participant: impl Participant + 'static) -> Self {
        self.participants.push(Arc::new(participant));
        self
    }

    /// Append an already shared participant to the order
    pub fn shared(mut self, participant: Arc<dyn Participant>) -> Self {
        self.participants.push(participant);
        self
    }

    /// Set the maximum cross-behavior dispatch depth
    pub fn max_dispatch_depth(mut self, depth: usize) -> Self {
        self.config.max_dispatch_depth = depth;
        self
    }

    /// Enable or disable dispatch cycle detection
    pub fn detect_dispatch_cycles(mut self, detect: bool) -> Self {
        self.config.detect_dispatch_cycles = detect;
        self
    }

    /// Replace the whole resolution configuration
    pub fn config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the composite, fixing its order
    pub fn build(self) -> Composite {
        Composite {
            participants: self.participants,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::CHAIN_SEPARATOR;
    use crate::participant::MixinParticipant;
    #[cfg(feature = "builtin-shapes")]
    use crate::participant::builtin::{
        BORDER_POINTS, COLORED_TRIANGLES, bezier_mixin, fill_triangle_mixin, round_corner_mixin,
        shape, visible_bezier_shape, visible_round_corner_shape, visible_shape,
    };

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_single_terminal_participant() {
        let composite = Composite::builder().participant(shape()).build();
        assert_eq!(
            composite.resolve(BORDER_POINTS).unwrap(),
            "Shape.get_border_points"
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_non_declaring_participants_are_skipped() {
        // FillTriangleMixin declares only get_colored_triangles, so the
        // border-point chain runs straight from BezierMixin to Shape.
        let composite = visible_bezier_shape();
        assert_eq!(
            composite.resolve(BORDER_POINTS).unwrap(),
            "BezierMixin.get_border_points <- Shape.get_border_points"
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_full_chain_with_dispatch() {
        let composite = visible_round_corner_shape();
        assert_eq!(
            composite.resolve(COLORED_TRIANGLES).unwrap(),
            "FillTriangleMixin.get_colored_triangles <- BezierMixin.get_border_points \
             <- RoundCornerMixin.get_border_points <- Shape.get_border_points"
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_dispatch_re_roots_at_the_top() {
        // The dispatched chain starts from the top of the order, so the
        // mixin declared before the dispatcher still contributes.
        let composite = Composite::builder()
            .participant(bezier_mixin())
            .participant(fill_triangle_mixin())
            .participant(shape())
            .build();
        assert_eq!(
            composite.resolve(COLORED_TRIANGLES).unwrap(),
            "FillTriangleMixin.get_colored_triangles <- BezierMixin.get_border_points \
             <- Shape.get_border_points"
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_order_sensitivity() {
        let a = Composite::builder()
            .participant(bezier_mixin())
            .participant(round_corner_mixin())
            .participant(shape())
            .build();
        let b = Composite::builder()
            .participant(round_corner_mixin())
            .participant(bezier_mixin())
            .participant(shape())
            .build();

        assert_eq!(
            a.resolve(BORDER_POINTS).unwrap(),
            "BezierMixin.get_border_points <- RoundCornerMixin.get_border_points \
             <- Shape.get_border_points"
        );
        assert_eq!(
            b.resolve(BORDER_POINTS).unwrap(),
            "RoundCornerMixin.get_border_points <- BezierMixin.get_border_points \
             <- Shape.get_border_points"
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_resolution_is_idempotent() {
        let composite = visible_round_corner_shape();
        let first = composite.resolve(COLORED_TRIANGLES).unwrap();
        let second = composite.resolve(COLORED_TRIANGLES).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_traced_resolution() {
        let composite = visible_round_corner_shape();
        let resolution = composite.resolve_traced(COLORED_TRIANGLES).unwrap();

        assert_eq!(resolution.participants_consulted, 4);
        assert_eq!(resolution.dispatches, 1);
        assert_eq!(
            resolution.path,
            vec![
                "FillTriangleMixin.get_colored_triangles",
                "BezierMixin.get_border_points",
                "RoundCornerMixin.get_border_points",
                "Shape.get_border_points",
            ]
        );
        assert_eq!(
            resolution.path.join(CHAIN_SEPARATOR),
            resolution.value
        );

        let again = composite.resolve_traced(COLORED_TRIANGLES).unwrap();
        assert_eq!(again.value, resolution.value);
        assert_ne!(again.resolution_id, resolution.resolution_id);
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_traced_path_matches_value_for_chained_behavior() {
        let resolution = visible_shape().resolve_traced(BORDER_POINTS).unwrap();
        assert_eq!(
            resolution.value.split(CHAIN_SEPARATOR).collect::<Vec<_>>(),
            resolution.path
        );
    }

    #[cfg(feature = "builtin-shapes")]
    #[test]
    fn test_resolution_order_listing() {
        let composite = visible_round_corner_shape();
        assert_eq!(
            composite.resolution_order(&BORDER_POINTS.into()),
            vec!["BezierMixin", "RoundCornerMixin", "Shape"]
        );
        assert_eq!(
            composite.resolution_order(&COLORED_TRIANGLES.into()),
            vec!["FillTriangleMixin"]
        );
    }

    #[test]
    fn test_empty_composite() {
        let composite = Composite::builder().build();
        assert!(matches!(
            composite.resolve("anything"),
            Err(ResolveError::EmptyComposite)
        ));
        assert!(matches!(
            composite.validate(),
            Err(ResolveError::EmptyComposite)
        ));
    }

    #[test]
    fn test_undeclared_behavior() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("Base").with_terminal("draw"))
            .build();
        assert!(matches!(
            composite.resolve("paint"),
            Err(ResolveError::UndeclaredBehavior(_))
        ));
    }

    #[test]
    fn test_validate_rejects_trailing_defer() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("OnlyMixin").with_defer("draw"))
            .build();
        assert!(matches!(
            composite.validate(),
            Err(ResolveError::MissingTerminalImplementation { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_well_formed_order() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("Outer").with_defer("draw"))
            .participant(MixinParticipant::new("Base").with_terminal("draw"))
            .build();
        composite.validate().unwrap();
    }

    #[test]
    fn test_delegate_past_end_fails_at_resolution_time() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("OnlyMixin").with_defer("draw"))
            .build();
        assert!(matches!(
            composite.resolve("draw"),
            Err(ResolveError::MissingTerminalImplementation { .. })
        ));
    }

    #[test]
    fn test_dispatch_cycle_detection() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("Ping").with_dispatch("ping", "pong"))
            .participant(MixinParticipant::new("Pong").with_dispatch("pong", "ping"))
            .build();

        let result = composite.resolve("ping");
        match result {
            Err(ResolveError::DispatchCycle { path }) => {
                assert_eq!(path, vec!["ping", "pong", "ping"]);
            }
            other => panic!("expected dispatch cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dispatch_is_a_cycle() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("Echo").with_dispatch("echo", "echo"))
            .build();
        assert!(matches!(
            composite.resolve("echo"),
            Err(ResolveError::DispatchCycle { .. })
        ));
    }

    #[test]
    fn test_dispatch_depth_guard() {
        // With cycle detection off, the depth guard stops the recursion.
        let composite = Composite::builder()
            .participant(MixinParticipant::new("Echo").with_dispatch("echo", "echo"))
            .detect_dispatch_cycles(false)
            .max_dispatch_depth(4)
            .build();
        assert!(matches!(
            composite.resolve("echo"),
            Err(ResolveError::DispatchDepthExceeded(4))
        ));
    }

    #[test]
    fn test_dispatch_depth_counts_only_dispatched_frames() {
        // Resolving "a" takes two dispatches (a -> b -> c); a depth limit
        // of two admits it, a limit of one does not. The root behavior's
        // own frame never counts toward the limit.
        let builder = || {
            Composite::builder()
                .participant(MixinParticipant::new("A").with_dispatch("a", "b"))
                .participant(MixinParticipant::new("B").with_dispatch("b", "c"))
                .participant(MixinParticipant::new("C").with_terminal("c"))
        };

        let roomy = builder().max_dispatch_depth(2).build();
        assert_eq!(roomy.resolve("a").unwrap(), "A.a <- B.b <- C.c");

        let tight = builder().max_dispatch_depth(1).build();
        assert!(matches!(
            tight.resolve("a"),
            Err(ResolveError::DispatchDepthExceeded(1))
        ));
    }

    #[test]
    fn test_zero_dispatch_depth_rejects_the_first_dispatch() {
        let composite = Composite::builder()
            .participant(MixinParticipant::new("A").with_dispatch("a", "b"))
            .participant(MixinParticipant::new("B").with_terminal("b"))
            .max_dispatch_depth(0)
            .build();
        assert!(matches!(
            composite.resolve("a"),
            Err(ResolveError::DispatchDepthExceeded(0))
        ));
    }

    #[test]
    fn test_resolve_config_defaults() {
        let config = ResolveConfig::default();
        assert_eq!(config.max_dispatch_depth, 16);
        assert!(config.detect_dispatch_cycles);
    }

    #[test]
    fn test_resolve_config_serialization() {
        let config = ResolveConfig {
            max_dispatch_depth: 4,
            detect_dispatch_cycles: false,
        };
        let json_str = serde_json::to_string(&config).unwrap();
        let deserialized: ResolveConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config, deserialized);
    }
}
