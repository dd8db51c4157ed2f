//! # Mixchain
//!
//! Explicit delegation chains in Rust: an ordered list of participants
//! cooperatively composes a string value, each participant prefixing its own
//! segment before handing control to the next one.
//!
//! Mixchain models cooperative method chaining as a **Composite + Chain**:
//! - **Participant**: a named unit contributing an optional prefix for the
//!   behaviors it declares
//! - **Composite**: a fixed ordered sequence of participants defining one
//!   resolution order
//! - **Chain**: the explicit "call the next one" context handed to each
//!   consulted participant
//!
//! Resolution order is explicit data, supplied by the builder in code or by a
//! layout file, never inferred from a type hierarchy.
//!
//! ## 🏗️ Feature Architecture
//!
//! ### Core Modules
//! - `behavior`: behavior identities, contribution kinds, segment formatting
//! - `participant`: the `Participant` trait plus declarative and
//!   closure-backed implementations
//! - `composite`: the composite, its builder, the resolver, and resolution
//!   traces
//!
//! ### Built-in Components
//! - `builtin-shapes`: the Shape/mixin participant roster and its
//!   preassembled composites
//!
//! ### Configuration Layer
//! - `catalog`: participants registered by tag and JSON composite layouts
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use mixchain::prelude::*;
//!
//! let composite = Composite::builder()
//!     .participant(MixinParticipant::new("BezierMixin").with_defer("get_border_points"))
//!     .participant(MixinParticipant::new("Shape").with_terminal("get_border_points"))
//!     .build();
//!
//! let value = composite.resolve("get_border_points")?;
//! assert_eq!(value, "BezierMixin.get_border_points <- Shape.get_border_points");
//! # Ok::<(), mixchain::MixchainError>(())
//! ```

// ============================================================================
// CORE MODULES (always available)
// ============================================================================

pub mod behavior;
pub mod composite;
pub mod participant;

#[cfg(feature = "catalog")]
pub mod catalog;

// ============================================================================
// CORE RE-EXPORTS
// ============================================================================

// Behavior vocabulary - always available
pub use behavior::{Behavior, CHAIN_SEPARATOR, Contribution};

// Participant system - always available
pub use participant::{FunctionParticipant, MixinParticipant, Participant};

// Composite system - always available
pub use composite::{
    Chain, Composite, CompositeBuilder, Resolution, ResolveConfig, ResolveError,
};

// ============================================================================
// BUILTIN COMPONENTS RE-EXPORTS (feature-gated)
// ============================================================================

/// The built-in shape roster
#[cfg(feature = "builtin-shapes")]
pub use participant::builtin::{
    BORDER_POINTS, COLORED_TRIANGLES, bezier_mixin, fill_triangle_mixin, round_corner_mixin,
    shape, visible_bezier_shape, visible_round_corner_shape, visible_shape,
};

/// The configuration layer
#[cfg(feature = "catalog")]
pub use catalog::{
    CatalogError, CompositeLayout, ParticipantCatalog, load_layouts, save_layouts,
};

// ============================================================================
// CONVENIENCE RE-EXPORTS
// ============================================================================

/// Convenient re-exports for common types and traits
pub mod prelude {
    // Core types - always available
    pub use crate::{
        Behavior, CHAIN_SEPARATOR, Chain, Composite, CompositeBuilder, Contribution,
        FunctionParticipant, MixchainError, MixchainResult, MixinParticipant, Participant,
        Resolution, ResolveConfig, ResolveError,
    };

    // Built-in shape roster - feature-gated
    #[cfg(feature = "builtin-shapes")]
    pub use crate::participant::builtin::{
        BORDER_POINTS, COLORED_TRIANGLES, bezier_mixin, fill_triangle_mixin, round_corner_mixin,
        shape, visible_bezier_shape, visible_round_corner_shape, visible_shape,
    };

    // Configuration layer - feature-gated
    #[cfg(feature = "catalog")]
    pub use crate::catalog::{
        CatalogError, CompositeLayout, ParticipantCatalog, load_layouts, save_layouts,
    };
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Result type alias for mixchain operations
pub type MixchainResult<T> = Result<T, MixchainError>;

/// Common error type for mixchain operations
#[derive(Debug, thiserror::Error)]
pub enum MixchainError {
    /// Error during composite resolution
    #[error("resolution error: {0}")]
    Resolve(#[from] composite::ResolveError),

    /// Error from the participant catalog or layout files
    #[cfg(feature = "catalog")]
    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    /// Error during serialization/deserialization
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// INTEGRATION TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let behavior: Behavior = "get_border_points".into();
        assert_eq!(behavior.name(), "get_border_points");

        let composite = Composite::builder()
            .participant(MixinParticipant::new("Outer").with_defer(behavior.clone()))
            .participant(MixinParticipant::new("Base").with_terminal(behavior.clone()))
            .build();

        composite.validate().unwrap();
        assert_eq!(
            composite.resolve(behavior).unwrap(),
            "Outer.get_border_points <- Base.get_border_points"
        );
    }

    #[test]
    fn test_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_error.is_err());

        let error: MixchainError = json_error.unwrap_err().into();
        assert!(matches!(error, MixchainError::Serialization(_)));

        let error: MixchainError = ResolveError::EmptyComposite.into();
        assert!(matches!(error, MixchainError::Resolve(_)));
    }

    #[cfg(feature = "catalog")]
    #[test]
    fn test_catalog_error_conversion() {
        let error: MixchainError = CatalogError::DuplicateTag("Shape".to_string()).into();
        assert!(matches!(error, MixchainError::Catalog(_)));
        assert!(error.to_string().contains("Shape"));
    }
}
