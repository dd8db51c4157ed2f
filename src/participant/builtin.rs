//! Built-in participant roster
//!
//! This module provides the Shape/mixin participants and the preassembled
//! composites of the classic geometric hierarchy (feature: `builtin-shapes`).
//!
//! The roster demonstrates every contribution kind: `Shape` terminates the
//! border-point chain, `BezierMixin` and `RoundCornerMixin` defer along it,
//! and `FillTriangleMixin` dispatches into it from the colored-triangle
//! behavior.

use super::MixinParticipant;
use crate::composite::Composite;

/// Behavior resolved along the border-point chain
pub const BORDER_POINTS: &str = "get_border_points";

/// Behavior that dispatches into the border-point chain
pub const COLORED_TRIANGLES: &str = "get_colored_triangles";

/// The base role: terminates the border-point chain
pub fn shape() -> MixinParticipant {
    MixinParticipant::new("Shape").with_terminal(BORDER_POINTS)
}

/// A mixin that prefixes its segment onto the border-point chain
pub fn bezier_mixin() -> MixinParticipant {
    MixinParticipant::new("BezierMixin").with_defer(BORDER_POINTS)
}

/// A mixin that prefixes its segment onto the border-point chain
pub fn round_corner_mixin() -> MixinParticipant {
    MixinParticipant::new("RoundCornerMixin").with_defer(BORDER_POINTS)
}

/// A mixin whose colored-triangle behavior dispatches the border-point chain
pub fn fill_triangle_mixin() -> MixinParticipant {
    MixinParticipant::new("FillTriangleMixin").with_dispatch(COLORED_TRIANGLES, BORDER_POINTS)
}

/// `[FillTriangleMixin, Shape]`
pub fn visible_shape() -> Composite {
    Composite::builder()
        .participant(fill_triangle_mixin())
        .participant(shape())
        .build()
}

/// `[BezierMixin, FillTriangleMixin, Shape]`
pub fn visible_bezier_shape() -> Composite {
    Composite::builder()
        .participant(bezier_mixin())
        .participant(fill_triangle_mixin())
        .participant(shape())
        .build()
}

/// `[FillTriangleMixin, BezierMixin, RoundCornerMixin, Shape]`
///
/// The participant order matters: swapping the mixins changes the composed
/// value.
pub fn visible_round_corner_shape() -> Composite {
    Composite::builder()
        .participant(fill_triangle_mixin())
        .participant(bezier_mixin())
        .participant(round_corner_mixin())
        .participant(shape())
        .build()
}
