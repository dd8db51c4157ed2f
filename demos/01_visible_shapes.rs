//! 🔷 Mixchain Visible Shapes
//!
//! The classic mixin hierarchy expressed as explicit composites.
//! Each composite fixes a resolution order; resolving a behavior walks that
//! order and composes one string from the participants' segments.

use mixchain::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔷 Welcome to Mixchain!");
    println!("Delegation chains over an explicit participant order\n");

    // Phase 1: The smallest possible chain
    println!("📝 [Shape]");
    let plain = Composite::builder().participant(shape()).build();
    println!("  get_border_points = {}", plain.resolve(BORDER_POINTS)?);

    // Phase 2: A mixin prefixes its segment onto the chain
    println!("\n📝 [BezierMixin, FillTriangleMixin, Shape]");
    let bezier = visible_bezier_shape();
    println!("  get_border_points = {}", bezier.resolve(BORDER_POINTS)?);
    println!("  (FillTriangleMixin declares no border points, so it is skipped)");

    // Phase 3: A dispatching behavior re-enters the full order
    println!("\n📝 [FillTriangleMixin, BezierMixin, RoundCornerMixin, Shape]");
    let round = visible_round_corner_shape();
    println!("  get_colored_triangles = {}", round.resolve(COLORED_TRIANGLES)?);

    // Phase 4: Order is data, and changing it changes the output
    println!("\n🔀 Swapping BezierMixin and RoundCornerMixin...");
    let swapped = Composite::builder()
        .participant(fill_triangle_mixin())
        .participant(round_corner_mixin())
        .participant(bezier_mixin())
        .participant(shape())
        .build();
    println!("  get_colored_triangles = {}", swapped.resolve(COLORED_TRIANGLES)?);

    // Show what the resolver saw along the way
    println!("\n📊 Resolution trace for the original order:");
    let resolution = round.resolve_traced(COLORED_TRIANGLES)?;
    println!("  🛤️  Path: {:?}", resolution.path);
    println!("  👥 Participants consulted: {}", resolution.participants_consulted);
    println!("  🔁 Cross-behavior dispatches: {}", resolution.dispatches);

    println!("\n🎯 What's Next?");
    println!("  📚 Try: cargo run --example 02_catalog_layouts");
    println!("  📚 Then: cargo run --example 03_custom_participants");

    Ok(())
}
