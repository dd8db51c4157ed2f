//! 🗂️ Mixchain Catalog Layouts
//!
//! Resolution order as configuration: composite layouts live in a JSON file
//! and are assembled against a catalog of registered participants.

use mixchain::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🗂️ Mixchain catalog layouts\n");

    // Phase 1: Write a layout file describing three composites
    println!("📝 Writing composite layouts to a JSON file...");
    let temp_dir = tempfile::tempdir()?;
    let layout_path = temp_dir.path().join("shapes.json");

    let layouts = vec![
        CompositeLayout::new("visible_shape", ["FillTriangleMixin", "Shape"]),
        CompositeLayout::new(
            "visible_bezier_shape",
            ["BezierMixin", "FillTriangleMixin", "Shape"],
        ),
        CompositeLayout::new(
            "visible_round_corner_shape",
            ["FillTriangleMixin", "BezierMixin", "RoundCornerMixin", "Shape"],
        ),
    ];
    save_layouts(&layout_path, &layouts)?;
    println!("✅ Saved {} layouts to {}", layouts.len(), layout_path.display());

    // Phase 2: Load them back and assemble against the builtin roster
    println!("\n🔧 Loading layouts and assembling composites...");
    let catalog = ParticipantCatalog::with_builtin_shapes();
    println!("  Registered tags: {:?}", catalog.tags());

    for layout in load_layouts(&layout_path)? {
        let composite = catalog.assemble(&layout)?;
        composite.validate()?;
        println!("\n  📐 {} {:?}", layout.name, composite.tags());
        println!("     get_colored_triangles = {}", composite.resolve(COLORED_TRIANGLES)?);
    }

    println!("\n💡 Edit the JSON file to reorder participants; no recompilation needed.");

    Ok(())
}
