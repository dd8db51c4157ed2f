//! 🧩 Mixchain Custom Participants
//!
//! Building chains from your own participant types: a hand-implemented
//! `Participant`, a declarative `MixinParticipant`, and a closure-backed
//! `FunctionParticipant`, with tracing output enabled so the resolver's
//! events are visible.

use mixchain::prelude::*;

/// A trait-implemented participant that annotates the rest of the chain
/// with how many segments follow it.
struct CountingMixin;

impl Participant for CountingMixin {
    fn tag(&self) -> &str {
        "CountingMixin"
    }

    fn behaviors(&self) -> Vec<Behavior> {
        vec!["describe".into()]
    }

    fn invoke(&self, chain: Chain<'_>) -> Result<String, ResolveError> {
        let segment = chain.segment();
        let rest = chain.delegate()?;
        let remaining = rest.split(CHAIN_SEPARATOR).count();
        Ok(format!("{segment}({remaining} below) <- {rest}"))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Show the resolver's debug and trace events on stderr
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("🧩 Mixchain custom participants\n");

    // Phase 1: A chain mixing all three participant styles
    println!("📝 Building a composite from three participant styles...");
    let shouty = FunctionParticipant::new("ShoutyMixin", ["describe"], |chain| {
        let segment = chain.segment().to_uppercase();
        let rest = chain.delegate()?;
        Ok(format!("{segment} <- {rest}"))
    });

    let composite = Composite::builder()
        .participant(CountingMixin)
        .participant(shouty)
        .participant(MixinParticipant::new("Base").with_terminal("describe"))
        .build();

    composite.validate()?;
    println!("  Order: {:?}", composite.tags());
    println!("  describe = {}", composite.resolve("describe")?);

    // Phase 2: Inspect the trace
    println!("\n📊 Traced resolution:");
    let resolution = composite.resolve_traced("describe")?;
    println!("  🆔 Resolution id: {}", resolution.resolution_id);
    println!("  🛤️  Path: {:?}", resolution.path);
    println!("  👥 Consulted: {}", resolution.participants_consulted);

    Ok(())
}
