//! # Participant Catalog and Composite Layouts
//!
//! This module treats resolution order as external configuration (feature:
//! `catalog`). Participants are registered by tag in a
//! [`ParticipantCatalog`]; a [`CompositeLayout`] is a serializable ordered
//! tag list that the catalog assembles into a [`Composite`]. Layouts live in
//! JSON files, so a composite's order can be changed without recompiling.
//!
//! ```json
//! [
//!   { "name": "visible_round_corner_shape",
//!     "order": ["FillTriangleMixin", "BezierMixin", "RoundCornerMixin", "Shape"] }
//! ]
//! ```

use crate::composite::{Composite, ResolveConfig};
use crate::participant::Participant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Errors from catalog registration, assembly, and layout file I/O
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error reading or writing a layout file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A participant with this tag is already registered
    #[error("participant tag '{0}' is already registered")]
    DuplicateTag(String),

    /// A layout references a tag the catalog does not know
    #[error("layout '{layout}' references unknown tag '{tag}'")]
    UnknownTag { layout: String, tag: String },

    /// A layout's order is empty
    #[error("layout '{0}' has an empty order")]
    EmptyLayout(String),
}

/// A serializable description of one composite: a name and an ordered tag
/// list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeLayout {
    /// Name of the composite this layout describes
    pub name: String,
    /// Participant tags in resolution order
    pub order: Vec<String>,
}

impl CompositeLayout {
    /// Create a layout from a name and an ordered tag list
    pub fn new<S, I, T>(name: S, order: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            order: order.into_iter().map(Into::into).collect(),
        }
    }
}

/// Load composite layouts from a JSON file
pub fn load_layouts<P: AsRef<Path>>(path: P) -> Result<Vec<CompositeLayout>, CatalogError> {
    let content = fs::read_to_string(path.as_ref())?;
    let layouts: Vec<CompositeLayout> = serde_json::from_str(&content)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = layouts.len(),
        "loaded composite layouts"
    );
    Ok(layouts)
}

/// Save composite layouts to a JSON file
pub fn save_layouts<P: AsRef<Path>>(
    path: P,
    layouts: &[CompositeLayout],
) -> Result<(), CatalogError> {
    let json_data = serde_json::to_string_pretty(layouts)?;
    fs::write(path.as_ref(), json_data)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = layouts.len(),
        "saved composite layouts"
    );
    Ok(())
}

/// Participants registered by unique tag, ready to assemble layouts
#[derive(Default)]
pub struct ParticipantCatalog {
    participants: HashMap<String, Arc<dyn Participant>>,
}

impl ParticipantCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            participants: HashMap::new(),
        }
    }

    /// Create a catalog preloaded with the built-in shape roster
    #[cfg(feature = "builtin-shapes")]
    pub fn with_builtin_shapes() -> Self {
        let mut participants: HashMap<String, Arc<dyn Participant>> = HashMap::new();
        for participant in [
            crate::participant::builtin::shape(),
            crate::participant::builtin::fill_triangle_mixin(),
            crate::participant::builtin::bezier_mixin(),
            crate::participant::builtin::round_corner_mixin(),
        ] {
            let participant: Arc<dyn Participant> = Arc::new(participant);
            participants.insert(participant.tag().to_string(), participant);
        }
        Self { participants }
    }

    /// Register a participant under its tag
    pub fn register(&mut self, participant: impl Participant + 'static) -> Result<(), CatalogError> {
        self.register_shared(Arc::new(participant))
    }

    /// Register an already shared participant under its tag
    pub fn register_shared(
        &mut self,
        participant: Arc<dyn Participant>,
    ) -> Result<(), CatalogError> {
        let tag = participant.tag().to_string();
        if self.participants.contains_key(&tag) {
            return Err(CatalogError::DuplicateTag(tag));
        }
        self.participants.insert(tag, participant);
        Ok(())
    }

    /// Look up a registered participant by tag
    pub fn get(&self, tag: &str) -> Option<&Arc<dyn Participant>> {
        self.participants.get(tag)
    }

    /// Registered tags, sorted for stable iteration
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.participants.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Number of registered participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the catalog has no participants
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Assemble a layout into a composite with the default configuration
    pub fn assemble(&self, layout: &CompositeLayout) -> Result<Composite, CatalogError> {
        self.assemble_with_config(layout, ResolveConfig::default())
    }

    /// Assemble a layout into a composite with an explicit configuration
    pub fn assemble_with_config(
        &self,
        layout: &CompositeLayout,
        config: ResolveConfig,
    ) -> Result<Composite, CatalogError> {
        if layout.order.is_empty() {
            return Err(CatalogError::EmptyLayout(layout.name.clone()));
        }

        let mut builder = Composite::builder().config(config);
        for tag in &layout.order {
            let participant = self.get(tag).ok_or_else(|| CatalogError::UnknownTag {
                layout: layout.name.clone(),
                tag: tag.clone(),
            })?;
            builder = builder.shared(Arc::clone(participant));
        }
        Ok(builder.build())
    }
}
