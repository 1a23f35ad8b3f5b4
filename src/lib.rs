//! # Quire
//!
//! A schema-driven document renderer with reflow pagination.
//!
//! Quire turns a data-bound template into fixed-size pages. Content heights
//! are not known in advance: they only exist after a layout pass commits, so
//! the pipeline is explicitly phased and every pagination result is computed
//! from scratch, compared structurally, and published only when it actually
//! changed.
//!
//! ## Architecture
//!
//! ```text
//! template + data (JSON)
//!        ↓
//!   [binding]   - bind-descriptors and {{token}} strings against the payload
//!        ↓
//!   [render]    - recursive schema interpreter, repeat expansion
//!        ↓
//!   [measure]   - partition into units via an injected layout provider
//!        ↓
//!   [paginate]  - greedy packing into pages, avoid-range break planning
//!        ↓
//!   [reflow]    - trigger/settle/publish state machine
//!        ↓
//!   [print]     - physical sheets (zoom-independent) + preview geometry
//! ```
//!
//! The engine is single-threaded and cooperative. The only suspension point
//! is the layout-settled signal between rendering and measuring; everything
//! else is a pure function of its inputs.

pub mod binding;
pub mod error;
pub mod estimate;
pub mod measure;
pub mod model;
pub mod paginate;
pub mod print;
pub mod render;
pub mod reflow;

pub use error::QuireError;

use measure::{measure_units, LayoutProvider};
use model::Template;
use paginate::{pack, Page};
use render::render_document;
use serde_json::Value;

/// Render a template against a data payload and pack the result into pages.
///
/// This is the primary one-shot entry point. Interactive callers that need
/// supersession and publish suppression drive [`reflow::ReflowController`]
/// instead.
pub fn paginate<P: LayoutProvider>(
    template: &Template,
    data: &Value,
    provider: &P,
) -> Result<Vec<Page>, QuireError> {
    let content = render_document(template, data);
    let units = measure_units(&content, provider)?;
    Ok(pack(units, template.page.usable_height()))
}

/// Paginate a template and data payload supplied as JSON strings.
pub fn paginate_json<P: LayoutProvider>(
    template_json: &str,
    data_json: &str,
    provider: &P,
) -> Result<Vec<Page>, QuireError> {
    let template: Template =
        serde_json::from_str(template_json).map_err(|e| QuireError::parse("template", e))?;
    let data: Value =
        serde_json::from_str(data_json).map_err(|e| QuireError::parse("data", e))?;
    paginate(&template, &data, provider)
}
