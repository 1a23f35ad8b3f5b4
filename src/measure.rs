//! Block measurer.
//!
//! Partitions the rendered content tree's top-level children into measured
//! units. Atomic children (page blocks) become indivisible units of their
//! own; runs of ordinary siblings are grouped and measured as one span so
//! that collapsed inter-sibling margins are accounted for exactly once.
//!
//! Geometry comes from an injected [`LayoutProvider`]. The engine never
//! reads ambient layout state; a deterministic fake provider makes the
//! measurer and packer fully unit-testable, and the real provider is only
//! consulted after the reflow controller reports layout as settled.

use serde::Serialize;

use crate::error::QuireError;
use crate::paginate::AvoidRange;
use crate::render::RenderedNode;

/// Committed block geometry for one rendered node, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    /// Border-box height, excluding margins.
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl BlockMetrics {
    /// Height including both vertical margins.
    pub fn outer_height(&self) -> f64 {
        self.height + self.margin_top + self.margin_bottom
    }
}

/// The capability that reports committed geometry for rendered blocks.
///
/// Returning `None` means the backing container disappeared mid-pass (for a
/// DOM-backed provider: the hidden measurement subtree was torn down). The
/// whole pass is abandoned; there is no partial result.
pub trait LayoutProvider {
    fn measure(&self, node: &RenderedNode) -> Option<BlockMetrics>;
}

/// The smallest chunk the packer considers: either one atomic block, or a
/// grouped run of ordinary siblings measured as a single span.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub nodes: Vec<RenderedNode>,
    /// Span height including collapsed vertical margins of the group.
    pub height: f64,
    /// Indivisible: never grouped, never split (except the oversized escape
    /// valve in the packer).
    pub atomic: bool,
}

impl Unit {
    /// Ordered content-identity keys, the basis of structural comparison.
    pub fn content_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.key.as_str())
    }
}

/// Partition the content root's direct children into ordered units.
///
/// A childless root is itself one unit, so an empty document still produces
/// a page instead of nothing.
pub fn measure_units<P: LayoutProvider>(
    root: &RenderedNode,
    provider: &P,
) -> Result<Vec<Unit>, QuireError> {
    if root.children.is_empty() {
        let metrics = provider.measure(root).ok_or(QuireError::MeasurementRace)?;
        return Ok(vec![Unit {
            nodes: vec![root.clone()],
            height: metrics.outer_height(),
            atomic: false,
        }]);
    }

    let mut units = Vec::new();
    let mut run: Vec<(&RenderedNode, BlockMetrics)> = Vec::new();
    for child in &root.children {
        let metrics = provider.measure(child).ok_or(QuireError::MeasurementRace)?;
        if child.atomic {
            flush_run(&mut run, &mut units);
            units.push(Unit {
                nodes: vec![child.clone()],
                height: metrics.outer_height(),
                atomic: true,
            });
        } else {
            run.push((child, metrics));
        }
    }
    flush_run(&mut run, &mut units);
    Ok(units)
}

fn flush_run(run: &mut Vec<(&RenderedNode, BlockMetrics)>, units: &mut Vec<Unit>) {
    if run.is_empty() {
        return;
    }
    units.push(Unit {
        nodes: run.iter().map(|(node, _)| (*node).clone()).collect(),
        height: span_height(run),
        atomic: false,
    });
    run.clear();
}

/// First-to-last span height of a sibling run. Adjacent vertical margins
/// collapse to their maximum, so this is not the sum of outer heights.
fn span_height(run: &[(&RenderedNode, BlockMetrics)]) -> f64 {
    let mut height = run[0].1.margin_top;
    for (i, (_, metrics)) in run.iter().enumerate() {
        height += metrics.height;
        match run.get(i + 1) {
            Some((_, next)) => height += metrics.margin_bottom.max(next.margin_top),
            None => height += metrics.margin_bottom,
        }
    }
    height
}

/// The continuous-flow view of the same content: total scroll height plus
/// the vertical spans of atomic blocks, which a break must never fall inside.
#[derive(Debug, Clone)]
pub struct ContinuousFlow {
    pub height: f64,
    pub avoid: Vec<AvoidRange>,
}

/// Measure the content as one continuous stream, using the same margin
/// collapsing rules as [`measure_units`], and derive the avoid-ranges for
/// the offset-based packer.
pub fn continuous_flow<P: LayoutProvider>(
    root: &RenderedNode,
    provider: &P,
) -> Result<ContinuousFlow, QuireError> {
    let mut y = 0.0;
    let mut avoid = Vec::new();
    let mut prev_bottom_margin: Option<f64> = None;
    for child in &root.children {
        let metrics = provider.measure(child).ok_or(QuireError::MeasurementRace)?;
        let lead = match prev_bottom_margin {
            Some(prev) => prev.max(metrics.margin_top),
            None => metrics.margin_top,
        };
        let top = y + lead;
        let bottom = top + metrics.height;
        if child.atomic {
            avoid.push(AvoidRange { top, bottom });
        }
        y = bottom;
        prev_bottom_margin = Some(metrics.margin_bottom);
    }
    Ok(ContinuousFlow {
        height: y + prev_bottom_margin.unwrap_or(0.0),
        avoid,
    })
}
