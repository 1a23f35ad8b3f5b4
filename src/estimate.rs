//! Estimated layout provider.
//!
//! A deterministic, pure-Rust [`LayoutProvider`] built on simple typographic
//! estimates: average character width for line wrapping, fixed per-kind
//! vertical margins, gap accounting for containers. It backs the CLI binary
//! and doubles as a stable provider in tests.
//!
//! This is an estimator, not a layout engine: it makes no fidelity claims
//! against any real renderer, it only has to be consistent with itself so
//! that pagination is reproducible.

use crate::measure::{BlockMetrics, LayoutProvider};
use crate::render::{RenderedKind, RenderedNode};

const BODY_FONT_SIZE: f64 = 14.0;
const LINE_HEIGHT_FACTOR: f64 = 1.5;
const AVG_CHAR_WIDTH_FACTOR: f64 = 0.52;
const HEADING_SIZES: [f64; 6] = [28.0, 22.0, 18.0, 15.0, 13.0, 12.0];
const DIVIDER_RULE_HEIGHT: f64 = 1.0;
const DEFAULT_IMAGE_HEIGHT: f64 = 120.0;

/// Estimates block geometry at a fixed content width.
#[derive(Debug, Clone)]
pub struct EstimatedLayout {
    content_width: f64,
}

impl EstimatedLayout {
    pub fn new(content_width: f64) -> Self {
        EstimatedLayout {
            content_width: content_width.max(1.0),
        }
    }

    fn node_height(&self, node: &RenderedNode, width: f64) -> f64 {
        match &node.kind {
            RenderedKind::Text { content } => text_height(content, BODY_FONT_SIZE, width),
            RenderedKind::Heading { level, content } => {
                let size = HEADING_SIZES[usize::from((*level).clamp(1, 6)) - 1];
                text_height(content, size, width)
            }
            RenderedKind::Image { height, .. } => (*height).unwrap_or(DEFAULT_IMAGE_HEIGHT),
            RenderedKind::Divider => DIVIDER_RULE_HEIGHT,
            RenderedKind::Stack { gap } => self.stacked_height(&node.children, *gap, width),
            RenderedKind::Box => self.stacked_height(&node.children, 0.0, width),
            RenderedKind::Row { gap } => {
                let count = node.children.len();
                if count == 0 {
                    return 0.0;
                }
                let column = ((width - gap * (count as f64 - 1.0)) / count as f64).max(1.0);
                self.max_outer_height(&node.children, column)
            }
        }
    }

    fn stacked_height(&self, children: &[RenderedNode], gap: f64, width: f64) -> f64 {
        let mut height = 0.0;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                height += gap;
            }
            height += self.outer_height(child, width);
        }
        height
    }

    fn max_outer_height(&self, children: &[RenderedNode], width: f64) -> f64 {
        children
            .iter()
            .map(|child| self.outer_height(child, width))
            .fold(0.0, f64::max)
    }

    fn outer_height(&self, node: &RenderedNode, width: f64) -> f64 {
        let (top, bottom) = margins(node);
        self.node_height(node, width) + top + bottom
    }
}

impl LayoutProvider for EstimatedLayout {
    fn measure(&self, node: &RenderedNode) -> Option<BlockMetrics> {
        let (margin_top, margin_bottom) = margins(node);
        Some(BlockMetrics {
            height: self.node_height(node, self.content_width),
            margin_top,
            margin_bottom,
        })
    }
}

/// Fixed vertical margins per node kind, in CSS pixels.
fn margins(node: &RenderedNode) -> (f64, f64) {
    match &node.kind {
        RenderedKind::Heading { .. } => (12.0, 6.0),
        RenderedKind::Text { .. } => (0.0, 4.0),
        RenderedKind::Divider => (8.0, 8.0),
        RenderedKind::Image { .. } => (0.0, 8.0),
        RenderedKind::Stack { .. } | RenderedKind::Row { .. } | RenderedKind::Box => (0.0, 12.0),
    }
}

fn text_height(content: &str, font_size: f64, width: f64) -> f64 {
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let chars_per_line = (width / (font_size * AVG_CHAR_WIDTH_FACTOR)).floor().max(1.0);
    let lines = content
        .split('\n')
        .map(|line| (line.chars().count() as f64 / chars_per_line).ceil().max(1.0))
        .sum::<f64>();
    lines * line_height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(key: &str, content: &str) -> RenderedNode {
        RenderedNode {
            kind: RenderedKind::Text {
                content: content.to_string(),
            },
            key: key.to_string(),
            atomic: false,
            children: vec![],
        }
    }

    #[test]
    fn longer_text_wraps_to_more_lines() {
        let provider = EstimatedLayout::new(400.0);
        let short = provider.measure(&text("a", "hi")).unwrap();
        let long = provider.measure(&text("b", &"word ".repeat(60))).unwrap();
        assert!(long.height > short.height * 2.0);
    }

    #[test]
    fn estimates_are_deterministic() {
        let provider = EstimatedLayout::new(698.0);
        let node = text("a", "Team lead for the storage engine rewrite");
        assert_eq!(provider.measure(&node), provider.measure(&node));
    }

    #[test]
    fn row_height_is_tallest_column() {
        let provider = EstimatedLayout::new(600.0);
        let row = RenderedNode {
            kind: RenderedKind::Row { gap: 16.0 },
            key: "row".to_string(),
            atomic: true,
            children: vec![text("a", "short"), text("b", &"x".repeat(500))],
        };
        let narrow_column = (600.0 - 16.0) / 2.0;
        let tall = provider.measure(&text("b", &"x".repeat(500))).unwrap();
        let row_metrics = provider.measure(&row).unwrap();
        // the long column wraps harder at half width, so the row is taller
        // than the same text measured at full width
        assert!(row_metrics.height > tall.height);
        assert!(narrow_column < 600.0);
    }

    #[test]
    fn stack_gap_adds_between_children_only() {
        let provider = EstimatedLayout::new(600.0);
        let stack = |gap: f64| RenderedNode {
            kind: RenderedKind::Stack { gap },
            key: "s".to_string(),
            atomic: true,
            children: vec![text("a", "one"), text("b", "two"), text("c", "three")],
        };
        let no_gap = provider.measure(&stack(0.0)).unwrap();
        let gapped = provider.measure(&stack(10.0)).unwrap();
        assert_eq!(gapped.height - no_gap.height, 20.0);
    }

    #[test]
    fn image_uses_explicit_height() {
        let provider = EstimatedLayout::new(600.0);
        let image = RenderedNode {
            kind: RenderedKind::Image {
                src: "avatar.png".to_string(),
                width: None,
                height: Some(64.0),
            },
            key: "img".to_string(),
            atomic: false,
            children: vec![],
        };
        assert_eq!(provider.measure(&image).unwrap().height, 64.0);
    }
}
