//! # Schema Model
//!
//! The input representation for the rendering engine. A template is a tree of
//! schema nodes, each with a type, a bag of bindable props, and children.
//! This is designed to be easily produced by a visual editor, stored as JSON,
//! and re-rendered against a fresh data payload on every edit.
//!
//! The node vocabulary is intentionally small and closed: flow containers
//! (Stack, Row), content leaves (Text, Heading, Image, Divider), a plain
//! group (Box), and one critical addition: **PageBlock**, a subtree that the
//! paginator must never split across pages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A complete template ready for rendering: root nodes, injected style
/// constants, and the page configuration the paginator works against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// The root nodes of the document, rendered and paginated in order.
    pub children: Vec<SchemaNode>,

    /// Style constants injected into the binding context. Templates reference
    /// them with the same `{{token}}` / bind-descriptor syntax as data.
    #[serde(default)]
    pub constants: Map<String, Value>,

    /// Physical page configuration used by the packer and the print adapter.
    #[serde(default)]
    pub page: PageOptions,
}

/// A node in the template tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// What kind of node this is.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// A stable identifier, used as the node's content-identity key when
    /// present (optional, useful for diffing and debugging).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Prop values. Each value may be a literal, a bind-descriptor
    /// (`{"bind": "path", "default": ...}`), or a `{{token}}` template
    /// string; all three resolve through the binding resolver.
    #[serde(default)]
    pub props: Map<String, Value>,

    /// Child nodes.
    #[serde(default)]
    pub children: Vec<SchemaNode>,

    /// Dot-path of an array in the binding context. When present, `children`
    /// are rendered once per array element against a merged child context,
    /// and the results are concatenated in array order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
}

/// The closed node vocabulary.
///
/// Unknown type strings deserialize to [`NodeType::Unknown`], which the
/// renderer warns about and skips. Malformed template data is an isolated,
/// non-fatal fault, while the renderer's `match` stays exhaustive so an
/// unsupported variant is a compile-time-visible gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Vertical flow container with an optional `gap` prop.
    Stack,
    /// Horizontal flow container with an optional `gap` prop.
    Row,
    /// Text leaf; `content` prop goes through template substitution.
    Text,
    /// Heading leaf; `level` prop is clamped to 1..=6.
    Heading,
    /// Image leaf; renders nothing when `src` resolves empty.
    Image,
    /// A visual rule with no content.
    Divider,
    /// A plain group.
    Box,
    /// An atomic pagination boundary: never split across pages, except when
    /// it alone exceeds a full page.
    PageBlock,
    /// Catch-all for vocabulary this engine does not know.
    Unknown,
}

impl NodeType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "stack" => NodeType::Stack,
            "row" => NodeType::Row,
            "text" => NodeType::Text,
            "heading" => NodeType::Heading,
            "image" => NodeType::Image,
            "divider" => NodeType::Divider,
            "box" => NodeType::Box,
            "page-block" => NodeType::PageBlock,
            _ => NodeType::Unknown,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeType::Stack => "stack",
            NodeType::Row => "row",
            NodeType::Text => "text",
            NodeType::Heading => "heading",
            NodeType::Image => "image",
            NodeType::Divider => "divider",
            NodeType::Box => "box",
            NodeType::PageBlock => "page-block",
            NodeType::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeType::from_tag(&tag))
    }
}

/// Configuration for the physical page: size and per-page padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Padding framing the content area of every page, in CSS pixels.
    #[serde(default = "default_padding")]
    pub padding: Edges,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            padding: default_padding(),
        }
    }
}

fn default_padding() -> Edges {
    Edges::uniform(48.0)
}

impl PageOptions {
    /// Height of the content area a single page offers to the packer.
    pub fn usable_height(&self) -> f64 {
        let (_, h) = self.size.dimensions_px();
        (h - self.padding.vertical()).max(0.0)
    }

    /// Width of the content area, the target width content is rendered at.
    pub fn content_width(&self) -> f64 {
        let (w, _) = self.size.dimensions_px();
        (w - self.padding.horizontal()).max(0.0)
    }
}

/// Supported physical page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Returns (width, height) in CSS pixels at 96 DPI.
    pub fn dimensions_px(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (794.0, 1123.0),    // 210mm x 297mm
            PageSize::Letter => (816.0, 1056.0), // 8.5in x 11in
        }
    }
}

/// Edge values (top, right, bottom, left) used for page padding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// The discrete preview zoom presets offered by the surrounding UI.
pub const ZOOM_PRESETS: &[u16] = &[25, 50, 75, 100, 125, 150, 200, 300];

/// Clamp an arbitrary zoom percentage into the supported preview range
/// (the first and last entries of [`ZOOM_PRESETS`]).
pub fn clamp_zoom(percent: u16) -> u16 {
    percent.clamp(25, 300)
}
