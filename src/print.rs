//! Print/export adapter and preview geometry.
//!
//! The preview zoom is a view-only transform: it scales what the user sees
//! and nothing else. Export always emits sheets at the physical page size
//! (96 DPI pixels) with the scale reset to 1:1, and forces a hard page break
//! after every sheet except the last.

use serde::Serialize;

use crate::model::{clamp_zoom, Edges, PageOptions};
use crate::paginate::{Page, PageSlice};

/// The printable artifact handed to an external print/download trigger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDocument {
    pub sheets: Vec<PrintSheet>,
    /// Always 1.0: export is independent of the preview zoom.
    pub scale: f64,
}

/// One physical sheet of the artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSheet {
    /// Physical size in CSS pixels at 96 DPI.
    pub width: f64,
    pub height: f64,
    /// Content-area padding replicated on every sheet.
    pub padding: Edges,
    pub content: SheetContent,
    /// Hard page break forced after this sheet.
    pub break_after: bool,
}

/// What a sheet carries: a packed page of units, or a slice of the
/// continuous flow in whole-document mode.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SheetContent {
    Paged { page: Page },
    Slice { slice: PageSlice },
}

/// Build the printable artifact from a finalized page set.
pub fn export(pages: &[Page], options: &PageOptions) -> PrintDocument {
    let (width, height) = options.size.dimensions_px();
    let sheets = pages
        .iter()
        .enumerate()
        .map(|(i, page)| PrintSheet {
            width,
            height,
            padding: options.padding,
            content: SheetContent::Paged { page: page.clone() },
            break_after: i + 1 < pages.len(),
        })
        .collect();
    PrintDocument { sheets, scale: 1.0 }
}

/// Whole-document variant: the continuous flow is sliced at the planned
/// break offsets, one slice per sheet.
pub fn export_continuous(slices: &[PageSlice], options: &PageOptions) -> PrintDocument {
    let (width, height) = options.size.dimensions_px();
    let sheets = slices
        .iter()
        .enumerate()
        .map(|(i, slice)| PrintSheet {
            width,
            height,
            padding: options.padding,
            content: SheetContent::Slice { slice: *slice },
            break_after: i + 1 < slices.len(),
        })
        .collect();
    PrintDocument { sheets, scale: 1.0 }
}

/// On-screen geometry of one preview sheet at the current zoom.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetGeometry {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

/// Scaled sheet geometry for the preview renderer. Zoom percentages are
/// clamped into the supported preset range.
pub fn preview_sheets(pages: &[Page], options: &PageOptions, zoom_percent: u16) -> Vec<SheetGeometry> {
    let zoom = f64::from(clamp_zoom(zoom_percent)) / 100.0;
    let (width, height) = options.size.dimensions_px();
    pages
        .iter()
        .map(|_| SheetGeometry {
            width: width * zoom,
            height: height * zoom,
            zoom,
        })
        .collect()
}

/// Page-count / current-page state consumed by external navigation UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewState {
    page_count: usize,
    current_page: usize,
}

impl PreviewState {
    pub fn new(page_count: usize) -> Self {
        PreviewState {
            page_count,
            current_page: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Zero-based index of the page in view.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Re-sync after a publish: the page count may shrink under the cursor.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.current_page = self.current_page.min(page_count.saturating_sub(1));
    }

    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.min(self.page_count.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.go_to(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Unit;
    use crate::model::{PageSize, Template};
    use crate::paginate::pack;
    use crate::render::{RenderedKind, RenderedNode};

    fn sample_pages() -> Vec<Page> {
        let units = (0..5)
            .map(|i| Unit {
                nodes: vec![RenderedNode {
                    kind: RenderedKind::Box,
                    key: format!("u{i}"),
                    atomic: true,
                    children: vec![],
                }],
                height: 400.0,
                atomic: true,
            })
            .collect();
        pack(units, 900.0)
    }

    fn a4_options() -> PageOptions {
        Template::default().page
    }

    #[test]
    fn export_is_zoom_independent() {
        let pages = sample_pages();
        let options = a4_options();
        let doc = export(&pages, &options);
        assert_eq!(doc.scale, 1.0);
        for sheet in &doc.sheets {
            assert_eq!((sheet.width, sheet.height), PageSize::A4.dimensions_px());
        }
        // preview scales, export does not
        let zoomed = preview_sheets(&pages, &options, 150);
        assert_eq!(zoomed[0].width, 794.0 * 1.5);
        assert_eq!(doc.sheets[0].width, 794.0);
    }

    #[test]
    fn break_after_every_sheet_except_the_last() {
        let doc = export(&sample_pages(), &a4_options());
        let breaks: Vec<bool> = doc.sheets.iter().map(|s| s.break_after).collect();
        assert_eq!(breaks, vec![true, true, false]);
    }

    #[test]
    fn continuous_export_slices_the_flow() {
        let slices = [
            PageSlice { start: 0.0, end: 700.0 },
            PageSlice { start: 700.0, end: 1100.0 },
        ];
        let doc = export_continuous(&slices, &a4_options());
        assert_eq!(doc.sheets.len(), 2);
        assert!(doc.sheets[0].break_after);
        assert!(!doc.sheets[1].break_after);
        match &doc.sheets[1].content {
            SheetContent::Slice { slice } => assert_eq!(slice.start, 700.0),
            other => panic!("expected slice content, got {other:?}"),
        }
    }

    #[test]
    fn preview_zoom_is_clamped_to_presets() {
        let pages = sample_pages();
        let options = a4_options();
        assert_eq!(preview_sheets(&pages, &options, 1)[0].zoom, 0.25);
        assert_eq!(preview_sheets(&pages, &options, 999)[0].zoom, 3.0);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut state = PreviewState::new(3);
        state.prev_page();
        assert_eq!(state.current_page(), 0);
        state.go_to(99);
        assert_eq!(state.current_page(), 2);
        state.next_page();
        assert_eq!(state.current_page(), 2);
        // republish with fewer pages pulls the cursor back
        state.set_page_count(1);
        assert_eq!(state.current_page(), 0);
        state.set_page_count(0);
        assert_eq!(state.current_page(), 0);
    }
}
