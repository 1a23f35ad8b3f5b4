//! Reflow controller.
//!
//! Orchestrates re-measurement and re-packing when the data, viewport, page
//! size, or zoom changes. The controller is single-threaded and cooperative:
//! it never reacts to raw geometry events. A trigger only marks a pass
//! pending; measurement is gated on an explicit layout-settled signal, which
//! breaks the observe -> recompute -> resize feedback loop by construction.
//!
//! Ordering guarantee: only the result of the most recently triggered pass
//! is ever published. A trigger arriving mid-pass bumps the generation
//! counter, and the in-flight pass's token goes stale; its result is
//! discarded, not merged. Results structurally equal to the last published
//! pages are suppressed.

use serde_json::Value;

use crate::measure::{measure_units, LayoutProvider};
use crate::model::Template;
use crate::paginate::{pack, pages_equal, Page};
use crate::render::render_document;

/// What caused a reflow. Carried for logging; every trigger reflows the
/// whole document, nothing is patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowTrigger {
    DataChanged,
    ViewportResized,
    PageSizeChanged,
    ZoomChanged,
}

/// Controller phase. `Measuring` and `Packing` describe the in-flight pass
/// holding the current-generation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Measuring,
    Packing,
}

/// Token for one reflow pass. Handed out by [`ReflowController::layout_settled`]
/// and consumed by `complete` or `abandon`; a stale token (superseded by a
/// newer trigger) can no longer publish.
#[derive(Debug)]
pub struct ReflowPass {
    generation: u64,
}

/// Outcome of a completed pass.
#[derive(Debug)]
pub enum Publish<'a> {
    /// The result differed structurally and is now the published state.
    Published(&'a [Page]),
    /// Structurally equal to the last published result; suppressed.
    Unchanged,
    /// A newer trigger superseded this pass; its result was discarded.
    Superseded,
    /// The measurement container was torn down mid-pass; the pending
    /// invalidation is restored so the next settled signal retries.
    Abandoned,
}

#[derive(Debug, Default)]
pub struct ReflowController {
    generation: u64,
    pending: bool,
    phase: Phase,
    published: Option<Vec<Page>>,
}

impl ReflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The last published pagination result, if any.
    pub fn published(&self) -> Option<&[Page]> {
        self.published.as_deref()
    }

    /// Mark a pass pending. Any in-flight pass is superseded immediately:
    /// its token generation is now stale and its result will be discarded.
    pub fn invalidate(&mut self, trigger: ReflowTrigger) {
        self.generation += 1;
        self.pending = true;
        log::debug!(
            "reflow invalidated by {trigger:?} (generation {})",
            self.generation
        );
    }

    /// The layout-settled signal. Hands out at most one pass token per
    /// pending invalidation; redundant settle notifications are ignored.
    pub fn layout_settled(&mut self) -> Option<ReflowPass> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.phase = Phase::Measuring;
        Some(ReflowPass {
            generation: self.generation,
        })
    }

    /// Whether a pass token still belongs to the newest trigger.
    pub fn is_current(&self, pass: &ReflowPass) -> bool {
        pass.generation == self.generation
    }

    /// Transition a pass from measuring to packing. Returns false (and
    /// leaves state untouched) when the pass has been superseded.
    pub fn begin_packing(&mut self, pass: &ReflowPass) -> bool {
        if !self.is_current(pass) {
            return false;
        }
        self.phase = Phase::Packing;
        true
    }

    /// Drop a pass that hit a measurement race. Restores the pending flag so
    /// a later settled signal can retry; never publishes a partial result.
    pub fn abandon(&mut self, pass: ReflowPass) {
        if self.is_current(&pass) {
            self.pending = true;
            self.phase = Phase::Idle;
        }
    }

    /// Finish a pass. Last write wins: a stale token is reported as
    /// superseded and its pages are dropped. Structurally equal results are
    /// suppressed so observers only redraw on real changes.
    pub fn complete(&mut self, pass: ReflowPass, pages: Vec<Page>) -> Publish<'_> {
        if !self.is_current(&pass) {
            log::debug!("discarding superseded reflow result (generation {})", pass.generation);
            return Publish::Superseded;
        }
        self.phase = Phase::Idle;
        if let Some(previous) = &self.published {
            if pages_equal(previous, &pages) {
                return Publish::Unchanged;
            }
        }
        self.published = Some(pages);
        Publish::Published(self.published.as_deref().unwrap_or_default())
    }

    /// Convenience driver wiring render -> measure -> pack -> complete for
    /// callers that do not need to interleave the phases.
    pub fn run_pass<P: LayoutProvider>(
        &mut self,
        pass: ReflowPass,
        template: &Template,
        data: &Value,
        provider: &P,
    ) -> Publish<'_> {
        let content = render_document(template, data);
        let units = match measure_units(&content, provider) {
            Ok(units) => units,
            Err(_) => {
                self.abandon(pass);
                return Publish::Abandoned;
            }
        };
        if !self.begin_packing(&pass) {
            return Publish::Superseded;
        }
        let pages = pack(units, template.page.usable_height());
        self.complete(pass, pages)
    }
}
