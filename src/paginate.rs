//! Page packer.
//!
//! Greedy, single-forward-pass distribution of measured units into
//! fixed-height pages. The discrete unit mode is the primary representation;
//! the continuous mode plans break offsets over one scrolled flow and shares
//! the same forward-progress rules.
//!
//! No branch here returns an error: oversized units get a page of their own
//! (the escape valve) and a break that cannot be placed perfectly is placed
//! imperfectly. Forward progress is the hard invariant, not placement
//! quality.

use serde::Serialize;

use crate::measure::Unit;

/// One output page: an ordered run of units and their packed height.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub units: Vec<Unit>,
    pub height: f64,
}

/// A vertical span of the continuous flow that a break must never fall
/// strictly inside. `[top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidRange {
    pub top: f64,
    pub bottom: f64,
}

impl AvoidRange {
    fn contains(&self, offset: f64) -> bool {
        offset > self.top && offset < self.bottom
    }
}

/// A `[start, end)` slice of the continuous flow, one per page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlice {
    pub start: f64,
    pub end: f64,
}

/// Pack ordered units into pages of at most `usable_height`.
///
/// Exact fits never force a break (strict `>` comparisons only), and a unit
/// taller than a whole page occupies a page alone rather than wedging the
/// pass.
pub fn pack(units: Vec<Unit>, usable_height: f64) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page {
        units: Vec::new(),
        height: 0.0,
    };

    for unit in units {
        if unit.height > usable_height && current.units.is_empty() {
            pages.push(Page {
                height: unit.height,
                units: vec![unit],
            });
            continue;
        }
        if !current.units.is_empty() && current.height + unit.height > usable_height {
            pages.push(std::mem::replace(
                &mut current,
                Page {
                    units: Vec::new(),
                    height: 0.0,
                },
            ));
        }
        current.height += unit.height;
        current.units.push(unit);
    }

    if !current.units.is_empty() {
        pages.push(current);
    }
    pages
}

/// Plan break offsets for one continuous flow of `content_height`.
///
/// Each candidate sits `usable_height` below the previous break. A candidate
/// strictly inside an avoid-range is snapped forward to the range's bottom
/// (re-checking chained ranges). If a snap fails to advance past the
/// previous break, the snap is abandoned and the imperfect candidate is
/// accepted instead; offsets therefore strictly increase and the planner
/// always terminates.
pub fn plan_breaks(content_height: f64, usable_height: f64, avoid: &[AvoidRange]) -> Vec<f64> {
    let mut breaks = Vec::new();
    if usable_height <= 0.0 || !content_height.is_finite() {
        return breaks;
    }

    let mut cursor = 0.0;
    while content_height - cursor > usable_height {
        let candidate = cursor + usable_height;
        let snapped = snap_forward(candidate, avoid);
        let chosen = if snapped > cursor { snapped } else { candidate };
        if chosen >= content_height {
            // Snapping ran past the end of the flow: the rest becomes one
            // oversized final page instead of an empty trailing slice.
            break;
        }
        breaks.push(chosen);
        cursor = chosen;
    }
    breaks
}

/// Move an offset forward out of every avoid-range that strictly contains
/// it. Offsets only ever move forward, so each range fires at most once and
/// the loop terminates.
fn snap_forward(offset: f64, avoid: &[AvoidRange]) -> f64 {
    let mut snapped = offset;
    let mut moved = true;
    while moved {
        moved = false;
        for range in avoid {
            if range.contains(snapped) {
                snapped = range.bottom;
                moved = true;
            }
        }
    }
    snapped
}

/// Convert a break list into `[start, end)` page slices. A flow with no
/// breaks is still one page, never zero.
pub fn slices(content_height: f64, breaks: &[f64]) -> Vec<PageSlice> {
    let mut slices = Vec::with_capacity(breaks.len() + 1);
    let mut start = 0.0;
    for &end in breaks {
        slices.push(PageSlice { start, end });
        start = end;
    }
    slices.push(PageSlice {
        start,
        end: content_height,
    });
    slices
}

/// Structural equality of two pagination results: same page count, same
/// per-page unit heights, same ordered content-identity keys. This is the
/// predicate the reflow controller uses to suppress redundant publishes.
///
/// Heights are compared exactly: a pass over unchanged inputs recomputes
/// bit-identical floats, and anything else is a real change.
pub fn pages_equal(a: &[Page], b: &[Page]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(pa, pb)| {
            pa.units.len() == pb.units.len()
                && pa.units.iter().zip(&pb.units).all(|(ua, ub)| {
                    ua.height == ub.height
                        && ua.atomic == ub.atomic
                        && ua.content_keys().eq(ub.content_keys())
                })
        })
}
