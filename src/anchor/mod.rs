// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Quote anchoring: map a quoted substring to a vertical offset in the
//! rendered document.
//!
//! The rendered document sits behind [`ContainerMeasure`] so the leaf-walk
//! algorithm is testable without a real rendering engine. Offsets are pixels
//! relative to the container's scroll origin.

use memchr::memmem;

/// Geometry of a measured text range, relative to the container scroll
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanRect {
    pub top: f64,
    pub height: f64,
}

impl SpanRect {
    /// A zero-height rect means the node exists but has not been laid out
    /// yet (mid-render); treat it the same as an absent measurement.
    pub fn is_degenerate(&self) -> bool {
        self.height <= 0.0
    }
}

/// Measurement seam over the rendered document container.
///
/// Implementations expose the flattened text content plus the text-bearing
/// leaves in document order. Leaf texts must concatenate (in order) to
/// `text_content`; `locate_quote` guards against implementations that
/// momentarily violate this during partial re-renders.
pub trait ContainerMeasure {
    /// The full flattened text content of the container.
    fn text_content(&self) -> &str;

    /// Number of text-bearing leaves in document order.
    fn leaf_count(&self) -> usize;

    /// Text of one leaf. `leaf` is in `0..leaf_count()`.
    fn leaf_text(&self, leaf: usize) -> &str;

    /// Measure the byte range `[byte_start, byte_start + byte_len)` within a
    /// leaf. `None` means the leaf cannot be measured right now.
    fn measure_range(&self, leaf: usize, byte_start: usize, byte_len: usize) -> Option<SpanRect>;
}

/// Locate the first occurrence of `quote` in the rendered document and
/// return its vertical offset, or `None` when the quote is absent or the
/// document is not laid out yet.
///
/// Multiple occurrences resolve to the *first* match in flattened-text
/// order; this is pinned behavior. Whitespace-only leaves count toward the
/// flattened offset but never host a match, and a leaf whose text does not
/// align with the quote at the computed intra-leaf offset is treated as a
/// stale partial re-render (not found) rather than anchored at a wrong spot.
pub fn locate_quote(container: &dyn ContainerMeasure, quote: &str) -> Option<f64> {
    if quote.is_empty() {
        return None;
    }

    let text = container.text_content();
    let match_start = memmem::find(text.as_bytes(), quote.as_bytes())?;
    let quote_bytes = quote.as_bytes();

    let mut consumed = 0usize;
    for leaf in 0..container.leaf_count() {
        let leaf_text = container.leaf_text(leaf);
        let leaf_len = leaf_text.len();

        if consumed + leaf_len <= match_start {
            consumed += leaf_len;
            continue;
        }

        if leaf_text.trim().is_empty() {
            // Never a match host, but its text still counts toward the
            // flattened offset.
            consumed += leaf_len;
            continue;
        }

        let offset_in_leaf = match_start.saturating_sub(consumed);
        let quote_consumed = consumed.saturating_sub(match_start);
        let rest = quote_bytes.get(quote_consumed..)?;
        if rest.is_empty() {
            // The whole quote fell inside skipped whitespace leaves.
            return None;
        }

        let take = rest.len().min(leaf_len - offset_in_leaf);
        if leaf_text.as_bytes()[offset_in_leaf..offset_in_leaf + take] != rest[..take] {
            // Leaf texts and the flattened content disagree: stale layout.
            return None;
        }

        let rect = container.measure_range(leaf, offset_in_leaf, take)?;
        if rect.is_degenerate() {
            return None;
        }
        return Some(rect.top);
    }

    None
}
