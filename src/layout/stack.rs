// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::model::ids::CommentId;

/// Minimum vertical distance, in pixels, between one bubble's bottom edge
/// and the next bubble's top edge.
pub const MIN_BUBBLE_GAP: f64 = 10.0;

/// One anchored comment entering overlap resolution: its natural offset and
/// the bubble height to reserve (measured, or a fallback estimate while the
/// bubble has not mounted yet).
#[derive(Debug, Clone, PartialEq)]
pub struct StackEntry {
    comment_id: CommentId,
    base_offset: f64,
    height: f64,
}

impl StackEntry {
    pub fn new(comment_id: CommentId, base_offset: f64, height: f64) -> Self {
        Self {
            comment_id,
            base_offset,
            height,
        }
    }

    pub fn comment_id(&self) -> &CommentId {
        &self.comment_id
    }

    pub fn base_offset(&self) -> f64 {
        self.base_offset
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// A comment's final vertical offset after overlap resolution, plus the
/// height that was reserved for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedPosition {
    offset: f64,
    height: f64,
}

impl StackedPosition {
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Greedy interval packing over entries in document order.
///
/// Each entry starts at its natural offset and is pushed down below any
/// already-placed bubble it would sit too close to; every push restarts the
/// scan because moving down can collide with a span that was clear before.
/// Bubbles are only ever pushed down, never up past an earlier one, so
/// document order is preserved. O(n²) in the worst case, which is fine at
/// tens of comments per document.
pub fn resolve_overlaps(entries: &[StackEntry]) -> BTreeMap<CommentId, StackedPosition> {
    let mut placed: SmallVec<[(f64, f64); 16]> = SmallVec::new();
    let mut positions = BTreeMap::new();

    for entry in entries {
        let mut offset = entry.base_offset;

        let mut idx = 0;
        while idx < placed.len() {
            let (placed_offset, placed_height) = placed[idx];
            if spans_conflict(offset, entry.height, placed_offset, placed_height) {
                offset = placed_offset + placed_height + MIN_BUBBLE_GAP;
                idx = 0;
            } else {
                idx += 1;
            }
        }

        placed.push((offset, entry.height));
        positions.insert(
            entry.comment_id.clone(),
            StackedPosition {
                offset,
                height: entry.height,
            },
        );
    }

    positions
}

fn spans_conflict(a_offset: f64, a_height: f64, b_offset: f64, b_height: f64) -> bool {
    a_offset < b_offset + b_height + MIN_BUBBLE_GAP
        && b_offset < a_offset + a_height + MIN_BUBBLE_GAP
}
