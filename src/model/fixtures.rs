// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::anchor::{ContainerMeasure, SpanRect};

use super::comment::{Comment, DocumentSection};
use super::ids::{CommentId, RequestId};

pub(crate) fn cid(value: &str) -> CommentId {
    CommentId::new(value).expect("comment id")
}

pub(crate) fn rid(value: &str) -> RequestId {
    RequestId::new(value).expect("request id")
}

pub(crate) fn quoted_comment(
    id: &str,
    section: DocumentSection,
    quote: &str,
    created_at_ms: u64,
) -> Comment {
    let mut comment = Comment::new(cid(id), section, format!("comment on '{quote}'"), created_at_ms);
    comment.set_quoted_text(Some(quote.to_owned()));
    comment
}

/// A scripted stand-in for the rendered document container: one leaf per
/// line, every line `line_height` pixels tall, leaves concatenating (with
/// their trailing newline) to the flattened text content.
#[derive(Debug)]
pub(crate) struct FixtureContainer {
    leaves: Vec<String>,
    text: String,
    line_height: f64,
    measure_failures: AtomicUsize,
}

impl FixtureContainer {
    pub(crate) fn from_lines(lines: &[&str]) -> Self {
        let leaves = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if idx + 1 == lines.len() {
                    (*line).to_owned()
                } else {
                    format!("{line}\n")
                }
            })
            .collect::<Vec<_>>();
        let text = leaves.concat();

        Self {
            leaves,
            text,
            line_height: 18.0,
            measure_failures: AtomicUsize::new(0),
        }
    }

    pub(crate) fn line_top(&self, line: usize) -> f64 {
        line as f64 * self.line_height
    }

    pub(crate) fn set_line_height(&mut self, line_height: f64) {
        self.line_height = line_height;
    }

    /// Make the next `count` `measure_range` calls fail, simulating a
    /// document that has not finished its layout pass yet.
    pub(crate) fn fail_next_measures(&self, count: usize) {
        self.measure_failures.store(count, Ordering::SeqCst);
    }
}

impl ContainerMeasure for FixtureContainer {
    fn text_content(&self) -> &str {
        &self.text
    }

    fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    fn leaf_text(&self, leaf: usize) -> &str {
        &self.leaves[leaf]
    }

    fn measure_range(&self, leaf: usize, _byte_start: usize, _byte_len: usize) -> Option<SpanRect> {
        let pending = self.measure_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.measure_failures.store(pending - 1, Ordering::SeqCst);
            return None;
        }

        Some(SpanRect {
            top: self.line_top(leaf),
            height: self.line_height,
        })
    }
}
