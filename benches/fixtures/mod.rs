// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::collections::BTreeMap;

use scholia::anchor::{ContainerMeasure, SpanRect};
use scholia::layout::{StackEntry, StackedPosition};
use scholia::model::CommentId;

const LINE_HEIGHT: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumDense,
    LargeLongQuotes,
}

impl Case {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumDense => "medium_dense",
            Self::LargeLongQuotes => "large_long_quotes",
        }
    }

    fn line_count(&self) -> usize {
        match self {
            Self::Small => 40,
            Self::MediumDense => 400,
            Self::LargeLongQuotes => 2000,
        }
    }

    fn comment_count(&self) -> usize {
        match self {
            Self::Small => 4,
            Self::MediumDense => 48,
            Self::LargeLongQuotes => 96,
        }
    }
}

/// One leaf per line, like a rendered markdown view with paragraph leaves.
pub struct BenchContainer {
    leaves: Vec<String>,
    text: String,
}

impl BenchContainer {
    fn new(lines: Vec<String>) -> Self {
        let leaves = lines
            .into_iter()
            .map(|line| format!("{line}\n"))
            .collect::<Vec<_>>();
        let text = leaves.concat();
        Self { leaves, text }
    }
}

impl ContainerMeasure for BenchContainer {
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
        Some(SpanRect {
            top: leaf as f64 * LINE_HEIGHT,
            height: LINE_HEIGHT,
        })
    }
}

fn line(case: Case, idx: usize) -> String {
    match case {
        Case::Small | Case::MediumDense => {
            format!("Paragraph {idx}: the scheduler drains queue shard {idx} before eviction.")
        }
        Case::LargeLongQuotes => format!(
            "Paragraph {idx}: the scheduler drains queue shard {idx} before eviction, \
             journals the drained batch, and republishes watermarks for shard {idx} \
             so downstream readers never observe a torn snapshot."
        ),
    }
}

pub fn document(case: Case) -> BenchContainer {
    let lines = (0..case.line_count())
        .map(|idx| line(case, idx))
        .collect::<Vec<_>>();
    BenchContainer::new(lines)
}

/// Quotes spread evenly through the document; each one is unique to its
/// paragraph, so every lookup walks a different distance.
pub fn quotes(case: Case) -> Vec<(CommentId, String)> {
    let step = case.line_count() / case.comment_count();
    (0..case.comment_count())
        .map(|n| {
            let target = n * step;
            let text = line(case, target);
            let quote = text.strip_prefix(&format!("Paragraph {target}: ")).unwrap_or(&text);
            (bench_cid(n), quote.to_owned())
        })
        .collect()
}

/// Stack entries clustered tightly enough that most of them collide.
pub fn entries(count: usize) -> Vec<StackEntry> {
    (0..count)
        .map(|n| {
            let base_offset = (n as f64) * 12.0 + ((n % 7) as f64);
            let height = 120.0 + ((n % 5) as f64) * 40.0;
            StackEntry::new(bench_cid(n), base_offset, height)
        })
        .collect()
}

fn bench_cid(n: usize) -> CommentId {
    CommentId::new(format!("c:{n:05}")).expect("bench comment id")
}

pub fn checksum_positions(positions: &BTreeMap<CommentId, StackedPosition>) -> u64 {
    let mut acc = 0u64;
    for (comment_id, position) in positions {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(comment_id.as_str().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(position.offset().to_bits());
        acc = acc.wrapping_mul(131).wrapping_add(position.height().to_bits());
    }
    acc
}

pub fn checksum_offset(offset: Option<f64>) -> u64 {
    match offset {
        Some(value) => value.to_bits().wrapping_mul(131),
        None => 1,
    }
}
