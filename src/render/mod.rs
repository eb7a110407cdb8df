// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Deterministic plain-text renderers for review surfaces.
//!
//! These produce the textual shape of a bubble or sidebar from the same
//! model state the engine derives; hosts with richer surfaces use the
//! derived maps directly and skip this module.

pub mod bubble;
pub mod sidebar;

pub use bubble::{
    estimate_bubble_height, render_bubble, BUBBLE_LINE_HEIGHT, DEFAULT_BUBBLE_WIDTH,
    MIN_BUBBLE_WIDTH,
};
pub use sidebar::render_sidebar;

pub(crate) fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    let len = text_len(text);
    if len <= max_len {
        return text.to_owned();
    }

    if max_len == 1 {
        return "…".to_owned();
    }

    let mut out: String = text.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

pub(crate) fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Greedy word wrap; words longer than `max_len` are hard-split.
pub(crate) fn wrap_text(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = text_len(word);

        if current_len > 0 {
            if current_len + 1 + word_len <= max_len {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len <= max_len {
            current.push_str(word);
            current_len = word_len;
        } else {
            let chars = word.chars().collect::<Vec<_>>();
            for chunk in chars.chunks(max_len) {
                if chunk.len() == max_len {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
