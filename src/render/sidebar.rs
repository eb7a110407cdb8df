// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::comment::Comment;

use super::truncate_with_ellipsis;

// Widest section name, "implementation_plan".
const SECTION_COL: usize = 19;

/// One line per comment, every comment of the review regardless of section
/// or resolved state, ordered by section, then creation time, then id.
pub fn render_sidebar(comments: &[Comment], width: usize) -> String {
    let mut ordered = comments.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| {
        a.section()
            .cmp(&b.section())
            .then_with(|| a.created_at_ms().cmp(&b.created_at_ms()))
            .then_with(|| a.comment_id().cmp(b.comment_id()))
    });

    let excerpt_width = width.saturating_sub(SECTION_COL + 4).max(1);
    let mut lines = Vec::with_capacity(ordered.len());
    for comment in ordered {
        let excerpt = comment
            .quoted_text()
            .filter(|quote| !quote.is_empty())
            .unwrap_or(comment.body());
        lines.push(format!(
            "{} {:<section_col$} {}",
            status_marker(comment),
            comment.section().as_str(),
            truncate_with_ellipsis(excerpt, excerpt_width),
            section_col = SECTION_COL,
        ));
    }
    lines.join("\n")
}

fn status_marker(comment: &Comment) -> char {
    if comment.resolved() {
        '✓'
    } else if comment.response_text().is_some() {
        '●'
    } else if comment.is_awaiting_response() {
        '⋯'
    } else {
        '○'
    }
}
