// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::controller::LiveResponse;
use crate::model::comment::Comment;

use super::{text_len, truncate_with_ellipsis, wrap_text};

pub const MIN_BUBBLE_WIDTH: usize = 12;

/// Width the controller assumes when estimating the height of a bubble
/// that has not mounted (and reported a measured height) yet.
pub const DEFAULT_BUBBLE_WIDTH: usize = 44;

/// Pixel height of one rendered bubble line, used by [`estimate_bubble_height`].
pub const BUBBLE_LINE_HEIGHT: f64 = 20.0;

const AWAITING_MARKER: &str = "⋯ awaiting response";
const STREAM_CURSOR: char = '▌';

/// One floating comment bubble. The quote excerpt is clipped to a single
/// line; body and response text wrap. The response section shows, in order
/// of preference, the stored response, the live streamed text (with a
/// cursor), or a waiting marker while the agent still owes a reply.
pub fn render_bubble(comment: &Comment, live: Option<&LiveResponse>, width: usize) -> String {
    let width = width.max(MIN_BUBBLE_WIDTH);
    let inner = width - 4;

    let mut content = Vec::new();
    if let Some(quote) = comment.quoted_text().filter(|quote| !quote.is_empty()) {
        content.push(truncate_with_ellipsis(&format!("❝ {quote}"), inner));
    }
    content.extend(wrap_text(comment.body(), inner));

    let response = response_lines(comment, live, inner);

    let mut out = Vec::with_capacity(content.len() + response.len() + 3);
    out.push(top_border(comment.section().as_str(), width));
    for line in &content {
        out.push(frame_line(line, inner));
    }
    if !response.is_empty() {
        out.push(format!("├{}┤", "─".repeat(width - 2)));
        for line in &response {
            out.push(frame_line(line, inner));
        }
    }
    out.push(format!("╰{}╯", "─".repeat(width - 2)));
    out.join("\n")
}

/// Height reserved for a bubble before it has rendered and reported a
/// measured height. Counts the lines [`render_bubble`] would emit.
pub fn estimate_bubble_height(comment: &Comment, width: usize) -> f64 {
    let width = width.max(MIN_BUBBLE_WIDTH);
    let inner = width - 4;

    let mut lines = 2 + wrap_text(comment.body(), inner).len();
    if comment.quoted_text().is_some_and(|quote| !quote.is_empty()) {
        lines += 1;
    }

    let response = response_lines(comment, None, inner);
    if !response.is_empty() {
        lines += 1 + response.len();
    }

    lines as f64 * BUBBLE_LINE_HEIGHT
}

fn response_lines(comment: &Comment, live: Option<&LiveResponse>, inner: usize) -> Vec<String> {
    if let Some(text) = comment.response_text() {
        return wrap_text(text, inner);
    }
    if let Some(live) = live {
        let mut text = live.text().to_owned();
        if live.is_streaming() {
            text.push(STREAM_CURSOR);
        }
        return wrap_text(&text, inner);
    }
    if comment.is_awaiting_response() {
        return vec![AWAITING_MARKER.to_owned()];
    }
    Vec::new()
}

fn top_border(section: &str, width: usize) -> String {
    let label = truncate_with_ellipsis(section, width.saturating_sub(5));
    let mut top = format!("╭─ {label} ");
    while text_len(&top) < width - 1 {
        top.push('─');
    }
    top.push('╮');
    top
}

fn frame_line(line: &str, inner: usize) -> String {
    let pad = inner.saturating_sub(text_len(line));
    format!("│ {line}{} │", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::{estimate_bubble_height, render_bubble, text_len, BUBBLE_LINE_HEIGHT};
    use crate::controller::LiveResponse;
    use crate::model::comment::{Comment, DocumentSection};
    use crate::model::fixtures::{cid, quoted_comment, rid};

    #[test]
    fn bubble_clips_the_quote_and_wraps_the_body() {
        let comment = quoted_comment(
            "c:1",
            DocumentSection::Requirements,
            "the cache evicts LRU entries",
            1,
        );

        let rendered = render_bubble(&comment, None, 28);
        assert_eq!(
            rendered,
            [
                "╭─ requirements ───────────╮",
                "│ ❝ the cache evicts LRU … │",
                "│ comment on 'the cache    │",
                "│ evicts LRU entries'      │",
                "╰──────────────────────────╯",
            ]
            .join("\n"),
        );
    }

    #[test]
    fn awaiting_bubble_shows_the_waiting_marker() {
        let mut comment = Comment::new(
            cid("c:1"),
            DocumentSection::TechnicalDesign,
            "why a write-ahead log?",
            1,
        );
        comment.set_request_id(Some(rid("req:1")));

        let rendered = render_bubble(&comment, None, 28);
        assert_eq!(
            rendered,
            [
                "╭─ technical_design ───────╮",
                "│ why a write-ahead log?   │",
                "├──────────────────────────┤",
                "│ ⋯ awaiting response      │",
                "╰──────────────────────────╯",
            ]
            .join("\n"),
        );
    }

    #[test]
    fn streaming_response_shows_partial_text_with_a_cursor() {
        let mut comment = Comment::new(cid("c:1"), DocumentSection::Requirements, "why?", 1);
        comment.set_request_id(Some(rid("req:1")));
        let live = LiveResponse::new("Because repl", true);

        let rendered = render_bubble(&comment, Some(&live), 28);
        assert!(rendered.contains("Because repl▌"));
        assert!(!rendered.contains("awaiting response"));
    }

    #[test]
    fn stored_response_wins_over_the_waiting_marker() {
        let mut comment = Comment::new(cid("c:1"), DocumentSection::Requirements, "why?", 1);
        comment.set_request_id(Some(rid("req:1")));
        comment.set_response("Because replays stay cheap.", 2);

        let rendered = render_bubble(&comment, None, 28);
        assert!(rendered.contains("replays stay"));
        assert!(!rendered.contains("awaiting response"));
    }

    #[test]
    fn narrow_bubbles_keep_the_frame_width() {
        let comment = Comment::new(cid("c:1"), DocumentSection::ImplementationPlan, "ok", 1);

        let rendered = render_bubble(&comment, None, 12);
        for line in rendered.lines() {
            assert_eq!(text_len(line), 12, "line {line:?}");
        }
    }

    #[test]
    fn estimate_matches_the_rendered_line_count() {
        let mut comment = quoted_comment(
            "c:1",
            DocumentSection::Requirements,
            "the cache evicts LRU entries",
            1,
        );
        comment.set_request_id(Some(rid("req:1")));

        let rendered_lines = render_bubble(&comment, None, 28).lines().count();
        let estimate = estimate_bubble_height(&comment, 28);
        assert_eq!(estimate, rendered_lines as f64 * BUBBLE_LINE_HEIGHT);
    }
}
