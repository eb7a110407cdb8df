// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{CommentId, RequestId};

/// The design-document tab a comment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentSection {
    Requirements,
    TechnicalDesign,
    ImplementationPlan,
}

impl DocumentSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::TechnicalDesign => "technical_design",
            Self::ImplementationPlan => "implementation_plan",
        }
    }
}

impl fmt::Display for DocumentSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSection {
    type Err = ParseDocumentSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requirements" => Ok(Self::Requirements),
            "technical_design" => Ok(Self::TechnicalDesign),
            "implementation_plan" => Ok(Self::ImplementationPlan),
            other => Err(ParseDocumentSectionError {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDocumentSectionError {
    value: String,
}

impl ParseDocumentSectionError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseDocumentSectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown document section '{}'", self.value)
    }
}

impl std::error::Error for ParseDocumentSectionError {}

/// One review comment, owned by the surrounding review aggregate.
///
/// The engine only reads comments and derives positioned/live state from
/// them; the mutation surface exists for the CRUD collaborator. Comments are
/// never deleted, only marked resolved.
///
/// Timestamps are plain millisecond values supplied by the data layer; the
/// engine never reads the clock, which keeps attribution heuristics
/// deterministic under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    comment_id: CommentId,
    section: DocumentSection,
    quoted_text: Option<String>,
    body: String,
    resolved: bool,
    request_id: Option<RequestId>,
    response_text: Option<String>,
    response_at_ms: Option<u64>,
    created_at_ms: u64,
}

impl Comment {
    pub fn new(
        comment_id: CommentId,
        section: DocumentSection,
        body: impl Into<String>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            comment_id,
            section,
            quoted_text: None,
            body: body.into(),
            resolved: false,
            request_id: None,
            response_text: None,
            response_at_ms: None,
            created_at_ms,
        }
    }

    pub fn comment_id(&self) -> &CommentId {
        &self.comment_id
    }

    pub fn section(&self) -> DocumentSection {
        self.section
    }

    pub fn quoted_text(&self) -> Option<&str> {
        self.quoted_text.as_deref()
    }

    pub fn set_quoted_text(&mut self, quoted_text: Option<String>) {
        self.quoted_text = quoted_text;
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn resolved(&self) -> bool {
        self.resolved
    }

    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn set_request_id(&mut self, request_id: Option<RequestId>) {
        self.request_id = request_id;
    }

    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }

    pub fn response_at_ms(&self) -> Option<u64> {
        self.response_at_ms
    }

    pub fn set_response(&mut self, response_text: impl Into<String>, response_at_ms: u64) {
        self.response_text = Some(response_text.into());
        self.response_at_ms = Some(response_at_ms);
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// True while the comment has been dispatched to the agent (it carries a
    /// correlation request id) but no response has arrived yet.
    pub fn is_awaiting_response(&self) -> bool {
        self.request_id.is_some() && self.response_text.is_none() && !self.resolved
    }

    /// True when the comment should get a floating bubble: unresolved, with a
    /// non-empty quoted span to anchor to.
    pub fn has_anchor_quote(&self) -> bool {
        !self.resolved && self.quoted_text.as_deref().is_some_and(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Comment, DocumentSection};
    use crate::model::ids::{CommentId, RequestId};

    fn cid(value: &str) -> CommentId {
        CommentId::new(value).expect("comment id")
    }

    #[test]
    fn section_round_trips_through_str() {
        for section in [
            DocumentSection::Requirements,
            DocumentSection::TechnicalDesign,
            DocumentSection::ImplementationPlan,
        ] {
            assert_eq!(DocumentSection::from_str(section.as_str()), Ok(section));
        }
        assert!(DocumentSection::from_str("design").is_err());
    }

    #[test]
    fn comment_without_quote_never_anchors() {
        let comment = Comment::new(cid("c:1"), DocumentSection::Requirements, "general note", 1);
        assert!(!comment.has_anchor_quote());
    }

    #[test]
    fn resolved_comment_leaves_the_anchored_set() {
        let mut comment = Comment::new(cid("c:1"), DocumentSection::Requirements, "note", 1);
        comment.set_quoted_text(Some("the cache".to_owned()));
        assert!(comment.has_anchor_quote());

        comment.resolve();
        assert!(!comment.has_anchor_quote());
    }

    #[test]
    fn awaiting_response_requires_request_id_and_no_response() {
        let mut comment = Comment::new(cid("c:1"), DocumentSection::TechnicalDesign, "why?", 1);
        assert!(!comment.is_awaiting_response());

        comment.set_request_id(Some(RequestId::new("req:1").expect("request id")));
        assert!(comment.is_awaiting_response());

        comment.set_response("because", 2);
        assert!(!comment.is_awaiting_response());
    }
}
