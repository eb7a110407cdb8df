// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Comments belong to the surrounding review aggregate; the engine reads
//! them and derives positioned/live state.

pub mod comment;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;

pub use comment::{Comment, DocumentSection, ParseDocumentSectionError};
pub use ids::{CommentId, Id, IdError, RequestId, SessionId};
