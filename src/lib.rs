// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scholia — live annotation engine for agent-reviewed design documents.
//!
//! Anchors quoted-text comments to their position in a rendered document,
//! stacks overlapping bubbles, retries positioning while layout settles, and
//! routes incrementally streamed agent responses to the comment they answer.

pub mod anchor;
pub mod controller;
pub mod layout;
pub mod model;
pub mod render;
pub mod schedule;
pub mod stream;
