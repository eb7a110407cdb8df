// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout algorithms for annotation bubbles.
//!
//! This module turns per-comment anchor offsets into non-overlapping
//! vertical bubble positions.

pub mod stack;

pub use stack::{resolve_overlaps, StackEntry, StackedPosition, MIN_BUBBLE_GAP};
