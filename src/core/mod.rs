/*
 * SPDX-FileCopyrightText: 2025 Sven Shi
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

//! Core functionality module
//!
//! Provides essential infrastructure including:
//! - Per-query context management
//! - Unified error handling
//! - Logging system setup with a custom formatter

pub mod context;
pub mod error;
pub mod log;
