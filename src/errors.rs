// ABOUTME: Error types for the tracker, re-exported from pritness-core
// ABOUTME: Keeps crate::errors paths stable for the root crate modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! Unified error handling
//!
//! The taxonomy lives in `pritness-core` so the goal engine and models can
//! return it without depending on the root crate.

pub use pritness_core::errors::*;
