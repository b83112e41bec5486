// ABOUTME: Composition root wiring config, clock, sync adapter, estimator, write queue and local store
// ABOUTME: TrackerContext is shared and cheap to clone; TrackerSession holds one loaded profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! Constructor-injected dependencies
//!
//! - `TrackerContext`: process-wide collaborators, built once
//! - `TrackerSession`: per loaded profile state and the user-facing operations

pub mod session;
pub mod tracker;

pub use session::TrackerSession;
pub use tracker::TrackerContext;
