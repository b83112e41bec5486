// ABOUTME: Core types and goal engine for the Pritness nutrition tracker
// ABOUTME: Foundation crate with error handling, constants, data models and targets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

#![deny(unsafe_code)]

//! # Pritness Core
//!
//! Foundation crate shared by the ledger, the estimation gateway and the
//! recommendation builder. It has no I/O.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and `AppResult`
//! - **constants**: energy factors, biometric ranges, tracker limits
//! - **models**: profile, ledger entries, estimates, meal-time buckets
//! - **intelligence**: the goal engine

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Profile, `MealEntry`, `WodEntry`, estimates)
pub mod models;

/// Pure derivations (goal engine)
pub mod intelligence;
