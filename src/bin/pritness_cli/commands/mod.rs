// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
// ABOUTME: Re-exports command modules for pritness-cli
// ABOUTME: Provides the goal-engine and estimation diagnostics commands

pub mod estimate;
pub mod targets;
