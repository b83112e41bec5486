// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
// ABOUTME: Shared helpers for pritness-cli commands
// ABOUTME: Currently output formatting only

pub mod display;
