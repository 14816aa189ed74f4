// ABOUTME: Re-exports command modules for formcoach-cli
// ABOUTME: One module per top-level subcommand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod exercise;
pub mod session;
pub mod user;
pub mod workout;
