// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Pirsch beacon.
//!
//! Every outbound request made by the beacon goes through a client built
//! here so the User-Agent stays consistent across the SDK and the CLI.

mod client;

pub use client::{builder, builder_with_user_agent, user_agent, SDK_NAME, SDK_VERSION};
