// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation JSON API for Ideabox.
//!
//! Lets moderators browse stored ideas, change their status, keep notes and
//! delete them. Everything except `/health` sits behind HTTP Basic auth.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::BasicAuth;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
