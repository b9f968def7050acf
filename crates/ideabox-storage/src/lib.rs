// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for idea records.
//!
//! WAL-mode SQLite with embedded refinery migrations. All access goes through
//! a single `tokio-rusqlite` connection, so writes are serialized.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
