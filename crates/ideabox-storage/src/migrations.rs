// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! SQL files under `migrations/` are compiled in with refinery and applied on
//! every open. Applied versions are tracked in `refinery_schema_history`.

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies every pending migration.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<refinery::Report, refinery::Error> {
    embedded::migrations::runner().run(conn)
}
