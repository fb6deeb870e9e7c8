use crate::{Connection, Error, Result};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn migration_error(err: Box<dyn std::error::Error + Send + Sync>) -> Error {
    Error::Migration(err.to_string())
}

pub fn run_pending_migrations(conn: &mut Connection) -> Result<()> {
    let applied: Vec<String> = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(migration_error)?
        .iter()
        .map(ToString::to_string)
        .collect();
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

pub fn is_pending(conn: &mut Connection) -> Result<bool> {
    conn.has_pending_migration(MIGRATIONS)
        .map_err(migration_error)
}

/// Reverts the latest migration and applies it again
pub fn rerun_last_migration(conn: &mut Connection) -> Result<()> {
    let reverted = conn
        .revert_last_migration(MIGRATIONS)
        .map_err(migration_error)?
        .to_string();
    info!("Reverted migration {}", reverted);
    let applied = conn
        .run_next_migration(MIGRATIONS)
        .map_err(migration_error)?
        .to_string();
    info!("Applied migration {}", applied);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::db;

    #[test]
    fn nothing_left_after_setup() {
        let conn = &mut db();
        assert!(!is_pending(conn).unwrap());
    }

    #[test]
    fn redo() {
        let conn = &mut db();
        rerun_last_migration(conn).unwrap();
        assert!(!is_pending(conn).unwrap());
    }
}
