use crate::Connection;
use diesel::{
    connection::SimpleConnection,
    r2d2::{CustomizeConnection, Error as ConnError},
    Connection as _,
};
use rocket_sync_db_pools::database;

/// Turns foreign keys on, and lets writers wait for each other
/// instead of failing with `SQLITE_BUSY`.
#[derive(Debug)]
pub struct PragmaForeignKey;

impl CustomizeConnection<Connection, ConnError> for PragmaForeignKey {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), ConnError> {
        conn.batch_execute("PRAGMA foreign_keys = on; PRAGMA busy_timeout = 5000;")
            .map_err(ConnError::QueryError)
    }
}

/// Opens a single connection, outside of any pool
pub fn establish(database_url: &str) -> crate::Result<Connection> {
    let mut conn = Connection::establish(database_url)?;
    PragmaForeignKey.on_acquire(&mut conn)?;
    Ok(conn)
}

/// Pooled connection request guard, configured under `databases.yatube`.
///
/// Queries block, so they go through `DbConn::run`, which moves them to a
/// thread where waiting is allowed.
#[database("yatube")]
pub struct DbConn(Connection);
