use std::{io, path::Path, sync::Arc};

use agdb::{DbAny, DbError, QueryBuilder};
use derive_more::Deref;
use parking_lot::RwLock;
use tracing::debug;

use crate::fs::state_dir;

/// Root nodes every element hangs off, plus the UID counter.
const ROOT_ALIASES: [&str; 4] = ["routes", "gallery_rows", "kv", "next_uid"];

/// Shared handle to the underlying graph database.
#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    /// Open the database in the routeboard state directory.
    pub fn new() -> crate::Result<Self> {
        let path = state_dir()?.join("data.db");
        Self::open(&path)
    }

    /// Open or create a database file at `path`.
    pub fn open(path: &Path) -> crate::Result<Self> {
        let path_str = path.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("database path '{}' is not valid UTF-8", path.display()),
            )
        })?;

        let db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(path_str)?)),
        };

        db.init()?;
        debug!("Opened database at {}", path.display());

        Ok(db)
    }

    /// Create a memory backed database for use in tests
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        let db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("test").unwrap())),
        };

        db.init().unwrap();

        db
    }

    fn init(&self) -> Result<(), DbError> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count > 0 {
            return Ok(());
        }

        self.db.write().transaction_mut(|t| -> Result<(), DbError> {
            t.exec_mut(
                QueryBuilder::insert()
                    .nodes()
                    .aliases(ROOT_ALIASES)
                    .query(),
            )?;

            // The UID handed to the next inserted element. Incremented on every insert.
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", 0_u64).into()]])
                    .ids("next_uid")
                    .query(),
            )?;

            Ok(())
        })
    }
}
