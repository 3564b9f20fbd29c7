use agdb::{Comparison, DbError, DbId, DbValue, QueryBuilder};

use crate::{
    repository::db::Db,
    store::{Error, KvStore, Result},
};

/// A [`KvStore`] persisted in the repository database. Every key is a node linked from the `kv`
/// root holding a `key` and a `value`.
#[derive(Debug, Clone)]
pub struct DbStore {
    db: Db,
}

impl DbStore {
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }

    fn find(&self, key: &str) -> Result<Option<DbId>> {
        Ok(self
            .db
            .read()
            .exec(
                QueryBuilder::search()
                    .from("kv")
                    .where_()
                    .key("key")
                    .value(Comparison::Equal(key.into()))
                    .query(),
            )?
            .elements
            .first()
            .map(|e| e.id))
    }
}

impl KvStore for DbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(db_id) = self.find(key)? else {
            return Ok(None);
        };

        let value = self
            .db
            .read()
            .exec(QueryBuilder::select().values("value").ids(db_id).query())?
            .elements
            .pop()
            .and_then(|mut e| e.values.pop())
            .map(|kv| kv.value);

        match value {
            Some(DbValue::Bytes(bytes)) => Ok(Some(bytes)),
            Some(_) => Err(Error::Corrupt(key.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let existing = self.find(key)?;

        self.db.write().transaction_mut(|t| -> std::result::Result<(), DbError> {
            if let Some(db_id) = existing {
                t.exec_mut(
                    QueryBuilder::insert()
                        .values([[("value", value.to_vec()).into()]])
                        .ids(db_id)
                        .query(),
                )?;

                return Ok(());
            }

            let inserted = t.exec_mut(
                QueryBuilder::insert()
                    .nodes()
                    .values([[("key", key).into(), ("value", value.to_vec()).into()]])
                    .query(),
            )?;

            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from("kv")
                    .to(&inserted)
                    .query(),
            )?;

            Ok(())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        repository::db::Db,
        store::{DbStore, KvStore},
    };

    #[test]
    fn test_get_missing() {
        let store = DbStore::new(Db::in_memory());

        assert_eq!(store.get("row-custom-sort-selangor").unwrap(), None);
    }

    #[test]
    fn test_set_then_overwrite() {
        let store = DbStore::new(Db::in_memory());

        store.set("row-custom-sort-selangor", b"[]").unwrap();
        store.set("row-custom-sort-kuala-lumpur", b"[1]").unwrap();
        store.set("row-custom-sort-selangor", b"[2]").unwrap();

        assert_eq!(
            store.get("row-custom-sort-selangor").unwrap(),
            Some(b"[2]".to_vec())
        );
        assert_eq!(
            store.get("row-custom-sort-kuala-lumpur").unwrap(),
            Some(b"[1]".to_vec())
        );
    }

    #[test]
    fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let store = DbStore::new(Db::open(&path).unwrap());
            store.set("row-custom-sort-selangor", b"saved").unwrap();
        }

        let store = DbStore::new(Db::open(&path).unwrap());
        assert_eq!(
            store.get("row-custom-sort-selangor").unwrap(),
            Some(b"saved".to_vec())
        );
    }
}
