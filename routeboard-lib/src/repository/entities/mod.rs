//! Core domain entities for routeboard.
//!
//! These types represent routes, their locations, the gallery rows and their images. They provide
//! a unified interface for inspecting and mutating these records, handling all necessary database
//! operations behind the scenes. Entities never cache field values, so they always reflect the
//! current database state.

use std::fmt::{Debug, Display};

use agdb::{DbError, DbId, DbKeyValue, DbValue, QueryBuilder, QueryId};
use thiserror::Error;

use crate::repository::db::Db;

mod gallery_image;
mod gallery_row;
mod location;
mod route;

pub use gallery_image::{GalleryImage, NewGalleryImage};
pub use gallery_row::GalleryRow;
pub use location::{Location, NewLocation};
pub use route::Route;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal database error {0}")]
    Internal(#[from] agdb::DbError),
    #[error("This entity refers to a record that has been removed")]
    RemovedEntity,
    #[error("Route code '{0}' already exists and is active. Please use a different code.")]
    DuplicateCode(String),
    #[error("Element is missing the '{0}' field")]
    MissingField(String),
    #[error("Field '{field}' holds an unexpected value: {reason}")]
    Conversion { field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EntityId {
    db_id: DbId,
    /// A unique identifier that specifies a particular entity
    uid: u64,
}

impl EntityId {
    /// Insert a new element linked from `parent` and return its [`EntityId`].
    ///
    /// A fresh UID is handed to `values`, which builds the element's fields.
    pub fn create<F>(db: &Db, parent: QueryId, values: F) -> Result<Self>
    where
        F: FnOnce(u64) -> Vec<DbKeyValue>,
    {
        Self::create_many(db, parent, [values])?
            .pop()
            .ok_or_else(|| Error::MissingField("id".into()))
    }

    /// Insert one element per builder, all linked from `parent`, in a single transaction.
    ///
    /// Either every element is inserted or none is. UIDs are allocated in iteration order.
    pub fn create_many<I, F>(db: &Db, parent: QueryId, builders: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(u64) -> Vec<DbKeyValue>,
    {
        db.write().transaction_mut(|t| -> Result<Vec<Self>> {
            let first = t
                .exec(
                    QueryBuilder::select()
                        .values("next_uid")
                        .ids("next_uid")
                        .query(),
                )?
                .elements
                .pop()
                .and_then(|mut e| e.values.pop())
                .ok_or_else(|| Error::MissingField("next_uid".into()))?
                .value
                .to_u64()?;

            let (uids, values): (Vec<u64>, Vec<Vec<DbKeyValue>>) = builders
                .into_iter()
                .zip(first..)
                .map(|(build, uid)| (uid, build(uid)))
                .unzip();

            let Some(next) = uids.last().map(|uid| uid.saturating_add(1)) else {
                return Ok(Vec::new());
            };

            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("next_uid", next).into()]])
                    .ids("next_uid")
                    .query(),
            )?;

            let inserted = t.exec_mut(QueryBuilder::insert().nodes().values(values).query())?;

            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from([parent])
                    .to(&inserted)
                    .query(),
            )?;

            Ok(inserted
                .elements
                .iter()
                .zip(uids)
                .map(|(e, uid)| Self { db_id: e.id, uid })
                .collect())
        })
    }

    /// Load an [`EntityId`] from an existing element.
    pub fn load(db: &Db, db_id: DbId) -> Result<Self> {
        Ok(Self {
            db_id,
            uid: read_uid(db, db_id)?,
        })
    }

    /// Get the underlying [`DbId`], checking first that it still refers to this entity.
    pub fn db_id(&self, db: &Db) -> Result<DbId> {
        let uid = read_uid(db, self.db_id).map_err(|err| match err {
            Error::Internal(e) if is_missing(&e, self.db_id) => Error::RemovedEntity,
            other => other,
        })?;

        // A different UID means the DbId was reused for another element
        if uid != self.uid {
            return Err(Error::RemovedEntity);
        }

        Ok(self.db_id)
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }
}

/// Whether `err` reports that `db_id` no longer exists.
fn is_missing(err: &DbError, db_id: DbId) -> bool {
    // TODO: Match on the DbError kind once agdb exposes one,
    // see https://github.com/agnesoft/agdb/issues/1687
    err.description == format!("Id '{}' not found", db_id.as_index())
}

fn read_uid(db: &Db, db_id: DbId) -> Result<u64> {
    Ok(read_value(db, db_id, "uid")?.to_u64()?)
}

fn read_value(db: &Db, db_id: DbId, field: &str) -> Result<DbValue> {
    db.read()
        .exec(QueryBuilder::select().values(field).ids(db_id).query())?
        .elements
        .pop()
        .and_then(|mut e| e.values.pop())
        .map(|kv| kv.value)
        .ok_or_else(|| Error::MissingField(field.to_string()))
}

pub(crate) fn get_field<T>(db: &Db, id: EntityId, field: &str) -> Result<T>
where
    T: TryFrom<DbValue>,
    T::Error: Display,
{
    let value = read_value(db, id.db_id(db)?, field)?;

    T::try_from(value).map_err(|err| Error::Conversion {
        field: field.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn set_field<T>(db: &Db, id: EntityId, field: &str, value: T) -> Result<()>
where
    T: Into<DbValue>,
{
    set_fields(db, id, vec![(field, value).into()])
}

/// Write several fields of one element at once.
pub(crate) fn set_fields(db: &Db, id: EntityId, values: Vec<DbKeyValue>) -> Result<()> {
    let db_id = id.db_id(db)?;
    db.write()
        .exec_mut(QueryBuilder::insert().values([values]).ids(db_id).query())?;

    Ok(())
}

/// Store new positions in one transaction. Nothing is written if any update fails.
pub(crate) fn write_positions(db: &Db, positions: &[(DbId, i64)]) -> Result<()> {
    db.write().transaction_mut(|t| -> Result<()> {
        for (db_id, position) in positions {
            t.exec_mut(
                QueryBuilder::insert()
                    .values([[("position", *position).into()]])
                    .ids(*db_id)
                    .query(),
            )?;
        }

        Ok(())
    })
}

/// Elements directly linked from `parent`, oldest first.
pub(crate) fn children(db: &Db, parent: QueryId) -> Result<Vec<EntityId>> {
    let ids: Vec<DbId> = db
        .read()
        .exec(
            QueryBuilder::search()
                .from(parent)
                .where_()
                .neighbor()
                .query(),
        )?
        .elements
        .iter()
        .map(|e| e.id)
        .collect();

    let mut children = ids
        .into_iter()
        .map(|db_id| EntityId::load(db, db_id))
        .collect::<Result<Vec<_>>>()?;
    children.sort_by_key(EntityId::uid);

    Ok(children)
}

#[cfg(test)]
mod test {
    use agdb::{DbId, QueryBuilder, QueryId};

    use super::{EntityId, Error, get_field, write_positions};
    use crate::repository::db::Db;

    fn node(db: &Db, position: i64) -> EntityId {
        EntityId::create(db, QueryId::from("gallery_rows"), |uid| {
            vec![("uid", uid).into(), ("position", position).into()]
        })
        .unwrap()
    }

    #[test]
    fn test_create_many_allocates_consecutive_uids() {
        let db = Db::in_memory();

        let ids = EntityId::create_many(
            &db,
            QueryId::from("gallery_rows"),
            (0..3_i64).map(|position| {
                move |uid: u64| vec![("uid", uid).into(), ("position", position).into()]
            }),
        )
        .unwrap();
        let next = node(&db, 9);

        let uids: Vec<u64> = ids.iter().map(EntityId::uid).collect();
        assert_eq!(uids, vec![0, 1, 2]);
        assert_eq!(next.uid(), 3);
        assert_eq!(
            get_field::<i64>(&db, *ids.last().unwrap(), "position").unwrap(),
            2
        );
    }

    #[test]
    fn test_write_positions_is_all_or_nothing() {
        let db = Db::in_memory();
        let first = node(&db, 1);
        let second = node(&db, 2);

        let result = write_positions(
            &db,
            &[
                (first.db_id(&db).unwrap(), 5),
                (DbId(9_999), 6),
                (second.db_id(&db).unwrap(), 7),
            ],
        );

        assert!(result.is_err());
        assert_eq!(get_field::<i64>(&db, first, "position").unwrap(), 1);
        assert_eq!(get_field::<i64>(&db, second, "position").unwrap(), 2);
    }

    #[test]
    fn test_deleted_element_is_reported_as_removed() {
        let db = Db::in_memory();
        let id = node(&db, 1);
        let db_id = id.db_id(&db).unwrap();

        db.write()
            .exec_mut(QueryBuilder::remove().ids(db_id).query())
            .unwrap();

        assert!(matches!(id.db_id(&db), Err(Error::RemovedEntity)));
        assert!(matches!(
            get_field::<i64>(&db, id, "position"),
            Err(Error::RemovedEntity)
        ));
    }
}
