use std::{collections::HashMap, fmt::Display};

use agdb::{DbId, DbValue, QueryId};
use tracing::debug;

use crate::{
    repository::{
        db::Db,
        entities::{
            EntityId, Error, GalleryImage, NewGalleryImage, Result, children, get_field, set_field,
            write_positions,
        },
        models::{GalleryImageModel, GalleryRowModel},
    },
    sort::{Row, RowId, SortEntry},
};

/// Represents one row of the image gallery content block.
#[derive(Debug, Clone)]
pub struct GalleryRow {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl GalleryRow {
    pub(crate) fn load(id: EntityId, db: Db) -> Self {
        Self { id, db }
    }

    pub fn id(&self) -> RowId {
        RowId::from(self.id.uid().to_string())
    }

    pub fn title(&self) -> Result<String> {
        self.get_field("title")
    }

    pub fn set_title(&self, new_title: &str) -> Result<()> {
        self.set_field("title", new_title)
    }

    pub fn position(&self) -> Result<i64> {
        self.get_field("position")
    }

    pub fn set_position(&self, position: i64) -> Result<()> {
        self.set_field("position", position)
    }

    pub fn is_active(&self) -> Result<bool> {
        self.get_field("active")
    }

    pub fn remove(&self) -> Result<()> {
        self.set_field("active", false)?;

        debug!("Removed gallery row: {}", self.title()?);

        Ok(())
    }

    /// Snapshot for the sort core. Gallery rows have no schedule, so they are always active.
    pub fn row(&self) -> Result<Row> {
        let title = self.title()?;
        Ok(Row::new(self.id(), &title, &title))
    }

    // Images

    /// Add an image at the end of this row.
    pub fn add_image(&self, image: &NewGalleryImage) -> Result<GalleryImage> {
        self.add_images(std::slice::from_ref(image))?
            .pop()
            .ok_or_else(|| Error::MissingField("id".into()))
    }

    /// Append several images in one transaction, in the given order.
    pub fn add_images(&self, images: &[NewGalleryImage]) -> Result<Vec<GalleryImage>> {
        let start = next_position(self.images()?.len())?;

        let ids = EntityId::create_many(
            &self.db,
            QueryId::from(self.id.db_id(&self.db)?),
            images.iter().zip(start..).map(|(image, position)| {
                move |uid| GalleryImageModel { image, position }.values(uid)
            }),
        )?;

        debug!("Added {} images to gallery row {}", ids.len(), self.title()?);

        Ok(ids
            .into_iter()
            .map(|id| GalleryImage::load(id, self.db.clone()))
            .collect())
    }

    /// Active images of this row, ordered by position.
    pub fn images(&self) -> Result<Vec<GalleryImage>> {
        let mut images = Vec::new();
        for id in children(&self.db, QueryId::from(self.id.db_id(&self.db)?))? {
            let image = GalleryImage::load(id, self.db.clone());
            if image.is_active()? {
                images.push((image.position()?, image));
            }
        }

        images.sort_by_key(|(position, _)| *position);

        Ok(images.into_iter().map(|(_, i)| i).collect())
    }

    /// Persist a resolved image order in one transaction. Entries without an order or for images
    /// not in this row are ignored.
    pub fn reorder_images(&self, entries: &[SortEntry]) -> Result<()> {
        let images: HashMap<RowId, GalleryImage> =
            self.images()?.into_iter().map(|i| (i.id(), i)).collect();

        let mut updates: Vec<(DbId, i64)> = Vec::new();
        for entry in entries {
            if let (Some(order), Some(image)) = (entry.custom_order, images.get(&entry.id)) {
                updates.push((image.id.db_id(&self.db)?, order));
            }
        }

        write_positions(&self.db, &updates)?;

        debug!("Reordered {} images in gallery row {}", updates.len(), self.title()?);

        Ok(())
    }

    pub(crate) fn add(db: &Db, title: &str) -> Result<Self> {
        let position = next_position(GalleryRow::list(db)?.len())?;

        let model = GalleryRowModel { title, position };
        let id = EntityId::create(db, QueryId::from("gallery_rows"), |uid| model.values(uid))?;

        debug!("Created gallery row: {title}");

        Ok(GalleryRow::load(id, db.clone()))
    }

    /// Active gallery rows ordered by position.
    pub(crate) fn list(db: &Db) -> Result<Vec<Self>> {
        let mut rows = Vec::new();
        for id in children(db, QueryId::from("gallery_rows"))? {
            let row = GalleryRow::load(id, db.clone());
            if row.is_active()? {
                rows.push((row.position()?, row));
            }
        }

        rows.sort_by_key(|(position, _)| *position);

        Ok(rows.into_iter().map(|(_, r)| r).collect())
    }

    /// Persist a resolved row order in one transaction. Entries without an order or for rows that
    /// aren't active are ignored.
    pub(crate) fn reorder(db: &Db, entries: &[SortEntry]) -> Result<()> {
        let rows: HashMap<RowId, GalleryRow> =
            GalleryRow::list(db)?.into_iter().map(|r| (r.id(), r)).collect();

        let mut updates: Vec<(DbId, i64)> = Vec::new();
        for entry in entries {
            if let (Some(order), Some(row)) = (entry.custom_order, rows.get(&entry.id)) {
                updates.push((row.id.db_id(db)?, order));
            }
        }

        write_positions(db, &updates)?;

        debug!("Reordered {} gallery rows", updates.len());

        Ok(())
    }

    fn get_field<T>(&self, field: &str) -> Result<T>
    where
        T: TryFrom<DbValue>,
        T::Error: Display,
    {
        get_field(&self.db, self.id, field)
    }

    fn set_field<T>(&self, field: &str, value: T) -> Result<()>
    where
        T: Into<DbValue>,
    {
        set_field(&self.db, self.id, field, value)
    }
}

impl PartialEq for GalleryRow {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Position that appends after `count` existing elements.
fn next_position(count: usize) -> Result<i64> {
    Ok(i64::try_from(count)
        .map_err(|err| Error::Conversion {
            field: "position".into(),
            reason: err.to_string(),
        })?
        .saturating_add(1))
}
