use std::fmt::Display;

use agdb::DbValue;
use tracing::debug;

use crate::{
    repository::{
        db::Db,
        entities::{EntityId, Result, get_field, set_field},
    },
    sort::{Row, RowId},
};

/// Fields of an image to be added to a [`GalleryRow`](super::GalleryRow).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGalleryImage {
    pub url: String,
    pub title: String,
    pub subtitle: Option<String>,
}

impl NewGalleryImage {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }
}

/// An image shown in a gallery row.
#[derive(Debug, Clone)]
pub struct GalleryImage {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl GalleryImage {
    pub(crate) fn load(id: EntityId, db: Db) -> Self {
        Self { id, db }
    }

    pub fn id(&self) -> RowId {
        RowId::from(self.id.uid().to_string())
    }

    pub fn url(&self) -> Result<String> {
        self.get_field("url")
    }

    pub fn set_url(&self, new_url: &str) -> Result<()> {
        self.set_field("url", new_url)
    }

    pub fn title(&self) -> Result<String> {
        self.get_field("title")
    }

    pub fn set_title(&self, new_title: &str) -> Result<()> {
        self.set_field("title", new_title)
    }

    pub fn subtitle(&self) -> Result<Option<String>> {
        let subtitle: String = self.get_field("subtitle")?;
        Ok(Some(subtitle).filter(|s| !s.is_empty()))
    }

    pub fn set_subtitle(&self, subtitle: Option<&str>) -> Result<()> {
        self.set_field("subtitle", subtitle.unwrap_or_default())
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

        debug!("Removed gallery image: {}", self.title()?);

        Ok(())
    }

    /// Snapshot for the sort core, keyed by title.
    pub fn row(&self) -> Result<Row> {
        Ok(Row::new(self.id(), &self.title()?, &self.url()?))
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

impl PartialEq for GalleryImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use crate::{Repository, repository::NewGalleryImage};

    #[test]
    fn test_fields() {
        let repo = Repository::mock();
        let row = repo.add_gallery_row("Featured").unwrap();

        let image = row
            .add_image(&NewGalleryImage::new("https://cdn.example.com/klcc.jpg", "KLCC"))
            .unwrap();

        assert_eq!(image.url().unwrap(), "https://cdn.example.com/klcc.jpg");
        assert_eq!(image.title().unwrap(), "KLCC");
        assert_eq!(image.subtitle().unwrap(), None);
        assert_eq!(image.position().unwrap(), 1);

        image.set_subtitle(Some("Petronas Towers")).unwrap();
        image.set_url("https://cdn.example.com/klcc-night.jpg").unwrap();

        assert_eq!(image.subtitle().unwrap().as_deref(), Some("Petronas Towers"));
        assert_eq!(image.url().unwrap(), "https://cdn.example.com/klcc-night.jpg");

        let snapshot = image.row().unwrap();
        assert_eq!(snapshot.id, image.id());
        assert_eq!(snapshot.code, "KLCC");
    }

    #[test]
    fn test_remove() {
        let repo = Repository::mock();
        let row = repo.add_gallery_row("Featured").unwrap();
        let image = row
            .add_image(&NewGalleryImage::new("https://cdn.example.com/a.jpg", "Aquaria"))
            .unwrap();

        image.remove().unwrap();

        assert!(!image.is_active().unwrap());
        assert!(row.images().unwrap().is_empty());
    }
}
