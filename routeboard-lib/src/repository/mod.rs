use std::{path::Path, sync::Arc};

use parking_lot::RwLock;

use crate::{
    Result,
    repository::{
        config::{Cfg, CoreConfig},
        db::Db,
    },
    schedule::Schedule,
    sort::SortEntry,
    store::{DbStore, SortListStore},
};

pub(crate) mod db;
mod models;

pub mod config;
pub mod entities;

pub use entities::{GalleryImage, GalleryRow, Location, NewGalleryImage, NewLocation, Route};

/// Central access point for all persistent data.
///
/// The [`Repository`] handles the database and the configuration file. It provides a single,
/// consistent interface for reading and writing routes, locations, gallery rows and saved sort
/// lists.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
    cfg: Cfg,
}

impl Repository {
    /// Open the repository in the user's state and config directories.
    pub fn new() -> Result<Self> {
        Ok(Self {
            db: Db::new()?,
            cfg: Arc::new(RwLock::new(CoreConfig::load()?)),
        })
    }

    /// Open a repository backed by the database file at `path`, with the given configuration.
    pub fn open(path: &Path, cfg: CoreConfig) -> Result<Self> {
        Ok(Self {
            db: Db::open(path)?,
            cfg: Arc::new(RwLock::new(cfg)),
        })
    }

    pub fn config(&self) -> CoreConfig {
        self.cfg.read().clone()
    }

    pub fn schedule(&self) -> Schedule {
        self.cfg.read().schedule
    }

    pub fn default_region(&self) -> String {
        self.cfg.read().default_region.clone()
    }

    // Routes

    /// Add a route to `region`. Re-adding the code of a removed route restores that route.
    pub fn add_route(
        &self,
        region: &str,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Route> {
        Ok(Route::add(&self.db, region, code, name, description)?)
    }

    /// Active routes of `region`, oldest first.
    pub fn routes(&self, region: &str) -> Result<Vec<Route>> {
        Ok(Route::list(&self.db, region)?)
    }

    /// The active route with the given code, if any.
    pub fn route(&self, code: &str) -> Result<Option<Route>> {
        match Route::find(&self.db, code)? {
            Some(route) if route.is_active()? => Ok(Some(route)),
            _ => Ok(None),
        }
    }

    // Gallery

    pub fn add_gallery_row(&self, title: &str) -> Result<GalleryRow> {
        Ok(GalleryRow::add(&self.db, title)?)
    }

    pub fn gallery_rows(&self) -> Result<Vec<GalleryRow>> {
        Ok(GalleryRow::list(&self.db)?)
    }

    /// Persist a resolved gallery order in one transaction. Entries that don't match an active row
    /// are ignored.
    pub fn reorder_gallery_rows(&self, entries: &[SortEntry]) -> Result<()> {
        Ok(GalleryRow::reorder(&self.db, entries)?)
    }

    // Sort lists

    /// Saved sort lists, stored alongside the records.
    pub fn sort_lists(&self) -> SortListStore<DbStore> {
        SortListStore::new(DbStore::new(self.db.clone()))
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] with an in-memory database and default
    /// configuration.
    pub(crate) fn mock() -> Self {
        Self {
            db: Db::in_memory(),
            cfg: Arc::new(RwLock::new(CoreConfig::mock())),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{Repository, sort::SortEntry, store::SavedSortList};

    #[test]
    fn test_reorder_gallery_rows() {
        let repo = Repository::mock();
        let featured = repo.add_gallery_row("Featured").unwrap();
        let promos = repo.add_gallery_row("Promotions").unwrap();
        let seasonal = repo.add_gallery_row("Seasonal").unwrap();

        repo.reorder_gallery_rows(&[
            SortEntry::new(seasonal.id(), Some(1)),
            SortEntry::new(featured.id(), Some(2)),
            SortEntry::new(promos.id(), Some(3)),
        ])
        .unwrap();

        let titles: Vec<String> = repo
            .gallery_rows()
            .unwrap()
            .iter()
            .map(|r| r.title().unwrap())
            .collect();

        assert_eq!(titles, vec!["Seasonal", "Featured", "Promotions"]);
    }

    #[test]
    fn test_reorder_gallery_rows_skips_removed_rows() {
        let repo = Repository::mock();
        let featured = repo.add_gallery_row("Featured").unwrap();
        let promos = repo.add_gallery_row("Promotions").unwrap();

        let entries = [
            SortEntry::new(promos.id(), Some(1)),
            SortEntry::new(featured.id(), Some(2)),
        ];
        promos.remove().unwrap();

        repo.reorder_gallery_rows(&entries).unwrap();

        // Only the active row is renumbered
        assert_eq!(featured.position().unwrap(), 2);
        assert_eq!(promos.position().unwrap(), 2);
    }

    #[test]
    fn test_sort_lists_share_the_database() {
        let repo = Repository::mock();
        let list = SavedSortList::new("Morning", vec![SortEntry::new("7", Some(1))]);

        repo.sort_lists().save("selangor", &[list.clone()]).unwrap();

        assert_eq!(repo.clone().sort_lists().load("selangor"), vec![list]);
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let repo = Repository::open(&path, Default::default()).unwrap();
            repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();
        }

        let repo = Repository::open(&path, Default::default()).unwrap();
        assert_eq!(repo.routes("selangor").unwrap().len(), 1);
        assert_eq!(repo.default_region(), "kuala-lumpur");
    }
}
