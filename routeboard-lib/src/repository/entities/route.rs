use std::{collections::HashMap, fmt::Display};

use agdb::{DbId, DbValue, QueryId};
use tracing::debug;

use crate::{
    repository::{
        db::Db,
        entities::{
            EntityId, Error, NewLocation, Result, children, get_field, location::Location,
            set_field, write_positions,
        },
        models::{LocationModel, RouteModel},
    },
    sort::{Row, SortEntry},
};

/// Represents a delivery route in a region.
///
/// Provides methods to inspect and modify this route's data, including managing its locations.
/// Always reflects the current database state.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl Route {
    pub(crate) fn load(id: EntityId, db: Db) -> Self {
        Self { id, db }
    }

    // Fields

    pub fn code(&self) -> Result<String> {
        self.get_field("code")
    }

    /// Change the route code. Another active route must not already use it.
    pub fn set_code(&self, new_code: &str) -> Result<()> {
        if new_code == self.code()? {
            return Ok(());
        }

        if let Some(existing) = Route::find(&self.db, new_code)?
            && existing.is_active()?
        {
            return Err(Error::DuplicateCode(new_code.to_string()));
        }

        self.set_field("code", new_code)
    }

    pub fn name(&self) -> Result<String> {
        self.get_field("name")
    }

    pub fn set_name(&self, new_name: &str) -> Result<()> {
        self.set_field("name", new_name)
    }

    pub fn description(&self) -> Result<Option<String>> {
        let description: String = self.get_field("description")?;
        Ok(Some(description).filter(|d| !d.is_empty()))
    }

    pub fn set_description(&self, description: Option<&str>) -> Result<()> {
        self.set_field("description", description.unwrap_or_default())
    }

    pub fn region(&self) -> Result<String> {
        self.get_field("region")
    }

    pub fn is_active(&self) -> Result<bool> {
        self.get_field("active")
    }

    // Operations

    /// Deactivate this route. Its code becomes free for a new route, and re-adding the same code
    /// brings this record back.
    pub fn remove(&self) -> Result<()> {
        self.set_field("active", false)?;

        debug!("Removed route: {}", self.code()?);

        Ok(())
    }

    /// Add a new [`Location`] at the end of this route.
    pub fn add_location(&self, location: &NewLocation) -> Result<Location> {
        self.add_locations(std::slice::from_ref(location))?
            .pop()
            .ok_or_else(|| Error::MissingField("id".into()))
    }

    /// Append several locations in one transaction, in the given order.
    pub fn add_locations(&self, locations: &[NewLocation]) -> Result<Vec<Location>> {
        let start = i64::try_from(self.locations()?.len())
            .map_err(|err| Error::Conversion {
                field: "position".into(),
                reason: err.to_string(),
            })?
            .saturating_add(1);

        let ids = EntityId::create_many(
            &self.db,
            QueryId::from(self.id.db_id(&self.db)?),
            locations.iter().zip(start..).map(|(location, position)| {
                move |uid| LocationModel { location, position }.values(uid)
            }),
        )?;

        debug!("Added {} locations to route {}", ids.len(), self.code()?);

        Ok(ids
            .into_iter()
            .map(|id| Location::load(id, self.db.clone()))
            .collect())
    }

    /// Active locations of this route, ordered by position.
    pub fn locations(&self) -> Result<Vec<Location>> {
        let db_id = self.id.db_id(&self.db)?;

        let mut locations = Vec::new();
        for id in children(&self.db, QueryId::from(db_id))? {
            let location = Location::load(id, self.db.clone());
            if location.is_active()? {
                locations.push((location.position()?, location));
            }
        }

        // Stable, so equal positions stay in insertion order
        locations.sort_by_key(|(position, _)| *position);

        Ok(locations.into_iter().map(|(_, l)| l).collect())
    }

    /// Snapshot of the active locations for the sort core, in their current order.
    pub fn rows(&self) -> Result<Vec<Row>> {
        self.locations()?.iter().map(Location::row).collect()
    }

    /// Persist a resolved order: every referenced location takes its custom order as position.
    ///
    /// Entries without an order or for locations not on this route are ignored.
    pub fn apply_sort(&self, entries: &[SortEntry]) -> Result<()> {
        let locations: HashMap<String, Location> = self
            .locations()?
            .into_iter()
            .map(|l| (l.id().to_string(), l))
            .collect();

        let mut updates: Vec<(DbId, i64)> = Vec::new();
        for entry in entries {
            if let (Some(order), Some(location)) =
                (entry.custom_order, locations.get(entry.id.as_str()))
            {
                updates.push((location.id.db_id(&self.db)?, order));
            }
        }

        write_positions(&self.db, &updates)?;

        debug!("Reordered {} locations on route {}", updates.len(), self.code()?);

        Ok(())
    }

    /// Insert a new route, or bring back an inactive one with the same code.
    pub(crate) fn add(
        db: &Db,
        region: &str,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self> {
        if let Some(existing) = Route::find(db, code)? {
            if existing.is_active()? {
                return Err(Error::DuplicateCode(code.to_string()));
            }

            existing.set_name(name)?;
            existing.set_description(description)?;
            existing.set_field("region", region)?;
            existing.set_field("active", true)?;

            debug!("Reactivated route: {code}");

            return Ok(existing);
        }

        let model = RouteModel {
            code,
            name,
            description: description.unwrap_or_default(),
            region,
        };
        let id = EntityId::create(db, QueryId::from("routes"), |uid| model.values(uid))?;

        debug!("Created new route: {code}");

        Ok(Route::load(id, db.clone()))
    }

    /// Every route ever created, active or not, oldest first.
    pub(crate) fn list_all(db: &Db) -> Result<Vec<Self>> {
        Ok(children(db, QueryId::from("routes"))?
            .into_iter()
            .map(|id| Route::load(id, db.clone()))
            .collect())
    }

    /// Active routes of a region, oldest first.
    pub(crate) fn list(db: &Db, region: &str) -> Result<Vec<Self>> {
        let mut routes = Vec::new();
        for route in Route::list_all(db)? {
            if route.is_active()? && route.region()? == region {
                routes.push(route);
            }
        }

        Ok(routes)
    }

    /// Search for a route by code. An active route wins over inactive ones holding the same code.
    pub(crate) fn find(db: &Db, code: &str) -> Result<Option<Self>> {
        let mut inactive = None;
        for route in Route::list_all(db)? {
            if route.code()? != code {
                continue;
            }

            if route.is_active()? {
                return Ok(Some(route));
            }
            inactive.get_or_insert(route);
        }

        Ok(inactive)
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

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
