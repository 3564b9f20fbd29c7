use std::{fmt::Display, str::FromStr};

use agdb::DbValue;
use tracing::debug;

use crate::{
    repository::{
        db::Db,
        entities::{EntityId, Error, Result, get_field, set_field, set_fields},
        models::stored_days,
    },
    schedule::{DeliveryDays, DeliveryMode},
    sort::{Row, RowId},
};

/// Fields of a location to be added to a [`Route`](super::Route).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLocation {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
    /// Ignored when `delivery_days` is set, the mode is then derived from the days
    pub delivery_mode: Option<DeliveryMode>,
    pub delivery_days: Option<DeliveryDays>,
}

impl NewLocation {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = Some(mode);
        self
    }

    pub fn with_delivery_days(mut self, days: DeliveryDays) -> Self {
        self.delivery_days = Some(days);
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn with_contact(mut self, contact: &str) -> Self {
        self.contact = Some(contact.to_string());
        self
    }
}

/// Represents a delivery stop on a [`Route`](super::Route).
///
/// Provides methods to inspect and modify this location's data.
/// Always reflects the current database state.
#[derive(Debug, Clone)]
pub struct Location {
    pub(crate) id: EntityId,
    pub(crate) db: Db,
}

impl Location {
    pub(crate) fn load(id: EntityId, db: Db) -> Self {
        Self { id, db }
    }

    /// Stable identifier used by the sort core and saved sort lists
    pub fn id(&self) -> RowId {
        RowId::from(self.id.uid().to_string())
    }

    pub fn code(&self) -> Result<String> {
        self.get_field("code")
    }

    /// Codes are expected to be unique but duplicates are allowed and only reported when sorting.
    pub fn set_code(&self, new_code: &str) -> Result<()> {
        self.set_field("code", new_code)
    }

    pub fn name(&self) -> Result<String> {
        self.get_field("name")
    }

    pub fn set_name(&self, new_name: &str) -> Result<()> {
        self.set_field("name", new_name)
    }

    pub fn address(&self) -> Result<Option<String>> {
        self.get_optional("address")
    }

    pub fn set_address(&self, address: Option<&str>) -> Result<()> {
        self.set_field("address", address.unwrap_or_default())
    }

    pub fn contact(&self) -> Result<Option<String>> {
        self.get_optional("contact")
    }

    pub fn set_contact(&self, contact: Option<&str>) -> Result<()> {
        self.set_field("contact", contact.unwrap_or_default())
    }

    pub fn notes(&self) -> Result<Option<String>> {
        self.get_optional("notes")
    }

    pub fn set_notes(&self, notes: Option<&str>) -> Result<()> {
        self.set_field("notes", notes.unwrap_or_default())
    }

    pub fn delivery_mode(&self) -> Result<DeliveryMode> {
        let mode: String = self.get_field("delivery_mode")?;
        DeliveryMode::from_str(&mode).map_err(|err| Error::Conversion {
            field: "delivery_mode".into(),
            reason: err.to_string(),
        })
    }

    /// Set the delivery mode. This drops any served-day set.
    pub fn set_delivery_mode(&self, mode: DeliveryMode) -> Result<()> {
        set_fields(
            &self.db,
            self.id,
            vec![
                ("delivery_mode", mode.to_string()).into(),
                ("delivery_days", stored_days(None)).into(),
            ],
        )
    }

    /// Weekdays this location is limited to, if any.
    pub fn delivery_days(&self) -> Result<Option<DeliveryDays>> {
        let stored: Vec<u64> = self.get_field("delivery_days")?;
        let days = stored
            .into_iter()
            .map(u8::try_from)
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|err| Error::Conversion {
                field: "delivery_days".into(),
                reason: err.to_string(),
            })?;

        Ok(Some(DeliveryDays::from_days(&days)).filter(|d| !d.is_empty()))
    }

    /// Limit this location to the given weekdays. The delivery mode becomes the matching named
    /// mode, daily if there is none. An empty set removes the limit.
    pub fn set_delivery_days(&self, days: DeliveryDays) -> Result<()> {
        let days = Some(days).filter(|d| !d.is_empty());
        let mode = days.map(|d| d.mode()).unwrap_or_default();

        set_fields(
            &self.db,
            self.id,
            vec![
                ("delivery_mode", mode.to_string()).into(),
                ("delivery_days", stored_days(days)).into(),
            ],
        )
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

    /// Deactivate this location. It disappears from its route but stays in the database.
    pub fn remove(&self) -> Result<()> {
        self.set_field("active", false)?;

        debug!("Removed location: {}", self.code()?);

        Ok(())
    }

    /// Snapshot of this location for the sort core.
    pub fn row(&self) -> Result<Row> {
        Ok(Row {
            id: self.id(),
            code: self.code()?,
            label: self.name()?,
            delivery_mode: Some(self.delivery_mode()?),
            delivery_days: self.delivery_days()?,
        })
    }

    fn get_optional(&self, field: &str) -> Result<Option<String>> {
        let value: String = self.get_field(field)?;
        Ok(Some(value).filter(|v| !v.is_empty()))
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

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use crate::{
        Repository,
        repository::NewLocation,
        schedule::{DeliveryDays, DeliveryMode, Schedule},
    };

    #[test]
    fn test_fields() {
        let repo = Repository::mock();
        let route = repo
            .add_route("kuala-lumpur", "KL-002", "Pavilion KL", None)
            .unwrap();

        let location = route
            .add_location(
                &NewLocation::new("113", "Fahrenheit88").with_delivery_mode(DeliveryMode::Alt1),
            )
            .unwrap();

        assert_eq!(location.code().unwrap(), "113");
        assert_eq!(location.name().unwrap(), "Fahrenheit88");
        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Alt1);
        assert_eq!(location.position().unwrap(), 1);
        assert_eq!(location.address().unwrap(), None);

        location.set_address(Some("179 Jalan Bukit Bintang")).unwrap();
        location.set_notes(Some("Loading bay B")).unwrap();
        location.set_contact(Some("+60 3-2141 8888")).unwrap();
        location.set_delivery_mode(DeliveryMode::Weekend).unwrap();

        assert_eq!(
            location.address().unwrap().as_deref(),
            Some("179 Jalan Bukit Bintang")
        );
        assert_eq!(location.notes().unwrap().as_deref(), Some("Loading bay B"));
        assert_eq!(
            location.contact().unwrap().as_deref(),
            Some("+60 3-2141 8888")
        );
        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Weekend);
    }

    #[test]
    fn test_default_mode_is_daily() {
        let repo = Repository::mock();
        let route = repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();

        let location = route
            .add_location(&NewLocation::new("201", "Sunway Pyramid"))
            .unwrap();

        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Daily);
        assert_eq!(location.delivery_days().unwrap(), None);
        assert_eq!(location.contact().unwrap(), None);
    }

    #[test]
    fn test_row() {
        let repo = Repository::mock();
        let route = repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();
        let location = route
            .add_location(
                &NewLocation::new("202", "Sunway Lagoon").with_delivery_mode(DeliveryMode::Weekend),
            )
            .unwrap();

        let row = location.row().unwrap();

        assert_eq!(row.id, location.id());
        assert_eq!(row.code, "202");
        assert_eq!(row.label, "Sunway Lagoon");
        assert_eq!(row.delivery_mode, Some(DeliveryMode::Weekend));
    }

    #[test]
    fn test_ids_are_unique() {
        let repo = Repository::mock();
        let route = repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();

        let pyramid = NewLocation::new("201", "Sunway Pyramid");
        let a = route.add_location(&pyramid).unwrap();
        let b = route.add_location(&pyramid).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_served_days_limit_the_location() {
        let repo = Repository::mock();
        let route = repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();
        let location = route
            .add_location(
                &NewLocation::new("201", "Sunway Pyramid")
                    .with_delivery_days(DeliveryDays::from_days(&[1, 3])),
            )
            .unwrap();

        assert_eq!(
            location.delivery_days().unwrap(),
            Some(DeliveryDays::from_days(&[1, 3]))
        );
        // No named pattern for Monday and Wednesday
        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Daily);

        let row = location.row().unwrap();
        let schedule = Schedule::default();
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();

        assert!(!schedule.serves(&row, tuesday));
        assert!(schedule.serves(&row, wednesday));
    }

    #[test]
    fn test_mode_and_days_replace_each_other() {
        let repo = Repository::mock();
        let route = repo.add_route("selangor", "SL-001", "Sunway", None).unwrap();
        let location = route
            .add_location(&NewLocation::new("202", "Sunway Lagoon"))
            .unwrap();

        location
            .set_delivery_days(DeliveryDays::from_days(&[0, 6]))
            .unwrap();
        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Weekend);

        location.set_delivery_mode(DeliveryMode::Alt2).unwrap();
        assert_eq!(location.delivery_days().unwrap(), None);
        assert_eq!(location.delivery_mode().unwrap(), DeliveryMode::Alt2);
    }
}
