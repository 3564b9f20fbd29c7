//! Field layouts of the elements stored in the database.

use agdb::DbKeyValue;

use crate::{
    repository::entities::{NewGalleryImage, NewLocation},
    schedule::DeliveryDays,
};

#[derive(Debug, Clone)]
pub(crate) struct RouteModel<'a> {
    pub code: &'a str,
    /// A human friendly display name
    pub name: &'a str,
    pub description: &'a str,
    /// Operational area the route belongs to
    pub region: &'a str,
}

impl RouteModel<'_> {
    pub fn values(&self, uid: u64) -> Vec<DbKeyValue> {
        vec![
            ("uid", uid).into(),
            ("code", self.code).into(),
            ("name", self.name).into(),
            ("description", self.description).into(),
            ("region", self.region).into(),
            ("active", true).into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LocationModel<'a> {
    pub location: &'a NewLocation,
    pub position: i64,
}

impl LocationModel<'_> {
    pub fn values(&self, uid: u64) -> Vec<DbKeyValue> {
        let location = self.location;
        let days = location.delivery_days.filter(|d| !d.is_empty());
        let mode = days
            .map(|d| d.mode())
            .or(location.delivery_mode)
            .unwrap_or_default();

        vec![
            ("uid", uid).into(),
            ("code", location.code.as_str()).into(),
            ("name", location.name.as_str()).into(),
            ("address", location.address.as_deref().unwrap_or_default()).into(),
            ("contact", location.contact.as_deref().unwrap_or_default()).into(),
            ("notes", location.notes.as_deref().unwrap_or_default()).into(),
            ("delivery_mode", mode.to_string()).into(),
            ("delivery_days", stored_days(days)).into(),
            ("position", self.position).into(),
            ("active", true).into(),
        ]
    }
}

/// Served-day set as stored on a location. An empty list means no restriction.
pub(crate) fn stored_days(days: Option<DeliveryDays>) -> Vec<u64> {
    days.map(|d| d.days().into_iter().map(u64::from).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub(crate) struct GalleryRowModel<'a> {
    pub title: &'a str,
    pub position: i64,
}

impl GalleryRowModel<'_> {
    pub fn values(&self, uid: u64) -> Vec<DbKeyValue> {
        vec![
            ("uid", uid).into(),
            ("title", self.title).into(),
            ("position", self.position).into(),
            ("active", true).into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GalleryImageModel<'a> {
    pub image: &'a NewGalleryImage,
    pub position: i64,
}

impl GalleryImageModel<'_> {
    pub fn values(&self, uid: u64) -> Vec<DbKeyValue> {
        vec![
            ("uid", uid).into(),
            ("url", self.image.url.as_str()).into(),
            ("title", self.image.title.as_str()).into(),
            ("subtitle", self.image.subtitle.as_deref().unwrap_or_default()).into(),
            ("position", self.position).into(),
            ("active", true).into(),
        ]
    }
}
