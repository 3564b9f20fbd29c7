//! Administration library for delivery routes, their locations and the gallery content block.
//!
//! The [`Repository`] is the entry point for persistent records. The [`sort`] module holds the
//! custom-sort core used to reorder those records, and [`session`] wraps it into the editing
//! workflow a front end drives.

use thiserror::Error;

pub mod fs;
pub mod repository;
pub mod schedule;
pub mod session;
pub mod sort;
pub mod store;

pub use repository::Repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Entity(#[from] repository::entities::Error),
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error(transparent)]
    Config(#[from] repository::config::Error),
    #[error("Failed to open the database: {0}")]
    Database(#[from] agdb::DbError),
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("A sort list needs a non-empty name")]
    EmptyListName,
    #[error("No saved sort list named '{0}'")]
    UnknownList(String),
    #[error("No row matches '{0}'")]
    UnknownRow(String),
    #[error("Several rows use the code '{0}', pick one by id as @ID")]
    AmbiguousCode(String),
}
