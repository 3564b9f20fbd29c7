//! Editing session for a custom sort.
//!
//! A [`SortSession`] owns the working set while a user reorders one list of rows. It starts from
//! the rows' current order, takes position edits, manages the region's saved lists and finally
//! resolves the working set into the order to apply. Nothing is persisted unless the caller
//! applies the resolved order or saves a list.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    Error, Result,
    schedule::Schedule,
    sort::{Duplicate, Row, RowId, SortEntry, find_duplicates, initial_entries, parse_custom_order, resolve},
    store::{KvStore, SavedSortList, SortListStore},
};

#[derive(Debug, Clone)]
pub struct SortSession<S> {
    rows: Vec<Row>,
    region: String,
    lists: SortListStore<S>,
    entries: Vec<SortEntry>,
    /// Order of the rows when the session started
    prior: Vec<SortEntry>,
}

impl<S: KvStore> SortSession<S> {
    pub fn new(rows: Vec<Row>, region: &str, lists: SortListStore<S>) -> Self {
        let entries = initial_entries(&rows);

        Self {
            prior: entries.clone(),
            entries,
            rows,
            region: region.to_string(),
            lists,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// The working set, one entry per row.
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Find a row by `@<id>` or by its code. A code shared by several rows is rejected.
    pub fn find_row(&self, key: &str) -> Result<&Row> {
        if let Some(id) = key.strip_prefix('@') {
            return self
                .rows
                .iter()
                .find(|r| r.id.as_str() == id)
                .ok_or_else(|| Error::UnknownRow(key.to_string()));
        }

        let mut matches = self.rows.iter().filter(|r| r.code == key);
        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(row),
            (Some(_), Some(_)) => Err(Error::AmbiguousCode(key.to_string())),
            (None, _) => Err(Error::UnknownRow(key.to_string())),
        }
    }

    /// Set a row's position from raw user input. Blank or non-numeric input unpositions the row.
    ///
    /// Returns `false` if no entry has that id.
    pub fn set_order(&mut self, id: &RowId, input: &str) -> bool {
        self.set_order_value(id, parse_custom_order(input))
    }

    pub fn set_order_value(&mut self, id: &RowId, order: Option<i64>) -> bool {
        match self.entries.iter_mut().find(|e| &e.id == id) {
            Some(entry) => {
                entry.custom_order = order;
                true
            }
            None => false,
        }
    }

    /// Throw away every edit and go back to the rows' current order.
    pub fn reset(&mut self) {
        self.entries = self.prior.clone();
    }

    /// Positions claimed by more than one row in the working set.
    pub fn duplicates(&self) -> Vec<Duplicate> {
        find_duplicates(&self.entries, &self.rows)
    }

    /// The order that applying the working set on `today` would produce.
    pub fn resolve(&self, today: NaiveDate, schedule: &Schedule) -> Vec<SortEntry> {
        resolve(&self.entries, &self.rows, &self.prior, today, schedule)
    }

    // Saved lists

    pub fn saved_lists(&self) -> Vec<SavedSortList> {
        self.lists.load(&self.region)
    }

    /// Save the working set under `name` and return the new list.
    pub fn save_as(&self, name: &str) -> Result<SavedSortList> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyListName);
        }

        let list = SavedSortList::new(name, self.entries.clone());

        let mut lists = self.saved_lists();
        lists.push(list.clone());
        self.lists.save(&self.region, &lists)?;

        debug!("Saved sort list '{name}' for {}", self.region);

        Ok(list)
    }

    /// Replace the working set with a saved list, found by id or else by name.
    ///
    /// Entries for rows that no longer exist are dropped and rows the list doesn't mention are
    /// left unpositioned, so the working set still has exactly one entry per row.
    pub fn load_list(&mut self, key: &str) -> Result<SavedSortList> {
        let list = find_list(self.saved_lists(), key)?;

        let mut seen: HashSet<&RowId> = HashSet::new();
        let mut entries: Vec<SortEntry> = list
            .sort_config
            .iter()
            .filter(|e| self.row(&e.id).is_some() && seen.insert(&e.id))
            .cloned()
            .collect();

        for row in &self.rows {
            if !seen.contains(&row.id) {
                entries.push(SortEntry::new(row.id.clone(), None));
            }
        }

        self.entries = entries;

        Ok(list)
    }

    /// Delete a saved list, found by id or else by name.
    pub fn delete_list(&self, key: &str) -> Result<SavedSortList> {
        let lists = self.saved_lists();
        let removed = find_list(lists.clone(), key)?;

        let remaining: Vec<SavedSortList> =
            lists.into_iter().filter(|l| l.id != removed.id).collect();
        self.lists.save(&self.region, &remaining)?;

        debug!("Deleted sort list '{}' for {}", removed.name, self.region);

        Ok(removed)
    }
}

fn find_list(lists: Vec<SavedSortList>, key: &str) -> Result<SavedSortList> {
    let by_id = lists.iter().position(|l| l.id == key);
    let index = by_id.or_else(|| lists.iter().position(|l| l.name == key));

    index
        .and_then(|i| lists.into_iter().nth(i))
        .ok_or_else(|| Error::UnknownList(key.to_string()))
}
