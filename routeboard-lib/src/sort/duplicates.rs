use std::collections::HashMap;

use serde::Serialize;

use crate::sort::{Row, RowId, SortEntry};

/// A custom order value claimed by more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub order: i64,
    /// Codes of every row claiming `order`, in the order the entries were given
    pub codes: Vec<String>,
}

/// Report every custom order value that two or more rows share.
///
/// Groups come out in the order their value first appears in `entries`. Unpositioned entries are
/// never duplicates, and entries whose row is no longer in `rows` are ignored.
pub fn find_duplicates(entries: &[SortEntry], rows: &[Row]) -> Vec<Duplicate> {
    let codes: HashMap<&RowId, &str> = rows.iter().map(|r| (&r.id, r.code.as_str())).collect();

    let mut groups: Vec<Duplicate> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::new();

    for entry in entries {
        let Some(order) = entry.custom_order else {
            continue;
        };
        let Some(code) = codes.get(&entry.id) else {
            continue;
        };

        if let Some(group) = slots.get(&order).and_then(|slot| groups.get_mut(*slot)) {
            group.codes.push((*code).to_string());
            continue;
        }

        slots.insert(order, groups.len());
        groups.push(Duplicate {
            order,
            codes: vec![(*code).to_string()],
        });
    }

    groups.retain(|group| group.codes.len() > 1);
    groups
}
