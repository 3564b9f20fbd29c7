use std::{cmp::Ordering, collections::HashMap};

use chrono::NaiveDate;

use crate::{
    schedule::Schedule,
    sort::{Row, RowId, SortEntry, natural_cmp},
};

/// Turn a partially positioned working set into a total, gap free order.
///
/// Placement rules, strongest first:
/// 1. Entries with a custom order come first, ascending. Equal values keep their input order.
/// 2. Unpositioned rows active on `today` come next, then unpositioned inactive rows.
/// 3. Inside each unpositioned group, rows that had an order in `prior` come first, ascending by
///    that order, followed by the rest in natural code order.
///
/// Entries that don't reference a row in `rows` are dropped. The result is renumbered from 1.
pub fn resolve(
    entries: &[SortEntry],
    rows: &[Row],
    prior: &[SortEntry],
    today: NaiveDate,
    schedule: &Schedule,
) -> Vec<SortEntry> {
    let rows: HashMap<&RowId, &Row> = rows.iter().map(|r| (&r.id, r)).collect();

    let mut prior_orders: HashMap<&RowId, i64> = HashMap::new();
    for entry in prior {
        if let Some(order) = entry.custom_order {
            prior_orders.entry(&entry.id).or_insert(order);
        }
    }

    let mut explicit: Vec<(i64, &Row)> = Vec::new();
    let mut active: Vec<&Row> = Vec::new();
    let mut inactive: Vec<&Row> = Vec::new();

    for entry in entries {
        let Some(row) = rows.get(&entry.id).copied() else {
            continue;
        };

        match entry.custom_order {
            Some(order) => explicit.push((order, row)),
            None if schedule.serves(row, today) => active.push(row),
            None => inactive.push(row),
        }
    }

    // Stable sort, duplicates stay in input order
    explicit.sort_by_key(|(order, _)| *order);
    active.sort_by(|a, b| auto_cmp(&prior_orders, a, b));
    inactive.sort_by(|a, b| auto_cmp(&prior_orders, a, b));

    explicit
        .into_iter()
        .map(|(_, row)| row)
        .chain(active)
        .chain(inactive)
        .zip(1_i64..)
        .map(|(row, order)| SortEntry::new(row.id.clone(), Some(order)))
        .collect()
}

fn auto_cmp(prior: &HashMap<&RowId, i64>, a: &Row, b: &Row) -> Ordering {
    match (prior.get(&a.id), prior.get(&b.id)) {
        (Some(a_order), Some(b_order)) => a_order.cmp(b_order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => natural_cmp(&a.code, &b.code),
    }
}
