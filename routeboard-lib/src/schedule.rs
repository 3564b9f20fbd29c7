//! Delivery calendar rules.
//!
//! Every route and location carries a [`DeliveryMode`] that says on which days it is served. The
//! [`Schedule`] answers whether a mode is active on a given date. Locations may also be limited to
//! an explicit set of [`DeliveryDays`]. The schedule never reads a clock itself, callers pass the
//! date they care about.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::sort::Row;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Served every day
    #[default]
    Daily,
    /// Served on even weeks counted from the schedule anchor
    Alt1,
    /// Served on odd weeks counted from the schedule anchor
    Alt2,
    /// Served Monday to Friday
    Weekday,
    /// Served Saturday and Sunday
    Weekend,
}

impl DeliveryMode {
    /// Derive a mode from a set of served weekdays, numbered from 0 (Sunday) to 6 (Saturday).
    ///
    /// Sets that don't match one of the named patterns fall back to [`DeliveryMode::Daily`].
    pub fn from_days(days: &[u8]) -> Self {
        let mut seen = [false; 7];
        for day in days {
            if let Some(slot) = seen.get_mut(usize::from(*day)) {
                *slot = true;
            }
        }

        let weekend = [0, 6];
        let served = |d: usize| seen.get(d).copied().unwrap_or(false);
        let count = seen.iter().filter(|s| **s).count();

        if count == 5 && !weekend.iter().any(|d| served(*d)) {
            DeliveryMode::Weekday
        } else if count == 2 && weekend.iter().all(|d| served(*d)) {
            DeliveryMode::Weekend
        } else {
            DeliveryMode::Daily
        }
    }
}

/// Weekdays a location is served on, numbered from 0 (Sunday) to 6 (Saturday).
///
/// An empty set places no restriction, the same as a location without a served-day set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeliveryDays(u8);

impl DeliveryDays {
    /// Build a set from weekday numbers. Numbers above 6 are ignored.
    pub fn from_days(days: &[u8]) -> Self {
        Self(days.iter().filter_map(|d| day_bit(*d)).fold(0, |set, bit| set | bit))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        u8::try_from(weekday.num_days_from_sunday())
            .ok()
            .and_then(day_bit)
            .is_some_and(|bit| self.0 & bit != 0)
    }

    /// Served weekday numbers, ascending.
    pub fn days(&self) -> Vec<u8> {
        (0..7_u8)
            .filter(|d| day_bit(*d).is_some_and(|bit| self.0 & bit != 0))
            .collect()
    }

    /// The named mode shown for this set. Sets with no matching name show as daily.
    pub fn mode(&self) -> DeliveryMode {
        DeliveryMode::from_days(&self.days())
    }
}

impl fmt::Display for DeliveryDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = WEEK
            .iter()
            .filter(|day| self.contains(**day))
            .map(|day| day.to_string())
            .collect();

        write!(f, "{}", names.join(","))
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn day_bit(day: u8) -> Option<u8> {
    (day < 7).then(|| 1_u8.checked_shl(u32::from(day))).flatten()
}

/// Calendar used to decide whether a [`DeliveryMode`] is active on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// First day of week zero for the alternating modes. Weeks are counted in seven day blocks
    /// from this date, so it should normally be a Monday.
    pub alternate_week_anchor: NaiveDate,
}

impl Schedule {
    pub fn new(alternate_week_anchor: NaiveDate) -> Self {
        Self {
            alternate_week_anchor,
        }
    }

    /// Whether a row with the given mode is served on `date`. An absent mode counts as daily.
    pub fn is_active(&self, mode: Option<DeliveryMode>, date: NaiveDate) -> bool {
        match mode.unwrap_or_default() {
            DeliveryMode::Daily => true,
            DeliveryMode::Weekday => !is_weekend(date.weekday()),
            DeliveryMode::Weekend => is_weekend(date.weekday()),
            DeliveryMode::Alt1 => self.week_index(date).rem_euclid(2) == 0,
            DeliveryMode::Alt2 => self.week_index(date).rem_euclid(2) == 1,
        }
    }

    /// Whether `row` is served on `date`. Its mode has to be active and, if it carries a served-day
    /// set, the weekday of `date` has to be in it.
    pub fn serves(&self, row: &Row, date: NaiveDate) -> bool {
        self.is_active(row.delivery_mode, date)
            && row
                .delivery_days
                .is_none_or(|days| days.is_empty() || days.contains(date.weekday()))
    }

    /// Number of whole weeks between the anchor and `date`, negative before the anchor.
    fn week_index(&self, date: NaiveDate) -> i64 {
        (date - self.alternate_week_anchor).num_days().div_euclid(7)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            alternate_week_anchor: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use chrono::{NaiveDate, Weekday};

    use super::{DeliveryDays, DeliveryMode, Schedule};
    use crate::sort::Row;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_and_absent_always_active() {
        let schedule = Schedule::default();
        // Sunday
        let day = date(2024, 3, 10);

        assert!(schedule.is_active(Some(DeliveryMode::Daily), day));
        assert!(schedule.is_active(None, day));
    }

    #[test]
    fn test_weekday_and_weekend() {
        let schedule = Schedule::default();
        let wednesday = date(2024, 3, 13);
        let saturday = date(2024, 3, 16);

        assert!(schedule.is_active(Some(DeliveryMode::Weekday), wednesday));
        assert!(!schedule.is_active(Some(DeliveryMode::Weekday), saturday));
        assert!(!schedule.is_active(Some(DeliveryMode::Weekend), wednesday));
        assert!(schedule.is_active(Some(DeliveryMode::Weekend), saturday));
    }

    #[test]
    fn test_alternating_weeks() {
        let schedule = Schedule::new(date(2024, 1, 1));

        // Week 0
        assert!(schedule.is_active(Some(DeliveryMode::Alt1), date(2024, 1, 7)));
        assert!(!schedule.is_active(Some(DeliveryMode::Alt2), date(2024, 1, 7)));
        // Week 1
        assert!(!schedule.is_active(Some(DeliveryMode::Alt1), date(2024, 1, 8)));
        assert!(schedule.is_active(Some(DeliveryMode::Alt2), date(2024, 1, 8)));
        // Week -1, before the anchor
        assert!(schedule.is_active(Some(DeliveryMode::Alt2), date(2023, 12, 31)));
        assert!(!schedule.is_active(Some(DeliveryMode::Alt1), date(2023, 12, 31)));
    }

    #[test]
    fn test_delivery_days() {
        let days = DeliveryDays::from_days(&[3, 1, 9, 1]);

        assert_eq!(days.days(), vec![1, 3]);
        assert!(days.contains(Weekday::Mon));
        assert!(!days.contains(Weekday::Tue));
        assert_eq!(days.mode(), DeliveryMode::Daily);
        assert_eq!(days.to_string(), "Mon,Wed");
        assert!(DeliveryDays::from_days(&[]).is_empty());
        assert_eq!(
            DeliveryDays::from_days(&[0, 6]).mode(),
            DeliveryMode::Weekend
        );
    }

    #[test]
    fn test_serves_respects_served_days() {
        let schedule = Schedule::default();
        let row = Row::new("7", "201", "Sunway Pyramid")
            .with_delivery_days(DeliveryDays::from_days(&[1, 3]));

        assert!(schedule.serves(&row, date(2024, 3, 11)));
        assert!(!schedule.serves(&row, date(2024, 3, 12)));
        assert!(schedule.serves(&row, date(2024, 3, 13)));

        // No served-day set, the mode alone decides
        let daily = Row::new("8", "202", "Sunway Lagoon");
        assert!(schedule.serves(&daily, date(2024, 3, 12)));

        let alternating = Row::new("9", "203", "Sunway Velocity")
            .with_delivery_mode(DeliveryMode::Alt1)
            .with_delivery_days(DeliveryDays::from_days(&[2]));
        // Tuesday of week 10 from the anchor, an even week
        assert!(schedule.serves(&alternating, date(2024, 3, 12)));
        // Tuesday of week 11
        assert!(!schedule.serves(&alternating, date(2024, 3, 19)));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(DeliveryMode::from_str("weekend").unwrap(), DeliveryMode::Weekend);
        assert_eq!(DeliveryMode::from_str("Alt1").unwrap(), DeliveryMode::Alt1);
        assert!(DeliveryMode::from_str("fortnightly").is_err());
        assert_eq!(DeliveryMode::Alt2.to_string(), "alt2");
    }

    #[test]
    fn test_from_days() {
        assert_eq!(DeliveryMode::from_days(&[]), DeliveryMode::Daily);
        assert_eq!(
            DeliveryMode::from_days(&[0, 1, 2, 3, 4, 5, 6]),
            DeliveryMode::Daily
        );
        assert_eq!(
            DeliveryMode::from_days(&[1, 2, 3, 4, 5]),
            DeliveryMode::Weekday
        );
        assert_eq!(DeliveryMode::from_days(&[6, 0]), DeliveryMode::Weekend);
        assert_eq!(DeliveryMode::from_days(&[1, 3]), DeliveryMode::Daily);
    }
}
