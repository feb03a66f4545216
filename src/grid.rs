//! Slot availability calculators for the guessing grids.
//!
//! Pure functions mapping the set of claimed slots for one event onto a fixed domain (days in a
//! month, 24 hours, 60 minutes, claimed names). The server enforces that a slot is held by at
//! most one guess; if the input violates that anyway, the first record wins.

use crate::model::{GuessKind, PaymentStatus, TakenSlot};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum SlotStatus {
    Available,
    Taken {
        guesser: String,
        payment: PaymentStatus,
    },
}

impl SlotStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourSlot {
    pub hour: u32,
    pub label: String,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinuteSlot {
    pub minute: u32,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameClaim {
    pub name: String,
    pub guesser: String,
    pub payment: PaymentStatus,
}

/// Number of days in a month, or None for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// 12-hour clock label for an hour in 0..24.
pub fn hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", display, suffix)
}

// Builds a value -> claim lookup for one kind. First record wins on duplicates.
fn claims_by_value<'a>(taken: &'a [TakenSlot], kind: GuessKind) -> HashMap<&'a str, &'a TakenSlot> {
    let mut map = HashMap::new();
    for slot in taken.iter().filter(|s| s.kind == kind) {
        map.entry(slot.value.as_str()).or_insert(slot);
    }
    map
}

fn status_for(claim: Option<&&TakenSlot>) -> SlotStatus {
    match claim {
        Some(slot) => SlotStatus::Taken {
            guesser: slot.guesser.clone(),
            payment: slot.payment,
        },
        None => SlotStatus::Available,
    }
}

/// One slot per day of the given month. Date claims are keyed by ISO date strings; claims outside
/// the month simply don't land on any cell. Returns an empty grid for an invalid month.
pub fn day_grid(year: i32, month: u32, taken: &[TakenSlot]) -> Vec<DaySlot> {
    let Some(days) = days_in_month(year, month) else {
        return vec![];
    };
    let claims = claims_by_value(taken, GuessKind::Date);

    (1..=days)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            DaySlot {
                date,
                status: status_for(claims.get(key.as_str())),
            }
        })
        .collect()
}

/// 24 hour slots labelled on the 12-hour clock. Claims with unparseable or out-of-range values
/// are ignored.
pub fn hour_grid(taken: &[TakenSlot]) -> Vec<HourSlot> {
    let claims = claims_by_value(taken, GuessKind::Hour);

    (0..24)
        .map(|hour| {
            let key = hour.to_string();
            HourSlot {
                hour,
                label: hour_label(hour),
                status: status_for(claims.get(key.as_str())),
            }
        })
        .collect()
}

/// 60 minute slots.
pub fn minute_grid(taken: &[TakenSlot]) -> Vec<MinuteSlot> {
    let claims = claims_by_value(taken, GuessKind::Minute);

    (0..60)
        .map(|minute| {
            let key = minute.to_string();
            MinuteSlot {
                minute,
                status: status_for(claims.get(key.as_str())),
            }
        })
        .collect()
}

/// The claimed names with their owners, in claim order. Unlike the calendar and clock grids the
/// name domain is open-ended, so only taken entries are listed.
pub fn name_board(taken: &[TakenSlot]) -> Vec<NameClaim> {
    let mut seen: HashSet<String> = HashSet::new();
    taken
        .iter()
        .filter(|s| s.kind == GuessKind::Name)
        .filter(|s| seen.insert(s.value.trim().to_lowercase()))
        .map(|s| NameClaim {
            name: s.value.clone(),
            guesser: s.guesser.clone(),
            payment: s.payment,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(kind: GuessKind, value: &str, guesser: &str, payment: PaymentStatus) -> TakenSlot {
        TakenSlot {
            kind,
            value: value.to_string(),
            guesser: guesser.to_string(),
            payment,
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), Some(31));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 2), Some(28));
        // Leap years.
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 0), None);
        assert_eq!(days_in_month(2025, 13), None);
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(1), "1 AM");
        assert_eq!(hour_label(11), "11 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(13), "1 PM");
        assert_eq!(hour_label(23), "11 PM");
    }

    #[test]
    fn test_day_grid_availability() {
        let taken = vec![
            claim(GuessKind::Date, "2025-06-14", "Priya", PaymentStatus::Paid),
            claim(GuessKind::Date, "2025-06-01", "Sam", PaymentStatus::Pending),
            // A different month: must not land on any cell.
            claim(GuessKind::Date, "2025-07-02", "Alex", PaymentStatus::Paid),
            // A different kind sharing no domain with the calendar.
            claim(GuessKind::Hour, "14", "Alex", PaymentStatus::Paid),
        ];

        let grid = day_grid(2025, 6, &taken);
        assert_eq!(grid.len(), 30);

        let first = &grid[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(
            first.status,
            SlotStatus::Taken {
                guesser: "Sam".to_string(),
                payment: PaymentStatus::Pending,
            }
        );

        let fourteenth = &grid[13];
        assert_eq!(
            fourteenth.status,
            SlotStatus::Taken {
                guesser: "Priya".to_string(),
                payment: PaymentStatus::Paid,
            }
        );

        // Everything else is available, including the day claimed in July.
        let taken_count = grid.iter().filter(|s| !s.status.is_available()).count();
        assert_eq!(taken_count, 2);
        assert!(grid[1].status.is_available());
    }

    #[test]
    fn test_day_grid_invalid_month_is_empty() {
        assert!(day_grid(2025, 13, &[]).is_empty());
    }

    #[test]
    fn test_day_grid_first_claim_wins_on_duplicates() {
        let taken = vec![
            claim(GuessKind::Date, "2025-06-14", "Priya", PaymentStatus::Paid),
            claim(GuessKind::Date, "2025-06-14", "Sam", PaymentStatus::Pending),
        ];
        let grid = day_grid(2025, 6, &taken);
        match &grid[13].status {
            SlotStatus::Taken { guesser, .. } => assert_eq!(guesser, "Priya"),
            other => panic!("expected taken slot, got {:?}", other),
        }
    }

    #[test]
    fn test_hour_grid() {
        let taken = vec![
            claim(GuessKind::Hour, "0", "Sam", PaymentStatus::Partial),
            claim(GuessKind::Hour, "23", "Priya", PaymentStatus::Paid),
            // Out of range and junk values are ignored.
            claim(GuessKind::Hour, "24", "Nobody", PaymentStatus::Paid),
            claim(GuessKind::Hour, "noon", "Nobody", PaymentStatus::Paid),
        ];

        let grid = hour_grid(&taken);
        assert_eq!(grid.len(), 24);
        assert_eq!(grid[0].label, "12 AM");
        assert_eq!(
            grid[0].status,
            SlotStatus::Taken {
                guesser: "Sam".to_string(),
                payment: PaymentStatus::Partial,
            }
        );
        assert_eq!(grid[23].label, "11 PM");
        assert!(!grid[23].status.is_available());
        assert_eq!(grid.iter().filter(|s| !s.status.is_available()).count(), 2);
    }

    #[test]
    fn test_minute_grid() {
        let taken = vec![
            claim(GuessKind::Minute, "0", "Sam", PaymentStatus::Pending),
            claim(GuessKind::Minute, "59", "Priya", PaymentStatus::Paid),
            claim(GuessKind::Minute, "60", "Nobody", PaymentStatus::Paid),
        ];

        let grid = minute_grid(&taken);
        assert_eq!(grid.len(), 60);
        assert!(!grid[0].status.is_available());
        assert!(!grid[59].status.is_available());
        assert_eq!(grid.iter().filter(|s| !s.status.is_available()).count(), 2);
    }

    #[test]
    fn test_name_board() {
        let taken = vec![
            claim(GuessKind::Name, "Willow", "Sam", PaymentStatus::Paid),
            claim(GuessKind::Name, "Juniper", "Priya", PaymentStatus::Pending),
            // Case-insensitive duplicate of an existing claim: first wins.
            claim(GuessKind::Name, "willow", "Alex", PaymentStatus::Paid),
            claim(GuessKind::Date, "2025-06-14", "Alex", PaymentStatus::Paid),
        ];

        let board = name_board(&taken);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Willow");
        assert_eq!(board[0].guesser, "Sam");
        assert_eq!(board[1].name, "Juniper");
    }

    #[test]
    fn test_empty_input_yields_fully_available_grids() {
        assert!(day_grid(2025, 2, &[]).iter().all(|s| s.status.is_available()));
        assert!(hour_grid(&[]).iter().all(|s| s.status.is_available()));
        assert!(minute_grid(&[]).iter().all(|s| s.status.is_available()));
        assert!(name_board(&[]).is_empty());
    }
}
