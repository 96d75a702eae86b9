//! Manual ordering of timetable entries within independent groups.
//!
//! Entries carry an optional integer `order` that only has meaning relative to
//! other entries of the same group. Orders of different groups are never
//! compared, so reordering one weekday leaves every other weekday untouched.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Lecture, Weekday};

pub trait Ordered {
    type Group: PartialEq + Copy;

    fn id(&self) -> &str;
    fn group(&self) -> Self::Group;
    fn order(&self) -> Option<i64>;
    fn set_order(&mut self, order: i64);

    /// Missing orders sort as 0.
    fn rank(&self) -> i64 {
        self.order().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Time,
    Name,
    Manual,
}

/// Result of [`move_entry`]: the ids whose `order` was rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub changed: Vec<String>,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Order value that places a new entry last in `group`.
pub fn next_order<T: Ordered>(entries: &[T], group: T::Group) -> i64 {
    entries
        .iter()
        .filter(|e| e.group() == group)
        .map(|e| e.rank())
        .max()
        .unwrap_or(-1)
        + 1
}

pub fn append<T: Ordered>(entries: &mut Vec<T>, mut entry: T) {
    let order = next_order(entries, entry.group());
    entry.set_order(order);
    entries.push(entry);
}

/// Swaps `id` with its neighbour in `direction` inside its own group.
///
/// The group is renumbered `0..n-1` first, so gaps and duplicates left by
/// older data are repaired by any successful move. An unknown id, or a move
/// past either end of the group, leaves `entries` exactly as it was.
pub fn move_entry<T: Ordered>(entries: &mut [T], id: &str, direction: Direction) -> MoveOutcome {
    let Some(group) = entries.iter().find(|e| e.id() == id).map(|e| e.group()) else {
        return MoveOutcome::default();
    };

    // Stable sort keeps ties in collection order.
    let mut peers: Vec<usize> = (0..entries.len())
        .filter(|&i| entries[i].group() == group)
        .collect();
    peers.sort_by_key(|&i| entries[i].rank());

    let Some(current) = peers.iter().position(|&i| entries[i].id() == id) else {
        return MoveOutcome::default();
    };
    let swap = match direction {
        Direction::Up => current.checked_sub(1),
        Direction::Down => Some(current + 1).filter(|&s| s < peers.len()),
    };
    let Some(swap) = swap else {
        return MoveOutcome::default();
    };

    peers.swap(current, swap);

    let mut changed = Vec::new();
    for (position, &i) in peers.iter().enumerate() {
        let position = position as i64;
        if entries[i].order() != Some(position) {
            entries[i].set_order(position);
            changed.push(entries[i].id().to_string());
        }
    }
    MoveOutcome { changed }
}

/// One day's lectures in display order. Never touches stored orders.
pub fn sorted_day(lectures: &[Lecture], day: Weekday, mode: SortMode) -> Vec<Lecture> {
    let mut today: Vec<Lecture> = lectures.iter().filter(|l| l.day == day).cloned().collect();
    match mode {
        // Zero-padded 24h strings sort chronologically.
        SortMode::Time => today.sort_by(|a, b| a.start_time.cmp(&b.start_time)),
        SortMode::Name => today.sort_by(|a, b| a.subject_name.cmp(&b.subject_name)),
        SortMode::Manual => today.sort_by_key(|l| l.rank()),
    }
    today
}

pub const PALETTE: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#06b6d4", "#3b82f6", "#a855f7", "#ec4899",
];

pub fn palette_color(seed: usize) -> &'static str {
    PALETTE[seed % PALETTE.len()]
}

/// Accepts only zero-padded `HH:mm`.
pub fn parse_clock(value: &str) -> Result<NaiveTime, AppError> {
    if value.len() != 5 {
        return Err(AppError::BadRequest(format!("time must be HH:mm, got {:?}", value)));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::BadRequest(format!("time must be HH:mm, got {:?}", value)))
}

pub fn validate_slot(start_time: &str, end_time: &str) -> Result<(), AppError> {
    let start = parse_clock(start_time)?;
    let end = parse_clock(end_time)?;
    if end <= start {
        return Err(AppError::BadRequest(format!(
            "end time {} must be after start time {}",
            end_time, start_time
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(id: &str, day: Weekday, start: &str, name: &str) -> Lecture {
        Lecture {
            id: id.to_string(),
            subject_id: format!("sub-{}", name),
            subject_name: name.to_string(),
            day,
            start_time: start.to_string(),
            end_time: "23:59".to_string(),
            color: palette_color(0).to_string(),
            order: None,
        }
    }

    fn orders(entries: &[Lecture], day: Weekday) -> Vec<(String, Option<i64>)> {
        entries
            .iter()
            .filter(|l| l.day == day)
            .map(|l| (l.id.clone(), l.order))
            .collect()
    }

    #[test]
    fn test_append_assigns_sequential_orders() {
        let mut entries = Vec::new();
        append(&mut entries, lecture("a", Weekday::Friday, "09:00", "Maths"));
        append(&mut entries, lecture("x", Weekday::Monday, "09:00", "Art"));
        append(&mut entries, lecture("b", Weekday::Friday, "08:00", "Chemistry"));
        append(&mut entries, lecture("c", Weekday::Friday, "07:00", "Physics"));

        assert_eq!(
            orders(&entries, Weekday::Friday),
            vec![
                ("a".to_string(), Some(0)),
                ("b".to_string(), Some(1)),
                ("c".to_string(), Some(2)),
            ]
        );
        assert_eq!(orders(&entries, Weekday::Monday), vec![("x".to_string(), Some(0))]);
    }

    #[test]
    fn test_append_after_gap() {
        let mut entries = vec![lecture("a", Weekday::Monday, "09:00", "Maths")];
        entries[0].order = Some(5);
        append(&mut entries, lecture("b", Weekday::Monday, "10:00", "Art"));
        assert_eq!(entries[1].order, Some(6));
    }

    #[test]
    fn test_single_entry_move_is_noop() {
        let mut entries = Vec::new();
        append(&mut entries, lecture("only", Weekday::Tuesday, "09:00", "Maths"));

        let outcome = move_entry(&mut entries, "only", Direction::Up);
        assert!(!outcome.moved());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].order, Some(0));
    }

    #[test]
    fn test_move_middle_down_and_first_up() {
        let mut entries = Vec::new();
        for id in ["a", "b", "c"] {
            append(&mut entries, lecture(id, Weekday::Wednesday, "09:00", id));
        }

        let outcome = move_entry(&mut entries, "b", Direction::Down);
        assert!(outcome.moved());
        assert_eq!(outcome.changed, vec!["c".to_string(), "b".to_string()]);
        let by_manual: Vec<String> = sorted_day(&entries, Weekday::Wednesday, SortMode::Manual)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(by_manual, vec!["a", "c", "b"]);

        let before = orders(&entries, Weekday::Wednesday);
        let outcome = move_entry(&mut entries, "a", Direction::Up);
        assert!(!outcome.moved());
        assert_eq!(orders(&entries, Weekday::Wednesday), before);
    }

    #[test]
    fn test_move_last_down_is_noop() {
        let mut entries = Vec::new();
        for id in ["a", "b"] {
            append(&mut entries, lecture(id, Weekday::Monday, "09:00", id));
        }
        assert!(!move_entry(&mut entries, "b", Direction::Down).moved());
        assert_eq!(entries[1].order, Some(1));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut entries = vec![lecture("a", Weekday::Monday, "09:00", "Maths")];
        let outcome = move_entry(&mut entries, "missing", Direction::Down);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(entries[0].order, None);
    }

    #[test]
    fn test_move_normalizes_gaps_and_missing_orders() {
        let mut entries = vec![
            lecture("a", Weekday::Thursday, "09:00", "a"),
            lecture("b", Weekday::Thursday, "09:00", "b"),
            lecture("c", Weekday::Thursday, "09:00", "c"),
            lecture("d", Weekday::Thursday, "09:00", "d"),
        ];
        entries[0].order = None;
        entries[1].order = Some(4);
        entries[2].order = Some(4);
        entries[3].order = Some(10);

        let outcome = move_entry(&mut entries, "d", Direction::Up);
        assert!(outcome.moved());

        let mut seen: Vec<i64> = entries.iter().filter_map(|l| l.order).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        let manual: Vec<String> = sorted_day(&entries, Weekday::Thursday, SortMode::Manual)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(manual, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_move_does_not_touch_other_days() {
        let mut entries = Vec::new();
        for id in ["m1", "m2", "m3"] {
            append(&mut entries, lecture(id, Weekday::Monday, "09:00", id));
        }
        for id in ["t1", "t2"] {
            append(&mut entries, lecture(id, Weekday::Tuesday, "09:00", id));
        }
        entries[3].order = Some(7);
        let tuesday = orders(&entries, Weekday::Tuesday);

        move_entry(&mut entries, "m3", Direction::Up);
        move_entry(&mut entries, "m1", Direction::Down);

        assert_eq!(orders(&entries, Weekday::Tuesday), tuesday);
    }

    #[test]
    fn test_display_orderings() {
        let mut entries = Vec::new();
        append(&mut entries, lecture("1", Weekday::Monday, "14:00", "Biology"));
        append(&mut entries, lecture("2", Weekday::Monday, "08:30", "Physics"));
        append(&mut entries, lecture("3", Weekday::Monday, "10:15", "Art"));
        append(&mut entries, lecture("4", Weekday::Sunday, "07:00", "Aardvarks"));

        let ids = |mode| -> Vec<String> {
            sorted_day(&entries, Weekday::Monday, mode)
                .into_iter()
                .map(|l| l.id)
                .collect()
        };
        assert_eq!(ids(SortMode::Time), vec!["2", "3", "1"]);
        assert_eq!(ids(SortMode::Name), vec!["3", "1", "2"]);
        assert_eq!(ids(SortMode::Manual), vec!["1", "2", "3"]);
        assert_eq!(entries[0].order, Some(0));
    }

    #[test]
    fn test_validate_slot() {
        assert!(validate_slot("09:00", "10:30").is_ok());
        assert!(validate_slot("9:00", "10:30").is_err());
        assert!(validate_slot("09:00", "09:00").is_err());
        assert!(validate_slot("11:00", "10:00").is_err());
        assert!(validate_slot("24:00", "25:00").is_err());
    }
}
