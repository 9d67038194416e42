//! Recurrence period model and completion merges.
//!
//! The backend owns `isCompletedForCurrentPeriod`; everything the UI
//! renders comes from server responses, never from a local recomputation.
//! The predicate here is the executable form of the contract those
//! responses follow, with the period boundaries fixed as:
//!
//! - DAILY: same local calendar day
//! - WEEKLY: same ISO week, Monday start
//! - CUSTOM: one-shot, completed forever once completed (no reset is
//!   exposed to the client)
//!
//! The cached routine lists act as a read-through cache keyed by routine
//! id; a successful complete call invalidates exactly one entry via the
//! merge functions below.

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Utc};

use crate::models::{CareSheetRoutine, RecurrenceType, Routine, ShareToken, SharedRoutineView};

/// Whether a completion at `last_completed_at` still satisfies the routine
/// at instant `now`. Absent timestamp means never completed.
pub fn is_completed_for_period(
    recurrence: RecurrenceType,
    last_completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let Some(last) = last_completed_at else {
        return false;
    };
    same_period(
        recurrence,
        last.with_timezone(&Local).naive_local(),
        now.with_timezone(&Local).naive_local(),
    )
}

/// Period comparison on wall-clock datetimes. Split out so the boundary
/// rules can be tested without depending on the host timezone.
pub fn same_period(recurrence: RecurrenceType, last: NaiveDateTime, now: NaiveDateTime) -> bool {
    match recurrence {
        RecurrenceType::Daily => last.date() == now.date(),
        RecurrenceType::Weekly => {
            let (a, b) = (last.iso_week(), now.iso_week());
            a.year() == b.year() && a.week() == b.week()
        }
        RecurrenceType::Custom => true,
    }
}

/// Replace the matching routine after a successful owner-path complete
/// call. Targeted merge: every other entry is left untouched so a
/// concurrently fetched list is never clobbered. Returns false when the
/// routine is no longer in the list (stale cache); callers then refetch.
pub fn merge_completed(routines: &mut [Routine], updated: Routine) -> bool {
    match routines.iter_mut().find(|r| r.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Care-sheet variant: entries carry no resource id, so the merge is keyed
/// by the embedded per-routine completion token. Only the completion
/// fields change.
pub fn merge_shared_completed(
    routines: &mut [CareSheetRoutine],
    token: &ShareToken,
    updated: &SharedRoutineView,
) {
    for routine in routines.iter_mut() {
        if routine.share_token == *token {
            routine.last_completed_at = updated.last_completed_at;
            routine.is_completed_for_current_period = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn routine(id: &str, completed: bool) -> Routine {
        Routine {
            id: id.to_string(),
            pet_id: "p1".to_string(),
            name: format!("routine {id}"),
            description: None,
            task_type: None,
            recurrence_type: RecurrenceType::Daily,
            time_of_day: Some("09:00".to_string()),
            remind_me: false,
            remind_minutes_after: None,
            medicine: None,
            medicine_instructions: None,
            last_completed_at: if completed {
                Some(Utc::now())
            } else {
                None
            },
            is_completed_for_current_period: completed,
            share_token: None,
        }
    }

    #[test]
    fn absent_completion_is_never_done() {
        let now = Utc::now();
        for recurrence in [
            RecurrenceType::Daily,
            RecurrenceType::Weekly,
            RecurrenceType::Custom,
        ] {
            assert!(!is_completed_for_period(recurrence, None, now));
        }
    }

    #[test]
    fn daily_rearms_at_local_midnight() {
        let now = at(2026, 8, 5, 9, 0);
        // Same day, even just after midnight.
        assert!(same_period(RecurrenceType::Daily, at(2026, 8, 5, 0, 1), now));
        // 23:59 the day before is a different period despite being minutes away.
        assert!(!same_period(
            RecurrenceType::Daily,
            at(2026, 8, 4, 23, 59),
            now
        ));
    }

    #[test]
    fn weekly_uses_iso_week_monday_start() {
        // 2026-08-05 is a Wednesday; the ISO week runs Mon 08-03 .. Sun 08-09.
        let now = at(2026, 8, 5, 12, 0);
        assert!(same_period(RecurrenceType::Weekly, at(2026, 8, 3, 0, 0), now));
        assert!(same_period(RecurrenceType::Weekly, at(2026, 8, 9, 23, 59), now));
        // Sunday 08-02 belongs to the previous week.
        assert!(!same_period(
            RecurrenceType::Weekly,
            at(2026, 8, 2, 23, 59),
            now
        ));
    }

    #[test]
    fn weekly_distinguishes_same_week_number_across_years() {
        // Both instants fall in ISO week 2 of their respective years.
        assert!(!same_period(
            RecurrenceType::Weekly,
            at(2025, 1, 8, 12, 0),
            at(2026, 1, 7, 12, 0)
        ));
    }

    #[test]
    fn custom_stays_completed_once_done() {
        let done_long_ago = at(2020, 1, 1, 0, 0);
        assert!(same_period(
            RecurrenceType::Custom,
            done_long_ago,
            at(2026, 8, 5, 9, 0)
        ));
    }

    #[test]
    fn merge_replaces_only_the_matching_routine() {
        let mut routines = vec![routine("a", false), routine("b", false)];
        let mut updated = routine("b", true);
        updated.name = "renamed".to_string();

        assert!(merge_completed(&mut routines, updated));
        assert!(!routines[0].is_completed_for_current_period);
        assert!(routines[1].is_completed_for_current_period);
        assert_eq!(routines[1].name, "renamed");
        assert_eq!(routines[0].name, "routine a");
    }

    #[test]
    fn merge_of_unknown_routine_reports_stale_cache() {
        let mut routines = vec![routine("a", false)];
        assert!(!merge_completed(&mut routines, routine("gone", true)));
        assert!(!routines[0].is_completed_for_current_period);
    }

    #[test]
    fn completing_twice_in_one_period_is_a_state_noop() {
        let mut routines = vec![routine("a", true)];
        let first_completed_at = routines[0].last_completed_at;

        // Second complete in the same period: newer timestamp, flag unchanged.
        let mut again = routines[0].clone();
        again.last_completed_at = Some(Utc::now());
        assert!(merge_completed(&mut routines, again));
        assert!(routines[0].is_completed_for_current_period);
        assert!(routines[0].last_completed_at >= first_completed_at);
    }

    #[test]
    fn shared_merge_keys_on_token_and_touches_completion_fields_only() {
        let make = |token: &str| CareSheetRoutine {
            share_token: ShareToken::new(token),
            name: "Breakfast".to_string(),
            description: Some("kibble".to_string()),
            task_type: None,
            medicine: None,
            medicine_instructions: None,
            time_of_day: Some("09:00".to_string()),
            last_completed_at: None,
            is_completed_for_current_period: false,
        };
        let mut routines = vec![make("t1"), make("t2")];
        let updated = SharedRoutineView {
            pet_name: "Rex".to_string(),
            species: None,
            breed: None,
            birth_date: None,
            allergies: None,
            vet_name: None,
            vet_contact_number: None,
            emergency_contact_name: None,
            emergency_contact_number: None,
            name: "ignored".to_string(),
            description: None,
            task_type: None,
            medicine: None,
            medicine_instructions: None,
            time_of_day: None,
            last_completed_at: Some(Utc::now()),
            is_completed_for_current_period: true,
        };

        merge_shared_completed(&mut routines, &ShareToken::new("t2"), &updated);
        assert!(!routines[0].is_completed_for_current_period);
        assert!(routines[1].is_completed_for_current_period);
        assert!(routines[1].last_completed_at.is_some());
        // Display fields are not overwritten by the shared projection.
        assert_eq!(routines[1].name, "Breakfast");
    }
}
