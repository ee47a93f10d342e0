use crate::types::{BookingGroup, TimeSlot};

/// Partitions an arbitrarily-ordered slot selection into maximal consecutive
/// runs, each of which becomes one booking.
///
/// A slot extends the current run iff its start equals the previous slot's
/// end bit-exactly; any gap, even one second, starts a new run. Two slots
/// touching at midnight merge across the date line. Duplicate entries are not
/// deduplicated here, callers that want dedup must do it before selecting.
pub fn group_consecutive(selected_slots: &[TimeSlot]) -> Vec<BookingGroup> {
    let mut sorted = selected_slots.to_vec();
    sorted.sort_by_key(|slot| slot.start_time);

    let mut groups = Vec::new();
    let mut run: Vec<TimeSlot> = Vec::new();
    for slot in sorted {
        if let Some(previous) = run.last() {
            if slot.start_time != previous.end_time {
                groups.extend(close_run(std::mem::take(&mut run)));
            }
        }
        run.push(slot);
    }
    groups.extend(close_run(run));
    groups
}

fn close_run(slots: Vec<TimeSlot>) -> Option<BookingGroup> {
    let start_time = slots.first()?.start_time;
    let end_time = slots.last()?.end_time;
    let duration_hours = (end_time - start_time).num_seconds() as f64 / 3600.0;
    Some(BookingGroup {
        start_time,
        end_time,
        slots,
        duration_hours,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::{at, day, hour_slot};
    use chrono::Duration;
    use uuid::Uuid;

    const DAY: (i32, u32, u32) = (2025, 8, 2);

    fn place() -> Uuid {
        "f2d9c7fe-63ab-4c55-8f0a-9a4b1a9a0be1".parse().unwrap()
    }

    fn slots_for_hours(hours: &[u32]) -> Vec<TimeSlot> {
        hours
            .iter()
            .map(|&hour| hour_slot(place(), day(DAY), hour))
            .collect()
    }

    #[test]
    fn empty_selection_yields_no_groups() {
        assert!(group_consecutive(&[]).is_empty());
    }

    #[test]
    fn single_slot_forms_a_one_hour_group() {
        let groups = group_consecutive(&slots_for_hours(&[9]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].start_time, at(2025, 8, 2, 9, 0));
        assert_eq!(groups[0].end_time, at(2025, 8, 2, 10, 0));
        assert_eq!(groups[0].duration_hours, 1.0);
        assert_eq!(groups[0].format_duration(), "1 hour");
    }

    #[test]
    fn contiguous_and_gapped_hours_split_into_runs() {
        let groups = group_consecutive(&slots_for_hours(&[8, 9, 10, 13, 14]));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].start_time, at(2025, 8, 2, 8, 0));
        assert_eq!(groups[0].end_time, at(2025, 8, 2, 11, 0));
        assert_eq!(groups[0].duration_hours, 3.0);
        assert_eq!(groups[0].slots.len(), 3);
        assert_eq!(groups[1].start_time, at(2025, 8, 2, 13, 0));
        assert_eq!(groups[1].end_time, at(2025, 8, 2, 15, 0));
        assert_eq!(groups[1].duration_hours, 2.0);
    }

    #[test]
    fn input_order_does_not_matter() {
        let sorted = slots_for_hours(&[8, 9, 10, 13, 14]);
        let shuffled = slots_for_hours(&[13, 9, 14, 8, 10]);

        assert_eq!(group_consecutive(&shuffled), group_consecutive(&sorted));
    }

    #[test]
    fn groups_come_out_in_ascending_start_order() {
        let groups = group_consecutive(&slots_for_hours(&[20, 8, 14]));

        let starts: Vec<_> = groups.iter().map(|group| group.start_time).collect();
        assert_eq!(
            starts,
            vec![
                at(2025, 8, 2, 8, 0),
                at(2025, 8, 2, 14, 0),
                at(2025, 8, 2, 20, 0),
            ]
        );
    }

    #[test]
    fn one_second_of_gap_splits_the_run() {
        let first = hour_slot(place(), day(DAY), 8);
        let mut second = hour_slot(place(), day(DAY), 9);
        second.start_time += Duration::seconds(1);
        second.end_time += Duration::seconds(1);

        let groups = group_consecutive(&[first, second]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn runs_merge_across_midnight() {
        let late = hour_slot(place(), day(DAY), 23);
        let early = hour_slot(place(), day((2025, 8, 3)), 0);

        let groups = group_consecutive(&[early, late.clone()]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].start_time, late.start_time);
        assert_eq!(groups[0].end_time, at(2025, 8, 3, 1, 0));
        assert_eq!(groups[0].duration_hours, 2.0);
    }

    #[test]
    fn duplicate_entries_are_kept_as_is() {
        let groups = group_consecutive(&slots_for_hours(&[8, 8, 9]));

        // The second copy of hour 8 cannot extend a run that already ends at
        // 9:00, so it opens its own.
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].duration_hours, 1.0);
        assert_eq!(groups[1].duration_hours, 2.0);
    }

    #[test]
    fn fractional_runs_report_fractional_hours() {
        let mut slot = hour_slot(place(), day(DAY), 9);
        slot.end_time = at(2025, 8, 2, 10, 30);

        let groups = group_consecutive(&[slot]);
        assert_eq!(groups[0].duration_hours, 1.5);
        assert_eq!(groups[0].format_duration(), "1h 30m");
    }
}
