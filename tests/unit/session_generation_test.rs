use pretty_assertions::assert_eq;

use club_manager::services::session_service::occurrence_dates;

use crate::common::Fixtures;

#[test]
fn sunday_trainings_land_on_sundays() {
    // 2025-01-01 is a Wednesday; first Sunday on or after is 2025-01-05
    let training = Fixtures::recurring_training(6, 1, Fixtures::date(2025, 1, 1), None);

    let dates = occurrence_dates(&training, Fixtures::date(2025, 1, 1), Fixtures::date(2025, 1, 20));

    assert_eq!(
        dates,
        vec![
            Fixtures::date(2025, 1, 5),
            Fixtures::date(2025, 1, 12),
            Fixtures::date(2025, 1, 19),
        ]
    );
}

#[test]
fn zero_interval_is_treated_as_weekly() {
    let training = Fixtures::recurring_training(0, 0, Fixtures::date(2025, 1, 6), None);

    let dates = occurrence_dates(&training, Fixtures::date(2025, 1, 6), Fixtures::date(2025, 1, 20));

    assert_eq!(dates.len(), 3);
}

#[test]
fn window_after_validity_end_yields_nothing() {
    let training = Fixtures::recurring_training(
        0,
        1,
        Fixtures::date(2025, 1, 6),
        Some(Fixtures::date(2025, 2, 1)),
    );

    let dates = occurrence_dates(&training, Fixtures::date(2025, 3, 1), Fixtures::date(2025, 3, 31));

    assert!(dates.is_empty());
}

#[test]
fn generation_is_stable_across_overlapping_windows() {
    // The same training asked over two overlapping windows must agree on
    // the shared dates; this is what makes regeneration idempotent.
    let training = Fixtures::recurring_training(2, 2, Fixtures::date(2025, 1, 1), None);

    let first = occurrence_dates(&training, Fixtures::date(2025, 1, 1), Fixtures::date(2025, 2, 28));
    let second = occurrence_dates(&training, Fixtures::date(2025, 2, 1), Fixtures::date(2025, 3, 31));

    let shared: Vec<_> = first
        .iter()
        .filter(|date| second.contains(date))
        .cloned()
        .collect();
    let expected: Vec<_> = second
        .iter()
        .filter(|date| first.contains(date))
        .cloned()
        .collect();

    assert!(!shared.is_empty());
    assert_eq!(shared, expected);
}
