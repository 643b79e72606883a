use pretty_assertions::assert_eq;
use uuid::Uuid;

use club_manager::models::{AttendanceStatus, YouthCategory};
use club_manager::services::statistics_service::{
    aggregate_absence_alerts, bucket_attendance, rate_percent,
};

use crate::common::Fixtures;

#[test]
fn two_absences_stay_below_a_threshold_of_three() {
    let athlete = Uuid::new_v4();
    let rows = vec![
        Fixtures::absence_row(
            athlete,
            "Mara Weber",
            AttendanceStatus::AbsentUnexcused,
            Fixtures::date(2025, 3, 3),
        ),
        Fixtures::absence_row(
            athlete,
            "Mara Weber",
            AttendanceStatus::AbsentUnexcused,
            Fixtures::date(2025, 3, 10),
        ),
    ];

    assert!(aggregate_absence_alerts(&rows, 3).is_empty());
}

#[test]
fn three_absences_reach_a_threshold_of_three() {
    let athlete = Uuid::new_v4();
    let rows = vec![
        Fixtures::absence_row(
            athlete,
            "Mara Weber",
            AttendanceStatus::AbsentUnexcused,
            Fixtures::date(2025, 3, 3),
        ),
        Fixtures::absence_row(
            athlete,
            "Mara Weber",
            AttendanceStatus::AbsentExcused,
            Fixtures::date(2025, 3, 10),
        ),
        Fixtures::absence_row(
            athlete,
            "Mara Weber",
            AttendanceStatus::AbsentUnexcused,
            Fixtures::date(2025, 3, 17),
        ),
    ];

    let alerts = aggregate_absence_alerts(&rows, 3);

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].absence_count, 3);
    // excused absences count toward the threshold as well
    assert_eq!(alerts[0].excused, 1);
    assert_eq!(alerts[0].unexcused, 2);
    assert_eq!(alerts[0].last_absence_date, Fixtures::date(2025, 3, 17));
}

#[test]
fn alerts_are_sorted_by_count_descending() {
    let frequent = Uuid::new_v4();
    let occasional = Uuid::new_v4();

    let mut rows = Vec::new();
    for day in [3, 10, 17, 24] {
        rows.push(Fixtures::absence_row(
            frequent,
            "Jonas Brandt",
            AttendanceStatus::AbsentUnexcused,
            Fixtures::date(2025, 3, day),
        ));
    }
    for day in [10, 17] {
        rows.push(Fixtures::absence_row(
            occasional,
            "Mara Weber",
            AttendanceStatus::AbsentExcused,
            Fixtures::date(2025, 3, day),
        ));
    }

    let alerts = aggregate_absence_alerts(&rows, 2);

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].athlete_name, "Jonas Brandt");
    assert_eq!(alerts[0].absence_count, 4);
    assert_eq!(alerts[1].athlete_name, "Mara Weber");
    assert_eq!(alerts[1].absence_count, 2);
}

#[test]
fn rate_is_zero_without_records() {
    assert_eq!(rate_percent(0, 0), 0);
}

#[test]
fn rate_rounds_to_nearest_percent() {
    assert_eq!(rate_percent(2, 3), 67);
    assert_eq!(rate_percent(1, 6), 17);
    assert_eq!(rate_percent(5, 8), 63);
}

#[test]
fn attendance_buckets_group_by_category_and_training() {
    let monday = Uuid::new_v4();
    let friday = Uuid::new_v4();

    let rows = vec![
        Fixtures::categorized_row(
            AttendanceStatus::Present,
            YouthCategory::U12,
            monday,
            "Monday Youth",
        ),
        Fixtures::categorized_row(
            AttendanceStatus::AbsentUnexcused,
            YouthCategory::U12,
            monday,
            "Monday Youth",
        ),
        Fixtures::categorized_row(
            AttendanceStatus::Present,
            YouthCategory::U15,
            friday,
            "Friday Strength",
        ),
        Fixtures::categorized_row(
            AttendanceStatus::Present,
            YouthCategory::U15,
            monday,
            "Monday Youth",
        ),
    ];

    let (by_category, by_training) = bucket_attendance(&rows);

    assert_eq!(by_category.len(), 2);
    let u12 = by_category.iter().find(|b| b.label == "u12").unwrap();
    assert_eq!(u12.total, 2);
    assert_eq!(u12.present, 1);
    assert_eq!(u12.attendance_rate, 50);
    let u15 = by_category.iter().find(|b| b.label == "u15").unwrap();
    assert_eq!(u15.attendance_rate, 100);

    assert_eq!(by_training.len(), 2);
    let monday_bucket = by_training.iter().find(|b| b.label == "Monday Youth").unwrap();
    assert_eq!(monday_bucket.total, 3);
    assert_eq!(monday_bucket.present, 2);
    assert_eq!(monday_bucket.attendance_rate, 67);
}

#[test]
fn empty_scan_produces_empty_buckets() {
    let (by_category, by_training) = bucket_attendance(&[]);

    assert!(by_category.is_empty());
    assert!(by_training.is_empty());
}
