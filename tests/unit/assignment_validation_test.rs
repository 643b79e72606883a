use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use club_manager::models::{AssignmentValidation, ConflictKind};
use club_manager::services::assignment_service::{
    evaluate_assignment, intervals_overlap, pairwise_conflicts,
};

use crate::common::Fixtures;

#[test]
fn second_group_of_same_training_is_rejected() {
    let existing = Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
    let mut target = Fixtures::group_schedule("Advanced", "Monday Youth", 0, (17, 0), (18, 30));
    target.training_id = existing.training_id;

    let mut validation = AssignmentValidation::valid();
    evaluate_assignment(&target, &[existing], &mut validation);

    assert!(!validation.is_valid);
    assert_eq!(validation.errors.len(), 1);
    assert_matches!(validation.errors.first(), Some(message) if message.contains("Monday Youth"));
}

#[test]
fn overlapping_distinct_trainings_allow_with_warning() {
    // Monday 17:00-18:30 existing; 18:00-19:00 candidate in a different training
    let existing = Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
    let target = Fixtures::group_schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

    let mut validation = AssignmentValidation::valid();
    evaluate_assignment(&target, &[existing], &mut validation);

    assert!(validation.is_valid);
    assert!(validation.errors.is_empty());
    assert_eq!(validation.warnings.len(), 1);
    assert!(validation.warnings[0].contains("Monday Track") || validation.warnings[0].contains("Beginners"));
}

#[test]
fn touching_intervals_do_not_warn() {
    let existing = Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 0));
    let target = Fixtures::group_schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

    let mut validation = AssignmentValidation::valid();
    evaluate_assignment(&target, &[existing], &mut validation);

    assert_eq!(validation, AssignmentValidation::valid());
}

#[test]
fn different_weekdays_never_warn() {
    let existing = Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
    let target = Fixtures::group_schedule("Sprint", "Tuesday Track", 1, (17, 0), (18, 30));

    let mut validation = AssignmentValidation::valid();
    evaluate_assignment(&target, &[existing], &mut validation);

    assert_eq!(validation, AssignmentValidation::valid());
}

#[test]
fn evaluation_is_deterministic() {
    let existing = vec![
        Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30)),
        Fixtures::group_schedule("Kraft", "Friday Strength", 4, (18, 0), (19, 30)),
    ];
    let target = Fixtures::group_schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

    let mut first = AssignmentValidation::valid();
    evaluate_assignment(&target, &existing, &mut first);
    let mut second = AssignmentValidation::valid();
    evaluate_assignment(&target, &existing, &mut second);

    assert_eq!(first, second);
}

#[test]
fn overlap_test_matrix() {
    let t = Fixtures::time;

    // identical intervals
    assert!(intervals_overlap(t(17, 0), t(18, 0), t(17, 0), t(18, 0)));
    // partial overlap both directions
    assert!(intervals_overlap(t(17, 0), t(18, 30), t(18, 0), t(19, 0)));
    assert!(intervals_overlap(t(18, 0), t(19, 0), t(17, 0), t(18, 30)));
    // disjoint
    assert!(!intervals_overlap(t(8, 0), t(9, 0), t(17, 0), t(18, 0)));
    // touching at either end
    assert!(!intervals_overlap(t(16, 0), t(17, 0), t(17, 0), t(18, 0)));
    assert!(!intervals_overlap(t(17, 0), t(18, 0), t(16, 0), t(17, 0)));
}

#[test]
fn conflict_audit_reports_each_colliding_pair_once() {
    let a = Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
    let mut b = Fixtures::group_schedule("Advanced", "Monday Youth", 0, (17, 0), (18, 30));
    b.training_id = a.training_id;
    let c = Fixtures::group_schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

    let conflicts = pairwise_conflicts(&[a, b, c]);

    assert_eq!(conflicts.len(), 3);
    assert_eq!(
        conflicts
            .iter()
            .filter(|conflict| conflict.kind == ConflictKind::SameTraining)
            .count(),
        1
    );
    assert_eq!(
        conflicts
            .iter()
            .filter(|conflict| conflict.kind == ConflictKind::TimeOverlap)
            .count(),
        2
    );
}

#[test]
fn no_conflicts_for_a_clean_schedule() {
    let assignments = vec![
        Fixtures::group_schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 0)),
        Fixtures::group_schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0)),
        Fixtures::group_schedule("Kraft", "Friday Strength", 4, (18, 0), (19, 30)),
    ];

    assert!(pairwise_conflicts(&assignments).is_empty());
}
