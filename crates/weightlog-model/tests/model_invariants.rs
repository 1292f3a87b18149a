use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use weightlog_model::{
    Email, ExportRow, Goal, GoalDirection, Measurement, TimeRange, UserId, WeightKg, WEIGHT_MAX_KG,
};

proptest! {
    #[test]
    fn email_normalization_is_idempotent(local in "[A-Za-z0-9._+]{1,20}", domain in "[a-z]{1,10}", tld in "[a-z]{2,4}") {
        let raw = format!(" {local}@{domain}.{tld} ");
        let once = Email::parse(&raw).expect("generated email is valid");
        let twice = Email::parse(once.as_str()).expect("normalized email stays valid");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn any_weight_in_range_is_accepted(w in 0.001_f64..WEIGHT_MAX_KG) {
        prop_assert_eq!(WeightKg::parse(w).expect("in range").get(), w);
    }

    #[test]
    fn goal_progress_percent_is_bounded(start in 40.0_f64..200.0, goal in 40.0_f64..200.0, latest in 40.0_f64..200.0) {
        let g = Goal::new(
            UserId::new_random(),
            WeightKg::parse(goal).expect("goal"),
            WeightKg::parse(start).expect("start"),
            Utc::now(),
        );
        let p = g.progress(Some(WeightKg::parse(latest).expect("latest"))).expect("progress");
        prop_assert!((0.0..=100.0).contains(&p.percent_complete));
        prop_assert!(p.remaining_kg >= 0.0);
    }
}

#[test]
fn goal_without_measurements_has_no_progress() {
    let g = Goal::new(
        UserId::new_random(),
        WeightKg::parse(75.0).expect("goal"),
        WeightKg::parse(82.0).expect("start"),
        Utc::now(),
    );
    assert_eq!(g.progress(None), None);
}

#[test]
fn export_rows_use_camel_case_wire_names() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("date");
    let m = Measurement::new(UserId::new_random(), WeightKg::parse(70.25).expect("w"), None, at);
    let json = serde_json::to_value(ExportRow::from_measurement(&m)).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({"date": "2024-01-02T03:04:05.000Z", "weightKg": 70.25, "note": ""})
    );
}

#[test]
fn goal_direction_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&GoalDirection::Lose).expect("serialize"),
        "\"lose\""
    );
}

#[test]
fn default_time_range_is_unbounded() {
    assert_eq!(TimeRange::default(), TimeRange::All);
}
