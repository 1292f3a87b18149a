use chrono::{DateTime, Duration, TimeZone, Utc};
use weightlog_model::{generate_token, Email, Goal, Measurement, MeasurementId, Note, User, UserId, WeightKg};
use weightlog_store::{
    AccountStore, GoalStore, MeasurementStore, SqliteStore, Store, StoreError, SCHEMA_VERSION,
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).single().expect("valid time")
}

fn kg(v: f64) -> WeightKg {
    WeightKg::parse(v).expect("weight")
}

fn seed_user(store: &SqliteStore, email: &str) -> User {
    let user = User::new_unverified(
        Email::parse(email).expect("email"),
        "hash".to_string(),
        generate_token(),
        at(1, 0),
    );
    store.create_user(&user).expect("create user");
    user
}

fn record(store: &SqliteStore, user: UserId, weight: f64, when: DateTime<Utc>) -> Measurement {
    let m = Measurement::new(user, kg(weight), None, when);
    store.insert_measurement(&m).expect("insert");
    m
}

#[test]
fn fresh_database_is_migrated_to_current_version() {
    let store = SqliteStore::open_in_memory().expect("open");
    assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
    store.ping().expect("ping");
}

#[test]
fn reopening_on_disk_database_keeps_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("weightlog.sqlite");
    let user = {
        let store = SqliteStore::open(&path).expect("open");
        seed_user(&store, "a@example.com")
    };
    let store = SqliteStore::open(&path).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
    let loaded = store.user_by_id(user.id).expect("query").expect("present");
    assert_eq!(loaded, user);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db.sqlite");
    {
        let conn = rusqlite::Connection::open(&path).expect("open raw");
        conn.execute_batch("PRAGMA user_version=99;").expect("bump");
    }
    match SqliteStore::open(&path) {
        Err(StoreError::SchemaTooNew { found: 99, supported }) => assert_eq!(supported, SCHEMA_VERSION),
        other => panic!("expected SchemaTooNew, got {:?}", other.err()),
    }
}

#[test]
fn duplicate_email_is_a_conflict() {
    let store = SqliteStore::open_in_memory().expect("open");
    seed_user(&store, "dup@example.com");
    let again = User::new_unverified(
        Email::parse("DUP@example.com").expect("email"),
        "hash".to_string(),
        generate_token(),
        at(2, 0),
    );
    assert!(matches!(store.create_user(&again), Err(StoreError::Conflict("email"))));
}

#[test]
fn verification_flow_clears_token() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "v@example.com");
    let token = user.verification_token.clone().expect("token");
    let found = store.user_by_verification_token(&token).expect("query").expect("found");
    assert_eq!(found.id, user.id);
    store.mark_email_verified(user.id).expect("verify");
    assert!(store.user_by_verification_token(&token).expect("query").is_none());
    let reloaded = store.user_by_id(user.id).expect("query").expect("found");
    assert!(reloaded.is_email_verified);
    assert!(store.user_by_verification_token("").expect("query").is_none());
}

#[test]
fn reset_token_expires_and_is_consumed_by_password_update() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "r@example.com");
    let issued = at(5, 12);
    store
        .set_reset_token(user.id, "reset-1", issued + Duration::hours(24))
        .expect("set token");

    assert!(store.user_by_reset_token("reset-1", issued).expect("q").is_some());
    assert!(store.user_by_reset_token("reset-1", issued + Duration::hours(24)).expect("q").is_none());
    assert!(store.user_by_reset_token("other", issued).expect("q").is_none());

    store.update_password_hash(user.id, "new-hash").expect("update");
    assert!(store.user_by_reset_token("reset-1", issued).expect("q").is_none());
    let reloaded = store.user_by_id(user.id).expect("q").expect("found");
    assert_eq!(reloaded.password_hash, "new-hash");
    assert!(reloaded.reset_password_expires_at.is_none());
}

#[test]
fn update_email_marks_account_unverified() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "old@example.com");
    store.mark_email_verified(user.id).expect("verify");
    seed_user(&store, "taken@example.com");

    let taken = Email::parse("taken@example.com").expect("email");
    assert!(matches!(
        store.update_email(user.id, &taken, "tok"),
        Err(StoreError::Conflict("email"))
    ));

    let fresh = Email::parse("new@example.com").expect("email");
    store.update_email(user.id, &fresh, "tok-2").expect("update");
    let reloaded = store.user_by_email(&fresh).expect("q").expect("found");
    assert_eq!(reloaded.id, user.id);
    assert!(!reloaded.is_email_verified);
    assert_eq!(reloaded.verification_token.as_deref(), Some("tok-2"));
}

#[test]
fn updates_on_missing_user_report_not_found() {
    let store = SqliteStore::open_in_memory().expect("open");
    let ghost = UserId::new_random();
    assert!(matches!(store.mark_email_verified(ghost), Err(StoreError::NotFound("user"))));
    assert!(matches!(
        store.insert_measurement(&Measurement::new(ghost, kg(70.0), None, at(1, 0))),
        Err(StoreError::NotFound("user"))
    ));
    assert!(matches!(
        store.upsert_goal(&Goal::new(ghost, kg(60.0), kg(70.0), at(1, 0))),
        Err(StoreError::NotFound("user"))
    ));
}

#[test]
fn measurements_are_ordered_and_filtered() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "m@example.com").id;
    let other = seed_user(&store, "o@example.com").id;
    let late = record(&store, user, 71.0, at(20, 8));
    let early = record(&store, user, 73.0, at(2, 8));
    let mid = record(&store, user, 72.0, at(10, 8));
    record(&store, other, 99.0, at(11, 8));

    let asc: Vec<_> = store.measurements_ascending(user, None).expect("asc").into_iter().map(|m| m.id).collect();
    assert_eq!(asc, vec![early.id, mid.id, late.id]);

    let desc: Vec<_> = store.measurements_descending(user, None).expect("desc").into_iter().map(|m| m.id).collect();
    assert_eq!(desc, vec![late.id, mid.id, early.id]);

    let since: Vec<_> = store
        .measurements_ascending(user, Some(at(10, 8)))
        .expect("since")
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(since, vec![mid.id, late.id]);

    assert_eq!(store.latest_measurement(user).expect("latest").map(|m| m.id), Some(late.id));
    let samples = store.samples_ascending(user, None).expect("samples");
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].weight_kg, 73.0);
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "t@example.com").id;
    let first = record(&store, user, 70.0, at(3, 3));
    let second = record(&store, user, 71.0, at(3, 3));
    let asc: Vec<_> = store.measurements_ascending(user, None).expect("asc").into_iter().map(|m| m.id).collect();
    assert_eq!(asc, vec![first.id, second.id]);
}

#[test]
fn notes_round_trip_and_delete_is_scoped_to_owner() {
    let store = SqliteStore::open_in_memory().expect("open");
    let owner = seed_user(&store, "own@example.com").id;
    let intruder = seed_user(&store, "int@example.com").id;
    let note = Note::parse(Some("after run")).expect("note");
    let m = Measurement::new(owner, kg(70.5), note, at(4, 7));
    store.insert_measurement(&m).expect("insert");

    let loaded = store.latest_measurement(owner).expect("q").expect("some");
    assert_eq!(loaded, m);

    assert!(!store.delete_measurement(intruder, m.id).expect("delete"));
    assert!(!store.delete_measurement(owner, MeasurementId::new_random()).expect("delete"));
    assert!(store.delete_measurement(owner, m.id).expect("delete"));
    assert!(store.latest_measurement(owner).expect("q").is_none());
}

#[test]
fn goal_upsert_replaces_and_clear_reports_presence() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "g@example.com").id;
    assert!(store.goal_for(user).expect("q").is_none());
    store.upsert_goal(&Goal::new(user, kg(65.0), kg(80.0), at(1, 0))).expect("set");
    let replacement = Goal::new(user, kg(70.0), kg(78.0), at(9, 0));
    store.upsert_goal(&replacement).expect("replace");
    assert_eq!(store.goal_for(user).expect("q"), Some(replacement));
    assert!(store.clear_goal(user).expect("clear"));
    assert!(!store.clear_goal(user).expect("clear again"));
}

#[test]
fn deleting_user_cascades() {
    let store = SqliteStore::open_in_memory().expect("open");
    let user = seed_user(&store, "bye@example.com").id;
    record(&store, user, 70.0, at(1, 1));
    store.upsert_goal(&Goal::new(user, kg(65.0), kg(70.0), at(1, 2))).expect("goal");

    assert!(store.delete_user(user).expect("delete"));
    assert!(store.user_by_id(user).expect("q").is_none());
    assert!(store.measurements_ascending(user, None).expect("q").is_empty());
    assert!(store.goal_for(user).expect("q").is_none());
    assert!(!store.delete_user(user).expect("delete again"));
}
