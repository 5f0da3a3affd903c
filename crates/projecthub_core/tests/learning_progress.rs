use projecthub_core::db::open_db_in_memory;
use projecthub_core::{
    LearningPath, ProgressService, ProgressServiceError, SqliteActivityRepository,
    SqliteProgressRepository,
};
use rusqlite::Connection;

fn path() -> LearningPath {
    LearningPath {
        id: "governance-101".to_string(),
        title: "Governance 101".to_string(),
        steps: vec![
            "why-splits".to_string(),
            "sustainability".to_string(),
            "voting".to_string(),
            "review".to_string(),
        ],
    }
}

fn service(
    conn: &Connection,
) -> ProgressService<SqliteProgressRepository<'_>, SqliteActivityRepository<'_>> {
    ProgressService::new(
        SqliteProgressRepository::try_new(conn).unwrap(),
        SqliteActivityRepository::try_new(conn).unwrap(),
    )
}

fn activity_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM activities;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn completing_steps_updates_progress() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let path = path();

    let initial = service.progress("u1", &path).unwrap();
    assert_eq!(initial.completed, 0);
    assert_eq!(initial.percent, 0);
    assert_eq!(initial.next_step.as_deref(), Some("why-splits"));

    service.complete_step("u1", &path, "why-splits").unwrap();
    let progress = service.complete_step("u1", &path, "voting").unwrap();
    assert_eq!(progress.completed, 2);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.percent, 50);
    assert_eq!(progress.next_step.as_deref(), Some("sustainability"));
    assert_eq!(activity_count(&conn), 2);
}

#[test]
fn completing_a_step_twice_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let path = path();

    service.complete_step("u1", &path, "review").unwrap();
    let again = service.complete_step("u1", &path, "review").unwrap();
    assert_eq!(again.completed, 1);
    assert_eq!(activity_count(&conn), 1);
}

#[test]
fn unknown_steps_and_blank_users_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let path = path();

    let err = service.complete_step("u1", &path, "bonus").unwrap_err();
    assert!(matches!(err, ProgressServiceError::UnknownStep { .. }));
    let err = service.complete_step(" ", &path, "review").unwrap_err();
    assert!(matches!(err, ProgressServiceError::MissingUser));
    assert_eq!(activity_count(&conn), 0);
}

#[test]
fn progress_is_tracked_per_user_and_can_be_reset() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let path = path();

    for step in &path.steps {
        service.complete_step("u1", &path, step).unwrap();
    }
    let done = service.progress("u1", &path).unwrap();
    assert_eq!(done.percent, 100);
    assert_eq!(done.next_step, None);
    assert_eq!(service.progress("u2", &path).unwrap().completed, 0);

    let reset = service.reset("u1", &path).unwrap();
    assert_eq!(reset.completed, 0);
    assert_eq!(service.progress("u1", &path).unwrap().completed, 0);
}

#[test]
fn blank_users_cannot_read_or_reset_progress() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let path = path();

    let err = service.progress("  ", &path).unwrap_err();
    assert!(matches!(err, ProgressServiceError::MissingUser));
    let err = service.reset("", &path).unwrap_err();
    assert!(matches!(err, ProgressServiceError::MissingUser));
}
