use projecthub_core::db::open_db_in_memory;
use projecthub_core::{
    GovernanceSplit, MemberInput, MemberRole, ProjectDraft, ProjectRepository, ProjectService,
    ProjectServiceError, SqliteActivityRepository, SqliteProjectRepository, SqliteTagRepository,
    TagInput, TagRepository, TagRole, ValidationErrorKind,
};
use rusqlite::{params, Connection};

type SqliteProjectService<'conn> = ProjectService<
    SqliteProjectRepository<'conn>,
    SqliteTagRepository<'conn>,
    SqliteActivityRepository<'conn>,
>;

fn service(conn: &Connection) -> SqliteProjectService<'_> {
    ProjectService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteTagRepository::try_new(conn).unwrap(),
        SqliteActivityRepository::try_new(conn).unwrap(),
    )
}

fn draft() -> ProjectDraft {
    ProjectDraft {
        name: " Community Garden ".to_string(),
        tagline: "Grow together".to_string(),
        description: "Shared plots for the neighbourhood.".to_string(),
        contribution_needs: "Gardeners, carpenters".to_string(),
        photo_url: Some("https://example.com/garden.jpg".to_string()),
        tags: vec![
            TagInput::new("Urban Farming", "Urban farming", "category"),
            TagInput::new("food", "Food", "relational"),
        ],
        team: vec![
            MemberInput::new("u-lead", "lead"),
            MemberInput::new("u-help", "contributor"),
        ],
        ..ProjectDraft::default()
    }
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn create_persists_normalized_project_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_project("u-lead", &draft()).unwrap();
    assert_eq!(created.owner_id, "u-lead");
    assert_eq!(created.name, "Community Garden");
    assert_eq!(created.governance, None);
    assert_eq!(created.tags.len(), 2);
    assert_eq!(created.tags[0].id, "urban-farming");
    assert_eq!(created.tags[0].role, TagRole::Category);
    assert_eq!(created.tags[1].id, "food");
    assert_eq!(created.team[0].role, MemberRole::Lead);
    assert_eq!(created.team[1].user_id, "u-help");

    let tags = SqliteTagRepository::try_new(&conn).unwrap();
    let urban = tags.get_tag("urban-farming").unwrap().unwrap();
    assert!(!urban.is_category);
    assert_eq!(urban.usage_count, 1);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM activities WHERE kind = 'project_created';"),
        1
    );
}

#[test]
fn invalid_draft_never_touches_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut invalid = draft();
    invalid.name = String::new();
    invalid.tags.push(TagInput::new("brand-new", "Brand new", "custom"));

    let err = service.create_project("u-lead", &invalid).unwrap_err();
    match err {
        ProjectServiceError::Invalid(errors) => {
            assert!(errors.has(ValidationErrorKind::RequiredFieldEmpty, "name"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM projects;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM tags;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM activities;"), 0);
}

#[test]
fn create_rejects_blank_owner() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn).create_project("  ", &draft()).unwrap_err();
    assert!(matches!(err, ProjectServiceError::MissingActor));
}

#[test]
fn tags_colliding_after_normalization_keep_first_occurrence() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut input = draft();
    input.tags = vec![
        TagInput::new("Open Source", "Open source", "category"),
        TagInput::new("open-source", "OSS", "custom"),
    ];

    let created = service.create_project("u-lead", &input).unwrap();
    assert_eq!(created.tags.len(), 1);
    assert_eq!(created.tags[0].display, "Open source");
    assert_eq!(created.tags[0].role, TagRole::Category);
}

#[test]
fn edit_updates_fields_tags_team_and_governance() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service.create_project("u-lead", &draft()).unwrap();

    let mut edit = draft();
    edit.id = Some(created.id.to_string());
    edit.name = "Garden Collective".to_string();
    edit.tags = vec![TagInput::new("food", "Food", "category")];
    edit.team = vec![MemberInput::new("u-new", "participant")];
    edit.governance = Some(GovernanceSplit::new(40, 30, 30));

    let updated = service.edit_project("u-lead", &edit).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Garden Collective");
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].role, TagRole::Category);
    assert_eq!(updated.team.len(), 1);
    assert_eq!(updated.team[0].role, MemberRole::Participant);
    assert_eq!(updated.governance, Some(GovernanceSplit::new(40, 30, 30)));

    let tags = SqliteTagRepository::try_new(&conn).unwrap();
    assert_eq!(tags.get_tag("urban-farming").unwrap().unwrap().usage_count, 0);
    assert_eq!(tags.get_tag("food").unwrap().unwrap().usage_count, 1);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM activities WHERE kind = 'project_updated';"),
        1
    );
}

#[test]
fn edit_without_governance_keeps_stored_split() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service.create_project("u-lead", &draft()).unwrap();

    let mut with_split = draft();
    with_split.id = Some(created.id.to_string());
    with_split.governance = Some(GovernanceSplit::new(60, 20, 20));
    service.edit_project("u-lead", &with_split).unwrap();

    let mut without_split = draft();
    without_split.id = Some(created.id.to_string());
    let updated = service.edit_project("u-lead", &without_split).unwrap();
    assert_eq!(updated.governance, Some(GovernanceSplit::new(60, 20, 20)));
}

#[test]
fn edit_with_invalid_governance_is_rejected_before_persistence() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service.create_project("u-lead", &draft()).unwrap();

    let mut edit = draft();
    edit.id = Some(created.id.to_string());
    edit.name = "Changed".to_string();
    edit.governance = Some(GovernanceSplit::new(50, 30, 10));

    let err = service.edit_project("u-lead", &edit).unwrap_err();
    match err {
        ProjectServiceError::Invalid(errors) => {
            assert!(errors.has(ValidationErrorKind::GovernanceSumInvalid, "governance"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = service.get_project(created.id).unwrap().unwrap();
    assert_eq!(stored.name, "Community Garden");
    assert_eq!(stored.governance, None);
}

#[test]
fn edit_reports_malformed_and_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut malformed = draft();
    malformed.id = Some("p1".to_string());
    let err = service.edit_project("u-lead", &malformed).unwrap_err();
    assert!(matches!(err, ProjectServiceError::InvalidProjectId(ref id) if id == "p1"));

    let mut unknown = draft();
    unknown.id = Some("11111111-2222-4333-8444-555555555555".to_string());
    unknown.tags = vec![TagInput::new("never-created", "Never", "custom")];
    let err = service.edit_project("u-lead", &unknown).unwrap_err();
    assert!(matches!(err, ProjectServiceError::ProjectNotFound(_)));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM tags;"), 0);
}

#[test]
fn list_projects_filters_by_normalized_tag_and_orders_by_update() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service.create_project("u-lead", &draft()).unwrap();
    let mut other = draft();
    other.name = "Bike Repair".to_string();
    other.tags = vec![TagInput::new("bikes", "Bikes", "category")];
    let second = service.create_project("u-lead", &other).unwrap();

    conn.execute(
        "UPDATE projects SET updated_at = 1000 WHERE id = ?1;",
        params![first.id.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE projects SET updated_at = 2000 WHERE id = ?1;",
        params![second.id.to_string()],
    )
    .unwrap();

    let all = service.list_projects(None, None, 0).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    let filtered = service.list_projects(Some("Urban Farming"), None, 0).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, first.id);

    let paged = service.list_projects(None, Some(1), 1).unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, first.id);
}

#[test]
fn repository_rejects_links_to_unknown_tags() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let project = projecthub_core::validate_for_create(&draft()).unwrap();

    assert!(repo.create_project("u-lead", &project).is_err());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM projects;"), 0);
}

#[test]
fn failed_activity_write_still_returns_stored_project() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    conn.execute_batch("DROP TABLE activities;").unwrap();

    let created = service.create_project("u-lead", &draft()).unwrap();
    let stored = service.get_project(created.id).unwrap().unwrap();
    assert_eq!(created, stored);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM projects;"), 1);

    let mut edit = draft();
    edit.id = Some(created.id.to_string());
    edit.name = "Renamed".to_string();
    let updated = service.edit_project("u-lead", &edit).unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(service.get_project(created.id).unwrap().unwrap(), updated);
}

#[test]
fn failed_project_insert_keeps_upserted_tags_unused() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    conn.execute_batch(
        "CREATE TRIGGER reject_projects BEFORE INSERT ON projects
         BEGIN
             SELECT RAISE(ABORT, 'projects are read-only');
         END;",
    )
    .unwrap();

    let err = service.create_project("u-lead", &draft()).unwrap_err();
    assert!(matches!(err, ProjectServiceError::Repo(_)));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM projects;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_tags;"), 0);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM tags WHERE usage_count = 0;"),
        2
    );
}
