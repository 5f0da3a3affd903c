//! CLI entry point for ProjectHub core.
//!
//! # Responsibility
//! - Validate JSON project drafts and print the validation report.
//! - Run create/edit flows and the activity feed against a SQLite file.
//!
//! # Environment
//! - `PROJECTHUB_LOG_DIR`: absolute directory; enables file logging when set.
//! - `PROJECTHUB_LOG_LEVEL`: `trace|debug|info|warn|error`, defaults per build.

use log::{error, info};
use projecthub_core::db::open_db;
use projecthub_core::{
    default_log_level, init_logging, validate_for_create, validate_for_edit, ActivityService,
    ProjectDraft, ProjectService, ProjectServiceError, SqliteActivityRepository,
    SqliteProjectRepository, SqliteTagRepository, SqliteUserRepository, ValidationReport,
};
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage:
  projecthub_cli ping | version
  projecthub_cli validate-create <draft.json>
  projecthub_cli validate-edit <draft.json>
  projecthub_cli create <db-path> <owner-id> <draft.json>
  projecthub_cli edit <db-path> <actor-id> <draft.json>
  projecthub_cli feed <db-path> [limit]";

const EXIT_INVALID: u8 = 2;
const FEED_DEFAULT_LIMIT: u32 = 20;

type CliResult = Result<ExitCode, Box<dyn Error>>;

fn main() -> ExitCode {
    if let Err(err) = configure_logging() {
        eprintln!("logging disabled: {err}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match argv.as_slice() {
        ["ping"] => print_line(projecthub_core::ping()),
        ["version"] => print_line(projecthub_core::core_version()),
        ["validate-create", draft] => validate(draft, false),
        ["validate-edit", draft] => validate(draft, true),
        ["create", db, owner, draft] => create(db, owner, draft),
        ["edit", db, actor, draft] => edit(db, actor, draft),
        ["feed", db] => feed(db, FEED_DEFAULT_LIMIT),
        ["feed", db, limit] => match limit.parse() {
            Ok(limit) => feed(db, limit),
            Err(_) => Err(format!("invalid limit `{limit}`").into()),
        },
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let command = argv.first().copied().unwrap_or("");
    match result {
        Ok(code) => {
            info!("event=cli_command module=cli status=ok command={command} exit={code:?}");
            code
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn configure_logging() -> Result<(), Box<dyn Error>> {
    let Ok(log_dir) = std::env::var("PROJECTHUB_LOG_DIR") else {
        return Ok(());
    };
    let level = std::env::var("PROJECTHUB_LOG_LEVEL")
        .unwrap_or_else(|_| default_log_level().to_string());
    init_logging(&level, &log_dir)?;
    Ok(())
}

fn print_line(value: &str) -> CliResult {
    println!("{value}");
    Ok(ExitCode::SUCCESS)
}

fn read_draft(path: &str) -> Result<ProjectDraft, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read draft `{path}`: {err}"))?;
    let draft = serde_json::from_str(&raw)
        .map_err(|err| format!("draft `{path}` is not a project object: {err}"))?;
    Ok(draft)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validate(path: &str, edit: bool) -> CliResult {
    let draft = read_draft(path)?;
    let result = if edit {
        validate_for_edit(&draft)
    } else {
        validate_for_create(&draft)
    };
    let report = ValidationReport::from_result(result);
    print_json(&report)?;
    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

fn project_service(
    conn: &Connection,
) -> Result<
    ProjectService<
        SqliteProjectRepository<'_>,
        SqliteTagRepository<'_>,
        SqliteActivityRepository<'_>,
    >,
    Box<dyn Error>,
> {
    Ok(ProjectService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteTagRepository::try_new(conn)?,
        SqliteActivityRepository::try_new(conn)?,
    ))
}

fn create(db: &str, owner: &str, path: &str) -> CliResult {
    let draft = read_draft(path)?;
    let conn = open_db(db)?;
    let outcome = project_service(&conn)?.create_project(owner, &draft);
    finish_write(outcome)
}

fn edit(db: &str, actor: &str, path: &str) -> CliResult {
    let draft = read_draft(path)?;
    let conn = open_db(db)?;
    let outcome = project_service(&conn)?.edit_project(actor, &draft);
    finish_write(outcome)
}

fn finish_write(
    outcome: Result<projecthub_core::ProjectRecord, ProjectServiceError>,
) -> CliResult {
    match outcome {
        Ok(record) => {
            print_json(&record)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(ProjectServiceError::Invalid(errors)) => {
            print_json(&ValidationReport::from_result(Err(errors)))?;
            Ok(ExitCode::from(EXIT_INVALID))
        }
        Err(other) => Err(other.into()),
    }
}

fn feed(db: &str, limit: u32) -> CliResult {
    let conn = open_db(db)?;
    let service = ActivityService::new(
        SqliteActivityRepository::try_new(&conn)?,
        SqliteUserRepository::try_new(&conn)?,
        SqliteProjectRepository::try_new(&conn)?,
    );
    print_json(&service.feed(limit)?)?;
    Ok(ExitCode::SUCCESS)
}
