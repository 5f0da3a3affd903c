//! Activity feed use-case service.
//!
//! # Responsibility
//! - Join raw activity rows with user and project lookups.
//!
//! # Invariants
//! - Feed order equals repository order (newest first).
//! - Missing users/projects hydrate to `None`; the row is kept.
//! - Each distinct user/project is looked up at most once per feed call.

use crate::repo::activity_repo::{ActivityKind, ActivityRepository};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Hydrated feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: i64,
    pub kind: ActivityKind,
    pub created_at: i64,
    pub actor_id: String,
    /// `None` when the actor has no cached profile.
    pub actor_name: Option<String>,
    pub project_id: Option<String>,
    /// `None` when the project is unknown or was removed.
    pub project_name: Option<String>,
}

pub struct ActivityService<A, U, P>
where
    A: ActivityRepository,
    U: UserRepository,
    P: ProjectRepository,
{
    activities: A,
    users: U,
    projects: P,
}

impl<A, U, P> ActivityService<A, U, P>
where
    A: ActivityRepository,
    U: UserRepository,
    P: ProjectRepository,
{
    pub fn new(activities: A, users: U, projects: P) -> Self {
        Self {
            activities,
            users,
            projects,
        }
    }

    /// Returns the `limit` newest activities with display data attached.
    pub fn feed(&self, limit: u32) -> RepoResult<Vec<FeedItem>> {
        let raw = self.activities.list_recent(limit)?;
        let mut actor_names: HashMap<String, Option<String>> = HashMap::new();
        let mut project_names: HashMap<String, Option<String>> = HashMap::new();
        let mut items = Vec::with_capacity(raw.len());

        for activity in raw {
            let actor_name = match actor_names.get(&activity.actor_id) {
                Some(cached) => cached.clone(),
                None => {
                    let name = self
                        .users
                        .get_user(&activity.actor_id)?
                        .map(|user| user.display_name);
                    actor_names.insert(activity.actor_id.clone(), name.clone());
                    name
                }
            };

            let project_name = match activity.project_id.as_deref() {
                None => None,
                Some(project_id) => match project_names.get(project_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let name = self.lookup_project_name(project_id)?;
                        project_names.insert(project_id.to_string(), name.clone());
                        name
                    }
                },
            };

            items.push(FeedItem {
                id: activity.id,
                kind: activity.kind,
                created_at: activity.created_at,
                actor_id: activity.actor_id,
                actor_name,
                project_id: activity.project_id,
                project_name,
            });
        }

        Ok(items)
    }

    fn lookup_project_name(&self, project_id: &str) -> RepoResult<Option<String>> {
        let Ok(id) = Uuid::parse_str(project_id) else {
            return Ok(None);
        };
        Ok(self.projects.get_project(id)?.map(|project| project.name))
    }
}
