//! ClickUp API client
//!
//! One `ClickUp` is built per run from a validated [`ClickUpConfig`] and
//! shared (usually behind an `Arc`) by every stream. Hierarchy lookups are
//! memoized for the lifetime of the client; tasks and goals are produced as
//! lazy streams.
//!
//! ```rust,ignore
//! use clickup_source::{ClickUp, ClickUpConfig};
//! use futures::TryStreamExt;
//!
//! let client = ClickUp::new(&ClickUpConfig::new("pk_..."))?;
//! client.check_connection().await?;
//!
//! for workspace in client.workspaces().await?.iter() {
//!     for space in client.spaces(&workspace.id, false).await?.iter() {
//!         for list in client.lists_in_space(&space.id, false).await?.iter() {
//!             let tasks: Vec<_> = client.tasks(&list.id, None, false).try_collect().await?;
//!         }
//!     }
//! }
//! ```

use crate::cache::{LookupCache, LookupKey};
use crate::config::ClickUpConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, RequestConfig};
use crate::models::{
    Folder, FoldersResponse, Goal, GoalResponse, GoalSummary, GoalsResponse, List, ListsResponse,
    Space, SpacesResponse, Task, TasksResponse, TeamsResponse, Workspace,
};
use crate::pagination::{paginate, Partition};
use crate::types::RecordStream;
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Progress of a goal enumeration
enum GoalsPhase {
    Listing,
    Details(VecDeque<GoalSummary>),
}

/// Stateful ClickUp API client
pub struct ClickUp {
    http: HttpClient,
    default_start_date: DateTime<Utc>,
    workspaces: OnceCell<Arc<Vec<Workspace>>>,
    spaces: LookupCache<LookupKey, Vec<Space>>,
    folders: LookupCache<LookupKey, Vec<Folder>>,
    lists_in_folder: LookupCache<LookupKey, Vec<List>>,
    lists_in_space: LookupCache<LookupKey, Vec<List>>,
}

impl ClickUp {
    /// Validate the config and build a client. No request is sent.
    pub fn new(config: &ClickUpConfig) -> Result<Self> {
        config.validate()?;

        let default_start_date = TimeDelta::try_days(config.cutoff_days)
            .and_then(|cutoff| Utc::now().checked_sub_signed(cutoff))
            .ok_or_else(|| Error::invalid_value("cutoff_days", "is out of range"))?;
        let http = HttpClient::with_config(config.http_config())?;

        info!(
            "ClickUp client ready (max retries: {}, tasks updated since {default_start_date})",
            config.max_retries
        );

        Ok(Self {
            http,
            default_start_date,
            workspaces: OnceCell::new(),
            spaces: LookupCache::new("spaces"),
            folders: LookupCache::new("folders"),
            lists_in_folder: LookupCache::new("lists_in_folder"),
            lists_in_space: LookupCache::new("lists_in_space"),
        })
    }

    /// Cursor used when a task enumeration gets no explicit one
    pub fn default_start_date(&self) -> DateTime<Utc> {
        self.default_start_date
    }

    /// Succeeds iff at least one workspace is visible to the token
    pub async fn check_connection(&self) -> Result<()> {
        let workspaces = self.workspaces().await?;
        if workspaces.is_empty() {
            return Err(Error::connection_check("No workspaces were found"));
        }
        Ok(())
    }

    /// All workspaces visible to the token
    pub async fn workspaces(&self) -> Result<Arc<Vec<Workspace>>> {
        let workspaces = self
            .workspaces
            .get_or_try_init(|| async {
                let response: Option<TeamsResponse> = self
                    .http
                    .get_json("/team", RequestConfig::new())
                    .await
                    .context("Failed to fetch workspaces")?;
                Ok::<_, Error>(Arc::new(response.map(|r| r.teams).unwrap_or_default()))
            })
            .await?;
        Ok(Arc::clone(workspaces))
    }

    /// Spaces of a workspace
    pub async fn spaces(&self, workspace_id: &str, fetch_archived: bool) -> Result<Arc<Vec<Space>>> {
        self.spaces
            .get_or_try_fetch(LookupKey::new(workspace_id, fetch_archived), || {
                self.fetch_data(
                    format!("/team/{workspace_id}/space"),
                    fetch_archived,
                    format!("Failed to fetch spaces for workspace id {workspace_id}"),
                    |r: SpacesResponse| r.spaces,
                )
            })
            .await
    }

    /// Folders of a space
    pub async fn folders(&self, space_id: &str, fetch_archived: bool) -> Result<Arc<Vec<Folder>>> {
        self.folders
            .get_or_try_fetch(LookupKey::new(space_id, fetch_archived), || {
                self.fetch_data(
                    format!("/space/{space_id}/folder"),
                    fetch_archived,
                    format!("Failed to fetch folders for space id {space_id}"),
                    |r: FoldersResponse| r.folders,
                )
            })
            .await
    }

    /// Lists contained by a folder
    pub async fn lists_in_folder(
        &self,
        folder_id: &str,
        fetch_archived: bool,
    ) -> Result<Arc<Vec<List>>> {
        self.lists_in_folder
            .get_or_try_fetch(LookupKey::new(folder_id, fetch_archived), || {
                self.fetch_data(
                    format!("/folder/{folder_id}/list"),
                    fetch_archived,
                    format!("Failed to fetch lists for folder id {folder_id}"),
                    |r: ListsResponse| r.lists,
                )
            })
            .await
    }

    /// Folderless lists contained directly by a space
    pub async fn lists_in_space(
        &self,
        space_id: &str,
        fetch_archived: bool,
    ) -> Result<Arc<Vec<List>>> {
        self.lists_in_space
            .get_or_try_fetch(LookupKey::new(space_id, fetch_archived), || {
                self.fetch_data(
                    format!("/space/{space_id}/list"),
                    fetch_archived,
                    format!("Failed to fetch lists for space id {space_id}"),
                    |r: ListsResponse| r.lists,
                )
            })
            .await
    }

    /// Tasks of a list updated after `last_updated` (epoch ms).
    ///
    /// Without a cursor, [`Self::default_start_date`] is used. The active
    /// partition is paged to exhaustion first, then the archived one when
    /// requested.
    pub fn tasks(
        &self,
        list_id: &str,
        last_updated: Option<i64>,
        fetch_archived: bool,
    ) -> RecordStream<'_, Task> {
        let cursor = last_updated.unwrap_or_else(|| self.default_start_date.timestamp_millis());
        let list_id = list_id.to_string();
        let path = format!("/list/{list_id}/task");

        paginate(Partition::for_request(fetch_archived), move |partition, page| {
            let request = RequestConfig::new()
                .query("archived", partition.is_archived())
                .query("page", page)
                .query("date_updated_gt", cursor)
                .query("include_closed", true)
                .query("order_by", "updated")
                .query("subtasks", true);
            let path = path.clone();
            async move {
                let response: Option<TasksResponse> = self.http.get_json(&path, request).await?;
                Ok(response.map(|r| r.tasks).unwrap_or_default())
            }
        })
        .map_err(move |e| Error::api(format!("Failed to fetch tasks for list id {list_id}"), e))
        .boxed()
    }

    /// Goals of a workspace: one listing call, then one detail call per goal
    pub fn goals(&self, workspace_id: &str) -> RecordStream<'_, Goal> {
        let workspace_id = workspace_id.to_string();
        let listing_path = format!("/team/{workspace_id}/goal");

        stream::try_unfold(GoalsPhase::Listing, move |phase| {
            let listing_path = listing_path.clone();
            async move {
                let mut pending = match phase {
                    GoalsPhase::Listing => {
                        let request = RequestConfig::new().query("include_completed", true);
                        let response: Option<GoalsResponse> =
                            self.http.get_json(&listing_path, request).await?;
                        VecDeque::from(response.map(|r| r.goals).unwrap_or_default())
                    }
                    GoalsPhase::Details(pending) => pending,
                };

                while let Some(summary) = pending.pop_front() {
                    let path = format!("/goal/{}", summary.id);
                    let response: Option<GoalResponse> =
                        self.http.get_json(&path, RequestConfig::new()).await?;
                    match response {
                        Some(detail) => {
                            return Ok(Some((detail.goal, GoalsPhase::Details(pending))));
                        }
                        None => debug!("Goal {} was not found, skipping", summary.id),
                    }
                }
                Ok::<_, Error>(None)
            }
        })
        .map_err(move |e| {
            Error::api(format!("Failed to fetch goals for workspace id {workspace_id}"), e)
        })
        .boxed()
    }

    /// Fetch the active partition, plus the archived one when requested,
    /// and concatenate them. Absent partitions contribute nothing.
    async fn fetch_data<R, T>(
        &self,
        path: String,
        fetch_archived: bool,
        error_message: String,
        extract: fn(R) -> Vec<T>,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned,
    {
        let mut results = Vec::new();
        for partition in Partition::for_request(fetch_archived) {
            let request = RequestConfig::new().query("archived", partition.is_archived());
            let response: Option<R> = self
                .http
                .get_json(&path, request)
                .await
                .context(error_message.clone())?;
            results.extend(response.map(extract).unwrap_or_default());
        }
        Ok(results)
    }
}

impl std::fmt::Debug for ClickUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickUp")
            .field("default_start_date", &self.default_start_date)
            .finish_non_exhaustive()
    }
}
