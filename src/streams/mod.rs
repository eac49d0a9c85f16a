//! Streams module
//!
//! Each stream walks the workspace → space → folder → list hierarchy
//! through a shared [`ClickUp`] client and turns what it finds into
//! messages. Traversal is sequential: one container is fully read before the
//! next one is visited.
//!
//! `tasks` is incremental. Its cursor is kept per list under
//! `streams.tasks.partitions[<list id>]` and checkpointed once the list has
//! been read to the end.

use crate::clickup::ClickUp;
use crate::config::ClickUpConfig;
use crate::connector::{Message, MessageStream};
use crate::error::{Error, Result};
use crate::models::{Folder, Goal, List, Space, Workspace};
use crate::state::StateManager;
use crate::types::RecordStream;
use async_stream::try_stream;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// Stream Names
// ============================================================================

/// Streams produced by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamName {
    Workspaces,
    Spaces,
    Folders,
    Lists,
    Tasks,
    Goals,
}

impl StreamName {
    /// Every stream, in catalog order
    pub const ALL: [StreamName; 6] = [
        Self::Workspaces,
        Self::Spaces,
        Self::Folders,
        Self::Lists,
        Self::Tasks,
        Self::Goals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspaces => "workspaces",
            Self::Spaces => "spaces",
            Self::Folders => "folders",
            Self::Lists => "lists",
            Self::Tasks => "tasks",
            Self::Goals => "goals",
        }
    }

    /// Parse a comma-separated selection; empty means every stream
    pub fn parse_list(selection: &str) -> Result<Vec<StreamName>> {
        let names = selection
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>>>()?;

        if names.is_empty() {
            Ok(Self::ALL.to_vec())
        } else {
            Ok(names)
        }
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownStream { name: s.to_string() })
    }
}

// ============================================================================
// Stream Reader
// ============================================================================

/// Produces the records of each stream from a shared client
#[derive(Debug, Clone)]
pub struct StreamReader {
    client: Arc<ClickUp>,
    config: Arc<ClickUpConfig>,
    state: StateManager,
}

impl StreamReader {
    pub fn new(client: Arc<ClickUp>, config: Arc<ClickUpConfig>, state: StateManager) -> Self {
        Self {
            client,
            config,
            state,
        }
    }

    /// Messages of one stream
    pub fn read(&self, stream: StreamName) -> MessageStream {
        let start = stream::once(async move { Ok(Message::info(format!("Reading stream {stream}"))) });

        let body = match stream {
            StreamName::Workspaces => records(stream, self.workspaces()),
            StreamName::Spaces => records(stream, self.spaces()),
            StreamName::Folders => records(stream, self.folders()),
            StreamName::Lists => records(stream, self.lists()),
            StreamName::Tasks => self.tasks(),
            StreamName::Goals => records(stream, self.goals()),
        };

        start.chain(body).boxed()
    }

    /// Workspaces that pass the configured filter
    pub fn workspaces(&self) -> RecordStream<'static, Workspace> {
        let reader = self.clone();
        Box::pin(try_stream! {
            let workspaces = reader.client.workspaces().await?;
            for workspace in workspaces.iter() {
                if reader.config.includes_workspace(&workspace.id) {
                    yield workspace.clone();
                } else {
                    debug!("Skipping workspace {} (not selected)", workspace.id);
                }
            }
        })
    }

    pub fn spaces(&self) -> RecordStream<'static, Space> {
        let reader = self.clone();
        Box::pin(try_stream! {
            let mut workspaces = reader.workspaces();
            while let Some(workspace) = workspaces.next().await {
                let workspace = workspace?;
                let spaces = reader
                    .client
                    .spaces(&workspace.id, reader.config.fetch_archived)
                    .await?;
                for space in spaces.iter() {
                    yield space.clone();
                }
            }
        })
    }

    pub fn folders(&self) -> RecordStream<'static, Folder> {
        let reader = self.clone();
        Box::pin(try_stream! {
            let mut spaces = reader.spaces();
            while let Some(space) = spaces.next().await {
                let space = space?;
                let folders = reader
                    .client
                    .folders(&space.id, reader.config.fetch_archived)
                    .await?;
                for folder in folders.iter() {
                    yield folder.clone();
                }
            }
        })
    }

    /// Lists of every space: its folderless lists, then those of its folders
    pub fn lists(&self) -> RecordStream<'static, List> {
        let reader = self.clone();
        Box::pin(try_stream! {
            let fetch_archived = reader.config.fetch_archived;
            let mut spaces = reader.spaces();
            while let Some(space) = spaces.next().await {
                let space = space?;
                let lists = reader.client.lists_in_space(&space.id, fetch_archived).await?;
                for list in lists.iter() {
                    yield list.clone();
                }

                let folders = reader.client.folders(&space.id, fetch_archived).await?;
                for folder in folders.iter() {
                    let lists = reader.client.lists_in_folder(&folder.id, fetch_archived).await?;
                    for list in lists.iter() {
                        yield list.clone();
                    }
                }
            }
        })
    }

    /// Task records of every list, with a state checkpoint after each list
    pub fn tasks(&self) -> MessageStream {
        let reader = self.clone();
        Box::pin(try_stream! {
            let stream = StreamName::Tasks;
            let mut lists = reader.lists();
            while let Some(list) = lists.next().await {
                let list = list?;
                let cursor = reader.state.partition_cursor(stream.as_str(), &list.id).await;
                debug!("Reading tasks of list {} since {cursor:?}", list.id);

                let mut count = 0_u64;
                let mut latest: Option<i64> = None;
                let mut tasks = reader
                    .client
                    .tasks(&list.id, cursor, reader.config.fetch_archived);
                while let Some(task) = tasks.next().await {
                    let task = task?;
                    latest = latest.max(task.updated_at_millis());
                    count += 1;
                    yield Message::record(stream, serde_json::to_value(&task)?);
                }

                if let Some(latest) = latest {
                    reader
                        .state
                        .advance_partition_cursor(stream.as_str(), &list.id, latest)
                        .await;
                }
                info!("Read {count} tasks from list {}", list.id);
                yield Message::state(reader.state.checkpoint().await?);
            }
        })
    }

    pub fn goals(&self) -> RecordStream<'static, Goal> {
        let reader = self.clone();
        Box::pin(try_stream! {
            let mut workspaces = reader.workspaces();
            while let Some(workspace) = workspaces.next().await {
                let workspace = workspace?;
                let mut goals = reader.client.goals(&workspace.id);
                while let Some(goal) = goals.next().await {
                    yield goal?;
                }
            }
        })
    }
}

/// Wrap each entity in a record message
fn records<T>(stream: StreamName, source: RecordStream<'static, T>) -> MessageStream
where
    T: Serialize + Send + 'static,
{
    source
        .map(move |record| -> Result<Message> {
            Ok(Message::record(stream, serde_json::to_value(record?)?))
        })
        .boxed()
}
