//! ClickUp resource records
//!
//! Every record keeps the fields it does not model in `extra`, so records
//! serialize back to the same JSON object the API returned.

use crate::types::{deserialize_id, deserialize_opt_id, JsonObject};
use serde::{Deserialize, Serialize};

/// Top-level tenant container (a "team" in API terms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A space within a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A folder within a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A list, contained by either a folder or directly by a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// The single container a list belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListParent {
    Folder(String),
    Space(String),
}

impl List {
    /// Resolve the list's container.
    ///
    /// Folderless lists still carry a `folder` reference marked `hidden`;
    /// those belong to the space.
    pub fn parent(&self) -> Option<ListParent> {
        match (&self.folder, &self.space) {
            (Some(folder), _) if !folder.hidden.unwrap_or(false) => {
                Some(ListParent::Folder(folder.id.clone()))
            }
            (_, Some(space)) => Some(ListParent::Space(space.id.clone())),
            _ => None,
        }
    }
}

/// A reference to a parent entity embedded in a child record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A task within a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Epoch milliseconds, sent as a string by the API
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Task {
    /// Last update time in epoch milliseconds
    pub fn updated_at_millis(&self) -> Option<i64> {
        self.date_updated.as_deref()?.parse().ok()
    }
}

/// Goal summary as returned by the workspace goal listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

/// Full goal detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Workspace>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpacesResponse {
    #[serde(default)]
    pub spaces: Vec<Space>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FoldersResponse {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListsResponse {
    #[serde(default)]
    pub lists: Vec<List>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TasksResponse {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoalsResponse {
    #[serde(default)]
    pub goals: Vec<GoalSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoalResponse {
    pub goal: Goal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_task_roundtrips_unknown_fields() {
        let raw = json!({
            "id": "9hx",
            "name": "Fix login",
            "date_updated": "1567780450202",
            "status": {"status": "in progress"},
            "list": {"id": "124", "name": "Backlog"}
        });

        let task: Task = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(task.updated_at_millis(), Some(1_567_780_450_202));
        assert_eq!(task.list.as_ref().map(|l| l.id.as_str()), Some("124"));
        assert_eq!(serde_json::to_value(&task).unwrap(), raw);
    }

    #[test]
    fn test_list_parent_prefers_visible_folder() {
        let in_folder: List = serde_json::from_value(json!({
            "id": "1",
            "folder": {"id": "f1", "name": "Sprint", "hidden": false},
            "space": {"id": "s1"}
        }))
        .unwrap();
        assert_eq!(in_folder.parent(), Some(ListParent::Folder("f1".to_string())));

        let folderless: List = serde_json::from_value(json!({
            "id": "2",
            "folder": {"id": "f0", "name": "hidden", "hidden": true},
            "space": {"id": "s1"}
        }))
        .unwrap();
        assert_eq!(folderless.parent(), Some(ListParent::Space("s1".to_string())));

        let orphan: List = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(orphan.id, "3");
        assert!(orphan.parent().is_none());
    }

    #[test]
    fn test_envelopes_default_to_empty() {
        let teams: TeamsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(teams.teams.is_empty());

        let tasks: TasksResponse = serde_json::from_value(json!({"tasks": []})).unwrap();
        assert!(tasks.tasks.is_empty());
    }
}
