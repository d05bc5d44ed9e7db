use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

use super::due::{DueDate, format_date};
use super::recurrence::{Frequency, FrequencySubdivision};
use crate::error::{DateError, ValidationError};

static PROJECTION_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d{4}-\d{2}-\d{2}$").unwrap());

/// Stored task status. Missing or unknown values read as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Overdue,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    /// Parse a requested status, defaulting unknown values to `Pending`.
    pub fn parse(s: &str) -> Self {
        Self::from_str_opt(s).unwrap_or_default()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<Option<String>> for TaskStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Minutes a user spent on a task on a given day.
///
/// Older records stored `hours`; those are converted to minutes on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTimeLog", rename_all = "camelCase")]
pub struct TimeLog {
    pub date: String,
    pub minutes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeLog {
    #[serde(default)]
    date: String,
    minutes: Option<f64>,
    hours: Option<f64>,
    user_id: Option<String>,
}

impl From<RawTimeLog> for TimeLog {
    fn from(raw: RawTimeLog) -> Self {
        let minutes = raw
            .minutes
            .or(raw.hours.map(|h| h * 60.0))
            .unwrap_or(0.0);
        Self {
            date: raw.date,
            minutes,
            user_id: raw.user_id,
        }
    }
}

/// When a user moved a task to in-progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTime {
    pub user_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Document id; lives outside the stored body.
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_subdivision: Option<FrequencySubdivision>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub repeat_date: Option<String>,
    #[serde(rename = "assignedUserId", default, with = "assignee_list")]
    pub assignees: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub reference_contact_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub guideline_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub created_from_template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by_email: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub links: Option<String>,
    #[serde(default)]
    pub time_logs: Vec<TimeLog>,
    #[serde(default)]
    pub login_times: Vec<LoginTime>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            due_date: due_date.into(),
            frequency: Frequency::None,
            frequency_subdivision: None,
            repeat_date: None,
            assignees: Vec::new(),
            reference_contact_id: None,
            guideline_id: None,
            parent_task_id: None,
            created_from_template_id: None,
            created_at: None,
            updated_at: None,
            created_by_email: String::new(),
            status: TaskStatus::Pending,
            priority: None,
            is_private: false,
            links: None,
            time_logs: Vec::new(),
            login_times: Vec::new(),
        }
    }

    pub fn due(&self) -> Result<DueDate, DateError> {
        DueDate::parse(&self.due_date)
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|a| a == user_id)
    }

    /// Whether `user_id` has logged any time on this task.
    pub fn has_logged_time(&self, user_id: &str) -> bool {
        self.time_logs
            .iter()
            .any(|log| log.user_id.as_deref() == Some(user_id))
    }

    pub fn logged_on(&self, user_id: &str, day: NaiveDate) -> bool {
        let day = format_date(day);
        self.time_logs
            .iter()
            .any(|log| log.date == day && log.user_id.as_deref() == Some(user_id))
    }

    /// The id this record was stored under, with any projection suffix removed.
    pub fn original_id(&self) -> &str {
        original_id(&self.id)
    }
}

/// Check a task form before saving: title, due date and an assignee are required.
pub fn validate(task: &Task) -> Result<(), ValidationError> {
    if task.title.trim().is_empty() {
        return Err(ValidationError::Missing("title"));
    }
    if task.due_date.trim().is_empty() {
        return Err(ValidationError::Missing("due date"));
    }
    if task.assignees.is_empty() {
        return Err(ValidationError::Missing("assignee"));
    }
    Ok(())
}

/// Umbrella task that groups related tasks on a dashboard card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentTask {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by_email: String,
}

/// Title of the parent task with `id`, or "None".
pub fn parent_title<'a>(parents: &'a [ParentTask], id: &str) -> &'a str {
    parents
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.title.as_str())
        .unwrap_or("None")
}

/// Id of a projected occurrence: the stored id followed by the occurrence date.
pub fn virtual_id(original: &str, day: NaiveDate) -> String {
    format!("{}-{}", original, format_date(day))
}

/// Strip a trailing `-YYYY-MM-DD` projection suffix, leaving other ids untouched.
pub fn original_id(id: &str) -> &str {
    match PROJECTION_SUFFIX_RE.find(id) {
        Some(m) if m.start() > 0 => &id[..m.start()],
        _ => id,
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(Priority::from_str_opt))
}

/// `assignedUserId` is stored as one comma-separated string.
pub(crate) mod assignee_list {
    use super::*;

    pub fn serialize<S>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ids.join(","))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(split).unwrap_or_default())
    }

    pub fn split(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parse_defaults_to_pending() {
        assert_eq!(TaskStatus::parse("in_progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("done"), TaskStatus::Pending);
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn deserialize_sparse_document() {
        let task: Task = serde_json::from_value(json!({
            "title": "Call supplier",
            "dueDate": "2024-03-01T09:00",
            "assignedUserId": "u1, u2,",
            "parentTaskId": "",
            "priority": "urgent",
        }))
        .unwrap();

        assert_eq!(task.assignees, vec!["u1", "u2"]);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.frequency, Frequency::None);
        assert_eq!(task.parent_task_id, None);
        assert_eq!(task.priority, None);
        assert!(!task.is_private);
        assert!(task.time_logs.is_empty());
    }

    #[test]
    fn legacy_hours_become_minutes() {
        let task: Task = serde_json::from_value(json!({
            "title": "Bake",
            "dueDate": "2024-03-01",
            "timeLogs": [
                {"date": "2024-03-01", "hours": 1.5, "userId": "u1"},
                {"date": "2024-03-02", "minutes": 20, "userId": "u1"},
            ],
        }))
        .unwrap();

        assert_eq!(task.time_logs[0].minutes, 90.0);
        assert_eq!(task.time_logs[1].minutes, 20.0);
    }

    #[test]
    fn serialize_joins_assignees_and_omits_id() {
        let mut task = Task::new("Pack orders", "2024-03-01");
        task.id = "t1".into();
        task.assignees = vec!["u1".into(), "u2".into()];
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["assignedUserId"], "u1,u2");
        assert_eq!(value["status"], "pending");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn original_id_strips_only_date_suffix() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let id = virtual_id("abc", day);
        assert_eq!(id, "abc-2024-03-15");
        assert_eq!(original_id(&id), "abc");

        assert_eq!(original_id("a-b"), "a-b");
        assert_eq!(original_id("order-2024"), "order-2024");
        assert_eq!(original_id("abc"), "abc");
    }

    #[test]
    fn validate_requires_title_due_and_assignee() {
        let mut task = Task::new("Bake", "2024-03-01");
        assert_eq!(validate(&task), Err(ValidationError::Missing("assignee")));
        task.assignees = vec!["u1".into()];
        assert!(validate(&task).is_ok());
        task.due_date = " ".into();
        assert_eq!(validate(&task), Err(ValidationError::Missing("due date")));
        task.title.clear();
        assert_eq!(validate(&task), Err(ValidationError::Missing("title")));
    }

    #[test]
    fn priority_reads_loosely_and_labels() {
        let high = Priority::from_str_opt(" HIGH ").unwrap();
        assert_eq!(high.label(), "High");
        assert_eq!(Priority::from_str_opt("urgent"), None);
    }

    #[test]
    fn logged_on_matches_user_and_day() {
        let mut task = Task::new("Bake", "2024-03-01");
        task.time_logs.push(TimeLog {
            date: "2024-03-01".into(),
            minutes: 30.0,
            user_id: Some("u1".into()),
        });
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(task.logged_on("u1", day));
        assert!(!task.logged_on("u2", day));
        assert!(task.has_logged_time("u1"));
        assert!(!task.logged_on("u1", day.succ_opt().unwrap()));
    }
}
