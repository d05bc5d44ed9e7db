use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::due::{format_date, parse_date};
use super::task::{Task, TaskStatus, assignee_list};
use super::workflow::timestamp;
use crate::error::{DateError, ValidationError};

/// One task inside a project template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "assignedUserId", default, with = "assignee_list")]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

/// A reusable set of tasks for a recurring project (a wedding order, a festival menu).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub template_due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_template_name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TemplateTask>,
    /// Due date the template was last activated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_for: Option<String>,
}

pub fn validate(template: &ProjectTemplate) -> Result<(), ValidationError> {
    if template.name.trim().is_empty() {
        return Err(ValidationError::Missing("name"));
    }
    if template.tasks.iter().any(|t| t.title.trim().is_empty()) {
        return Err(ValidationError::Missing("task title"));
    }
    Ok(())
}

impl ProjectTemplate {
    fn instantiate(&self, title_prefix: Option<&str>, due_date: String, now: DateTime<Utc>) -> Vec<Task> {
        let stamp = timestamp(now);
        self.tasks
            .iter()
            .map(|tt| {
                let title = match title_prefix {
                    Some(prefix) => format!("{}: {}", prefix, tt.title),
                    None => tt.title.clone(),
                };
                let mut task = Task::new(title, due_date.clone());
                task.description = tt.description.clone();
                task.assignees = tt.assignees.clone();
                task.reference_contact_id = tt.reference_contact_id.clone();
                task.guideline_id = tt.guideline_id.clone();
                task.status = tt.status;
                task.created_from_template_id = Some(self.id.clone());
                task.created_at = Some(stamp.clone());
                task.updated_at = Some(stamp.clone());
                task
            })
            .collect()
    }
}

/// Tasks created when a user applies a template by hand: due `lead_days` after
/// today, titles prefixed with the parent name when one is given.
pub fn use_template(
    template: &ProjectTemplate,
    parent_name: Option<&str>,
    today: NaiveDate,
    lead_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, ValidationError> {
    let parent_name = parent_name.map(str::trim).filter(|p| !p.is_empty());
    let due = TimeDelta::try_days(lead_days)
        .and_then(|lead| today.checked_add_signed(lead))
        .map(format_date)
        .ok_or(ValidationError::OutOfRange("template lead days"))?;
    log::info!(
        "Using template {} ({} tasks) due {}",
        template.name,
        template.tasks.len(),
        due
    );
    Ok(template.instantiate(parent_name, due, now))
}

/// Tasks to create automatically once a template's due date is `window_days` or
/// fewer away. Empty when the template was already activated for that date,
/// either by its `activated_for` mark or by tasks still carrying its id and date.
pub fn auto_activation(
    template: &ProjectTemplate,
    existing: &[Task],
    today: NaiveDate,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, DateError> {
    let due = parse_date(&template.template_due_date)?;
    if (due - today).num_days() > window_days {
        return Ok(Vec::new());
    }

    let already_activated = template.activated_for.as_deref()
        == Some(template.template_due_date.as_str())
        || existing.iter().any(|t| {
            t.created_from_template_id.as_deref() == Some(template.id.as_str())
                && t.due_date == template.template_due_date
        });
    if already_activated {
        log::debug!("Template {} already activated for {}", template.name, due);
        return Ok(Vec::new());
    }

    log::info!("Activating template {} for {}", template.name, due);
    Ok(template.instantiate(None, template.template_due_date.clone(), now))
}
