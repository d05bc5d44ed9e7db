use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

use super::due::format_date;
use super::projection::ProjectedTask;
use super::task::{LoginTime, Task, TaskStatus, TimeLog};
use super::user::Session;
use crate::error::ValidationError;

/// Buttons offered on a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Start,
    LogTime,
    Complete,
}

/// A change to a stored task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    SetStatus {
        status: TaskStatus,
        login_time: Option<LoginTime>,
        updated_at: String,
    },
    AppendTimeLog(TimeLog),
}

/// An update addressed to the stored record, never to a projected occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWrite {
    pub task_id: String,
    pub update: TaskUpdate,
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Actions available to `viewer` on a displayed task.
pub fn available_actions(entry: &ProjectedTask, viewer: &Session, today: NaiveDate) -> Vec<TaskAction> {
    match entry.effective_status {
        TaskStatus::Pending | TaskStatus::Overdue => vec![TaskAction::Start],
        TaskStatus::InProgress => {
            let mut actions = Vec::new();
            if !entry.task.logged_on(viewer.user_id(), today) {
                actions.push(TaskAction::LogTime);
            }
            if entry.task.has_logged_time(viewer.user_id()) {
                actions.push(TaskAction::Complete);
            }
            actions
        }
        TaskStatus::Completed => Vec::new(),
    }
}

/// Build the write for a status change requested from a dashboard.
///
/// Unknown status strings fall back to `pending`. Moving to `in_progress`
/// records when the viewer started; completing requires logged time.
pub fn change_status(
    entry: &ProjectedTask,
    requested: &str,
    viewer: &Session,
    now: DateTime<Utc>,
) -> Result<TaskWrite, ValidationError> {
    let status = TaskStatus::parse(requested);

    if status.is_completed() && !entry.task.has_logged_time(viewer.user_id()) {
        return Err(ValidationError::NothingLogged);
    }
    if entry.task.status.is_completed() && !status.is_completed() {
        return Err(ValidationError::InvalidTransition {
            from: entry.task.status.to_string(),
            to: status.to_string(),
        });
    }

    let login_time = (status == TaskStatus::InProgress).then(|| LoginTime {
        user_id: viewer.user_id().to_string(),
        timestamp: timestamp(now),
    });

    log::info!(
        "{} moved task {} to {}",
        viewer.email(),
        entry.original_id(),
        status
    );

    Ok(TaskWrite {
        task_id: entry.original_id().to_string(),
        update: TaskUpdate::SetStatus {
            status,
            login_time,
            updated_at: timestamp(now),
        },
    })
}

/// Build the write for a time entry. One entry per user per day.
pub fn log_time(
    entry: &ProjectedTask,
    viewer: &Session,
    minutes: f64,
    today: NaiveDate,
) -> Result<TaskWrite, ValidationError> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(ValidationError::InvalidMinutes);
    }
    if entry.task.logged_on(viewer.user_id(), today) {
        return Err(ValidationError::AlreadyLogged {
            date: format_date(today),
        });
    }

    Ok(TaskWrite {
        task_id: entry.original_id().to_string(),
        update: TaskUpdate::AppendTimeLog(TimeLog {
            date: format_date(today),
            minutes,
            user_id: Some(viewer.user_id().to_string()),
        }),
    })
}

/// Apply an update to the stored record.
pub fn apply(task: &mut Task, update: &TaskUpdate) {
    match update {
        TaskUpdate::SetStatus {
            status,
            login_time,
            updated_at,
        } => {
            task.status = *status;
            task.updated_at = Some(updated_at.clone());
            if let Some(login_time) = login_time {
                task.login_times.push(login_time.clone());
            }
        }
        TaskUpdate::AppendTimeLog(log) => task.time_logs.push(log.clone()),
    }
}

/// Ids of completed tasks last updated longer ago than `retention`.
pub fn stale_completed(tasks: &[Task], now: DateTime<Utc>, retention: Duration) -> Vec<String> {
    tasks
        .iter()
        .filter(|t| t.status.is_completed())
        .filter(|t| {
            t.updated_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .is_some_and(|updated| now - updated.with_timezone(&Utc) > retention)
        })
        .map(|t| t.id.clone())
        .collect()
}
