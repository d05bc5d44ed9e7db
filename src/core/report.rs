use std::collections::{BTreeMap, BTreeSet};

use super::task::Task;
use super::user::{User, find_user};

/// One row of the efficiency report.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEfficiency {
    pub user_id: String,
    pub name: String,
    pub total_minutes: f64,
    /// Tasks the user logged any time on.
    pub task_count: usize,
    pub avg_minutes_per_task: f64,
}

/// Minutes logged per user across all tasks, sorted by display name.
///
/// A task counts once per user however many entries they logged on it.
/// Entries without a user are ignored.
pub fn efficiency(tasks: &[Task], users: &[User]) -> Vec<UserEfficiency> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for task in tasks {
        let mut loggers = BTreeSet::new();
        for log in &task.time_logs {
            let Some(user_id) = log.user_id.as_deref() else {
                continue;
            };
            loggers.insert(user_id);
            totals.entry(user_id).or_default().0 += log.minutes;
        }
        for user_id in loggers {
            totals.entry(user_id).or_default().1 += 1;
        }
    }

    let mut rows: Vec<UserEfficiency> = totals
        .into_iter()
        .map(|(user_id, (minutes, task_count))| {
            let name = find_user(users, user_id)
                .map(|u| u.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| user_id.to_string());
            let avg = if task_count > 0 {
                minutes / task_count as f64
            } else {
                0.0
            };
            UserEfficiency {
                user_id: user_id.to_string(),
                name,
                total_minutes: round2(minutes),
                task_count,
                avg_minutes_per_task: round2(avg),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));
    rows
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
