use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::projection::ProjectedTask;
use super::task::TaskStatus;

/// Which statuses a dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Self {
        match TaskStatus::from_str_opt(s) {
            Some(status) => Self::Only(status),
            None => Self::All,
        }
    }

    pub fn accepts(&self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => *s == status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DueDate,
    Title,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "due" | "dueDate" | "due_date" => Some(Self::DueDate),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

/// How pressing a due date is relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DueUrgency {
    Overdue,
    Today,
    Soon,
    Later,
}

impl DueUrgency {
    pub fn of(due: NaiveDate, today: NaiveDate, soon_window_days: i64) -> Self {
        let days = (due - today).num_days();
        if days < 0 {
            Self::Overdue
        } else if days == 0 {
            Self::Today
        } else if days <= soon_window_days {
            Self::Soon
        } else {
            Self::Later
        }
    }
}

/// Projected tasks grouped by effective status.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    pub pending: Vec<ProjectedTask>,
    pub in_progress: Vec<ProjectedTask>,
    pub overdue: Vec<ProjectedTask>,
    pub completed: Vec<ProjectedTask>,
}

impl StatusBoard {
    pub fn build(tasks: &[ProjectedTask], filter: StatusFilter, sort: SortKey) -> Self {
        let mut sorted: Vec<&ProjectedTask> = tasks
            .iter()
            .filter(|t| filter.accepts(t.effective_status))
            .collect();
        sorted.sort_by(|a, b| compare(a, b, sort));

        let mut board = Self::default();
        for task in sorted {
            board.bucket_mut(task.effective_status).push(task.clone());
        }
        board
    }

    pub fn bucket(&self, status: TaskStatus) -> &[ProjectedTask] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Overdue => &self.overdue,
            TaskStatus::Completed => &self.completed,
        }
    }

    fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<ProjectedTask> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Overdue => &mut self.overdue,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn total_count(&self) -> usize {
        self.pending.len() + self.in_progress.len() + self.overdue.len() + self.completed.len()
    }
}

fn compare(a: &ProjectedTask, b: &ProjectedTask, sort: SortKey) -> Ordering {
    match sort {
        SortKey::DueDate => {
            // unreadable dates sort last
            let a_key = a.task.due().ok().map(|d| d.sort_key());
            let b_key = b.task.due().ok().map(|d| d.sort_key());
            match (a_key, b_key) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        SortKey::Title => a
            .task
            .title
            .to_lowercase()
            .cmp(&b.task.title.to_lowercase())
            .then_with(|| a.task.title.cmp(&b.task.title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::Origin;
    use crate::core::task::Task;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(title: &str, due: &str, status: TaskStatus) -> ProjectedTask {
        ProjectedTask {
            task: Task::new(title, due),
            effective_status: status,
            origin: Origin::Stored,
        }
    }

    #[test]
    fn buckets_by_effective_status() {
        let tasks = vec![
            entry("a", "2024-03-01", TaskStatus::Overdue),
            entry("b", "2024-03-20", TaskStatus::Pending),
            entry("c", "2024-03-18", TaskStatus::InProgress),
            entry("d", "2024-03-02", TaskStatus::Completed),
        ];
        let board = StatusBoard::build(&tasks, StatusFilter::All, SortKey::DueDate);
        assert_eq!(board.overdue.len(), 1);
        assert_eq!(board.pending.len(), 1);
        assert_eq!(board.in_progress.len(), 1);
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.total_count(), 4);
    }

    #[test]
    fn filter_keeps_one_status() {
        let tasks = vec![
            entry("a", "2024-03-01", TaskStatus::Overdue),
            entry("b", "2024-03-20", TaskStatus::Pending),
        ];
        let board = StatusBoard::build(&tasks, StatusFilter::parse("overdue"), SortKey::DueDate);
        assert_eq!(board.total_count(), 1);
        assert_eq!(board.bucket(TaskStatus::Overdue)[0].task.title, "a");
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
    }

    #[test]
    fn sort_by_due_puts_unreadable_last() {
        let tasks = vec![
            entry("late", "2024-03-20T10:00", TaskStatus::Pending),
            entry("broken", "whenever", TaskStatus::Pending),
            entry("early", "2024-03-20T08:00", TaskStatus::Pending),
        ];
        let board = StatusBoard::build(&tasks, StatusFilter::All, SortKey::DueDate);
        let titles: Vec<&str> = board.pending.iter().map(|t| t.task.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late", "broken"]);
    }

    #[test]
    fn sort_by_title_ignores_case() {
        let tasks = vec![
            entry("banana", "2024-03-01", TaskStatus::Pending),
            entry("Apple", "2024-03-02", TaskStatus::Pending),
            entry("cherry", "2024-02-01", TaskStatus::Pending),
        ];
        let board = StatusBoard::build(&tasks, StatusFilter::All, SortKey::Title);
        let titles: Vec<&str> = board.pending.iter().map(|t| t.task.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn urgency_windows() {
        let today = date(2024, 3, 15);
        assert_eq!(DueUrgency::of(date(2024, 3, 14), today, 2), DueUrgency::Overdue);
        assert_eq!(DueUrgency::of(today, today, 2), DueUrgency::Today);
        assert_eq!(DueUrgency::of(date(2024, 3, 17), today, 2), DueUrgency::Soon);
        assert_eq!(DueUrgency::of(date(2024, 3, 18), today, 2), DueUrgency::Later);
    }
}
