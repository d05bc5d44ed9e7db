use chrono::NaiveDate;

use crate::config::TaskboardConfig;
use crate::core::board::{SortKey, StatusBoard, StatusFilter};
use crate::core::projection::{DataQualityIssue, ProjectedTask, Projector};
use crate::core::task::{Task, TaskStatus};
use crate::core::user::{Session, TaskScope, User};
use crate::error::Result;
use crate::store::{DocumentStore, collections, load_all};

/// Everything a dashboard screen shows for one viewer on one day.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub board: StatusBoard,
    pub issues: Vec<DataQualityIssue>,
}

/// Filter and sort chosen on the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardView {
    pub filter: StatusFilter,
    pub sort: SortKey,
}

impl Dashboard {
    /// Build from already-fetched tasks.
    pub fn build(
        tasks: &[Task],
        scope: &TaskScope,
        today: NaiveDate,
        config: &TaskboardConfig,
        view: DashboardView,
    ) -> Self {
        let projection =
            Projector::new(today, config.monthly_rule).project(tasks, |t| scope.includes(t));
        let board = StatusBoard::build(&projection.tasks, view.filter, view.sort);
        Self {
            today,
            board,
            issues: projection.issues,
        }
    }

    /// Fetch the task collection and build the viewer's dashboard.
    pub fn load(
        store: &dyn DocumentStore,
        session: &Session,
        today: NaiveDate,
        config: &TaskboardConfig,
        view: DashboardView,
    ) -> Result<Self> {
        let tasks: Vec<Task> = load_all(store, collections::TASKS)?;
        let dashboard = Self::build(&tasks, &session.dashboard_scope(), today, config, view);
        log::info!(
            "Dashboard for {}: {} tasks, {} data issues",
            session.email(),
            dashboard.board.total_count(),
            dashboard.issues.len()
        );
        Ok(dashboard)
    }

    /// A shown task by its displayed id, stored or virtual.
    pub fn find(&self, id: &str) -> Option<&ProjectedTask> {
        TaskStatus::ALL
            .iter()
            .flat_map(|status| self.board.bucket(*status))
            .find(|entry| entry.task.id == id)
    }
}

/// Log in by email against the stored users.
pub fn login(store: &dyn DocumentStore, email: &str, config: &TaskboardConfig) -> Result<Session> {
    let users: Vec<User> = load_all(store, collections::USERS)?;
    Session::login(email, &users, &config.admin_roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recurrence::Frequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assigned(id: &str, due: &str, frequency: Frequency, users: &[&str]) -> Task {
        let mut t = Task::new(id, due);
        t.id = id.to_string();
        t.frequency = frequency;
        t.assignees = users.iter().map(|u| u.to_string()).collect();
        t
    }

    #[test]
    fn member_dashboard_groups_projection() {
        let tasks = vec![
            assigned("weekly", "2024-03-01T09:00", Frequency::Weekly, &["u1"]),
            assigned("later", "2024-03-20", Frequency::None, &["u1"]),
            assigned("other", "2024-03-20", Frequency::None, &["u2"]),
        ];
        let dashboard = Dashboard::build(
            &tasks,
            &TaskScope::AssignedTo("u1".into()),
            date(2024, 3, 15),
            &TaskboardConfig::default(),
            DashboardView::default(),
        );

        assert_eq!(dashboard.board.total_count(), 3);
        assert_eq!(dashboard.board.overdue.len(), 1);
        assert_eq!(dashboard.board.overdue[0].task.id, "weekly");
        let pending: Vec<&str> = dashboard.board.pending.iter().map(|t| t.task.id.as_str()).collect();
        assert_eq!(pending, vec!["weekly-2024-03-15", "later"]);

        let occurrence = dashboard.find("weekly-2024-03-15").unwrap();
        assert!(occurrence.is_virtual());
        assert_eq!(occurrence.original_id(), "weekly");
        assert!(dashboard.find("other").is_none());
    }

    #[test]
    fn filter_applies_to_effective_status() {
        let tasks = vec![
            assigned("old", "2024-03-01", Frequency::None, &["u1"]),
            assigned("new", "2024-03-30", Frequency::None, &["u1"]),
        ];
        let view = DashboardView {
            filter: StatusFilter::Only(TaskStatus::Overdue),
            sort: SortKey::Title,
        };
        let dashboard = Dashboard::build(
            &tasks,
            &TaskScope::All,
            date(2024, 3, 15),
            &TaskboardConfig::default(),
            view,
        );
        assert_eq!(dashboard.board.total_count(), 1);
        assert_eq!(dashboard.board.overdue[0].task.id, "old");
    }
}
