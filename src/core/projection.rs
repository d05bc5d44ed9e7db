use chrono::NaiveDate;

use super::due::{DueDate, parse_date};
use super::recurrence::{Frequency, MonthlyRule};
use super::task::{Task, TaskStatus, virtual_id};
use crate::error::DateError;

/// Where a displayed task came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The stored record itself.
    Stored,
    /// A render-time occurrence of a recurring record; never persisted.
    Virtual { original_id: String },
}

/// A task as it should be displayed for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTask {
    pub task: Task,
    /// Status used for grouping; may differ from `task.status`.
    pub effective_status: TaskStatus,
    pub origin: Origin,
}

impl ProjectedTask {
    pub fn is_virtual(&self) -> bool {
        matches!(self.origin, Origin::Virtual { .. })
    }

    /// Id that writes for this entry must target.
    pub fn original_id(&self) -> &str {
        match &self.origin {
            Origin::Stored => &self.task.id,
            Origin::Virtual { original_id } => original_id,
        }
    }
}

/// A stored value the projector had to skip over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    pub task_id: String,
    pub field: &'static str,
    pub error: DateError,
}

/// Output of one projection pass.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub tasks: Vec<ProjectedTask>,
    pub issues: Vec<DataQualityIssue>,
}

impl Projection {
    pub fn virtual_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_virtual()).count()
    }
}

/// Turns stored tasks into the set displayed for one day: every stored record
/// with its effective status, plus an occurrence for each recurring record that
/// falls on that day.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    today: NaiveDate,
    monthly_rule: MonthlyRule,
}

impl Projector {
    pub fn new(today: NaiveDate, monthly_rule: MonthlyRule) -> Self {
        Self {
            today,
            monthly_rule,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Status to display: `Overdue` when the due date is before today and the
    /// task is not completed, otherwise the stored status.
    pub fn effective_status(&self, task: &Task) -> TaskStatus {
        if task.status.is_completed() {
            return TaskStatus::Completed;
        }
        match task.due() {
            Ok(due) if due.date() < self.today => TaskStatus::Overdue,
            _ => task.status,
        }
    }

    /// The occurrence of `task` for today, if it recurs today and is not completed.
    pub fn occurrence(&self, task: &Task) -> Result<Option<Task>, DateError> {
        if !task.frequency.is_recurring() {
            return Ok(None);
        }
        let due = task.due()?;
        if task.status.is_completed() || !self.recurs_today(task, &due)? {
            return Ok(None);
        }

        let mut occurrence = task.clone();
        occurrence.id = virtual_id(&task.id, self.today);
        occurrence.due_date = due.on(self.today);
        Ok(Some(occurrence))
    }

    fn recurs_today(&self, task: &Task, due: &DueDate) -> Result<bool, DateError> {
        let repeat_from = match (&task.frequency, task.repeat_date.as_deref()) {
            (Frequency::DateWise, Some(s)) => Some(parse_date(s)?),
            _ => None,
        };
        Ok(task
            .frequency
            .recurs_on(due.date(), repeat_from, self.today, self.monthly_rule))
    }

    /// Project every task accepted by `visible`.
    ///
    /// Unparseable dates never abort the pass: the stored record is still shown
    /// with its stored status, no occurrence is produced, and an issue is recorded.
    pub fn project<'a, I, F>(&self, tasks: I, visible: F) -> Projection
    where
        I: IntoIterator<Item = &'a Task>,
        F: Fn(&Task) -> bool,
    {
        let mut projection = Projection::default();

        for task in tasks.into_iter().filter(|t| visible(t)) {
            let effective_status = self.effective_status(task);

            let mut issue = task.due().err().map(|error| ("dueDate", error));
            let occurrence = match self.occurrence(task) {
                Ok(o) => o,
                Err(error) => {
                    issue.get_or_insert(("repeatDate", error));
                    None
                }
            };

            if let Some((field, error)) = issue {
                log::warn!("Task {} has an unreadable {}: {}", task.id, field, error);
                projection.issues.push(DataQualityIssue {
                    task_id: task.id.clone(),
                    field,
                    error,
                });
            }

            projection.tasks.push(ProjectedTask {
                task: task.clone(),
                effective_status,
                origin: Origin::Stored,
            });

            if let Some(occurrence) = occurrence {
                let effective_status = self.effective_status(&occurrence);
                projection.tasks.push(ProjectedTask {
                    task: occurrence,
                    effective_status,
                    origin: Origin::Virtual {
                        original_id: task.id.clone(),
                    },
                });
            }
        }

        log::debug!(
            "Projected {} tasks ({} occurrences, {} issues) for {}",
            projection.tasks.len(),
            projection.virtual_count(),
            projection.issues.len(),
            self.today
        );

        projection
    }
}
