use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::config::TaskboardConfig;
use crate::core::task::Task;
use crate::core::template::{self, ProjectTemplate};
use crate::core::workflow;
use crate::error::StoreError;
use crate::store::{DocumentStore, Fields, collections, insert_record, load_all};

/// Outcome of a template activation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    /// Ids of tasks created from templates.
    pub created: Vec<String>,
    /// Templates whose due date could not be read.
    pub skipped_templates: Vec<String>,
}

/// Create tasks for every template whose due date falls inside the activation
/// window, then mark the template as activated for that date.
pub fn activate_templates(
    store: &mut dyn DocumentStore,
    today: NaiveDate,
    now: DateTime<Utc>,
    config: &TaskboardConfig,
) -> Result<Activation, StoreError> {
    let templates: Vec<ProjectTemplate> = load_all(store, collections::TEMPLATES)?;
    let mut existing: Vec<Task> = load_all(store, collections::TASKS)?;
    let mut activation = Activation::default();

    for tpl in &templates {
        let tasks = match template::auto_activation(
            tpl,
            &existing,
            today,
            config.template_activation_window_days,
            now,
        ) {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!("Template {} has an unreadable due date: {}", tpl.id, e);
                activation.skipped_templates.push(tpl.id.clone());
                continue;
            }
        };
        if tasks.is_empty() {
            continue;
        }
        for mut task in tasks {
            task.id = insert_record(store, collections::TASKS, &task)?;
            activation.created.push(task.id.clone());
            existing.push(task);
        }
        let mark = Fields::from_iter([(
            "activatedFor".to_string(),
            Value::String(tpl.template_due_date.clone()),
        )]);
        store.update(collections::TEMPLATES, &tpl.id, mark)?;
    }
    Ok(activation)
}

/// Delete completed tasks that have sat past the retention window. Returns their ids.
pub fn purge_completed(
    store: &mut dyn DocumentStore,
    now: DateTime<Utc>,
    config: &TaskboardConfig,
) -> Result<Vec<String>, StoreError> {
    let tasks: Vec<Task> = load_all(store, collections::TASKS)?;
    let stale = workflow::stale_completed(&tasks, now, config.completed_retention());
    for id in &stale {
        store.delete(collections::TASKS, id)?;
        log::info!("Purged completed task {}", id);
    }
    Ok(stale)
}
