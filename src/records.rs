use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::contact::{self, Contact};
use crate::core::due::parse_date;
use crate::core::guideline::{self, Guideline};
use crate::core::task::{self, Task};
use crate::core::template::{self, ProjectTemplate};
use crate::core::user::{self, Session, User};
use crate::core::workflow::timestamp;
use crate::error::{Error, Result, StoreError};
use crate::store::{DocumentStore, collections, encode, insert_record, load_all};

/// Insert `record` when `id` is empty, otherwise merge it into the stored document.
fn upsert<T: Serialize>(
    store: &mut dyn DocumentStore,
    collection: &str,
    id: &str,
    record: &T,
) -> Result<String, StoreError> {
    if id.is_empty() {
        return insert_record(store, collection, record);
    }
    store.update(collection, id, encode(record)?)?;
    log::debug!("Updated {}/{}", collection, id);
    Ok(id.to_string())
}

fn remove(store: &mut dyn DocumentStore, collection: &str, id: &str) -> Result<(), StoreError> {
    store.delete(collection, id)?;
    log::info!("Deleted {}/{}", collection, id);
    Ok(())
}

fn not_found(collection: &str, id: &str) -> Error {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
    .into()
}

fn require_admin(viewer: &Session, what: &'static str) -> Result<()> {
    if viewer.is_admin() {
        Ok(())
    } else {
        Err(Error::NotPermitted {
            email: viewer.email().to_string(),
            what,
        })
    }
}

/// Fetch one record by id.
pub fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<T> {
    let doc = store
        .get(collection, id)?
        .ok_or_else(|| not_found(collection, id))?;
    Ok(doc.decode()?)
}

/// Create or edit a task. New tasks are stamped with their creator and
/// creation time; every save refreshes `updatedAt`.
pub fn save_task(
    store: &mut dyn DocumentStore,
    mut task: Task,
    viewer: &Session,
    now: DateTime<Utc>,
) -> Result<Task> {
    task::validate(&task)?;
    task.due()?;
    if let Some(repeat) = task.repeat_date.as_deref() {
        parse_date(repeat)?;
    }

    let stamp = timestamp(now);
    if task.id.is_empty() {
        task.created_at = Some(stamp.clone());
        if task.created_by_email.is_empty() {
            task.created_by_email = viewer.email().to_string();
        }
    }
    task.updated_at = Some(stamp);
    task.id = upsert(store, collections::TASKS, &task.id, &task)?;
    log::info!("{} saved task {}", viewer.email(), task.id);
    Ok(task)
}

/// Delete a stored task. Admins may delete any task, others only their own.
/// A projected occurrence id deletes the task it was projected from.
pub fn delete_task(store: &mut dyn DocumentStore, id: &str, viewer: &Session) -> Result<()> {
    let id = task::original_id(id);
    let stored: Task = fetch(store, collections::TASKS, id)?;
    if !viewer.is_admin() && !stored.created_by_email.eq_ignore_ascii_case(viewer.email()) {
        return Err(Error::NotPermitted {
            email: viewer.email().to_string(),
            what: "this task",
        });
    }
    Ok(remove(store, collections::TASKS, id)?)
}

/// Create or edit a contact. Non-admins may only edit contacts they uploaded.
pub fn save_contact(
    store: &mut dyn DocumentStore,
    mut contact: Contact,
    viewer: &Session,
) -> Result<Contact> {
    let existing: Vec<Contact> = load_all(store, collections::CONTACTS)?;
    if !contact.id.is_empty() {
        let visible = contact::visible_to(&existing, viewer);
        if !visible.iter().any(|c| c.id == contact.id) {
            return Err(not_found(collections::CONTACTS, &contact.id));
        }
    }
    contact::validate(&contact, &existing)?;

    if contact.uploaded_by.is_empty() {
        contact.uploaded_by = viewer.email().to_string();
    }
    contact.id = upsert(store, collections::CONTACTS, &contact.id, &contact)?;
    Ok(contact)
}

pub fn delete_contact(store: &mut dyn DocumentStore, id: &str, viewer: &Session) -> Result<()> {
    let contacts: Vec<Contact> = load_all(store, collections::CONTACTS)?;
    if !contact::visible_to(&contacts, viewer).iter().any(|c| c.id == id) {
        return Err(not_found(collections::CONTACTS, id));
    }
    Ok(remove(store, collections::CONTACTS, id)?)
}

/// Guidelines a viewer may edit: all of them for admins, their own otherwise.
fn editable_guidelines<'a>(guidelines: &'a [Guideline], viewer: &Session) -> Vec<&'a Guideline> {
    if viewer.is_admin() {
        guidelines.iter().collect()
    } else {
        guideline::owned_by(guidelines, viewer.email())
    }
}

pub fn save_guideline(
    store: &mut dyn DocumentStore,
    mut guideline: Guideline,
    viewer: &Session,
    now: DateTime<Utc>,
) -> Result<Guideline> {
    guideline::validate(&guideline)?;
    if guideline.id.is_empty() {
        guideline.uploaded_by = viewer.email().to_string();
        guideline.created_at = Some(timestamp(now));
    } else {
        let existing: Vec<Guideline> = load_all(store, collections::GUIDELINES)?;
        if !editable_guidelines(&existing, viewer)
            .iter()
            .any(|g| g.id == guideline.id)
        {
            return Err(not_found(collections::GUIDELINES, &guideline.id));
        }
    }
    guideline.id = upsert(store, collections::GUIDELINES, &guideline.id, &guideline)?;
    Ok(guideline)
}

pub fn delete_guideline(store: &mut dyn DocumentStore, id: &str, viewer: &Session) -> Result<()> {
    let guidelines: Vec<Guideline> = load_all(store, collections::GUIDELINES)?;
    if !editable_guidelines(&guidelines, viewer).iter().any(|g| g.id == id) {
        return Err(not_found(collections::GUIDELINES, id));
    }
    Ok(remove(store, collections::GUIDELINES, id)?)
}

/// Create or edit a user. Admins only.
pub fn save_user(store: &mut dyn DocumentStore, mut user: User, viewer: &Session) -> Result<User> {
    require_admin(viewer, "users")?;
    let existing: Vec<User> = load_all(store, collections::USERS)?;
    user::validate(&user, &existing)?;
    user.id = upsert(store, collections::USERS, &user.id, &user)?;
    Ok(user)
}

pub fn delete_user(store: &mut dyn DocumentStore, id: &str, viewer: &Session) -> Result<()> {
    require_admin(viewer, "users")?;
    if id == viewer.user_id() {
        return Err(Error::NotPermitted {
            email: viewer.email().to_string(),
            what: "their own account",
        });
    }
    Ok(remove(store, collections::USERS, id)?)
}

/// Create or edit a project template. Admins only.
pub fn save_template(
    store: &mut dyn DocumentStore,
    mut tpl: ProjectTemplate,
    viewer: &Session,
) -> Result<ProjectTemplate> {
    require_admin(viewer, "templates")?;
    template::validate(&tpl)?;
    if !tpl.template_due_date.is_empty() {
        parse_date(&tpl.template_due_date)?;
    }
    tpl.id = upsert(store, collections::TEMPLATES, &tpl.id, &tpl)?;
    Ok(tpl)
}

pub fn delete_template(store: &mut dyn DocumentStore, id: &str, viewer: &Session) -> Result<()> {
    require_admin(viewer, "templates")?;
    Ok(remove(store, collections::TEMPLATES, id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::TemplateTask;
    use crate::core::user::Role;
    use crate::error::ValidationError;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn session(id: &str, email: &str, role: Role) -> Session {
        Session {
            user: User {
                id: id.into(),
                name: id.into(),
                email: email.into(),
                phone: "9876543210".into(),
                role: String::new(),
            },
            role,
        }
    }

    fn admin() -> Session {
        session("u1", "ravi@example.com", Role::Admin)
    }

    fn member() -> Session {
        session("u2", "asha@example.com", Role::Member)
    }

    fn make_task() -> Task {
        let mut task = Task::new("Bake bread", "2024-03-20T06:00");
        task.assignees = vec!["u2".into()];
        task
    }

    #[test]
    fn task_create_edit_delete() {
        let mut store = MemoryStore::new();
        let saved = save_task(&mut store, make_task(), &member(), now()).unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.created_by_email, "asha@example.com");
        assert_eq!(saved.created_at.as_deref(), Some("2024-03-15T09:00:00.000Z"));

        let mut edited = saved.clone();
        edited.title = "Bake rye".into();
        save_task(&mut store, edited, &member(), now()).unwrap();
        let stored: Task = fetch(&store, collections::TASKS, &saved.id).unwrap();
        assert_eq!(stored.title, "Bake rye");
        assert_eq!(stored.created_at, saved.created_at);

        let occurrence_id = format!("{}-2024-03-20", saved.id);
        delete_task(&mut store, &occurrence_id, &member()).unwrap();
        assert_eq!(store.document_count(collections::TASKS), 0);
    }

    #[test]
    fn task_save_rejects_bad_input() {
        let mut store = MemoryStore::new();
        let mut task = make_task();
        task.assignees.clear();
        assert!(matches!(
            save_task(&mut store, task, &member(), now()),
            Err(Error::Validation(ValidationError::Missing("assignee")))
        ));

        let mut task = make_task();
        task.due_date = "next week".into();
        assert!(matches!(
            save_task(&mut store, task, &member(), now()),
            Err(Error::Date(_))
        ));
        assert_eq!(store.document_count(collections::TASKS), 0);
    }

    #[test]
    fn only_creator_or_admin_deletes_task() {
        let mut store = MemoryStore::new();
        let saved = save_task(&mut store, make_task(), &admin(), now()).unwrap();
        assert!(matches!(
            delete_task(&mut store, &saved.id, &member()),
            Err(Error::NotPermitted { .. })
        ));
        delete_task(&mut store, &saved.id, &admin()).unwrap();
    }

    #[test]
    fn contacts_are_validated_and_owned() {
        let mut store = MemoryStore::new();
        let contact = Contact {
            name: "Flour Mill".into(),
            email: "mill@example.com".into(),
            phone: "9876543210".into(),
            ..Default::default()
        };
        let saved = save_contact(&mut store, contact.clone(), &member()).unwrap();
        assert_eq!(saved.uploaded_by, "asha@example.com");

        assert!(matches!(
            save_contact(&mut store, contact, &admin()),
            Err(Error::Validation(ValidationError::DuplicatePhone))
        ));

        let other = session("u3", "ravi.k@example.com", Role::Member);
        assert!(matches!(
            delete_contact(&mut store, &saved.id, &other),
            Err(Error::Store(StoreError::NotFound { .. }))
        ));
        delete_contact(&mut store, &saved.id, &member()).unwrap();
    }

    #[test]
    fn guidelines_editable_by_owner_and_admin() {
        let mut store = MemoryStore::new();
        let guideline = Guideline {
            title: "Proofing".into(),
            description: "Two hours at 28C".into(),
            ..Default::default()
        };
        let saved = save_guideline(&mut store, guideline, &member(), now()).unwrap();
        assert_eq!(saved.uploaded_by, "asha@example.com");

        let other = session("u3", "ravi.k@example.com", Role::Member);
        let mut edit = saved.clone();
        edit.title = "Proofing dough".into();
        assert!(save_guideline(&mut store, edit.clone(), &other, now()).is_err());
        save_guideline(&mut store, edit, &admin(), now()).unwrap();

        let stored: Guideline = fetch(&store, collections::GUIDELINES, &saved.id).unwrap();
        assert_eq!(stored.title, "Proofing dough");
        assert_eq!(stored.uploaded_by, "asha@example.com");

        assert!(delete_guideline(&mut store, &saved.id, &other).is_err());
        delete_guideline(&mut store, &saved.id, &member()).unwrap();
    }

    #[test]
    fn users_and_templates_need_admin() {
        let mut store = MemoryStore::new();
        let user = User {
            id: String::new(),
            name: "Meena".into(),
            email: "meena@example.com".into(),
            phone: "9876543212".into(),
            role: "baker".into(),
        };
        assert!(matches!(
            save_user(&mut store, user.clone(), &member()),
            Err(Error::NotPermitted { .. })
        ));
        let saved = save_user(&mut store, user, &admin()).unwrap();
        assert!(delete_user(&mut store, "u1", &admin()).is_err());
        delete_user(&mut store, &saved.id, &admin()).unwrap();

        let tpl = ProjectTemplate {
            name: "Wedding".into(),
            template_due_date: "2024-04-01".into(),
            tasks: vec![TemplateTask {
                title: "Order flowers".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(save_template(&mut store, tpl.clone(), &member()).is_err());
        let saved = save_template(&mut store, tpl, &admin()).unwrap();
        delete_template(&mut store, &saved.id, &admin()).unwrap();
        assert_eq!(store.document_count(collections::TEMPLATES), 0);
    }
}
