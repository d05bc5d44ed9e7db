use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::error::{Error, Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Free-text role name, e.g. "founder" or "baker".
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    /// Admin when the role name is one of `admin_roles`, compared case-insensitively.
    pub fn from_role_name(role: &str, admin_roles: &[String]) -> Self {
        let role = role.trim();
        if admin_roles.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            Self::Admin
        } else {
            Self::Member
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// The logged-in viewer, passed explicitly to everything that filters by user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub role: Role,
}

impl Session {
    /// Look up the user registered under `email`.
    pub fn login(email: &str, users: &[User], admin_roles: &[String]) -> Result<Self> {
        let email = email.trim();
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| Error::UnknownUser(email.to_string()))?;
        let role = Role::from_role_name(&user.role, admin_roles);
        log::info!("{} logged in as {:?}", user.email, role);
        Ok(Self {
            user: user.clone(),
            role,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Tasks shown on this viewer's dashboard.
    pub fn dashboard_scope(&self) -> TaskScope {
        match self.role {
            Role::Admin => TaskScope::SharedWith(self.user.id.clone()),
            Role::Member => TaskScope::AssignedTo(self.user.id.clone()),
        }
    }
}

/// Which tasks a view covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    All,
    /// Tasks with the user among their assignees.
    AssignedTo(String),
    /// Tasks with the user among at most two assignees; wider team tasks are left
    /// to the shared task list.
    SharedWith(String),
}

impl TaskScope {
    pub fn includes(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::AssignedTo(user_id) => task.is_assigned_to(user_id),
            Self::SharedWith(user_id) => {
                (1..=2).contains(&task.assignees.len()) && task.is_assigned_to(user_id)
            }
        }
    }
}

/// Check a user form: email, phone and role are required, and an email may
/// belong to one user only, the one being edited excepted.
pub fn validate(user: &User, existing: &[User]) -> Result<(), ValidationError> {
    if user.email.trim().is_empty() {
        return Err(ValidationError::Missing("email"));
    }
    if user.phone.trim().is_empty() {
        return Err(ValidationError::Missing("phone"));
    }
    if user.role.trim().is_empty() {
        return Err(ValidationError::Missing("role"));
    }
    let duplicate = existing
        .iter()
        .any(|u| u.email.trim().eq_ignore_ascii_case(user.email.trim()) && u.id != user.id);
    if duplicate {
        return Err(ValidationError::DuplicateEmail);
    }
    Ok(())
}

pub fn find_user<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    users.iter().find(|u| u.id == id)
}

/// Names of the task's known assignees, or "None".
pub fn assignee_names(task: &Task, users: &[User]) -> String {
    let names: Vec<&str> = task
        .assignees
        .iter()
        .filter_map(|id| find_user(users, id))
        .map(|u| u.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

/// Phone numbers of the task's known assignees that have one.
pub fn assignee_phones<'a>(task: &Task, users: &'a [User]) -> Vec<&'a str> {
    task.assignees
        .iter()
        .filter_map(|id| find_user(users, id))
        .map(|u| u.phone.as_str())
        .filter(|p| !p.is_empty())
        .collect()
}
