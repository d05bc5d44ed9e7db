use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::user::Session;
use crate::error::ValidationError;

/// Ten-digit mobile number starting with 6-9.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawContact")]
pub struct Contact {
    #[serde(skip_serializing)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company_name: String,
    pub date_of_birth: String,
    pub date_of_anniversary: String,
    pub categories: Vec<String>,
    pub notes: String,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: String,
}

/// Stored shape: older records carry a single `category` instead of `categories`.
#[derive(Deserialize)]
struct RawContact {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    date_of_birth: String,
    #[serde(default)]
    date_of_anniversary: String,
    categories: Option<Vec<String>>,
    category: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(rename = "uploadedBy", default)]
    uploaded_by: String,
}

impl From<RawContact> for Contact {
    fn from(raw: RawContact) -> Self {
        let categories = raw
            .categories
            .or_else(|| raw.category.map(|c| vec![c]))
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            email: raw.email,
            phone: raw.phone,
            address: raw.address,
            company_name: raw.company_name,
            date_of_birth: raw.date_of_birth,
            date_of_anniversary: raw.date_of_anniversary,
            categories,
            notes: raw.notes.unwrap_or_default(),
            uploaded_by: raw.uploaded_by,
        }
    }
}

impl Contact {
    /// Display name, "No name" when blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "No name"
        } else {
            &self.name
        }
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.email, &self.phone, &self.company_name]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Check a contact form before saving it.
///
/// `existing` is the full contact collection; a phone number may only be held by
/// one contact, the one being edited excepted.
pub fn validate(contact: &Contact, existing: &[Contact]) -> Result<(), ValidationError> {
    if contact.name.trim().is_empty() {
        return Err(ValidationError::Missing("name"));
    }
    if contact.email.trim().is_empty() {
        return Err(ValidationError::Missing("email"));
    }
    if contact.phone.trim().is_empty() {
        return Err(ValidationError::Missing("phone"));
    }
    if !PHONE_RE.is_match(contact.phone.trim()) {
        return Err(ValidationError::InvalidPhone);
    }
    let duplicate = existing
        .iter()
        .any(|c| c.phone.trim() == contact.phone.trim() && c.id != contact.id);
    if duplicate {
        return Err(ValidationError::DuplicatePhone);
    }
    Ok(())
}

/// Contacts the viewer may see: admins see everything, others what they uploaded.
pub fn visible_to<'a>(contacts: &'a [Contact], viewer: &Session) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|c| viewer.is_admin() || c.uploaded_by.eq_ignore_ascii_case(viewer.email()))
        .collect()
}

/// Distinct categories across contacts, sorted.
pub fn categories(contacts: &[Contact]) -> Vec<String> {
    contacts
        .iter()
        .flat_map(|c| c.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Narrow a contact list by category and free-text query; empty values match everything.
pub fn filter<'a>(contacts: &[&'a Contact], category: Option<&str>, query: &str) -> Vec<&'a Contact> {
    let needle = query.trim().to_lowercase();
    contacts
        .iter()
        .copied()
        .filter(|c| category.is_none_or(|cat| c.has_category(cat)))
        .filter(|c| needle.is_empty() || c.matches(&needle))
        .collect()
}
