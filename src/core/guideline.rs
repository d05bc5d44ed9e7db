use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A written procedure that tasks can point at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guideline {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

pub fn validate(guideline: &Guideline) -> Result<(), ValidationError> {
    if guideline.title.trim().is_empty() {
        return Err(ValidationError::Missing("title"));
    }
    if guideline.description.trim().is_empty() {
        return Err(ValidationError::Missing("description"));
    }
    Ok(())
}

/// Guidelines uploaded by `email`.
pub fn owned_by<'a>(guidelines: &'a [Guideline], email: &str) -> Vec<&'a Guideline> {
    guidelines
        .iter()
        .filter(|g| g.uploaded_by.eq_ignore_ascii_case(email))
        .collect()
}

/// Title of the guideline with `id`, or "None".
pub fn title_of<'a>(guidelines: &'a [Guideline], id: &str) -> &'a str {
    guidelines
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.title.as_str())
        .unwrap_or("None")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_guideline(id: &str, title: &str, by: &str) -> Guideline {
        Guideline {
            id: id.into(),
            title: title.into(),
            description: "Steps".into(),
            uploaded_by: by.into(),
            created_at: None,
        }
    }

    #[test]
    fn validate_needs_both_fields() {
        let mut g = make_guideline("g1", "Opening checklist", "asha@example.com");
        assert!(validate(&g).is_ok());
        g.description = "  ".into();
        assert_eq!(validate(&g), Err(ValidationError::Missing("description")));
        g.title.clear();
        assert_eq!(validate(&g), Err(ValidationError::Missing("title")));
    }

    #[test]
    fn ownership_and_lookup() {
        let all = vec![
            make_guideline("g1", "Opening checklist", "asha@example.com"),
            make_guideline("g2", "Closing checklist", "ravi@example.com"),
        ];
        let mine = owned_by(&all, "asha@example.com");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "g1");
        assert_eq!(title_of(&all, "g2"), "Closing checklist");
        assert_eq!(title_of(&all, "missing"), "None");
    }
}
