use super::contact::Contact;
use super::guideline::Guideline;
use super::task::Task;
use super::template::ProjectTemplate;
use super::user::User;

/// Collections a search covers, in result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCollection {
    Contacts,
    Guidelines,
    Tasks,
    Users,
    Templates,
}

impl SearchCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Guidelines => "guidelines",
            Self::Tasks => "tasks",
            Self::Users => "users",
            Self::Templates => "projectTemplates",
        }
    }

    /// Screen that lists documents of this collection.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Contacts => "/admincontacts",
            Self::Guidelines => "/adminguidelines",
            Self::Tasks => "/tasks",
            Self::Users => "/adduser",
            Self::Templates => "/templates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub collection: SearchCollection,
    pub id: String,
    pub title: String,
    pub content: String,
}

impl SearchHit {
    pub fn route(&self) -> &'static str {
        self.collection.route()
    }
}

/// Everything a search runs over.
#[derive(Debug, Clone, Copy)]
pub struct SearchCorpus<'a> {
    pub contacts: &'a [Contact],
    pub guidelines: &'a [Guideline],
    pub tasks: &'a [Task],
    pub users: &'a [User],
    pub templates: &'a [ProjectTemplate],
}

/// Case-insensitive substring search over titles and content.
pub fn search(corpus: &SearchCorpus<'_>, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let candidates = corpus
        .contacts
        .iter()
        .map(|c| {
            let categories = c.categories.join(" ");
            let content = [
                c.email.as_str(),
                c.phone.as_str(),
                c.address.as_str(),
                c.company_name.as_str(),
                categories.as_str(),
                c.notes.as_str(),
            ]
            .join(" ");
            hit(SearchCollection::Contacts, &c.id, &c.name, content)
        })
        .chain(corpus.guidelines.iter().map(|g| {
            hit(SearchCollection::Guidelines, &g.id, &g.title, g.description.clone())
        }))
        .chain(corpus.tasks.iter().map(|t| {
            let assignees = t.assignees.join(",");
            let content = [t.description.as_str(), t.due_date.as_str(), assignees.as_str()].join(" ");
            hit(SearchCollection::Tasks, &t.id, &t.title, content)
        }))
        .chain(corpus.users.iter().map(|u| {
            hit(SearchCollection::Users, &u.id, &u.email, u.phone.clone())
        }))
        .chain(corpus.templates.iter().map(|t| {
            let title = if t.name.is_empty() {
                format!("Template {}", t.id)
            } else {
                t.name.clone()
            };
            let content = if t.description.is_empty() {
                "No description".to_string()
            } else {
                t.description.clone()
            };
            hit(SearchCollection::Templates, &t.id, &title, content)
        }));

    let hits: Vec<SearchHit> = candidates
        .filter(|h| {
            h.title.to_lowercase().contains(&needle) || h.content.to_lowercase().contains(&needle)
        })
        .collect();

    log::debug!("Search {:?} matched {} documents", query, hits.len());
    hits
}

fn hit(collection: SearchCollection, id: &str, title: &str, content: String) -> SearchHit {
    SearchHit {
        collection,
        id: id.to_string(),
        title: title.to_string(),
        content: content.trim().to_string(),
    }
}
