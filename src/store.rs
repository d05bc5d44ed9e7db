use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::task::Task;
use crate::core::workflow::{self, TaskWrite};
use crate::error::StoreError;

/// Collection names in the hosted document database.
pub mod collections {
    pub const TASKS: &str = "tasks";
    pub const USERS: &str = "users";
    pub const CONTACTS: &str = "contacts";
    pub const GUIDELINES: &str = "guidelines";
    pub const TEMPLATES: &str = "projectTemplates";
    pub const PARENT_TASKS: &str = "parentTasks";
}

pub type Fields = Map<String, Value>;

/// A stored document: its id plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decode into a record type; the document id is exposed as the `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Encode a record as a field map. Record ids are never part of the body.
pub fn encode<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Ok(Map::from_iter([("value".to_string(), other)])),
    }
}

/// The hosted document database, seen as collections of documents keyed by id.
pub trait DocumentStore {
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Store a new document under a generated id and return that id.
    fn insert(&mut self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document.
    fn update(&mut self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Decode every document of a collection, skipping (and logging) malformed ones.
pub fn load_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>, StoreError> {
    let docs = store.list(collection)?;
    let mut records = Vec::with_capacity(docs.len());
    for doc in &docs {
        match doc.decode() {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping malformed {}/{}: {}", collection, doc.id, e),
        }
    }
    Ok(records)
}

pub fn insert_record<T: Serialize>(
    store: &mut dyn DocumentStore,
    collection: &str,
    record: &T,
) -> Result<String, StoreError> {
    let id = store.insert(collection, encode(record)?)?;
    log::debug!("Inserted {}/{}", collection, id);
    Ok(id)
}

/// Apply a task write to the stored task it addresses.
pub fn write_task(store: &mut dyn DocumentStore, write: &TaskWrite) -> Result<Task, StoreError> {
    let doc = store
        .get(collections::TASKS, &write.task_id)?
        .ok_or_else(|| StoreError::NotFound {
            collection: collections::TASKS.to_string(),
            id: write.task_id.clone(),
        })?;
    let mut task: Task = doc.decode()?;
    workflow::apply(&mut task, &write.update);
    store.update(collections::TASKS, &write.task_id, encode(&task)?)?;
    Ok(task)
}

/// In-memory document store, persisted as a JSON snapshot of
/// `{collection: {id: fields}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No snapshot at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Store a document under a known id, replacing any previous one.
    pub fn put(&mut self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    fn insert(&mut self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.put(collection, &id, fields);
        Ok(id)
    }

    fn update(&mut self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let doc = self
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        doc.extend(fields);
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::TaskStatus;
    use crate::core::workflow::TaskUpdate;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn decode_exposes_id() {
        let mut store = MemoryStore::new();
        store.put(
            collections::TASKS,
            "t1",
            fields(json!({"title": "Bake", "dueDate": "2024-03-01"})),
        );
        let tasks: Vec<Task> = load_all(&store, collections::TASKS).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t1");
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let mut store = MemoryStore::new();
        store.put(collections::TASKS, "ok", fields(json!({"title": "Bake"})));
        store.put(collections::TASKS, "bad", fields(json!({"title": 42})));
        let tasks: Vec<Task> = load_all(&store, collections::TASKS).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "ok");
    }

    #[test]
    fn insert_update_delete() {
        let mut store = MemoryStore::new();
        let id = insert_record(&mut store, collections::TASKS, &Task::new("Bake", "2024-03-01")).unwrap();
        assert_eq!(store.document_count(collections::TASKS), 1);

        let doc = store.get(collections::TASKS, &id).unwrap().unwrap();
        assert!(doc.fields.get("id").is_none());

        store
            .update(collections::TASKS, &id, fields(json!({"status": "completed"})))
            .unwrap();
        let task: Task = store.get(collections::TASKS, &id).unwrap().unwrap().decode().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, "Bake");

        store.delete(collections::TASKS, &id).unwrap();
        assert!(matches!(
            store.delete(collections::TASKS, &id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn write_task_targets_stored_record() {
        let mut store = MemoryStore::new();
        store.put(
            collections::TASKS,
            "t1",
            fields(json!({"title": "Bake", "dueDate": "2024-03-01T06:00", "frequency": "daily"})),
        );
        let write = TaskWrite {
            task_id: "t1".into(),
            update: TaskUpdate::SetStatus {
                status: TaskStatus::InProgress,
                login_time: None,
                updated_at: "2024-03-15T09:00:00.000Z".into(),
            },
        };
        let task = write_task(&mut store, &write).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, "2024-03-01T06:00");

        let missing = TaskWrite {
            task_id: "t1-2024-03-15".into(),
            ..write
        };
        assert!(matches!(
            write_task(&mut store, &missing),
            Err(StoreError::NotFound { .. })
        ));
    }
}
