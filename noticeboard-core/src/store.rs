//! The event store: owner of the base and user collections.
//!
//! Lifecycle: `open` once with the persisted storage, `load` the base list
//! once, then query and mutate. The base collection is never modified after
//! `load`. Edits to base events land in the user collection as overrides that
//! share the base event's id.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{NoticeBoardError, NoticeBoardResult};
use crate::event::{Event, EventFields};
use crate::export::Export;
use crate::filter::{self, Query};
use crate::source::BaseSource;
use crate::storage::KeyValueStore;

/// Result of a mutation that was applied in memory.
///
/// `warning` holds the persistence error if the write to storage failed. The
/// in-memory state is still authoritative in that case.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub warning: Option<NoticeBoardError>,
}

impl<T> Applied<T> {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Which collection an event entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Base,
    User,
}

pub struct EventStore<S: KeyValueStore> {
    base: Vec<Event>,
    user: Vec<Event>,
    storage: S,
    key: String,
    loaded: bool,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Open the store, reading the user collection from `storage[key]`.
    ///
    /// A missing or malformed value yields an empty user collection.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let user = read_user_events(&storage, &key);

        EventStore {
            base: Vec::new(),
            user,
            storage,
            key,
            loaded: false,
        }
    }

    /// Fetch the base collection. Only the first call does anything.
    ///
    /// A failing source leaves the base collection empty; the error is logged
    /// and not returned. Returns the number of base events.
    pub async fn load(&mut self, source: &impl BaseSource) -> usize {
        if self.loaded {
            debug!(source = %source.describe(), "base events already loaded, skipping");
            return self.base.len();
        }
        self.loaded = true;

        match source.fetch().await {
            Ok(events) => {
                info!(source = %source.describe(), count = events.len(), "loaded base events");
                self.base = events;
            }
            Err(e) => {
                warn!(source = %source.describe(), error = %e, "continuing without base events");
                self.base = Vec::new();
            }
        }

        self.base.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn base(&self) -> &[Event] {
        &self.base
    }

    pub fn user(&self) -> &[Event] {
        &self.user
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Base events followed by user events, sorted by datetime.
    ///
    /// The sort is stable and unparseable datetimes count as the epoch, so
    /// they come first. Ids present in both collections appear twice.
    pub fn merged(&self) -> Vec<Event> {
        self.entries()
            .into_iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// `merged()` with each event tagged by the collection it came from.
    pub fn entries(&self) -> Vec<(Collection, &Event)> {
        let mut all: Vec<(Collection, &Event)> = self
            .base
            .iter()
            .map(|e| (Collection::Base, e))
            .chain(self.user.iter().map(|e| (Collection::User, e)))
            .collect();
        all.sort_by_key(|(_, event)| event.timestamp());
        all
    }

    pub fn filter(&self, query: Option<&str>, month: Option<&str>) -> Vec<Event> {
        filter::filter(&self.merged(), query, month)
    }

    /// `filter()` over `entries()`.
    pub fn filter_entries(
        &self,
        query: Option<&str>,
        month: Option<&str>,
    ) -> Vec<(Collection, &Event)> {
        let query = Query::new(query, month);
        self.entries()
            .into_iter()
            .filter(|(_, event)| query.matches(event))
            .collect()
    }

    pub fn month_keys(&self) -> BTreeSet<String> {
        filter::month_keys(&self.merged())
    }

    /// The canonical record for `id`: the user copy if there is one, else the base one.
    pub fn find(&self, id: &str) -> Option<&Event> {
        self.find_entry(id).map(|(_, event)| event)
    }

    /// Like `find`, also saying which collection the record lives in.
    pub fn find_entry(&self, id: &str) -> Option<(Collection, &Event)> {
        self.user
            .iter()
            .find(|e| e.id == id)
            .map(|e| (Collection::User, e))
            .or_else(|| {
                self.base
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| (Collection::Base, e))
            })
    }

    /// True when a user event shadows a base event with the same id.
    pub fn is_override(&self, id: &str) -> bool {
        self.user.iter().any(|e| e.id == id) && self.base.iter().any(|e| e.id == id)
    }

    pub fn create(&mut self, fields: EventFields) -> NoticeBoardResult<Applied<Event>> {
        let fields = fields.validate()?;
        let event = Event::from_fields(self.fresh_id(), fields);

        debug!(id = %event.id, title = %event.title, "creating event");
        self.user.push(event.clone());

        Ok(self.persisted(event))
    }

    /// Overwrite the user copy of `id` in place, or add one if there is none yet.
    pub fn update(&mut self, id: &str, fields: EventFields) -> NoticeBoardResult<Applied<Event>> {
        let fields = fields.validate()?;
        let event = Event::from_fields(id.to_string(), fields);

        match self.user.iter_mut().find(|e| e.id == id) {
            Some(existing) => {
                debug!(id, "updating user event");
                *existing = event.clone();
            }
            None => {
                debug!(id, "adding override for event");
                self.user.push(event.clone());
            }
        }

        Ok(self.persisted(event))
    }

    /// Remove a user event.
    ///
    /// Any id not in the user collection, whether it is a base event or
    /// unknown altogether, fails with `ImmutableRecord`.
    pub fn delete(&mut self, id: &str) -> NoticeBoardResult<Applied<Event>> {
        let position = self
            .user
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| NoticeBoardError::ImmutableRecord(id.to_string()))?;

        debug!(id, "deleting user event");
        let removed = self.user.remove(position);

        Ok(self.persisted(removed))
    }

    pub fn export(&self) -> Export {
        Export {
            base: self.base.clone(),
            user: self.user.clone(),
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Write the whole user collection and wrap the mutation result.
    fn persisted<T>(&mut self, value: T) -> Applied<T> {
        let warning = self.save().err();
        if let Some(e) = &warning {
            warn!(key = %self.key, error = %e, "user events kept in memory only");
        }
        Applied { value, warning }
    }

    fn save(&mut self) -> NoticeBoardResult<()> {
        let json = serde_json::to_string(&self.user)?;
        self.storage.set(&self.key, &json)
    }
}

fn read_user_events(storage: &impl KeyValueStore, key: &str) -> Vec<Event> {
    let content = match storage.get(key) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "could not read user events, starting empty");
            return Vec::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(key, error = %e, "user events are malformed, starting empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileSource, StaticSource};
    use crate::storage::{DEFAULT_STORAGE_KEY, FileStore, MemoryStore};

    fn event(id: &str, title: &str, datetime: &str) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            datetime: datetime.to_string(),
            venue: None,
            tags: vec![],
            description: None,
        }
    }

    fn base_events() -> Vec<Event> {
        vec![
            event("b1", "Spring Concert", "2024-04-01T19:00"),
            event("b2", "Tech Fest", "2024-03-10T09:00"),
        ]
    }

    async fn loaded_store() -> EventStore<MemoryStore> {
        let mut store = EventStore::open(MemoryStore::new(), DEFAULT_STORAGE_KEY);
        store.load(&StaticSource(base_events())).await;
        store
    }

    fn quiz() -> EventFields {
        EventFields::new("Quiz", "2024-01-01T10:00")
    }

    #[tokio::test]
    async fn test_merged_contains_both_collections_sorted() {
        let mut store = loaded_store().await;
        store.create(EventFields::new("Mystery", "someday")).unwrap();
        store.create(EventFields::new("Workshop", "2024-03-20T14:00")).unwrap();

        let merged = store.merged();
        assert_eq!(merged.len(), store.base().len() + store.user().len());

        let titles: Vec<_> = merged.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Mystery", "Tech Fest", "Workshop", "Spring Concert"]);
        assert!(merged.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    #[tokio::test]
    async fn test_unparseable_datetime_sorts_before_pre_epoch_dates() {
        let mut store = EventStore::open(MemoryStore::new(), DEFAULT_STORAGE_KEY);
        store
            .load(&StaticSource(vec![
                event("moon", "Moon Landing", "1969-07-20T20:17"),
                event("tbd", "To Be Decided", "tbd"),
            ]))
            .await;

        let ids: Vec<_> = store.merged().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["tbd", "moon"]);
    }

    #[tokio::test]
    async fn test_entries_tag_collection_even_for_identical_override() {
        let mut store = loaded_store().await;
        let unchanged = store.find("b1").unwrap().fields();
        store.update("b1", unchanged).unwrap();

        let tagged: Vec<_> = store
            .entries()
            .into_iter()
            .filter(|(_, e)| e.id == "b1")
            .map(|(collection, _)| collection)
            .collect();
        assert_eq!(tagged, vec![Collection::Base, Collection::User]);
        assert_eq!(store.find_entry("b1").unwrap().0, Collection::User);
        assert_eq!(store.find_entry("b2").unwrap().0, Collection::Base);
    }

    #[tokio::test]
    async fn test_filter_entries_matches_filter() {
        let mut store = loaded_store().await;
        store.create(EventFields::new("Tech Talk", "2024-03-12")).unwrap();

        let plain: Vec<_> = store.filter(Some("tech"), Some("2024-03"));
        let tagged: Vec<_> = store
            .filter_entries(Some("tech"), Some("2024-03"))
            .into_iter()
            .map(|(_, e)| e.clone())
            .collect();
        assert_eq!(plain, tagged);
        assert_eq!(plain.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_rejected() {
        let mut store = loaded_store().await;
        let err = store.delete("nope").unwrap_err();
        assert!(matches!(err, NoticeBoardError::ImmutableRecord(_)));
        assert!(err.to_string().contains("not one of your events"));
    }

    #[tokio::test]
    async fn test_failed_load_degrades_to_empty_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::open(MemoryStore::new(), DEFAULT_STORAGE_KEY);

        let count = store.load(&FileSource::new(dir.path().join("missing.json"))).await;

        assert_eq!(count, 0);
        assert!(store.is_loaded());
        assert!(store.merged().is_empty());
        assert!(store.create(quiz()).is_ok());
    }

    #[tokio::test]
    async fn test_second_load_is_a_no_op() {
        let mut store = loaded_store().await;
        let count = store.load(&StaticSource(vec![])).await;
        assert_eq!(count, 2);
        assert_eq!(store.base().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_without_mutating() {
        let mut store = loaded_store().await;
        let err = store.create(EventFields::new("", "2024-01-01T10:00")).unwrap_err();

        assert!(matches!(err, NoticeBoardError::Validation("title")));
        assert!(store.user().is_empty());
        assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_twice_yields_distinct_ids() {
        let mut store = loaded_store().await;
        let first = store.create(quiz()).unwrap().value;
        let second = store.create(quiz()).unwrap().value;

        assert_ne!(first.id, second.id);
        assert_eq!(store.user().len(), 2);
        assert!(store.base().iter().all(|b| b.id != first.id && b.id != second.id));
    }

    #[tokio::test]
    async fn test_every_mutation_persists_whole_collection() {
        let mut store = loaded_store().await;
        let created = store.create(quiz()).unwrap();
        assert!(created.is_persisted());

        let saved = store.storage().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let persisted: Vec<Event> = serde_json::from_str(&saved).unwrap();
        assert_eq!(persisted, store.user());
    }

    #[tokio::test]
    async fn test_update_user_event_in_place() {
        let mut store = loaded_store().await;
        let first = store.create(quiz()).unwrap().value;
        store.create(EventFields::new("Picnic", "2024-06-01")).unwrap();

        let mut fields = first.fields();
        fields.title = "Pub Quiz".to_string();
        store.update(&first.id, fields).unwrap();

        assert_eq!(store.user().len(), 2);
        assert_eq!(store.user()[0].id, first.id);
        assert_eq!(store.user()[0].title, "Pub Quiz");
    }

    #[tokio::test]
    async fn test_update_base_event_creates_shadow_override() {
        let mut store = loaded_store().await;
        let fields = EventFields::new("Tech Fest (moved)", "2024-03-11T09:00");
        store.update("b2", fields).unwrap();

        assert!(store.user().iter().any(|e| e.id == "b2"));
        assert_eq!(store.merged().iter().filter(|e| e.id == "b2").count(), 2);
        assert_eq!(store.base()[1].title, "Tech Fest");
        assert!(store.is_override("b2"));
        assert_eq!(store.find("b2").unwrap().title, "Tech Fest (moved)");
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let mut store = loaded_store().await;
        let err = store.update("b1", EventFields::new("Concert", " ")).unwrap_err();
        assert!(matches!(err, NoticeBoardError::Validation("datetime")));
        assert!(store.user().is_empty());
    }

    #[tokio::test]
    async fn test_delete_base_event_is_rejected() {
        let mut store = loaded_store().await;
        let err = store.delete("b1").unwrap_err();
        assert!(matches!(err, NoticeBoardError::ImmutableRecord(id) if id == "b1"));
        assert!(store.user().is_empty());
        assert_eq!(store.base().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_user_event() {
        let mut store = loaded_store().await;
        let keep = store.create(EventFields::new("Keep", "2024-02-01")).unwrap().value;
        let doomed = store.create(quiz()).unwrap().value;

        let removed = store.delete(&doomed.id).unwrap().value;

        assert_eq!(removed, doomed);
        assert_eq!(store.user(), &[keep]);
        assert!(store.merged().iter().all(|e| e.id != doomed.id));
    }

    #[tokio::test]
    async fn test_delete_override_reveals_base_event() {
        let mut store = loaded_store().await;
        store.update("b1", EventFields::new("Concert", "2024-04-02")).unwrap();
        store.delete("b1").unwrap();

        assert_eq!(store.find("b1").unwrap().title, "Spring Concert");
        assert!(!store.is_override("b1"));
    }

    #[tokio::test]
    async fn test_filter_and_month_keys_use_merged_view() {
        let mut store = loaded_store().await;
        store.create(EventFields::new("Quiz", "2024-03-25")).unwrap();

        assert_eq!(store.filter(Some("tech"), None).len(), 1);
        assert_eq!(store.filter(None, Some("2024-03")).len(), 2);
        let keys: Vec<_> = store.month_keys().into_iter().collect();
        assert_eq!(keys, vec!["2024-03", "2024-04"]);
    }

    #[test]
    fn test_open_with_malformed_storage_starts_empty() {
        let storage = MemoryStore::with_value(DEFAULT_STORAGE_KEY, "{not json");
        let store = EventStore::open(storage, DEFAULT_STORAGE_KEY);
        assert!(store.user().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory_authoritative() {
        let mut store = loaded_store().await;
        store.storage_mut().set_fail_writes(true);

        let applied = store.create(quiz()).unwrap();

        assert!(!applied.is_persisted());
        assert!(matches!(applied.warning, Some(NoticeBoardError::Persistence(_))));
        assert_eq!(store.user().len(), 1);

        store.storage_mut().set_fail_writes(false);
        store.create(quiz()).unwrap();
        let saved = store.storage().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Vec<Event>>(&saved).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_export_does_not_mutate() {
        let mut store = loaded_store().await;
        store.create(quiz()).unwrap();

        let export = store.export();
        assert_eq!(export.base, store.base());
        assert_eq!(export.user, store.user());
        assert_eq!(store.merged().len(), 3);
    }

    #[tokio::test]
    async fn test_export_user_reloads_identically() {
        let mut store = loaded_store().await;
        store.create(quiz()).unwrap();
        store.update("b1", EventFields::new("Concert", "2024-04-02")).unwrap();

        let export = store.export();
        let reopened = EventStore::open(
            MemoryStore::with_value("restored", &export.user_json().unwrap()),
            "restored",
        );
        assert_eq!(reopened.user(), export.user.as_slice());
    }

    #[tokio::test]
    async fn test_user_events_survive_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let mut store = EventStore::open(FileStore::new(dir.path()), DEFAULT_STORAGE_KEY);
            store.load(&StaticSource(base_events())).await;
            store.create(quiz()).unwrap().value
        };

        let store = EventStore::open(FileStore::new(dir.path()), DEFAULT_STORAGE_KEY);
        assert_eq!(store.user(), &[created]);
        assert!(store.base().is_empty());
    }
}
