use crate::chain::Chain;
use crate::error::{LedgerError, Result};
use crate::event::Event;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Load and save an event's chain by event id.
///
/// Implementations do no locking: callers must serialize read-modify-write
/// cycles per event, or concurrent votes can overwrite each other.
pub trait ChainStore {
    fn load(&self, event_id: &str) -> Result<Chain>;
    fn save(&mut self, event_id: &str, chain: &Chain) -> Result<()>;
}

/// Whole-event access on top of [`ChainStore`].
pub trait EventStore: ChainStore {
    fn list(&self) -> Result<Vec<Event>>;
    fn get(&self, event_id: &str) -> Result<Event>;
    fn insert(&mut self, event: Event) -> Result<()>;
    /// Replace an existing event.
    fn update(&mut self, event: Event) -> Result<()>;
    fn delete(&mut self, event_id: &str) -> Result<()>;
}

/// All events kept as one pretty-printed JSON array on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty array file if it is missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            path: path.to_path_buf(),
        };
        if !path.exists() {
            store.write_all(&[])?;
            tracing::info!(path = %path.display(), "initialized event store");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Event>> {
        let data = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn write_all(&self, events: &[Event]) -> Result<()> {
        let data = serde_json::to_vec_pretty(events)?;
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ChainStore for JsonFileStore {
    fn load(&self, event_id: &str) -> Result<Chain> {
        Ok(self.get(event_id)?.blockchain)
    }

    fn save(&mut self, event_id: &str, chain: &Chain) -> Result<()> {
        let mut events = self.read_all()?;
        let event = events
            .iter_mut()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))?;
        event.blockchain = chain.clone();
        self.write_all(&events)
    }
}

impl EventStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Event>> {
        self.read_all()
    }

    fn get(&self, event_id: &str) -> Result<Event> {
        self.read_all()?
            .into_iter()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))
    }

    fn insert(&mut self, event: Event) -> Result<()> {
        let mut events = self.read_all()?;
        if events.iter().any(|e| e.event_id == event.event_id) {
            return Err(LedgerError::EventExists(event.event_id));
        }
        events.push(event);
        self.write_all(&events)
    }

    fn update(&mut self, event: Event) -> Result<()> {
        let mut events = self.read_all()?;
        let slot = events
            .iter_mut()
            .find(|e| e.event_id == event.event_id)
            .ok_or_else(|| LedgerError::EventNotFound(event.event_id.clone()))?;
        *slot = event;
        self.write_all(&events)
    }

    fn delete(&mut self, event_id: &str) -> Result<()> {
        let mut events = self.read_all()?;
        let before = events.len();
        events.retain(|e| e.event_id != event_id);
        if events.len() == before {
            return Err(LedgerError::EventNotFound(event_id.into()));
        }
        self.write_all(&events)
    }
}

/// In-memory event store for testing.
#[derive(Default)]
pub struct MemoryStore {
    events: BTreeMap<String, Event>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ChainStore for MemoryStore {
    fn load(&self, event_id: &str) -> Result<Chain> {
        self.events
            .get(event_id)
            .map(|e| e.blockchain.clone())
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))
    }

    fn save(&mut self, event_id: &str, chain: &Chain) -> Result<()> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))?;
        event.blockchain = chain.clone();
        Ok(())
    }
}

impl EventStore for MemoryStore {
    fn list(&self) -> Result<Vec<Event>> {
        Ok(self.events.values().cloned().collect())
    }

    fn get(&self, event_id: &str) -> Result<Event> {
        self.events
            .get(event_id)
            .cloned()
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))
    }

    fn insert(&mut self, event: Event) -> Result<()> {
        if self.events.contains_key(&event.event_id) {
            return Err(LedgerError::EventExists(event.event_id));
        }
        self.events.insert(event.event_id.clone(), event);
        Ok(())
    }

    fn update(&mut self, event: Event) -> Result<()> {
        match self.events.get_mut(&event.event_id) {
            Some(slot) => {
                *slot = event;
                Ok(())
            }
            None => Err(LedgerError::EventNotFound(event.event_id)),
        }
    }

    fn delete(&mut self, event_id: &str) -> Result<()> {
        self.events
            .remove(event_id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::EventNotFound(event_id.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_candidates;
    use crate::tamper::{tamper, TamperEdit};
    use crate::validate::validate;

    fn sample_event() -> Event {
        Event::new("Board", parse_candidates("Alice,Bob")).unwrap()
    }

    fn file_store() -> (tempfile::TempDir, JsonFileStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&tmp.path().join("events.json")).unwrap();
        (tmp, store)
    }

    #[test]
    fn open_creates_empty_file() {
        let (_tmp, store) = file_store();
        assert!(store.path().exists());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn insert_get_roundtrip() {
        let (_tmp, mut store) = file_store();
        let mut event = sample_event();
        event.cast_vote("v1", "Bob").unwrap();
        store.insert(event.clone()).unwrap();

        let loaded = store.get(&event.event_id).unwrap();
        assert_eq!(loaded, event);
        assert!(loaded.validate().valid);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let (_tmp, mut store) = file_store();
        let event = sample_event();
        store.insert(event.clone()).unwrap();
        assert!(matches!(store.insert(event), Err(LedgerError::EventExists(_))));
    }

    #[test]
    fn load_modify_save_chain() {
        let (_tmp, mut store) = file_store();
        let event = sample_event();
        store.insert(event.clone()).unwrap();

        let mut chain = store.load(&event.event_id).unwrap();
        chain.append("v1", "Alice").unwrap();
        chain.append("v2", "Bob").unwrap();
        store.save(&event.event_id, &chain).unwrap();

        let reopened = JsonFileStore::open(store.path()).unwrap();
        assert_eq!(reopened.load(&event.event_id).unwrap(), chain);
    }

    #[test]
    fn tamper_survives_persistence_and_is_detected() {
        let (_tmp, mut store) = file_store();
        let mut event = sample_event();
        event.cast_vote("v1", "Alice").unwrap();
        event.cast_vote("v2", "Bob").unwrap();
        store.insert(event.clone()).unwrap();

        let mut chain = store.load(&event.event_id).unwrap();
        tamper(&mut chain, 1, &TamperEdit::candidate("Bob")).unwrap();
        store.save(&event.event_id, &chain).unwrap();

        let report = validate(&store.load(&event.event_id).unwrap());
        assert_eq!(report.broken_at, Some(2));
    }

    #[test]
    fn delete_and_missing() {
        let (_tmp, mut store) = file_store();
        let event = sample_event();
        store.insert(event.clone()).unwrap();
        store.delete(&event.event_id).unwrap();
        assert!(matches!(
            store.get(&event.event_id),
            Err(LedgerError::EventNotFound(_))
        ));
        assert!(store.delete(&event.event_id).is_err());
        assert!(store.save("nope", &Chain::new()).is_err());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_tmp, store) = file_store();
        fs::write(store.path(), b"{not json").unwrap();
        assert!(matches!(store.list(), Err(LedgerError::Serde(_))));
    }

    #[test]
    fn memory_store_basics() {
        let mut store = MemoryStore::new();
        let mut event = sample_event();
        store.insert(event.clone()).unwrap();
        assert_eq!(store.len(), 1);

        event.cast_vote("v1", "Alice").unwrap();
        store.update(event.clone()).unwrap();
        assert_eq!(store.load(&event.event_id).unwrap().len(), 2);

        store.delete(&event.event_id).unwrap();
        assert!(store.is_empty());
    }
}
