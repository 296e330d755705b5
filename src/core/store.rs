use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A key/value document store holding JSON documents.
///
/// Every `set` and `delete` is atomic for the single key it touches; nothing
/// spans more than one key.
pub trait DocumentStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt document at {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes)
    }
}

impl DocumentStore for spin_sdk::key_value::Store {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(spin_sdk::key_value::Store::get(self, key)?)
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::set(self, key, value)?)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::delete(self, key)?)
    }
}

/// In-process store used by the native server and the tests.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.docs
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_documents_round_trip_through_memory_store() {
        let store = MemoryStore::new();
        store.set_json("list", &vec!["a".to_string(), "b".to_string()]).unwrap();

        let list: Option<Vec<String>> = store.get_json("list").unwrap();
        assert_eq!(list, Some(vec!["a".to_string(), "b".to_string()]));

        store.delete("list").unwrap();
        assert!(store.get_json::<Vec<String>>("list").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_documents_surface_as_errors() {
        let store = MemoryStore::new();
        store.set("broken", b"{not json").unwrap();
        let err = store.get_json::<Vec<String>>("broken").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
