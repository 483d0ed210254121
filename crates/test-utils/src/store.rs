//! # In-Memory Store

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;

#[derive(Clone, Debug, Default)]
pub struct Mockstore {
    items: Arc<DashMap<String, Vec<u8>>>,
}

impl Mockstore {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn put(&self, partition: &str, key: &str, data: &[u8]) -> Result<()> {
        let key = format!("{partition}-{key}");
        self.items.insert(key, data.to_vec());
        Ok(())
    }

    pub fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let key = format!("{partition}-{key}");
        let Some(bytes) = self.items.get(&key) else {
            return Ok(None);
        };
        Ok(Some(bytes.to_vec()))
    }

    pub fn get_all(&self, partition: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let prefix = format!("{partition}-");
        let mut all = self
            .items
            .iter()
            .filter_map(|r| {
                let key = r.key().strip_prefix(&prefix)?;
                Some((key.to_string(), r.value().clone()))
            })
            .collect::<Vec<_>>();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions() {
        let store = Mockstore::open();
        store.put("CLIENT", "b", b"2").unwrap();
        store.put("CLIENT", "a", b"1").unwrap();
        store.put("SESSION", "a", b"3").unwrap();

        assert_eq!(store.get("CLIENT", "a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("CLIENT", "c").unwrap(), None);

        let all = store.get_all("CLIENT").unwrap();
        assert_eq!(all, vec![("a".to_string(), b"1".to_vec()), ("b".to_string(), b"2".to_vec())]);

        // clones share the same items
        let clone = store.clone();
        clone.put("CLIENT", "a", b"4").unwrap();
        assert_eq!(store.get("CLIENT", "a").unwrap(), Some(b"4".to_vec()));
        assert!(Mockstore::open().get("CLIENT", "a").unwrap().is_none());
    }
}
