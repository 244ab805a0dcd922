// Copyright 2026 Pixq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;

pub const RECENT_TAGS_KEY: &str = "RecentlyAddedManualTags";
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// A client-local key/value slot.
pub trait KvSlot {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Read-modify-write of one key. Backends that can be shared override this to
    /// make the whole cycle atomic.
    fn update(
        &mut self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> String,
    ) -> Result<String> {
        let current = self.get(key)?;
        let next = apply(current);
        self.set(key, &next)?;
        Ok(next)
    }
}

/// Moves `tag` to the front, drops older copies, keeps at most `limit` entries.
pub fn push_recent(tags: &[String], tag: &str, limit: usize) -> Vec<String> {
    std::iter::once(tag.to_string())
        .chain(tags.iter().filter(|t| *t != tag).cloned())
        .take(limit)
        .collect()
}

fn decode(raw: Option<&str>) -> Result<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

/// Most-recent-first list of manually added tags.
///
/// Storage problems never fail the caller: the list falls back to memory only and
/// the problem is reported through [`RecentTags::take_warnings`].
pub struct RecentTags<S: KvSlot> {
    slot: Option<S>,
    limit: usize,
    tags: Vec<String>,
    warnings: Vec<String>,
}

impl<S: KvSlot> RecentTags<S> {
    pub fn load(slot: S, limit: usize) -> Self {
        let mut recent = Self::detached(limit);
        match slot.get(RECENT_TAGS_KEY).and_then(|raw| decode(raw.as_deref())) {
            Ok(tags) => recent.tags = tags.into_iter().take(recent.limit).collect(),
            Err(err) => recent.warn(format!("recent tags unreadable: {err}")),
        }
        recent.slot = Some(slot);
        recent
    }

    /// A list with no backing storage.
    pub fn detached(limit: usize) -> Self {
        Self {
            slot: None,
            limit: limit.max(1),
            tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_persistent(&self) -> bool {
        self.slot.is_some()
    }

    pub fn record(&mut self, tag: &str) -> &[String] {
        let limit = self.limit;
        let mut in_memory = push_recent(&self.tags, tag, limit);
        let mut decode_error = None;
        if let Some(slot) = self.slot.as_mut() {
            // Rebuild from what is stored, not from what was loaded at mount.
            let stored = slot.update(RECENT_TAGS_KEY, &mut |raw| {
                let current = decode(raw.as_deref()).unwrap_or_else(|err| {
                    decode_error = Some(err.to_string());
                    Vec::new()
                });
                let next = push_recent(&current, tag, limit);
                serde_json::to_string(&next).unwrap_or_else(|_| "[]".to_string())
            });
            match stored.and_then(|raw| decode(Some(&raw))) {
                Ok(tags) => in_memory = tags,
                Err(err) => self.warnings.push(format!("recent tags not saved: {err}")),
            }
        }
        if let Some(err) = decode_error {
            self.warn(format!("recent tags were unreadable and have been reset: {err}"));
        }
        self.tags = in_memory;
        &self.tags
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Default)]
    struct MemoryKv {
        values: HashMap<String, String>,
    }

    impl MemoryKv {
        fn new() -> Self {
            Self::default()
        }
    }

    impl KvSlot for MemoryKv {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct BrokenKv;

    impl KvSlot for BrokenKv {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage unavailable")
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }

    #[test]
    fn records_most_recent_first_without_duplicates() {
        let mut recent = RecentTags::load(MemoryKv::new(), 3);
        for tag in ["a", "b", "a", "c"] {
            recent.record(tag);
        }
        assert_eq!(recent.tags(), ["c", "a", "b"]);
    }

    #[test]
    fn truncates_to_limit() {
        let mut recent = RecentTags::load(MemoryKv::new(), DEFAULT_RECENT_LIMIT);
        for idx in 0..15 {
            recent.record(&format!("tag{idx}"));
        }
        assert_eq!(recent.tags().len(), DEFAULT_RECENT_LIMIT);
        assert_eq!(recent.tags()[0], "tag14");
        assert_eq!(recent.tags()[9], "tag5");
    }

    #[test]
    fn persists_as_json_array_in_fixed_slot() {
        let mut slot = MemoryKv::new();
        slot.set(RECENT_TAGS_KEY, r#"["x","y"]"#).unwrap();
        let mut recent = RecentTags::load(slot, 10);
        assert_eq!(recent.tags(), ["x", "y"]);
        recent.record("y");
        let slot = recent.slot.as_ref().expect("slot");
        assert_eq!(
            slot.get(RECENT_TAGS_KEY).unwrap().as_deref(),
            Some(r#"["y","x"]"#)
        );
    }

    #[test]
    fn record_merges_with_concurrent_writes() {
        let mut recent = RecentTags::load(MemoryKv::new(), 10);
        recent.record("a");
        // Another writer replaced the slot after this list was loaded.
        if let Some(slot) = recent.slot.as_mut() {
            slot.set(RECENT_TAGS_KEY, r#"["z","a"]"#).unwrap();
        }
        recent.record("b");
        assert_eq!(recent.tags(), ["b", "z", "a"]);
    }

    #[test]
    fn broken_storage_degrades_to_memory() {
        let mut recent = RecentTags::load(BrokenKv, 10);
        assert!(recent.tags().is_empty());
        assert_eq!(recent.take_warnings().len(), 1);
        recent.record("a");
        recent.record("b");
        assert_eq!(recent.tags(), ["b", "a"]);
        let warnings = recent.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("not saved"));
    }

    #[test]
    fn corrupt_slot_is_reset() {
        let mut slot = MemoryKv::new();
        slot.set(RECENT_TAGS_KEY, "not json").unwrap();
        let mut recent = RecentTags::load(slot, 10);
        assert!(recent.tags().is_empty());
        recent.record("a");
        assert_eq!(recent.tags(), ["a"]);
        let warnings = recent.take_warnings();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn detached_list_is_memory_only() {
        let mut recent: RecentTags<MemoryKv> = RecentTags::detached(2);
        assert!(!recent.is_persistent());
        recent.record("a");
        recent.record("b");
        recent.record("c");
        assert_eq!(recent.tags(), ["c", "b"]);
        assert!(recent.take_warnings().is_empty());
    }
}
