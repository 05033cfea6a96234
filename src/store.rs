//! Per-run identity registries and the guide data store.
//!
//! Each guide-source run owns one [`GuideStore`]: a set of find-or-create
//! keyed registries for every entity kind. A registry is a pure mapping —
//! the first write for a key wins and re-use of the same key never
//! second-guesses it. Stores for distinct source ids are independent;
//! finished stores are published through the process-wide [`StoreRegistry`]
//! with last-writer-wins semantics per key.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::keywords::KeywordIndex;
use crate::model::{
    GuideImage, ImageId, Lineup, Person, PersonId, Program, ProgramId, SeriesId, SeriesInfo,
    Service, ServiceId,
};

/// Generic find-or-create keyed store: an insertion-ordered arena plus a
/// key index. Scoped to one run; not designed for concurrent writers.
#[derive(Debug, Clone, Serialize)]
pub struct Registry<T> {
    #[serde(skip)]
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Return the arena slot for `key`, constructing the entity with
    /// `factory` on first sight. The factory runs only for unseen keys.
    pub fn get_or_insert(&mut self, key: &str, factory: impl FnOnce() -> T) -> usize {
        if let Some(&slot) = self.index.get(key) {
            return slot;
        }
        let slot = self.items.len();
        self.items.push(factory());
        self.index.insert(key.to_string(), slot);
        slot
    }

    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, slot: usize) -> &T {
        &self.items[slot]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut T {
        &mut self.items[slot]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// The normalized output of one guide-source run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GuideStore {
    pub source_id: i32,
    lineups: Registry<Lineup>,
    services: Registry<Service>,
    programs: Registry<Program>,
    persons: Registry<Person>,
    images: Registry<GuideImage>,
    series: Registry<SeriesInfo>,
    pub keyword_groups: KeywordIndex,
}

impl GuideStore {
    pub fn new(source_id: i32) -> Self {
        Self {
            source_id,
            ..Default::default()
        }
    }

    pub fn find_or_create_lineup(&mut self, name: &str, display_name: &str) -> usize {
        self.lineups.get_or_insert(name, || Lineup {
            name: name.to_string(),
            display_name: display_name.to_string(),
            channels: Vec::new(),
        })
    }

    pub fn find_or_create_service(&mut self, key: &str) -> ServiceId {
        let source_id = self.source_id;
        ServiceId(self.services.get_or_insert(key, || Service {
            key: key.to_string(),
            source_id,
            call_sign: String::new(),
            name: String::new(),
            logo: None,
            logo_url: None,
            schedule: Vec::new(),
        }))
    }

    pub fn find_or_create_program(&mut self, uid: &str) -> ProgramId {
        let source_id = self.source_id;
        ProgramId(self.programs.get_or_insert(uid, || Program {
            uid: uid.to_string(),
            source_id,
            details: None,
        }))
    }

    pub fn find_or_create_person(&mut self, name: &str) -> PersonId {
        PersonId(self.persons.get_or_insert(name, || Person {
            name: name.to_string(),
        }))
    }

    pub fn find_or_create_guide_image(&mut self, uri: &str) -> ImageId {
        ImageId(self.images.get_or_insert(uri, || GuideImage {
            uri: uri.to_string(),
        }))
    }

    pub fn find_or_create_series_info(&mut self, key: &str) -> SeriesId {
        SeriesId(self.series.get_or_insert(key, || SeriesInfo {
            key: key.to_string(),
            title: String::new(),
        }))
    }

    pub fn lineup(&self, slot: usize) -> &Lineup {
        self.lineups.get(slot)
    }

    pub fn lineup_mut(&mut self, slot: usize) -> &mut Lineup {
        self.lineups.get_mut(slot)
    }

    pub fn lineups(&self) -> impl Iterator<Item = &Lineup> {
        self.lineups.iter()
    }

    pub fn service(&self, id: ServiceId) -> &Service {
        self.services.get(id.0)
    }

    pub fn service_mut(&mut self, id: ServiceId) -> &mut Service {
        self.services.get_mut(id.0)
    }

    pub fn service_by_key(&self, key: &str) -> Option<&Service> {
        self.services.lookup(key).map(|slot| self.services.get(slot))
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn program(&self, id: ProgramId) -> &Program {
        self.programs.get(id.0)
    }

    pub fn program_mut(&mut self, id: ProgramId) -> &mut Program {
        self.programs.get_mut(id.0)
    }

    pub fn program_by_uid(&self, uid: &str) -> Option<&Program> {
        self.programs.lookup(uid).map(|slot| self.programs.get(slot))
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn person(&self, id: PersonId) -> &Person {
        self.persons.get(id.0)
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn image(&self, id: ImageId) -> &GuideImage {
        self.images.get(id.0)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn series_info(&self, id: SeriesId) -> &SeriesInfo {
        self.series.get(id.0)
    }

    pub fn series_info_mut(&mut self, id: SeriesId) -> &mut SeriesInfo {
        self.series.get_mut(id.0)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

/// Process-wide registry of published stores, keyed by guide-source id.
///
/// Publishing is atomic per key and last-writer-wins; readers hold a cheap
/// `Arc` snapshot. This is the only cross-run coordination point.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    inner: RwLock<HashMap<i32, Arc<GuideStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a finished store for its source id, replacing any prior run.
    pub fn set(&self, store: GuideStore) -> Arc<GuideStore> {
        let arc = Arc::new(store);
        self.inner
            .write()
            .expect("store registry poisoned")
            .insert(arc.source_id, Arc::clone(&arc));
        arc
    }

    pub fn get(&self, source_id: i32) -> Option<Arc<GuideStore>> {
        self.inner
            .read()
            .expect("store registry poisoned")
            .get(&source_id)
            .cloned()
    }

    pub fn remove(&self, source_id: i32) -> Option<Arc<GuideStore>> {
        self.inner
            .write()
            .expect("store registry poisoned")
            .remove(&source_id)
    }

    pub fn source_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .inner
            .read()
            .expect("store registry poisoned")
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_is_idempotent() {
        let mut reg: Registry<String> = Registry::default();
        let a = reg.get_or_insert("k", || "first".to_string());
        let b = reg.get_or_insert("k", || "second".to_string());
        assert_eq!(a, b);
        assert_eq!(reg.get(a), "first");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn factory_runs_only_for_unseen_keys() {
        let mut reg: Registry<u32> = Registry::default();
        let mut calls = 0;
        reg.get_or_insert("a", || {
            calls += 1;
            1
        });
        reg.get_or_insert("a", || {
            calls += 1;
            2
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn service_identity_is_stable_within_a_run() {
        let mut store = GuideStore::new(7);
        let a = store.find_or_create_service("7-hbo");
        let b = store.find_or_create_service("7-hbo");
        assert_eq!(a, b);
        assert_eq!(store.service_count(), 1);
        assert_eq!(store.service(a).source_id, 7);
    }

    #[test]
    fn person_dedup_by_exact_name() {
        let mut store = GuideStore::new(1);
        let a = store.find_or_create_person("Jane Doe");
        let b = store.find_or_create_person("Jane Doe");
        let c = store.find_or_create_person("jane doe");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.person_count(), 2);
    }

    #[test]
    fn registry_publish_last_writer_wins() {
        let reg = StoreRegistry::new();
        let mut first = GuideStore::new(3);
        first.find_or_create_service("3-a");
        reg.set(first);

        let second = GuideStore::new(3);
        reg.set(second);

        let current = reg.get(3).unwrap();
        assert_eq!(current.service_count(), 0);
        assert_eq!(reg.source_ids(), vec![3]);
        assert!(reg.get(4).is_none());
    }
}
