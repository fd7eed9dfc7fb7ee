//! Instance cache of an [Injector](crate::injector::Injector). A missing entry means the dependency
//! was never requested, [CacheSlot::InProgress] marks a dependency under construction and
//! [CacheSlot::Done] holds the finished singleton.

use crate::instance_provider::InstanceAnyPtr;
use crate::key::DependencyKey;
use fxhash::FxHashMap;
use parking_lot::RwLock;

#[derive(Clone, Debug)]
pub(crate) enum CacheSlot {
    InProgress,
    Done(InstanceAnyPtr),
}

/// Map of cached instances. Reads and writes hold the inner lock only for the duration of a map
/// operation; serializing construction is up to the owner.
#[derive(Debug, Default)]
pub(crate) struct InstanceCache {
    slots: RwLock<FxHashMap<DependencyKey, CacheSlot>>,
}

impl InstanceCache {
    pub(crate) fn with_instance(key: DependencyKey, instance: InstanceAnyPtr) -> Self {
        let cache = Self::default();
        cache.store_instance(key, instance);
        cache
    }

    /// Returns a finished instance, if present.
    pub(crate) fn instance(&self, key: &DependencyKey) -> Option<InstanceAnyPtr> {
        match self.slots.read().get(key) {
            Some(CacheSlot::Done(instance)) => Some(instance.clone()),
            _ => None,
        }
    }

    pub(crate) fn slot(&self, key: &DependencyKey) -> Option<CacheSlot> {
        self.slots.read().get(key).cloned()
    }

    pub(crate) fn mark_in_progress(&self, key: DependencyKey) {
        self.slots.write().insert(key, CacheSlot::InProgress);
    }

    pub(crate) fn store_instance(&self, key: DependencyKey, instance: InstanceAnyPtr) {
        self.slots.write().insert(key, CacheSlot::Done(instance));
    }

    /// Removes the in-progress marker for given key. Finished instances are never removed.
    pub(crate) fn clear_in_progress(&self, key: &DependencyKey) {
        let mut slots = self.slots.write();
        if matches!(slots.get(key), Some(CacheSlot::InProgress)) {
            slots.remove(key);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| matches!(slot, CacheSlot::Done(_)))
            .count()
    }
}
