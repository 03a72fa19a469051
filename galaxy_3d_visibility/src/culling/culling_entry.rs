/// Scoped registry slot.
///
/// A `CullingEntry` allocates its slot on construction and releases it when
/// dropped. It keeps a clone of the shared registry, so the registry lives at
/// least as long as its entries.

use std::sync::{Arc, MutexGuard};
use crate::error::{Error, Result};
use super::aabb::Aabb;
use super::registry::{AabbHandle, AabbRegistry, SharedAabbRegistry};

pub struct CullingEntry {
    registry: SharedAabbRegistry,
    handle: AabbHandle,
}

impl CullingEntry {
    /// Allocate a slot holding `aabb`.
    pub fn new(registry: &SharedAabbRegistry, aabb: Aabb) -> Result<Self> {
        let handle = lock(registry)?.allocate(aabb);
        Ok(Self { registry: Arc::clone(registry), handle })
    }

    /// Allocate a zeroed slot, to be filled in with `set_aabb` or `update`.
    pub fn new_empty(registry: &SharedAabbRegistry) -> Result<Self> {
        let handle = lock(registry)?.allocate_empty();
        Ok(Self { registry: Arc::clone(registry), handle })
    }

    pub fn handle(&self) -> AabbHandle {
        self.handle
    }

    pub fn registry(&self) -> &SharedAabbRegistry {
        &self.registry
    }

    pub fn aabb(&self) -> Result<Aabb> {
        lock(&self.registry)?.try_aabb(self.handle).copied()
    }

    pub fn set_aabb(&self, aabb: Aabb) -> Result<()> {
        *lock(&self.registry)?.try_aabb_mut(self.handle)? = aabb;
        Ok(())
    }

    /// Edit the stored box in place while holding the registry lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut Aabb) -> R) -> Result<R> {
        let mut registry = lock(&self.registry)?;
        Ok(f(registry.try_aabb_mut(self.handle)?))
    }

    /// Result of the latest culling pass
    pub fn result(&self) -> Result<i32> {
        lock(&self.registry)?.try_result(self.handle)
    }

    pub fn is_culled(&self) -> Result<bool> {
        Ok(self.result()? != super::kernel::VISIBLE)
    }
}

impl Drop for CullingEntry {
    fn drop(&mut self) {
        let released = lock(&self.registry).and_then(|mut registry| registry.try_release(self.handle));
        if let Err(error) = released {
            crate::engine_warn!(
                "galaxy3d::CullingEntry",
                "Could not release slot {}: {}",
                self.handle.index(), error
            );
        }
    }
}

fn lock(registry: &SharedAabbRegistry) -> Result<MutexGuard<'_, AabbRegistry>> {
    registry.lock().map_err(|e| Error::LockPoisoned(e.to_string()))
}

#[cfg(test)]
#[path = "culling_entry_tests.rs"]
mod tests;
