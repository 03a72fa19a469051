/// Handle-based storage for the AABBs taking part in culling.
///
/// The registry owns two parallel dense arrays, `aabbs` and `results`,
/// where index `i` of one always belongs to index `i` of the other. Slots
/// are handed out as generation-tagged `AabbHandle`s and recycled LIFO.
///
/// Misusing a handle (out of range, released, or issued before a `clear`)
/// is a programmer error: the plain accessors log it and panic with the
/// offending index and the slot count. The `try_*` variants return the
/// same condition as an `Error` instead.
///
/// The registry is not meant for concurrent mutation. Allocate, release and
/// cull from one owning thread; share it through `SharedAabbRegistry` when
/// scoped handles (`CullingEntry`) need to reach it.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::utils::{Slot, SlotAllocator};
use super::aabb::Aabb;
use super::kernel::VISIBLE;

/// Registry shared between its owner and scoped handles
pub type SharedAabbRegistry = Arc<Mutex<AabbRegistry>>;

/// Reference to one registry slot
///
/// Carries the generation the slot had when the handle was issued; any
/// access after the slot is released or cleared is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AabbHandle {
    index: u32,
    generation: u32,
}

impl AabbHandle {
    /// Index into the registry's dense arrays
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn slot(&self) -> Slot {
        Slot { index: self.index, generation: self.generation }
    }
}

impl From<Slot> for AabbHandle {
    fn from(slot: Slot) -> Self {
        Self { index: slot.index, generation: slot.generation }
    }
}

pub struct AabbRegistry {
    aabbs: Vec<Aabb>,
    results: Vec<i32>,
    slots: SlotAllocator,
}

impl AabbRegistry {
    /// Slots reserved up front by `new()`
    pub const DEFAULT_CAPACITY: usize = 65536;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            aabbs: Vec::with_capacity(capacity),
            results: Vec::with_capacity(capacity),
            slots: SlotAllocator::with_capacity(capacity),
        }
    }

    /// Wrap the registry for use by `CullingEntry`
    pub fn into_shared(self) -> SharedAabbRegistry {
        Arc::new(Mutex::new(self))
    }

    // ===== ALLOCATION =====

    /// Allocate a slot holding `aabb`, with its result reset to visible.
    pub fn allocate(&mut self, aabb: Aabb) -> AabbHandle {
        let allocation = self.slots.alloc();
        let index = allocation.slot.index as usize;

        if allocation.fresh {
            self.aabbs.push(aabb);
            self.results.push(VISIBLE);
        } else {
            self.aabbs[index] = aabb;
            self.results[index] = VISIBLE;
        }

        debug_assert_eq!(self.aabbs.len(), self.results.len());
        debug_assert_eq!(self.aabbs.len(), self.slots.high_water_mark() as usize);
        allocation.slot.into()
    }

    /// Allocate a slot for the caller to fill in through `aabb_mut`.
    ///
    /// The slot starts as `Aabb::ZERO`, never as a previous occupant's box.
    pub fn allocate_empty(&mut self) -> AabbHandle {
        self.allocate(Aabb::ZERO)
    }

    /// Release a slot back to the free list.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn release(&mut self, handle: AabbHandle) {
        if let Err(error) = self.try_release(handle) {
            Self::contract_violation(error);
        }
    }

    /// Release a slot, reporting misuse as an error.
    pub fn try_release(&mut self, handle: AabbHandle) -> Result<()> {
        self.validate(handle)?;
        self.slots.free(handle.slot());
        Ok(())
    }

    /// Drop every AABB, result and free slot. All outstanding handles
    /// become stale.
    pub fn clear(&mut self) {
        crate::engine_debug!(
            "galaxy3d::AabbRegistry",
            "Clearing {} slots ({} live)",
            self.aabbs.len(),
            self.slots.len()
        );
        self.aabbs.clear();
        self.results.clear();
        self.slots.clear();
    }

    // ===== ACCESS =====

    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn aabb(&self, handle: AabbHandle) -> &Aabb {
        match self.validate(handle) {
            Ok(index) => &self.aabbs[index],
            Err(error) => Self::contract_violation(error),
        }
    }

    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn aabb_mut(&mut self, handle: AabbHandle) -> &mut Aabb {
        match self.validate(handle) {
            Ok(index) => &mut self.aabbs[index],
            Err(error) => Self::contract_violation(error),
        }
    }

    /// Replace the stored box.
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn set_aabb(&mut self, handle: AabbHandle, aabb: Aabb) {
        *self.aabb_mut(handle) = aabb;
    }

    /// Result of the latest culling pass (`0` visible, nonzero culled).
    ///
    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn result(&self, handle: AabbHandle) -> i32 {
        match self.try_result(handle) {
            Ok(result) => result,
            Err(error) => Self::contract_violation(error),
        }
    }

    /// # Panics
    ///
    /// Panics if the handle is out of range or stale.
    pub fn is_culled(&self, handle: AabbHandle) -> bool {
        self.result(handle) != VISIBLE
    }

    pub fn try_aabb(&self, handle: AabbHandle) -> Result<&Aabb> {
        let index = self.validate(handle)?;
        Ok(&self.aabbs[index])
    }

    pub fn try_aabb_mut(&mut self, handle: AabbHandle) -> Result<&mut Aabb> {
        let index = self.validate(handle)?;
        Ok(&mut self.aabbs[index])
    }

    pub fn try_result(&self, handle: AabbHandle) -> Result<i32> {
        let index = self.validate(handle)?;
        Ok(self.results[index])
    }

    /// Whether `handle` still refers to a live slot
    pub fn contains(&self, handle: AabbHandle) -> bool {
        self.validate(handle).is_ok()
    }

    // ===== BULK VIEW =====

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.slots.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Length of the dense arrays (live + released slots)
    pub fn slot_count(&self) -> usize {
        self.aabbs.len()
    }

    /// Number of released slots waiting for reuse
    pub fn free_count(&self) -> usize {
        self.slots.free_count()
    }

    /// Every slot's box in index order, released slots included
    pub fn aabbs(&self) -> &[Aabb] {
        &self.aabbs
    }

    /// Every slot's result in index order, released slots included
    pub fn results(&self) -> &[i32] {
        &self.results
    }

    /// Number of culled slots in the latest pass (released slots included)
    pub fn culled_count(&self) -> usize {
        self.results.iter().filter(|&&r| r != VISIBLE).count()
    }

    /// Split borrow for a culling pass: boxes are read, results written.
    pub(crate) fn culling_buffers(&mut self) -> (&[Aabb], &mut [i32]) {
        (&self.aabbs, &mut self.results)
    }

    // ===== VALIDATION =====

    fn validate(&self, handle: AabbHandle) -> Result<usize> {
        let index = handle.index();
        if index >= self.aabbs.len() {
            return Err(Error::InvalidHandle { index, slot_count: self.aabbs.len() });
        }
        if !self.slots.is_live(handle.slot()) {
            return Err(Error::StaleHandle {
                index,
                generation: handle.generation,
                current_generation: self.slots.generation(handle.index).unwrap_or(0),
            });
        }
        Ok(index)
    }

    #[track_caller]
    fn contract_violation(error: Error) -> ! {
        crate::engine_error!("galaxy3d::AabbRegistry", "Contract violation: {}", error);
        panic!("{}", error);
    }
}

impl Default for AabbRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
