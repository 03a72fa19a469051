/// A slot index plus the generation it was issued at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub index: u32,
    pub generation: u32,
}

/// Outcome of an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub slot: Slot,
    /// `true` when the index is past the previous high water mark,
    /// i.e. the backing arrays must grow by one.
    pub fresh: bool,
}

/// Allocates and recycles generation-tagged `u32` slot indices.
///
/// Backs the dense AABB/result arrays of the registry: a slot index is
/// either live, waiting in the free list, or beyond the high water mark.
/// Each slot carries a generation that is bumped whenever the slot is
/// freed (or the allocator is cleared), so a handle issued for an earlier
/// occupant can be told apart from the current one.
///
/// Recycling is LIFO: `free` pushes to the back, `alloc` pops from the back.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new();
/// let a = alloc.alloc().slot;  // index 0, generation 0
/// alloc.free(a);                // index 0 now at generation 1
/// let b = alloc.alloc().slot;  // index 0, generation 1 (recycled)
/// assert!(!alloc.is_live(a));
/// ```
pub struct SlotAllocator {
    free_list: Vec<u32>,
    /// Generation per index, kept across `clear` so old handles stay stale
    generations: Vec<u32>,
    live: Vec<bool>,
    next_id: u32,
    len: u32,
}

impl SlotAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            generations: Vec::new(),
            live: Vec::new(),
            next_id: 0,
            len: 0,
        }
    }

    /// Create an allocator with room for `capacity` slots before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free_list: Vec::new(),
            generations: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            next_id: 0,
            len: 0,
        }
    }

    /// Allocate the next available slot
    pub fn alloc(&mut self) -> Allocation {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return Allocation {
                slot: Slot { index, generation: self.generations[index as usize] },
                fresh: false,
            };
        }

        let index = self.next_id;
        self.next_id += 1;
        let i = index as usize;
        if i == self.generations.len() {
            self.generations.push(0);
            self.live.push(true);
        } else {
            self.live[i] = true;
        }

        Allocation {
            slot: Slot { index, generation: self.generations[i] },
            fresh: true,
        }
    }

    /// Return a live slot to the pool for reuse.
    ///
    /// Returns `false` (and changes nothing) if the slot is not live.
    pub fn free(&mut self, slot: Slot) -> bool {
        if !self.is_live(slot) {
            return false;
        }
        let i = slot.index as usize;
        self.live[i] = false;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.len -= 1;
        self.free_list.push(slot.index);
        true
    }

    /// Whether `slot` refers to the current occupant of a live index
    pub fn is_live(&self, slot: Slot) -> bool {
        let i = slot.index as usize;
        slot.index < self.next_id && self.live[i] && self.generations[i] == slot.generation
    }

    /// Current generation of `index`, if it was ever issued
    pub fn generation(&self, index: u32) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }

    /// Forget every slot. Every previously issued slot becomes stale.
    pub fn clear(&mut self) {
        for i in 0..self.next_id as usize {
            self.generations[i] = self.generations[i].wrapping_add(1);
            self.live[i] = false;
        }
        self.free_list.clear();
        self.next_id = 0;
        self.len = 0;
    }

    /// Highest index ever allocated + 1 (since the last `clear`).
    ///
    /// This is the length the backing arrays must have.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no slots are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of indices waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
