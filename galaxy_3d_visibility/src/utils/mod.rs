//! Small data-structure helpers shared by the culling module.

mod slot_allocator;

pub use slot_allocator::{Slot, SlotAllocator};
