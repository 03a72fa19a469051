use glam::Vec3;
use super::*;

fn unit_box_at(x: f32) -> Aabb {
    Aabb::from_center_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5))
}

// ============================================================================
// Allocation
// ============================================================================

#[test]
fn test_allocate_stores_aabb_and_clears_result() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate(unit_box_at(3.0));

    assert_eq!(*registry.aabb(handle), unit_box_at(3.0));
    assert_eq!(registry.result(handle), 0);
    assert!(!registry.is_culled(handle));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.slot_count(), 1);
}

#[test]
fn test_handles_are_sequential_until_reuse() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handles: Vec<AabbHandle> = (0..3).map(|i| registry.allocate(unit_box_at(i as f32))).collect();
    let indices: Vec<usize> = handles.iter().map(|h| h.index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_allocate_empty_then_populate() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate_empty();
    assert_eq!(*registry.aabb(handle), Aabb::ZERO);

    *registry.aabb_mut(handle) = unit_box_at(7.0);
    assert_eq!(*registry.aabb(handle), unit_box_at(7.0));

    registry.set_aabb(handle, unit_box_at(8.0));
    assert_eq!(*registry.aabb(handle), unit_box_at(8.0));
}

#[test]
fn test_new_reserves_default_capacity() {
    let registry = AabbRegistry::new();
    assert!(registry.aabbs.capacity() >= AabbRegistry::DEFAULT_CAPACITY);
    assert!(registry.is_empty());
}

// ============================================================================
// Release and reuse
// ============================================================================

#[test]
fn test_release_then_reuse_same_index_with_new_data() {
    let mut registry = AabbRegistry::with_capacity(4);
    let old = registry.allocate(unit_box_at(1.0));
    registry.results[old.index()] = 1;
    registry.release(old);
    assert_eq!(registry.free_count(), 1);

    let new = registry.allocate(unit_box_at(2.0));
    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert_eq!(*registry.aabb(new), unit_box_at(2.0));
    assert_eq!(registry.result(new), 0);
    assert_eq!(registry.slot_count(), 1);
}

#[test]
fn test_allocate_empty_on_reused_slot_does_not_leak_old_box() {
    let mut registry = AabbRegistry::with_capacity(4);
    let old = registry.allocate(unit_box_at(1.0));
    registry.release(old);

    let new = registry.allocate_empty();
    assert_eq!(new.index(), old.index());
    assert_eq!(*registry.aabb(new), Aabb::ZERO);
}

#[test]
fn test_reuse_is_lifo() {
    let mut registry = AabbRegistry::with_capacity(4);
    let a = registry.allocate(unit_box_at(0.0));
    let _b = registry.allocate(unit_box_at(1.0));
    let c = registry.allocate(unit_box_at(2.0));
    registry.release(a);
    registry.release(c);

    assert_eq!(registry.allocate(unit_box_at(9.0)).index(), c.index());
    assert_eq!(registry.allocate(unit_box_at(9.0)).index(), a.index());
    assert_eq!(registry.allocate(unit_box_at(9.0)).index(), 3);
}

#[test]
fn test_arrays_stay_parallel() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handles: Vec<AabbHandle> = (0..10).map(|i| registry.allocate(unit_box_at(i as f32))).collect();
    for handle in handles.iter().step_by(3) {
        registry.release(*handle);
    }
    for i in 0..5 {
        registry.allocate(unit_box_at(100.0 + i as f32));
    }
    assert_eq!(registry.aabbs().len(), registry.results().len());
    assert_eq!(registry.slot_count(), 11);
    assert_eq!(registry.len(), 11);
}

// ============================================================================
// Handle validation
// ============================================================================

#[test]
fn test_stale_handle_is_detected() {
    let mut registry = AabbRegistry::with_capacity(4);
    let old = registry.allocate(unit_box_at(1.0));
    registry.release(old);
    let _new = registry.allocate(unit_box_at(2.0));

    assert!(!registry.contains(old));
    match registry.try_aabb(old) {
        Err(Error::StaleHandle { index, generation, current_generation }) => {
            assert_eq!(index, old.index());
            assert_eq!(generation, old.generation());
            assert_eq!(current_generation, old.generation() + 1);
        }
        other => panic!("expected StaleHandle, got {:?}", other),
    }
}

#[test]
fn test_double_release_is_an_error() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate(unit_box_at(1.0));
    assert!(registry.try_release(handle).is_ok());
    assert!(matches!(registry.try_release(handle), Err(Error::StaleHandle { .. })));
    assert_eq!(registry.free_count(), 1);
}

#[test]
fn test_out_of_range_handle_reports_index_and_size() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate(unit_box_at(1.0));
    registry.clear();

    assert_eq!(
        registry.try_result(handle),
        Err(Error::InvalidHandle { index: 0, slot_count: 0 })
    );
}

#[test]
#[should_panic(expected = "Invalid handle: index 0 >= slot count 0")]
fn test_access_after_clear_panics() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate(unit_box_at(1.0));
    registry.clear();
    registry.aabb(handle);
}

#[test]
#[should_panic(expected = "Stale handle")]
fn test_release_of_stale_handle_panics() {
    let mut registry = AabbRegistry::with_capacity(4);
    let handle = registry.allocate(unit_box_at(1.0));
    registry.release(handle);
    registry.release(handle);
}

#[test]
#[should_panic(expected = "Stale handle")]
fn test_handle_from_before_clear_panics_after_regrowth() {
    let mut registry = AabbRegistry::with_capacity(4);
    let before = registry.allocate(unit_box_at(1.0));
    registry.clear();
    let after = registry.allocate(unit_box_at(2.0));
    assert_eq!(after.index(), before.index());
    registry.result(before);
}

// ============================================================================
// clear() and bulk views
// ============================================================================

#[test]
fn test_clear_empties_everything() {
    let mut registry = AabbRegistry::with_capacity(4);
    let a = registry.allocate(unit_box_at(1.0));
    registry.allocate(unit_box_at(2.0));
    registry.release(a);

    registry.clear();

    assert!(registry.is_empty());
    assert_eq!(registry.slot_count(), 0);
    assert_eq!(registry.free_count(), 0);
    assert!(registry.aabbs().is_empty());
    assert!(registry.results().is_empty());
}

#[test]
fn test_culled_count_reads_results() {
    let mut registry = AabbRegistry::with_capacity(4);
    for i in 0..4 {
        registry.allocate(unit_box_at(i as f32));
    }
    let (_, results) = registry.culling_buffers();
    results[1] = 1;
    results[3] = 1;
    assert_eq!(registry.culled_count(), 2);
}

#[test]
fn test_shared_registry_round_trip() {
    let shared = AabbRegistry::with_capacity(4).into_shared();
    let handle = shared.lock().unwrap().allocate(unit_box_at(5.0));
    assert_eq!(*shared.lock().unwrap().aabb(handle), unit_box_at(5.0));
}
