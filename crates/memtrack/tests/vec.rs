use memtrack::TrackedVec;

#[test]
fn test_push_n_times_respects_capacity_bounds() {
    let n = 1000u32;
    let mut values = TrackedVec::new();
    for v in 0..n {
        values.push(v);
    }
    assert_eq!(values.len() as u32, n);
    assert!(values.capacity() as u32 >= n);
    // Doubling from 1 never overshoots the hysteresis bound.
    assert!(values.capacity() as u32 <= 2 * n);
}

#[test]
fn test_insert_then_remove_at_same_index_roundtrips() {
    let mut values = TrackedVec::new();
    for v in [10u32, 20, 30, 40] {
        values.push(v);
    }
    let before: Vec<u32> = values.iter().copied().collect();

    for index in 0..=values.len() {
        values.insert(index, 99);
        assert_eq!(values.len(), before.len() + 1);
        assert_eq!(values.remove(index), Some(99));
        let after: Vec<u32> = values.iter().copied().collect();
        assert_eq!(after, before);
    }
}

#[test]
fn test_out_of_range_insert_and_remove_are_noops() {
    let mut values = TrackedVec::new();
    for v in [1u32, 2, 3] {
        values.push(v);
    }
    let cap = values.capacity();

    values.insert(4, 9);
    assert_eq!(values.as_slice(), &[1, 2, 3]);
    assert_eq!(values.capacity(), cap);

    assert_eq!(values.remove(3), None);
    assert_eq!(values.remove(usize::MAX), None);
    assert_eq!(values.as_slice(), &[1, 2, 3]);
    assert_eq!(values.capacity(), cap);
}

#[test]
fn test_find_returns_lowest_matching_index() {
    let mut values = TrackedVec::new();
    for v in [7u32, 3, 7, 9] {
        values.push(v);
    }
    assert_eq!(values.find(&7), Some(0));
    assert_eq!(values.find(&9), Some(3));
    assert_eq!(values.find(&4), None);
}

#[test]
fn test_resize_then_shrink_keeps_prefix() {
    let mut values = TrackedVec::<u32>::with_len(4);
    for (index, slot) in values.iter_mut().enumerate() {
        *slot = index as u32;
    }
    values.resize(64);
    assert_eq!(values.len(), 64);
    assert_eq!(&values[..4], &[0, 1, 2, 3]);
    assert!(values[4..].iter().all(|&v| v == 0));

    values.resize(2);
    assert_eq!(values.as_slice(), &[0, 1]);
    assert!(values.capacity() >= values.len());
}

#[test]
fn test_nested_vec_elements_roundtrip() {
    let mut inner = TrackedVec::new();
    inner.push(5i64);
    let inner_addr = inner.as_ptr() as usize;

    let mut outer: TrackedVec<TrackedVec<i64>> = TrackedVec::new();
    outer.push(inner);
    assert_eq!(outer.len(), 1);
    assert_eq!(outer[0].as_slice(), &[5]);

    // Moving the element back out hands ownership to the caller.
    let inner = outer.remove(0).unwrap();
    assert_eq!(inner.as_ptr() as usize, inner_addr);
    assert_eq!(inner.as_slice(), &[5]);
}
