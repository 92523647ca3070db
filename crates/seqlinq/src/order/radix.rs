//! Stable least-significant-byte-first radix sort over index arrays.
//!
//! The sorts return a permutation of `0..keys.len()`; elements are never
//! moved here. Every pass is a stable counting scatter, so indices with equal
//! keys keep their input order.

const BUCKETS: usize = 256;

/// Sorts indices by 32-bit keys: four byte passes.
pub(crate) fn sort_u32(keys: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    let mut scratch = vec![0; keys.len()];
    for shift in (0..32).step_by(8) {
        byte_pass(&mut order, &mut scratch, |i| (keys[i] >> shift) as u8);
    }
    order
}

/// Sorts indices by 64-bit keys: the low word's four byte passes, then the
/// high word's.
pub(crate) fn sort_u64(keys: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    let mut scratch = vec![0; keys.len()];
    for shift in (0..64).step_by(8) {
        byte_pass(&mut order, &mut scratch, |i| (keys[i] >> shift) as u8);
    }
    order
}

/// Maps a signed millisecond value onto `u64` preserving order.
pub(crate) fn timestamp_key(millis: i64) -> u64 {
    (millis as u64) ^ (1 << 63)
}

fn byte_pass(order: &mut Vec<usize>, scratch: &mut Vec<usize>, digit: impl Fn(usize) -> u8) {
    let mut counts = [0usize; BUCKETS];
    for &i in order.iter() {
        counts[digit(i) as usize] += 1;
    }
    // A byte shared by every key leaves the order unchanged.
    if counts.iter().any(|&c| c == order.len()) {
        return;
    }

    let mut offsets = [0usize; BUCKETS];
    let mut running = 0;
    for (offset, count) in offsets.iter_mut().zip(counts) {
        *offset = running;
        running += count;
    }

    for &i in order.iter() {
        let bucket = &mut offsets[digit(i) as usize];
        scratch[*bucket] = i;
        *bucket += 1;
    }
    std::mem::swap(order, scratch);
}
