//! Fixed-capacity ring store for point records.
//!
//! The record at logical index `i` (oldest first) lives at physical slot
//! `(start + i) % capacity`. Once full, every appended record evicts the
//! oldest one, so the ring always holds the most recent `len()` records in
//! arrival order.
//!
//! The ring has no interior synchronization. It is owned by the render
//! context, which is the only writer and the only reader of its snapshot.

use crate::error::{CoreError, Result};
use crate::point::PointRecord;

/// What a single `append` did to the ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Records accepted from the batch.
    pub written: usize,
    /// Previously retained records that were overwritten.
    pub evicted: usize,
}

pub struct PointBuffer {
    slots: Vec<PointRecord>,
    start: usize,
    count: usize,
}

impl PointBuffer {
    /// Allocates backing storage for `capacity` records.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity);
        }
        Ok(Self {
            slots: vec![PointRecord::default(); capacity],
            start: 0,
            count: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Physical slot of the oldest record.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Appends a batch, overwriting the oldest records once the ring is full.
    ///
    /// Free slots are filled first; whatever does not fit overwrites from
    /// `start` onward, advancing `start` one slot per record. An empty batch
    /// is a no-op.
    pub fn append(&mut self, batch: &[PointRecord]) -> AppendOutcome {
        let n = batch.len();
        if n == 0 {
            return AppendOutcome::default();
        }

        let cap = self.capacity();
        let free = cap - self.count;
        let tail = (self.start + self.count) % cap;

        if n <= free {
            self.write_wrapping(tail, batch);
            self.count += n;
            return AppendOutcome {
                written: n,
                evicted: 0,
            };
        }

        let (fill, rest) = batch.split_at(free);
        if !fill.is_empty() {
            self.write_wrapping(tail, fill);
            self.count = cap;
        }
        self.overwrite_oldest(rest);

        AppendOutcome {
            written: n,
            evicted: rest.len().min(cap),
        }
    }

    /// Full-ring path: each record lands on `start` and advances it. Only
    /// the final `capacity` records can survive, so earlier ones are skipped.
    fn overwrite_oldest(&mut self, records: &[PointRecord]) {
        let cap = self.capacity();
        let n = records.len();
        let skipped = n.saturating_sub(cap);
        let survivors = &records[skipped..];

        let first_slot = (self.start + skipped) % cap;
        self.write_wrapping(first_slot, survivors);
        self.start = (self.start + n) % cap;
    }

    /// Copies `records` (at most `capacity`) into consecutive slots from
    /// `slot`, wrapping at the end of storage.
    fn write_wrapping(&mut self, slot: usize, records: &[PointRecord]) {
        debug_assert!(records.len() <= self.capacity());
        let head_len = records.len().min(self.capacity() - slot);
        let (head, wrapped) = records.split_at(head_len);
        self.slots[slot..slot + head_len].copy_from_slice(head);
        self.slots[..wrapped.len()].copy_from_slice(wrapped);
    }

    /// Returns the retained records as two contiguous runs, oldest first.
    pub fn as_slices(&self) -> (&[PointRecord], &[PointRecord]) {
        let cap = self.capacity();
        let head_len = self.count.min(cap - self.start);
        let head = &self.slots[self.start..self.start + head_len];
        let wrapped = &self.slots[..self.count - head_len];
        (head, wrapped)
    }

    /// Record at logical index `i` (0 = oldest).
    pub fn get(&self, i: usize) -> Option<&PointRecord> {
        (i < self.count).then(|| &self.slots[(self.start + i) % self.capacity()])
    }

    /// Ordered copy of the retained records, ready for upload.
    pub fn snapshot(&self) -> Vec<PointRecord> {
        let mut out = Vec::with_capacity(self.count);
        self.snapshot_into(&mut out);
        out
    }

    /// Like [`snapshot`](Self::snapshot) but reuses `out`'s allocation.
    pub fn snapshot_into(&self, out: &mut Vec<PointRecord>) {
        let (head, wrapped) = self.as_slices();
        out.clear();
        out.reserve(self.count);
        out.extend_from_slice(head);
        out.extend_from_slice(wrapped);
    }

    /// Drops all records. Storage stays allocated.
    pub fn reset(&mut self) {
        self.start = 0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records tagged with a sequence number in `intensity`.
    fn seq(range: std::ops::Range<u32>) -> Vec<PointRecord> {
        range
            .map(|i| PointRecord::new([i as f32, 0.0, 0.0], i as f32, [0.0, 0.0, 1.0]))
            .collect()
    }

    fn tags(records: &[PointRecord]) -> Vec<u32> {
        records.iter().map(|r| r.intensity as u32).collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(PointBuffer::new(0), Err(CoreError::ZeroCapacity)));
    }

    #[test]
    fn append_within_free_space_preserves_order() {
        let mut ring = PointBuffer::new(10).unwrap();
        let out = ring.append(&seq(0..4));
        assert_eq!(out, AppendOutcome { written: 4, evicted: 0 });
        ring.append(&seq(4..7));
        assert_eq!(ring.len(), 7);
        assert_eq!(ring.start(), 0);
        assert_eq!(tags(&ring.snapshot()), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn append_overflowing_free_space_evicts_oldest() {
        let mut ring = PointBuffer::new(5).unwrap();
        ring.append(&seq(0..3));
        let out = ring.append(&seq(3..7));
        assert_eq!(out, AppendOutcome { written: 4, evicted: 2 });
        assert!(ring.is_full());
        assert_eq!(ring.start(), 2);
        assert_eq!(tags(&ring.snapshot()), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn append_into_full_ring_wraps_start() {
        let mut ring = PointBuffer::new(4).unwrap();
        ring.append(&seq(0..4));
        ring.append(&seq(4..7));
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.start(), 3);
        assert_eq!(tags(&ring.snapshot()), vec![3, 4, 5, 6]);

        let (head, wrapped) = ring.as_slices();
        assert_eq!(tags(head), vec![3]);
        assert_eq!(tags(wrapped), vec![4, 5, 6]);
    }

    #[test]
    fn empty_batch_is_noop() {
        let mut ring = PointBuffer::new(3).unwrap();
        ring.append(&seq(0..2));
        assert_eq!(ring.append(&[]), AppendOutcome::default());
        assert_eq!(ring.len(), 2);
        assert_eq!(tags(&ring.snapshot()), vec![0, 1]);
    }

    #[test]
    fn oversized_batch_keeps_only_its_tail() {
        for prefill in [0u32, 2, 7] {
            let mut ring = PointBuffer::new(7).unwrap();
            ring.append(&seq(1000..1000 + prefill));
            ring.append(&seq(0..20));
            assert_eq!(ring.len(), 7);
            assert_eq!(tags(&ring.snapshot()), (13..20).collect::<Vec<_>>());
        }
    }

    #[test]
    fn count_and_order_hold_for_mixed_batches() {
        let cap = 13;
        let mut ring = PointBuffer::new(cap).unwrap();
        let sizes = [0usize, 1, 5, 12, 3, 13, 0, 27, 2, 9, 14, 1];
        let mut all = Vec::new();
        let mut next = 0u32;
        for &n in &sizes {
            let batch = seq(next..next + n as u32);
            next += n as u32;
            all.extend_from_slice(&batch);
            ring.append(&batch);

            assert_eq!(ring.len(), cap.min(all.len()));
            let expected = &all[all.len() - ring.len()..];
            assert_eq!(tags(&ring.snapshot()), tags(expected));
            for (i, r) in expected.iter().enumerate() {
                assert_eq!(ring.get(i), Some(r));
            }
            assert_eq!(ring.get(ring.len()), None);
        }
    }

    #[test]
    fn second_full_batch_evicts_first() {
        const CAP: usize = 850_000;
        let mut ring = PointBuffer::new(CAP).unwrap();
        let first = seq(0..CAP as u32);
        let second = seq(CAP as u32..2 * CAP as u32);
        ring.append(&first);
        ring.append(&second);
        assert_eq!(ring.len(), CAP);
        assert_eq!(ring.snapshot(), second);
    }

    #[test]
    fn snapshot_into_reuses_buffer_and_reset_clears() {
        let mut ring = PointBuffer::new(3).unwrap();
        ring.append(&seq(0..5));
        let mut out = seq(100..110);
        ring.snapshot_into(&mut out);
        assert_eq!(tags(&out), vec![2, 3, 4]);

        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(ring.start(), 0);
        ring.append(&seq(7..8));
        assert_eq!(tags(&ring.snapshot()), vec![7]);
    }
}
