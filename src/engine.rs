//! The owning value of a simulated disk: the FAT, the cluster allocator,
//! and the well-known root address, all as methods on one handle.

use crate::disk::{ClusterAddress, Disk};
use log::{debug, error, trace};

/// Index 1 is reserved for the root directory; index 0 is unused.
pub const ROOT_CLUSTER_INDEX: u32 = 1;

/// Owns one simulated disk's byte buffer and exposes the Allocator
/// operations as inherent methods. Multiple engines may coexist in one
/// process — each owns its own buffer, with no global or shared state.
pub struct Engine<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize> {
    disk: Disk<CLUSTER_BYTES, CLUSTER_COUNT>,
}

impl<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize> Engine<CLUSTER_BYTES, CLUSTER_COUNT> {
    /// Build and initialise a fresh disk: zeroed FAT, root directory at
    /// cluster 1 marked end-of-chain, cluster 1's data zeroed.
    pub fn new() -> Self {
        let mut engine = Self { disk: Disk::new() };
        engine.init();
        engine
    }

    fn init(&mut self) {
        for index in 0..CLUSTER_COUNT as u32 {
            self.disk.fat_set(index, ClusterAddress::NULL);
        }
        self.disk.fat_set(ROOT_CLUSTER_INDEX, ClusterAddress::EOC);
        self.disk.zero_cluster(ROOT_CLUSTER_INDEX);
        debug!("engine initialised: {CLUSTER_COUNT} clusters of {CLUSTER_BYTES} bytes");
    }

    pub fn root_address(&self) -> ClusterAddress {
        ClusterAddress::new(ROOT_CLUSTER_INDEX)
    }

    /// Read-only: a FAT slot's cluster address. Exposed beyond the crate
    /// for diagnostics (e.g. the demo shell's `disk` command).
    pub fn fat_get(&self, index: u32) -> ClusterAddress {
        self.disk.fat_get(index)
    }

    pub(crate) fn fat_set(&mut self, index: u32, value: ClusterAddress) {
        self.disk.fat_set(index, value);
    }

    /// Read-only view of a cluster's payload bytes, for the same reason
    /// as `fat_get`.
    pub fn cluster_bytes(&self, index: u32) -> &[u8] {
        self.disk.cluster_bytes(index)
    }

    pub(crate) fn cluster_bytes_mut(&mut self, index: u32) -> &mut [u8] {
        self.disk.cluster_bytes_mut(index)
    }

    /// First-fit linear scan from index 1 for a free FAT slot. Marks it
    /// EOC and zeroes its payload before returning it.
    ///
    /// Exhaustion is fatal: the disk is sized by the caller, and running
    /// out is a configuration error, not a recoverable runtime condition.
    pub fn allocate_cluster(&mut self) -> ClusterAddress {
        for index in ROOT_CLUSTER_INDEX..CLUSTER_COUNT as u32 {
            if self.disk.fat_get(index).is_null() {
                self.disk.fat_set(index, ClusterAddress::EOC);
                self.disk.zero_cluster(index);
                trace!("allocated cluster {index}");
                return ClusterAddress::new(index);
            }
        }
        error!("cluster pool exhausted: all {CLUSTER_COUNT} clusters allocated");
        panic!("cluster pool exhausted");
    }

    /// Walk the chain from `start`, nulling each visited FAT slot, until
    /// an EOC terminator is processed. `start == NULL` is a no-op.
    pub fn free_chain(&mut self, start: ClusterAddress) {
        if start.is_null() {
            return;
        }
        let mut current = start;
        loop {
            let next = self.disk.fat_get(current.index());
            self.disk.fat_set(current.index(), ClusterAddress::NULL);
            trace!("freed cluster {}", current.index());
            if next.is_eoc() || next.is_null() {
                break;
            }
            current = next;
        }
    }
}

impl<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize> Default
    for Engine<CLUSTER_BYTES, CLUSTER_COUNT>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_allocated_at_init() {
        let engine: Engine<8, 64> = Engine::new();
        assert!(engine.fat_get(ROOT_CLUSTER_INDEX).is_eoc());
    }

    #[test]
    fn allocate_free_round_trip_restores_fat_state() {
        let mut engine: Engine<8, 64> = Engine::new();
        let before: Vec<ClusterAddress> =
            (0..64).map(|i| engine.fat_get(i)).collect();

        let a = engine.allocate_cluster();
        engine.free_chain(a);

        let after: Vec<ClusterAddress> = (0..64).map(|i| engine.fat_get(i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn allocate_skips_occupied_slots() {
        let mut engine: Engine<8, 64> = Engine::new();
        let a = engine.allocate_cluster();
        let b = engine.allocate_cluster();
        assert_ne!(a, b);
        assert!(engine.fat_get(a.index()).is_eoc());
        assert!(engine.fat_get(b.index()).is_eoc());
    }

    #[test]
    fn free_chain_of_null_is_a_no_op() {
        let mut engine: Engine<8, 64> = Engine::new();
        engine.free_chain(ClusterAddress::NULL);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn allocation_exhaustion_is_fatal() {
        let mut engine: Engine<8, 2> = Engine::new();
        // Cluster 1 is already the root; only cluster 0 is unused and
        // reserved, so a 2-cluster disk has no free slot at all.
        engine.allocate_cluster();
    }
}
