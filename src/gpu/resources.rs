//! Allocation ledger for explicitly released GPU resources.
//!
//! wgpu frees resources on drop, but the backdrop releases everything
//! eagerly on unmount. The ledger records every allocation and release by
//! label so teardown can be checked.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Entry {
    allocated: u32,
    released: u32,
}

/// Allocation/release counts per resource label.
#[derive(Debug, Default, Clone)]
pub struct ResourceLedger {
    entries: BTreeMap<String, Entry>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new allocation.
    pub fn allocate(&mut self, label: &str) {
        self.entries.entry(label.to_string()).or_default().allocated += 1;
    }

    /// Record a release.
    pub fn release(&mut self, label: &str) {
        let entry = self.entries.entry(label.to_string()).or_default();
        entry.released += 1;
        if entry.released > entry.allocated {
            log::warn!("GPU resource '{label}' released more often than allocated");
        }
    }

    /// Destroy a buffer and record the release.
    pub fn release_buffer(&mut self, label: &str, buffer: &wgpu::Buffer) {
        buffer.destroy();
        self.release(label);
    }

    /// Destroy a texture and record the release.
    pub fn release_texture(&mut self, label: &str, texture: &wgpu::Texture) {
        texture.destroy();
        self.release(label);
    }

    /// Number of allocations not yet released.
    pub fn outstanding(&self) -> u32 {
        self.entries
            .values()
            .map(|e| e.allocated.saturating_sub(e.released))
            .sum()
    }

    /// Total allocations recorded.
    pub fn allocations(&self) -> u32 {
        self.entries.values().map(|e| e.allocated).sum()
    }

    /// True when every allocation was released exactly once.
    pub fn balanced(&self) -> bool {
        self.entries.values().all(|e| e.allocated == e.released)
    }

    /// Labels currently tracked.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_after_release() {
        let mut ledger = ResourceLedger::new();
        ledger.allocate("box_vertices");
        ledger.allocate("material:orange");
        assert_eq!(ledger.outstanding(), 2);
        assert!(!ledger.balanced());

        ledger.release("box_vertices");
        ledger.release("material:orange");
        assert_eq!(ledger.outstanding(), 0);
        assert!(ledger.balanced());
    }

    #[test]
    fn test_double_release_is_unbalanced() {
        let mut ledger = ResourceLedger::new();
        ledger.allocate("depth");
        ledger.release("depth");
        ledger.release("depth");
        assert_eq!(ledger.outstanding(), 0);
        assert!(!ledger.balanced());
    }
}
