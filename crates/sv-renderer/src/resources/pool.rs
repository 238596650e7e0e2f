//! Reference-counted resource pool.

use std::collections::HashMap;

/// Typed handle into a [`ResourcePool`].
pub trait PoolHandle: Copy + Eq + std::hash::Hash {
    fn from_raw(value: u64) -> Self;
    fn raw(&self) -> u64;
}

struct Entry<T> {
    value: T,
    refs: u32,
}

/// Stores resources behind handles and frees them when the last reference is released.
pub struct ResourcePool<H, T> {
    entries: HashMap<H, Entry<T>>,
    next_handle: u64,
}

impl<H: PoolHandle, T> ResourcePool<H, T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Stores a resource with one reference and returns its handle.
    pub fn insert(&mut self, value: T) -> H {
        let handle = H::from_raw(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, Entry { value, refs: 1 });
        handle
    }

    /// Adds a reference. Returns false for unknown handles.
    pub fn retain(&mut self, handle: H) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drops a reference, freeing the resource when none remain.
    ///
    /// Returns true if the resource was freed. Unknown handles are ignored.
    pub fn release(&mut self, handle: H) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 {
            self.entries.remove(&handle);
            true
        } else {
            false
        }
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.entries.get(&handle).map(|e| &e.value)
    }

    pub fn ref_count(&self, handle: H) -> u32 {
        self.entries.get(&handle).map(|e| e.refs).unwrap_or(0)
    }

    pub fn contains(&self, handle: H) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frees everything regardless of reference counts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<H: PoolHandle, T> Default for ResourcePool<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct TestHandle(u64);

    impl PoolHandle for TestHandle {
        fn from_raw(value: u64) -> Self {
            Self(value)
        }

        fn raw(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_release_frees_on_last_reference() {
        let mut pool: ResourcePool<TestHandle, &str> = ResourcePool::new();
        let h = pool.insert("mesh");
        assert!(pool.retain(h));
        assert_eq!(pool.ref_count(h), 2);

        assert!(!pool.release(h));
        assert!(pool.contains(h));
        assert!(pool.release(h));
        assert!(!pool.contains(h));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_unknown_handles_are_ignored() {
        let mut pool: ResourcePool<TestHandle, u8> = ResourcePool::new();
        let h = pool.insert(1);
        pool.release(h);
        assert!(!pool.release(h));
        assert!(!pool.retain(h));
        assert_eq!(pool.ref_count(h), 0);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut pool: ResourcePool<TestHandle, u8> = ResourcePool::new();
        let a = pool.insert(1);
        pool.release(a);
        let b = pool.insert(2);
        assert_ne!(a.raw(), b.raw());
    }
}
