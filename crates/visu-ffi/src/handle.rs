//! Slot+generation table behind the opaque `u64` reader handles.
//!
//! A handle packs the slot index in the upper 32 bits and the slot's
//! generation in the lower 32. Removing a value bumps the generation, so a
//! destroyed handle never resolves again, even after its slot is reused.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Key {
    slot: u32,
    generation: u32,
}

impl Key {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(handle: u64) -> Self {
        Self {
            slot: (handle >> 32) as u32,
            generation: handle as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned values addressed by generation-checked handles.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value`, reusing a vacant slot when there is one.
    pub fn insert(&mut self, value: T) -> u64 {
        let slot = match self.vacant.pop() {
            Some(slot) => slot,
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    value: None,
                });
                (self.entries.len() - 1) as u32
            }
        };
        let entry = &mut self.entries[slot as usize];
        entry.value = Some(value);
        Key {
            slot,
            generation: entry.generation,
        }
        .pack()
    }

    fn entry(&self, handle: u64) -> Option<&Entry<T>> {
        let key = Key::unpack(handle);
        self.entries
            .get(key.slot as usize)
            .filter(|e| e.generation == key.generation)
    }

    /// Value behind `handle`, `None` if stale or never issued.
    pub fn get(&self, handle: u64) -> Option<&T> {
        self.entry(handle)?.value.as_ref()
    }

    /// Take the value out and invalidate `handle`. Removing twice is a no-op.
    ///
    /// A slot whose generation wraps to 0 is retired instead of reused, so
    /// handles from its first life cannot resolve again.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let key = Key::unpack(handle);
        let entry = self
            .entries
            .get_mut(key.slot as usize)
            .filter(|e| e.generation == key.generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(key.slot);
        }
        Some(value)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}
