/// Objects that can be recycled. `clear` must leave the value equivalent to `Default`.
pub(crate) trait Poolable: Default {
    fn clear(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PoolId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct PoolSlot<T> {
    generation: u32,
    in_use: bool,
    value: T,
}

/// Counters describing how a pool has been used so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub borrowed: u64,
    pub returned: u64,
    /// Instances currently handed out.
    pub live: usize,
    /// Cleared instances waiting to be reused.
    pub idle: usize,
}

/// Generational arena. Slots are reused after `give_back`; old ids go stale.
#[derive(Debug)]
pub(crate) struct Pool<T> {
    slots: Vec<PoolSlot<T>>,
    free_list: Vec<usize>,
    borrowed: u64,
    returned: u64,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            borrowed: 0,
            returned: 0,
        }
    }
}

impl<T: Poolable> Pool<T> {
    pub(crate) fn borrow(&mut self) -> PoolId {
        self.borrowed += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.in_use = true;
            return PoolId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len();
        self.slots.push(PoolSlot {
            generation: 0,
            in_use: true,
            value: T::default(),
        });
        PoolId {
            index,
            generation: 0,
        }
    }

    /// Clears the instance and makes its slot reusable. Returns `false` for stale ids.
    pub(crate) fn give_back(&mut self, id: PoolId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return false;
        };
        if !slot.in_use || slot.generation != id.generation {
            log::debug!("ignoring return of stale pool id {id:?}");
            return false;
        }
        slot.value.clear();
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.returned += 1;
        true
    }

    pub(crate) fn get(&self, id: PoolId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.in_use && slot.generation == id.generation)
            .map(|slot| &slot.value)
    }

    pub(crate) fn get_mut(&mut self, id: PoolId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.in_use && slot.generation == id.generation)
            .map(|slot| &mut slot.value)
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            borrowed: self.borrowed,
            returned: self.returned,
            live: self.slots.len() - self.free_list.len(),
            idle: self.free_list.len(),
        }
    }
}

/// Free-list of owned instances, for objects that move into a single owner while in use.
#[derive(Debug)]
pub(crate) struct FreeList<T> {
    items: Vec<T>,
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Poolable> FreeList<T> {
    pub(crate) fn take(&mut self) -> T {
        self.items.pop().unwrap_or_default()
    }

    pub(crate) fn put(&mut self, mut value: T) {
        value.clear();
        self.items.push(value);
    }

    pub(crate) fn idle(&self) -> usize {
        self.items.len()
    }
}
