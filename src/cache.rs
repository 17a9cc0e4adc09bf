//! Generation-keyed memo slot used for every cached decomposition.
//!
//! A slot remembers the value produced by a factory together with the
//! generation of the owner at the time it was produced. Reading with a newer
//! generation runs the factory again. Owners bump their generation on every
//! mutation instead of resetting each slot individually.

use core::cell::RefCell;

/// Lazily computed value tied to an owner generation.
///
/// Not `Sync`: a slot expects a single reader/writer at a time.
///
/// ```
/// use densedecomp::cache::OnDemand;
///
/// let slot = OnDemand::new();
/// let mut calls = 0;
/// assert_eq!(slot.compute(0, || { calls += 1; 42 }), 42);
/// assert_eq!(slot.compute(0, || { calls += 1; 0 }), 42);
/// assert_eq!(calls, 1);
///
/// // A newer generation recomputes.
/// assert_eq!(slot.compute(1, || 7), 7);
///
/// slot.reset();
/// assert!(!slot.is_cached(1));
/// ```
#[derive(Debug)]
pub struct OnDemand<T> {
    slot: RefCell<Option<Held<T>>>,
}

#[derive(Debug)]
struct Held<T> {
    generation: u64,
    value: T,
}

impl<T> OnDemand<T> {
    /// An empty slot.
    pub const fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    /// Drop the held value, if any, without running a factory.
    pub fn reset(&self) {
        self.slot.borrow_mut().take();
    }

    /// Whether the slot holds a value produced at `generation`.
    pub fn is_cached(&self, generation: u64) -> bool {
        matches!(&*self.slot.borrow(), Some(held) if held.generation == generation)
    }
}

impl<T: Clone> OnDemand<T> {
    /// Return the value for `generation`, running `factory` only when the
    /// slot is empty or holds a value from another generation.
    ///
    /// The factory runs with no borrow held, so it may read other slots.
    pub fn compute(&self, generation: u64, factory: impl FnOnce() -> T) -> T {
        {
            let slot = self.slot.borrow();
            if let Some(held) = slot.as_ref() {
                if held.generation == generation {
                    return held.value.clone();
                }
            }
        }

        let value = factory();
        *self.slot.borrow_mut() = Some(Held {
            generation,
            value: value.clone(),
        });
        value
    }
}

impl<T> Default for OnDemand<T> {
    fn default() -> Self {
        Self::new()
    }
}
