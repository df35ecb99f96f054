//! Variable environment for one call frame.
//!
//! Variables live in [`Slot`]s (`Rc<RefCell<Value>>`) so that a name can
//! alias storage owned by another scope: `global`-imported names alias
//! the global environment's slot, and by-reference closure captures
//! alias the capturing frame's slot. Ordinary reads and writes go
//! through the slot transparently.
//!
//! Function and method calls do NOT inherit the caller's locals — a
//! fresh environment is created per call frame and discarded on return.
//! Only `global` imports and closure captures cross a call boundary.
//! Declarations (functions, classes, constants) never live here; they
//! belong to the interpreter's flat registries.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use quill_ir::Name;

use crate::value::Value;

/// Shared storage for one variable.
pub type Slot = Rc<RefCell<Value>>;

/// Allocate a fresh slot.
pub fn new_slot(value: Value) -> Slot {
    Rc::new(RefCell::new(value))
}

/// One call frame's variable table.
#[derive(Debug, Default)]
pub struct Environment {
    slots: FxHashMap<Name, Slot>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a variable. `None` when the name was never set (or unset).
    pub fn get(&self, name: Name) -> Option<Value> {
        self.slots.get(&name).map(|slot| slot.borrow().clone())
    }

    /// Write a variable, creating its slot on first write. Writes through
    /// an aliased slot are visible to every scope sharing it.
    pub fn set(&mut self, name: Name, value: Value) {
        match self.slots.get(&name) {
            Some(slot) => *slot.borrow_mut() = value,
            None => {
                self.slots.insert(name, new_slot(value));
            }
        }
    }

    /// Remove the local binding. The slot itself survives if aliased
    /// elsewhere; only this scope's view of it goes away.
    pub fn unset(&mut self, name: Name) {
        self.slots.remove(&name);
    }

    /// `isset` semantics: bound and not null.
    pub fn isset(&self, name: Name) -> bool {
        self.slots
            .get(&name)
            .is_some_and(|slot| !slot.borrow().is_null())
    }

    /// `true` when the name has a binding, null or not.
    pub fn has(&self, name: Name) -> bool {
        self.slots.contains_key(&name)
    }

    /// Get-or-create the slot for a name (closure capture, `global`
    /// import sources).
    pub fn slot(&mut self, name: Name) -> Slot {
        Rc::clone(
            self.slots
                .entry(name)
                .or_insert_with(|| new_slot(Value::Null)),
        )
    }

    /// Bind a name to an existing slot, aliasing its storage. This is
    /// the write half of `global $x` and by-reference captures.
    pub fn link(&mut self, name: Name, slot: Slot) {
        self.slots.insert(name, slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: u32) -> Name {
        Name::from_raw(raw)
    }

    #[test]
    fn set_then_get() {
        let mut env = Environment::new();
        env.set(n(1), Value::int(5));
        assert_eq!(env.get(n(1)), Some(Value::int(5)));
        assert_eq!(env.get(n(2)), None);
    }

    #[test]
    fn isset_is_false_for_null_bindings() {
        let mut env = Environment::new();
        env.set(n(1), Value::Null);
        assert!(env.has(n(1)));
        assert!(!env.isset(n(1)));
        env.set(n(1), Value::int(0));
        assert!(env.isset(n(1)));
    }

    #[test]
    fn unset_removes_the_binding() {
        let mut env = Environment::new();
        env.set(n(1), Value::int(1));
        env.unset(n(1));
        assert_eq!(env.get(n(1)), None);
    }

    #[test]
    fn linked_slots_alias_storage() {
        let mut global = Environment::new();
        global.set(n(1), Value::int(10));
        let slot = global.slot(n(1));

        let mut frame = Environment::new();
        frame.link(n(1), slot);
        frame.set(n(1), Value::int(99));

        // The write through the frame is visible in the global scope.
        assert_eq!(global.get(n(1)), Some(Value::int(99)));
    }

    #[test]
    fn slot_creates_null_binding_on_demand() {
        let mut env = Environment::new();
        let slot = env.slot(n(7));
        assert!(env.has(n(7)));
        *slot.borrow_mut() = Value::str("x");
        assert_eq!(env.get(n(7)), Some(Value::str("x")));
    }
}
