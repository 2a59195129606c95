//! Scope frames
//!
//! An environment maps names to values and links to its enclosing frame.
//! Frames are shared through `Rc<RefCell<_>>`: a closure keeps its defining
//! frame (and every ancestor) alive for as long as the closure is reachable.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope frame
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope frame
#[derive(Default)]
pub struct Environment {
    /// `None` marks a declared variable that has not been assigned yet
    values: HashMap<String, Option<Value>>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// Create the outermost (global) frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame nested inside `enclosing`
    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in a shared handle
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind a name in this frame, overwriting any previous binding
    pub fn define(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.values.insert(name.into(), value);
    }

    /// Value bound in this frame; `None` if unbound or unassigned
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned().flatten()
    }

    /// Whether the name is declared in this frame
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Assign to an existing binding in this frame
    ///
    /// Returns `false` if the name was never declared here.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Names bound in this frame, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Walk `distance` frames outward from `env`
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current = Rc::clone(env);
    for _ in 0..distance {
        let next = current.borrow().enclosing()?;
        current = next;
    }
    Some(current)
}

/// Read `name` from the frame `distance` hops out
pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
    let frame = ancestor(env, distance)?;
    let value = frame.borrow().get(name);
    value
}

/// Assign `name` in the frame `distance` hops out
pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) -> bool {
    match ancestor(env, distance) {
        Some(frame) => frame.borrow_mut().assign(name, value),
        None => false,
    }
}
