//! Scoped variable bindings.
//!
//! An [`Environment`] is a cheap handle to a shared frame. Frames form a chain through
//! their parents, ending at the global frame, which is the only frame without a parent
//! and the one that holds the builtins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::Error;
use crate::ast::Value;

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    builtin: bool,
}

#[derive(Default)]
struct Frame {
    bindings: HashMap<String, Binding>,
    parent: Option<Environment>,
}

/// Handle to one frame of variable bindings.
///
/// Cloning the handle shares the frame; use [`Environment::deep_copy`] for an
/// independent frame.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    /// An empty frame with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty frame whose parent is `parent`
    pub fn child_of(parent: &Environment) -> Self {
        let env = Self::new();
        env.set_parent(parent.clone());
        env
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    pub(crate) fn set_parent(&self, parent: Environment) {
        self.0.borrow_mut().parent = Some(parent);
    }

    /// Look `name` up through the chain, returning a copy of the first binding found.
    pub fn get(&self, name: &str) -> Value {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let frame = env.0.borrow();
            if let Some(binding) = frame.bindings.get(name) {
                return binding.value.clone();
            }
            current = frame.parent.clone();
        }
        Error::UnboundSymbol(name.to_owned()).into()
    }

    /// Bind `name` in this frame, replacing any previous local binding.
    pub fn put(&self, name: impl Into<String>, value: Value, builtin: bool) {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.into(), Binding { value, builtin });
    }

    /// Whether the binding of `name` visible from this frame is a builtin
    pub fn is_builtin(&self, name: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let frame = env.0.borrow();
            if let Some(binding) = frame.bindings.get(name) {
                return binding.builtin;
            }
            current = frame.parent.clone();
        }
        false
    }

    /// The global frame at the end of the parent chain
    pub fn root(&self) -> Environment {
        let mut env = self.clone();
        while let Some(parent) = env.parent() {
            env = parent;
        }
        env
    }

    /// Bind `name` in the global frame.
    pub fn def(&self, name: &str, value: Value) -> Result<(), Error> {
        let root = self.root();
        if root.is_builtin(name) {
            return Err(Error::BuiltinRedefinition(name.to_owned()));
        }
        trace!(name, "global definition");
        root.put(name, value, false);
        Ok(())
    }

    /// Bind `name` in this frame.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), Error> {
        if self.is_builtin(name) {
            return Err(Error::BuiltinRedefinition(name.to_owned()));
        }
        self.put(name, value, false);
        Ok(())
    }

    /// A new frame holding copies of every local binding, sharing this frame's parent
    pub fn deep_copy(&self) -> Environment {
        let frame = self.0.borrow();
        Environment(Rc::new(RefCell::new(Frame {
            bindings: frame.bindings.clone(),
            parent: frame.parent.clone(),
        })))
    }

    /// Every binding visible from this frame, sorted by name; inner frames win
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut visible: HashMap<String, Value> = match self.parent() {
            Some(parent) => parent.bindings().into_iter().collect(),
            None => HashMap::new(),
        };
        for (name, binding) in &self.0.borrow().bindings {
            visible.insert(name.clone(), binding.value.clone());
        }

        let mut sorted: Vec<_> = visible.into_iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        sorted
    }

    /// Number of bindings in this frame alone
    pub fn local_len(&self) -> usize {
        self.0.borrow().bindings.len()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.borrow();
        let mut names: Vec<&String> = frame.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_parent", &frame.parent.is_some())
            .finish()
    }
}
