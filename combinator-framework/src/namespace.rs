use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::combinator::Combinator;
use crate::value::Value;

/// What a name in a [`Namespace`] stands for.
#[derive(Clone, Debug)]
pub enum Binding {
    Value(Value),
    Rule(Combinator),
}

impl Binding {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Binding::Value(value) => Some(value),
            Binding::Rule(_) => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Combinator> {
        match self {
            Binding::Rule(rule) => Some(rule),
            Binding::Value(_) => None,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => write!(f, "{value}"),
            Binding::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<Combinator> for Binding {
    fn from(value: Combinator) -> Self {
        Binding::Rule(value)
    }
}

struct Frame {
    bindings: HashMap<String, Binding>,
    parent: Option<Rc<Frame>>,
}

/// An immutable chain of binding frames threaded through every parse call.
///
/// Extending a namespace pushes a new frame and returns a new handle; the
/// handle it was derived from keeps seeing exactly what it saw before. This is
/// what makes overlays and captures on a failed branch invisible to the rest
/// of the parse: the failed branch's handle is simply dropped.
#[derive(Clone, Default)]
pub struct Namespace {
    head: Option<Rc<Frame>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks `name` up, innermost frame first.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if let Some(binding) = current.bindings.get(name) {
                return Some(binding);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    /// Looks up a plain value binding.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Binding::as_value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns a namespace with one extra binding on top of this one.
    #[must_use]
    pub fn bind<N: Into<String>, B: Into<Binding>>(&self, name: N, binding: B) -> Namespace {
        self.with_bindings([(name.into(), binding.into())])
    }

    /// Returns a namespace with all `bindings` in a single new frame.
    #[must_use]
    pub fn with_bindings<I>(&self, bindings: I) -> Namespace
    where
        I: IntoIterator<Item = (String, Binding)>,
    {
        let bindings: HashMap<String, Binding> = bindings.into_iter().collect();
        if bindings.is_empty() {
            return self.clone();
        }
        Namespace {
            head: Some(Rc::new(Frame {
                bindings,
                parent: self.head.clone(),
            })),
        }
    }

    /// Number of frames in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent.as_deref();
        }
        depth
    }

    /// Returns `true` if both handles point at the same frame chain.
    pub fn same_as(&self, other: &Namespace) -> bool {
        match (&self.head, &other.head) {
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Every visible name, innermost first, without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            for name in current.bindings.keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            frame = current.parent.as_deref();
        }
        names
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("Namespace")
            .field("depth", &self.depth())
            .field("names", &names)
            .finish()
    }
}
