use std::fmt;
use std::rc::Rc;

use crate::combinator::Combinator;
use crate::error::GrammarError;
use crate::namespace::{Binding, Namespace};
use crate::value::Value;

type Compute = Rc<dyn Fn(&Namespace) -> Result<Value, GrammarError>>;

/// A value resolved against the namespace at call time.
///
/// Literals, repeat bounds, overlays and lazy references all take a `Param`,
/// which is how grammar parameters such as the current indentation depth
/// reach the combinators that need them.
#[derive(Clone)]
pub enum Param {
    Const(Value),
    /// A rule, so an overlay can swap one rule for another in a scope.
    Rule(Combinator),
    Var(String),
    Computed(Compute),
}

impl Param {
    /// Wraps a function of the namespace.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Namespace) -> Result<Value, GrammarError> + 'static,
    {
        Param::Computed(Rc::new(f))
    }

    /// Resolves to whatever the parameter denotes, rule or value.
    pub fn lookup(&self, namespace: &Namespace) -> Result<Binding, GrammarError> {
        match self {
            Param::Const(value) => Ok(Binding::Value(value.clone())),
            Param::Rule(rule) => Ok(Binding::Rule(rule.clone())),
            Param::Var(name) => namespace
                .get(name)
                .cloned()
                .ok_or_else(|| GrammarError::UndefinedName { name: name.clone() }),
            Param::Computed(compute) => compute(namespace).map(Binding::Value),
        }
    }

    /// Resolves to a plain value; a rule binding is an error.
    pub fn value(&self, namespace: &Namespace) -> Result<Value, GrammarError> {
        match self.lookup(namespace)? {
            Binding::Value(value) => Ok(value),
            Binding::Rule(_) => Err(GrammarError::NotAValue {
                name: self.to_string(),
            }),
        }
    }

    /// Resolves to a non-negative count, as used by repeat bounds.
    pub fn count(&self, namespace: &Namespace) -> Result<usize, GrammarError> {
        match self.value(namespace)? {
            Value::Int(n) if n >= 0 => Ok(n as usize),
            other => Err(GrammarError::InvalidBound {
                found: format!("{} {other}", other.kind_name()),
            }),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Const(Value::Text(text)) => write!(f, "{text:?}"),
            Param::Const(value) => write!(f, "{value}"),
            Param::Rule(rule) => write!(f, "{rule}"),
            Param::Var(name) => write!(f, "${name}"),
            Param::Computed(_) => f.write_str("<computed>"),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Param::Rule(rule) => f.debug_tuple("Rule").field(rule).finish(),
            Param::Var(name) => f.debug_tuple("Var").field(name).finish(),
            Param::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Const(value)
    }
}

impl From<Combinator> for Param {
    fn from(value: Combinator) -> Self {
        Param::Rule(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Const(Value::Int(value))
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Const(Value::Bool(value))
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Const(Value::Text(value.to_string()))
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Const(Value::Text(value))
    }
}

impl From<Var> for Param {
    fn from(value: Var) -> Self {
        Param::Var(value.0)
    }
}

/// A named namespace lookup with arithmetic on top.
///
/// `Var::new("indent").add(1i64)` resolves to one more than the current
/// `indent`, which is how a nested block asks for a deeper indentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Var(String);

impl Var {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Var(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn add<P: Into<Param>>(&self, other: P) -> Param {
        binary(self.clone().into(), other.into(), "+", add_values)
    }

    pub fn mul<P: Into<Param>>(&self, other: P) -> Param {
        binary(self.clone().into(), other.into(), "*", mul_values)
    }

    /// Resolves to `when_true` if this variable is truthy, else `when_false`.
    pub fn if_else<T: Into<Param>, F: Into<Param>>(&self, when_true: T, when_false: F) -> Param {
        let condition: Param = self.clone().into();
        let when_true = when_true.into();
        let when_false = when_false.into();
        Param::computed(move |ns| {
            if condition.value(ns)?.is_truthy() {
                when_true.value(ns)
            } else {
                when_false.value(ns)
            }
        })
    }
}

fn binary(
    left: Param,
    right: Param,
    op: &'static str,
    apply: fn(Value, Value) -> Option<Value>,
) -> Param {
    Param::computed(move |ns| {
        let lhs = left.value(ns)?;
        let rhs = right.value(ns)?;
        let (left_kind, right_kind) = (lhs.kind_name(), rhs.kind_name());
        apply(lhs, rhs).ok_or(GrammarError::InvalidOperand {
            op,
            left: left_kind,
            right: right_kind,
        })
    })
}

fn add_values(lhs: Value, rhs: Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a.checked_add(b).map(Value::Int),
        (Value::Float(a), Value::Float(b)) => Some(Value::Float(a + b)),
        (Value::Int(a), Value::Float(b)) => Some(Value::Float(a as f64 + b)),
        (Value::Float(a), Value::Int(b)) => Some(Value::Float(a + b as f64)),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Some(Value::List(a))
        }
        (lhs, rhs) => match (lhs.as_str(), rhs.as_str()) {
            (Some(a), Some(b)) => Some(Value::Text(format!("{a}{b}"))),
            _ => None,
        },
    }
}

fn mul_values(lhs: Value, rhs: Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a.checked_mul(b).map(Value::Int),
        (Value::Float(a), Value::Float(b)) => Some(Value::Float(a * b)),
        (Value::Int(a), Value::Float(b)) => Some(Value::Float(a as f64 * b)),
        (Value::Float(a), Value::Int(b)) => Some(Value::Float(a * b as f64)),
        (text, Value::Int(n)) if n >= 0 => text.as_str().map(|s| Value::Text(s.repeat(n as usize))),
        _ => None,
    }
}
