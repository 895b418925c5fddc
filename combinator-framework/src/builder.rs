//! Constructors, fluent modifiers and operators for assembling combinators.
//!
//! `a + b` builds a sequence and `a | b` an ordered choice. Chains flatten as
//! long as the left operand has not been finalised with a factory, a label or
//! a projection, so `a + b + c` is one three-item sequence.

use std::ops::{Add, BitOr, Not};
use std::rc::Rc;

use crate::combinator::{Combinator, Factory, Kind};
use crate::param::{Param, Var};
use crate::template::Template;
use crate::value::Value;

/// Matches `text` exactly.
pub fn lit<S: Into<String>>(text: S) -> Combinator {
    Combinator::from_kind(Kind::Literal(Param::Const(Value::Text(text.into()))))
}

/// Matches the text a parameter resolves to at parse time.
pub fn lit_param<P: Into<Param>>(text: P) -> Combinator {
    Combinator::from_kind(Kind::Literal(text.into()))
}

/// Matches one character from `chars`.
pub fn one_of(chars: &str) -> Combinator {
    Combinator::from_kind(Kind::CharClass {
        chars: chars.chars().collect(),
        exclude: false,
    })
}

/// Matches one character not in `chars`.
pub fn none_of(chars: &str) -> Combinator {
    Combinator::from_kind(Kind::CharClass {
        chars: chars.chars().collect(),
        exclude: true,
    })
}

/// Matches any single character.
pub fn any_char() -> Combinator {
    none_of("")
}

/// Tries each option in order; the first match wins.
pub fn choice<I, C>(options: I) -> Combinator
where
    I: IntoIterator<Item = C>,
    C: Into<Combinator>,
{
    Combinator::from_kind(Kind::Choice(options.into_iter().map(Into::into).collect()))
}

/// Matches every item in order.
pub fn seq<I, C>(items: I) -> Combinator
where
    I: IntoIterator<Item = C>,
    C: Into<Combinator>,
{
    Combinator::from_kind(Kind::Sequence {
        items: items.into_iter().map(Into::into).collect(),
        projection: None,
    })
}

/// Refers to the rule or value bound to `name`, looked up at parse time.
pub fn var<N: Into<String>>(name: N) -> Combinator {
    Combinator::from_kind(Kind::Reference(Param::Var(name.into())))
}

/// Lazy reference through an arbitrary parameter.
pub fn reference<P: Into<Param>>(target: P) -> Combinator {
    Combinator::from_kind(Kind::Reference(target.into()))
}

/// Matches only at the end of input, consuming nothing.
pub fn end() -> Combinator {
    Combinator::from_kind(Kind::End)
}

impl Combinator {
    /// Attaches a factory. Applied again, the new function runs on the output
    /// of the previous one.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        let factory: Factory = match self.factory().cloned() {
            Some(previous) => Rc::new(move |value| f(previous(value))),
            None => Rc::new(f),
        };
        self.rebuild(|inner| inner.factory = Some(factory))
    }

    /// Keeps only the elements at `indexes` of a sequence's result. A single
    /// index yields that element alone.
    pub fn project(self, indexes: &[usize]) -> Self {
        match self.kind() {
            Kind::Sequence { .. } if !self.is_final() => self.rebuild(|inner| {
                if let Kind::Sequence { projection, .. } = &mut inner.kind {
                    *projection = Some(indexes.to_vec());
                }
            }),
            _ => seq([self]).project(indexes),
        }
    }

    /// Names this combinator for traces and `Display`.
    pub fn labelled<N: Into<String>>(self, label: N) -> Self {
        let label = label.into();
        self.rebuild(|inner| inner.label = Some(label))
    }

    /// Zero or more.
    pub fn repeat(self) -> Self {
        self.repeat_bounds(0i64, None)
    }

    pub fn at_least(self, min: usize) -> Self {
        self.repeat_bounds(count(min), None)
    }

    pub fn between(self, min: usize, max: usize) -> Self {
        self.repeat_bounds(count(min), Some(count(max).into()))
    }

    pub fn exactly(self, n: usize) -> Self {
        self.between(n, n)
    }

    /// Zero or one. The result is a list of zero or one element.
    pub fn optional(self) -> Self {
        self.between(0, 1)
    }

    /// Exactly as many repetitions as `n` resolves to at parse time.
    pub fn times<P: Into<Param>>(self, n: P) -> Self {
        let n = n.into();
        self.repeat_bounds(n.clone(), Some(n))
    }

    /// Repetition with parameter bounds; `None` leaves the maximum open.
    pub fn repeat_bounds<P: Into<Param>>(self, min: P, max: Option<Param>) -> Self {
        Combinator::from_kind(Kind::Repeat {
            item: self,
            min: min.into(),
            max,
            join: None,
            keep_joins: false,
        })
    }

    /// Sets the separator matched between repeated items. Called on anything
    /// other than a repetition, it first wraps it in `repeat()`.
    pub fn join<C: Into<Combinator>>(self, separator: C) -> Self {
        let separator = separator.into();
        match self.kind() {
            Kind::Repeat { .. } if !self.is_final() => self.rebuild(|inner| {
                if let Kind::Repeat { join, .. } = &mut inner.kind {
                    *join = Some(separator);
                }
            }),
            _ => self.repeat().join(separator),
        }
    }

    /// Makes a repetition yield `[items, separators]` instead of just the
    /// items.
    pub fn keep_joins(self) -> Self {
        match self.kind() {
            Kind::Repeat { .. } if !self.is_final() => self.rebuild(|inner| {
                if let Kind::Repeat { keep_joins, .. } = &mut inner.kind {
                    *keep_joins = true;
                }
            }),
            _ => self.repeat().keep_joins(),
        }
    }

    /// Turns a soft failure into a hard [`SyntaxError`](crate::SyntaxError)
    /// carrying `message`, rendered at the failure position.
    pub fn expect<T: Into<Template>>(self, message: T) -> Self {
        Combinator::from_kind(Kind::Expect {
            inner: self,
            message: message.into(),
        })
    }

    /// Binds the result to `name` for the combinators that follow in the
    /// same branch.
    pub fn capture<N: Into<String>>(self, name: N) -> Self {
        Combinator::from_kind(Kind::Capture {
            inner: self,
            name: name.into(),
        })
    }

    /// Runs this combinator with `name` bound to `value`. The binding is
    /// resolved against the caller's namespace and is gone once this
    /// combinator returns. Chained calls share one scope.
    pub fn with<N: Into<String>, P: Into<Param>>(self, name: N, value: P) -> Self {
        let binding = (name.into(), value.into());
        match self.kind() {
            Kind::Overlay { .. } if !self.is_final() => self.rebuild(|inner| {
                if let Kind::Overlay { bindings, .. } = &mut inner.kind {
                    bindings.push(binding);
                }
            }),
            _ => Combinator::from_kind(Kind::Overlay {
                inner: self,
                bindings: vec![binding],
            }),
        }
    }

    /// Matches one character where this combinator does not match.
    pub fn exclude(self) -> Self {
        self.exclude_consuming(1)
    }

    /// Negative lookahead: succeeds without consuming where this combinator
    /// does not match.
    pub fn not_ahead(self) -> Self {
        self.exclude_consuming(0)
    }

    /// Matches `consume` characters where this combinator does not match.
    /// Fails if fewer than `consume` characters remain.
    pub fn exclude_consuming(self, consume: usize) -> Self {
        Combinator::from_kind(Kind::Not {
            inner: self,
            consume,
        })
    }
}

fn count(n: usize) -> Param {
    Param::Const(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

impl<R: Into<Combinator>> Add<R> for Combinator {
    type Output = Combinator;

    fn add(self, rhs: R) -> Combinator {
        let rhs = rhs.into();
        match self.kind() {
            Kind::Sequence {
                items,
                projection: None,
            } if !self.is_final() => {
                let mut items = items.clone();
                items.push(rhs);
                seq(items)
            }
            _ => seq([self, rhs]),
        }
    }
}

impl<R: Into<Combinator>> Add<R> for &Combinator {
    type Output = Combinator;

    fn add(self, rhs: R) -> Combinator {
        self.clone() + rhs
    }
}

impl Add<Combinator> for &str {
    type Output = Combinator;

    fn add(self, rhs: Combinator) -> Combinator {
        lit(self) + rhs
    }
}

impl<R: Into<Combinator>> BitOr<R> for Combinator {
    type Output = Combinator;

    fn bitor(self, rhs: R) -> Combinator {
        let rhs = rhs.into();
        match self.kind() {
            Kind::Choice(options) if !self.is_final() => {
                let mut options = options.clone();
                options.push(rhs);
                choice(options)
            }
            _ => choice([self, rhs]),
        }
    }
}

impl<R: Into<Combinator>> BitOr<R> for &Combinator {
    type Output = Combinator;

    fn bitor(self, rhs: R) -> Combinator {
        self.clone() | rhs
    }
}

impl BitOr<Combinator> for &str {
    type Output = Combinator;

    fn bitor(self, rhs: Combinator) -> Combinator {
        lit(self) | rhs
    }
}

impl Not for Combinator {
    type Output = Combinator;

    fn not(self) -> Combinator {
        self.exclude()
    }
}

impl From<&str> for Combinator {
    fn from(value: &str) -> Self {
        lit(value)
    }
}

impl From<String> for Combinator {
    fn from(value: String) -> Self {
        lit(value)
    }
}

impl From<char> for Combinator {
    fn from(value: char) -> Self {
        lit(value.to_string())
    }
}

impl From<Var> for Combinator {
    fn from(value: Var) -> Self {
        reference(value)
    }
}

impl From<&Combinator> for Combinator {
    fn from(value: &Combinator) -> Self {
        value.clone()
    }
}
