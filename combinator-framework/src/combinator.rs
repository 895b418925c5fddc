use std::fmt;
use std::rc::Rc;

use common_framework::{Position, Source, StrSource, Token};
use tracing::{debug, trace};

use crate::error::{Error, GrammarError, SyntaxError};
use crate::namespace::{Binding, Namespace};
use crate::param::Param;
use crate::template::Template;
use crate::value::Value;

/// Maps a combinator's raw result to a semantic value. Only called on success.
pub type Factory = Rc<dyn Fn(Value) -> Value>;

/// A successful match.
///
/// `namespace` is the namespace later combinators in the same branch should
/// see: the caller's own, plus anything captured along the way.
#[derive(Debug)]
pub struct Success {
    pub value: Value,
    pub position: Position,
    pub namespace: Namespace,
}

/// `Ok(None)` is a soft failure: nothing was consumed and the caller keeps the
/// position it passed in. `Err` is a hard failure that aborts the parse.
pub type ParseResult = Result<Option<Success>, Error>;

#[derive(Clone)]
pub(crate) enum Kind {
    Literal(Param),
    CharClass {
        chars: Vec<char>,
        exclude: bool,
    },
    Choice(Vec<Combinator>),
    Sequence {
        items: Vec<Combinator>,
        projection: Option<Vec<usize>>,
    },
    Repeat {
        item: Combinator,
        min: Param,
        max: Option<Param>,
        join: Option<Combinator>,
        keep_joins: bool,
    },
    Not {
        inner: Combinator,
        consume: usize,
    },
    Expect {
        inner: Combinator,
        message: Template,
    },
    Capture {
        inner: Combinator,
        name: String,
    },
    Overlay {
        inner: Combinator,
        bindings: Vec<(String, Param)>,
    },
    Reference(Param),
    End,
}

#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) factory: Option<Factory>,
    pub(crate) label: Option<String>,
}

/// A composable matching unit.
///
/// Combinators are immutable and cheap to clone. Rules refer to each other by
/// name through lazy references, so a recursive grammar never needs a cyclic
/// object graph.
#[derive(Clone)]
pub struct Combinator {
    inner: Rc<Inner>,
}

impl Combinator {
    pub(crate) fn from_kind(kind: Kind) -> Self {
        Self {
            inner: Rc::new(Inner {
                kind,
                factory: None,
                label: None,
            }),
        }
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    pub(crate) fn factory(&self) -> Option<&Factory> {
        self.inner.factory.as_ref()
    }

    /// Returns a copy with `edit` applied to its parts.
    pub(crate) fn rebuild(&self, edit: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = (*self.inner).clone();
        edit(&mut inner);
        Self {
            inner: Rc::new(inner),
        }
    }

    /// A finalised combinator is never extended in place by `+`, `|` or
    /// the fluent builders; they wrap it instead.
    pub(crate) fn is_final(&self) -> bool {
        self.inner.factory.is_some() || self.inner.label.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Runs this combinator at `position`.
    pub fn parse(&self, namespace: &Namespace, position: Position, source: &dyn Source) -> ParseResult {
        trace!(combinator = %self, offset = position.offset, "parse");
        match self.parse_kind(namespace, position, source)? {
            Some(mut success) => {
                if let Some(factory) = &self.inner.factory {
                    success.value = factory(std::mem::take(&mut success.value));
                }
                trace!(combinator = %self, end = success.position.offset, "matched");
                Ok(Some(success))
            }
            None => {
                trace!(combinator = %self, offset = position.offset, "no match");
                Ok(None)
            }
        }
    }

    /// Like [`Combinator::parse`], reporting a soft failure as `None` paired
    /// with the unchanged input position.
    pub fn attempt(
        &self,
        namespace: &Namespace,
        position: Position,
        source: &dyn Source,
    ) -> Result<(Option<Value>, Position), Error> {
        Ok(match self.parse(namespace, position, source)? {
            Some(success) => (Some(success.value), success.position),
            None => (None, position),
        })
    }

    /// Attempts a match at the start of `text` with an empty namespace.
    pub fn try_parse(&self, text: &str) -> Result<(Option<Value>, Position), Error> {
        let source = StrSource::new(text);
        self.attempt(&Namespace::new(), Position::new(), &source)
    }

    fn parse_kind(&self, namespace: &Namespace, position: Position, source: &dyn Source) -> ParseResult {
        match &self.inner.kind {
            Kind::Literal(Param::Const(Value::Text(text))) => {
                Ok(match_text(text, namespace, position, source))
            }
            Kind::Literal(param) => {
                let value = param.value(namespace)?;
                match value.as_str() {
                    Some(text) => Ok(match_text(text, namespace, position, source)),
                    None => Err(GrammarError::NotText {
                        what: format!("literal {param}"),
                        found: value.kind_name(),
                    }
                    .into()),
                }
            }
            Kind::CharClass { chars, exclude } => match source.char_at(position.offset) {
                Some(ch) if chars.contains(&ch) != *exclude => {
                    let token = Token::capture(source, position, 1);
                    Ok(Some(Success {
                        position: token.end(),
                        value: Value::Token(token),
                        namespace: namespace.clone(),
                    }))
                }
                _ => Ok(None),
            },
            Kind::Choice(options) => {
                for option in options {
                    if let Some(success) = option.parse(namespace, position, source)? {
                        return Ok(Some(success));
                    }
                }
                Ok(None)
            }
            Kind::Sequence { items, projection } => {
                let mut values = Vec::with_capacity(items.len());
                let mut current = position;
                let mut scope = namespace.clone();
                for item in items {
                    let Some(matched) = item.parse(&scope, current, source)? else {
                        return Ok(None);
                    };
                    values.push(matched.value);
                    current = matched.position;
                    scope = matched.namespace;
                }
                let value = match projection {
                    Some(indexes) => project(values, indexes)?,
                    None => Value::List(values),
                };
                Ok(Some(Success {
                    value,
                    position: current,
                    namespace: scope,
                }))
            }
            Kind::Repeat {
                item,
                min,
                max,
                join,
                keep_joins,
            } => {
                let min = min.count(namespace)?;
                let max = max.as_ref().map(|max| max.count(namespace)).transpose()?;
                if let Some(max) = max {
                    if min > max {
                        return Err(GrammarError::EmptyRange { min, max }.into());
                    }
                }

                let mut items = Vec::new();
                let mut joins = Vec::new();
                let mut current = position;
                let mut scope = namespace.clone();
                while max.map_or(true, |max| items.len() < max) {
                    let mut next = current;
                    let mut next_scope = scope.clone();
                    let mut separator = None;
                    if let (Some(join), false) = (join, items.is_empty()) {
                        match join.parse(&scope, current, source)? {
                            Some(matched) => {
                                separator = Some(matched.value);
                                next = matched.position;
                                next_scope = matched.namespace;
                            }
                            None => break,
                        }
                    }
                    // A separator with no item after it is left unconsumed.
                    let Some(matched) = item.parse(&next_scope, next, source)? else {
                        break;
                    };
                    joins.extend(separator);
                    items.push(matched.value);
                    let progressed = matched.position != current;
                    current = matched.position;
                    scope = matched.namespace;
                    if !progressed {
                        break;
                    }
                }

                if items.len() < min {
                    return Ok(None);
                }
                let value = if *keep_joins {
                    Value::List(vec![Value::List(items), Value::List(joins)])
                } else {
                    Value::List(items)
                };
                Ok(Some(Success {
                    value,
                    position: current,
                    namespace: scope,
                }))
            }
            Kind::Not { inner, consume } => {
                if inner.parse(namespace, position, source)?.is_some() {
                    return Ok(None);
                }
                if *consume > 0 && !source.has(position.offset + consume - 1) {
                    return Ok(None);
                }
                let token = Token::capture(source, position, *consume);
                Ok(Some(Success {
                    position: token.end(),
                    value: Value::Token(token),
                    namespace: namespace.clone(),
                }))
            }
            Kind::Expect { inner, message } => match inner.parse(namespace, position, source)? {
                Some(success) => Ok(Some(success)),
                None => {
                    let message = message.render(namespace, position, source);
                    debug!(%message, line = position.line, column = position.column, "mandatory match failed");
                    Err(SyntaxError::expected(message, position, source).into())
                }
            },
            Kind::Capture { inner, name } => Ok(inner.parse(namespace, position, source)?.map(
                |mut success| {
                    success.namespace = success.namespace.bind(name.clone(), success.value.clone());
                    success
                },
            )),
            Kind::Overlay { inner, bindings } => {
                let resolved = bindings
                    .iter()
                    .map(|(name, param)| Ok((name.clone(), param.lookup(namespace)?)))
                    .collect::<Result<Vec<_>, GrammarError>>()?;
                let scoped = namespace.with_bindings(resolved);
                Ok(inner.parse(&scoped, position, source)?.map(|mut success| {
                    success.namespace = namespace.clone();
                    success
                }))
            }
            Kind::Reference(param) => match param.lookup(namespace)? {
                // Captures made inside the rule stay inside it.
                Binding::Rule(rule) => Ok(rule.parse(namespace, position, source)?.map(|mut success| {
                    success.namespace = namespace.clone();
                    success
                })),
                Binding::Value(value) => match value.as_str() {
                    Some(text) => Ok(match_text(text, namespace, position, source)),
                    None => Err(GrammarError::NotParsable {
                        name: param.to_string(),
                        found: value.kind_name(),
                    }
                    .into()),
                },
            },
            Kind::End => Ok(source.is_end(position.offset).then(|| Success {
                value: Value::End,
                position,
                namespace: namespace.clone(),
            })),
        }
    }
}

fn match_text(
    text: &str,
    namespace: &Namespace,
    position: Position,
    source: &dyn Source,
) -> Option<Success> {
    if !source.starts_with(position.offset, text) {
        return None;
    }
    let token = Token::capture(source, position, text.chars().count());
    Some(Success {
        position: token.end(),
        value: Value::Token(token),
        namespace: namespace.clone(),
    })
}

fn project(values: Vec<Value>, indexes: &[usize]) -> Result<Value, GrammarError> {
    let len = values.len();
    if let Some(&index) = indexes.iter().find(|&&index| index >= len) {
        return Err(GrammarError::InvalidProjection { index, len });
    }
    Ok(match indexes {
        [single] => values.into_iter().nth(*single).unwrap_or_default(),
        _ => Value::List(indexes.iter().map(|&index| values[index].clone()).collect()),
    })
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Combinator], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.inner.label {
            return f.write_str(label);
        }
        match &self.inner.kind {
            Kind::Literal(param) | Kind::Reference(param) => write!(f, "{param}"),
            Kind::CharClass { chars, exclude } => {
                let set: String = chars.iter().flat_map(|ch| ch.escape_debug()).collect();
                write!(f, "[{}{set}]", if *exclude { "^" } else { "" })
            }
            Kind::Choice(options) => write_joined(f, options, " | "),
            Kind::Sequence { items, .. } => write_joined(f, items, " + "),
            Kind::Repeat { item, min, max, join, .. } => {
                write!(f, "{item}{{{min},")?;
                if let Some(max) = max {
                    write!(f, "{max}")?;
                }
                f.write_str("}")?;
                if let Some(join) = join {
                    write!(f, " sep {join}")?;
                }
                Ok(())
            }
            Kind::Not { inner, consume: 0 } => write!(f, "!?{inner}"),
            Kind::Not { inner, .. } => write!(f, "!{inner}"),
            Kind::Expect { inner, .. } => write!(f, "expect({inner})"),
            Kind::Capture { inner, name } => write!(f, "{inner} as {name}"),
            Kind::Overlay { inner, bindings } => {
                write!(f, "with({inner}")?;
                for (name, param) in bindings {
                    write!(f, "; {name}={param}")?;
                }
                f.write_str(")")
            }
            Kind::End => f.write_str("END"),
        }
    }
}

impl fmt::Debug for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Combinator({self})")
    }
}
