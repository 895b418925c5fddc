use common_framework::{Position, Source, StrSource};
use tracing::debug;

use crate::combinator::Combinator;
use crate::error::{Error, GrammarError, SyntaxError};
use crate::namespace::{Binding, Namespace};
use crate::value::Value;

/// Default name of the rule a parse starts from.
pub const DEFAULT_START: &str = "start";

/// A set of named rules plus the name of the one to start from.
///
/// Rules refer to each other through [`var`](crate::var), so they can be
/// added in any order and may be mutually recursive.
#[derive(Clone, Debug)]
pub struct Grammar {
    namespace: Namespace,
    start: String,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// The namespace holding every rule and value of this grammar.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Looks up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Combinator> {
        self.namespace.get(name).and_then(Binding::as_rule)
    }

    /// Parses the whole of `text` with the start rule.
    pub fn parse(&self, text: &str) -> Result<Value, Error> {
        self.run().parse(text)
    }

    /// Parses the whole of `source` with the start rule.
    pub fn parse_source(&self, source: &dyn Source) -> Result<Value, Error> {
        self.run().parse_source(source)
    }

    /// Starts configuring a single parse.
    pub fn run(&self) -> Run<'_> {
        Run {
            grammar: self,
            start: self.start.clone(),
            position: Position::new(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Collects rules and values for a [`Grammar`].
#[derive(Default)]
pub struct GrammarBuilder {
    bindings: Vec<(String, Binding)>,
    start: Option<String>,
}

impl GrammarBuilder {
    /// Adds a rule. The combinator is labelled with `name` so traces and
    /// `Display` show the rule name instead of its structure.
    pub fn rule<N, C>(mut self, name: N, rule: C) -> Self
    where
        N: Into<String>,
        C: Into<Combinator>,
    {
        let name = name.into();
        let rule = rule.into().labelled(name.clone());
        self.bindings.push((name, Binding::Rule(rule)));
        self
    }

    /// Adds a plain value, such as an initial parameter.
    pub fn value<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.bindings.push((name.into(), Binding::Value(value.into())));
        self
    }

    /// Sets the start rule; defaults to [`DEFAULT_START`].
    pub fn start<N: Into<String>>(mut self, name: N) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Fails if the start rule was never defined.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let start = self.start.unwrap_or_else(|| DEFAULT_START.to_string());
        let namespace = Namespace::new().with_bindings(self.bindings);
        if namespace.get(&start).and_then(Binding::as_rule).is_none() {
            return Err(GrammarError::UnknownRule { name: start });
        }
        Ok(Grammar { namespace, start })
    }
}

/// One parse of a [`Grammar`], with per-call overrides.
pub struct Run<'g> {
    grammar: &'g Grammar,
    start: String,
    position: Position,
    namespace: Namespace,
}

impl<'g> Run<'g> {
    /// Starts from another rule.
    pub fn start<N: Into<String>>(mut self, name: N) -> Self {
        self.start = name.into();
        self
    }

    /// Starts at `position` instead of the beginning of the input.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Binds an extra value for this parse only.
    pub fn bind<N: Into<String>, V: Into<Value>>(mut self, name: N, value: V) -> Self {
        self.namespace = self.namespace.bind(name, value.into());
        self
    }

    /// Binds an extra rule for this parse only.
    pub fn bind_rule<N: Into<String>>(mut self, name: N, rule: Combinator) -> Self {
        self.namespace = self.namespace.bind(name, rule);
        self
    }

    pub fn parse(self, text: &str) -> Result<Value, Error> {
        let source = StrSource::new(text);
        self.parse_source(&source)
    }

    /// Parses with the start rule and requires it to consume all input.
    pub fn parse_source(self, source: &dyn Source) -> Result<Value, Error> {
        let start = self.position;
        match self.parse_partial(source)? {
            Some((value, end)) if source.is_end(end.offset) => Ok(value),
            Some((_, end)) => {
                debug!(offset = end.offset, "input left over after start rule");
                Err(SyntaxError::unconsumed(end, source).into())
            }
            None => {
                debug!(offset = start.offset, "start rule did not match");
                Err(SyntaxError::unconsumed(start, source).into())
            }
        }
    }

    /// Runs the start rule without requiring it to reach the end of input.
    /// Returns the value and where it stopped, or `None` on a soft failure.
    pub fn parse_partial(self, source: &dyn Source) -> Result<Option<(Value, Position)>, Error> {
        let rule = self
            .namespace
            .get(&self.start)
            .and_then(Binding::as_rule)
            .cloned()
            .ok_or_else(|| GrammarError::UnknownRule {
                name: self.start.clone(),
            })?;
        debug!(start = %self.start, offset = self.position.offset, "parse");
        let outcome = rule.parse(&self.namespace, self.position, source)?;
        Ok(outcome.map(|success| (success.value, success.position)))
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }
}
