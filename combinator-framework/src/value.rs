use std::fmt;

use common_framework::Token;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A node of the semantic tree handed to downstream stages.
///
/// Grammars build these from factories. `line` is the source line the node
/// starts on, kept for later diagnostics.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Node {
    pub kind: String,
    pub line: usize,
    pub children: Vec<Value>,
}

impl Node {
    pub fn new<K: Into<String>>(kind: K, line: usize, children: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            line,
            children,
        }
    }

    /// Returns the child at `index`, or [`Value::Empty`] if there is none.
    pub fn child(&self, index: usize) -> &Value {
        self.children.get(index).unwrap_or(&Value::Empty)
    }
}

/// Everything a combinator can produce and a factory can map.
///
/// Elementary matches yield [`Value::Token`], sequences and repetitions yield
/// [`Value::List`], end-of-input yields [`Value::End`]. The remaining variants
/// exist for factories and for namespace parameters.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// A matched but discarded result.
    #[default]
    Empty,
    /// Sentinel produced by the end-of-input combinator.
    End,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Token(Token),
    List(Vec<Value>),
    /// Ordered key/value pairs.
    Map(Vec<(String, Value)>),
    Node(Node),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty value",
            Value::End => "end marker",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Token(_) => "token",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Node(_) => "node",
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the text of a [`Value::Text`] or [`Value::Token`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Token(token) => Some(token.text()),
            _ => None,
        }
    }

    /// Consumes a list, returning its items. Any other value becomes a
    /// one-element list, and `Empty` becomes no items.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            Value::Empty => Vec::new(),
            other => vec![other],
        }
    }

    /// Returns the item at `index` of a list, or [`Value::Empty`].
    pub fn get(&self, index: usize) -> &Value {
        match self {
            Value::List(items) => items.get(index).unwrap_or(&Value::Empty),
            _ => &Value::Empty,
        }
    }

    /// Concatenates the text of every token and text value in the tree, in
    /// order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Value::Text(text) => out.push_str(text),
            Value::Token(token) => out.push_str(token.text()),
            Value::List(items) => items.iter().for_each(|item| item.collect_text(out)),
            Value::Map(entries) => entries.iter().for_each(|(_, item)| item.collect_text(out)),
            Value::Node(node) => node.children.iter().for_each(|item| item.collect_text(out)),
            _ => {}
        }
    }

    /// The first source line this value covers, if it carries one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Value::Token(token) => Some(token.start_line()),
            Value::Node(node) => Some(node.line),
            Value::List(items) => items.iter().find_map(Value::line),
            Value::Map(entries) => entries.iter().find_map(|(_, item)| item.line()),
            _ => None,
        }
    }

    /// Truthiness used by conditional parameters.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Empty => false,
            Value::End | Value::Node(_) => true,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Text(text) => !text.is_empty(),
            Value::Token(token) => !token.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty | Value::End => Ok(()),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(text) => f.write_str(text),
            Value::Token(token) => f.write_str(token.text()),
            Value::List(_) | Value::Map(_) => f.write_str(&self.text()),
            Value::Node(node) => write!(f, "{}@{}", node.kind, node.line),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Empty | Value::End => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Token(token) => serializer.serialize_str(token.text()),
            Value::List(items) => items.serialize(serializer),
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

impl From<Token> for Value {
    fn from(value: Token) -> Self {
        Value::Token(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_framework::Position;

    fn token(text: &str, line: usize) -> Value {
        let start = Position::at(line, 1, 0);
        let end = Position::at(line, 1 + text.len(), text.len());
        Value::Token(Token::new(text, start, end))
    }

    #[test]
    fn test_text_flattens_nested_values() {
        let value = Value::List(vec![
            token("a", 1),
            Value::List(vec![token("b", 1), Value::Empty, token("c", 1)]),
            Value::Text("d".into()),
        ]);
        assert_eq!(value.text(), "abcd");
        assert_eq!(value.to_string(), "abcd");
    }

    #[test]
    fn test_line_finds_first_carrier() {
        let value = Value::List(vec![Value::Empty, token("x", 4), token("y", 6)]);
        assert_eq!(value.line(), Some(4));
        assert_eq!(Value::Int(1).line(), None);
    }

    #[test]
    fn test_into_list() {
        assert_eq!(Value::Empty.into_list(), Vec::<Value>::new());
        assert_eq!(Value::Int(3).into_list(), vec![Value::Int(3)]);
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).into_list().len(),
            2
        );
    }

    #[test]
    fn test_serialize_node_tree() {
        let node = Node::new(
            "pair",
            2,
            vec![
                token("key", 2),
                Value::Map(vec![("n".into(), Value::Int(1))]),
                Value::End,
            ],
        );
        let json = serde_json::to_value(Value::Node(node)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "pair",
                "line": 2,
                "children": ["key", {"n": 1}, null],
            })
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Empty.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(2).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::End.is_truthy());
    }
}
