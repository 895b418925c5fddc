use common_framework::{Position, Source};

use crate::namespace::Namespace;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Line,
    Column,
    Offset,
    Found,
    Name(String),
    Field(String, Field),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Line,
    Column,
}

/// A diagnostic message with placeholders filled in when it is raised.
///
/// Recognised placeholders are `{line}`, `{column}` (or `{col}`), `{offset}`,
/// `{found}` for the character at the failure point, and `{NAME}` for any
/// namespace binding, which lets a message mention a value captured earlier
/// in the parse. `{NAME.line}` and `{NAME.column}` give where a captured token
/// starts, so a message can point back at an opening delimiter. `{{` and `}}`
/// are literal braces. A name with no binding is left in the output as
/// written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(template: &str) -> Self {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        text.push('{');
                        text.push_str(&name);
                        continue;
                    }
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(match name.trim() {
                        "line" => Piece::Line,
                        "column" | "col" => Piece::Column,
                        "offset" => Piece::Offset,
                        "found" => Piece::Found,
                        other => match other.split_once('.') {
                            Some((name, "line")) => Piece::Field(name.to_string(), Field::Line),
                            Some((name, "column")) => Piece::Field(name.to_string(), Field::Column),
                            _ => Piece::Name(other.to_string()),
                        },
                    });
                }
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Self { pieces }
    }

    pub fn render(&self, namespace: &Namespace, position: Position, source: &dyn Source) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Line => out.push_str(&position.line.to_string()),
                Piece::Column => out.push_str(&position.column.to_string()),
                Piece::Offset => out.push_str(&position.offset.to_string()),
                Piece::Found => match source.char_at(position.offset) {
                    Some(ch) => out.push_str(&format!("{ch:?}")),
                    None => out.push_str("end of input"),
                },
                Piece::Name(name) => match namespace.get(name) {
                    Some(binding) => out.push_str(&binding.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
                Piece::Field(name, field) => {
                    let value = namespace.value(name);
                    let found = match field {
                        Field::Line => value.and_then(Value::line),
                        Field::Column => value.and_then(Value::as_token).map(|token| token.start_column()),
                    };
                    match found {
                        Some(number) => out.push_str(&number.to_string()),
                        None => {
                            let field = match field {
                                Field::Line => "line",
                                Field::Column => "column",
                            };
                            out.push_str(&format!("{{{name}.{field}}}"));
                        }
                    }
                }
            }
        }
        out
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Template::parse(value)
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Template::parse(&value)
    }
}
