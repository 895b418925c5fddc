//! JSON, parsed into [`Value`] trees.
//!
//! Objects become [`Value::Map`] with keys in source order, arrays become
//! [`Value::List`], `null` becomes [`Value::Empty`]. Serializing the result
//! with `serde_json` gives back equivalent JSON.

use combinator_framework::{lit, none_of, one_of, var, Error, Grammar, GrammarError, Value};

const HEX: &str = "0123456789abcdefABCDEF";

pub fn grammar() -> Result<Grammar, GrammarError> {
    let ws = one_of(" \t\r\n").repeat();
    let digits = one_of("0123456789").at_least(1);

    let number = (lit("-").optional()
        + digits.clone()
        + (lit(".") + digits.clone()).optional()
        + (one_of("eE") + one_of("+-").optional() + digits).optional())
    .map(|value| number_value(&value.text()));

    let hex = one_of(HEX)
        .exactly(4)
        .expect("invalid unicode escape at line {line}, column {column}");
    let unicode = (lit("\\u") + hex)
        .project(&[1])
        .map(|value| {
            let code = u32::from_str_radix(&value.text(), 16).ok();
            let ch = code.and_then(char::from_u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            Value::Text(ch.to_string())
        });
    let escape = (lit("\\")
        + one_of("\"\\/bfnrt").expect("invalid escape {found} at line {line}, column {column}"))
    .project(&[1])
    .map(|value| Value::Text(unescape(&value.text()).to_string()));
    let string = (lit("\"")
        + (unicode | escape | none_of("\"\\\n")).repeat()
        + lit("\"").expect("unterminated string at line {line}, column {column}"))
    .project(&[1])
    .map(|value| Value::Text(value.text()));

    let element = (ws.clone() + var("VALUE") + ws.clone()).project(&[1]);
    let array = (lit("[")
        + ws.clone()
        + var("ELEMENT").join(",")
        + lit("]").expect("unexpected {found} in array at line {line}, column {column}"))
    .project(&[2]);

    let member = (ws.clone()
        + var("STRING")
        + ws.clone()
        + lit(":").expect("expected ':' after object key at line {line}, column {column}")
        + var("ELEMENT").expect("expected a value at line {line}, column {column}"))
    .project(&[1, 4]);
    let object = (lit("{")
        + ws
        + var("MEMBER").join(",")
        + lit("}").expect("unexpected {found} in object at line {line}, column {column}"))
    .project(&[2])
    .map(|value| {
        let entries = value
            .into_list()
            .into_iter()
            .map(|pair| {
                let mut pair = pair.into_list();
                let item = pair.pop().unwrap_or_default();
                let key = pair.pop().map(|key| key.text()).unwrap_or_default();
                (key, item)
            })
            .collect();
        Value::Map(entries)
    });

    let constant = lit("true").map(|_| Value::Bool(true))
        | lit("false").map(|_| Value::Bool(false))
        | lit("null").map(|_| Value::Empty);

    Grammar::builder()
        .rule("STRING", string)
        .rule("ELEMENT", element)
        .rule("MEMBER", member)
        .rule("VALUE", object | array | var("STRING") | number | constant)
        .rule("start", var("ELEMENT"))
        .build()
}

/// Parses a complete JSON document.
pub fn parse(text: &str) -> Result<Value, Error> {
    grammar()?.parse(text)
}

fn number_value(text: &str) -> Value {
    if !text.contains(|ch: char| matches!(ch, '.' | 'e' | 'E')) {
        if let Ok(int) = text.parse::<i64>() {
            return Value::Int(int);
        }
    }
    text.parse::<f64>().map_or(Value::Empty, Value::Float)
}

fn unescape(code: &str) -> char {
    match code {
        "b" => '\u{8}',
        "f" => '\u{c}',
        "n" => '\n',
        "r" => '\r',
        "t" => '\t',
        other => other.chars().next().unwrap_or_default(),
    }
}
