//! An indentation-structured outline.
//!
//! ```text
//! fruit:
//!  apple
//!  pear
//! vegetables
//! ```
//!
//! A line ending in `:` opens a block whose lines sit exactly one space
//! deeper. Each line becomes an `item` [`Node`] whose first child is its
//! text and whose remaining children are the items of its block. A line
//! indented deeper than its block allows is a hard error.

use combinator_framework::{
    end, lit, none_of, one_of, seq, var, Error, Grammar, GrammarError, Node, Value, Var,
};

pub fn grammar() -> Result<Grammar, GrammarError> {
    let indent = seq([
        one_of(" ").times(Var::new("indent")),
        one_of(" ")
            .not_ahead()
            .expect("unexpected indentation on line {line}"),
    ]);
    let text = none_of(":\n")
        .at_least(1)
        .map(|value| Value::Text(value.text()));
    let block = (lit(":\n") + var("BLOCK").with("indent", Var::new("indent").add(1i64))).project(&[1]);
    let line = seq([indent, text, block | lit("\n") | end()]).map(|value| {
        let line = value.line().unwrap_or(0);
        let mut parts = value.into_list();
        let children = parts.pop().unwrap_or_default();
        let text = parts.pop().unwrap_or_default();
        let mut items = vec![text];
        if children.as_list().is_some() {
            items.extend(children.into_list());
        }
        Value::Node(Node::new("item", line, items))
    });

    Grammar::builder()
        .rule("LINE", line)
        .rule("BLOCK", var("LINE").at_least(1))
        .rule("start", var("BLOCK"))
        .value("indent", 0i64)
        .build()
}

pub fn parse(text: &str) -> Result<Value, Error> {
    grammar()?.parse(text)
}

/// Renders a parsed outline back to text, one line per item.
pub fn render(value: &Value) -> String {
    fn walk(node: &Node, depth: usize, out: &mut String) {
        out.push_str(&" ".repeat(depth));
        out.push_str(&node.child(0).text());
        if node.children.len() > 1 {
            out.push(':');
        }
        out.push('\n');
        for child in node.children.iter().skip(1).filter_map(Value::as_node) {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    for node in value.as_list().unwrap_or_default().iter().filter_map(Value::as_node) {
        walk(node, 0, &mut out);
    }
    out
}
