//! Croco, a small indentation-based statement language.
//!
//! ```text
//! total = 0
//! for n in range(10):
//!     if n % 2:
//!         total += n
//!     else: print(n)
//! ```
//!
//! Parsing produces a tree of [`Node`]s, each tagged with the line it starts
//! on. Expressions support comparisons and `+ - * / // % **` with the usual
//! precedence, attribute access, calls, indexing and tuple, list and set
//! literals. Statements are assignments (optionally in-place, `+=` and
//! friends), `break`, `continue`, `pass` and bare expressions, separated by
//! newlines or `;`. `if`/`elif`/`else`, `while` and `for` open a block that is
//! either inline after the `:` or indented exactly one level deeper on the
//! following lines. One level of indentation is four spaces or a tab. A
//! backslash before a newline continues the line, and newlines are ignored
//! inside brackets.
//!
//! Node kinds and their children:
//!
//! | kind | children |
//! |------|----------|
//! | `block` | statements |
//! | `number`, `string`, `name` | the literal value |
//! | `binop`, `compare` | operator, left, right |
//! | `tuple`, `list`, `set` | items |
//! | `getattr` | object, attribute name |
//! | `call` | callee, arguments... |
//! | `getitem` | object, index |
//! | `assign` | target, in-place operator (or `""`), value |
//! | `if`, `while` | condition, block, optional else branch |
//! | `for` | target, iterable, block, optional else branch |
//! | `break`, `continue`, `pass` | none |

use combinator_framework::{
    choice, end, lit, one_of, seq, var, Combinator, Error, Grammar, GrammarError, Node, Value, Var,
};

const IDENT_START: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const DIGITS: &str = "0123456789";
const KEYWORDS: [&str; 9] = [
    "if", "elif", "else", "while", "for", "in", "break", "continue", "pass",
];
const INPLACE_OPS: [&str; 10] = ["//", "**", "+", "-", "*", "/", "%", "@", "|", "&"];

fn node(kind: &str, line: usize, children: Vec<Value>) -> Value {
    Value::Node(Node::new(kind, line, children))
}

fn ident_char() -> Combinator {
    one_of(&format!("{IDENT_START}{DIGITS}"))
}

/// A reserved word not followed by another identifier character.
fn keyword(word: &str) -> Combinator {
    (lit(word) + ident_char().not_ahead()).project(&[0])
}

fn spaced(inner: Combinator) -> Combinator {
    (var("SPACES") + inner + var("SPACES")).project(&[1])
}

/// `open inner close`; newlines count as spaces between the brackets. The
/// opening token is bound to `bracket_opening` so an unclosed bracket is
/// reported where it was opened.
fn bracketed(inner: Combinator, open: &str, close: &str) -> Combinator {
    let body = (var("SPACES") + inner)
        .project(&[1])
        .with("SPACES", var("MULTILINE_SPACES"));
    let brace = |text: &str| text.replace('{', "{{").replace('}', "}}");
    let message = format!(
        "expected closing '{}' for '{}' opened on line {{bracket_opening.line}}",
        brace(close),
        brace(open),
    );
    let close = lit(close).expect(message);
    (lit(open).capture("bracket_opening") + body + close).project(&[0, 1])
}

/// A bracketed, comma separated collection. A single parenthesized item
/// without a trailing comma is just that item.
fn collection(open: &str, close: &str, kind: &'static str) -> Combinator {
    let items = var("EXPRESSION").join(",") + (lit(",") + var("SPACES")).optional();
    bracketed(items, open, close).map(move |value| {
        let line = value.line().unwrap_or(0);
        let mut parts = value.get(1).clone().into_list();
        let trailing = parts.pop().unwrap_or_default();
        let items = parts.pop().unwrap_or_default().into_list();
        if kind == "tuple" && items.len() == 1 && !trailing.is_truthy() {
            return items.into_iter().next().unwrap_or_default();
        }
        node(kind, line, items)
    })
}

/// One left-associative precedence level over the rule named `operand`.
fn operator_level(ops: &[&str], operand: &str, kind: &'static str) -> Combinator {
    let op = choice(ops.iter().map(|op| lit(*op)))
        .map(|value| Value::Text(value.text()))
        .capture("last_op");
    let rhs = var(operand).expect("expected an expression after '{last_op}' on line {line}");
    (var(operand) + (op + rhs).repeat()).map(move |value| fold_binary(kind, value))
}

fn fold_binary(kind: &str, value: Value) -> Value {
    let mut parts = value.into_list();
    let rest = parts.pop().unwrap_or_default();
    let mut acc = parts.pop().unwrap_or_default();
    for pair in rest.into_list() {
        let mut pair = pair.into_list();
        let rhs = pair.pop().unwrap_or_default();
        let op = pair.pop().unwrap_or_default();
        let line = acc.line().unwrap_or(0);
        acc = node(kind, line, vec![op, acc, rhs]);
    }
    acc
}

/// Applies postfix operations (attribute, call, index) to their target.
fn apply_postfix(value: Value) -> Value {
    let mut parts = value.into_list();
    let ops = parts.pop().unwrap_or_default();
    let mut target = parts.pop().unwrap_or_default();
    for op in ops.into_list() {
        if let Value::Node(mut op) = op {
            op.children.insert(0, target);
            target = Value::Node(op);
        }
    }
    target
}

fn block_node(value: Value) -> Value {
    let mut statements = Vec::new();
    for item in value.into_list() {
        match item {
            Value::Empty => {}
            Value::List(items) => statements.extend(items),
            other => statements.push(other),
        }
    }
    let line = statements.first().and_then(Value::line).unwrap_or(0);
    node("block", line, statements)
}

/// `header: body`, where the body is inline or an indented block.
fn clause(header: Combinator) -> Combinator {
    let line_end = (lit("\n") | end()).expect("unexpected {found} on line {line}, column {column}");
    let inline = (var("STATEMENT").at_least(1).join(";") + var("COMMENT").optional() + line_end)
        .project(&[0])
        .map(block_node);
    let nested = (var("SPACES")
        + lit("\n")
        + var("BLOCK")
            .expect("expected an indented block on line {line}")
            .with("indent", Var::new("indent").add(1i64)))
    .project(&[2]);
    let colon = (var("SPACES") + lit(":").expect("expected ':' on line {line}, column {column}")).project(&[1]);
    (var("INDENT") + header + colon + (inline | nested))
        .project(&[1, 3])
        .map(|value| {
            let mut parts = value.into_list();
            let body = parts.pop().unwrap_or_default();
            match parts.pop() {
                Some(Value::Node(mut header)) => {
                    header.children.push(body);
                    Value::Node(header)
                }
                _ => body,
            }
        })
}

/// Chains `elif` and `else` clauses onto the clause they follow.
fn join_else(value: Value) -> Value {
    let mut parts = value.into_list();
    let else_clause = parts.pop().unwrap_or_default();
    let elifs = parts.pop().unwrap_or_default();
    let first = parts.pop().unwrap_or_default();

    let mut tail = else_clause
        .into_list()
        .pop()
        .and_then(|clause| clause.as_node().map(|node| node.child(0).clone()));
    for elif in elifs.into_list().into_iter().rev() {
        if let Value::Node(mut elif) = elif {
            elif.children.extend(tail.take());
            tail = Some(Value::Node(elif));
        }
    }
    match first {
        Value::Node(mut first) => {
            first.children.extend(tail);
            Value::Node(first)
        }
        other => other,
    }
}

pub fn grammar() -> Result<Grammar, GrammarError> {
    let float = ((one_of(DIGITS).at_least(1) + "." + one_of(DIGITS).repeat())
        | (lit(".") + one_of(DIGITS).at_least(1)))
    .map(|value| {
        let line = value.line().unwrap_or(0);
        let text = value.text();
        let literal = text.parse::<f64>().map_or(Value::Text(text), Value::Float);
        node("number", line, vec![literal])
    });
    let int = one_of(DIGITS).at_least(1).map(|value| {
        let line = value.line().unwrap_or(0);
        let text = value.text();
        let literal = text.parse::<i64>().map_or(Value::Text(text), Value::Int);
        node("number", line, vec![literal])
    });
    let string = (one_of("'\"").capture("quote")
        + (!var("quote")).repeat()
        + var("quote").expect("unclosed quote {quote} on line {line}"))
    .map(|value| {
        let line = value.line().unwrap_or(0);
        node("string", line, vec![Value::Text(value.get(1).text())])
    });
    let reserved = choice(KEYWORDS.iter().map(|word| keyword(word)));
    let identifier = (reserved.not_ahead() + one_of(IDENT_START) + ident_char().repeat())
        .project(&[1, 2])
        .map(|value| {
            let line = value.line().unwrap_or(0);
            node("name", line, vec![Value::Text(value.text())])
        });

    let primary = spaced(
        var("NUMBER")
            | var("STRING")
            | var("IDENTIFIER")
            | collection("(", ")", "tuple")
            | collection("[", "]", "list")
            | collection("{", "}", "set"),
    );
    let getattr = (lit(".") + spaced(var("IDENTIFIER")).expect("expected an attribute name on line {line}"))
        .map(|value| {
            let line = value.line().unwrap_or(0);
            let name = value.get(1).as_node().map(|name| name.child(0).clone());
            node("getattr", line, name.into_iter().collect())
        });
    let call = bracketed(var("EXPRESSION").join(","), "(", ")").map(|value| {
        let line = value.line().unwrap_or(0);
        node("call", line, value.get(1).clone().into_list())
    });
    let getitem = bracketed(
        var("EXPRESSION").expect("expected an index expression on line {line}"),
        "[",
        "]",
    )
    .map(|value| {
        let line = value.line().unwrap_or(0);
        node("getitem", line, vec![value.get(1).clone()])
    });
    let postfix = (var("PRIMARY") + (getattr | call | getitem).repeat() + var("SPACES"))
        .project(&[0, 1])
        .map(apply_postfix);

    let inplace = choice(INPLACE_OPS.iter().map(|op| lit(*op))).optional();
    let assignment = (var("POSTFIX")
        + inplace
        + lit("=")
        + lit("=").not_ahead()
        + var("EXPRESSION").expect("expected an expression after '=' on line {line}"))
    .map(|value| {
        let line = value.line().unwrap_or(0);
        let target = value.get(0).clone();
        let op = Value::Text(value.get(1).text());
        let assigned = value.get(4).clone();
        node("assign", line, vec![target, op, assigned])
    });

    let indent = seq([
        (lit("    ") | "\t").times(Var::new("indent")),
        one_of(" \t")
            .not_ahead()
            .expect("too many indentations on line {line}, column {column}"),
    ]);
    let empty_line = ((one_of(" \t").repeat() + var("COMMENT").optional() + "\n")
        | (one_of(" \t").at_least(1) + end()))
    .map(|_| Value::Empty);
    let line_end = (lit("\n") | end()).expect("unexpected {found} on line {line}, column {column}");
    let simple_line = (var("INDENT")
        + var("STATEMENT").at_least(1).join(";")
        + var("COMMENT").optional()
        + line_end)
        .project(&[1]);
    let keyword_statement = choice(["break", "continue", "pass"].map(|word| {
        keyword(word).map(move |value| node(word, value.line().unwrap_or(0), Vec::new()))
    }));

    let condition = |word: &str| {
        let message = format!("expected a condition after '{word}' on line {{line}}");
        let kind = if word == "while" { "while" } else { "if" };
        (keyword(word) + var("EXPRESSION").expect(message)).map(move |value| {
            let line = value.line().unwrap_or(0);
            node(kind, line, vec![value.get(1).clone()])
        })
    };
    let for_header = (keyword("for")
        + var("POSTFIX").expect("expected a loop target on line {line}")
        + keyword("in").expect("expected 'in' on line {line}, column {column}")
        + var("EXPRESSION").expect("expected an iterable on line {line}"))
    .map(|value| {
        let line = value.line().unwrap_or(0);
        node("for", line, vec![value.get(1).clone(), value.get(3).clone()])
    });
    let else_header = keyword("else").map(|value| node("else", value.line().unwrap_or(0), Vec::new()));
    let flow_control = (clause(condition("if") | condition("while") | for_header)
        + clause(condition("elif")).repeat()
        + clause(else_header).optional())
    .map(join_else);

    Grammar::builder()
        .rule("SPACES", (one_of(" \t") | "\\\n").repeat())
        .rule("MULTILINE_SPACES", (one_of(" \t\r\n") | "\\\n" | var("COMMENT")).repeat())
        .rule("COMMENT", lit("#") + (!lit("\n")).repeat())
        .rule("NUMBER", float | int)
        .rule("STRING", string)
        .rule("IDENTIFIER", identifier)
        .rule("PRIMARY", primary)
        .rule("POSTFIX", postfix)
        .rule("EXPONENT", operator_level(&["**"], "POSTFIX", "binop"))
        .rule("MULTIPLICATION", operator_level(&["*", "//", "/", "%"], "EXPONENT", "binop"))
        .rule("ADDITION", operator_level(&["+", "-"], "MULTIPLICATION", "binop"))
        .rule(
            "EXPRESSION",
            operator_level(&["<=", "<", ">=", ">", "!=", "=="], "ADDITION", "compare"),
        )
        .rule("STATEMENT", spaced(keyword_statement) | assignment | var("EXPRESSION"))
        .rule("INDENT", indent)
        .rule("BLOCK", (empty_line | flow_control | simple_line).at_least(1).map(block_node))
        .rule("start", var("BLOCK") | end().map(|_| node("block", 1, Vec::new())))
        .value("indent", 0i64)
        .build()
}

/// Parses a complete croco program.
pub fn parse(text: &str) -> Result<Value, Error> {
    grammar()?.parse(text)
}

/// Renders a parse tree as an s-expression, e.g.
/// `(block (assign (name "a") "" (number 1)))`.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Node(node) => {
            out.push('(');
            out.push_str(&node.kind);
            for child in &node.children {
                out.push(' ');
                write_value(child, out);
            }
            out.push(')');
        }
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Text(text) => out.push_str(&format!("{text:?}")),
        Value::Token(token) => out.push_str(&format!("{:?}", token.text())),
        other => out.push_str(&other.to_string()),
    }
}
