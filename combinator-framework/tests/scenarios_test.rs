use combinator_framework::{
    end, lit, none_of, one_of, seq, var, Error, Grammar, Namespace, Node, Position, StrSource,
    SyntaxErrorKind, Value, Var,
};

#[test]
fn test_literal_prefix() {
    let (value, position) = lit("abc").try_parse("abcde").unwrap();
    let value = value.unwrap();
    let token = value.as_token().unwrap();
    assert_eq!(token.text(), "abc");
    assert_eq!(token.start().offset, 0);
    assert_eq!(token.end().offset, 3);
    assert_eq!(position.offset, 3);
}

#[test]
fn test_choice_second_alternative() {
    let (value, position) = (lit("abc") | lit("def")).try_parse("defgh").unwrap();
    assert_eq!(value.unwrap().as_token().unwrap().text(), "def");
    assert_eq!(position.offset, 3);
}

#[test]
fn test_sequence_restores_start_position() {
    let parser = seq([lit("("), var("INNER"), lit(")")]);
    let ns = Namespace::new().bind("INNER", lit("y"));
    let (value, position) = parser
        .attempt(&ns, Position::new(), &StrSource::new("(x"))
        .unwrap();
    assert!(value.is_none());
    assert_eq!(position.offset, 0);
}

#[test]
fn test_joined_repeat() {
    let parser = lit("1").join(",").keep_joins();
    let (value, position) = parser.try_parse("1,1,1").unwrap();
    let value = value.unwrap();
    let items = value.get(0).as_list().unwrap();
    let joins = value.get(1).as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.as_str() == Some("1")));
    assert_eq!(joins.len(), 2);
    assert!(joins.iter().all(|join| join.as_str() == Some(",")));
    assert_eq!(position.offset, 5);
}

fn outline() -> Grammar {
    let indent = seq([
        one_of(" ").times(Var::new("indent")),
        one_of(" ")
            .not_ahead()
            .expect("unexpected indentation on line {line}"),
    ]);
    let name = none_of(":\n").at_least(1).map(|value| Value::Text(value.text()));
    let children = lit(":\n") + var("BLOCK").with("indent", Var::new("indent").add(1i64));
    let tail = children.project(&[1]) | lit("\n") | end();
    let line = seq([indent, name, tail]).map(|value| {
        let line = value.line().unwrap_or(0);
        let name = value.get(1).clone();
        let children = value.get(2).clone();
        let children = if children.as_list().is_some() {
            children.into_list()
        } else {
            Vec::new()
        };
        let mut nodes = vec![name];
        nodes.extend(children);
        Value::Node(Node::new("item", line, nodes))
    });

    Grammar::builder()
        .rule("LINE", line)
        .rule("BLOCK", var("LINE").at_least(1))
        .rule("start", var("BLOCK"))
        .value("indent", 0i64)
        .build()
        .unwrap()
}

fn depth_of(value: &Value) -> Vec<(String, usize)> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<(String, usize)>) {
        out.push((node.child(0).text(), depth));
        for child in &node.children[1..] {
            if let Some(inner) = child.as_node() {
                walk(inner, depth + 1, out);
            }
        }
    }
    let mut out = Vec::new();
    for item in value.as_list().unwrap_or_default() {
        if let Some(node) = item.as_node() {
            walk(node, 0, &mut out);
        }
    }
    out
}

#[test]
fn test_indentation_nesting() {
    let value = outline().parse("a:\n b:\n  c\n").unwrap();
    assert_eq!(
        depth_of(&value),
        vec![("a".to_string(), 0), ("b".to_string(), 1), ("c".to_string(), 2)]
    );

    let a = value.get(0).as_node().unwrap();
    assert_eq!(a.line, 1);
    let b = a.child(1).as_node().unwrap();
    assert_eq!(b.line, 2);
    let c = b.child(1).as_node().unwrap();
    assert_eq!(c.line, 3);
    assert_eq!(c.children.len(), 1);
}

#[test]
fn test_indentation_siblings() {
    let value = outline().parse("a:\n b\n c\nd").unwrap();
    let top = value.as_list().unwrap();
    assert_eq!(top.len(), 2);
    let a = top[0].as_node().unwrap();
    assert_eq!(a.children.len(), 3);
    assert_eq!(top[1].as_node().unwrap().child(0).text(), "d");
}

#[test]
fn test_indentation_too_deep() {
    let err = outline().parse("a:\n   b\n").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.kind, SyntaxErrorKind::Expected);
    assert_eq!(syntax.line, 2);
    assert_eq!(syntax.message, "unexpected indentation on line 2");
}

#[test]
fn test_mandatory_expression() {
    let expression = one_of("0123456789").at_least(1);
    let parser = seq([lit("if"), expression.expect("expected an expression")]);
    let err = parser.try_parse("if ").unwrap_err();
    match err {
        Error::Syntax(syntax) => {
            assert_eq!(syntax.message, "expected an expression");
            assert_eq!(syntax.to_string(), "expected an expression");
            assert_eq!(syntax.line, 1);
            assert_eq!(syntax.column, 3);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}
