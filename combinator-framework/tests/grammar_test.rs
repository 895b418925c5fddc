use combinator_framework::{
    lit, one_of, var, Error, Grammar, GrammarError, Position, StrSource, SyntaxErrorKind, Value,
    Var,
};

fn arithmetic() -> Grammar {
    let number = one_of("0123456789")
        .at_least(1)
        .map(|value| Value::Int(value.text().parse().unwrap_or(0)));
    let group = lit("(")
        + var("SUM").expect("expected an expression after '('")
        + lit(")").expect("unclosed '(' at line {line}");
    let atom = var("NUMBER") | group.project(&[1]);
    let product = var("ATOM").at_least(1).join("*").map(|value| {
        Value::Int(value.into_list().iter().filter_map(Value::as_int).product())
    });
    let sum = var("PRODUCT").at_least(1).join("+").map(|value| {
        Value::Int(value.into_list().iter().filter_map(Value::as_int).sum())
    });
    Grammar::builder()
        .rule("NUMBER", number)
        .rule("ATOM", atom)
        .rule("PRODUCT", product)
        .rule("SUM", sum)
        .start("SUM")
        .build()
        .unwrap()
}

#[test]
fn test_forward_and_recursive_references() {
    let grammar = arithmetic();
    assert_eq!(grammar.parse("2+3*4").unwrap(), Value::Int(14));
    assert_eq!(grammar.parse("(2+3)*4").unwrap(), Value::Int(20));
    assert_eq!(grammar.parse("((7))").unwrap(), Value::Int(7));
}

#[test]
fn test_unconsumed_input_is_reported() {
    let err = arithmetic().parse("2+3 x").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.kind, SyntaxErrorKind::Unconsumed);
    assert_eq!(syntax.column, 4);
    assert_eq!(syntax.message, "unexpected character ' ' at line 1, column 4");
}

#[test]
fn test_no_match_is_reported_at_start() {
    let err = arithmetic().parse("x").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.offset, 0);
}

#[test]
fn test_mandatory_messages() {
    let err = arithmetic().parse("(2+3").unwrap_err();
    assert_eq!(err.to_string(), "unclosed '(' at line 1");

    let err = arithmetic().parse("(").unwrap_err();
    assert_eq!(err.to_string(), "expected an expression after '('");
}

#[test]
fn test_start_override() {
    let grammar = arithmetic();
    assert_eq!(grammar.run().start("NUMBER").parse("42").unwrap(), Value::Int(42));
    assert!(grammar.run().start("NUMBER").parse("4+2").is_err());
}

#[test]
fn test_partial_parse_reports_stop_position() {
    let grammar = arithmetic();
    let source = StrSource::new("1+2;rest");
    let (value, position) = grammar.run().parse_partial(&source).unwrap().unwrap();
    assert_eq!(value, Value::Int(3));
    assert_eq!(position.offset, 3);
}

#[test]
fn test_start_at_position() {
    let grammar = arithmetic();
    let source = StrSource::new("ignored: 6*7");
    let start = Position::new().advance(&source, 9);
    let value = grammar.run().at(start).parse_source(&source).unwrap();
    assert_eq!(value, Value::Int(42));
}

#[test]
fn test_initial_bindings() {
    let grammar = Grammar::builder()
        .rule("start", lit("-").times(Var::new("width")))
        .value("width", 2i64)
        .build()
        .unwrap();
    assert!(grammar.parse("--").is_ok());
    assert!(grammar.parse("---").is_err());
    assert!(grammar.run().bind("width", 3i64).parse("---").is_ok());
}

#[test]
fn test_bind_rule_for_one_run() {
    let grammar = Grammar::builder()
        .rule("start", lit("<") + var("BODY") + ">")
        .rule("BODY", lit("a"))
        .build()
        .unwrap();
    assert!(grammar.parse("<b>").is_err());
    let value = grammar.run().bind_rule("BODY", lit("b")).parse("<b>").unwrap();
    assert_eq!(value.text(), "<b>");
}

#[test]
fn test_missing_start_rule() {
    let err = Grammar::builder().rule("main", lit("x")).build().unwrap_err();
    assert_eq!(err, GrammarError::UnknownRule { name: "start".into() });

    let grammar = Grammar::builder().rule("start", lit("x")).build().unwrap();
    let err = grammar.run().start("nope").parse("x").unwrap_err();
    assert!(matches!(err, Error::Grammar(GrammarError::UnknownRule { .. })));
}

#[test]
fn test_rules_are_labelled() {
    let grammar = arithmetic();
    assert_eq!(grammar.rule("ATOM").unwrap().label(), Some("ATOM"));
    assert_eq!(grammar.rule("ATOM").unwrap().to_string(), "ATOM");
    assert!(grammar.rule("missing").is_none());
}
