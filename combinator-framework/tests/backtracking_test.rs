use combinator_framework::{
    lit, one_of, var, Combinator, Namespace, Position, StrSource, Value, Var,
};
use rstest::rstest;

fn attempt(parser: &Combinator, ns: &Namespace, text: &str) -> (Option<Value>, Position) {
    parser
        .attempt(ns, Position::new(), &StrSource::new(text))
        .unwrap()
}

#[rstest]
#[case::literal(lit("abc"), "abx")]
#[case::char_class(one_of("xyz"), "a")]
#[case::choice(lit("ab") | lit("ac"), "ad")]
#[case::sequence(lit("a") + "b" + "c" + "d", "abcx")]
#[case::repeat_minimum(lit("a").at_least(3), "aab")]
#[case::not(!lit("a"), "a")]
#[case::end(lit("a") + combinator_framework::end(), "ab")]
fn test_failure_returns_input_position(#[case] parser: Combinator, #[case] text: &str) {
    let (value, position) = attempt(&parser, &Namespace::new(), text);
    assert!(value.is_none());
    assert_eq!(position, Position::new());
    assert_eq!((position.line, position.column), (1, 1));
}

#[test]
fn test_failure_from_inner_start_position() {
    let source = StrSource::new("xxab");
    let start = Position::new().advance(&source, 2);
    let parser = lit("a") + "b" + "c";
    let (value, position) = parser.attempt(&Namespace::new(), start, &source).unwrap();
    assert!(value.is_none());
    assert_eq!(position, start);
}

#[rstest]
#[case("aaa", Some(3), 3)]
#[case("aaaaaa", Some(4), 4)]
#[case("aa", Some(2), 2)]
#[case("a", None, 0)]
#[case("", None, 0)]
fn test_repeat_bounds(#[case] text: &str, #[case] matched: Option<usize>, #[case] offset: usize) {
    let parser = lit("a").between(2, 4);
    let (value, position) = attempt(&parser, &Namespace::new(), text);
    assert_eq!(value.map(|v| v.into_list().len()), matched);
    assert_eq!(position.offset, offset);
}

#[rstest]
#[case("ab", "ab")]
#[case("abc", "abc")]
#[case("abd", "ab")]
fn test_choice_is_first_match(#[case] text: &str, #[case] expected: &str) {
    let parser = lit("abc") | lit("ab");
    let (value, _) = attempt(&parser, &Namespace::new(), text);
    assert_eq!(value.unwrap().text(), expected);
}

#[test]
fn test_failed_branch_capture_is_invisible() {
    // First alternative captures "tag" and then fails; the second one must
    // not see it.
    let tagged = lit("<").capture("tag") + "!";
    let fallback = lit("<") + var("tag");
    let parser = tagged | fallback;
    let ns = Namespace::new().bind("tag", Value::Text("plain".into()));

    let (value, position) = attempt(&parser, &ns, "<plain");
    assert!(value.is_some());
    assert_eq!(position.offset, 6);

    let (value, _) = attempt(&parser, &ns, "<<");
    assert!(value.is_none());
}

#[test]
fn test_capture_survives_successful_branch() {
    let parser = (lit("'") | lit("\"")).capture("q") + one_of("ab").repeat() + var("q");
    let (value, _) = attempt(&parser, &Namespace::new(), "\"ab\"");
    assert!(value.is_some());
    let (value, _) = attempt(&parser, &Namespace::new(), "\"ab'");
    assert!(value.is_none());
}

#[test]
fn test_overlay_does_not_leak_on_success() {
    let parser = var("WORD").with("WORD", "x") + var("WORD");
    let ns = Namespace::new().bind("WORD", Value::Text("y".into()));
    let (value, position) = attempt(&parser, &ns, "xy");
    assert!(value.is_some());
    assert_eq!(position.offset, 2);
    assert_eq!(ns.value("WORD"), Some(&Value::Text("y".into())));
}

#[test]
fn test_overlay_does_not_leak_on_failure() {
    let inner = lit(" ").times(Var::new("indent")) + "x";
    let parser = inner.with("indent", Var::new("indent").add(1i64)) | lit(" ").times(Var::new("indent"));
    let ns = Namespace::new().bind("indent", Value::Int(1));

    // The overlay branch asks for two spaces and an x, fails, and the second
    // branch still sees indent = 1.
    let (value, position) = attempt(&parser, &ns, "  y");
    assert!(value.is_some());
    assert_eq!(position.offset, 1);
    assert_eq!(ns.value("indent"), Some(&Value::Int(1)));
}

#[test]
fn test_recursive_rule_through_reference() {
    let nested = (lit("(") + var("NESTED") + ")") | lit("x");
    let ns = Namespace::new().bind("NESTED", nested.clone());
    let (value, position) = attempt(&nested, &ns, "((x))");
    assert_eq!(value.unwrap().text(), "((x))");
    assert_eq!(position.offset, 5);

    let (value, position) = attempt(&nested, &ns, "((x)");
    assert!(value.is_none());
    assert_eq!(position.offset, 0);
}
