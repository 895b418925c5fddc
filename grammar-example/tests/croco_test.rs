use combinator_framework::{var, Position, StrSource};
use grammar_example::croco;
use rstest::rstest;

fn tree(text: &str) -> String {
    croco::render(&croco::parse(text).unwrap())
}

fn error(text: &str) -> String {
    croco::parse(text).unwrap_err().to_string()
}

#[test]
fn test_empty_program() {
    assert_eq!(tree(""), "(block)");
}

#[rstest]
#[case("a = 1", r#"(block (assign (name "a") "" (number 1)))"#)]
#[case("a = 1\n", r#"(block (assign (name "a") "" (number 1)))"#)]
#[case("total += n", r#"(block (assign (name "total") "+" (name "n")))"#)]
#[case("x -= 1", r#"(block (assign (name "x") "-" (number 1)))"#)]
#[case("s = 'hi there'", r#"(block (assign (name "s") "" (string "hi there")))"#)]
#[case("s = \"it's\"", r#"(block (assign (name "s") "" (string "it's")))"#)]
#[case("iffy = 1", r#"(block (assign (name "iffy") "" (number 1)))"#)]
#[case("a = 1; b = 2", r#"(block (assign (name "a") "" (number 1)) (assign (name "b") "" (number 2)))"#)]
#[case("x = 1.5", r#"(block (assign (name "x") "" (number 1.5)))"#)]
#[case("x = .25", r#"(block (assign (name "x") "" (number 0.25)))"#)]
#[case("x //= 2", r#"(block (assign (name "x") "//" (number 2)))"#)]
#[case("pass", "(block (pass))")]
#[case("pass; x = 1", r#"(block (pass) (assign (name "x") "" (number 1)))"#)]
#[case("passed = 1", r#"(block (assign (name "passed") "" (number 1)))"#)]
#[case("x = 1 # note", r#"(block (assign (name "x") "" (number 1)))"#)]
#[case("x = 1 + \\\n    2", r#"(block (assign (name "x") "" (binop "+" (number 1) (number 2))))"#)]
fn test_simple_statements(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(tree(text), expected);
}

#[rstest]
#[case(
    "x = 1 + 2 * 3 ** 2",
    r#"(block (assign (name "x") "" (binop "+" (number 1) (binop "*" (number 2) (binop "**" (number 3) (number 2))))))"#
)]
#[case(
    "a - b - c",
    r#"(block (binop "-" (binop "-" (name "a") (name "b")) (name "c")))"#
)]
#[case(
    "(a + b) * c",
    r#"(block (binop "*" (binop "+" (name "a") (name "b")) (name "c")))"#
)]
#[case(
    "a.b[0](1, 2)",
    r#"(block (call (getitem (getattr (name "a") "b") (number 0)) (number 1) (number 2)))"#
)]
#[case("f()", r#"(block (call (name "f")))"#)]
#[case("x = a // b", r#"(block (assign (name "x") "" (binop "//" (name "a") (name "b"))))"#)]
#[case("a == b", r#"(block (compare "==" (name "a") (name "b")))"#)]
#[case(
    "a < b + 1",
    r#"(block (compare "<" (name "a") (binop "+" (name "b") (number 1))))"#
)]
#[case(
    "a <= b != c",
    r#"(block (compare "!=" (compare "<=" (name "a") (name "b")) (name "c")))"#
)]
#[case("x = [1, 2]", r#"(block (assign (name "x") "" (list (number 1) (number 2))))"#)]
#[case("(1,)", "(block (tuple (number 1)))")]
#[case("(1, 2)", "(block (tuple (number 1) (number 2)))")]
#[case("()", "(block (tuple))")]
#[case("(a)", r#"(block (name "a"))"#)]
#[case("{a, 'b'}", r#"(block (set (name "a") (string "b")))"#)]
#[case("[]", "(block (list))")]
fn test_expressions(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(tree(text), expected);
}

#[test]
fn test_brackets_span_lines() {
    assert_eq!(tree("f(1,\n  2)\n"), r#"(block (call (name "f") (number 1) (number 2)))"#);
}

#[test]
fn test_collections_span_lines() {
    assert_eq!(
        tree("x = [\n  1,  # one\n  2,\n]\n"),
        r#"(block (assign (name "x") "" (list (number 1) (number 2))))"#
    );
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    assert_eq!(
        tree("# setup\n\nx = 1\n   \ny = 2\n"),
        r#"(block (assign (name "x") "" (number 1)) (assign (name "y") "" (number 2)))"#
    );
}

#[test]
fn test_nested_blocks() {
    let program = "total = 0\nfor n in range(10):\n    if n % 2:\n        total += n\n    else: print(n)\n";
    let expected = concat!(
        r#"(block (assign (name "total") "" (number 0)) "#,
        r#"(for (name "n") (call (name "range") (number 10)) "#,
        r#"(block (if (binop "%" (name "n") (number 2)) "#,
        r#"(block (assign (name "total") "+" (name "n"))) "#,
        r#"(block (call (name "print") (name "n")))))))"#,
    );
    assert_eq!(tree(program), expected);
}

#[test]
fn test_tabs_indent_one_level() {
    assert_eq!(
        tree("while x:\n\tx -= 1\n"),
        r#"(block (while (name "x") (block (assign (name "x") "-" (number 1)))))"#
    );
}

#[rstest]
#[case(
    "while x > 0: x -= 1",
    r#"(block (while (compare ">" (name "x") (number 0)) (block (assign (name "x") "-" (number 1)))))"#
)]
#[case(
    "if a == b: c",
    r#"(block (if (compare "==" (name "a") (name "b")) (block (name "c"))))"#
)]
#[case("while x: break", r#"(block (while (name "x") (block (break))))"#)]
#[case(
    "for x in y:\n    continue\n",
    r#"(block (for (name "x") (name "y") (block (continue))))"#
)]
fn test_loop_control(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(tree(text), expected);
}

#[test]
fn test_elif_chain() {
    let program = "if a: x = 1\nelif b: x = 2\nelse: x = 3\n";
    let expected = concat!(
        r#"(block (if (name "a") (block (assign (name "x") "" (number 1))) "#,
        r#"(if (name "b") (block (assign (name "x") "" (number 2))) "#,
        r#"(block (assign (name "x") "" (number 3))))))"#,
    );
    assert_eq!(tree(program), expected);
}

#[test]
fn test_nodes_carry_lines() {
    let value = croco::parse("x = 1\n\nif x:\n    y = 2\n").unwrap();
    let block = value.as_node().unwrap();
    assert_eq!(block.children.len(), 2);
    assert_eq!(block.child(0).line(), Some(1));
    assert_eq!(block.child(1).line(), Some(3));
    let body = block.child(1).as_node().unwrap().child(1);
    assert_eq!(body.as_node().unwrap().child(0).line(), Some(4));
}

#[rstest]
#[case("x = (1 + 2", "expected closing ')' for '(' opened on line 1")]
#[case("f(1,\n 2", "expected closing ')' for '(' opened on line 1")]
#[case("f(\n(1,\n 2)", "expected closing ')' for '(' opened on line 1")]
#[case("x = [1,\n\n 2", "expected closing ']' for '[' opened on line 1")]
#[case("s = {1,\n 2", "expected closing '}' for '{' opened on line 1")]
#[case("if x:\n        y = 1\n", "too many indentations on line 2, column 5")]
#[case("if x:\n", "expected an indented block on line 2")]
#[case("x = 1 )", "unexpected ')' on line 1, column 7")]
#[case("if = 1", "expected a condition after 'if' on line 1")]
#[case("x = ", "expected an expression after '=' on line 1")]
#[case("y = 1 +", "expected an expression after '+' on line 1")]
#[case("for x range(3): x", "expected 'in' on line 1, column 7")]
#[case("if x y", "expected ':' on line 1, column 6")]
fn test_syntax_errors(#[case] text: &str, #[case] message: &str) {
    assert_eq!(error(text), message);
}

#[test]
fn test_unclosed_string() {
    let message = error("s = 'abc");
    assert!(message.starts_with("unclosed quote '"), "{message}");
    assert!(message.ends_with("on line 1"), "{message}");
}

#[test]
fn test_statements_leave_no_bindings_behind() {
    let grammar = croco::grammar().unwrap();
    let program: String = (0..200).map(|i| format!("s = 'a{i}' + x * {i}\n")).collect();
    let source = StrSource::new(program.as_str());
    let block = grammar.rule("BLOCK").unwrap();
    let success = block
        .parse(grammar.namespace(), Position::new(), &source)
        .unwrap()
        .unwrap();
    assert_eq!(success.position.offset, program.len());
    assert_eq!(success.namespace.depth(), grammar.namespace().depth());
    assert!(!success.namespace.contains("quote"));
    assert!(!success.namespace.contains("last_op"));
}

#[test]
fn test_quote_is_not_visible_after_a_string() {
    let grammar = croco::grammar().unwrap();
    let source = StrSource::new("'abc'");
    let success = var("STRING")
        .parse(grammar.namespace(), Position::new(), &source)
        .unwrap()
        .unwrap();
    assert_eq!(success.position.offset, 5);
    assert!(!success.namespace.contains("quote"));
}
