use super::*;
use pretty_assertions::assert_eq;
use tidy_ir::source_of;

fn id(s: &str) -> Token {
    Token::identifier(s)
}

fn kw(s: &str) -> Token {
    Token::keyword(s)
}

fn sp() -> Token {
    Token::space(" ")
}

fn op(s: &str, fixity: Fixity) -> Token {
    Token::operator(s, fixity)
}

fn significant(source: &str) -> Vec<Token> {
    tokenize(source)
        .into_iter()
        .filter(|t| !t.is_space_or_linebreak())
        .collect()
}

// ─── Basics ──────────────────────────────────────────────────────

#[test]
fn let_binding() {
    assert_eq!(
        tokenize("let x = 1"),
        vec![
            kw("let"),
            sp(),
            id("x"),
            sp(),
            op("=", Fixity::Infix),
            sp(),
            Token::Number("1".into(), NumberKind::Integer),
        ]
    );
}

#[test]
fn linebreak_variants() {
    assert_eq!(
        tokenize("a\r\nb\rc\n"),
        vec![
            id("a"),
            Token::linebreak("\r\n"),
            id("b"),
            Token::linebreak("\r"),
            id("c"),
            Token::linebreak("\n"),
        ]
    );
}

#[test]
fn round_trips_sample() {
    let source = "class Foo {\n    var bar = 1 // count\n    func f() {\n        print(\"\\(bar)\")\n    }\n}\n";
    assert_eq!(source_of(&tokenize(source)), source);
}

#[test]
fn number_kinds() {
    let kinds: Vec<_> = tokenize("0x1F 0o17 0b101 1_000 1.5 2e10 3")
        .into_iter()
        .filter_map(|t| match t {
            Token::Number(_, kind) => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            NumberKind::Hex,
            NumberKind::Octal,
            NumberKind::Binary,
            NumberKind::Integer,
            NumberKind::Decimal,
            NumberKind::Decimal,
            NumberKind::Integer,
        ]
    );
}

#[test]
fn tuple_member_is_not_decimal() {
    assert_eq!(
        significant("x.0"),
        vec![
            id("x"),
            op(".", Fixity::Infix),
            Token::Number("0".into(), NumberKind::Integer),
        ]
    );
}

// ─── Comments ────────────────────────────────────────────────────

#[test]
fn line_comment_splits_trailing_space() {
    assert_eq!(
        tokenize("// hi  \nx"),
        vec![
            Token::start_of_scope("//"),
            sp(),
            Token::CommentBody("hi".into()),
            Token::space("  "),
            Token::linebreak("\n"),
            id("x"),
        ]
    );
}

#[test]
fn nested_block_comment() {
    assert_eq!(
        tokenize("/* a /* b */ c */"),
        vec![
            Token::start_of_scope("/*"),
            sp(),
            Token::CommentBody("a /* b */ c".into()),
            sp(),
            Token::end_of_scope("*/"),
        ]
    );
}

#[test]
fn multiline_block_comment() {
    assert_eq!(
        tokenize("/*\n * a\n */"),
        vec![
            Token::start_of_scope("/*"),
            Token::linebreak("\n"),
            sp(),
            Token::CommentBody("* a".into()),
            Token::linebreak("\n"),
            sp(),
            Token::end_of_scope("*/"),
        ]
    );
}

// ─── Strings ─────────────────────────────────────────────────────

#[test]
fn string_interpolation() {
    assert_eq!(
        tokenize(r#""a\(b)c""#),
        vec![
            Token::start_of_scope("\""),
            Token::StringBody("a\\".into()),
            Token::start_of_scope("("),
            id("b"),
            Token::end_of_scope(")"),
            Token::StringBody("c".into()),
            Token::end_of_scope("\""),
        ]
    );
}

#[test]
fn escaped_quote_stays_in_body() {
    assert_eq!(
        tokenize(r#""say \"hi\"""#),
        vec![
            Token::start_of_scope("\""),
            Token::StringBody(r#"say \"hi\""#.into()),
            Token::end_of_scope("\""),
        ]
    );
}

#[test]
fn multiline_string_keeps_indentation_in_body() {
    assert_eq!(
        tokenize("\"\"\"\n    text\n    \"\"\""),
        vec![
            Token::start_of_scope("\"\"\""),
            Token::linebreak("\n"),
            Token::StringBody("    text".into()),
            Token::linebreak("\n"),
            Token::StringBody("    ".into()),
            Token::end_of_scope("\"\"\""),
        ]
    );
}

#[test]
fn empty_string() {
    assert_eq!(
        tokenize("\"\""),
        vec![Token::start_of_scope("\""), Token::end_of_scope("\"")]
    );
}

// ─── Keywords and identifiers ────────────────────────────────────

#[test]
fn attributes_and_directives() {
    assert_eq!(
        significant("@objc #selector(f) #if DEBUG\n#else\n#endif"),
        vec![
            kw("@objc"),
            kw("#selector"),
            Token::start_of_scope("("),
            id("f"),
            Token::end_of_scope(")"),
            Token::start_of_scope("#if"),
            id("DEBUG"),
            kw("#else"),
            Token::end_of_scope("#endif"),
        ]
    );
}

#[test]
fn keyword_after_dot_is_member_name() {
    assert_eq!(
        significant("x = .default; self.init()"),
        vec![
            id("x"),
            op("=", Fixity::Infix),
            op(".", Fixity::Prefix),
            id("default"),
            Token::delimiter(";"),
            kw("self"),
            op(".", Fixity::Infix),
            kw("init"),
            Token::start_of_scope("("),
            Token::end_of_scope(")"),
        ]
    );
}

#[test]
fn keyword_argument_labels() {
    let tokens = significant("foo(for: x, in y: z)");
    assert!(tokens.contains(&id("for")));
    assert!(tokens.contains(&id("in")));
}

#[test]
fn backtick_identifier() {
    assert_eq!(significant("let `class` = 1")[1], id("`class`"));
}

#[test]
fn contextual_words_are_identifiers() {
    assert_eq!(significant("get set some any")[0], id("get"));
    assert_eq!(significant("get set some any")[3], id("any"));
}

// ─── Operators ───────────────────────────────────────────────────

#[test]
fn fixity_from_whitespace() {
    assert_eq!(
        significant("a + b"),
        vec![id("a"), op("+", Fixity::Infix), id("b")]
    );
    assert_eq!(significant("-a"), vec![op("-", Fixity::Prefix), id("a")]);
    assert_eq!(significant("a!"), vec![id("a"), op("!", Fixity::Postfix)]);
    assert_eq!(
        significant("a?.b"),
        vec![
            id("a"),
            op("?", Fixity::Postfix),
            op(".", Fixity::Infix),
            id("b"),
        ]
    );
}

#[test]
fn ternary_colon_is_operator() {
    assert_eq!(
        significant("a ? b : c"),
        vec![
            id("a"),
            op("?", Fixity::Infix),
            id("b"),
            op(":", Fixity::Infix),
            id("c"),
        ]
    );
    assert_eq!(significant("f(a: b)")[3], Token::delimiter(":"));
}

#[test]
fn range_operators() {
    assert_eq!(
        significant("0..<n"),
        vec![
            Token::Number("0".into(), NumberKind::Integer),
            op("..<", Fixity::Infix),
            id("n"),
        ]
    );
}

#[test]
fn operator_reference() {
    assert_eq!(significant("reduce(0, +)")[4], op("+", Fixity::None));
    assert_eq!(significant("static func == (a: A)")[2], op("==", Fixity::None));
}

#[test]
fn generics() {
    assert_eq!(
        significant("Array<Int>()"),
        vec![
            id("Array"),
            Token::start_of_scope("<"),
            id("Int"),
            Token::end_of_scope(">"),
            Token::start_of_scope("("),
            Token::end_of_scope(")"),
        ]
    );
    assert_eq!(
        significant("a<b"),
        vec![id("a"), op("<", Fixity::Infix), id("b")]
    );
}

#[test]
fn nested_generics_close_one_at_a_time() {
    let tokens = significant("Dictionary<String, Array<Int>>");
    let closers = tokens
        .iter()
        .filter(|t| t.is_end_of_scope_named(">"))
        .count();
    assert_eq!(closers, 2);
}

#[test]
fn generic_function_type() {
    let tokens = significant("Foo<(Int) -> Void>");
    assert!(tokens.contains(&op("->", Fixity::Infix)));
    assert_eq!(tokens.last(), Some(&Token::end_of_scope(">")));
}

// ─── Switch ──────────────────────────────────────────────────────

#[test]
fn switch_case_scopes() {
    let source = "switch x {\ncase .a:\n    foo()\ndefault:\n    bar()\n}";
    assert_eq!(
        significant(source),
        vec![
            kw("switch"),
            id("x"),
            Token::start_of_scope("{"),
            Token::end_of_scope("case"),
            op(".", Fixity::Prefix),
            id("a"),
            Token::start_of_scope(":"),
            id("foo"),
            Token::start_of_scope("("),
            Token::end_of_scope(")"),
            Token::end_of_scope("default"),
            Token::start_of_scope(":"),
            id("bar"),
            Token::start_of_scope("("),
            Token::end_of_scope(")"),
            Token::end_of_scope("}"),
        ]
    );
}

#[test]
fn if_case_inside_case_body_is_keyword() {
    let tokens = significant("switch x {\ncase .a:\n    if case .b = y {}\n}");
    assert!(tokens.contains(&kw("case")));
}

#[test]
fn enum_case_is_keyword() {
    assert_eq!(significant("enum E { case a }")[3], kw("case"));
}

// ─── Errors ──────────────────────────────────────────────────────

#[test]
fn unmatched_closer_is_error() {
    assert_eq!(
        significant("a)"),
        vec![id("a"), Token::Error(")".into())]
    );
}

#[test]
fn unknown_characters_are_errors() {
    assert_eq!(tokenize("'"), vec![Token::Error("'".into())]);
    assert_eq!(tokenize("#"), vec![Token::Error("#".into())]);
}
