//! Scope balance and declaration losslessness over generated sources.

use proptest::prelude::*;
use tidy_ir::{source_of, Token};
use tidy_lexer::{has_errors, lex};
use tidy_parse::{parse_declarations, Navigator};

/// Fragments that combine into balanced, lexically valid sources.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "let a = 1\n",
        "var b: Int { get }\n",
        "// note\n",
        "\n",
        "func f(x: Int) -> Int {\n    return x + 1\n}\n",
        "class C: P {\n    var x = [1, 2]\n\n    init() {}\n}\n",
        "enum E {\n    case a, b\n}\n",
        "switch v {\ncase .a:\n    g()\ndefault:\n    break\n}\n",
        "#if DEBUG\nlet d = \"\\(a)\"\n#endif\n",
        "foo.map { [weak self] x in x * 2 }\n",
        "/* block\n   comment */\n",
        "struct S<T> {\n    let t: T?\n}\n",
    ])
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..8).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn scopes_match_both_ways(source in source()) {
        let buffer = lex(&source);
        prop_assume!(!has_errors(buffer.tokens()));
        let nav = Navigator::new(&buffer);
        for (i, token) in buffer.iter().enumerate() {
            let Token::EndOfScope(close) = token else {
                continue;
            };
            if close == "case" || close == "default" {
                continue;
            }
            let open = nav.start_of_scope(i);
            prop_assert!(open.is_some(), "no opener for `{}` at {}", close, i);
            prop_assert_eq!(open.and_then(|o| nav.end_of_scope(o)), Some(i));
        }
    }

    #[test]
    fn declarations_are_lossless(source in source()) {
        let buffer = lex(&source);
        let declarations = parse_declarations(&buffer, 0..buffer.len()).map_err(|e| {
            TestCaseError::fail(e.to_string())
        })?;
        let flattened: String = declarations.iter().map(|d| source_of(&d.tokens())).collect();
        prop_assert_eq!(flattened, source);

        let mut previous_end = 0;
        for declaration in &declarations {
            prop_assert_eq!(declaration.range().start, previous_end);
            previous_end = declaration.range().end;
        }
    }
}

#[test]
fn opener_and_closer_counts_balance() {
    let source = "class C {\n    func f() {\n        let a = [(1, 2)]\n    }\n}\n";
    let buffer = lex(source);
    let opens = buffer.iter().filter(|t| t.is_start_of_scope()).count();
    let closes = buffer.iter().filter(|t| t.is_end_of_scope()).count();
    assert_eq!(opens, closes);
}
