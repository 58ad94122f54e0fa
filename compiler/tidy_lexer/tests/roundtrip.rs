//! Losslessness of the tokenizer over arbitrary input.

use proptest::prelude::*;
use tidy_ir::source_of;
use tidy_lexer::{has_errors, tokenize};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn arbitrary_text_round_trips(source in any::<String>()) {
        prop_assert_eq!(source_of(&tokenize(&source)), source);
    }

    #[test]
    fn code_like_text_round_trips(
        source in r#"[a-z0-9_ \t\n\r(){}\[\]<>"\\/*+=.,:;?!#@`'$-]{0,96}"#
    ) {
        prop_assert_eq!(source_of(&tokenize(&source)), source);
    }

    #[test]
    fn identifiers_and_spaces_never_error(source in "[a-zA-Z_ ]{0,64}") {
        prop_assert!(!has_errors(&tokenize(&source)));
    }
}

#[test]
fn retokenizing_output_is_stable() {
    let source = "switch x {\ncase .a:\n    foo(\"\\(y)\")\ndefault:\n    break\n}\n";
    let first = tokenize(source);
    let second = tokenize(&source_of(&first));
    assert_eq!(first, second);
}
