#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Pipeline properties over generated inputs.

use proptest::prelude::*;
use tidy_fmt::{default_rules, format, rules, rules_named, FormatOptions, SelfMode};
use tidy_ir::token::KEYWORDS;

/// Balanced snippets; whitespace around them is randomized.
const SNIPPETS: &[&str] = &[
    "let value = compute(alpha, beta)",
    "if ready {\nstart()\n}",
    "switch mode {\ncase .a:\nrun()\ndefault:\nbreak\n}",
    "class Box {\nvar count = 0\nfunc bump() {\nself.count += 1\n}\n}",
    "struct Point {\nlet x: Int\nfunc moved() -> Point {\nreturn Point(x: x + 1)\n}\n}",
    "// note\nlet list = [\n1,\n2\n]",
    "items.forEach { item in\nprint(item)\n}",
    "/* block\n * comment\n */\nlet text = \"a \\(b) c\"",
    "#if DEBUG\nlog(message)\n#endif",
];

fn decorated_source() -> impl Strategy<Value = String> {
    let line = (0usize..9, 0usize..3, 0usize..3);
    (
        prop::collection::vec(0..SNIPPETS.len(), 0..8),
        prop::collection::vec(line, 64),
    )
        .prop_map(|(picks, layout)| {
            let text = picks.iter().map(|&i| SNIPPETS[i]).collect::<Vec<_>>().join("\n");
            let mut out = String::new();
            for (line, (indent, trailing, blank)) in text.lines().zip(layout.iter().cycle()) {
                out.push_str(&" ".repeat(*indent));
                out.push_str(line);
                out.push_str(&" ".repeat(*trailing));
                out.push_str(&"\n".repeat(1 + blank));
            }
            out
        })
}

fn option_sets() -> impl Strategy<Value = FormatOptions> {
    (any::<bool>(), prop_oneof![Just(0usize), Just(24), Just(40)], any::<bool>()).prop_map(
        |(indent_case, max_width, insert)| {
            let mode = if insert { SelfMode::Insert } else { SelfMode::Remove };
            FormatOptions::default()
                .with_indent_case(indent_case)
                .with_max_width(max_width)
                .with_self_mode(mode)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn formatting_is_idempotent(source in decorated_source(), options in option_sets()) {
        let all: Vec<_> = rules().iter().collect();
        let once = format(&source, &all, &options).unwrap();
        let twice = format(&once, &all, &options).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn default_rules_are_idempotent(source in decorated_source()) {
        let options = FormatOptions::default();
        let once = format(&source, &default_rules(), &options).unwrap();
        prop_assert_eq!(format(&once, &default_rules(), &options).unwrap(), once);
    }

    #[test]
    fn empty_rule_set_changes_nothing(
        source in r#"[a-z0-9_ \t\n(){}\[\]<>"\\/*+=.,:;?!#@-]{0,96}"#
    ) {
        let options = FormatOptions::default().with_fragment(true);
        prop_assert_eq!(format(&source, &[], &options).unwrap(), source);
    }

    #[test]
    fn locals_never_gain_self(
        name in "[a-z][a-zA-Z]{0,7}".prop_filter("keyword", |n| !KEYWORDS.contains(&n.as_str()))
    ) {
        let source = format!(
            "class Foo {{\n    var {name} = 1\n    func f({name}: Int) {{\n        print({name})\n    }}\n    \
             func g() {{\n        let {name} = 2\n        print({name})\n    }}\n    \
             func h(items: [Int]) {{\n        for {name} in items {{\n            print({name})\n        }}\n    }}\n}}\n"
        );
        let options = FormatOptions::default().with_self_mode(SelfMode::Insert);
        let rules = rules_named(&["redundantSelf"]).unwrap();
        prop_assert_eq!(format(&source, &rules, &options).unwrap(), source);
    }
}
