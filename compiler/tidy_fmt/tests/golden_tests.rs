#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Whole-pipeline formatting of small, complete inputs.

use pretty_assertions::assert_eq;
use tidy_fmt::{default_rules, format, rules_named, FormatOptions, SelfMode};

fn run(source: &str, rules: &[&str], options: &FormatOptions) -> String {
    format(source, &rules_named(rules).unwrap(), options).unwrap()
}

#[test]
fn if_body_is_indented_one_unit() {
    assert_eq!(
        run("if x {\nfoo()\n}", &["indent"], &FormatOptions::default()),
        "if x {\n    foo()\n}"
    );
}

#[test]
fn switch_arms_indent_below_their_labels() {
    let source = "switch x {\ncase .a:\nfoo()\ncase .b:\nbar()\n}\n";
    assert_eq!(
        run(source, &["indent"], &FormatOptions::default()),
        "switch x {\ncase .a:\n    foo()\ncase .b:\n    bar()\n}\n"
    );
}

#[test]
fn long_calls_wrap_one_argument_per_line() {
    let options = FormatOptions::default().with_max_width(20);
    assert_eq!(
        run(
            "let result = compute(alpha, beta, gamma)\n",
            &["indent", "wrapArguments"],
            &options
        ),
        "let result = compute(\n    alpha,\n    beta,\n    gamma\n)\n"
    );
}

#[test]
fn shadowed_members_never_gain_self() {
    let options = FormatOptions::default().with_self_mode(SelfMode::Insert);
    let shadowed = "class Foo { var bar = 1; func f() { let bar = 2; print(bar) } }";
    assert_eq!(run(shadowed, &["redundantSelf"], &options), shadowed);

    let both = "class Foo { var bar = 1; func f() { let bar = 2; print(bar) } func g() { print(bar) } }";
    assert_eq!(
        run(both, &["redundantSelf"], &options),
        "class Foo { var bar = 1; func f() { let bar = 2; print(bar) } func g() { print(self.bar) } }"
    );
}

#[test]
fn default_rules_tidy_a_type() {
    let source = "\
class Counter {

    var count = 0
  func increment() {
     self.count += 1
  }


  func reset() { self.count = 0 }
}
";
    assert_eq!(
        format(source, &default_rules(), &FormatOptions::default()).unwrap(),
        "\
class Counter {
    var count = 0
    func increment() {
        count += 1
    }

    func reset() { count = 0 }
}
"
    );
}

#[test]
fn directives_protect_lines_from_a_rule() {
    let source = "\
struct S {
    var x = 0
    func f() {
        // tidy:disable:next redundantSelf
        print(self.x)
        print(self.x)
    }
}
";
    assert_eq!(
        run(source, &["redundantSelf"], &FormatOptions::default()),
        "\
struct S {
    var x = 0
    func f() {
        // tidy:disable:next redundantSelf
        print(self.x)
        print(x)
    }
}
"
    );
}

#[test]
fn organize_declarations_runs_when_selected() {
    let source = "\
struct S {
    func f() {}
    let x = 1
}
";
    assert_eq!(
        format(source, &default_rules(), &FormatOptions::default()).unwrap(),
        source
    );
    assert_eq!(
        run(source, &["organizeDeclarations"], &FormatOptions::default()),
        "\
struct S {
    let x = 1
    func f() {}
}
"
    );
}
