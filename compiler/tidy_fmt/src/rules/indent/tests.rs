use super::*;
use crate::FormatOptions;
use pretty_assertions::assert_eq;
use tidy_lexer::lex;

fn indent_with(source: &str, options: &FormatOptions) -> String {
    let mut f = Formatter::new(lex(source), options);
    f.begin_rule("indent");
    indent(&mut f).unwrap();
    f.source()
}

fn indented(source: &str) -> String {
    indent_with(source, &FormatOptions::default())
}

#[test]
fn block_body_gets_one_unit() {
    assert_eq!(indented("if x {\nfoo()\n}\n"), "if x {\n    foo()\n}\n");
}

#[test]
fn existing_indent_is_corrected() {
    assert_eq!(
        indented("  func f() {\n        if a {\n  b()\n      }\n }\n"),
        "func f() {\n    if a {\n        b()\n    }\n}\n"
    );
}

#[test]
fn case_bodies_nest_inside_labels() {
    assert_eq!(
        indented("switch x {\ncase .a:\nfoo()\ncase .b:\nbar()\n}\n"),
        "switch x {\ncase .a:\n    foo()\ncase .b:\n    bar()\n}\n"
    );
}

#[test]
fn indent_case_moves_labels_in() {
    let options = FormatOptions::default().with_indent_case(true);
    assert_eq!(
        indent_with("switch x {\ncase .a:\nfoo()\ndefault:\nbreak\n}\n", &options),
        "switch x {\n    case .a:\n        foo()\n    default:\n        break\n}\n"
    );
}

#[test]
fn continuation_lines_get_an_extra_unit() {
    assert_eq!(
        indented("let x = foo\n.bar()\n.baz()\nlet y = 1\n"),
        "let x = foo\n    .bar()\n    .baz()\nlet y = 1\n"
    );
    assert_eq!(
        indented("let total = a +\nb +\nc\nprint(total)\n"),
        "let total = a +\n    b +\n    c\nprint(total)\n"
    );
}

#[test]
fn wrapped_conditions_close_at_the_statement_indent() {
    assert_eq!(
        indented("if a &&\nb {\nc()\n}\nd()\n"),
        "if a &&\n    b {\n    c()\n}\nd()\n"
    );
    assert_eq!(
        indented("func f() {\nguard let a = b,\nlet c = d else {\nreturn\n}\n}\n"),
        "func f() {\n    guard let a = b,\n        let c = d else {\n        return\n    }\n}\n"
    );
}

#[test]
fn wrapped_closures_nest_inside_the_continuation() {
    assert_eq!(
        indented("items\n.map {\n$0\n}\n"),
        "items\n    .map {\n        $0\n    }\n"
    );
}

#[test]
fn lists_indent_or_align() {
    assert_eq!(indented("foo(\na,\nb\n)\n"), "foo(\n    a,\n    b\n)\n");
    assert_eq!(indented("foo(a,\nb)\n"), "foo(a,\n    b)\n");
    assert_eq!(
        indented("let xs = [\n1,\n2,\n]\n"),
        "let xs = [\n    1,\n    2,\n]\n"
    );
}

#[test]
fn closure_bodies_indent() {
    assert_eq!(
        indented("foo.map { x in\nx * 2\n}\n"),
        "foo.map { x in\n    x * 2\n}\n"
    );
}

#[test]
fn block_comment_stars_align() {
    assert_eq!(
        indented("  /**\n* doc\n     */\nfunc f() {}\n"),
        "/**\n * doc\n */\nfunc f() {}\n"
    );
    assert_eq!(indented("/*\n  free text\n*/\n"), "/*\n  free text\n */\n");
}

#[test]
fn multiline_strings_are_untouched() {
    assert_eq!(
        indented("func f() {\nlet s = \"\"\"\n  raw\n\"\"\"\n}\n"),
        "func f() {\n    let s = \"\"\"\n  raw\n\"\"\"\n}\n"
    );
}

#[test]
fn ifdef_policies() {
    let source = "func f() {\n#if DEBUG\nlog()\n#else\nrun()\n#endif\n}\n";
    assert_eq!(
        indented(source),
        "func f() {\n    #if DEBUG\n        log()\n    #else\n        run()\n    #endif\n}\n"
    );
    let no_indent = FormatOptions::default().with_ifdef_indent(IfdefIndent::NoIndent);
    assert_eq!(
        indent_with(source, &no_indent),
        "func f() {\n    #if DEBUG\n    log()\n    #else\n    run()\n    #endif\n}\n"
    );
    let outdent = FormatOptions::default().with_ifdef_indent(IfdefIndent::Outdent);
    assert_eq!(
        indent_with(source, &outdent),
        "func f() {\n#if DEBUG\n    log()\n#else\n    run()\n#endif\n}\n"
    );
}

#[test]
fn error_lines_keep_their_indent() {
    let source = "func f() {\n      let x = )\n}\n";
    assert_eq!(indented(source), source);
}

#[test]
fn disabled_lines_keep_their_indent() {
    assert_eq!(
        indented("if x {\n// tidy:disable:next indent\n        foo()\nbar()\n}\n"),
        "if x {\n    // tidy:disable:next indent\n        foo()\n    bar()\n}\n"
    );
}

#[test]
fn blank_lines_follow_truncation_option() {
    assert_eq!(indented("if x {\n\n  foo()\n}\n"), "if x {\n\n    foo()\n}\n");
    let keep = FormatOptions {
        truncate_blank_lines: false,
        ..FormatOptions::default()
    };
    assert_eq!(
        indent_with("if x {\n\n  foo()\n}\n", &keep),
        "if x {\n    \n    foo()\n}\n"
    );
}

#[test]
fn fragments_keep_their_base_indent() {
    let options = FormatOptions::default().with_fragment(true);
    assert_eq!(
        indent_with("    if x {\n    y()\n    }\n", &options),
        "    if x {\n        y()\n    }\n"
    );
}

#[test]
fn tab_indent_unit() {
    let options = FormatOptions::default().with_indent("\t");
    assert_eq!(indent_with("if x {\nfoo()\n}\n", &options), "if x {\n\tfoo()\n}\n");
}
