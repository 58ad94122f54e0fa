use super::*;
use pretty_assertions::assert_eq;
use tidy_ir::source_of;
use tidy_lexer::lex;

fn parse(source: &str) -> Vec<Declaration> {
    let buffer = lex(source);
    parse_declarations(&buffer, 0..buffer.len()).unwrap()
}

fn texts(declarations: &[Declaration]) -> Vec<String> {
    declarations.iter().map(|d| source_of(&d.tokens())).collect()
}

fn find(buffer: &TokenBuffer, text: &str) -> usize {
    buffer.iter().position(|t| t.text() == text).unwrap()
}

// ─── Tree shape ──────────────────────────────────────────────────

#[test]
fn splits_top_level_declarations() {
    let declarations = parse("import Foo\nlet a = 1\nfunc f() {\n    let b = 2\n}\n");
    let keywords: Vec<_> = declarations.iter().map(Declaration::keyword).collect();
    assert_eq!(keywords, vec!["import", "let", "func"]);
    assert_eq!(
        texts(&declarations),
        vec!["import Foo\n", "let a = 1\n", "func f() {\n    let b = 2\n}\n"]
    );
}

#[test]
fn type_bodies_recurse() {
    let source = "class Foo: Bar {\n    var x = 1\n\n    func f() {}\n}\n";
    let declarations = parse(source);
    assert_eq!(declarations.len(), 1);
    let Declaration::TypeBody { keyword, open, body, close } = &declarations[0] else {
        panic!("expected a type body, got {:?}", declarations[0]);
    };
    assert_eq!(keyword, "class");
    assert_eq!(source_of(&open.tokens), "class Foo: Bar {\n");
    assert_eq!(texts(body), vec!["    var x = 1\n\n", "    func f() {}\n"]);
    assert_eq!(source_of(&close.tokens), "}\n");
    assert_eq!(declarations[0].name().as_deref(), Some("Foo"));
}

#[test]
fn single_line_type_is_simple() {
    let declarations = parse("struct Empty {}\nenum E { case a }\n");
    assert!(declarations.iter().all(|d| matches!(d, Declaration::Simple { .. })));
    assert_eq!(declarations[1].keyword(), "enum");
}

#[test]
fn enum_cases_are_declarations() {
    let declarations = parse("enum E {\n    case a, b\n    case c(Int)\n    indirect case d(E)\n}\n");
    let body = declarations[0].body().unwrap();
    let keywords: Vec<_> = body.iter().map(Declaration::keyword).collect();
    assert_eq!(keywords, vec!["case", "case", "case"]);
    assert_eq!(body[2].modifiers(), vec!["indirect"]);
}

#[test]
fn class_modifier_is_not_a_declaration() {
    let declarations = parse("class A {\n    class func f() {}\n    class var x: Int { 1 }\n}\n");
    let body = declarations[0].body().unwrap();
    let keywords: Vec<_> = body.iter().map(Declaration::keyword).collect();
    assert_eq!(keywords, vec!["func", "var"]);
    assert!(body.iter().all(Declaration::is_static));
}

#[test]
fn condition_bindings_are_not_declarations() {
    let declarations = parse("if let a = b, var c = d {\n}\nguard case .x = y else { return }\n");
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].keyword(), "");
}

#[test]
fn shared_line() {
    let declarations = parse("let a = 1; private let b = 2\n");
    assert_eq!(texts(&declarations), vec!["let a = 1; ", "private let b = 2\n"]);
}

#[test]
fn extension_names_are_dotted() {
    let declarations = parse("extension Foo.Bar where T: P {\n    func f() {}\n}\n");
    assert_eq!(declarations[0].name().as_deref(), Some("Foo.Bar"));
    let body = declarations[0].body().unwrap();
    assert_eq!(body[0].name().as_deref(), Some("f"));
}

// ─── Trivia ──────────────────────────────────────────────────────

#[test]
fn comments_attach_by_blank_lines() {
    let source = "let a = 1\n\n// about b\n@available(*, deprecated)\nlet b = 2\n// after b\n\nlet c = 3\n";
    assert_eq!(
        texts(&parse(source)),
        vec![
            "let a = 1\n\n",
            "// about b\n@available(*, deprecated)\nlet b = 2\n// after b\n\n",
            "let c = 3\n",
        ]
    );
}

#[test]
fn first_declaration_absorbs_leading_trivia() {
    let source = "// header\n\nimport Foo\n";
    assert_eq!(texts(&parse(source)), vec![source]);
}

// ─── Conditional compilation ─────────────────────────────────────

#[test]
fn conditional_blocks_recurse() {
    let source = "#if DEBUG\nlet a = 1\n#else\nlet a = 2\n#endif\nlet b = 3\n";
    let declarations = parse(source);
    assert_eq!(declarations.len(), 2);
    let Declaration::ConditionalCompilation { open, body, close } = &declarations[0] else {
        panic!("expected a conditional block");
    };
    assert_eq!(source_of(&open.tokens), "#if DEBUG\n");
    assert_eq!(texts(body), vec!["let a = 1\n", "#else\n", "let a = 2\n"]);
    assert_eq!(source_of(&close.tokens), "#endif\n");
}

#[test]
fn disabled_conditional_is_opaque() {
    let source = "let a = 1\n// tidy:disable all\n#if DEBUG\nlet b = 2\n#endif\n// tidy:enable all\nlet c = 3\n";
    let declarations = parse(source);
    let keywords: Vec<_> = declarations.iter().map(Declaration::keyword).collect();
    assert_eq!(keywords, vec!["let", "let"]);
    assert!(source_of(&declarations[0].tokens()).contains("let b = 2"));
}

// ─── Errors ──────────────────────────────────────────────────────

#[test]
fn unclosed_type_body_fails() {
    let buffer = lex("class A {\n    var x = 1\n");
    let error = parse_declarations(&buffer, 0..buffer.len()).unwrap_err();
    assert_eq!(error.position, find(&buffer, "{"));
    assert_eq!(error.expected, "}");
}

#[test]
fn unclosed_conditional_fails() {
    let buffer = lex("#if DEBUG\nlet a = 1\n");
    let error = parse_declarations(&buffer, 0..buffer.len()).unwrap_err();
    assert_eq!(error.expected, "#endif");
}

#[test]
fn range_is_clamped() {
    let buffer = lex("let a = 1\n");
    assert_eq!(parse_declarations(&buffer, 5..100).unwrap().len(), 1);
    assert!(parse_declarations(&buffer, 50..100).unwrap().is_empty());
}

// ─── Signatures ──────────────────────────────────────────────────

#[test]
fn property_parts() {
    let buffer = lex("var count: Int = 0 {\n    didSet { update() }\n}");
    let nav = Navigator::new(&buffer);
    let property = nav.parse_property(0).unwrap();
    assert_eq!(property.name, "count");
    assert_eq!(property.type_range, Some(find(&buffer, "Int")..=find(&buffer, "Int")));
    assert_eq!(property.value_range, Some(find(&buffer, "0")..=find(&buffer, "0")));
    assert_eq!(property.body_range.map(|r| *r.start()), Some(find(&buffer, "{")));
}

#[test]
fn property_with_closure_value() {
    let buffer = lex("let f = { x in x }");
    let property = Navigator::new(&buffer).parse_property(0).unwrap();
    assert!(property.body_range.is_none());
    assert_eq!(property.value_range.map(|r| *r.end()), Some(buffer.len() - 1));
}

#[test]
fn function_parts() {
    let source = "func map<T: Equatable, U>(_ value: T, with f: (T) -> U) async throws -> [U] {\n}";
    let buffer = lex(source);
    let signature = Navigator::new(&buffer).parse_function(0).unwrap();
    assert_eq!(signature.name, "map");
    assert_eq!(
        signature.generics,
        vec![
            GenericParam {
                name: "T".into(),
                conformances: vec!["Equatable".into()],
            },
            GenericParam {
                name: "U".into(),
                conformances: vec![],
            },
        ]
    );
    let params: Vec<_> = signature
        .params
        .iter()
        .map(|p| (p.label.as_deref(), p.name.as_str()))
        .collect();
    assert_eq!(params, vec![(Some("_"), "value"), (Some("with"), "f")]);
    assert_eq!(signature.effects, vec!["async", "throws"]);
    assert!(signature.return_type.is_some());
    assert_eq!(signature.body_range.map(|r| *r.end()), Some(buffer.len() - 1));
}

#[test]
fn failable_init() {
    let buffer = lex("init?(rawValue: String) {}");
    let signature = Navigator::new(&buffer).parse_function(0).unwrap();
    assert_eq!(signature.name, "init");
    assert_eq!(signature.params[0].name, "rawValue");
    assert_eq!(signature.params[0].label, None);
}

#[test]
fn call_arguments() {
    let buffer = lex("foo(1, bar: baz(2, 3), in: x)");
    let nav = Navigator::new(&buffer);
    let arguments = nav.parse_call_arguments(1).unwrap();
    let labels: Vec<_> = arguments.iter().map(|a| a.label.as_deref()).collect();
    assert_eq!(labels, vec![None, Some("bar"), Some("in")]);
    let second = &arguments[1];
    assert_eq!(
        source_of(buffer.slice(*second.range.start()..second.range.end() + 1)),
        "bar: baz(2, 3)"
    );
    assert_eq!(nav.parse_call_arguments(0), None);
}

#[test]
fn empty_call() {
    let buffer = lex("foo( )");
    assert_eq!(Navigator::new(&buffer).parse_call_arguments(1), Some(vec![]));
}

fn bound(source: &str, from: &str) -> Vec<String> {
    let buffer = lex(source);
    let at = find(&buffer, from);
    let pattern = Navigator::new(&buffer).binding_names(at).unwrap();
    pattern.names.into_iter().map(|b| b.name).collect()
}

#[test]
fn binding_patterns() {
    assert_eq!(bound("let x = 1", "let"), vec!["x"]);
    assert_eq!(bound("let (a, _, b) = t", "let"), vec!["a", "b"]);
    assert_eq!(bound("case let .some(value)", "let"), vec!["value"]);
    assert_eq!(bound("case .pair(let a, var b)", "."), vec!["a", "b"]);
    assert_eq!(bound("case Result.failure(let error)", "Result"), vec!["error"]);
    assert_eq!(bound("case .point(x: let px, y: 0)", "."), vec!["px"]);
    assert_eq!(bound("if case let x? = y", "let"), vec!["x"]);
}
