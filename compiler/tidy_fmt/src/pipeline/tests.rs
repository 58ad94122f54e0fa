use super::*;
use crate::rules::{default_rules, rules_named};
use pretty_assertions::assert_eq;

fn named(names: &[&str]) -> Vec<&'static Rule> {
    rules_named(names).unwrap()
}

#[test]
fn default_rules_clean_up_a_file() {
    let source = "\
func f() {


let x = 1
        return x
}";
    assert_eq!(
        format(source, &default_rules(), &FormatOptions::default()).unwrap(),
        "func f() {\n    let x = 1\n    return x\n}\n"
    );
}

#[test]
fn empty_rule_set_is_a_no_op() {
    let source = "  func  f( ) {\n\n\n}   ";
    let options = FormatOptions::default();
    assert_eq!(format(source, &[], &options).unwrap(), source);
    let buffer = apply_rules(lex(source), &[], &options).unwrap();
    assert_eq!(buffer.tokens(), lex(source).tokens());
}

#[test]
fn selection_order_does_not_matter() {
    let source = "if x {\nfoo()   \n}\n";
    let options = FormatOptions::default();
    let forward = format(source, &named(&["indent", "trailingSpace"]), &options).unwrap();
    let backward = format(source, &named(&["trailingSpace", "indent", "indent"]), &options).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward, "if x {\n    foo()\n}\n");
}

#[test]
fn stray_closers_abort_the_file() {
    let error = format("}\n", &default_rules(), &FormatOptions::default()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "parsing failed at position 0: expected an opener for `}`"
    );
}

#[test]
fn unclosed_scopes_abort_the_file() {
    let error = format("func f() {\n", &default_rules(), &FormatOptions::default()).unwrap_err();
    assert_eq!(
        error,
        FormatError::Parse(ParseError::expected(6, "a closer for `{`"))
    );
}

#[test]
fn fragments_tolerate_open_scopes() {
    let options = FormatOptions::default().with_fragment(true);
    assert_eq!(
        format("func f() {\nreturn 1\n", &named(&["indent"]), &options).unwrap(),
        "func f() {\n    return 1\n"
    );
}

#[test]
fn diagnose_attributes_changes_to_rules() {
    let source = "func f() {\nreturn 1  \n}\n";
    let options = FormatOptions::default();
    let rules = named(&["trailingSpace", "indent"]);
    let (buffer, changes) = diagnose(lex(source), &rules, &options).unwrap();
    assert_eq!(buffer.source(), format(source, &rules, &options).unwrap());
    let names: Vec<&str> = changes.iter().map(|c| c.rule).collect();
    assert_eq!(names, ["indent", "trailingSpace"]);
    for change in &changes {
        assert!(change.range.start <= change.range.end);
        assert!(change.range.end <= buffer.len());
    }
}

#[test]
fn diagnose_reports_nothing_for_clean_input() {
    let source = "func f() {\n    return 1\n}\n";
    let (_, changes) = diagnose(lex(source), &default_rules(), &FormatOptions::default()).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn batches_keep_per_file_results() {
    let sources = ["if x {\nfoo()\n}\n", "}\n", "let y = 2"];
    let results = format_batch(&sources, &default_rules(), &FormatOptions::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_deref(), Ok("if x {\n    foo()\n}\n"));
    assert!(results[1].is_err());
    assert_eq!(results[2].as_deref(), Ok("let y = 2\n"));
}

#[test]
fn changed_range_covers_the_edit() {
    let before = lex("a b c").into_tokens();
    let after = lex("a xy c").into_tokens();
    assert_eq!(changed_range(&before, &after), Some(2..3));
    assert_eq!(changed_range(&before, &before), None);

    let inserted = lex("a b b c").into_tokens();
    assert_eq!(changed_range(&before, &inserted), Some(4..6));
}
