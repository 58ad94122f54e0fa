use super::*;
use pretty_assertions::assert_eq;

#[test]
fn registry_is_sorted_by_name() {
    let names: Vec<&str> = rules().iter().map(|r| r.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);
}

#[test]
fn organize_declarations_is_opt_in() {
    let defaults: Vec<&str> = default_rules().iter().map(|r| r.name).collect();
    assert!(!defaults.contains(&"organizeDeclarations"));
    assert_eq!(defaults.len(), rules().len() - 1);
    assert!(!rule_named("organizeDeclarations").unwrap().default_enabled);
}

#[test]
fn rules_resolve_by_name() {
    let selected = rules_named(&["indent", "trailingSpace"]).unwrap();
    let names: Vec<&str> = selected.iter().map(|r| r.name).collect();
    assert_eq!(names, ["indent", "trailingSpace"]);
    assert!(rules().iter().all(|r| !r.help.is_empty()));
}

#[test]
fn unknown_rules_are_an_error() {
    assert_eq!(
        rules_named(&["indent", "sortImports"]),
        Err(FormatError::UnknownRule("sortImports".to_owned()))
    );
    assert_eq!(
        FormatError::UnknownRule("sortImports".to_owned()).to_string(),
        "unknown rule: sortImports"
    );
}
