use super::*;
use pretty_assertions::assert_eq;
use tidy_lexer::lex;

fn resolve(source: &str, options: &FormatOptions) -> String {
    let mut f = Formatter::new(lex(source), options);
    f.begin_rule("redundantSelf");
    redundant_self(&mut f).unwrap();
    f.source()
}

fn remove() -> FormatOptions {
    FormatOptions::default()
}

fn insert() -> FormatOptions {
    FormatOptions::default().with_self_mode(SelfMode::Insert)
}

#[test]
fn removes_self_before_members() {
    let source = "\
class Foo {
    var bar = 1
    func f() {
        print(self.bar)
    }
}
";
    assert_eq!(
        resolve(source, &remove()),
        "\
class Foo {
    var bar = 1
    func f() {
        print(bar)
    }
}
"
    );
}

#[test]
fn shadowed_members_keep_self() {
    let source = "\
class Foo {
    var bar = 1
    func f(bar: Int) {
        print(self.bar)
    }
    func g() {
        let bar = self.bar
        print(bar)
    }
    func h() {
        print(self.bar)
        let bar = 2
        print(bar)
    }
}
";
    assert_eq!(resolve(source, &remove()), source);
}

#[test]
fn inserting_respects_locals() {
    let source = "\
class Foo {
    var bar = 1
    func f() {
        let bar = 2
        print(bar)
    }
    func g() {
        print(bar)
    }
}
";
    assert_eq!(
        resolve(source, &insert()),
        "\
class Foo {
    var bar = 1
    func f() {
        let bar = 2
        print(bar)
    }
    func g() {
        print(self.bar)
    }
}
"
    );
}

#[test]
fn inserting_skips_labels_parameters_and_qualified_names() {
    let source = "\
struct S {
    var x = 0
    func f(x: Int) -> Int { x }
    func g() -> Int { h(x: x) + other.x }
    func h(x: Int) -> Int { 0 }
}
";
    assert_eq!(
        resolve(source, &insert()),
        "\
struct S {
    var x = 0
    func f(x: Int) -> Int { x }
    func g() -> Int { self.h(x: self.x) + other.x }
    func h(x: Int) -> Int { 0 }
}
"
    );
}

#[test]
fn loop_variables_and_caught_errors_are_locals() {
    let source = "\
class C {
    var item = 0
    var error = 0
    func f(items: [Int]) {
        for item in items {
            print(item)
        }
        do {
            try g()
        } catch {
            print(error)
        }
        print(item)
    }
    func g() throws {}
}
";
    assert_eq!(
        resolve(source, &insert()),
        "\
class C {
    var item = 0
    var error = 0
    func f(items: [Int]) {
        for item in items {
            print(item)
        }
        do {
            try self.g()
        } catch {
            print(error)
        }
        print(self.item)
    }
    func g() throws {}
}
"
    );
}

#[test]
fn static_and_instance_members_are_separate() {
    let source = "\
struct S {
    static var shared = 0
    var count = 0
    static func reset() {
        print(shared)
        print(count)
    }
}
";
    assert_eq!(
        resolve(source, &insert()),
        "\
struct S {
    static var shared = 0
    var count = 0
    static func reset() {
        print(self.shared)
        print(count)
    }
}
"
    );
}

#[test]
fn init_only_inserts_in_initializers() {
    let source = "\
struct P {
    var x: Int
    init(value: Int) {
        x = value
    }
    func show() {
        print(self.x)
    }
}
";
    let options = FormatOptions::default().with_self_mode(SelfMode::InitOnly);
    assert_eq!(
        resolve(source, &options),
        "\
struct P {
    var x: Int
    init(value: Int) {
        self.x = value
    }
    func show() {
        print(x)
    }
}
"
    );
}

#[test]
fn class_closures_keep_explicit_self() {
    let source = "\
class C {
    var value = 0
    func f() {
        run { [weak self] in
            self?.value = 1
        }
        run {
            self.value = 2
        }
    }
}
";
    assert_eq!(resolve(source, &remove()), source);
}

#[test]
fn value_type_closures_allow_implicit_self() {
    let source = "\
struct S {
    var value = 0
    func f() {
        run {
            print(self.value)
        }
    }
}
";
    assert_eq!(
        resolve(source, &remove()),
        "\
struct S {
    var value = 0
    func f() {
        run {
            print(value)
        }
    }
}
"
    );
}

#[test]
fn unwrapped_weak_self_depends_on_language_version() {
    let source = "\
class C {
    var value = 0
    func f() {
        run { [weak self] in
            guard let self else { return }
            print(self.value)
        }
    }
}
";
    assert_eq!(resolve(source, &remove()), source);

    let options = remove().with_language_version(Version::new(5, 8, 0));
    assert_eq!(
        resolve(source, &options),
        source.replace("print(self.value)", "print(value)")
    );
}

#[test]
fn extensions_see_members_of_the_extended_type() {
    let source = "\
class C {
    var name = \"\"
}

extension C {
    func greet() {
        print(name)
    }
}
";
    assert_eq!(
        resolve(source, &insert()),
        source.replace("print(name)", "print(self.name)")
    );
}

#[test]
fn required_calls_keep_explicit_self() {
    let source = "\
struct S {
    var x = 0
    func f() {
        expect(self.x)
        print(self.x)
    }
}
";
    let mut options = remove();
    options.self_required = vec!["expect".to_owned()];
    assert_eq!(
        resolve(source, &options),
        source.replace("print(self.x)", "print(x)")
    );
}

#[test]
fn accessor_values_are_locals() {
    let source = "\
class C {
    var newValue = 0
    var total: Int {
        get { 0 }
        set { print(self.newValue) }
    }
}
";
    assert_eq!(resolve(source, &remove()), source);
}

#[test]
fn fragments_are_left_alone() {
    let source = "func f() {\n    print(self.x)\n";
    let options = remove().with_fragment(true);
    assert_eq!(resolve(source, &options), source);
}

#[test]
fn single_line_types_have_members() {
    assert_eq!(
        resolve("class Foo { var bar = 1; func g() { print(bar) } }", &insert()),
        "class Foo { var bar = 1; func g() { print(self.bar) } }"
    );
    assert_eq!(
        resolve("struct S { let x = 0; func f() -> Int { self.x } }", &remove()),
        "struct S { let x = 0; func f() -> Int { x } }"
    );
}

#[test]
fn single_line_nested_types_have_members() {
    let source = "\
struct Outer {
    enum Mode { case fast; var speed: Int { 1 } }
    var mode = 0
}
extension Outer.Mode { func flip() { print(speed) } }
";
    assert_eq!(
        resolve(source, &insert()),
        source.replace("print(speed)", "print(self.speed)")
    );
}

#[test]
fn effectful_getters_are_not_closures() {
    let source = "\
class C {
    var x = 1
    var y: Int {
        get async throws {
            self.x
        }
    }
}
";
    assert_eq!(resolve(source, &remove()), source.replace("self.x\n", "x\n"));
}
