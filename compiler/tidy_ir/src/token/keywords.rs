//! Fixed keyword tables.

/// Words the lexer classifies as [`Token::Keyword`](super::Token::Keyword).
pub const KEYWORDS: &[&str] = &[
    "associatedtype", "class", "deinit", "enum", "extension", "fileprivate", "func", "import",
    "init", "inout", "internal", "let", "open", "operator", "private", "precedencegroup",
    "protocol", "public", "rethrows", "static", "struct", "subscript", "typealias", "var",
    "break", "case", "catch", "continue", "default", "defer", "do", "else", "fallthrough", "for",
    "guard", "if", "in", "repeat", "return", "throw", "switch", "where", "while", "Any", "as",
    "await", "false", "is", "nil", "self", "Self", "super", "throws", "true", "try", "async",
    "actor", "macro", "package", "final", "lazy", "weak", "unowned", "mutating", "nonmutating",
    "override", "convenience", "required", "dynamic", "indirect", "optional", "nonisolated",
    "prefix", "postfix", "infix",
];

/// Keywords that introduce a declaration.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "let", "var", "typealias", "func", "enum", "case", "struct", "class", "actor", "protocol",
    "init", "deinit", "extension", "subscript", "operator", "precedencegroup", "associatedtype",
    "import", "macro",
];

/// Declaration modifiers. `class` doubles as a modifier (`class func`).
pub const MODIFIERS: &[&str] = &[
    "public", "private", "fileprivate", "internal", "open", "package", "static", "class", "final",
    "lazy", "weak", "unowned", "mutating", "nonmutating", "override", "convenience", "required",
    "dynamic", "indirect", "optional", "nonisolated", "prefix", "postfix", "infix",
];

/// Contextual accessor names inside property bodies.
pub const ACCESSOR_NAMES: &[&str] = &[
    "get", "set", "willSet", "didSet", "_read", "_modify", "unsafeAddress", "unsafeMutableAddress",
];

/// Keywords that directly govern a `{ ... }` body rather than a closure.
const BODY_KEYWORDS: &[&str] = &[
    "if", "guard", "while", "for", "switch", "catch", "func", "init", "subscript", "deinit",
    "class", "struct", "enum", "actor", "protocol", "extension", "do", "repeat", "else", "defer",
    "operator", "precedencegroup", "import",
];

pub fn is_declaration_keyword(word: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&word)
}

pub fn is_modifier(word: &str) -> bool {
    MODIFIERS.contains(&word)
}

pub fn is_accessor_name(word: &str) -> bool {
    ACCESSOR_NAMES.contains(&word)
}

pub fn is_body_keyword(word: &str) -> bool {
    BODY_KEYWORDS.contains(&word)
}

/// Keywords that declare a nominal type or extend one.
pub fn is_type_keyword(word: &str) -> bool {
    matches!(
        word,
        "class" | "struct" | "enum" | "actor" | "protocol" | "extension"
    )
}
