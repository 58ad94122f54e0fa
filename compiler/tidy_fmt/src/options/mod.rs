//! Formatting options.
//!
//! [`FormatOptions`] is a flat record passed explicitly to every rule. Each
//! field also has a stable name so callers holding string configuration can
//! read and write it through [`FormatOptions::get`] and
//! [`FormatOptions::set`] without knowing the field types.

use std::fmt;

use crate::FormatError;

/// Default column limit. Zero disables wrapping.
pub const DEFAULT_MAX_WIDTH: usize = 0;

/// Default indent unit.
pub const DEFAULT_INDENT: &str = "    ";

/// Names accepted by [`FormatOptions::get`] and [`FormatOptions::set`].
pub const OPTION_NAMES: &[&str] = &[
    "fragment",
    "ifdef",
    "indent",
    "indentcase",
    "languageversion",
    "linebreaks",
    "maxwidth",
    "organizetypes",
    "self",
    "selfrequired",
    "tabwidth",
    "trimblanklines",
    "wraparguments",
];

/// Enumerated options with a fixed set of spellings.
trait Choice: Copy + PartialEq + 'static {
    const CHOICES: &'static [(&'static str, Self)];
    const EXPECTED: &'static str;

    fn name(self) -> &'static str {
        Self::CHOICES
            .iter()
            .find(|(_, value)| *value == self)
            .map_or("", |(name, _)| name)
    }

    fn parse(text: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, value)| *value)
    }
}

/// How `#if` ... `#endif` bodies are indented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IfdefIndent {
    /// One unit deeper than the `#if`.
    #[default]
    Indent,
    /// Same level as the `#if`.
    NoIndent,
    /// Directives at column zero, body at the enclosing level.
    Outdent,
}

impl Choice for IfdefIndent {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("indent", IfdefIndent::Indent),
        ("no-indent", IfdefIndent::NoIndent),
        ("outdent", IfdefIndent::Outdent),
    ];
    const EXPECTED: &'static str = "indent, no-indent or outdent";
}

/// Argument wrapping style for over-long calls and parameter lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Break after `(`, one argument per line, `)` on its own line.
    #[default]
    BeforeFirst,
    /// First argument stays on the call line, the rest align under it.
    AfterFirst,
    /// Never wrap.
    Preserve,
}

impl Choice for WrapMode {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("before-first", WrapMode::BeforeFirst),
        ("after-first", WrapMode::AfterFirst),
        ("preserve", WrapMode::Preserve),
    ];
    const EXPECTED: &'static str = "before-first, after-first or preserve";
}

/// Explicit `self` policy for member references.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelfMode {
    #[default]
    Remove,
    Insert,
    /// Insert inside initializers, remove everywhere else.
    InitOnly,
}

impl Choice for SelfMode {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("remove", SelfMode::Remove),
        ("insert", SelfMode::Insert),
        ("init-only", SelfMode::InitOnly),
    ];
    const EXPECTED: &'static str = "remove, insert or init-only";
}

/// Target language version, compared component-wise.
///
/// The default, `0.0.0`, means "unknown" and disables every
/// version-gated behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version { major, minor, patch }
    }

    /// Parse `5`, `5.8` or `5.8.1`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Version::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// An option value resolved by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Integer(usize),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
            OptionValue::List(values) => f.write_str(&values.join(",")),
        }
    }
}

/// Configuration shared by every rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Indent unit: spaces or a single tab.
    pub indent: String,
    /// Columns per tab when measuring line width.
    pub tab_width: usize,
    /// Linebreak inserted by rules that add lines.
    pub linebreak: String,
    /// Indent `case` labels one unit inside their `switch`.
    pub indent_case: bool,
    pub ifdef_indent: IfdefIndent,
    /// Strip whitespace from blank lines.
    pub truncate_blank_lines: bool,
    /// Column limit for argument wrapping; zero disables it.
    pub max_width: usize,
    pub wrap_arguments: WrapMode,
    pub self_mode: SelfMode,
    /// Functions whose arguments keep explicit `self` (autoclosure
    /// parameters, for instance).
    pub self_required: Vec<String>,
    pub language_version: Version,
    /// Input is a fragment: unbalanced scopes are tolerated and
    /// whole-file rules are skipped.
    pub fragment: bool,
    /// Declaration keywords whose bodies `organizeDeclarations` sorts.
    pub organize_types: Vec<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            indent: DEFAULT_INDENT.to_owned(),
            tab_width: 4,
            linebreak: "\n".to_owned(),
            indent_case: false,
            ifdef_indent: IfdefIndent::default(),
            truncate_blank_lines: true,
            max_width: DEFAULT_MAX_WIDTH,
            wrap_arguments: WrapMode::default(),
            self_mode: SelfMode::default(),
            self_required: Vec::new(),
            language_version: Version::default(),
            fragment: false,
            organize_types: ["class", "actor", "struct", "enum"].map(str::to_owned).to_vec(),
        }
    }
}

impl FormatOptions {
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_wrap_arguments(mut self, mode: WrapMode) -> Self {
        self.wrap_arguments = mode;
        self
    }

    pub fn with_self_mode(mut self, mode: SelfMode) -> Self {
        self.self_mode = mode;
        self
    }

    pub fn with_language_version(mut self, version: Version) -> Self {
        self.language_version = version;
        self
    }

    pub fn with_indent_case(mut self, indent_case: bool) -> Self {
        self.indent_case = indent_case;
        self
    }

    pub fn with_ifdef_indent(mut self, ifdef: IfdefIndent) -> Self {
        self.ifdef_indent = ifdef;
        self
    }

    pub fn with_fragment(mut self, fragment: bool) -> Self {
        self.fragment = fragment;
        self
    }

    /// Read the option called `name`.
    pub fn get(&self, name: &str) -> Result<OptionValue, FormatError> {
        Ok(match name {
            "fragment" => OptionValue::Bool(self.fragment),
            "ifdef" => OptionValue::Text(self.ifdef_indent.name().to_owned()),
            "indent" => OptionValue::Text(if self.indent == "\t" {
                "tab".to_owned()
            } else {
                self.indent.len().to_string()
            }),
            "indentcase" => OptionValue::Bool(self.indent_case),
            "languageversion" => OptionValue::Text(self.language_version.to_string()),
            "linebreaks" => OptionValue::Text(
                match self.linebreak.as_str() {
                    "\r" => "cr",
                    "\r\n" => "crlf",
                    _ => "lf",
                }
                .to_owned(),
            ),
            "maxwidth" => OptionValue::Integer(self.max_width),
            "organizetypes" => OptionValue::List(self.organize_types.clone()),
            "self" => OptionValue::Text(self.self_mode.name().to_owned()),
            "selfrequired" => OptionValue::List(self.self_required.clone()),
            "tabwidth" => OptionValue::Integer(self.tab_width),
            "trimblanklines" => OptionValue::Bool(self.truncate_blank_lines),
            "wraparguments" => OptionValue::Text(self.wrap_arguments.name().to_owned()),
            _ => return Err(FormatError::UnknownOption(name.to_owned())),
        })
    }

    /// Set the option called `name` from its textual form.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FormatError> {
        match name {
            "fragment" => self.fragment = parse_bool(name, value)?,
            "ifdef" => self.ifdef_indent = parse_choice(name, value)?,
            "indent" => self.indent = parse_indent(name, value)?,
            "indentcase" => self.indent_case = parse_bool(name, value)?,
            "languageversion" => {
                self.language_version =
                    Version::parse(value).ok_or_else(|| FormatError::invalid(name, value, "a version like 5.8"))?;
            }
            "linebreaks" => {
                self.linebreak = match value.to_ascii_lowercase().as_str() {
                    "lf" => "\n",
                    "cr" => "\r",
                    "crlf" => "\r\n",
                    _ => return Err(FormatError::invalid(name, value, "lf, cr or crlf")),
                }
                .to_owned();
            }
            "maxwidth" => self.max_width = parse_integer(name, value)?,
            "organizetypes" => self.organize_types = parse_list(value),
            "self" => self.self_mode = parse_choice(name, value)?,
            "selfrequired" => self.self_required = parse_list(value),
            "tabwidth" => self.tab_width = parse_integer(name, value)?,
            "trimblanklines" => self.truncate_blank_lines = parse_bool(name, value)?,
            "wraparguments" => self.wrap_arguments = parse_choice(name, value)?,
            _ => return Err(FormatError::UnknownOption(name.to_owned())),
        }
        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, FormatError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(FormatError::invalid(name, value, "true or false")),
    }
}

fn parse_integer(name: &str, value: &str) -> Result<usize, FormatError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| FormatError::invalid(name, value, "a non-negative integer"))
}

fn parse_choice<T: Choice>(name: &str, value: &str) -> Result<T, FormatError> {
    T::parse(value.trim()).ok_or_else(|| FormatError::invalid(name, value, T::EXPECTED))
}

fn parse_indent(name: &str, value: &str) -> Result<String, FormatError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("tab") || value.eq_ignore_ascii_case("tabs") {
        return Ok("\t".to_owned());
    }
    match value.parse::<usize>() {
        Ok(width) if width > 0 => Ok(" ".repeat(width)),
        _ => Err(FormatError::invalid(name, value, "a positive number of spaces or `tab`")),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
