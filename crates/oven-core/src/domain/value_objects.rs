//! Value objects: context values as declared and as resolved.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved context value.
///
/// Templates only ever see two shapes: text, and flags. Choices resolve to
/// the selected option's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Flag(bool),
    Text(String),
}

impl Value {
    /// Truthiness used by `{% if %}` blocks and `_include_if` conditions.
    ///
    /// An empty string is false; this is how a template turns a feature off
    /// (`docker_repository = ""`).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Text form used for substitution. Flags render as `true`/`false`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Flag(true) => Cow::Borrowed("true"),
            Self::Flag(false) => Cow::Borrowed("false"),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            flag => flag.as_text().into_owned(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// A default as declared in the template manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Plain text, possibly an expression over other keys.
    Text(String),
    /// Yes/no question.
    Flag(bool),
    /// One of a fixed list; the first option is the default.
    Choice(Vec<String>),
}

impl DefaultValue {
    pub fn kind(&self) -> VariableKind {
        match self {
            Self::Text(_) => VariableKind::Text,
            Self::Flag(_) => VariableKind::Flag,
            Self::Choice(_) => VariableKind::Choice,
        }
    }

    /// Raw template strings of this default (text or every option).
    pub fn sources(&self) -> Vec<&str> {
        match self {
            Self::Text(s) => vec![s.as_str()],
            Self::Flag(_) => Vec::new(),
            Self::Choice(options) => options.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Choice(options) => write!(f, "[{}]", options.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Text,
    Flag,
    Choice,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Flag => write!(f, "flag"),
            Self::Choice => write!(f, "choice"),
        }
    }
}

/// What a prompter is offered for one key: the evaluated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Text(String),
    Flag(bool),
    /// Rendered options, the suggested one first.
    Choice(Vec<String>),
}

impl Suggestion {
    /// The value used when nobody answers.
    pub fn accept(&self) -> Value {
        match self {
            Self::Text(s) => Value::Text(s.clone()),
            Self::Flag(b) => Value::Flag(*b),
            Self::Choice(options) => Value::Text(options.first().cloned().unwrap_or_default()),
        }
    }
}

/// Parse a yes/no answer.
///
/// Accepts the spellings people actually type on a command line.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_falsy() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("esta.docker").is_truthy());
        assert!(Value::from(" ").is_truthy());
    }

    #[test]
    fn flags_render_lowercase() {
        assert_eq!(Value::Flag(true).as_text(), "true");
        assert_eq!(Value::Flag(false).to_string(), "false");
    }

    #[test]
    fn parse_flag_spellings() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn choice_suggestion_accepts_first_option() {
        let s = Suggestion::Choice(vec!["3.11".into(), "3.9".into()]);
        assert_eq!(s.accept(), Value::from("3.11"));
    }
}
