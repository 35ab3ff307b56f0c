//! The template text language.
//!
//! Template text is rendered with Tera: `{{ expr }}` output, `{% if %}` and
//! `{% for %}` blocks, `{% raw %}` and `{# comments #}`. Keys are reached as
//! `context.<key>`, with `cookiecutter.<key>` as an alias. Block tags are not
//! trimmed implicitly; `-` inside a delimiter strips the whitespace on that
//! side, so a tag on a line of its own is written `{%- if ... %}`.
//!
//! Parsing and rendering are separate: a [`TemplateText`] is parsed once and
//! can be rendered against any number of scopes. Text without markup never
//! reaches the engine.

pub mod case;
pub mod filters;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::value_objects::Value;

/// Name of the single template held by each engine.
const NAME: &str = "text";

/// Variables the scope is published under.
const ALIASES: [&str; 2] = ["context", "cookiecutter"];

/// Values a template renders against.
pub trait Scope: Serialize {
    fn has_key(&self, key: &str) -> bool;
}

impl Scope for HashMap<String, Value> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl Scope for BTreeMap<String, Value> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

/// Error from parsing or rendering a piece of template text.
///
/// Carries the line when one is known; callers attach the file or key it
/// came from with [`TextError::located`] or [`TextError::at`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { key: String, line: usize },

    /// Rejected by the engine at a position it does not report.
    #[error("{reason}")]
    Invalid { reason: String },
}

impl TextError {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::UnknownKey { line, .. } => Some(*line),
            Self::Invalid { .. } => None,
        }
    }

    /// Convert to a domain error located at `origin:line`.
    pub fn located(self, origin: &str) -> DomainError {
        let location = match self.line() {
            Some(line) => format!("{origin}:{line}"),
            None => origin.to_string(),
        };
        self.at(location)
    }

    /// Convert to a domain error at exactly `location`.
    pub fn at(self, location: impl Into<String>) -> DomainError {
        let location = location.into();
        match self {
            Self::Syntax { reason, .. } | Self::Invalid { reason } => {
                DomainError::TemplateSyntax { location, reason }
            }
            Self::UnknownKey { key, .. } => DomainError::UnresolvedPlaceholder { key, location },
        }
    }
}

/// True if `src` contains anything the renderer would interpret.
pub fn contains_markup(src: &str) -> bool {
    src.contains("{{") || src.contains("{%") || src.contains("{#")
}

/// A Tera instance with the identifier filters and no HTML escaping.
fn engine() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    filters::register_filters(&mut tera);
    tera
}

/// Parsed template text.
pub struct TemplateText {
    source: String,
    engine: Option<Tera>,
}

impl TemplateText {
    pub fn parse(src: &str) -> Result<Self, TextError> {
        if !contains_markup(src) {
            return Ok(Self {
                source: src.to_string(),
                engine: None,
            });
        }

        let mut tera = engine();
        tera.add_raw_template(NAME, src)
            .map_err(|e| syntax_error(&e))?;
        Ok(Self {
            source: src.to_string(),
            engine: Some(tera),
        })
    }

    pub fn render<S: Scope + ?Sized>(&self, scope: &S) -> Result<String, TextError> {
        let Some(tera) = &self.engine else {
            return Ok(self.source.clone());
        };

        let mut context = tera::Context::new();
        for alias in ALIASES {
            context.insert(alias, scope);
        }
        tera.render(NAME, &context).map_err(|e| self.render_error(&e))
    }

    /// Keys named as `context.<key>` or `cookiecutter.<key>`, in first-use
    /// order.
    pub fn referenced_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        if self.engine.is_none() {
            return keys;
        }

        let src = self.source.as_str();
        for (at, _) in src.char_indices() {
            let Some(tail) = strip_alias(&src[at..]) else {
                continue;
            };
            if src[..at].chars().next_back().is_some_and(is_ident) {
                continue;
            }
            let key: String = tail.chars().take_while(|c| is_ident(*c)).collect();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// True if rendering cannot change the text.
    pub fn is_literal(&self) -> bool {
        self.engine.is_none()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// First line mentioning `needle`, else 1.
    fn line_of(&self, needle: &str) -> usize {
        self.source
            .lines()
            .position(|line| line.contains(needle))
            .map_or(1, |i| i + 1)
    }

    fn render_error(&self, err: &tera::Error) -> TextError {
        let chain = messages(err);
        for message in &chain {
            if let Some(ident) = missing_variable(message) {
                let key = strip_alias(ident)
                    .unwrap_or(ident)
                    .chars()
                    .take_while(|c| is_ident(*c))
                    .collect();
                return TextError::UnknownKey {
                    key,
                    line: self.line_of(ident),
                };
            }
        }
        TextError::Invalid {
            reason: innermost(chain),
        }
    }
}

impl fmt::Debug for TemplateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateText")
            .field("source", &self.source)
            .field("literal", &self.is_literal())
            .finish()
    }
}

/// Parse and render in one step.
pub fn render_str<S: Scope + ?Sized>(src: &str, scope: &S) -> Result<String, TextError> {
    TemplateText::parse(src)?.render(scope)
}

/// A yes/no expression such as `context.docker_repository and not context.private`.
///
/// Unlike an `{% if %}` inside a file, every key a condition names must be
/// in scope.
#[derive(Debug)]
pub struct Condition {
    text: TemplateText,
}

impl Condition {
    pub fn parse(src: &str) -> Result<Self, TextError> {
        if src.trim().is_empty() {
            return Err(TextError::Invalid {
                reason: "empty condition".into(),
            });
        }
        let text = TemplateText::parse(&format!("{{% if {src} %}}true{{% endif %}}"))?;
        Ok(Self { text })
    }

    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Result<bool, TextError> {
        if let Some(key) = self.text.referenced_keys().into_iter().find(|k| !scope.has_key(k)) {
            return Err(TextError::UnknownKey { key, line: 1 });
        }
        Ok(self.text.render(scope)? == "true")
    }
}

// ============================================================================
// Engine error mapping
// ============================================================================

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `key...` out of `context.key...` or `cookiecutter.key...`.
fn strip_alias(s: &str) -> Option<&str> {
    ALIASES
        .iter()
        .find_map(|alias| s.strip_prefix(alias).and_then(|rest| rest.strip_prefix('.')))
}

/// Every message in the error chain, outermost first.
fn messages(err: &tera::Error) -> Vec<String> {
    let mut out = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        out.push(inner.to_string());
        source = inner.source();
    }
    out
}

fn innermost(chain: Vec<String>) -> String {
    chain
        .into_iter()
        .last()
        .map(|m| m.trim().to_string())
        .unwrap_or_default()
}

/// `context.x` out of "Variable `context.x` not found in context ...".
fn missing_variable(message: &str) -> Option<&str> {
    let start = message.find("Variable `")? + "Variable `".len();
    let (ident, tail) = message[start..].split_once('`')?;
    tail.starts_with(" not found").then_some(ident)
}

/// Line of a parser position marker (` --> 3:7`).
fn position_line(message: &str) -> Option<usize> {
    let (_, after) = message.split_once("--> ")?;
    let (line, _) = after.split_once(':')?;
    line.trim().parse().ok()
}

fn syntax_error(err: &tera::Error) -> TextError {
    let chain = messages(err);
    for message in &chain {
        if let Some(line) = position_line(message) {
            let reason = message
                .lines()
                .map(str::trim)
                .find_map(|l| l.strip_prefix("= "))
                .unwrap_or_else(|| message.trim())
                .to_string();
            return TextError::Syntax { line, reason };
        }
    }
    TextError::Invalid {
        reason: innermost(chain),
    }
}
