//! Context resolution: declared defaults + caller input → final context.
//!
//! A template declares its variables in manifest order. Some defaults are
//! expressions over other variables (`"{{ context.project_name | slugify }}"`),
//! so resolution evaluates variables in dependency order, with ties kept in
//! declaration order. A dependency is any declared key a default names; a
//! name the template does not declare is left to the renderer, so
//! `{{ context.extra | default(value='x') }}` resolves to `x`.
//!
//! The resulting [`Context`] is always in declaration order and holds every
//! declared key.
//!
//! Two kinds of caller input exist:
//!
//! - lenient defaults (user configuration) replace declared defaults for keys
//!   the template knows and are ignored otherwise; see
//!   [`DefaultContext::apply_lenient`];
//! - [`Overrides`] are explicit and strict: unknown keys and values that do
//!   not fit the variable's kind are errors.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument, warn};

use crate::domain::{
    error::DomainError,
    text::{Scope, TemplateText, TextError},
    value_objects::{DefaultValue, Suggestion, Value, parse_flag},
};

// ============================================================================
// Declared variables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub default: DefaultValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, default: DefaultValue) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }

    /// `_`-prefixed keys are never prompted for.
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Single-underscore private keys are kept verbatim; everything else,
    /// including `__` keys, is rendered.
    pub fn is_rendered(&self) -> bool {
        !self.is_private() || self.name.starts_with("__")
    }

    pub fn is_prompted(&self) -> bool {
        !self.is_private()
    }
}

/// The variables a template declares, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultContext {
    origin: String,
    variables: Vec<Variable>,
}

impl DefaultContext {
    /// `origin` names the manifest in error locations.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            variables: Vec::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Append a variable. A repeated name replaces the earlier declaration in
    /// place.
    pub fn push(&mut self, variable: Variable) {
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.push(variable);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replace declared defaults with user-configured ones.
    ///
    /// Keys the template does not declare are skipped. A value for a choice
    /// moves that option to the front; a value that is not an option, or a
    /// non-boolean for a flag, is skipped with a warning.
    #[instrument(skip_all, fields(origin = %self.origin, count = defaults.len()))]
    pub fn apply_lenient(&mut self, defaults: &BTreeMap<String, String>) {
        for (key, raw) in defaults {
            let Some(variable) = self.variables.iter_mut().find(|v| &v.name == key) else {
                debug!(key = %key, "Ignoring default for undeclared key");
                continue;
            };

            match &mut variable.default {
                DefaultValue::Text(text) => *text = raw.clone(),
                DefaultValue::Flag(flag) => match parse_flag(raw) {
                    Some(b) => *flag = b,
                    None => warn!(key = %key, value = %raw, "Ignoring non-boolean default for flag"),
                },
                DefaultValue::Choice(options) => match options.iter().position(|o| o == raw) {
                    Some(i) => {
                        let chosen = options.remove(i);
                        options.insert(0, chosen);
                    }
                    None => warn!(
                        key = %key,
                        value = %raw,
                        "Ignoring default that is not one of the declared options"
                    ),
                },
            }
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Explicit caller-supplied values.
///
/// Values are taken literally; they are never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(BTreeMap<String, Value>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Parse `KEY=VALUE` pairs. The value may be empty; the key may not.
    pub fn parse_assignments<I, S>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    overrides.insert(key.trim(), value);
                }
                _ => {
                    return Err(DomainError::InvalidOverrideValue {
                        key: pair.to_string(),
                        value: String::new(),
                        reason: "expected KEY=VALUE".into(),
                    });
                }
            }
        }
        Ok(overrides)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layer `other` on top of `self`.
    pub fn merged(mut self, other: &Overrides) -> Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }
}

impl From<&Context> for Overrides {
    fn from(context: &Context) -> Self {
        Self(
            context
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

// ============================================================================
// Resolved context
// ============================================================================

/// The final, ordered key → value mapping a bake renders with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    order: Vec<String>,
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Scope for Context {
    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut context = Self::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves a [`DefaultContext`] plus [`Overrides`] into a [`Context`].
pub struct ContextResolver;

impl ContextResolver {
    /// Resolve without asking anyone: every key takes its override or its
    /// evaluated default.
    pub fn resolve(defaults: &DefaultContext, overrides: &Overrides) -> Result<Context, DomainError> {
        Self::resolve_with(defaults, overrides, |_: &Variable, s: &Suggestion| {
            Ok::<_, DomainError>(s.accept())
        })
    }

    /// Resolve, offering every public key to `ask` in evaluation order.
    ///
    /// `ask` receives the variable and its suggestion (the override if there
    /// is one, else the evaluated default) and returns the answer, which is
    /// coerced like an override.
    #[instrument(skip_all, fields(origin = %defaults.origin(), variables = defaults.len(), overrides = overrides.len()))]
    pub fn resolve_with<E, F>(
        defaults: &DefaultContext,
        overrides: &Overrides,
        mut ask: F,
    ) -> Result<Context, E>
    where
        E: From<DomainError>,
        F: FnMut(&Variable, &Suggestion) -> Result<Value, E>,
    {
        for key in overrides.keys() {
            if !defaults.contains(key) {
                return Err(DomainError::UnknownOverrideKey { key: key.clone() }.into());
            }
        }

        let plans = Self::plan(defaults, overrides)?;
        let order = Self::evaluation_order(defaults, &plans)?;

        let mut scope: HashMap<String, Value> = HashMap::with_capacity(defaults.len());
        for index in order {
            let variable = &defaults.variables[index];
            let plan = &plans[index];

            let suggestion = Self::suggest(defaults, variable, plan, overrides.get(&variable.name), &scope)?;
            let value = if variable.is_prompted() {
                let answer = ask(variable, &suggestion)?;
                coerce(variable, answer, &suggestion)?
            } else {
                suggestion.accept()
            };

            debug!(key = %variable.name, value = %value, "Resolved");
            scope.insert(variable.name.clone(), value);
        }

        let mut context = Context::new();
        for variable in defaults.iter() {
            if let Some(value) = scope.remove(&variable.name) {
                context.insert(variable.name.clone(), value);
            }
        }
        Ok(context)
    }

    /// Parse every rendered default once; collect its dependencies.
    fn plan(defaults: &DefaultContext, overrides: &Overrides) -> Result<Vec<Plan>, DomainError> {
        let mut plans = Vec::with_capacity(defaults.len());
        for variable in defaults.iter() {
            if !variable.is_rendered() {
                plans.push(Plan::default());
                continue;
            }

            let mut sources = Vec::new();
            for src in variable.default.sources() {
                let text = TemplateText::parse(src)
                    .map_err(|e| locate_default(e, defaults.origin(), &variable.name))?;
                sources.push(text);
            }

            // An overridden text key never looks at its default.
            let overridden_text = overrides.get(&variable.name).is_some()
                && matches!(variable.default, DefaultValue::Text(_));

            let mut deps = Vec::new();
            if !overridden_text {
                for text in &sources {
                    for key in text.referenced_keys() {
                        let dep = defaults.variables.iter().position(|v| v.name == key);
                        if let Some(dep) = dep.filter(|d| !deps.contains(d)) {
                            deps.push(dep);
                        }
                    }
                }
            }

            plans.push(Plan { sources, deps });
        }
        Ok(plans)
    }

    /// Indices in evaluation order: dependencies first, ties by declaration.
    fn evaluation_order(defaults: &DefaultContext, plans: &[Plan]) -> Result<Vec<usize>, DomainError> {
        let n = plans.len();
        let mut done = vec![false; n];
        let mut order = Vec::with_capacity(n);

        while order.len() < n {
            let next = (0..n).find(|&i| !done[i] && plans[i].deps.iter().all(|&d| done[d]));
            match next {
                Some(i) => {
                    done[i] = true;
                    order.push(i);
                }
                None => {
                    let keys = (0..n)
                        .filter(|&i| !done[i])
                        .map(|i| defaults.variables[i].name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(DomainError::CyclicDefault { keys });
                }
            }
        }
        Ok(order)
    }

    fn suggest(
        defaults: &DefaultContext,
        variable: &Variable,
        plan: &Plan,
        overridden: Option<&Value>,
        scope: &HashMap<String, Value>,
    ) -> Result<Suggestion, DomainError> {
        let render = |text: &TemplateText| {
            text.render(scope)
                .map_err(|e| locate_default(e, defaults.origin(), &variable.name))
        };

        let suggestion = match &variable.default {
            DefaultValue::Flag(b) => Suggestion::Flag(*b),
            DefaultValue::Text(raw) => match plan.sources.first() {
                Some(text) if overridden.is_none() => Suggestion::Text(render(text)?),
                _ => Suggestion::Text(raw.clone()),
            },
            DefaultValue::Choice(raw) => {
                let options = if variable.is_rendered() {
                    plan.sources.iter().map(render).collect::<Result<Vec<_>, _>>()?
                } else {
                    raw.clone()
                };
                Suggestion::Choice(options)
            }
        };

        match overridden {
            None => Ok(suggestion),
            Some(value) => {
                let value = coerce(variable, value.clone(), &suggestion)?;
                Ok(match (suggestion, value) {
                    (Suggestion::Choice(mut options), Value::Text(chosen)) => {
                        if let Some(i) = options.iter().position(|o| *o == chosen) {
                            let chosen = options.remove(i);
                            options.insert(0, chosen);
                        }
                        Suggestion::Choice(options)
                    }
                    (_, Value::Flag(b)) => Suggestion::Flag(b),
                    (_, Value::Text(s)) => Suggestion::Text(s),
                })
            }
        }
    }
}

#[derive(Debug, Default)]
struct Plan {
    sources: Vec<TemplateText>,
    deps: Vec<usize>,
}

fn locate_default(err: TextError, origin: &str, key: &str) -> DomainError {
    err.at(format!("{origin}:{key}"))
}

/// Fit a raw value to a variable's kind. `suggestion` carries the rendered
/// options for choices.
fn coerce(variable: &Variable, raw: Value, suggestion: &Suggestion) -> Result<Value, DomainError> {
    let invalid = |value: &str, reason: String| DomainError::InvalidOverrideValue {
        key: variable.name.clone(),
        value: value.to_string(),
        reason,
    };

    match (&variable.default, raw) {
        (DefaultValue::Text(_), raw) => Ok(Value::Text(raw.into_text())),
        (DefaultValue::Flag(_), Value::Flag(b)) => Ok(Value::Flag(b)),
        (DefaultValue::Flag(_), Value::Text(s)) => parse_flag(&s)
            .map(Value::Flag)
            .ok_or_else(|| invalid(&s, "expected a yes/no value (true, false, yes, no, 1, 0)".into())),
        (DefaultValue::Choice(_), raw) => {
            let text = raw.into_text();
            let options = match suggestion {
                Suggestion::Choice(options) => options.as_slice(),
                _ => &[],
            };
            if options.contains(&text) {
                Ok(Value::Text(text))
            } else {
                Err(invalid(&text, format!("must be one of: {}", options.join(", "))))
            }
        }
    }
}
