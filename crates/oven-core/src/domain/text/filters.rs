//! Identifier filters registered on every template engine.
//!
//! Tera ships `lower`, `upper`, `trim`, `title`, `capitalize`, `replace` and
//! `default`; the filters here cover project and package names.

use std::collections::HashMap;

use tera::{Result, Tera, Value};

use super::case;

/// Register the identifier filters on `tera`.
///
/// - `slugify`: import-safe identifier (`Funky Grogu` → `funky_grogu`).
///   Replaces Tera's own `slugify`, which joins words with `-`.
/// - `snake`: snake_case
/// - `kebab`: kebab-case
/// - `pascal`: PascalCase
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("slugify", slugify);
    tera.register_filter("snake", snake);
    tera.register_filter("kebab", kebab);
    tera.register_filter("pascal", pascal);
}

fn extract_str<'a>(value: &'a Value, filter_name: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("filter '{filter_name}' expects text, got {value}")))
}

fn slugify(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = extract_str(value, "slugify")?;
    Ok(Value::String(case::slugify(s)))
}

fn snake(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = extract_str(value, "snake")?;
    Ok(Value::String(case::to_snake_case(s)))
}

fn kebab(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = extract_str(value, "kebab")?;
    Ok(Value::String(case::to_kebab_case(s)))
}

fn pascal(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = extract_str(value, "pascal")?;
    Ok(Value::String(case::to_pascal_case(s)))
}
