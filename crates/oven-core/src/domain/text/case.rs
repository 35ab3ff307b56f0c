//! Identifier case conversions used by the slug filters.

/// Filesystem- and import-safe identifier.
///
/// Lower-cases, turns whitespace and `-` into `_`, drops everything that is
/// not ASCII alphanumeric or `_`, collapses `_` runs and trims them from both
/// ends.
///
/// | Input | Output |
/// |-------|--------|
/// | "Funky Grogu" | "funky_grogu" |
/// | "ESTA Python" | "esta_python" |
/// | "my-app (beta)!" | "my_app_beta" |
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if c.is_whitespace() || c == '-' { '_' } else { c };
        if c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        } else if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// snake_case: words joined with `_`.
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// kebab-case: words joined with `-`.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// PascalCase: each word capitalized, no separator.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Upper-case the first character, keep the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Split a string into lower-cased words.
///
/// Boundaries: `_`, `-`, whitespace and other punctuation; a lower→upper
/// transition (`myApp`); the end of an acronym (`HTTPServer` → `http`,
/// `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_project_names() {
        assert_eq!(slugify("Funky Grogu"), "funky_grogu");
        assert_eq!(slugify("ESTA Python"), "esta_python");
        assert_eq!(slugify("  my--app (beta)! "), "my_app_beta");
        assert_eq!(slugify("already_slugged"), "already_slugged");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_deterministic() {
        assert_eq!(slugify("Funky Grogu"), slugify("Funky Grogu"));
    }

    #[test]
    fn case_variants() {
        assert_eq!(to_snake_case("My Awesome App"), "my_awesome_app");
        assert_eq!(to_kebab_case("ESTA Python"), "esta-python");
        assert_eq!(to_kebab_case("HTTPServer"), "http-server");
        assert_eq!(to_pascal_case("my-awesome app"), "MyAwesomeApp");
        assert_eq!(to_snake_case("myApp"), "my_app");
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("grogu"), "Grogu");
        assert_eq!(capitalize(""), "");
    }
}
