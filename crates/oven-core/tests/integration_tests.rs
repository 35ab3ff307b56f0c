//! Integration tests for oven-core's public API.

use oven_core::domain::{TemplateText, text};
use oven_core::prelude::*;

fn python_service_defaults() -> DefaultContext {
    let text = |s: &str| DefaultValue::Text(s.to_string());
    DefaultContext::new("cookiecutter.json")
        .with_variable(Variable::new("project_name", text("ESTA Python")))
        .with_variable(Variable::new("name", text("{{ context.project_name | kebab }}")))
        .with_variable(Variable::new(
            "package_name",
            text("{{ context.project_name | slugify }}"),
        ))
        .with_variable(Variable::new("author_name", text("your-last-name your-first-name")))
        .with_variable(Variable::new("author_email", text("your-email@sbb.ch")))
        .with_variable(Variable::new("bitbucket_organization", text("KD_ESTA_BLUEPRINTS")))
        .with_variable(Variable::new(
            "python_version",
            DefaultValue::Choice(vec!["3.11".into(), "3.10".into(), "3.9".into()]),
        ))
        .with_variable(Variable::new("docker_repository", text("")))
        .with_variable(Variable::new("pypi_repository", text("")))
}

const PIPELINE: &str = "\
productName: {{ context.name }}
{%- if context.docker_repository %}
docker:
  artifactoryDockerRepo: {{ context.docker_repository }}
{%- endif %}
{%- if context.pypi_repository %}
python:
  targetRepo: {{ context.pypi_repository }}
{%- else %}
python: {}
{%- endif %}
";

#[test]
fn resolves_and_renders_pipeline_without_docker() {
    let ctx = ContextResolver::resolve(&python_service_defaults(), &Overrides::new()).unwrap();
    let out = text::render_str(PIPELINE, &ctx).unwrap();
    assert_eq!(out, "productName: esta-python\npython: {}\n");
}

#[test]
fn resolves_and_renders_pipeline_with_everything() {
    let overrides = Overrides::new()
        .with("docker_repository", "esta.docker")
        .with("pypi_repository", "esta.pypi");
    let ctx = ContextResolver::resolve(&python_service_defaults(), &overrides).unwrap();
    let out = text::render_str(PIPELINE, &ctx).unwrap();
    assert_eq!(
        out,
        "productName: esta-python\ndocker:\n  artifactoryDockerRepo: esta.docker\npython:\n  targetRepo: esta.pypi\n"
    );
}

#[test]
fn one_parse_many_renders() {
    let parsed = TemplateText::parse("sbb-{{ context.name }}").unwrap();
    for (project, expected) in [("Funky Grogu", "sbb-funky-grogu"), ("ESTA Python", "sbb-esta-python")] {
        let ctx = ContextResolver::resolve(
            &python_service_defaults(),
            &Overrides::new().with("project_name", project),
        )
        .unwrap();
        assert_eq!(parsed.render(&ctx).unwrap(), expected);
    }
}

#[test]
fn context_serializes_in_declaration_order() {
    let ctx = ContextResolver::resolve(&python_service_defaults(), &Overrides::new()).unwrap();
    let keys: Vec<_> = ctx.keys().collect();
    assert_eq!(keys.first(), Some(&"project_name"));
    assert_eq!(keys.last(), Some(&"pypi_repository"));
    assert_eq!(keys.len(), 9);
}

#[test]
fn errors_carry_suggestions() {
    let err: OvenError = ContextResolver::resolve(
        &python_service_defaults(),
        &Overrides::new().with("nope", "x"),
    )
    .unwrap_err()
    .into();
    assert!(err.to_string().contains("Unknown context key 'nope'"));
    assert!(err.suggestions().iter().any(|s| s.contains("oven inspect")));
}
