//! `oven inspect`: show what a template asks for.

use tracing::instrument;

use oven_adapters::DirectoryTemplateLoader;
use oven_core::application::{TemplateInfo, TemplateService};

use crate::{
    cli::{InspectArgs, InspectFormat, OutputFormat},
    commands::locate_template,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(template = %args.template))]
pub fn execute(args: InspectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let template_dir = locate_template(&args.template, &config)?;
    let service = TemplateService::new(Box::new(DirectoryTemplateLoader::new()));
    let info = service.inspect(&template_dir)?;

    let format = if output.format() == OutputFormat::Json {
        InspectFormat::Json
    } else {
        args.format
    };

    match format {
        InspectFormat::Json => output.json(&info)?,
        InspectFormat::List => {
            for variable in &info.variables {
                output.emit(&format!("{}={}", variable.name, variable.default))?;
            }
        }
        InspectFormat::Table => {
            for line in table(&info) {
                output.emit(&line)?;
            }
        }
    }
    Ok(())
}

fn table(info: &TemplateInfo) -> Vec<String> {
    let mut lines = vec![
        format!("Template:  {}", info.name),
        format!("Manifest:  {}", info.manifest),
        format!("Project:   {}", info.root),
        format!("Files:     {}", info.files),
        String::new(),
    ];

    let name_width = info
        .variables
        .iter()
        .map(|v| v.name.len())
        .max()
        .unwrap_or(0)
        .max("VARIABLE".len());
    let kind_width = info
        .variables
        .iter()
        .map(|v| v.kind.len())
        .max()
        .unwrap_or(0)
        .max("KIND".len());

    lines.push(format!("{:<name_width$}  {:<kind_width$}  DEFAULT", "VARIABLE", "KIND"));
    for v in &info.variables {
        let marker = if v.prompted { "" } else { "  (not prompted)" };
        lines.push(format!(
            "{:<name_width$}  {:<kind_width$}  {}{marker}",
            v.name, v.kind, v.default
        ));
    }

    if !info.copy_without_render.is_empty() {
        lines.push(String::new());
        lines.push("Copied without rendering:".into());
        lines.extend(info.copy_without_render.iter().map(|p| format!("  {p}")));
    }
    if !info.include_if.is_empty() {
        lines.push(String::new());
        lines.push("Included only if:".into());
        lines.extend(
            info.include_if
                .iter()
                .map(|(pattern, condition)| format!("  {pattern}  <-  {condition}")),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use oven_core::application::VariableInfo;

    fn info() -> TemplateInfo {
        TemplateInfo {
            name: "python-service".into(),
            manifest: "cookiecutter.json".into(),
            root: "{{ context.name }}".into(),
            files: 3,
            variables: vec![
                VariableInfo {
                    name: "project_name".into(),
                    kind: "text".into(),
                    default: "ESTA Python".into(),
                    prompted: true,
                },
                VariableInfo {
                    name: "_hidden".into(),
                    kind: "text".into(),
                    default: "x".into(),
                    prompted: false,
                },
            ],
            copy_without_render: vec![],
            include_if: vec![("Dockerfile".into(), "context.docker_repository".into())],
        }
    }

    #[test]
    fn table_aligns_columns() {
        let lines = table(&info());
        let header = lines.iter().position(|l| l.starts_with("VARIABLE")).unwrap();
        assert_eq!(lines[header], "VARIABLE      KIND  DEFAULT");
        assert_eq!(lines[header + 1], "project_name  text  ESTA Python");
        assert!(lines[header + 2].ends_with("(not prompted)"));
    }

    #[test]
    fn table_shows_directives() {
        let lines = table(&info());
        assert!(lines.contains(&"  Dockerfile  <-  context.docker_repository".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Copied")));
    }
}
