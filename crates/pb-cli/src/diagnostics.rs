//! Diagnostics: schema JSON → printable lint report.

use std::fmt;

use pb_core::lint::{LintDiagnostic, LintSeverity, lint_schema};
use pb_core::PageSchema;

/// How bad a report line is. Only `Error` fails `pb lint` without
/// `--strict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl From<LintSeverity> for Level {
    fn from(severity: LintSeverity) -> Self {
        match severity {
            LintSeverity::Warning => Level::Warning,
            LintSeverity::Info => Level::Info,
        }
    }
}

/// One report line with its level kept alongside the rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One report line per finding, `source:line:col` for parse failures and
/// `source: severity[rule] node: message` for lint findings.
pub fn compute_diagnostics(source_name: &str, text: &str) -> Vec<Diagnostic> {
    match PageSchema::from_json(text) {
        Ok(schema) => {
            let mut lines: Vec<Diagnostic> = match schema.validate() {
                Ok(()) => Vec::new(),
                Err(err) => vec![Diagnostic {
                    level: Level::Error,
                    text: format!("{source_name}: error[invalid-schema] {err}"),
                }],
            };
            lines.extend(lint_schema(&schema).iter().map(|d| Diagnostic {
                level: d.severity.into(),
                text: format_diagnostic(source_name, d),
            }));
            lines
        }
        Err(err) => vec![Diagnostic {
            level: Level::Error,
            text: format!("{source_name}:{}:{}: error[parse] {err}", err.line(), err.column()),
        }],
    }
}

pub fn format_diagnostic(source_name: &str, diagnostic: &LintDiagnostic) -> String {
    format!(
        "{source_name}: {}[{}] {}: {}",
        diagnostic.severity.as_str(),
        diagnostic.rule,
        diagnostic.node_id,
        diagnostic.message
    )
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == Level::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_schema_has_no_diagnostics() {
        let text = r#"{"nodes":[{"id":"s","position":{"x":0,"y":0},"data":{"type":"section","label":"S"}}],
                       "edges":[{"id":"e","source":"s","target":"preview"}]}"#;
        assert!(compute_diagnostics("page.json", text).is_empty());
    }

    #[test]
    fn parse_error_has_position() {
        let lines = compute_diagnostics("page.json", "{\n  \"nodes\": [,]\n}");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.starts_with("page.json:2:"));
        assert_eq!(lines[0].level, Level::Error);
        assert!(has_errors(&lines));
    }

    #[test]
    fn lint_findings_are_not_errors() {
        let text = r#"{"nodes":[{"id":"s","position":{"x":0,"y":0},"data":{"type":"section","label":"S"}}],"edges":[]}"#;
        let lines = compute_diagnostics("-", text);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].to_string().starts_with("-: warning[missing-preview] preview: "));
        assert!(!has_errors(&lines));
    }

    #[test]
    fn error_lookalike_ids_stay_lint_findings() {
        let text = r#"{"nodes":[{"id":"x: error[boom]","position":{"x":0,"y":0},
                         "data":{"type":"carousel","label":"C"}}],
                       "edges":[{"id":"e","source":"x: error[boom]","target":"preview"}]}"#;
        let lines = compute_diagnostics("page.json", text);
        assert!(lines.iter().any(|d| d.text.contains(": error[boom]")));
        assert!(lines.iter().all(|d| d.level == Level::Info));
        assert!(!has_errors(&lines));
    }

    #[test]
    fn invalid_schema_is_an_error() {
        let lines = compute_diagnostics("x.json", r#"{"nodes":[],"edges":[]}"#);
        assert_eq!(lines[0].text, "x.json: error[invalid-schema] schema has no nodes");
        assert!(has_errors(&lines));
    }
}
