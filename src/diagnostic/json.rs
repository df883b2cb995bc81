use serde::Serialize;

use crate::ast::SourceMap;
use super::Diagnostic;

#[derive(Serialize)]
struct JsonLabel<'a> {
    start: usize,
    end: usize,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col: Option<usize>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: &'a str,
    labels: Vec<JsonLabel<'a>>,
    notes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

/// One-line JSON rendering for tools that consume diagnostics. Line and
/// column are only present when the diagnostic carries its source.
pub fn render(d: &Diagnostic) -> String {
    let source_map = d.source.as_deref().map(SourceMap::new);

    let labels = d.labels.iter().map(|l| {
        let pos = source_map.as_ref().map(|map| map.lookup(l.span.start));
        JsonLabel {
            start: l.span.start,
            end: l.span.end,
            message: &l.message,
            line: pos.map(|(line, _)| line),
            col: pos.map(|(_, col)| col),
        }
    }).collect();

    let out = JsonDiagnostic {
        severity: "error",
        code: d.code,
        message: &d.message,
        labels,
        notes: &d.notes,
        suggestion: d.suggestion.as_deref(),
    };

    serde_json::to_string(&out).unwrap_or_else(|_| r#"{"severity":"error","message":"internal error serializing diagnostic"}"#.to_string())
}
