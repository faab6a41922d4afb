//! 이상 징후 리포트 -- JSON / HTML
//!
//! `report_file`을 기본 경로로 삼아 형식별 확장자(`.json`, `.html`)를
//! 붙여 기록합니다. 이미 해당 확장자로 끝나면 그대로 사용합니다.
//! 이상 징후가 없으면 파일을 만들지 않고 성공으로 처리합니다.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use logiq_core::config::OutputConfig;
use logiq_core::error::LogiqError;
use logiq_core::pipeline::ReportSink;
use logiq_core::types::Anomaly;

use crate::error::SinkError;

/// JSON/HTML 리포트 생성기
#[derive(Debug, Clone)]
pub struct HtmlJsonReporter {
    report_file: PathBuf,
    json: bool,
    html: bool,
}

impl HtmlJsonReporter {
    /// 기본 경로와 형식 목록으로 생성합니다.
    ///
    /// `all`은 json과 html을 모두 의미하며, 알 수 없는 형식은 무시됩니다.
    pub fn new(report_file: impl Into<PathBuf>, formats: &[String]) -> Self {
        let has = |name: &str| formats.iter().any(|f| f == name || f == "all");
        Self {
            report_file: report_file.into(),
            json: has("json"),
            html: has("html"),
        }
    }

    /// 출력 설정에서 생성합니다.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.report_file, &output.formats())
    }

    /// JSON 리포트 경로
    pub fn json_path(&self) -> PathBuf {
        with_extension(&self.report_file, "json")
    }

    /// HTML 리포트 경로
    pub fn html_path(&self) -> PathBuf {
        with_extension(&self.report_file, "html")
    }

    fn write_json(&self, anomalies: &[Anomaly]) -> Result<PathBuf, SinkError> {
        let path = self.json_path();
        let json = serde_json::to_vec_pretty(anomalies)
            .map_err(|e| SinkError::Report(format!("failed to encode json report: {e}")))?;
        std::fs::write(&path, json).map_err(|e| {
            SinkError::Report(format!("failed to write {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), anomalies = anomalies.len(), "json report saved");
        Ok(path)
    }

    fn write_html(&self, anomalies: &[Anomaly]) -> Result<PathBuf, SinkError> {
        let path = self.html_path();
        std::fs::write(&path, render_html(anomalies)).map_err(|e| {
            SinkError::Report(format!("failed to write {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), anomalies = anomalies.len(), "html report saved");
        Ok(path)
    }

    fn write(&self, anomalies: &[Anomaly]) -> Result<Vec<PathBuf>, SinkError> {
        if anomalies.is_empty() {
            info!("no anomalies found, skipping report");
            return Ok(Vec::new());
        }

        if let Some(dir) = self.report_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                SinkError::Report(format!("failed to create report directory: {e}"))
            })?;
        }

        let mut written = Vec::new();
        if self.json {
            written.push(self.write_json(anomalies)?);
        }
        if self.html {
            written.push(self.write_html(anomalies)?);
        }
        Ok(written)
    }
}

impl ReportSink for HtmlJsonReporter {
    fn render(&self, anomalies: &[Anomaly]) -> Result<Vec<PathBuf>, LogiqError> {
        Ok(self.write(anomalies)?)
    }
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    if base.extension().is_some_and(|e| e == ext) {
        return base.to_path_buf();
    }
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// HTML 특수문자 이스케이프
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>logiq report</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 20px; }
    h1 { color: #333; }
    table { border-collapse: collapse; width: 100%; margin-top: 20px; }
    th, td { border: 1px solid #ddd; padding: 8px; vertical-align: top; }
    th { background-color: #f4f4f4; }
    tr:nth-child(even) { background-color: #f9f9f9; }
    .info { color: gray; }
    .low { color: green; }
    .medium { color: orange; }
    .high { color: red; font-weight: bold; }
    .critical { color: darkred; font-weight: bold; text-decoration: underline; }
  </style>
</head>
<body>
"#;

/// 자체 완결형 HTML 표를 렌더링합니다.
pub fn render_html(anomalies: &[Anomaly]) -> String {
    let mut html = String::from(HTML_HEAD);
    let _ = writeln!(html, "  <h1>logiq anomaly report</h1>");
    let _ = writeln!(
        html,
        "  <p>Generated at {}</p>",
        escape_html(&Local::now().to_rfc2822())
    );
    html.push_str(
        "  <table>\n    <tr><th>Pattern</th><th>Count</th><th>Severity</th><th>Spike</th>\
         <th>Files</th><th>Sample Lines</th><th>Detected At</th></tr>\n",
    );

    for a in anomalies {
        let files: String = a
            .files
            .iter()
            .map(|(file, lines)| {
                let lines: Vec<String> = lines.iter().map(u64::to_string).collect();
                format!(
                    "<strong>{}</strong>: [{}]<br>",
                    escape_html(file),
                    lines.join(" ")
                )
            })
            .collect();

        let _ = writeln!(
            html,
            "    <tr><td>{pattern}</td><td>{count}</td><td class=\"{sev}\">{sev}</td>\
             <td>{spike}</td><td>{files}</td><td>{lines}</td><td>{at}</td></tr>",
            pattern = escape_html(&a.pattern),
            count = a.count,
            sev = a.severity.as_str(),
            spike = a.spike,
            files = files,
            lines = escape_html(&a.lines.join(" | ")),
            at = a.detected_at.to_rfc3339(),
        );
    }

    html.push_str("  </table>\n</body>\n</html>\n");
    html
}
