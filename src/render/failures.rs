//! HTML report of the most confident failures
//!
//! Produces a standalone page with one section per language, one subsection
//! per failure kind and one card per failed row. All text is escaped.

use super::escape;
use crate::failures::{FailureRecord, FailureReport, LanguageFailures};
use crate::models::title_case;
use chrono::Local;

/// Card heading, e.g. `Failed with conf: 0.97. True: NON-TOXIC. Pred:TOXIC`
pub fn card_title(record: &FailureRecord) -> String {
    format!(
        "Failed with conf: {:.2}. True: {}. Pred:{}",
        record.confidence, record.true_label, record.pred_label
    )
}

/// Render `report` as a standalone HTML document
pub fn render_html(report: &FailureReport) -> String {
    let mut html = String::new();

    html.push_str(&render_head());
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(report));

    for (lang, failures) in report {
        html.push_str(&render_language(lang, failures));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_head() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Top Failures by Language</title>
    <style>
{CSS}
    </style>
</head>
"#
    )
}

fn render_header(report: &FailureReport) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let total: usize = report.values().map(LanguageFailures::total).sum();
    format!(
        r#"<div class="header">
    <h1>Top Failures by Language</h1>
    <p class="timestamp">Generated {} &middot; {} failures across {} languages</p>
</div>
"#,
        timestamp,
        total,
        report.len()
    )
}

fn render_language(lang: &str, failures: &LanguageFailures) -> String {
    let mut html = format!(
        "<div class=\"language-section\">\n<h2 class=\"section-title\">{}</h2>\n",
        escape(&title_case(lang))
    );

    for (kind, records) in failures.categories() {
        html.push_str(&format!(
            "<div class=\"label-section\">\n<h3 class=\"section-title\">{}</h3>\n",
            escape(&kind.title())
        ));
        if records.is_empty() {
            html.push_str("<p class=\"empty\">No failures</p>\n");
        }
        for record in records {
            html.push_str(&format!(
                r#"<div class="material-card">
    <div class="card-title">{}</div>
    <div class="card-content">{}</div>
</div>
"#,
                escape(&card_title(record)),
                escape(&record.text)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

const CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background-color: #f5f5f5;
    color: #333;
    margin: 0;
}

.container {
    max-width: 960px;
    margin: 0 auto;
    padding: 24px;
}

.header h1 {
    margin-bottom: 4px;
}

.timestamp {
    color: #777;
    font-size: 14px;
    margin-top: 0;
}

.material-card {
    box-shadow: 0 4px 8px 0 rgba(0,0,0,0.2);
    transition: 0.3s;
    border-radius: 10px;
    padding: 15px;
    margin-bottom: 20px;
    background-color: #fff;
}

.material-card:hover {
    box-shadow: 0 8px 16px 0 rgba(0,0,0,0.2);
}

.card-title {
    color: #06c2c2;
    font-size: 18px;
    margin-bottom: 10px;
    font-weight: bold;
}

.card-content {
    color: #333;
    white-space: pre-wrap;
    word-break: break-word;
}

.language-section {
    margin-bottom: 30px;
}

.label-section {
    margin-bottom: 20px;
}

.section-title {
    color: #333;
    font-size: 22px;
    margin-bottom: 15px;
    font-weight: bold;
}

.empty {
    color: #999;
    font-style: italic;
}
"#;
