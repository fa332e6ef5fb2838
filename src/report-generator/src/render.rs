//! HTML building blocks: escaping, tables and the page shell.

use std::fmt::Write;

const STYLE: &str = r#"<style>
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        padding: 20px;
        min-height: 100vh;
    }
    .container {
        max-width: 1200px;
        margin: 0 auto;
        background: white;
        border-radius: 15px;
        box-shadow: 0 10px 40px rgba(0,0,0,0.2);
        overflow: hidden;
    }
    .header { background: #37003c; color: white; padding: 40px; text-align: center; }
    .header h1 { font-size: 2.5em; margin-bottom: 10px; }
    .header p { color: #00ff87; font-size: 1.1em; }
    .nav { background: #f8f9fa; padding: 20px; border-bottom: 3px solid #37003c; }
    .nav a {
        display: inline-block;
        margin: 5px 10px;
        padding: 10px 20px;
        background: #37003c;
        color: white;
        text-decoration: none;
        border-radius: 5px;
    }
    .nav a.active, .nav a:hover { background: #5c0061; }
    .content { padding: 40px; }
    .section {
        background: #f8f9fa;
        padding: 25px;
        margin: 20px 0;
        border-radius: 10px;
        border-left: 5px solid #37003c;
        overflow-x: auto;
    }
    .section h2 { color: #37003c; margin-bottom: 20px; font-size: 1.8em; }
    .section p { margin-bottom: 10px; }
    .section ul { line-height: 2; padding-left: 20px; }
    table { width: 100%; border-collapse: collapse; margin: 15px 0; background: white; }
    th { background: #37003c; color: white; padding: 12px; text-align: left; }
    td { padding: 10px 12px; border-bottom: 1px solid #e0e0e0; }
    tr:hover { background: #f5f5f5; }
    .empty { color: #999; font-style: italic; }
    .stats-grid {
        display: grid;
        grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
        gap: 20px;
        margin: 20px 0;
    }
    .stat-card {
        background: white;
        padding: 25px;
        border-radius: 10px;
        text-align: center;
        border-top: 4px solid #37003c;
    }
    .stat-card h3 { color: #37003c; margin-bottom: 10px; }
    .stat-card .value { font-size: 2.5em; font-weight: bold; color: #00c46a; }
    .footer {
        background: #f8f9fa;
        padding: 30px;
        text-align: center;
        color: #666;
        border-top: 3px solid #37003c;
    }
    .timestamp { color: #999; font-size: 0.9em; margin-top: 10px; }
</style>"#;

/// (file name, nav label)
pub const NAV: [(&str, &str); 4] = [
    ("index.html", "Dashboard"),
    ("players.html", "Players"),
    ("fixtures.html", "Fixtures"),
    ("transfers.html", "Transfers"),
];

/// Escape text for use in element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Plain-text table; every header and cell is escaped on render.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "<p class=\"empty\">No data available.</p>".to_string();
        }

        let mut html = String::from("<table>\n<tr>");
        for header in &self.headers {
            let _ = write!(html, "<th>{}</th>", escape(header));
        }
        html.push_str("</tr>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", escape(cell));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>");
        html
    }
}

/// A titled block of a page. `body` is trusted HTML.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub intro: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, intro: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            intro: intro.into(),
            body,
        }
    }

    fn render(&self) -> String {
        let mut html = String::from("<div class=\"section\">\n");
        let _ = writeln!(html, "<h2>{}</h2>", escape(&self.title));
        if !self.intro.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", escape(&self.intro));
        }
        html.push_str(&self.body);
        html.push_str("\n</div>\n");
        html
    }
}

/// One self-contained report document.
#[derive(Debug, Clone)]
pub struct Page {
    pub file_name: &'static str,
    pub title: String,
    pub tagline: String,
    pub sections: Vec<Section>,
}

impl Page {
    pub fn render(&self, generated_at: &str) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
             <meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>{title}</title>\n{STYLE}\n</head>\n<body>\n<div class=\"container\">\n\
             <div class=\"header\">\n<h1>{title}</h1>\n<p>{tagline}</p>\n</div>\n",
            title = escape(&self.title),
            tagline = escape(&self.tagline),
        );

        html.push_str("<div class=\"nav\">\n");
        for (file, label) in NAV {
            let class = if file == self.file_name { " class=\"active\"" } else { "" };
            let _ = writeln!(html, "<a href=\"{}\"{}>{}</a>", file, class, escape(label));
        }
        html.push_str("</div>\n<div class=\"content\">\n");

        for section in &self.sections {
            html.push_str(&section.render());
        }

        let _ = write!(
            html,
            "</div>\n<div class=\"footer\">\n<p><strong>FPL Analysis</strong></p>\n\
             <p class=\"timestamp\">Generated: {}</p>\n</div>\n</div>\n</body>\n</html>\n",
            escape(generated_at)
        );
        html
    }
}

/// Dashboard counter card.
pub fn stat_card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"stat-card\"><h3>{}</h3><div class=\"value\">{}</div></div>",
        escape(label),
        escape(value)
    )
}

/// `<ul>` of `label: value` items, both escaped.
pub fn definition_list(items: &[(&str, String)]) -> String {
    let mut html = String::from("<ul>\n");
    for (label, value) in items {
        let _ = writeln!(
            html,
            "<li><strong>{}:</strong> {}</li>",
            escape(label),
            escape(value)
        );
    }
    html.push_str("</ul>");
    html
}
