use crate::format::escape_html;
use crate::util::slugify;

const STYLESHEET: &str = r#"
:root { --ink: #1f1c17; --muted: #6b6358; --paper: #f6f1e7; --card: #fffaf0; --line: #e2d8c6; --accent: #2f4a36; --warn: #b5472f; }
* { box-sizing: border-box; }
body { margin: 0; font-family: "IBM Plex Sans", "Helvetica Neue", Arial, sans-serif; background: var(--paper); color: var(--ink); }
a { color: inherit; }
header.site { display: flex; gap: 18px; align-items: baseline; padding: 18px 32px; border-bottom: 1px solid var(--line); }
header.site .brand { font-weight: 700; font-size: 18px; text-decoration: none; }
header.site nav a { margin-right: 14px; color: var(--muted); text-decoration: none; }
main { padding: 24px 32px 48px; max-width: 1280px; margin: 0 auto; }
.layout { display: grid; grid-template-columns: 220px 1fr; gap: 24px; }
.sidebar { display: flex; flex-direction: column; gap: 6px; }
.sidebar-item { display: flex; justify-content: space-between; padding: 8px 10px; border-radius: 8px; text-decoration: none; background: var(--card); border: 1px solid var(--line); }
.sidebar-item span { color: var(--muted); font-size: 12px; }
.sidebar-item.is-active { border-color: var(--accent); font-weight: 600; }
.panel { background: var(--card); border: 1px solid var(--line); border-radius: 14px; padding: 18px 20px; margin-bottom: 20px; }
.panel h2 { margin: 0 0 12px; font-size: 18px; }
.caption, .note, .chart-empty, .like-note { color: var(--muted); font-size: 13px; }
.banner { background: #fbe7c6; border: 1px solid #e3b86b; padding: 10px 14px; border-radius: 10px; margin-bottom: 16px; }
.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; margin-bottom: 20px; }
.stat { background: var(--card); border: 1px solid var(--line); border-radius: 12px; padding: 14px; }
.stat span { display: block; color: var(--muted); font-size: 12px; text-transform: uppercase; letter-spacing: 0.04em; }
.stat strong { font-size: 22px; }
.format-grid, .dataset-grid, .rec-grid, .like-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 12px; }
.format-card, .dataset-card, .rec-card, .like-card { background: #fff; border: 1px solid var(--line); border-radius: 12px; padding: 14px; }
.format-card h3 { margin: 0 0 8px; font-size: 15px; }
.dataset-card { text-decoration: none; display: block; }
.dataset-title { font-weight: 600; margin-bottom: 4px; }
.dataset-meta { color: var(--muted); font-size: 13px; }
.kv { display: flex; justify-content: space-between; gap: 8px; padding: 3px 6px; border-radius: 6px; font-size: 13px; }
.kv.is-best { background: #e1efe3; }
.kv.is-bad strong { color: var(--warn); }
.leader-item { display: grid; grid-template-columns: 160px 1fr 90px; gap: 10px; align-items: center; margin-bottom: 8px; font-size: 13px; }
.leader-bar, .mini-bar-track { background: #efe7d8; border-radius: 999px; height: 10px; overflow: hidden; }
.leader-fill, .mini-bar-fill { background: var(--accent); height: 100%; }
.stacked-bar { display: flex; height: 18px; border-radius: 999px; overflow: hidden; background: #efe7d8; }
.stacked-segment { height: 100%; }
.legend { display: flex; flex-wrap: wrap; gap: 12px; justify-content: center; margin-top: 10px; font-size: 12px; }
.legend-item { display: flex; align-items: center; gap: 6px; }
.legend-dot { width: 10px; height: 10px; border-radius: 50%; display: inline-block; }
.mini-bar-row { display: grid; grid-template-columns: 90px 1fr 60px; gap: 10px; align-items: center; margin-bottom: 6px; font-size: 13px; }
.rec-card.is-selected { border-color: var(--accent); }
.rec-label { color: var(--muted); font-size: 12px; }
.rec-value { font-weight: 600; }
.encoding-group { margin-bottom: 12px; font-size: 13px; }
.like-title { font-weight: 600; margin-bottom: 4px; }
.like-row, .like-table-row { display: flex; justify-content: space-between; font-size: 13px; }
details { margin-bottom: 10px; }
details > summary { cursor: pointer; font-weight: 600; padding: 4px 0; }
.chart-scroll { overflow-x: auto; }
.chart-scroll svg { display: block; }
.is-clipped { stroke: var(--warn); stroke-width: 2; }
.clip-marker { stroke: var(--warn); stroke-width: 2; }
.scatter3d { width: 100%; height: 520px; }
table { border-collapse: collapse; width: 100%; font-size: 13px; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--line); }
th { color: var(--muted); font-weight: 600; }
"#;

pub fn dataset_href(name: &str) -> String {
    format!("dataset_{}.html", slugify(name))
}

pub fn row_scaling_href(dataset: &str) -> String {
    format!("row_scaling_{}.html", slugify(dataset))
}

/// Complete HTML document around `body`. `nav` holds `(href, label)` links.
pub fn document(title: &str, nav: &[(String, String)], body: &str) -> String {
    let links: String = nav
        .iter()
        .map(|(href, label)| {
            format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(href),
                escape_html(label)
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLESHEET}</style>
</head>
<body>
<header class="site"><a class="brand" href="index.html">Columnar format bench</a><nav>{links}</nav></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

pub fn panel(title: &str, body: &str) -> String {
    format!(
        r#"<section class="panel"><h2>{}</h2>{body}</section>"#,
        escape_html(title)
    )
}

pub fn details(summary: &str, body: &str, open: bool) -> String {
    let open = if open { " open" } else { "" };
    format!(
        "<details{open}><summary>{}</summary>{body}</details>",
        escape_html(summary)
    )
}

pub fn stat_tile(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><span>{}</span><strong>{}</strong></div>"#,
        escape_html(label),
        escape_html(value)
    )
}

pub fn kv(label: &str, value: &str, class: &str) -> String {
    let class = if class.is_empty() {
        "kv".to_string()
    } else {
        format!("kv {class}")
    };
    format!(
        r#"<div class="{class}"><span>{}</span><strong>{}</strong></div>"#,
        escape_html(label),
        escape_html(value)
    )
}

pub fn note(text: &str) -> String {
    format!(r#"<p class="note">{}</p>"#, escape_html(text))
}

/// Plain table; every cell is escaped.
pub fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table><thead><tr>");
    for header in headers {
        out.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

pub fn legend_item(label: &str, color: &str) -> String {
    format!(
        r#"<div class="legend-item"><span class="legend-dot" style="background:{}"></span>{}</div>"#,
        escape_html(color),
        escape_html(label)
    )
}
