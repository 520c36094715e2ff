// HTML page rendering
use crate::domain::chart::ChartDescription;
use crate::domain::dashboard::DashboardPage;
use uuid::Uuid;

pub const RADIO_ID: &str = "region-radio";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Render the dashboard page for `session` with `initial` pre-drawn and
/// `selected` checked
pub fn render_page(
    page: &DashboardPage,
    session: Uuid,
    selected: &str,
    initial: &ChartDescription,
) -> String {
    // `</` is escaped so the payload cannot close the script tag
    let initial_json = serde_json::to_string(initial)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>{css}</style>
</head>
<body data-session="{session}">
    <div class="dashboard">
        <h1>{header}</h1>
        <div class="description">{description}</div>
        {radio}
        <div id="{chart_id}" class="chart"></div>
    </div>
    <script id="initial-chart" type="application/json">{initial}</script>
    <script>{js}</script>
</body>
</html>"#,
        title = escape_html(&page.header),
        plotly = PLOTLY_CDN,
        session = session,
        css = inline_css(),
        header = escape_html(&page.header),
        description = escape_html(&page.description),
        radio = render_radio(&page.options, selected),
        chart_id = page.chart_element_id(),
        initial = initial_json,
        js = inline_javascript(page.chart_element_id()),
    )
}

fn render_radio(options: &[String], selected: &str) -> String {
    let items: String = options
        .iter()
        .map(|option| {
            let value = escape_html(option);
            format!(
                r#"<label class="radio-item"><input type="radio" name="region" value="{value}"{checked}> {label}</label>"#,
                checked = if option == selected { " checked" } else { "" },
                label = capitalize(&value),
            )
        })
        .collect();

    format!(r#"<div id="{RADIO_ID}" class="radio-group">{items}</div>"#)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn inline_css() -> &'static str {
    r#"
body { font-family: Arial, sans-serif; padding: 20px; margin: 0; }
h1 { text-align: center; color: #333; margin-bottom: 20px; }
.description { text-align: center; color: #666; margin-bottom: 30px; }
.radio-group { display: flex; justify-content: center; gap: 16px; margin-bottom: 20px; }
.radio-item { cursor: pointer; color: #333; }
.chart { min-height: 520px; }
"#
}

fn inline_javascript(chart_id: &str) -> String {
    format!(
        r#"
const CHART_ID = "{chart_id}";
const RADIOS = '#{radio_id} input[name="region"]';
const API = "/api/sessions/" + document.body.dataset.session;

function toFigure(chart) {{
    const is3d = chart.kind === "line3d";
    const traces = chart.series.map(s => is3d ? {{
        type: "scatter3d", mode: "lines", name: s.region,
        x: s.points.map(p => p.date),
        y: s.points.map(() => s.lane),
        z: s.points.map(p => p.amount),
        line: {{ color: s.color, width: 4 }}
    }} : {{
        type: "scatter", mode: "lines", name: s.region,
        x: s.points.map(p => p.date),
        y: s.points.map(p => p.amount),
        line: {{ color: s.color }}
    }});
    const layout = {{
        title: {{ text: chart.title, x: chart.layout.title_x, font: {{ size: chart.layout.title_font_size }} }},
        plot_bgcolor: chart.layout.plot_background,
        paper_bgcolor: chart.layout.paper_background,
        font: {{ family: chart.layout.font_family, color: chart.layout.font_color }},
        hovermode: chart.layout.hover_mode,
        legend: {{ title: {{ text: chart.axis.legend }} }},
        xaxis: {{ title: {{ text: chart.axis.x }} }},
        yaxis: {{ title: {{ text: chart.axis.y }} }},
        shapes: []
    }};
    if (chart.marker) {{
        const m = chart.marker;
        if (is3d) {{
            traces.push({{
                type: "scatter3d", mode: "lines", name: "Price increase", showlegend: false,
                x: [m.date, m.date], y: [0, 0], z: [m.low, m.high],
                line: {{ color: m.color, width: m.width, dash: m.dash }}
            }});
        }} else {{
            layout.shapes.push({{
                type: "line", xref: "x", yref: "paper", x0: m.date, x1: m.date, y0: 0, y1: 1,
                line: {{ color: m.color, width: m.width, dash: m.dash }}
            }});
        }}
    }}
    if (is3d) {{
        layout.scene = {{
            xaxis: {{ title: {{ text: chart.axis.x }} }},
            yaxis: {{ title: {{ text: chart.axis.legend }} }},
            zaxis: {{ title: {{ text: chart.axis.y }} }}
        }};
    }}
    return {{ data: traces, layout: layout }};
}}

function draw(chart) {{
    const figure = toFigure(chart);
    Plotly.react(CHART_ID, figure.data, figure.layout);
}}

function syncRadio(selector) {{
    document.querySelectorAll(RADIOS).forEach(input => {{
        input.checked = input.value === selector;
    }});
}}

async function follow() {{
    const response = await fetch(API + "/chart/stream");
    if (!response.ok) {{
        location.reload();
        return;
    }}
    const reader = response.body.getReader();
    const decoder = new TextDecoder();
    let buffered = "";
    for (;;) {{
        const {{ value, done }} = await reader.read();
        if (done) break;
        buffered += decoder.decode(value, {{ stream: true }});
        let newline;
        while ((newline = buffered.indexOf("\n")) >= 0) {{
            const line = buffered.slice(0, newline);
            buffered = buffered.slice(newline + 1);
            if (!line.trim()) continue;
            const displayed = JSON.parse(line);
            syncRadio(displayed.selector);
            draw(displayed.chart);
        }}
    }}
}}

document.querySelectorAll(RADIOS).forEach(input => {{
    input.addEventListener("change", async () => {{
        const response = await fetch(API + "/selector", {{
            method: "POST",
            headers: {{ "Content-Type": "application/json" }},
            body: JSON.stringify({{ region: input.value }})
        }});
        if (response.status === 404) location.reload();
    }});
}});

const initial = JSON.parse(document.getElementById("initial-chart").textContent);
if (initial) draw(initial);
follow().catch(err => console.error("chart stream closed", err));
"#,
        chart_id = chart_id,
        radio_id = RADIO_ID,
    )
}
