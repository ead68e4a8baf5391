use crate::data::AffectedBy;

pub const PAGE_HEADING: &str = "Web Application Dashboards with Dash";

/// Dropdown `<option>` list, default pre-selected.
fn dropdown_options(default: AffectedBy) -> String {
    AffectedBy::ALL
        .iter()
        .map(|a| {
            let selected = if *a == default { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, a.as_str(), selected)
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

/// The single page of the dashboard: heading, dropdown, status line, chart.
///
/// The page holds no data. It opens `/ws`, sends the current dropdown value
/// tagged with a sequence number, and draws whatever comes back. Replies for
/// superseded sequence numbers are ignored.
pub fn render_index(default: AffectedBy) -> String {
    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{heading}</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 20px; }}
        h1 {{ text-align: center; }}
        #slct_impact {{ width: 40%; padding: 6px; }}
        #output_container {{ margin-top: 12px; }}
    </style>
</head>
<body>
    <h1>{heading}</h1>
    <select id="slct_impact">
            {options}
    </select>
    <div id="output_container"></div>
    <br>
    <div id="my_bee_map"></div>
    <script>
        const select = document.getElementById("slct_impact");
        const status = document.getElementById("output_container");
        let seq = 0;
        let latest = 0;
        let ws = null;

        function draw(msg) {{
            if (msg.seq < latest) {{ return; }}
            latest = msg.seq;
            status.textContent = msg.status;
            Plotly.react("my_bee_map", msg.figure.data, msg.figure.layout);
        }}

        function request() {{
            seq += 1;
            const payload = {{ seq: seq, value: select.value }};
            if (ws && ws.readyState === WebSocket.OPEN) {{
                ws.send(JSON.stringify(payload));
            }} else {{
                fetch("/api/update?slct_impact=" + encodeURIComponent(payload.value))
                    .then(r => r.json())
                    .then(body => draw({{ seq: payload.seq, status: body.status, figure: body.figure }}));
            }}
        }}

        function connect() {{
            const proto = location.protocol === "https:" ? "wss://" : "ws://";
            let opened = false;
            ws = new WebSocket(proto + location.host + "/ws");
            ws.onopen = () => {{ opened = true; request(); }};
            ws.onmessage = ev => draw(JSON.parse(ev.data));
            ws.onclose = () => {{
                ws = null;
                // upgrade refused: fall back to /api/update for the first render
                if (!opened) {{ request(); }}
            }};
        }}

        select.addEventListener("change", request);
        if ("WebSocket" in window) {{ connect(); }} else {{ request(); }}
    </script>
</body>
</html>
"####,
        heading = PAGE_HEADING,
        options = dropdown_options(default),
    )
}
