//! Interactive charts: traces are built with plotly, then the figure JSON is
//! completed (polar axis, 3D scene, animation frames) and swapped into
//! plotly's own page, which embeds plotly.js so the file works offline.

use std::path::Path;

use plotly::common::{ColorScale, ColorScalePalette, Font, Line, Marker, Mode, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter, Scatter3D, ScatterPolar};
use serde_json::{Value as JsonValue, json};

use crate::error::RenderError;
use crate::result_table::ResultTable;
use crate::season_stats::{SEASON_COLUMN, SEASON_INDEX_COLUMN};
use crate::team_profile::{TEAM_COLUMN, TEAM_METRICS};

pub const TEAM_RADAR: &str = "team_radar";
pub const GOALS_ANIMATION: &str = "goals_animation";
pub const GOALS_SHOTS_3D: &str = "goals_shots_3d";

/// Series of the animated trend chart: column, legend name, color.
pub const TREND_SERIES: [(&str, &str, &str); 3] = [
    ("avg_goals", "Total", "#636efa"),
    ("avg_home_goals", "Home", "#ef553b"),
    ("avg_away_goals", "Away", "#00cc96"),
];

pub const TREND_Y_RANGE: [f64; 2] = [0.0, 4.0];

const FRAME_MS: u64 = 500;
const TRANSITION_MS: u64 = 300;

pub fn render_team_radar(table: &ResultTable, path: &Path) -> Result<(), RenderError> {
    let (plot, figure) = team_radar_chart(table)?;
    write_html_document(TEAM_RADAR, "Top 5 Teams: Performance Comparison", plot, &figure, path)
}

pub fn render_goals_animation(table: &ResultTable, path: &Path) -> Result<(), RenderError> {
    let (plot, figure) = goals_animation_chart(table)?;
    write_html_document(GOALS_ANIMATION, "Goal Trend by Season", plot, &figure, path)
}

pub fn render_goals_shots_3d(table: &ResultTable, path: &Path) -> Result<(), RenderError> {
    let (plot, figure) = goals_shots_3d_chart(table)?;
    write_html_document(GOALS_SHOTS_3D, "Goals and Shots Trend by Season", plot, &figure, path)
}

/// One filled polar trace per team over the six normalized metrics.
pub fn team_radar_figure(table: &ResultTable) -> Result<JsonValue, RenderError> {
    team_radar_chart(table).map(|(_, figure)| figure)
}

fn team_radar_chart(table: &ResultTable) -> Result<(Plot, JsonValue), RenderError> {
    let column_err = |source| RenderError::Column {
        chart: TEAM_RADAR,
        source,
    };
    let teams = table.text_column(TEAM_COLUMN).map_err(column_err)?;
    let mut metrics = Vec::with_capacity(TEAM_METRICS.len());
    for metric in &TEAM_METRICS {
        metrics.push(table.f64_column(metric.column).map_err(column_err)?);
    }
    if teams.is_empty() {
        return Err(RenderError::Empty { chart: TEAM_RADAR });
    }

    // Repeat the first axis so each outline closes.
    let mut theta = TEAM_METRICS.iter().map(|m| m.label).collect::<Vec<_>>();
    theta.push(TEAM_METRICS[0].label);

    let mut plot = Plot::new();
    for (row, team) in teams.iter().enumerate() {
        let mut r = metrics.iter().map(|column| column[row]).collect::<Vec<_>>();
        r.push(r[0]);
        plot.add_trace(ScatterPolar::new(theta.clone(), r).name(team));
    }
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Top 5 Teams: Performance Comparison"))
            .show_legend(true)
            .font(Font::new().size(12)),
    );

    let mut figure = plot_figure(TEAM_RADAR, &plot)?;
    for trace in traces_mut(&mut figure) {
        trace["fill"] = json!("toself");
    }
    figure["layout"]["polar"] = json!({
        "radialaxis": { "visible": true, "range": [0, 1] }
    });
    Ok((plot, figure))
}

/// Three goal-average lines revealed one season per frame over a fixed
/// season axis and a fixed y range.
pub fn goals_animation_figure(table: &ResultTable) -> Result<JsonValue, RenderError> {
    goals_animation_chart(table).map(|(_, figure)| figure)
}

fn goals_animation_chart(table: &ResultTable) -> Result<(Plot, JsonValue), RenderError> {
    let column_err = |source| RenderError::Column {
        chart: GOALS_ANIMATION,
        source,
    };
    let seasons = table.text_column(SEASON_COLUMN).map_err(column_err)?;
    let mut series = Vec::with_capacity(TREND_SERIES.len());
    for (column, _, _) in &TREND_SERIES {
        series.push(table.f64_column(column).map_err(column_err)?);
    }
    if seasons.is_empty() {
        return Err(RenderError::Empty {
            chart: GOALS_ANIMATION,
        });
    }

    let mut plot = Plot::new();
    for ((_, label, color), values) in TREND_SERIES.iter().zip(&series) {
        plot.add_trace(
            Scatter::new(seasons[..1].to_vec(), values[..1].to_vec())
                .mode(Mode::LinesMarkers)
                .name(label)
                .line(Line::new().color(*color).width(3.0)),
        );
    }
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Goal Trend by Season"))
            .x_axis(Axis::new().title(Title::with_text("Season")))
            .y_axis(
                Axis::new()
                    .title(Title::with_text("Average goals"))
                    .range(TREND_Y_RANGE.to_vec()),
            ),
    );

    let mut figure = plot_figure(GOALS_ANIMATION, &plot)?;
    let layout = &mut figure["layout"];
    layout["xaxis"]["type"] = json!("category");
    layout["xaxis"]["categoryorder"] = json!("array");
    layout["xaxis"]["categoryarray"] = json!(seasons);
    layout["xaxis"]["range"] = json!([-0.5, seasons.len() as f64 - 0.5]);
    layout["legend"] = json!({ "title": { "text": "Goal type" } });
    layout["updatemenus"] = json!([play_pause_buttons()]);
    layout["sliders"] = json!([season_slider(&seasons)]);

    figure["frames"] = JsonValue::Array(
        (0..seasons.len())
            .map(|k| {
                let data = series
                    .iter()
                    .map(|values| json!({ "x": seasons[..=k], "y": values[..=k] }))
                    .collect::<Vec<_>>();
                json!({
                    "name": seasons[k],
                    "data": data,
                    "traces": (0..TREND_SERIES.len()).collect::<Vec<_>>(),
                })
            })
            .collect(),
    );
    Ok((plot, figure))
}

/// Season path through (avg goals, avg shots, season index) space: one line
/// trace and one marker trace colored by season index.
pub fn goals_shots_3d_figure(table: &ResultTable) -> Result<JsonValue, RenderError> {
    goals_shots_3d_chart(table).map(|(_, figure)| figure)
}

fn goals_shots_3d_chart(table: &ResultTable) -> Result<(Plot, JsonValue), RenderError> {
    let column_err = |source| RenderError::Column {
        chart: GOALS_SHOTS_3D,
        source,
    };
    let seasons = table.text_column(SEASON_COLUMN).map_err(column_err)?;
    let goals = table.f64_column("avg_goals").map_err(column_err)?;
    let shots = table.f64_column("avg_shots").map_err(column_err)?;
    let index = table.f64_column(SEASON_INDEX_COLUMN).map_err(column_err)?;
    if seasons.is_empty() {
        return Err(RenderError::Empty {
            chart: GOALS_SHOTS_3D,
        });
    }

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter3D::new(goals.clone(), shots.clone(), index.clone())
            .mode(Mode::Lines)
            .name("Trend")
            .line(Line::new().color("#2ecc71").width(4.0)),
    );
    plot.add_trace(
        Scatter3D::new(goals, shots, index.clone())
            .mode(Mode::Markers)
            .name("Seasons")
            .text_array(seasons)
            .marker(
                Marker::new()
                    .size(8)
                    .color_array(index)
                    .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
                    .opacity(0.8),
            ),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Goals and Shots Trend by Season"))
            .show_legend(true)
            .width(1000)
            .height(800),
    );

    let mut figure = plot_figure(GOALS_SHOTS_3D, &plot)?;
    let layout = &mut figure["layout"];
    layout["title"] = json!({
        "text": "Goals and Shots Trend by Season",
        "font": { "size": 20 },
        "y": 0.95
    });
    layout["scene"] = json!({
        "xaxis": { "title": { "text": "Average goals" } },
        "yaxis": { "title": { "text": "Average shots" } },
        "zaxis": { "title": { "text": "Season" } },
        "camera": { "eye": { "x": 1.5, "y": 1.5, "z": 1.5 } }
    });
    Ok((plot, figure))
}

/// Renders `plot` through plotly with plotly.js embedded, then swaps the
/// finished `figure` in for the plain trace JSON. The page needs no network
/// access and reruns are byte-identical.
pub fn write_html_document(
    chart: &'static str,
    title: &str,
    mut plot: Plot,
    figure: &JsonValue,
    path: &Path,
) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        chart,
        path: path.to_path_buf(),
        source,
    };
    let finished = serde_json::to_string(figure).map_err(|err| RenderError::Draw {
        chart,
        message: format!("serialize figure: {err}"),
    })?;
    let generated = script_json(&plot.to_json());
    plot.use_local_plotly();
    let html = embed_figure(&plot.to_html(), &generated, &script_json(&finished), title)
        .ok_or_else(|| RenderError::Draw {
            chart,
            message: "plotly page does not contain the figure json".to_string(),
        })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, html).map_err(io_err)
}

/// JSON as plotly's page template writes it inside a `<script>` block.
fn script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '&' => out.push_str("\\u0026"),
            '\'' => out.push_str("\\u0027"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            _ => out.push(ch),
        }
    }
    out
}

fn embed_figure(page: &str, generated: &str, finished: &str, title: &str) -> Option<String> {
    if !page.contains(generated) {
        return None;
    }
    let page = strip_remote_scripts(&page.replacen(generated, finished, 1));
    let title = title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    Some(page.replacen("<head>", &format!("<head>\n    <title>{title}</title>"), 1))
}

// plotly's template always pulls MathJax from a CDN; the charts use no TeX.
// Only empty `<script src="http..."></script>` tags are removed.
fn strip_remote_scripts(page: &str) -> String {
    const OPEN: &str = "<script src=\"http";
    const CLOSE: &str = "\"></script>";
    let mut out = String::with_capacity(page.len());
    let mut rest = page;
    while let Some(start) = rest.find(OPEN) {
        let tail = &rest[start..];
        let url_end = tail[OPEN.len()..].find('"').map(|i| OPEN.len() + i);
        match url_end {
            Some(end) if tail[end..].starts_with(CLOSE) => {
                out.push_str(&rest[..start]);
                rest = &tail[end + CLOSE.len()..];
            }
            _ => {
                out.push_str(&rest[..start + OPEN.len()]);
                rest = &tail[OPEN.len()..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn plot_figure(chart: &'static str, plot: &Plot) -> Result<JsonValue, RenderError> {
    let figure: JsonValue = serde_json::from_str(&plot.to_json()).map_err(|err| RenderError::Draw {
        chart,
        message: format!("plotly figure json: {err}"),
    })?;
    if !figure["data"].is_array() {
        return Err(RenderError::Draw {
            chart,
            message: "plotly figure json has no data array".to_string(),
        });
    }
    let mut figure = figure;
    if !figure["layout"].is_object() {
        figure["layout"] = json!({});
    }
    Ok(figure)
}

fn traces_mut(figure: &mut JsonValue) -> impl Iterator<Item = &mut JsonValue> {
    figure["data"]
        .as_array_mut()
        .into_iter()
        .flat_map(|traces| traces.iter_mut())
}

fn play_pause_buttons() -> JsonValue {
    json!({
        "type": "buttons",
        "direction": "left",
        "showactive": false,
        "x": 0.1,
        "y": 0,
        "xanchor": "right",
        "yanchor": "top",
        "pad": { "t": 70, "r": 10 },
        "buttons": [
            {
                "label": "Play",
                "method": "animate",
                "args": [null, {
                    "frame": { "duration": FRAME_MS, "redraw": false },
                    "fromcurrent": true,
                    "transition": { "duration": TRANSITION_MS, "easing": "linear" }
                }]
            },
            {
                "label": "Pause",
                "method": "animate",
                "args": [[null], {
                    "frame": { "duration": 0, "redraw": false },
                    "mode": "immediate",
                    "transition": { "duration": 0 }
                }]
            }
        ]
    })
}

fn season_slider(seasons: &[String]) -> JsonValue {
    let steps = seasons
        .iter()
        .map(|season| {
            json!({
                "label": season,
                "method": "animate",
                "args": [[season], {
                    "frame": { "duration": 0, "redraw": false },
                    "mode": "immediate",
                    "transition": { "duration": 0 }
                }]
            })
        })
        .collect::<Vec<_>>();
    json!({
        "active": 0,
        "x": 0.1,
        "len": 0.9,
        "xanchor": "left",
        "y": 0,
        "yanchor": "top",
        "pad": { "t": 50, "b": 10 },
        "currentvalue": { "prefix": "Season: ", "visible": true },
        "steps": steps
    })
}
