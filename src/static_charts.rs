//! PNG charts drawn with plotters: line charts with a filled area, the stacked
//! goal-distribution bars and the annotated goal heatmap.

use std::path::{Path, PathBuf};

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::RenderError;
use crate::fonts::{FONT_FAMILY, ensure_font};
use crate::result_table::ResultTable;
use crate::season_stats::{DISTRIBUTION_BUCKETS, GoalBucket, HEATMAP_BUCKETS, SEASON_COLUMN};

const PANEL: RGBColor = RGBColor(0xf8, 0xf9, 0xfa);
const GRID: RGBColor = RGBColor(0xb0, 0xb0, 0xb0);

const GREEN: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
const GREEN_EDGE: RGBColor = RGBColor(0x27, 0xae, 0x60);
const RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const RED_EDGE: RGBColor = RGBColor(0xc0, 0x39, 0x2b);
const BLUE: RGBColor = RGBColor(0x34, 0x98, 0xdb);
const BLUE_EDGE: RGBColor = RGBColor(0x29, 0x80, 0xb9);
const YELLOW: RGBColor = RGBColor(0xf1, 0xc4, 0x0f);
const YELLOW_EDGE: RGBColor = RGBColor(0xf3, 0x9c, 0x12);
const PURPLE: RGBColor = RGBColor(0x9b, 0x59, 0xb6);
const PURPLE_EDGE: RGBColor = RGBColor(0x8e, 0x44, 0xad);
const ORANGE: RGBColor = RGBColor(0xe6, 0x7e, 0x22);

/// Pixel size and font source for raster output.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    pub font_path: Option<PathBuf>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 800,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineSeriesSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub color: RGBColor,
    pub edge: RGBColor,
}

#[derive(Debug, Clone, Copy)]
pub struct LineAreaChart {
    pub name: &'static str,
    pub title: &'static str,
    pub y_desc: &'static str,
    pub series: &'static [LineSeriesSpec],
    pub legend: bool,
}

pub const GOALS_PER_SEASON: LineAreaChart = LineAreaChart {
    name: "goals_per_season",
    title: "Average Goals per Match by Season",
    y_desc: "Average goals",
    series: &[LineSeriesSpec {
        column: "avg_goals_per_match",
        label: "Goals per match",
        color: GREEN,
        edge: GREEN_EDGE,
    }],
    legend: false,
};

pub const HOME_AWAY_GOALS: LineAreaChart = LineAreaChart {
    name: "home_away_goals",
    title: "Home and Away Goals by Season",
    y_desc: "Average goals",
    series: &[
        LineSeriesSpec {
            column: "avg_home_goals",
            label: "Home",
            color: RED,
            edge: RED_EDGE,
        },
        LineSeriesSpec {
            column: "avg_away_goals",
            label: "Away",
            color: BLUE,
            edge: BLUE_EDGE,
        },
    ],
    legend: true,
};

pub const HALF_TIME_GOALS: LineAreaChart = LineAreaChart {
    name: "half_time_goals",
    title: "First and Second Half Goals by Season",
    y_desc: "Average goals",
    series: &[
        LineSeriesSpec {
            column: "avg_first_half_goals",
            label: "First half",
            color: YELLOW,
            edge: YELLOW_EDGE,
        },
        LineSeriesSpec {
            column: "avg_second_half_goals",
            label: "Second half",
            color: PURPLE,
            edge: PURPLE_EDGE,
        },
    ],
    legend: true,
};

pub const HIGH_SCORING_MATCHES: LineAreaChart = LineAreaChart {
    name: "high_scoring_matches",
    title: "High-Scoring Match Rate by Season (4+ goals)",
    y_desc: "Share of matches (%)",
    series: &[LineSeriesSpec {
        column: "high_scoring_percentage",
        label: "4+ goals",
        color: RED,
        edge: RED_EDGE,
    }],
    legend: false,
};

#[derive(Debug, Clone, Copy)]
pub struct StackedBarChart {
    pub name: &'static str,
    pub title: &'static str,
    pub y_desc: &'static str,
    pub buckets: &'static [GoalBucket],
    pub colors: &'static [RGBColor],
}

pub const GOALS_DISTRIBUTION: StackedBarChart = StackedBarChart {
    name: "goals_distribution",
    title: "Goal Distribution by Season (%)",
    y_desc: "Share of matches (%)",
    buckets: &DISTRIBUTION_BUCKETS,
    colors: &[RED, ORANGE, YELLOW, GREEN, BLUE],
};

#[derive(Debug, Clone, Copy)]
pub struct HeatmapChart {
    pub name: &'static str,
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub scale_desc: &'static str,
    pub buckets: &'static [GoalBucket],
}

pub const GOALS_HEATMAP: HeatmapChart = HeatmapChart {
    name: "goals_heatmap",
    title: "Goal Distribution Heatmap by Season",
    x_desc: "Goals in match",
    y_desc: "Season",
    scale_desc: "Share of matches (%)",
    buckets: &HEATMAP_BUCKETS,
};

/// Season labels plus one value column per series, ready to plot.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAreaData {
    pub seasons: Vec<String>,
    pub series: Vec<Vec<f64>>,
}

/// One stacked layer: the `[bottom, top)` span of a bucket in every season.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayer {
    pub label: &'static str,
    pub color: RGBColor,
    pub segments: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    pub fn value_range(&self) -> (f64, f64) {
        let flat = self.values.iter().flatten().copied();
        let min = flat.clone().fold(f64::INFINITY, f64::min);
        let max = flat.fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if max > min { (min, max) } else { (min, min + 1.0) }
    }
}

pub fn line_area_data(chart: &LineAreaChart, table: &ResultTable) -> Result<LineAreaData, RenderError> {
    let column_err = |source| RenderError::Column {
        chart: chart.name,
        source,
    };
    let seasons = table.text_column(SEASON_COLUMN).map_err(column_err)?;
    let mut series = Vec::with_capacity(chart.series.len());
    for spec in chart.series {
        series.push(table.f64_column(spec.column).map_err(column_err)?);
    }
    Ok(LineAreaData { seasons, series })
}

/// Cumulative layers in bucket order, bottom layer first.
pub fn stacked_bar_layers(
    chart: &StackedBarChart,
    table: &ResultTable,
) -> Result<(Vec<String>, Vec<BarLayer>), RenderError> {
    let column_err = |source| RenderError::Column {
        chart: chart.name,
        source,
    };
    let seasons = table.text_column(SEASON_COLUMN).map_err(column_err)?;
    let mut base = vec![0.0; seasons.len()];
    let mut layers = Vec::with_capacity(chart.buckets.len());
    for (idx, bucket) in chart.buckets.iter().enumerate() {
        let values = table.f64_column(bucket.column).map_err(column_err)?;
        let segments = base
            .iter_mut()
            .zip(values)
            .map(|(bottom, value)| {
                let span = (*bottom, *bottom + value);
                *bottom += value;
                span
            })
            .collect();
        layers.push(BarLayer {
            label: bucket.label,
            color: chart.colors[idx % chart.colors.len()],
            segments,
        });
    }
    Ok((seasons, layers))
}

pub fn heatmap_grid(chart: &HeatmapChart, table: &ResultTable) -> Result<HeatmapGrid, RenderError> {
    let column_err = |source| RenderError::Column {
        chart: chart.name,
        source,
    };
    let rows = table.text_column(SEASON_COLUMN).map_err(column_err)?;
    let mut values = vec![Vec::with_capacity(chart.buckets.len()); rows.len()];
    for bucket in chart.buckets {
        let column = table.f64_column(bucket.column).map_err(column_err)?;
        for (row, value) in values.iter_mut().zip(column) {
            row.push(value);
        }
    }
    Ok(HeatmapGrid {
        rows,
        columns: chart.buckets.iter().map(|b| b.label.to_string()).collect(),
        values,
    })
}

pub fn render_line_area(
    chart: &LineAreaChart,
    table: &ResultTable,
    path: &Path,
    opts: &RasterOptions,
) -> Result<(), RenderError> {
    let data = line_area_data(chart, table)?;
    if data.seasons.is_empty() {
        return Err(RenderError::Empty { chart: chart.name });
    }
    prepare_output(chart.name, path, opts)?;
    draw_line_area(chart, &data, path, opts).map_err(|err| draw_err(chart.name, err))
}

pub fn render_stacked_bars(
    chart: &StackedBarChart,
    table: &ResultTable,
    path: &Path,
    opts: &RasterOptions,
) -> Result<(), RenderError> {
    let (seasons, layers) = stacked_bar_layers(chart, table)?;
    if seasons.is_empty() {
        return Err(RenderError::Empty { chart: chart.name });
    }
    prepare_output(chart.name, path, opts)?;
    draw_stacked_bars(chart, &seasons, &layers, path, opts).map_err(|err| draw_err(chart.name, err))
}

pub fn render_heatmap(
    chart: &HeatmapChart,
    table: &ResultTable,
    path: &Path,
    opts: &RasterOptions,
) -> Result<(), RenderError> {
    let grid = heatmap_grid(chart, table)?;
    if grid.rows.is_empty() {
        return Err(RenderError::Empty { chart: chart.name });
    }
    prepare_output(chart.name, path, opts)?;
    draw_heatmap(chart, &grid, path, opts).map_err(|err| draw_err(chart.name, err))
}

fn prepare_output(chart: &'static str, path: &Path, opts: &RasterOptions) -> Result<(), RenderError> {
    ensure_font(opts.font_path.as_deref()).map_err(|message| RenderError::Font { chart, message })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            chart,
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn draw_err(chart: &'static str, err: anyhow::Error) -> RenderError {
    RenderError::Draw {
        chart,
        message: format!("{err:#}"),
    }
}

fn draw_line_area(
    chart: &LineAreaChart,
    data: &LineAreaData,
    path: &Path,
    opts: &RasterOptions,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = data.seasons.len();
    let y_max = padded_max(data.series.iter().flatten().copied());

    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title, (FONT_FAMILY, 30).into_font().style(FontStyle::Bold))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;
    plot.plotting_area().fill(&PANEL)?;

    let seasons = &data.seasons;
    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| segment_label(seasons, v))
        .x_label_style((FONT_FAMILY, 14))
        .y_label_style((FONT_FAMILY, 16))
        .x_desc("Season")
        .y_desc(chart.y_desc)
        .axis_desc_style((FONT_FAMILY, 18))
        .light_line_style(ShapeStyle::from(&GRID.mix(0.3)).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID.mix(0.5)).stroke_width(1))
        .draw()?;

    for (spec, values) in chart.series.iter().zip(&data.series) {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| (SegmentValue::CenterOf(i), *v))
            .collect::<Vec<_>>();
        let color = spec.color;

        plot.draw_series(AreaSeries::new(
            points.iter().cloned(),
            0.0,
            color.mix(0.2).filled(),
        ))?;
        // Darker, wider stroke underneath gives the line an outline.
        plot.draw_series(LineSeries::new(points.iter().cloned(), spec.edge.stroke_width(5)))?;
        let anno = plot.draw_series(LineSeries::new(points.iter().cloned(), color.stroke_width(3)))?;
        if chart.legend {
            anno.label(spec.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3))
            });
        }
        plot.draw_series(
            points
                .iter()
                .map(|p| Circle::new(p.clone(), 5, color.filled())),
        )?;
    }

    if chart.legend {
        plot.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, 16))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_stacked_bars(
    chart: &StackedBarChart,
    seasons: &[String],
    layers: &[BarLayer],
    path: &Path,
    opts: &RasterOptions,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = seasons.len();
    let mut plot = ChartBuilder::on(&root)
        .caption(chart.title, (FONT_FAMILY, 30).into_font().style(FontStyle::Bold))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..100f64)?;
    plot.plotting_area().fill(&PANEL)?;

    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| segment_label(seasons, v))
        .x_label_style((FONT_FAMILY, 14))
        .y_label_style((FONT_FAMILY, 16))
        .x_desc("Season")
        .y_desc(chart.y_desc)
        .axis_desc_style((FONT_FAMILY, 18))
        .light_line_style(ShapeStyle::from(&GRID.mix(0.3)).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID.mix(0.5)).stroke_width(1))
        .draw()?;

    for layer in layers {
        let color = layer.color;
        plot.draw_series(layer.segments.iter().enumerate().map(|(i, (bottom, top))| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), *bottom),
                    (SegmentValue::Exact(i + 1), *top),
                ],
                color.filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))?
        .label(layer.label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT_FAMILY, 16))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_heatmap(
    chart: &HeatmapChart,
    grid: &HeatmapGrid,
    path: &Path,
    opts: &RasterOptions,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let scale_width = 170;
    let (main, side) = root.split_horizontally(opts.width as i32 - scale_width);
    let (vmin, vmax) = grid.value_range();
    let rows = grid.rows.len();
    let cols = grid.columns.len();

    let mut plot = ChartBuilder::on(&main)
        .caption(chart.title, (FONT_FAMILY, 30).into_font().style(FontStyle::Bold))
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())?;

    // First season at the top: row r is drawn at y = rows - 1 - r.
    let flipped = grid.rows.iter().rev().cloned().collect::<Vec<_>>();
    let columns = &grid.columns;
    plot.configure_mesh()
        .disable_mesh()
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&|v| segment_label(columns, v))
        .y_label_formatter(&|v| segment_label(&flipped, v))
        .x_label_style((FONT_FAMILY, 16))
        .y_label_style((FONT_FAMILY, 14))
        .x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .axis_desc_style((FONT_FAMILY, 18))
        .draw()?;

    let cells = grid
        .values
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, v)| (c, rows - 1 - r, *v))
        })
        .collect::<Vec<_>>();

    plot.draw_series(cells.iter().map(|&(c, y, v)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(c), SegmentValue::Exact(y)),
                (SegmentValue::Exact(c + 1), SegmentValue::Exact(y + 1)),
            ],
            ylorrd((v - vmin) / (vmax - vmin)).filled(),
        )
    }))?;

    plot.draw_series(cells.iter().map(|&(c, y, v)| {
        let fill = ylorrd((v - vmin) / (vmax - vmin));
        let ink = if luminance(fill) > 0.5 { BLACK } else { WHITE };
        Text::new(
            format!("{v:.1}"),
            (SegmentValue::CenterOf(c), SegmentValue::CenterOf(y)),
            (FONT_FAMILY, 15)
                .into_font()
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )
    }))?;

    let mut scale = ChartBuilder::on(&side)
        .margin_top(90)
        .margin_bottom(90)
        .margin_right(70)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, vmin..vmax)?;
    scale
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_label_style((FONT_FAMILY, 14))
        .y_desc(chart.scale_desc)
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    const STEPS: usize = 100;
    let step = (vmax - vmin) / STEPS as f64;
    scale.draw_series((0..STEPS).map(|k| {
        let lo = vmin + step * k as f64;
        let t = (k as f64 + 0.5) / STEPS as f64;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], ylorrd(t).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn segment_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        SegmentValue::Exact(_) | SegmentValue::Last => String::new(),
    }
}

fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.15 } else { 1.0 }
}

/// ColorBrewer YlOrRd, `t` in [0, 1].
pub fn ylorrd(t: f64) -> RGBColor {
    const STOPS: [(u8, u8, u8); 9] = [
        (0xff, 0xff, 0xcc),
        (0xff, 0xed, 0xa0),
        (0xfe, 0xd9, 0x76),
        (0xfe, 0xb2, 0x4c),
        (0xfd, 0x8d, 0x3c),
        (0xfc, 0x4e, 0x2a),
        (0xe3, 0x1a, 0x1c),
        (0xbd, 0x00, 0x26),
        (0x80, 0x00, 0x26),
    ];
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (STOPS.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(STOPS.len() - 2);
    let frac = pos - idx as f64;
    let (a, b) = (STOPS[idx], STOPS[idx + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn luminance(color: RGBColor) -> f64 {
    (0.299 * color.0 as f64 + 0.587 * color.1 as f64 + 0.114 * color.2 as f64) / 255.0
}

#[cfg(test)]
mod tests {
    use plotters::style::RGBColor;

    use super::{GOALS_DISTRIBUTION, HeatmapGrid, padded_max, stacked_bar_layers, ylorrd};
    use crate::result_table::{ResultTable, Value};

    #[test]
    fn color_scale_hits_both_ends() {
        assert_eq!(ylorrd(0.0), RGBColor(0xff, 0xff, 0xcc));
        assert_eq!(ylorrd(1.0), RGBColor(0x80, 0x00, 0x26));
        assert_eq!(ylorrd(f64::NAN), ylorrd(0.0));
    }

    #[test]
    fn flat_heatmap_gets_a_usable_range() {
        let grid = HeatmapGrid {
            rows: vec!["2020-2021".into()],
            columns: vec!["0".into(), "1".into()],
            values: vec![vec![50.0, 50.0]],
        };
        assert_eq!(grid.value_range(), (50.0, 51.0));
    }

    #[test]
    fn stacked_layers_accumulate_per_season() {
        let mut table = ResultTable::with_columns(&[
            "season",
            "zero_goals",
            "one_goal",
            "two_goals",
            "three_goals",
            "four_plus_goals",
        ]);
        table.push_row(vec![
            Value::Text("2020-2021".into()),
            Value::Real(10.0),
            Value::Real(20.0),
            Value::Real(30.0),
            Value::Real(25.0),
            Value::Real(15.0),
        ]);
        let (_, layers) = stacked_bar_layers(&GOALS_DISTRIBUTION, &table).unwrap();
        let tops = layers.iter().map(|l| l.segments[0].1).collect::<Vec<_>>();
        assert_eq!(tops, vec![10.0, 30.0, 60.0, 85.0, 100.0]);
        assert_eq!(layers[1].segments[0], (10.0, 30.0));
    }

    #[test]
    fn y_axis_leaves_headroom() {
        assert_eq!(padded_max([2.0, 4.0].into_iter()), 4.0 * 1.15);
        assert_eq!(padded_max(std::iter::empty()), 1.0);
    }
}
