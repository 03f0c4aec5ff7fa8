use crate::axis::{format_tick, ScaleBase};
use crate::pipeline::Chart;
use crate::style::{Marker, Rgb};
use anyhow::{Context, Result};
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

// Font sizes
const TITLE_FONT_SIZE: u32 = 32;
const AXIS_LABEL_FONT_SIZE: u32 = 22;
const TICK_LABEL_FONT_SIZE: u32 = 18;
const LEGEND_FONT_SIZE: u32 = 16;

const DEFAULT_MARGIN_BOTTOM: u32 = 55;
const DEFAULT_X_LABEL_AREA_SIZE: u32 = 60;

const LINE_WIDTH: u32 = 2;
const MARKER_SIZE: i32 = 5;
const LEGEND_MARKER_SIZE: i32 = 4;

/// Draws a finished chart somewhere
pub trait Renderer {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

/// Writes the chart as an SVG file
pub struct SvgRenderer {
    path: PathBuf,
    size: (u32, u32),
    grid: bool,
}

impl SvgRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (1000, 600),
            grid: false,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).context("Failed to create output directory")?;
        }

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let (lo, hi) = chart.axis.range;
        match chart.axis.scale.radix() {
            None => draw_chart(&root, chart, lo..hi, self.grid)?,
            Some(base) => {
                let x_spec = (lo..hi)
                    .log_scale()
                    .base(base)
                    .with_key_points(chart.axis.tick_positions.clone());
                draw_chart(&root, chart, x_spec, self.grid)?
            }
        }

        root.present()
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        println!("Generated: {}", self.path.display());
        Ok(())
    }
}

fn plot_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

fn x_tick_label(chart: &Chart, x: f64) -> String {
    match chart.axis.scale {
        ScaleBase::Linear => format_tick(x),
        ScaleBase::Log2 | ScaleBase::Log10 => chart
            .axis
            .tick_positions
            .iter()
            .position(|&t| (t - x).abs() <= t * 1e-9)
            .map(|idx| chart.axis.tick_labels[idx].clone())
            .unwrap_or_default(),
    }
}

fn draw_chart<X>(
    root: &DrawingArea<SVGBackend, Shift>,
    chart: &Chart,
    x_spec: X,
    grid: bool,
) -> Result<()>
where
    X: AsRangedCoord<Value = f64>,
    X::CoordDescType: ValueFormatter<f64>,
{
    let y_max = (chart.max_throughput() * 1.1).max(1.0);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.labels.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .margin_bottom(DEFAULT_MARGIN_BOTTOM)
        .x_label_area_size(DEFAULT_X_LABEL_AREA_SIZE)
        .y_label_area_size(90)
        .build_cartesian_2d(x_spec, 0.0..y_max)?;

    let x_labels = match chart.axis.tick_positions.len() {
        0 => 10,
        n => n,
    };

    let x_formatter = |x: &f64| x_tick_label(chart, *x);
    let y_formatter = |y: &f64| format_tick(*y);

    let mut mesh = ctx.configure_mesh();
    if !grid {
        mesh.disable_mesh();
    }
    mesh.x_labels(x_labels)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(chart.labels.x_label.as_str())
        .y_desc(chart.labels.y_label.as_str())
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    // Legend title row, drawn as an invisible series
    if !chart.labels.legend_title.is_empty() {
        ctx.draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(chart.labels.legend_title.as_str())
            .legend(|(x, y)| EmptyElement::at((x, y)));
    }

    for series in &chart.series {
        let Some(style) = chart.styles.get(&series.id) else {
            continue;
        };
        let color = plot_color(style.color);
        let line = color.stroke_width(LINE_WIDTH);
        let data = series.points.clone();

        let anno = ctx
            .draw_series(LineSeries::new(data.clone(), line))?
            .label(series.id.label(&chart.labels.key_suffix));

        // Legend glyphs are positioned relative to the row anchor
        let s = LEGEND_MARKER_SIZE;
        match style.marker {
            Marker::Circle => {
                anno.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (20, 0)], line)
                        + Circle::new((10, 0), s, color.filled())
                });
                ctx.draw_series(
                    data.iter()
                        .map(|&p| Circle::new(p, MARKER_SIZE, color.filled())),
                )?;
            }
            Marker::Triangle => {
                anno.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (20, 0)], line)
                        + TriangleMarker::new((10, 0), s, color.filled())
                });
                ctx.draw_series(
                    data.iter()
                        .map(|&p| TriangleMarker::new(p, MARKER_SIZE, color.filled())),
                )?;
            }
            Marker::Square => {
                anno.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (20, 0)], line)
                        + Rectangle::new([(10 - s, -s), (10 + s, s)], color.filled())
                });
                ctx.draw_series(data.iter().map(|&p| {
                    EmptyElement::at(p)
                        + Rectangle::new(
                            [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                            color.filled(),
                        )
                }))?;
            }
            Marker::Cross => {
                anno.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + PathElement::new(vec![(0, 0), (20, 0)], line)
                        + Cross::new((10, 0), s, line)
                });
                ctx.draw_series(
                    data.iter()
                        .map(|&p| Cross::new(p, MARKER_SIZE, line)),
                )?;
            }
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{self, ScaleBase};
    use crate::record::Record;
    use crate::pipeline::ChartLabels;
    use crate::series;
    use crate::style;
    use tempfile::TempDir;

    fn sample_chart(scale: ScaleBase) -> Chart {
        let records = vec![
            Record::new(32.0, 4.0, 100.0, Some("Linux")),
            Record::new(64.0, 4.0, 150.0, Some("Linux")),
            Record::new(32.0, 8.0, 90.0, Some("Linux")),
            Record::new(32.0, 4.0, 80.0, Some("macOS")),
            Record::new(512.0, 4.0, 120.0, Some("macOS")),
            Record::new(128.0, 16.0, 60.0, Some("BSD")),
            Record::new(256.0, 16.0, 70.0, Some("Windows")),
        ];
        let series = series::build(&records).unwrap();
        let ids: Vec<_> = series.iter().map(|s| s.id.clone()).collect();
        Chart {
            styles: style::assign(&ids),
            axis: axis::plan(&series::input_sizes(&series), scale).unwrap(),
            series,
            labels: ChartLabels::default(),
        }
    }

    #[test]
    fn test_render_svg_draws_every_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts").join("scan.svg");

        let mut renderer = SvgRenderer::new(&path);
        renderer.render(&sample_chart(ScaleBase::Log2)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Linux 4 MB"));
        assert!(svg.contains("Memtable Size (MB)"));
        // Linux points are circles, macOS points are triangles, each plus a legend glyph
        assert!(svg.matches("<circle").count() >= 3 + 2);
        assert!(svg.matches("<polygon").count() >= 2 + 1);
    }

    #[test]
    fn test_render_linear_with_grid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("put.svg");

        let mut renderer = SvgRenderer::new(&path).with_size(800, 500).with_grid(true);
        renderer.render(&sample_chart(ScaleBase::Linear)).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_color() {
        let color = plot_color(Rgb(0x93, 0x70, 0xDB));
        assert_eq!((color.0, color.1, color.2), (0x93, 0x70, 0xDB));
    }

    #[test]
    fn test_linear_tick_labels_are_plain() {
        let chart = sample_chart(ScaleBase::Linear);
        assert_eq!(x_tick_label(&chart, 250.0), "250");
        assert_eq!(x_tick_label(&chart, 12.5), "12.5");
    }

    #[test]
    fn test_x_tick_label_only_on_ticks() {
        let chart = sample_chart(ScaleBase::Log2);
        assert_eq!(x_tick_label(&chart, 128.0), "128");
        assert_eq!(x_tick_label(&chart, 100.0), "");
    }
}
