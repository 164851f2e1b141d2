use super::ChartError;
use super::mapper::{ChartMapper, XLayout};
use super::surface::{Color, DrawingSurface, Fill, Point, Rect, Stroke, TextAlign, TextStyle};
use crate::format::abbreviate_value;

pub const CHART_PADDING: f64 = 50.0;
pub const GRID_LINES: usize = 5;
pub const MARKER_RADIUS: f64 = 4.0;
pub const BAR_WIDTH_RATIO: f64 = 0.6;
pub const LABEL_THINNING_THRESHOLD: usize = 10;

const AXIS_COLOR: Color = Color::rgb(0x6b, 0x72, 0x80);
const GRID_COLOR: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const LABEL_COLOR: Color = Color::rgb(0x37, 0x41, 0x51);
const LABEL_SIZE: f64 = 11.0;
const LINE_WIDTH: f64 = 2.5;
const BAR_FADE_ALPHA: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl ChartSeries {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            series: Vec::new(),
        }
    }

    pub fn with_series(mut self, name: &str, values: Vec<f64>, color: Color) -> Self {
        self.series.push(NamedSeries {
            name: name.to_string(),
            values,
            color,
        });
        self
    }

    fn validate(&self) -> Result<(), ChartError> {
        if self.labels.is_empty() || self.series.is_empty() {
            return Err(ChartError::EmptySeries);
        }
        for named in &self.series {
            if named.values.len() != self.labels.len() {
                return Err(ChartError::LengthMismatch {
                    series: named.name.clone(),
                    expected: self.labels.len(),
                    actual: named.values.len(),
                });
            }
            if named.values.iter().any(|v| !v.is_finite()) {
                return Err(ChartError::NonFiniteValue(named.name.clone()));
            }
        }
        Ok(())
    }

    fn mapper(&self, size: (f64, f64), layout: XLayout) -> ChartMapper {
        ChartMapper::for_series(
            size,
            CHART_PADDING,
            self.series.iter().map(|s| s.values.as_slice()),
            self.labels.len(),
            layout,
        )
    }
}

pub fn render_line_chart<S: DrawingSurface>(
    surface: &mut S,
    data: &ChartSeries,
) -> Result<(), ChartError> {
    data.validate()?;
    let mapper = data.mapper(surface.size(), XLayout::Line);

    draw_axes(surface, &mapper);
    draw_gridlines(surface, &mapper);

    for named in &data.series {
        let stroke = Stroke {
            color: named.color,
            width: LINE_WIDTH,
        };
        let points: Vec<Point> = named
            .values
            .iter()
            .enumerate()
            .map(|(idx, value)| Point::new(mapper.map_x(idx), mapper.map_y(*value)))
            .collect();
        for pair in points.windows(2) {
            surface.line(pair[0], pair[1], stroke);
        }
        for point in &points {
            surface.fill_circle(*point, MARKER_RADIUS, named.color);
        }
    }

    draw_x_labels(surface, &mapper, &data.labels, 0.0);
    draw_legend(surface, &mapper, &data.series);
    Ok(())
}

pub fn render_bar_chart<S: DrawingSurface>(
    surface: &mut S,
    data: &ChartSeries,
) -> Result<(), ChartError> {
    data.validate()?;
    let mapper = data.mapper(surface.size(), XLayout::Bar);

    draw_axes(surface, &mapper);
    draw_gridlines(surface, &mapper);

    let slot = mapper.slot_width();
    let bar_width = slot * BAR_WIDTH_RATIO;
    let bar_offset = (slot - bar_width) / 2.0;
    for named in &data.series {
        for (idx, value) in named.values.iter().enumerate() {
            let top = mapper.map_y(*value);
            let height = mapper.bottom() - top;
            if height <= 0.0 {
                continue;
            }
            let fill = surface.vertical_gradient(
                top,
                mapper.bottom(),
                named.color,
                named.color.with_alpha(BAR_FADE_ALPHA),
            );
            surface.fill_rect(
                Rect {
                    x: mapper.map_x(idx) + bar_offset,
                    y: top,
                    width: bar_width,
                    height,
                },
                &fill,
            );
        }
    }

    draw_x_labels(surface, &mapper, &data.labels, slot / 2.0);
    Ok(())
}

pub fn label_stride(len: usize) -> usize {
    if len > LABEL_THINNING_THRESHOLD { 2 } else { 1 }
}

fn draw_axes<S: DrawingSurface>(surface: &mut S, mapper: &ChartMapper) {
    let stroke = Stroke {
        color: AXIS_COLOR,
        width: 1.0,
    };
    surface.line(
        Point::new(mapper.left(), mapper.top()),
        Point::new(mapper.left(), mapper.bottom()),
        stroke,
    );
    surface.line(
        Point::new(mapper.left(), mapper.bottom()),
        Point::new(mapper.right(), mapper.bottom()),
        stroke,
    );
}

fn draw_gridlines<S: DrawingSurface>(surface: &mut S, mapper: &ChartMapper) {
    let stroke = Stroke {
        color: GRID_COLOR,
        width: 1.0,
    };
    let style = TextStyle {
        color: LABEL_COLOR,
        size: LABEL_SIZE,
        align: TextAlign::End,
    };
    for step in 1..=GRID_LINES {
        let value = mapper.max_value() * step as f64 / GRID_LINES as f64;
        let y = mapper.map_y(value);
        surface.line(
            Point::new(mapper.left(), y),
            Point::new(mapper.right(), y),
            stroke,
        );
        surface.text(
            &abbreviate_value(value),
            Point::new(mapper.left() - 8.0, y + LABEL_SIZE / 3.0),
            style,
        );
    }
}

fn draw_x_labels<S: DrawingSurface>(
    surface: &mut S,
    mapper: &ChartMapper,
    labels: &[String],
    center_offset: f64,
) {
    let style = TextStyle {
        color: LABEL_COLOR,
        size: LABEL_SIZE,
        align: TextAlign::Middle,
    };
    let y = mapper.bottom() + LABEL_SIZE + 8.0;
    for (idx, label) in labels.iter().enumerate().step_by(label_stride(labels.len())) {
        surface.text(label, Point::new(mapper.map_x(idx) + center_offset, y), style);
    }
}

fn draw_legend<S: DrawingSurface>(surface: &mut S, mapper: &ChartMapper, series: &[NamedSeries]) {
    let swatch = 12.0;
    let y = mapper.top() / 2.0;
    let mut x = mapper.left();
    for named in series {
        surface.fill_rect(
            Rect {
                x,
                y: y - swatch / 2.0,
                width: swatch,
                height: swatch,
            },
            &Fill::Solid(named.color),
        );
        surface.text(
            &named.name,
            Point::new(x + swatch + 6.0, y + LABEL_SIZE / 3.0),
            TextStyle {
                color: LABEL_COLOR,
                size: LABEL_SIZE + 1.0,
                align: TextAlign::Start,
            },
        );
        x += swatch + 6.0 + (named.name.chars().count() as f64) * 7.0 + 20.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::{DrawCommand, RecordingSurface};

    const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);
    const RED: Color = Color::rgb(0xef, 0x44, 0x44);

    fn labels(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| if i == 0 { "Now".to_string() } else { format!("Year {i}") })
            .collect()
    }

    fn income_series(n: usize) -> ChartSeries {
        ChartSeries::new(labels(n))
            .with_series("Nominal", (0..n).map(|i| 1_000.0 * (i + 1) as f64).collect(), BLUE)
            .with_series("Real", (0..n).map(|i| 900.0 * (i + 1) as f64).collect(), RED)
    }

    #[test]
    fn line_chart_draws_axes_gridlines_series_and_legend() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        render_line_chart(&mut surface, &income_series(4)).expect("valid series");

        // 2 axes + 5 gridlines + 3 segments per series.
        assert_eq!(surface.lines().count(), 2 + GRID_LINES + 2 * 3);
        assert_eq!(surface.circles().count(), 8);
        assert!(surface.circles().all(|(_, r, _)| r == MARKER_RADIUS));

        let texts: Vec<&str> = surface.texts().collect();
        assert!(texts.contains(&"Nominal"));
        assert!(texts.contains(&"Real"));
        assert!(texts.contains(&"Now"));
        assert!(texts.contains(&"Year 3"));
        // top gridline carries the headroom-adjusted maximum, 4000 * 1.1
        assert!(texts.contains(&"4k"));
    }

    #[test]
    fn line_chart_markers_use_series_colors() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        render_line_chart(&mut surface, &income_series(3)).expect("valid series");

        let blue = surface.circles().filter(|(_, _, c)| **c == BLUE).count();
        let red = surface.circles().filter(|(_, _, c)| **c == RED).count();
        assert_eq!(blue, 3);
        assert_eq!(red, 3);
    }

    #[test]
    fn single_point_line_chart_draws_one_marker() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let data = ChartSeries::new(labels(1)).with_series("Only", vec![500.0], BLUE);
        render_line_chart(&mut surface, &data).expect("single point is valid");

        let markers: Vec<_> = surface.circles().collect();
        assert_eq!(markers.len(), 1);
        assert!(markers[0].0.x.is_finite());
        assert!(markers[0].0.y.is_finite());
    }

    #[test]
    fn bar_chart_sizes_bars_to_sixty_percent_of_slot() {
        let mut surface = RecordingSurface::new(600.0, 400.0);
        let data = ChartSeries::new(labels(5))
            .with_series("Savings", vec![100.0, 90.0, 80.0, 70.0, 60.0], BLUE);
        render_bar_chart(&mut surface, &data).expect("valid series");

        let bars: Vec<&Rect> = surface
            .rects()
            .filter(|(_, fill)| matches!(fill, Fill::Gradient(_)))
            .map(|(rect, _)| rect)
            .collect();
        assert_eq!(bars.len(), 5);

        let slot = (600.0 - 2.0 * CHART_PADDING) / 5.0;
        for bar in &bars {
            assert!((bar.width - slot * BAR_WIDTH_RATIO).abs() < 1e-9);
            assert!((bar.y + bar.height - (400.0 - CHART_PADDING)).abs() < 1e-9);
        }
        assert!(bars[0].height > bars[4].height);
    }

    #[test]
    fn bar_chart_gradient_fades_towards_baseline() {
        let mut surface = RecordingSurface::new(600.0, 400.0);
        let data = ChartSeries::new(labels(2)).with_series("Savings", vec![100.0, 50.0], BLUE);
        render_bar_chart(&mut surface, &data).expect("valid series");

        let gradients: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Gradient {
                    top_color,
                    bottom_color,
                    ..
                } => Some((*top_color, *bottom_color)),
                _ => None,
            })
            .collect();
        assert_eq!(gradients.len(), 2);
        for (top, bottom) in gradients {
            assert_eq!(top, BLUE);
            assert!(bottom.alpha < top.alpha);
        }
    }

    #[test]
    fn bar_chart_thins_labels_above_ten_bars() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let data = ChartSeries::new(labels(12)).with_series("Savings", vec![10.0; 12], BLUE);
        render_bar_chart(&mut surface, &data).expect("valid series");

        let texts: Vec<&str> = surface.texts().collect();
        assert!(texts.contains(&"Now"));
        assert!(texts.contains(&"Year 2"));
        assert!(!texts.contains(&"Year 1"));
        assert!(!texts.contains(&"Year 11"));
    }

    #[test]
    fn bar_chart_keeps_all_labels_up_to_ten_bars() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let data = ChartSeries::new(labels(10)).with_series("Savings", vec![10.0; 10], BLUE);
        render_bar_chart(&mut surface, &data).expect("valid series");

        let texts: Vec<&str> = surface.texts().collect();
        for idx in 1..10 {
            assert!(texts.contains(&format!("Year {idx}").as_str()));
        }
    }

    #[test]
    fn zero_bars_are_skipped_without_panicking() {
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let data = ChartSeries::new(labels(3)).with_series("Savings", vec![0.0; 3], BLUE);
        render_bar_chart(&mut surface, &data).expect("zero values are valid");

        assert_eq!(surface.rects().count(), 0);
    }

    #[test]
    fn rejects_mismatched_and_empty_series() {
        let mut surface = RecordingSurface::new(800.0, 400.0);

        let mismatched = ChartSeries::new(labels(3)).with_series("Savings", vec![1.0, 2.0], BLUE);
        let err = render_bar_chart(&mut surface, &mismatched).expect_err("length mismatch");
        assert!(err.to_string().contains("Savings"));

        let empty = ChartSeries::new(Vec::new());
        assert!(matches!(
            render_line_chart(&mut surface, &empty),
            Err(ChartError::EmptySeries)
        ));

        let nan = ChartSeries::new(labels(2)).with_series("Real", vec![1.0, f64::NAN], RED);
        assert!(matches!(
            render_line_chart(&mut surface, &nan),
            Err(ChartError::NonFiniteValue(_))
        ));
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn label_stride_threshold() {
        assert_eq!(label_stride(1), 1);
        assert_eq!(label_stride(10), 1);
        assert_eq!(label_stride(11), 2);
        assert_eq!(label_stride(51), 2);
    }
}
