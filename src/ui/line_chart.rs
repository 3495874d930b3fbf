//! Training metrics line charts
//! Plots one or more metric series against the shared epoch axis

use iced::widget::canvas::{self, Canvas, Path, Stroke};
use iced::widget::{column, text, Row};
use iced::{Color, Element, Length, Pixels, Point, Rectangle, Size};

use crate::metrics::series::{
    MetricsSeries, ACCURACY_TOP1, ACCURACY_TOP5, LEARNING_RATE, TRAIN_LOSS, VAL_LOSS,
};
use crate::Message;

/// Space reserved left of the plot for the value labels
const MARGIN_LEFT: f32 = 56.0;
/// Space reserved below the plot for the epoch labels
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_TOP: f32 = 8.0;

/// One plotted metric
#[derive(Debug, Clone, Copy)]
pub struct ChartLine {
    pub metric: &'static str,
    pub label: &'static str,
    pub color: Color,
}

pub const ACCURACY_LINES: [ChartLine; 2] = [
    ChartLine {
        metric: ACCURACY_TOP1,
        label: "DL performance",
        color: Color::from_rgb(0.23, 0.51, 0.96),
    },
    ChartLine {
        metric: ACCURACY_TOP5,
        label: "Real Data",
        color: Color::from_rgb(0.13, 0.77, 0.37),
    },
];

pub const LOSS_LINES: [ChartLine; 2] = [
    ChartLine {
        metric: TRAIN_LOSS,
        label: "Training Loss",
        color: Color::from_rgb(0.94, 0.27, 0.27),
    },
    ChartLine {
        metric: VAL_LOSS,
        label: "Validation Loss",
        color: Color::from_rgb(0.98, 0.75, 0.14),
    },
];

pub const LEARNING_RATE_LINES: [ChartLine; 1] = [ChartLine {
    metric: LEARNING_RATE,
    label: "Learning Rate",
    color: Color::from_rgb(0.66, 0.33, 0.97),
}];

/// Canvas program drawing `lines` from `metrics`
#[derive(Debug, Clone, Copy)]
pub struct LineChart<'a> {
    metrics: &'a MetricsSeries,
    lines: &'a [ChartLine],
}

impl<'a> LineChart<'a> {
    pub fn new(metrics: &'a MetricsSeries, lines: &'a [ChartLine]) -> Self {
        Self { metrics, lines }
    }

    /// Lowest and highest epoch
    fn x_range(&self) -> Option<(f64, f64)> {
        min_max(self.metrics.epochs.iter().copied())
    }

    /// Value range over every plotted line, widened when flat
    fn y_range(&self) -> Option<(f64, f64)> {
        let values = self
            .lines
            .iter()
            .flat_map(|line| self.metrics.values(line.metric).iter().flatten().copied());
        min_max(values).map(|(lo, hi)| {
            if hi - lo < f64::EPSILON {
                let pad = (lo.abs() * 0.05).max(0.5);
                (lo - pad, hi + pad)
            } else {
                (lo, hi)
            }
        })
    }

    /// Polylines of one metric in plot coordinates
    ///
    /// Missing values break the line into separate segments.
    fn segments(&self, metric: &str, plot: Rectangle) -> Vec<Vec<Point>> {
        let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (self.x_range(), self.y_range()) else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (&epoch, value) in self.metrics.epochs.iter().zip(self.metrics.values(metric)) {
            match value {
                Some(value) => {
                    let x = if x_hi > x_lo {
                        plot.x + ((epoch - x_lo) / (x_hi - x_lo)) as f32 * plot.width
                    } else {
                        plot.x + plot.width / 2.0
                    };
                    let y = plot.y + plot.height - ((value - y_lo) / (y_hi - y_lo)) as f32 * plot.height;
                    current.push(Point::new(x, y));
                }
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |range, value| match range {
        None => Some((value, value)),
        Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
    })
}

/// Short axis label; small values (learning rates) switch to exponent form
fn format_tick(value: f64) -> String {
    if value != 0.0 && value.abs() < 0.01 {
        format!("{:.1e}", value)
    } else {
        format!("{:.2}", value)
    }
}

impl canvas::Program<Message> for LineChart<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let palette = theme.extended_palette();

        let plot = Rectangle::new(
            Point::new(MARGIN_LEFT, MARGIN_TOP),
            Size::new(
                (bounds.width - MARGIN_LEFT).max(1.0),
                (bounds.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
            ),
        );

        let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (self.x_range(), self.y_range()) else {
            return vec![frame.into_geometry()];
        };

        // Horizontal grid with value labels
        let grid = Stroke::default()
            .with_color(palette.background.weak.color)
            .with_width(1.0);
        for step in 0..=4 {
            let t = step as f32 / 4.0;
            let y = plot.y + plot.height * (1.0 - t);
            frame.stroke(
                &Path::line(Point::new(plot.x, y), Point::new(plot.x + plot.width, y)),
                grid,
            );
            frame.fill_text(canvas::Text {
                content: format_tick(y_lo + (y_hi - y_lo) * t as f64),
                position: Point::new(4.0, y - 6.0),
                color: palette.background.base.text,
                size: Pixels(11.0),
                ..canvas::Text::default()
            });
        }

        for (epoch, x) in [(x_lo, plot.x), (x_hi, plot.x + plot.width - 24.0)] {
            frame.fill_text(canvas::Text {
                content: format!("{}", epoch),
                position: Point::new(x, plot.y + plot.height + 4.0),
                color: palette.background.base.text,
                size: Pixels(11.0),
                ..canvas::Text::default()
            });
        }

        for line in self.lines {
            let mut path_builder = canvas::path::Builder::new();
            for segment in self.segments(line.metric, plot) {
                if let Some((first, rest)) = segment.split_first() {
                    path_builder.move_to(*first);
                    for point in rest {
                        path_builder.line_to(*point);
                    }
                    if rest.is_empty() {
                        path_builder.circle(*first, 2.0);
                    }
                }
            }

            frame.stroke(
                &path_builder.build(),
                Stroke::default().with_color(line.color).with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }
}

/// Titled chart with a legend
pub fn view<'a>(title: &'a str, metrics: &'a MetricsSeries, lines: &'a [ChartLine]) -> Element<'a, Message> {
    let legend = Row::with_children(
        lines
            .iter()
            .map(|line| text(format!("● {}", line.label)).size(13).color(line.color).into()),
    )
    .spacing(16);

    column![
        text(title).size(18),
        legend,
        Canvas::new(LineChart::new(metrics, lines))
            .width(Length::Fill)
            .height(Length::Fixed(260.0)),
    ]
    .spacing(8)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn metrics(epochs: &[f64], values: &[Option<f64>]) -> MetricsSeries {
        let mut series = BTreeMap::new();
        series.insert(VAL_LOSS.to_string(), values.to_vec());
        MetricsSeries {
            epochs: epochs.to_vec(),
            series,
        }
    }

    const PLOT: Rectangle = Rectangle {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
    };

    #[test]
    fn test_points_span_the_plot() {
        let metrics = metrics(&[1.0, 2.0, 3.0], &[Some(1.0), Some(0.5), Some(0.0)]);
        let chart = LineChart::new(&metrics, &LOSS_LINES);

        let segments = chart.segments(VAL_LOSS, PLOT);
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0],
            vec![Point::new(0.0, 0.0), Point::new(50.0, 25.0), Point::new(100.0, 50.0)]
        );
    }

    #[test]
    fn test_gaps_split_the_line() {
        let metrics = metrics(&[1.0, 2.0, 3.0, 4.0], &[Some(1.0), None, Some(0.5), Some(0.2)]);
        let chart = LineChart::new(&metrics, &LOSS_LINES);

        let segments = chart.segments(VAL_LOSS, PLOT);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 1);
        assert_eq!(segments[1].len(), 2);
    }

    #[test]
    fn test_missing_metric_draws_nothing() {
        let metrics = metrics(&[1.0, 2.0], &[Some(1.0), Some(0.5)]);
        let chart = LineChart::new(&metrics, &ACCURACY_LINES);

        assert!(chart.y_range().is_none());
        assert!(chart.segments(ACCURACY_TOP1, PLOT).is_empty());
    }

    #[test]
    fn test_flat_series_is_widened() {
        let metrics = metrics(&[1.0], &[Some(0.3)]);
        let chart = LineChart::new(&metrics, &LOSS_LINES);

        let (lo, hi) = chart.y_range().unwrap();
        assert!(lo < 0.3 && hi > 0.3);
        let segments = chart.segments(VAL_LOSS, PLOT);
        assert_eq!(segments.len(), 1);
        let point = segments[0][0];
        assert_eq!(point.x, 50.0);
        assert!((point.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_tick_format() {
        assert_eq!(format_tick(0.8512), "0.85");
        assert_eq!(format_tick(0.0), "0.00");
        assert_eq!(format_tick(0.00066), "6.6e-4");
    }
}
