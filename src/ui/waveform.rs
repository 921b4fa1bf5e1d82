//! Waveform plot

use crate::audio::Waveform;
use crate::session::Visualizer;
use ratatui::{
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Chart, Dataset, GraphType},
};

pub const TITLE: &str = "Audio Waveform";
pub const X_LABEL: &str = "Time (s)";
pub const Y_LABEL: &str = "Amplitude";

/// Horizontal grid lines
pub const REFERENCE_LEVELS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Upper bound on plotted points per half (min/max pairs)
const MAX_BUCKETS: usize = 512;

/// Panel holding the most recently rendered waveform
#[derive(Debug, Default)]
pub struct WaveformPanel {
    points: Vec<(f64, f64)>,
    references: Vec<Vec<(f64, f64)>>,
    duration: f64,
}

impl WaveformPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    fn x_bound(&self) -> f64 {
        if self.duration > 0.0 {
            self.duration
        } else {
            1.0
        }
    }

    pub fn chart(&self) -> Chart<'_> {
        let grid = Style::default().fg(Color::DarkGray);
        let mut datasets: Vec<Dataset> = self
            .references
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(grid)
                    .data(line)
            })
            .collect();

        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&self.points),
        );

        let label_style = Style::default().fg(Color::Gray);
        let x_max = self.x_bound();

        Chart::new(datasets)
            .block(Block::bordered().title(TITLE))
            .x_axis(
                Axis::default()
                    .title(Span::styled(X_LABEL, label_style))
                    .style(grid)
                    .bounds([0.0, x_max])
                    .labels(vec![
                        "0".to_string(),
                        format!("{:.2}", x_max / 2.0),
                        format!("{:.2}", x_max),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(Y_LABEL, label_style))
                    .style(grid)
                    .bounds([-1.0, 1.0])
                    .labels(vec!["-1", "0", "1"]),
            )
    }
}

impl Visualizer for WaveformPanel {
    fn render(&mut self, waveform: &Waveform) {
        self.points = waveform.envelope(MAX_BUCKETS);
        self.duration = waveform.duration_secs();
        let x_max = self.x_bound();
        self.references = REFERENCE_LEVELS
            .iter()
            .map(|&y| vec![(0.0, y), (x_max, y)])
            .collect();
    }
}
