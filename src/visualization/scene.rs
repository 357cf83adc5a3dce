//! Renderer-independent figure description
//!
//! Figures are built from analysis products and flattened into coloured
//! vertex lists that any backend can upload as-is. Coordinates are in
//! normalized device space, -1.0 to 1.0 on both axes.

use super::colormap::viridis;
use crate::analysis::{mode_switch_markers, Spectrogram, Spectrum};
use crate::config::PwmConfig;
use crate::gen::Waveform;

/// Upper frequency shown on spectral plots
pub const MAX_PLOT_HZ: f32 = 30_000.0;

/// Columns kept when decimating long traces
pub const TRACE_COLUMNS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const TRACE_BLUE: Color = Color::new(0.25, 0.45, 1.0);
    pub const TRACE_GREEN: Color = Color::new(0.2, 0.8, 0.35);
    pub const TRACE_PURPLE: Color = Color::new(0.65, 0.35, 0.95);
    pub const TRACE_RED: Color = Color::new(1.0, 0.3, 0.3);
    pub const MARKER_RED: Color = Color::new(0.9, 0.2, 0.2);
    pub const MARKER_BLUE: Color = Color::new(0.35, 0.55, 1.0);
    pub const MARKER_GREEN: Color = Color::new(0.35, 0.9, 0.45);
    pub const FRAME: Color = Color::new(0.5, 0.5, 0.6);
    pub const GRID: Color = Color::new(0.2, 0.2, 0.26);
}

/// Axis-aligned rectangle in device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    const LEFT: f32 = -0.94;
    const RIGHT: f32 = 0.96;
    const TOP: f32 = 0.92;
    const BOTTOM: f32 = -0.94;
    const H_GAP: f32 = 0.08;
    const V_GAP: f32 = 0.12;

    /// Cell of a `rows` x `cols` grid, spanning `col_span` columns
    pub fn cell(row: usize, col: usize, rows: usize, cols: usize, col_span: usize) -> Self {
        let rows = rows.max(1) as f32;
        let cols = cols.max(1) as f32;
        let span = col_span.max(1) as f32;
        let cell_w = (Self::RIGHT - Self::LEFT - (cols - 1.0) * Self::H_GAP) / cols;
        let cell_h = (Self::TOP - Self::BOTTOM - (rows - 1.0) * Self::V_GAP) / rows;

        let x0 = Self::LEFT + col as f32 * (cell_w + Self::H_GAP);
        let y1 = Self::TOP - row as f32 * (cell_h + Self::V_GAP);
        Self {
            x0,
            y0: y1 - cell_h,
            x1: x0 + span * cell_w + (span - 1.0) * Self::H_GAP,
            y1,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Polyline in data coordinates
    Trace { points: Vec<[f32; 2]>, color: Color },
    /// Vertical marker spanning the panel height
    Marker { x: f32, color: Color, style: LineStyle },
    /// Colour-mapped grid, `values[column][row]`
    Heatmap {
        x_edges: Vec<f32>,
        y_edges: Vec<f32>,
        values: Vec<Vec<f32>>,
        range: (f32, f32),
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub bounds: Rect,
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
    pub elements: Vec<Element>,
}

impl Panel {
    pub fn new(title: impl Into<String>, bounds: Rect, x_range: (f32, f32), y_range: (f32, f32)) -> Self {
        Self {
            title: title.into(),
            bounds,
            x_range,
            y_range,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Map a data point into the panel, clamped to its bounds
    pub fn to_ndc(&self, x: f32, y: f32) -> [f32; 2] {
        let fx = normalize(x, self.x_range).clamp(0.0, 1.0);
        let fy = normalize(y, self.y_range).clamp(0.0, 1.0);
        [
            self.bounds.x0 + fx * self.bounds.width(),
            self.bounds.y0 + fy * self.bounds.height(),
        ]
    }

    fn contains_x(&self, x: f32) -> bool {
        x >= self.x_range.0 && x <= self.x_range.1
    }

    fn tessellate_into(&self, list: &mut DrawList) {
        let b = self.bounds;

        for i in 1..5 {
            let fx = b.x0 + b.width() * i as f32 / 5.0;
            let fy = b.y0 + b.height() * i as f32 / 5.0;
            list.segment([fx, b.y0], [fx, b.y1], Color::GRID);
            list.segment([b.x0, fy], [b.x1, fy], Color::GRID);
        }

        for element in &self.elements {
            match element {
                Element::Trace { points, color } => {
                    if points.len() >= 2 {
                        let strip = points
                            .iter()
                            .map(|p| vertex(self.to_ndc(p[0], p[1]), *color))
                            .collect();
                        list.strips.push(strip);
                    }
                }
                Element::Marker { x, color, style } => {
                    if self.contains_x(*x) {
                        let [nx, _] = self.to_ndc(*x, self.y_range.0);
                        list.vertical(nx, b.y0, b.y1, *color, *style);
                    }
                }
                Element::Heatmap {
                    x_edges,
                    y_edges,
                    values,
                    range,
                } => {
                    for (col, column) in values.iter().enumerate().take(x_edges.len().saturating_sub(1)) {
                        for (row, &v) in column.iter().enumerate().take(y_edges.len().saturating_sub(1)) {
                            let color = viridis(normalize(v, *range));
                            let p0 = self.to_ndc(x_edges[col], y_edges[row]);
                            let p1 = self.to_ndc(x_edges[col + 1], y_edges[row + 1]);
                            list.quad(p0, p1, color);
                        }
                    }
                }
            }
        }

        // Frame last so it sits on top of heatmaps
        list.segment([b.x0, b.y0], [b.x1, b.y0], Color::FRAME);
        list.segment([b.x1, b.y0], [b.x1, b.y1], Color::FRAME);
        list.segment([b.x1, b.y1], [b.x0, b.y1], Color::FRAME);
        list.segment([b.x0, b.y1], [b.x0, b.y0], Color::FRAME);
    }
}

/// Vertex layout: x, y, r, g, b
pub type Vertex = [f32; 5];

fn vertex(p: [f32; 2], c: Color) -> Vertex {
    [p[0], p[1], c.r, c.g, c.b]
}

/// Flattened geometry ready for upload
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawList {
    /// Filled triangles, three vertices each
    pub triangles: Vec<Vertex>,
    /// Independent segments, two vertices each
    pub lines: Vec<Vertex>,
    /// Connected polylines
    pub strips: Vec<Vec<Vertex>>,
}

impl DrawList {
    fn segment(&mut self, a: [f32; 2], b: [f32; 2], color: Color) {
        self.lines.push(vertex(a, color));
        self.lines.push(vertex(b, color));
    }

    fn vertical(&mut self, x: f32, y0: f32, y1: f32, color: Color, style: LineStyle) {
        let (dash, gap) = match style {
            LineStyle::Solid => {
                self.segment([x, y0], [x, y1], color);
                return;
            }
            LineStyle::Dashed => ((y1 - y0) / 40.0, (y1 - y0) / 60.0),
            LineStyle::Dotted => ((y1 - y0) / 150.0, (y1 - y0) / 100.0),
        };
        let mut y = y0;
        while y < y1 {
            self.segment([x, y], [x, (y + dash).min(y1)], color);
            y += dash + gap;
        }
    }

    fn quad(&mut self, p0: [f32; 2], p1: [f32; 2], color: Color) {
        let corners = [
            [p0[0], p0[1]],
            [p1[0], p0[1]],
            [p1[0], p1[1]],
            [p0[0], p0[1]],
            [p1[0], p1[1]],
            [p0[0], p1[1]],
        ];
        self.triangles
            .extend(corners.iter().map(|&p| vertex(p, color)));
    }

    /// Total vertices across all strips
    pub fn strip_vertex_count(&self) -> usize {
        self.strips.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
    /// Text the renderer cannot draw, printed alongside the window
    pub captions: Vec<String>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
            captions: Vec::new(),
        }
    }

    pub fn tessellate(&self) -> DrawList {
        let mut list = DrawList::default();
        for panel in &self.panels {
            panel.tessellate_into(&mut list);
        }
        list
    }
}

fn normalize(v: f32, range: (f32, f32)) -> f32 {
    let span = range.1 - range.0;
    if span.abs() < f32::EPSILON {
        0.5
    } else {
        (v - range.0) / span
    }
}

/// Reduce a long trace to at most `columns` min/max pairs, keeping its envelope.
/// `x_scale` converts the x axis units (e.g. 1000.0 for seconds to ms).
pub fn decimate_min_max<X: Copy + Into<f64>>(
    xs: &[X],
    ys: &[f32],
    columns: usize,
    x_scale: f64,
) -> Vec<[f32; 2]> {
    let n = xs.len().min(ys.len());
    let point = |i: usize| [(xs[i].into() * x_scale) as f32, ys[i]];

    if columns == 0 || n <= columns * 2 {
        return (0..n).map(point).collect();
    }

    let bucket = (n + columns - 1) / columns;
    let mut out = Vec::with_capacity(columns * 2);
    let mut start = 0;
    while start < n {
        let end = (start + bucket).min(n);
        let (mut lo, mut hi) = (start, start);
        for i in start..end {
            if ys[i] < ys[lo] {
                lo = i;
            }
            if ys[i] > ys[hi] {
                hi = i;
            }
        }
        let x = (xs[start].into() * x_scale) as f32;
        let (first, second) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        out.push([x, ys[first]]);
        if first != second {
            out.push([x, ys[second]]);
        }
        start = end;
    }
    out
}

/// Cell edges around evenly or unevenly spaced centres
pub fn edges_from_centers(centers: &[f32]) -> Vec<f32> {
    match centers.len() {
        0 => Vec::new(),
        1 => vec![centers[0] - 0.5, centers[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
            for pair in centers.windows(2) {
                edges.push((pair[0] + pair[1]) / 2.0);
            }
            edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
            edges
        }
    }
}

fn mode_label(config: &PwmConfig, mode: usize) -> String {
    format!("{:.0} Hz", config.mode_frequencies[mode % config.num_modes()])
}

/// Waveform overview, two zoom levels and the FFT spectrum
pub fn analysis_figure(config: &PwmConfig, waveform: &Waveform, spectrum: &Spectrum) -> Figure {
    let mut figure = Figure::new("Variable Duty Cycle PWM - Waveform Analysis");
    let markers = mode_switch_markers(config);
    let duration = waveform.duration() as f32;

    let mut full = Panel::new(
        format!("Complete {:.1} s PWM waveform with mode transitions", duration),
        Rect::cell(0, 0, 3, 2, 2),
        (0.0, duration),
        (-0.1, 1.1),
    );
    full.push(Element::Trace {
        points: decimate_min_max(&waveform.times, &waveform.samples, TRACE_COLUMNS, 1.0),
        color: Color::TRACE_BLUE,
    });
    for marker in &markers {
        full.push(Element::Marker {
            x: marker.time_s as f32,
            color: Color::MARKER_RED,
            style: LineStyle::Dashed,
        });
    }
    figure.panels.push(full);

    for (col, (window_s, color)) in [(0.010, Color::TRACE_GREEN), (0.001, Color::TRACE_PURPLE)]
        .into_iter()
        .enumerate()
    {
        let (times, samples) = waveform.head(window_s);
        let window_ms = (window_s * 1000.0) as f32;
        let mut zoom = Panel::new(
            format!("Zoomed view: first {} ms", window_ms),
            Rect::cell(1, col, 3, 2, 1),
            (0.0, window_ms),
            (-0.1, 1.1),
        );
        zoom.push(Element::Trace {
            points: decimate_min_max(times, samples, TRACE_COLUMNS, 1000.0),
            color,
        });
        figure.panels.push(zoom);
    }

    let (freqs, mags) = spectrum.up_to(MAX_PLOT_HZ);
    let (lo, hi) = mags
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &m| (lo.min(m), hi.max(m)));
    let y_range = if lo.is_finite() && hi.is_finite() {
        let pad = (hi - lo).max(1.0) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (-100.0, 0.0)
    };
    let mut fft = Panel::new(
        "FFT magnitude (dB), carrier and modulation frequencies marked",
        Rect::cell(2, 0, 3, 2, 2),
        (0.0, MAX_PLOT_HZ),
        y_range,
    );
    fft.push(Element::Trace {
        points: decimate_min_max(freqs, mags, TRACE_COLUMNS, 1.0),
        color: Color::TRACE_RED,
    });
    fft.push(Element::Marker {
        x: config.carrier_hz as f32,
        color: Color::MARKER_BLUE,
        style: LineStyle::Dashed,
    });
    for &freq in &config.mode_frequencies {
        fft.push(Element::Marker {
            x: freq as f32,
            color: Color::MARKER_GREEN,
            style: LineStyle::Dotted,
        });
    }
    figure.panels.push(fft);

    figure.captions.push("Top: full waveform (s), red dashes mark mode switches".to_string());
    figure.captions.push("Middle: first 10 ms and first 1 ms (ms)".to_string());
    figure.captions.push(format!(
        "Bottom: FFT 0-{:.0} Hz, blue = {:.0} Hz carrier, green = modulation rates",
        MAX_PLOT_HZ, config.carrier_hz
    ));
    for marker in &markers {
        figure
            .captions
            .push(format!("  {:.2} s -> {}", marker.time_s, mode_label(config, marker.mode)));
    }
    figure
}

/// Spectrogram heatmap with mode-switch markers
pub fn spectrogram_figure(config: &PwmConfig, spectrogram: &Spectrogram) -> Figure {
    let mut figure = Figure::new("Spectrogram - Frequency Content Over Time");
    let bins = spectrogram.bins_up_to(MAX_PLOT_HZ);

    let values: Vec<Vec<f32>> = spectrogram
        .power_db
        .iter()
        .map(|column| column[..bins.min(column.len())].to_vec())
        .collect();
    let range = values
        .iter()
        .flatten()
        .fold(None, |range: Option<(f32, f32)>, &p| match range {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
        .unwrap_or((-100.0, 0.0));

    let x_edges = edges_from_centers(&spectrogram.times);
    let y_edges = edges_from_centers(&spectrogram.frequencies[..bins]);
    let x_range = match (x_edges.first(), x_edges.last()) {
        (Some(&a), Some(&b)) => (a.max(0.0), b),
        _ => (0.0, config.duration_s as f32),
    };

    let mut panel = Panel::new(
        "Spectrogram (dB), 0-30 kHz",
        Rect::cell(0, 0, 1, 1, 1),
        x_range,
        (0.0, MAX_PLOT_HZ),
    );
    panel.push(Element::Heatmap {
        x_edges,
        y_edges,
        values,
        range,
    });

    let markers = mode_switch_markers(config);
    for marker in &markers {
        panel.push(Element::Marker {
            x: marker.time_s as f32,
            color: Color::MARKER_RED,
            style: LineStyle::Dashed,
        });
    }
    figure.panels.push(panel);

    figure.captions.push(format!(
        "Power range {:.1} dB to {:.1} dB (viridis, dark = low)",
        range.0, range.1
    ));
    for marker in &markers {
        figure
            .captions
            .push(format!("  {:.2} s -> {}", marker.time_s, mode_label(config, marker.mode)));
    }
    figure
}
