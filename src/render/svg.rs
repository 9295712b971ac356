//! Minimal SVG drawing primitives shared by the chart renderers

use super::escape;

pub const FONT: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

/// Line colors for the first and second series
pub const SERIES_COLORS: [&str; 2] = ["#1f77b4", "#ff7f0e"];

const AXIS_COLOR: &str = "#000000";
const GRID_COLOR: &str = "#d9d9d9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Text appearance
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: Anchor,
    pub bold: bool,
    /// Rotation in degrees around the text origin
    pub rotate: f64,
    pub fill: &'static str,
}

impl TextStyle {
    pub fn new(size: f64, anchor: Anchor) -> Self {
        Self {
            size,
            anchor,
            bold: false,
            rotate: 0.0,
            fill: AXIS_COLOR,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }
}

/// An SVG document under construction
pub struct Svg {
    width: f64,
    height: f64,
    body: String,
}

impl Svg {
    pub fn new(width: f64, height: f64) -> Self {
        let mut svg = Self {
            width,
            height,
            body: String::new(),
        };
        svg.rect(0.0, 0.0, width, height, "#ffffff", None);
        svg
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(r#" stroke="{}" stroke-width="1""#, s))
            .unwrap_or_default();
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}/>"#,
            x, y, w, h, fill, stroke
        ));
        self.body.push('\n');
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64) {
        self.body.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
            from.0, from.1, to.0, to.1, stroke, width
        ));
        self.body.push('\n');
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        if points.is_empty() {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
            coords.join(" "),
            stroke,
            width
        ));
        self.body.push('\n');
    }

    pub fn circle(&mut self, center: (f64, f64), r: f64, fill: &str) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
            center.0, center.1, r, fill
        ));
        self.body.push('\n');
    }

    /// Draw escaped text
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        let weight = if style.bold { r#" font-weight="bold""# } else { "" };
        let transform = if style.rotate != 0.0 {
            format!(
                r#" transform="rotate({} {:.2} {:.2})""#,
                style.rotate, x, y
            )
        } else {
            String::new()
        };
        self.body.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="{}" dominant-baseline="middle" fill="{}"{}{}>{}</text>"#,
            x,
            y,
            style.size,
            style.anchor.as_str(),
            style.fill,
            weight,
            transform,
            escape(content)
        ));
        self.body.push('\n');
    }

    pub fn finish(self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">
{body}</svg>
"#,
            w = self.width,
            h = self.height,
            font = FONT,
            body = self.body
        )
    }
}

/// Linear map from data space to pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl Scale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        // halved so that domains near f64::MAX do not overflow
        let t = (v * 0.5 - d0 * 0.5) / (d1 * 0.5 - d0 * 0.5);
        r0 + t * (r1 - r0)
    }
}

/// Domain covering `values`, widened when degenerate and padded by 5%
///
/// The result is always finite.
pub fn padded_domain(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let pad = hi * 0.05 - lo * 0.05;
    ((lo - pad).max(f64::MIN), (hi + pad).min(f64::MAX))
}

fn tick_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 + 1e-9 {
        1.0
    } else if normalized <= 2.0 + 1e-9 {
        2.0
    } else if normalized <= 5.0 + 1e-9 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Round tick positions inside `[lo, hi]`
pub fn ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if lo.is_nan() || hi.is_nan() || hi <= lo {
        return vec![lo];
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let span = hi - lo;
    let step = if span.is_finite() {
        tick_step(span, target)
    } else {
        tick_step(hi * 0.5 - lo * 0.5, target) * 2.0
    };
    let start = (lo / step).ceil() * step;
    if !step.is_finite() || step <= 0.0 || !start.is_finite() {
        return vec![lo, hi];
    }
    let eps = step * 1e-9;
    let mut out = Vec::new();
    let mut i = 0;
    loop {
        let v = start + i as f64 * step;
        if v > hi + eps || !v.is_finite() {
            break;
        }
        // avoid "-0"
        out.push(if v.abs() < eps { 0.0 } else { v });
        i += 1;
    }
    out
}

/// Format a tick value with as many decimals as its spacing needs
pub fn tick_label(v: f64, ticks: &[f64]) -> String {
    let step = match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    };
    if step >= 1e6 {
        return format!("{:e}", v);
    }
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()).clamp(0.0, 6.0) as usize
    };
    format!("{:.*}", decimals, v)
}

/// A plotting area with its scales
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x: Scale,
    pub y: Scale,
}

impl Frame {
    pub fn new(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        x_domain: (f64, f64),
        y_domain: (f64, f64),
    ) -> Self {
        Self {
            left,
            top,
            width,
            height,
            x: Scale::new(x_domain, (left, left + width)),
            y: Scale::new(y_domain, (top + height, top)),
        }
    }

    pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.map(x), self.y.map(y))
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Box, tick marks with labels, and optionally grid lines
    pub fn draw_axes(&self, svg: &mut Svg, x_ticks: &[f64], y_ticks: &[f64], grid: bool) {
        let tick_style = TextStyle::new(11.0, Anchor::Middle);

        for &t in x_ticks {
            let x = self.x.map(t);
            if grid {
                svg.line((x, self.top), (x, self.bottom()), GRID_COLOR, 1.0);
            }
            svg.line((x, self.bottom()), (x, self.bottom() + 4.0), AXIS_COLOR, 1.0);
            svg.text(x, self.bottom() + 14.0, &tick_label(t, x_ticks), tick_style);
        }
        for &t in y_ticks {
            let y = self.y.map(t);
            if grid {
                svg.line((self.left, y), (self.right(), y), GRID_COLOR, 1.0);
            }
            svg.line((self.left - 4.0, y), (self.left, y), AXIS_COLOR, 1.0);
            svg.text(
                self.left - 7.0,
                y,
                &tick_label(t, y_ticks),
                TextStyle::new(11.0, Anchor::End),
            );
        }

        svg.rect(self.left, self.top, self.width, self.height, "none", Some(AXIS_COLOR));
    }

    /// Title above the frame and axis labels below and to the left
    pub fn draw_labels(&self, svg: &mut Svg, title: &str, x_label: &str, y_label: &str) {
        let center_x = self.left + self.width / 2.0;
        let center_y = self.top + self.height / 2.0;
        svg.text(center_x, self.top - 14.0, title, TextStyle::new(14.0, Anchor::Middle));
        svg.text(
            center_x,
            self.bottom() + 34.0,
            x_label,
            TextStyle::new(12.0, Anchor::Middle),
        );
        svg.text(
            self.left - 46.0,
            center_y,
            y_label,
            TextStyle::new(12.0, Anchor::Middle).rotated(-90.0),
        );
    }
}

/// How a legend entry is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Line,
    Dot,
}

pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
    pub marker: Marker,
}

/// Corner of the frame the legend is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperRight,
    LowerLeft,
}

pub fn draw_legend(svg: &mut Svg, frame: &Frame, corner: Corner, entries: &[LegendEntry]) {
    if entries.is_empty() {
        return;
    }
    let row_height = 20.0;
    let longest = entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);
    let width = 44.0 + longest as f64 * 6.5;
    let height = 8.0 + row_height * entries.len() as f64;
    let (x, y) = match corner {
        Corner::UpperRight => (frame.right() - width - 8.0, frame.top + 8.0),
        Corner::LowerLeft => (frame.left + 8.0, frame.bottom() - height - 8.0),
    };

    svg.rect(x, y, width, height, "#ffffff", Some("#cccccc"));
    for (i, entry) in entries.iter().enumerate() {
        let row_y = y + 4.0 + row_height * (i as f64 + 0.5);
        match entry.marker {
            Marker::Line => svg.line((x + 8.0, row_y), (x + 30.0, row_y), entry.color, 2.0),
            Marker::Dot => svg.circle((x + 19.0, row_y), 4.5, entry.color),
        }
        svg.text(x + 36.0, row_y, &entry.label, TextStyle::new(11.0, Anchor::Start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_linearly_and_inverts() {
        let s = Scale::new((0.0, 1.0), (100.0, 0.0));
        assert_eq!(s.map(0.0), 100.0);
        assert_eq!(s.map(1.0), 0.0);
        assert_eq!(s.map(0.25), 75.0);
        assert_eq!(Scale::new((2.0, 2.0), (0.0, 10.0)).map(2.0), 5.0);
    }

    #[test]
    fn test_ticks_are_round() {
        let t = ticks(0.0, 1.0, 5);
        assert_eq!(t.len(), 6);
        for (got, want) in t.iter().zip([0.0, 0.2, 0.4, 0.6, 0.8, 1.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert_eq!(ticks(0.0, 9.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(ticks(3.0, 3.0, 5), vec![3.0]);
    }

    #[test]
    fn test_tick_labels_follow_spacing() {
        let t = ticks(0.0, 1.0, 5);
        assert_eq!(tick_label(t[3], &t), "0.6");
        let t = ticks(0.0, 9.0, 5);
        assert_eq!(tick_label(4.0, &t), "4");
    }

    #[test]
    fn test_padded_domain() {
        assert_eq!(padded_domain(vec![]), (0.0, 1.0));
        let (lo, hi) = padded_domain(vec![1.0, 1.0]);
        assert!(lo < 1.0 && hi > 1.0);
        let (lo, hi) = padded_domain(vec![0.0, 10.0]);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_huge_spans_stay_finite_and_terminate() {
        let (lo, hi) = padded_domain(vec![1e308, -1e308]);
        assert!(lo.is_finite() && hi.is_finite());
        assert!(lo <= -1e308 && hi >= 1e308);

        let (lo, hi) = padded_domain(vec![f64::MAX, f64::MIN]);
        assert_eq!((lo, hi), (f64::MIN, f64::MAX));

        let t = ticks(lo, hi, 6);
        assert!(!t.is_empty() && t.len() <= 20);
        assert!(t.iter().all(|v| v.is_finite() && *v >= lo && *v <= hi));
        assert!(tick_label(t[0], &t).contains('e'));

        let t = ticks(-1e308, 1e308, 6);
        assert!(!t.is_empty() && t.len() <= 20);

        assert!(ticks(f64::NEG_INFINITY, 1.0, 5).is_empty());

        let s = Scale::new((lo, hi), (0.0, 100.0));
        assert!((s.map(0.0) - 50.0).abs() < 1e-9);
        assert_eq!(s.map(hi), 100.0);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut svg = Svg::new(10.0, 10.0);
        svg.text(1.0, 1.0, "a < b & c", TextStyle::new(10.0, Anchor::Start));
        let doc = svg.finish();
        assert!(doc.contains("a &lt; b &amp; c"));
        assert!(doc.starts_with("<?xml"));
        assert!(doc.trim_end().ends_with("</svg>"));
    }
}
