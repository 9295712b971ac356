//! Precision-recall curve chart

use super::svg::{draw_legend, ticks, Corner, Frame, LegendEntry, Marker, Svg, SERIES_COLORS};
use crate::metrics::PrCurve;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARKER_COLOR: &str = "#d62728";

/// Legend label of the curve, e.g. `PR curve (area = 0.87)`
pub fn curve_label(curve: &PrCurve) -> String {
    format!("PR curve (area = {:.2})", curve.auc)
}

/// Legend label of the operating point, e.g. `Optimal threshold: 0.42`
pub fn threshold_label(curve: &PrCurve) -> String {
    format!("Optimal threshold: {:.2}", curve.optimal_threshold)
}

/// Render the curve with its operating point, recall on x and precision on y
pub fn render_svg(curve: &PrCurve) -> String {
    let mut svg = Svg::new(WIDTH, HEIGHT);
    let frame = Frame::new(
        90.0,
        50.0,
        WIDTH - 130.0,
        HEIGHT - 120.0,
        (-0.05, 1.05),
        (-0.05, 1.05),
    );

    let grid = ticks(0.0, 1.0, 5);
    frame.draw_axes(&mut svg, &grid, &grid, true);

    let points: Vec<(f64, f64)> = curve
        .recall
        .iter()
        .zip(&curve.precision)
        .map(|(&r, &p)| frame.point(r, p))
        .collect();
    svg.polyline(&points, SERIES_COLORS[0], 2.0);

    let (r, p) = curve.optimal_point();
    svg.circle(frame.point(r, p), 6.0, MARKER_COLOR);

    frame.draw_labels(&mut svg, "Precision-Recall curve", "Recall", "Precision");
    draw_legend(
        &mut svg,
        &frame,
        Corner::LowerLeft,
        &[
            LegendEntry {
                label: curve_label(curve),
                color: SERIES_COLORS[0],
                marker: Marker::Line,
            },
            LegendEntry {
                label: threshold_label(curve),
                color: MARKER_COLOR,
                marker: Marker::Dot,
            },
        ],
    );

    svg.finish()
}
