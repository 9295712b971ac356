//! 2x2 grid of confusion matrices
//!
//! Columns hold the true label and rows the predicted label, so each column
//! sums to 100% for a non-empty class.

use super::svg::{Anchor, Svg, TextStyle};
use crate::metrics::{ConfusionPanel, ConfusionReport};
use crate::models::{title_case, Label};

const PANEL_WIDTH: f64 = 650.0;
const PANEL_HEIGHT: f64 = 400.0;
const CELL: f64 = 130.0;
const GRID_COLUMNS: usize = 2;

/// Stops of the purple color scale, from 0% to 100%
const PURPLES: [(u8, u8, u8); 3] = [(252, 251, 253), (158, 154, 200), (63, 0, 125)];

/// Panel title, e.g. `Spanish - Accuracy: 83.33%`
pub fn panel_title(panel: &ConfusionPanel) -> String {
    format!(
        "{} - Accuracy: {:.2}%",
        title_case(&panel.language),
        panel.rounded_accuracy()
    )
}

/// Cell text with one decimal, e.g. `66.7%`
pub fn cell_label(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Render every panel of `report` into one SVG document
pub fn render_svg(report: &ConfusionReport) -> String {
    let rows = report.panels.len().div_ceil(GRID_COLUMNS).max(1);
    let mut svg = Svg::new(
        PANEL_WIDTH * GRID_COLUMNS as f64,
        PANEL_HEIGHT * rows as f64,
    );

    for (i, panel) in report.panels.iter().enumerate() {
        let origin_x = (i % GRID_COLUMNS) as f64 * PANEL_WIDTH;
        let origin_y = (i / GRID_COLUMNS) as f64 * PANEL_HEIGHT;
        draw_panel(&mut svg, panel, origin_x, origin_y);
    }

    svg.finish()
}

fn draw_panel(svg: &mut Svg, panel: &ConfusionPanel, origin_x: f64, origin_y: f64) {
    let side = CELL * Label::ALL.len() as f64;
    let left = origin_x + (PANEL_WIDTH - side) / 2.0;
    let top = origin_y + 70.0;

    svg.text(
        left + side / 2.0,
        origin_y + 36.0,
        &panel_title(panel),
        TextStyle::new(15.0, Anchor::Middle).bold(),
    );

    for truth in Label::ALL {
        for pred in Label::ALL {
            let x = left + truth.index() as f64 * CELL;
            let y = top + pred.index() as f64 * CELL;
            let pct = panel.percentages[truth.index()][pred.index()];
            svg.rect(x, y, CELL, CELL, &purple(pct), Some("#ffffff"));
            svg.text(
                x + CELL / 2.0,
                y + CELL / 2.0,
                &cell_label(pct),
                TextStyle::new(14.0, Anchor::Middle),
            );
        }
    }

    let tick_style = TextStyle::new(11.0, Anchor::Middle);
    for label in Label::ALL {
        let offset = label.index() as f64 * CELL + CELL / 2.0;
        svg.text(left + offset, top + side + 14.0, label.name(), tick_style);
        svg.text(
            left - 10.0,
            top + offset,
            label.name(),
            TextStyle::new(11.0, Anchor::End),
        );
    }

    svg.text(
        left + side / 2.0,
        top + side + 36.0,
        "True Labels",
        TextStyle::new(12.0, Anchor::Middle),
    );
    svg.text(
        left - 90.0,
        top + side / 2.0,
        "Predicted Labels",
        TextStyle::new(12.0, Anchor::Middle).rotated(-90.0),
    );
}

/// Hex color for a percentage on the purple scale
fn purple(percent: f64) -> String {
    let t = (percent / 100.0).clamp(0.0, 1.0) * (PURPLES.len() - 1) as f64;
    let i = (t.floor() as usize).min(PURPLES.len() - 2);
    let f = t - i as f64;
    let (a, b) = (PURPLES[i], PURPLES[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
