//! Training and validation curves, accuracy and loss side by side

use super::svg::{
    draw_legend, padded_domain, ticks, Corner, Frame, LegendEntry, Marker, Svg, SERIES_COLORS,
};
use crate::metrics::history::MetricSeries;
use crate::metrics::TrainingHistory;

const PANEL_WIDTH: f64 = 600.0;
const HEIGHT: f64 = 500.0;

/// Render the accuracy and loss panels of `history`
///
/// Epochs are numbered from 1 on the x axis.
pub fn render_svg(history: &TrainingHistory) -> String {
    let mut svg = Svg::new(PANEL_WIDTH * 2.0, HEIGHT);
    for (i, series) in [history.accuracy(), history.loss()].into_iter().enumerate() {
        draw_panel(&mut svg, &series, i as f64 * PANEL_WIDTH);
    }
    svg.finish()
}

fn draw_panel(svg: &mut Svg, series: &MetricSeries<'_>, origin_x: f64) {
    let epochs = series.train.len().max(series.val.len());
    let x_domain = padded_domain([1.0, epochs.max(1) as f64]);
    let y_domain = padded_domain(series.train.iter().chain(series.val).copied());
    let frame = Frame::new(
        origin_x + 80.0,
        50.0,
        PANEL_WIDTH - 110.0,
        HEIGHT - 120.0,
        x_domain,
        y_domain,
    );

    let x_ticks: Vec<f64> = ticks(x_domain.0, x_domain.1, epochs.clamp(2, 8))
        .into_iter()
        .filter(|t| t.fract() == 0.0)
        .collect();
    let y_ticks = ticks(y_domain.0, y_domain.1, 6);
    frame.draw_axes(svg, &x_ticks, &y_ticks, false);

    let labels = [
        format!("Training {}", series.title),
        format!("Validation {}", series.title),
    ];
    for (values, color) in [series.train, series.val].into_iter().zip(SERIES_COLORS) {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(epoch, &v)| frame.point((epoch + 1) as f64, v))
            .collect();
        svg.polyline(&points, color, 2.0);
        if let [only] = points.as_slice() {
            svg.circle(*only, 3.0, color);
        }
    }

    frame.draw_labels(
        svg,
        &format!("Training and Validation {}", series.title),
        "Epoch",
        series.title,
    );

    let entries: Vec<LegendEntry> = labels
        .into_iter()
        .zip(SERIES_COLORS)
        .map(|(label, color)| LegendEntry {
            label,
            color,
            marker: Marker::Line,
        })
        .collect();
    draw_legend(svg, &frame, Corner::UpperRight, &entries);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> TrainingHistory {
        TrainingHistory::new(
            vec![0.61, 0.74, 0.81],
            vec![0.92, 0.55, 0.41],
            vec![0.58, 0.70, 0.72],
            vec![0.95, 0.63, 0.60],
        )
        .unwrap()
    }

    #[test]
    fn test_titles_axes_and_legends() {
        let svg = render_svg(&history());
        assert!(svg.contains("Training and Validation Accuracy"));
        assert!(svg.contains("Training and Validation Loss"));
        assert_eq!(svg.matches(">Epoch<").count(), 2);
        for label in [
            "Training Accuracy",
            "Validation Accuracy",
            "Training Loss",
            "Validation Loss",
        ] {
            assert!(svg.contains(&format!(">{}<", label)), "missing {}", label);
        }
    }

    #[test]
    fn test_one_polyline_per_series() {
        let svg = render_svg(&history());
        assert_eq!(svg.matches("<polyline").count(), 4);
    }

    #[test]
    fn test_different_accuracy_and_loss_lengths() {
        let history =
            TrainingHistory::new(vec![0.5, 0.6, 0.7], vec![1.0], vec![0.4, 0.5, 0.6], vec![1.2])
                .unwrap();
        let svg = render_svg(&history);
        // single-epoch loss series get a marker
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_losses_spanning_the_float_range() {
        let history = TrainingHistory::new(
            vec![0.5],
            vec![1e308, -1e308],
            vec![0.5],
            vec![1e308, -1e308],
        )
        .unwrap();
        let svg = render_svg(&history);
        assert!(svg.contains("Training and Validation Loss"));
        assert!(!svg.contains("NaN"));
        assert_eq!(svg.matches("<polyline").count(), 4);
    }
}
