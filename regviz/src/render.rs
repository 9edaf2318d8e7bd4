use plotters::prelude::*;
use tracing::info;

use crate::api::RegressionPlot;
use crate::config::MarkerSymbol;
use crate::error::RegvizError;
use crate::geometry::GroupOverlay;

const PLOT_WIDTH: u32 = 800;
const PLOT_HEIGHT: u32 = 600;
const PLOT_MARGIN: i32 = 25;
const FONT_SIZE_TITLE: u32 = 20;
const ERROR_BAR_CAP: u32 = 6;

fn expand_range(min_val: f64, max_val: f64, pct: f64) -> (f64, f64) {
    if (max_val - min_val).abs() < 1e-9 {
        return (min_val - 1.0, max_val + 1.0);
    }
    let pad = (max_val - min_val) * pct;
    (min_val - pad, max_val + pad)
}

fn marker_element<'a, DB: DrawingBackend + 'a>(
    pos: (f64, f64),
    marker: MarkerSymbol,
    color: RGBColor,
) -> DynElement<'a, DB, (f64, f64)> {
    match marker {
        MarkerSymbol::Circle => Circle::new(pos, 4, color.filled()).into_dyn(),
        MarkerSymbol::Cross => Cross::new(pos, 4, color.stroke_width(2)).into_dyn(),
        MarkerSymbol::TriangleUp => TriangleMarker::new(pos, 5, color.filled()).into_dyn(),
        MarkerSymbol::Square => {
            (EmptyElement::at(pos) + Rectangle::new([(-3, -3), (3, 3)], color.filled())).into_dyn()
        }
        MarkerSymbol::Diamond => (EmptyElement::at(pos)
            + Polygon::new(vec![(0, -5), (5, 0), (0, 5), (-5, 0)], color.filled()))
        .into_dyn(),
        MarkerSymbol::TriangleDown => (EmptyElement::at(pos)
            + Polygon::new(vec![(-4, -3), (4, -3), (0, 4)], color.filled()))
        .into_dyn(),
        MarkerSymbol::TriangleLeft => (EmptyElement::at(pos)
            + Polygon::new(vec![(-4, 0), (3, -4), (3, 4)], color.filled()))
        .into_dyn(),
        MarkerSymbol::TriangleRight => (EmptyElement::at(pos)
            + Polygon::new(vec![(4, 0), (-3, -4), (-3, 4)], color.filled()))
        .into_dyn(),
    }
}

/// Collect every finite coordinate the figure will show, error-bar
/// extents included, so the axes cover all of it.
fn data_extent(plot: &RegressionPlot) -> Option<(f64, f64, f64, f64)> {
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();

    for line in &plot.lines {
        xs.extend([line.start.0, line.end.0]);
        ys.extend([line.start.1, line.end.1]);
    }
    for cloud in &plot.points {
        for &(x, y) in &cloud.points {
            if !x.is_nan() && !y.is_nan() {
                xs.push(x);
                ys.push(y);
            }
        }
    }
    match &plot.overlay {
        Some(GroupOverlay::Binned { points, x_sem, y_sem, .. }) => {
            for (i, &(x, y)) in points.iter().enumerate() {
                if x.is_nan() || y.is_nan() {
                    continue;
                }
                let x_err = if x_sem[i].is_nan() { 0.0 } else { x_sem[i] };
                let y_err = if y_sem[i].is_nan() { 0.0 } else { y_sem[i] };
                xs.extend([x - x_err, x + x_err]);
                ys.extend([y - y_err, y + y_err]);
            }
        }
        Some(GroupOverlay::Averaged { start, end, .. }) => {
            xs.extend([start.0, end.0]);
            ys.extend([start.1, end.1]);
        }
        None => {}
    }

    let min_x = xs.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);

    if min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite() {
        Some((min_x, max_x, min_y, max_y))
    } else {
        None
    }
}

/// Draw an assembled [`RegressionPlot`] to a bitmap file. Purely a
/// rendering surface: every geometric and stylistic decision was already
/// made by [`regression_plot`](crate::regression_plot).
pub fn render_png(
    plot: &RegressionPlot,
    output_path: &str,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), RegvizError> {
    let Some((min_x, max_x, min_y, max_y)) = data_extent(plot) else {
        info!("no finite geometry to draw, skipping {}", output_path);
        return Ok(());
    };
    let (x_lo, x_hi) = expand_range(min_x, max_x, 0.05);
    let (y_lo, y_hi) = expand_range(min_y, max_y, 0.05);

    let root = BitMapBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", FONT_SIZE_TITLE))
        .margin(PLOT_MARGIN)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(render_err)?;

    for line in &plot.lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(
                vec![line.start, line.end],
                color.stroke_width(2),
            ))
            .map_err(render_err)?
            .label(format!("subject {}", line.subject + 1))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    for cloud in &plot.points {
        // `draw_series` would force a `'static` backend through its HRTB on
        // `DynElement`, so draw each marker directly on the plotting area;
        // `draw_series` is the same per-element loop internally.
        for &p in cloud
            .points
            .iter()
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        {
            chart
                .plotting_area()
                .draw(&marker_element(p, cloud.marker, cloud.color))
                .map_err(render_err)?;
        }
    }

    match &plot.overlay {
        Some(GroupOverlay::Binned { points, x_sem, y_sem, line_color, point_color }) => {
            let trend: Vec<(f64, f64)> = points
                .iter()
                .copied()
                .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                .collect();
            chart
                .draw_series(LineSeries::new(trend.clone(), line_color.stroke_width(3)))
                .map_err(render_err)?
                .label("group mean")
                .legend({
                    let color = *line_color;
                    move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                    }
                });

            for (i, &(x, y)) in points.iter().enumerate() {
                if x.is_nan() || y.is_nan() {
                    continue;
                }
                if !y_sem[i].is_nan() {
                    chart
                        .draw_series(std::iter::once(ErrorBar::new_vertical(
                            x,
                            y - y_sem[i],
                            y,
                            y + y_sem[i],
                            point_color.stroke_width(2),
                            ERROR_BAR_CAP,
                        )))
                        .map_err(render_err)?;
                }
                if !x_sem[i].is_nan() {
                    chart
                        .draw_series(std::iter::once(ErrorBar::new_horizontal(
                            y,
                            x - x_sem[i],
                            x,
                            x + x_sem[i],
                            point_color.stroke_width(2),
                            ERROR_BAR_CAP,
                        )))
                        .map_err(render_err)?;
                }
                chart
                    .draw_series(std::iter::once(Circle::new((x, y), 4, point_color.filled())))
                    .map_err(render_err)?;
            }
        }
        Some(GroupOverlay::Averaged { start, end, color, .. }) => {
            let color = *color;
            chart
                .draw_series(LineSeries::new(vec![*start, *end], color.stroke_width(4)))
                .map_err(render_err)?
                .label("group trend")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(4))
                });
        }
        None => {}
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("regression figure saved to {}", output_path);
    Ok(())
}

fn render_err<E: std::fmt::Display>(e: E) -> RegvizError {
    RegvizError::Render(e.to_string())
}
