use plotters::prelude::*;

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = CHART_WIDTH / 2;

#[derive(thiserror::Error, Debug)]
#[error("chart rendering failed: {0}")]
pub struct ChartError(String);

fn chart_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError(e.to_string())
}

/// Whole francs with thousands separators, e.g. `750,000`.
pub fn format_thousands(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_rwf(value: f64) -> String {
    format!("{} RWF", format_thousands(value))
}

/// Render labelled bars as an SVG document.
///
/// Bars whose label starts with `Your` are highlighted.
pub fn render_bar_chart(bars: &[(String, f64)]) -> Result<String, ChartError> {
    if bars.is_empty() {
        return Err(ChartError("nothing to draw".to_owned()));
    }

    let y_max = bars.iter().map(|(_, v)| *v).fold(0., f64::max) * 1.15;
    let y_max = if y_max > 0. { y_max } else { 1. };
    let bar_col = RGBColor(56, 110, 180);
    let own_col = RGBColor(230, 120, 40);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(80)
            .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..y_max)
            .map_err(chart_err)?;

        let x_fmt = |x: &SegmentValue<usize>| match x {
            SegmentValue::CenterOf(i) => bars.get(*i).map(|(l, _)| l.clone()).unwrap_or_default(),
            _ => String::new(),
        };
        let y_fmt = |y: &f64| format_thousands(*y);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .y_desc("RWF / month")
            .draw()
            .map_err(chart_err)?;

        ctx.draw_series(bars.iter().enumerate().map(|(i, (label, v))| {
            let col = if label.starts_with("Your") { own_col } else { bar_col };
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.), (SegmentValue::Exact(i + 1), *v)],
                col.filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))
        .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}
