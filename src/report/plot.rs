//! Daily rollup charts

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::report::ReportError;
use crate::summary::DailySummary;

const DIMENSIONS: (u32, u32) = (1280, 960);

const FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a sans-serif font for chart text. Returns false when none could
/// be loaded, in which case charts are drawn without text.
fn ensure_font(configured: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let mut candidates: Vec<PathBuf> =
            configured.map(Path::to_path_buf).into_iter().collect();
        candidates.extend(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font("sans-serif", FontStyle::Normal, bytes) {
                Ok(()) => {
                    log::debug!("Chart font: {}", path.display());
                    return true;
                }
                Err(_) => log::warn!("Unusable font {}", path.display()),
            }
        }

        log::warn!("No TTF font found; charts will have no captions or labels");
        false
    })
}

struct DailySeries<'a> {
    title: &'a str,
    y_desc: &'a str,
    points: Vec<(f64, f64)>,
}

pub fn plot_contact_time(
    summary: &DailySummary,
    path: &Path,
    font: Option<&Path>,
) -> Result<(), ReportError> {
    let Some(first) = summary.by_date.keys().next().copied() else {
        return Ok(());
    };
    let series = DailySeries {
        title: "Daily Ground Contact Time",
        y_desc: "Total contact time (min)",
        points: summary
            .by_date
            .iter()
            .map(|(date, totals)| (day_offset(first, *date), totals.total_contact_s / 60.0))
            .collect(),
    };
    draw(&series, first, path, ensure_font(font))
}

pub fn plot_data_return(
    summary: &DailySummary,
    path: &Path,
    font: Option<&Path>,
) -> Result<(), ReportError> {
    let Some(first) = summary.by_date.keys().next().copied() else {
        return Ok(());
    };
    let series = DailySeries {
        title: "Daily Data Return Estimate",
        y_desc: "Estimated data return (MB)",
        points: summary
            .by_date
            .iter()
            .map(|(date, totals)| (day_offset(first, *date), totals.total_data_mb))
            .collect(),
    };
    draw(&series, first, path, ensure_font(font))
}

fn day_offset(first: NaiveDate, date: NaiveDate) -> f64 {
    (date - first).num_days() as f64
}

fn plot_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Plot(e.to_string())
}

fn draw(
    series: &DailySeries,
    first: NaiveDate,
    path: &Path,
    labelled: bool,
) -> Result<(), ReportError> {
    let last_x = series.points.last().map(|p| p.0).unwrap_or(0.0);
    let x_range = -0.5..last_x + 0.5;
    let y_max = series.points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    let y_range = 0.0..if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let area = BitMapBackend::new(path, DIMENSIONS).into_drawing_area();
    area.fill(&WHITE).map_err(plot_err)?;

    let mut builder = ChartBuilder::on(&area);
    builder.margin(40);
    if labelled {
        builder
            .caption(series.title, ("sans-serif", 40).into_font())
            .x_label_area_size(80)
            .y_label_area_size(90);
    }
    let mut ctx = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    if labelled {
        let label_date = |x: &f64| {
            (first + Duration::days(x.round() as i64))
                .format("%Y-%m-%d")
                .to_string()
        };
        ctx.configure_mesh()
            .x_desc("Date (UTC)")
            .y_desc(series.y_desc)
            .x_labels(series.points.len().clamp(2, 12))
            .x_label_formatter(&label_date)
            .draw()
            .map_err(plot_err)?;
    }

    ctx.draw_series(LineSeries::new(series.points.iter().copied(), &BLUE))
        .map_err(plot_err)?;
    ctx.draw_series(
        series
            .points
            .iter()
            .map(|p| Circle::new(*p, 6, BLUE.filled())),
    )
    .map_err(plot_err)?;

    area.present().map_err(plot_err)?;
    log::debug!("Plotted {} to {}", series.title, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{ContactTotals, DailySummary};
    use rstest::rstest;

    fn summary(days: u32) -> DailySummary {
        let first = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut summary = DailySummary::default();
        for d in 0..days {
            summary.by_date.insert(
                first + Duration::days(d as i64),
                ContactTotals {
                    total_contact_s: 600.0 * (d + 1) as f64,
                    total_data_mb: 420.0 * (d + 1) as f64,
                    passes: d as usize + 1,
                },
            );
        }
        summary
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    fn writes_both_charts(#[case] days: u32) {
        let dir = tempfile::tempdir().unwrap();
        let contact = dir.path().join("daily_contact_time.png");
        let data = dir.path().join("daily_data_return.png");

        plot_contact_time(&summary(days), &contact, None).unwrap();
        plot_data_return(&summary(days), &data, None).unwrap();

        assert!(fs::metadata(&contact).unwrap().len() > 0);
        assert!(fs::metadata(&data).unwrap().len() > 0);
    }

    #[test]
    fn empty_summary_draws_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        plot_contact_time(&DailySummary::default(), &path, None).unwrap();
        assert!(!path.exists());
    }
}
