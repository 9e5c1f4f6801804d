#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use anyhow::Error as AnyError;
use plotters::prelude::*;
use sampler::{
    report::{Histogram, TimeSeries},
    Output,
};
use std::path::{Path, PathBuf};
use textplots::{Chart, Plot, Shape};

const PRECIP_TITLE: &str = "Annual Precipitation";
const NDVI_TITLE: &str = "Mean NDVI";

/// Draws both reports to the terminal.
pub fn terminal(output: &Output) {
    let series = &output.time_series;
    if series.is_empty() {
        println!("{PRECIP_TITLE}: no data");
    } else {
        println!("{PRECIP_TITLE}");
        let points: Vec<(f32, f32)> = series
            .points
            .iter()
            .map(|&(year, mean)| (year as f32, mean as f32))
            .collect();
        let (x0, x1) = year_range(series);
        let means = Shape::Lines(&points);
        match series.trend {
            Some(trend) => {
                let line =
                    Shape::Continuous(Box::new(move |x: f32| trend.at(f64::from(x)) as f32));
                Chart::new(180, 60, x0 as f32, x1 as f32)
                    .lineplot(&means)
                    .lineplot(&line)
                    .display();
                println!("trend: {:+} per year", trend.slope);
            }
            None => Chart::new(180, 60, x0 as f32, x1 as f32)
                .lineplot(&means)
                .display(),
        }
    }

    match &output.histogram {
        None => println!("{NDVI_TITLE}: no data"),
        Some(hist) => {
            println!("{NDVI_TITLE}");
            let bars: Vec<(f32, f32)> = hist
                .bins()
                .map(|(lo, _, count)| (lo as f32, count as f32))
                .collect();
            let (x0, x1) = padded(hist.min(), hist.max(), 0.05);
            Chart::new(180, 60, x0 as f32, x1 as f32)
                .lineplot(&Shape::Bars(&bars))
                .display();
        }
    }
}

/// Renders both reports as SVG files in `dir`, returning their paths.
pub fn svg(output: &Output, dir: &Path) -> Result<Vec<PathBuf>, AnyError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    if !output.time_series.is_empty() {
        let path = dir.join("annual_precip.svg");
        precip_svg(&output.time_series, &path)?;
        written.push(path);
    }
    if let Some(hist) = &output.histogram {
        let path = dir.join("ndvi_mean.svg");
        ndvi_svg(hist, &path)?;
        written.push(path);
    }
    Ok(written)
}

fn precip_svg(series: &TimeSeries, path: &Path) -> Result<(), AnyError> {
    let (x0, x1) = year_range(series);
    let (lo, hi) = series
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
            (lo.min(v), hi.max(v))
        });
    let y = padded(lo, hi, lo.abs().max(1.0) * 0.05);

    let root = SVGBackend::new(path, (1024, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(PRECIP_TITLE, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y.0..y.1)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Precipitation")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|&(year, mean)| (f64::from(year), mean))
        .collect();
    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))?
        .label("mean")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;

    if let Some(trend) = series.trend {
        chart
            .draw_series(LineSeries::new(
                [(x0, trend.at(x0)), (x1, trend.at(x1))],
                &RED,
            ))?
            .label("trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn ndvi_svg(hist: &Histogram, path: &Path) -> Result<(), AnyError> {
    let x = padded(hist.min(), hist.max(), 0.05);
    let top = hist.counts().iter().copied().max().unwrap_or(0) as f64 * 1.1 + 1.0;

    let root = SVGBackend::new(path, (1024, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(NDVI_TITLE, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x.0..x.1, 0.0..top)?;
    chart
        .configure_mesh()
        .x_desc("NDVI")
        .y_desc("Cells")
        .draw()?;
    chart.draw_series(hist.bins().map(|(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], GREEN.mix(0.7).filled())
    }))?;
    root.present()?;
    Ok(())
}

/// First and last year of `series`, widened when they coincide.
fn year_range(series: &TimeSeries) -> (f64, f64) {
    let first = series.points.first().map_or(0.0, |&(y, _)| f64::from(y));
    let last = series.points.last().map_or(0.0, |&(y, _)| f64::from(y));
    padded(first, last, 1.0)
}

/// Widens `lo..hi` by `pad` on both sides when it spans nothing.
fn padded(lo: f64, hi: f64, pad: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - pad, hi + pad)
    }
}
