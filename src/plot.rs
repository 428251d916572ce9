use std::path::Path;

use plotters::prelude::PathElement;
use plotters::prelude::*;

use crate::doppler::velocity_offset_kms;
use crate::error::DynError;
use crate::integrator::WindowSummary;

const PLOT_FONT_SCALE: f64 = 1.2;
/// Vertical offset between successive spectrum traces, in dB.
const TRACE_OFFSET_DB: f64 = 0.1;
/// Floor added before taking the logarithm so empty bins stay finite.
const LOG_FLOOR: f64 = 1e-12;

fn scaled_font_size(base: i32) -> i32 {
    ((base as f64) * PLOT_FONT_SCALE).round() as i32
}

fn scaled_area_size(base: i32) -> i32 {
    ((base as f64) * PLOT_FONT_SCALE).round() as i32
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return None;
    }
    if lo == hi {
        Some((lo - 0.5, hi + 0.5))
    } else {
        Some((lo, hi))
    }
}

/// Trace of window `index` (0-based) as plotted: dB plus a stacking offset.
pub fn stacked_db_trace(values: &[f64], index: usize) -> Vec<f64> {
    let offset = index as f64 * TRACE_OFFSET_DB;
    values
        .iter()
        .map(|&v| 10.0 * (v + LOG_FLOOR).log10() + offset)
        .collect()
}

/// rms power against elapsed time.
pub fn plot_power_series(windows: &[WindowSummary], filename: &Path) -> Result<(), DynError> {
    if windows.is_empty() {
        return Err("No integration windows to plot".into());
    }
    let times: Vec<f64> = windows.iter().map(|w| w.elapsed_seconds).collect();
    let powers: Vec<f64> = windows.iter().map(|w| w.rms_power).collect();

    let (x_min, x_max) =
        finite_range(times.iter().copied()).ok_or("Failed to determine time range")?;
    let (y_min, y_max) =
        finite_range(powers.iter().copied()).ok_or("No finite power values to plot")?;

    let root = BitMapBackend::new(filename, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(scaled_area_size(40))
        .y_label_area_size(scaled_area_size(60))
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Power")
        .label_style(("sans-serif", scaled_font_size(20)).into_font())
        .axis_desc_style(("sans-serif", scaled_font_size(24)).into_font())
        .light_line_style(WHITE.mix(0.0))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            times.iter().zip(powers.iter()).map(|(x, y)| (*x, *y)),
            &BLUE,
        ))?
        .label("Power")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", scaled_font_size(20)).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}

/// One stacked dB trace per window against frequency offset from the center
/// (kHz), with the matching radial velocity offset on the top axis.
///
/// `axis_hz` holds the absolute frequency of each column in Hz.
pub fn plot_spectrum_stack(
    windows: &[WindowSummary],
    axis_hz: &[f64],
    center_hz: f64,
    filename: &Path,
) -> Result<(), DynError> {
    if windows.is_empty() {
        return Err("No integration windows to plot".into());
    }
    if axis_hz.is_empty() {
        return Err("No frequency bins to plot".into());
    }
    for window in windows {
        if window.rms_spectrum.len() != axis_hz.len() {
            return Err("Spectrum length does not match frequency axis".into());
        }
    }

    let offsets_khz: Vec<f64> = axis_hz.iter().map(|f| (f - center_hz) / 1.0e3).collect();
    // Natural order wraps negative offsets to the end; draw in ascending order.
    let mut order: Vec<usize> = (0..offsets_khz.len()).collect();
    order.sort_by(|&a, &b| offsets_khz[a].total_cmp(&offsets_khz[b]));

    let traces: Vec<Vec<f64>> = windows
        .iter()
        .enumerate()
        .map(|(idx, w)| stacked_db_trace(&w.rms_spectrum, idx))
        .collect();

    let (x_min, x_max) = finite_range(offsets_khz.iter().copied())
        .ok_or("Failed to determine frequency range")?;
    let (y_min, y_max) = finite_range(traces.iter().flatten().copied())
        .ok_or("No finite spectrum values to plot")?;

    let root = BitMapBackend::new(filename, (1280, 960)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(scaled_area_size(40))
        .top_x_label_area_size(scaled_area_size(40))
        .y_label_area_size(scaled_area_size(60))
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(format!(
            "Delta Frequency (kHz) from Central Frequency: {:.6} MHz",
            center_hz / 1.0e6
        ))
        .y_desc("Relative Power (dB + offset)")
        .label_style(("sans-serif", scaled_font_size(20)).into_font())
        .axis_desc_style(("sans-serif", scaled_font_size(24)).into_font())
        .light_line_style(WHITE.mix(0.0))
        .draw()?;

    let palette = [BLUE, GREEN, RED, MAGENTA, CYAN, BLACK];
    for (idx, (window, trace)) in windows.iter().zip(traces.iter()).enumerate() {
        let color = palette[idx % palette.len()];
        chart
            .draw_series(LineSeries::new(
                order.iter().map(|&k| (offsets_khz[k], trace[k])),
                &color,
            ))?
            .label(format!("{:.1}s", window.elapsed_seconds))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", scaled_font_size(16)).into_font())
        .draw()?;

    // A zero center has no velocity scale.
    if center_hz.is_finite() && center_hz != 0.0 {
        let v_min = velocity_offset_kms(x_min * 1.0e3, center_hz);
        let v_max = velocity_offset_kms(x_max * 1.0e3, center_hz);
        let mut dual = chart.set_secondary_coord(v_min..v_max, y_min..y_max);
        dual.configure_secondary_axes()
            .x_desc("Δv (km/s)")
            .label_style(("sans-serif", scaled_font_size(20)).into_font())
            .axis_desc_style(("sans-serif", scaled_font_size(24)).into_font())
            .draw()?;
    }

    root.present()?;
    Ok(())
}
