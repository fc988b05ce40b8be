//! Day chart: wind speed bars under a temperature line with weather icons

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::models::{DailyForecast, HourlyReading, PresetLocation};
use crate::{Result, WeatherboardError};

const CHART_SIZE: (u32, u32) = (1120, 480);
const WIND_COLOR: RGBColor = RGBColor(0, 200, 230);
const TEMPERATURE_COLOR: RGBColor = RGBColor(255, 140, 0);

fn chart_error<E: std::fmt::Display>(err: E) -> WeatherboardError {
    WeatherboardError::general(format!("Chart rendering failed: {err}"))
}

/// Render one day of hourly readings as an SVG document
pub fn render_day_svg(location: PresetLocation, day: &DailyForecast) -> Result<String> {
    let hours = &day.hours;
    if hours.is_empty() {
        return Err(WeatherboardError::validation(format!(
            "No hourly data for {} on {}",
            location, day.date
        )));
    }

    let n = hours.len() as f32;
    let wind_top = day.wind_speed_max_kmh.max(1.0) * 1.2;
    let temperature_range = (day.temperature_min_c - 2.0)..(day.temperature_max_c + 2.0);
    let labels: Vec<String> = hours.iter().map(HourlyReading::hour_label).collect();
    let label_for = |x: &f32| {
        let index = x.floor().max(0.0) as usize;
        labels.get(index).cloned().unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let caption = format!("{} {}", location, day.date.format("%d/%m"));
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .right_y_label_area_size(56)
            .build_cartesian_2d(0f32..n, 0f32..wind_top)
            .map_err(chart_error)?
            .set_secondary_coord(0f32..n, temperature_range);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(hours.len().min(12))
            .x_label_formatter(&label_for)
            .y_desc("Wind speed (km/h)")
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(chart_error)?;

        chart
            .configure_secondary_axes()
            .y_desc("Temperature (°C)")
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(hours.iter().enumerate().map(|(i, hour)| {
                let x = i as f32;
                Rectangle::new(
                    [(x + 0.15, 0.0), (x + 0.85, hour.wind_speed_kmh)],
                    WIND_COLOR.mix(0.5).filled(),
                )
            }))
            .map_err(chart_error)?;

        chart
            .draw_secondary_series(LineSeries::new(
                hours
                    .iter()
                    .enumerate()
                    .map(|(i, hour)| (i as f32 + 0.5, hour.temperature_c)),
                TEMPERATURE_COLOR.mix(0.7).stroke_width(2),
            ))
            .map_err(chart_error)?;

        // one marker per hour, picked from that hour's weather code
        chart
            .draw_secondary_series(hours.iter().enumerate().map(|(i, hour)| {
                let style = TextStyle::from(("sans-serif", 20).into_font())
                    .pos(Pos::new(HPos::Center, VPos::Center));
                Text::new(
                    hour.icon().glyph().to_string(),
                    (i as f32 + 0.5, hour.temperature_c),
                    style,
                )
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}
