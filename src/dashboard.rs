//! HTML rendering of the dashboard page

use chrono::NaiveDate;

use crate::models::{DailyForecast, PresetLocation, WeeklyForecast};

pub const PAGE_TITLE: &str = "Weather forecast for the week";

/// Everything the page needs to render
pub struct DashboardView<'a> {
    pub location: PresetLocation,
    pub forecast: Option<&'a WeeklyForecast>,
    /// Day whose chart is shown; the first day when unset or unknown
    pub selected_day: Option<NaiveDate>,
    /// Inline SVG chart for the selected day
    pub chart_svg: Option<&'a str>,
    /// Message shown in the error banner
    pub error: Option<String>,
}

impl DashboardView<'_> {
    /// The day that will be rendered
    #[must_use]
    pub fn active_day(&self) -> Option<&DailyForecast> {
        active_day(self.forecast?, self.selected_day)
    }
}

/// `selected` if the forecast has it, otherwise the first day
#[must_use]
pub fn active_day(
    forecast: &WeeklyForecast,
    selected: Option<NaiveDate>,
) -> Option<&DailyForecast> {
    selected
        .and_then(|date| forecast.day(date))
        .or_else(|| forecast.days.first())
}

/// Escape text for inclusion in HTML element content or attribute values
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_sidebar(out: &mut String, current: PresetLocation) {
    out.push_str("<aside class=\"sidebar\"><h2>Locations</h2><ul>");
    for location in PresetLocation::ALL {
        let class = if location == current { " class=\"active\"" } else { "" };
        out.push_str(&format!(
            "<li><a{class} href=\"/?location={}\">{}</a></li>",
            location.slug(),
            location.display_name()
        ));
    }
    out.push_str("</ul></aside>");
}

fn render_tabs(out: &mut String, forecast: &WeeklyForecast, active: NaiveDate) {
    out.push_str("<nav class=\"tabs\">");
    for day in &forecast.days {
        let class = if day.date == active { "tab active" } else { "tab" };
        out.push_str(&format!(
            "<a class=\"{class}\" href=\"/?location={}&amp;day={}\">{}</a>",
            forecast.location.slug(),
            day.date.format("%Y-%m-%d"),
            day.tab_label()
        ));
    }
    out.push_str("</nav>");
}

fn render_day(out: &mut String, day: &DailyForecast, chart_svg: Option<&str>) {
    let icon = day.icon();
    out.push_str(&format!(
        "<section class=\"day\"><h3>This is the date: {}</h3>\
         <p class=\"summary\"><span class=\"icon icon-{}\">{}</span> {} &middot; \
         {:.1}&deg;C to {:.1}&deg;C &middot; wind up to {:.1} km/h</p>",
        day.tab_label(),
        icon.name(),
        icon.glyph(),
        escape_html(day.weather_code.description()),
        day.temperature_min_c,
        day.temperature_max_c,
        day.wind_speed_max_kmh,
    ));
    if let Some(svg) = chart_svg {
        out.push_str("<figure class=\"chart\">");
        out.push_str(svg);
        out.push_str("</figure>");
    }
    out.push_str("</section>");
}

/// Render the full dashboard page
#[must_use]
pub fn render_page(view: &DashboardView<'_>) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{PAGE_TITLE}</title>\
         <link rel=\"stylesheet\" href=\"/static/dashboard.css\"></head><body>"
    ));
    render_sidebar(&mut out, view.location);

    out.push_str(&format!(
        "<main><h1>{PAGE_TITLE}</h1><h2>{}</h2>\
         <form method=\"post\" action=\"/locations/{}/refresh\">\
         <button type=\"submit\">Refresh</button></form>",
        view.location.display_name(),
        view.location.slug()
    ));

    if let Some(error) = &view.error {
        out.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>",
            escape_html(error)
        ));
    }

    match (view.forecast, view.active_day()) {
        (Some(forecast), Some(day)) => {
            render_tabs(&mut out, forecast, day.date);
            render_day(&mut out, day, view.chart_svg);
            out.push_str(&format!(
                "<footer>Retrieved {}</footer>",
                forecast.retrieved_at.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        _ => out.push_str("<p class=\"empty\">No forecast available yet.</p>"),
    }

    out.push_str("</main></body></html>");
    out
}
