//! Interest-over-time extraction for trend pages.
//!
//! Strategies, in order: the page's own widget state, a DOM scan of the
//! rendered chart, a raw-text pattern pass over the HTML, and finally the
//! simulated series. The async chain needs a live page; the parsing
//! helpers are pure so they can be tested without one.

use std::collections::BTreeMap;
#[cfg(feature = "browser")]
use std::sync::LazyLock;

use chrono::NaiveDate;
#[cfg(feature = "browser")]
use chrono::Datelike;
use serde_json::Value;

#[cfg(feature = "browser")]
use super::simulate;
#[cfg(feature = "browser")]
use super::Extracted;
#[cfg(feature = "browser")]
use crate::models::ExtractionStrategy;
#[cfg(feature = "browser")]
use crate::models::RelatedQuery;

#[cfg(feature = "browser")]
use chromiumoxide::Page;
#[cfg(feature = "browser")]
use regex::Regex;
#[cfg(feature = "browser")]
use tracing::debug;

/// Daily interest values, 0-100.
pub type TrendSeries = BTreeMap<NaiveDate, u32>;

/// Reads the interest series out of the page's internal widget state, the
/// shape the explore view keeps its chart data in.
#[cfg(feature = "browser")]
const WIDGET_STATE_SCRIPT: &str = r#"
(() => {
    try {
        const out = { series: {}, related: [] };
        const widgets = document.querySelectorAll('trends-widget, .fe-line-chart');
        for (const w of widgets) {
            const ng = w.__ngContext__ || w._widget || null;
            const points = ng && ng.lineData ? ng.lineData : null;
            if (points) {
                for (const p of points) {
                    if (p.date && typeof p.value === 'number') {
                        out.series[p.date] = Math.round(p.value);
                    }
                }
            }
        }
        const related = document.querySelectorAll('.fe-related-queries .item');
        for (const item of related) {
            const label = item.querySelector('.label-text');
            const value = item.querySelector('.rising-value, .progress-value');
            if (label) {
                out.related.push({
                    query: label.textContent.trim(),
                    value: value ? parseInt(value.textContent.replace(/\D/g, ''), 10) || 0 : 0,
                });
            }
        }
        return Object.keys(out.series).length > 0 ? JSON.stringify(out) : null;
    } catch (e) {
        return null;
    }
})()
"#;

/// Walks the rendered SVG chart instead, reading the per-point aria labels.
#[cfg(feature = "browser")]
const CHART_DOM_SCRIPT: &str = r#"
(() => {
    try {
        const out = {};
        const points = document.querySelectorAll('svg [aria-label], .line-chart-content [aria-label]');
        for (const p of points) {
            const label = p.getAttribute('aria-label') || '';
            const m = label.match(/(\d{4}-\d{2}-\d{2})[^\d]+(\d{1,3})/);
            if (m) {
                out[m[1]] = parseInt(m[2], 10);
            }
        }
        return Object.keys(out).length > 0 ? JSON.stringify(out) : null;
    } catch (e) {
        return null;
    }
})()
"#;

/// Run the full fallback chain against a loaded trends page. Never fails;
/// the terminal strategy is simulation.
#[cfg(feature = "browser")]
pub async fn extract(
    page: &Page,
    keyword: &str,
    today: NaiveDate,
) -> Extracted<(TrendSeries, Vec<RelatedQuery>)> {
    if let Some((series, related)) = try_widget_state(page).await {
        if series_has_signal(&series) {
            debug!("'{keyword}': series from widget state ({} points)", series.len());
            return Extracted::new((series, related), ExtractionStrategy::PrimarySelectors);
        }
    }

    if let Some(series) = try_chart_dom(page).await {
        if series_has_signal(&series) {
            debug!("'{keyword}': series from chart DOM ({} points)", series.len());
            return Extracted::new((series, Vec::new()), ExtractionStrategy::AlternateSelectors);
        }
    }

    if let Ok(html) = page.content().await {
        if let Some(series) = parse_series_text(&html, today) {
            if series_has_signal(&series) {
                debug!("'{keyword}': series from raw text ({} points)", series.len());
                return Extracted::new((series, Vec::new()), ExtractionStrategy::TextPattern);
            }
        }
    }

    debug!("'{keyword}': no live series, simulating");
    Extracted::new(
        (
            simulate::trend_series(keyword, today),
            simulate::related_queries(keyword),
        ),
        ExtractionStrategy::Simulated,
    )
}

#[cfg(feature = "browser")]
async fn try_widget_state(page: &Page) -> Option<(TrendSeries, Vec<RelatedQuery>)> {
    let raw: Option<String> = page
        .evaluate(WIDGET_STATE_SCRIPT.to_string())
        .await
        .ok()?
        .into_value()
        .ok()?;
    let value: Value = serde_json::from_str(&raw?).ok()?;

    let series = series_from_json(value.get("series")?)?;
    let related = value
        .get("related")
        .and_then(|r| serde_json::from_value(r.clone()).ok())
        .unwrap_or_default();
    Some((series, related))
}

#[cfg(feature = "browser")]
async fn try_chart_dom(page: &Page) -> Option<TrendSeries> {
    let raw: Option<String> = page
        .evaluate(CHART_DOM_SCRIPT.to_string())
        .await
        .ok()?
        .into_value()
        .ok()?;
    let value: Value = serde_json::from_str(&raw?).ok()?;
    series_from_json(&value)
}

/// Convert a `{ "YYYY-MM-DD": value }` JSON object into a series. `None`
/// when nothing parses.
pub fn series_from_json(value: &Value) -> Option<TrendSeries> {
    let map = value.as_object()?;
    let mut series = TrendSeries::new();
    for (key, val) in map {
        let Ok(day) = key.parse::<NaiveDate>() else {
            continue;
        };
        let Some(point) = val.as_u64() else { continue };
        series.insert(day, point.min(100) as u32);
    }
    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

#[cfg(feature = "browser")]
static ISO_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})\D{1,8}(\d{1,3})\b").unwrap()
});

#[cfg(feature = "browser")]
static SHORT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}) (Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\D{1,8}(\d{1,3})\b")
        .unwrap()
});

/// Scrape date/value pairs out of raw page text. Handles ISO dates and the
/// short "29 Aug" form the chart tooltips use.
#[cfg(feature = "browser")]
pub fn parse_series_text(text: &str, today: NaiveDate) -> Option<TrendSeries> {
    let mut series = TrendSeries::new();

    for cap in ISO_PAIR.captures_iter(text) {
        if let (Ok(day), Ok(value)) = (cap[1].parse::<NaiveDate>(), cap[2].parse::<u32>()) {
            if value <= 100 {
                series.insert(day, value);
            }
        }
    }

    if series.is_empty() {
        for cap in SHORT_PAIR.captures_iter(text) {
            let month = match &cap[2] {
                "Jan" => 1, "Feb" => 2, "Mar" => 3, "Apr" => 4,
                "May" => 5, "Jun" => 6, "Jul" => 7, "Aug" => 8,
                "Sep" => 9, "Oct" => 10, "Nov" => 11, "Dec" => 12,
                _ => continue,
            };
            let (Ok(dom), Ok(value)) = (cap[1].parse::<u32>(), cap[3].parse::<u32>()) else {
                continue;
            };
            if value > 100 {
                continue;
            }
            // Short dates carry no year, assume the most recent occurrence
            let year = if month > today.month() { today.year() - 1 } else { today.year() };
            if let Some(day) = NaiveDate::from_ymd_opt(year, month, dom) {
                series.insert(day, value);
            }
        }
    }

    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

/// A series with every point at zero carries no information and should not
/// stop the fallback chain.
pub fn series_has_signal(series: &TrendSeries) -> bool {
    series.values().any(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn series_from_json_parses_dated_points() {
        let value = json!({
            "2026-08-27": 55,
            "2026-08-28": 61,
            "not-a-date": 40,
            "2026-08-29": 300,
        });
        let series = series_from_json(&value).unwrap();
        assert_eq!(series.len(), 3);
        // Out-of-range points are clamped to the chart scale
        assert_eq!(series[&NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()], 100);
    }

    #[test]
    fn series_from_json_rejects_empty_and_non_objects() {
        assert!(series_from_json(&json!({})).is_none());
        assert!(series_from_json(&json!([1, 2, 3])).is_none());
        assert!(series_from_json(&json!({"junk": "x"})).is_none());
    }

    #[cfg(feature = "browser")]
    #[test]
    fn text_pattern_finds_iso_pairs() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let html = "<td>2026-08-27</td><td>42</td><td>2026-08-28</td><td>57</td>";
        let series = parse_series_text(html, today).unwrap();
        assert_eq!(series[&NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()], 57);
    }

    #[cfg(feature = "browser")]
    #[test]
    fn text_pattern_resolves_short_dates_to_recent_year() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        // August is after February, so it must resolve to last year
        let series = parse_series_text("28 Aug: 63", today).unwrap();
        assert_eq!(series[&NaiveDate::from_ymd_opt(2025, 8, 28).unwrap()], 63);
    }

    #[test]
    fn flat_zero_series_has_no_signal() {
        let mut series = TrendSeries::new();
        series.insert(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(), 0);
        assert!(!series_has_signal(&series));
        series.insert(NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(), 7);
        assert!(series_has_signal(&series));
    }
}
