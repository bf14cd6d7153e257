//! Trend analysis over stored records: summary statistics, direction, and
//! a short naive forecast.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::StoredTrend;

/// Forecast steps, as multipliers on the latest observed value.
const FORECAST_FACTORS: [f64; 3] = [1.1, 1.2, 1.3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
}

/// Per-record statistics. The shape of the stored data decides the kind:
/// series payloads get distribution stats, post lists get volume stats.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatKind {
    Series {
        mean: f64,
        std_dev: f64,
        latest: f64,
        direction: TrendDirection,
    },
    Posts {
        count: usize,
        engagement: u64,
    },
    Unreadable {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordStats {
    pub keyword: String,
    pub source: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub stats: StatKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub stats: Vec<KeywordStats>,
    /// Three-step forecast per keyword, from its most recent series.
    pub predictions: BTreeMap<String, [f64; 3]>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Analyze stored trends. Entries whose data cannot be read contribute an
/// `Unreadable` stat instead of aborting the run.
pub fn analyze(trends: &[StoredTrend]) -> Analysis {
    let mut stats = Vec::with_capacity(trends.len());
    let mut predictions = BTreeMap::new();

    for trend in trends {
        let stat = match &trend.data {
            serde_json::Value::Object(map) => {
                let values: Vec<f64> = map
                    .values()
                    .filter_map(|v| v.as_f64())
                    .collect();
                if values.is_empty() {
                    StatKind::Unreadable {
                        error: "series payload holds no numeric points".to_string(),
                    }
                } else {
                    // Input rows are newest-first; first matching series wins
                    predictions
                        .entry(trend.keyword.clone())
                        .or_insert_with(|| forecast(*values.last().unwrap_or(&0.0)));
                    series_stats(&values)
                }
            }
            serde_json::Value::Array(items) => StatKind::Posts {
                count: items.len(),
                engagement: items.iter().map(engagement).sum(),
            },
            other => StatKind::Unreadable {
                error: format!("unexpected payload shape: {}", shape_name(other)),
            },
        };

        stats.push(KeywordStats {
            keyword: trend.keyword.clone(),
            source: trend.source.clone(),
            timestamp: trend.timestamp.clone(),
            stats: stat,
        });
    }

    Analysis { stats, predictions }
}

fn series_stats(values: &[f64]) -> StatKind {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let latest = *values.last().unwrap_or(&0.0);

    let direction = if latest >= mean {
        TrendDirection::Rising
    } else {
        TrendDirection::Falling
    };

    StatKind::Series {
        mean,
        std_dev: variance.sqrt(),
        latest,
        direction,
    }
}

fn forecast(latest: f64) -> [f64; 3] {
    [
        latest * FORECAST_FACTORS[0],
        latest * FORECAST_FACTORS[1],
        latest * FORECAST_FACTORS[2],
    ]
}

/// Sum of whatever engagement counters a post payload carries, across the
/// shapes the different sources produce.
fn engagement(item: &serde_json::Value) -> u64 {
    const COUNTERS: [&str; 11] = [
        "likes", "reposts", "replies", "score", "points", "num_comments", "comments", "views",
        "shares", "save_count", "review_count",
    ];

    let direct: u64 = COUNTERS
        .iter()
        .filter_map(|key| item.get(key).and_then(|v| v.as_u64()))
        .sum();

    let nested: u64 = item
        .get("metrics")
        .map(|metrics| {
            COUNTERS
                .iter()
                .filter_map(|key| metrics.get(key).and_then(|v| v.as_u64()))
                .sum()
        })
        .unwrap_or(0);

    direct + nested
}

fn shape_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(keyword: &str, data: serde_json::Value) -> StoredTrend {
        StoredTrend {
            keyword: keyword.to_string(),
            source: "google_trends".to_string(),
            data,
            timestamp: "2026-08-29 12:00:00".to_string(),
        }
    }

    #[test]
    fn series_stats_match_known_values() {
        let analysis = analyze(&[stored(
            "espresso",
            json!({"2026-08-27": 10, "2026-08-28": 20, "2026-08-29": 30}),
        )]);

        let StatKind::Series { mean, std_dev, latest, direction } = &analysis.stats[0].stats
        else {
            panic!("expected series stats");
        };
        assert!((mean - 20.0).abs() < 1e-9);
        // population std dev of [10, 20, 30]
        assert!((std_dev - 8.164965809).abs() < 1e-6);
        assert!((latest - 30.0).abs() < 1e-9);
        assert_eq!(*direction, TrendDirection::Rising);
    }

    #[test]
    fn forecast_scales_the_latest_point() {
        let analysis = analyze(&[stored("rust", json!({"2026-08-29": 50}))]);
        let forecast = analysis.predictions.get("rust").unwrap();
        assert!((forecast[0] - 55.0).abs() < 1e-9);
        assert!((forecast[1] - 60.0).abs() < 1e-9);
        assert!((forecast[2] - 65.0).abs() < 1e-9);
    }

    #[test]
    fn below_mean_latest_is_falling() {
        let analysis = analyze(&[stored(
            "fax machines",
            json!({"a": 90, "b": 50, "c": 10}),
        )]);
        let StatKind::Series { direction, .. } = &analysis.stats[0].stats else {
            panic!("expected series stats");
        };
        assert_eq!(*direction, TrendDirection::Falling);
    }

    #[test]
    fn post_payloads_yield_volume_stats() {
        let analysis = analyze(&[stored(
            "espresso",
            json!([
                {"text": "a", "metrics": {"likes": 100, "replies": 5}},
                {"text": "b", "score": 40, "num_comments": 10},
            ]),
        )]);

        let StatKind::Posts { count, engagement } = &analysis.stats[0].stats else {
            panic!("expected post stats");
        };
        assert_eq!(*count, 2);
        assert_eq!(*engagement, 155);
    }

    #[test]
    fn unreadable_payloads_do_not_abort_the_run() {
        let analysis = analyze(&[
            stored("ok", json!({"2026-08-29": 42})),
            stored("broken", json!("oops")),
        ]);
        assert_eq!(analysis.stats.len(), 2);
        assert!(matches!(
            analysis.stats[1].stats,
            StatKind::Unreadable { .. }
        ));
    }
}
