//! Deterministic simulated data, the terminal fallback of every extraction
//! chain.
//!
//! Output is a pure function of the keyword and the current date: the same
//! keyword scraped twice on the same day yields identical data, different
//! keywords diverge. That makes degraded runs reproducible and lets the
//! records be told apart from live data only by their recorded strategy.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::models::{RelatedQuery, SourceKind};

/// Days of history in a simulated interest series.
pub const SERIES_DAYS: i64 = 90;

/// Stable per-keyword seed.
pub fn keyword_seed(keyword: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    keyword.to_lowercase().hash(&mut hasher);
    hasher.finish()
}

fn seeded_rng(keyword: &str, today: NaiveDate) -> StdRng {
    let day = today.num_days_from_ce() as u64;
    StdRng::seed_from_u64(keyword_seed(keyword) ^ day.wrapping_mul(0x9e37_79b9))
}

/// 91 daily interest points ending today, scaled 0-100 like the live chart.
pub fn trend_series(keyword: &str, today: NaiveDate) -> BTreeMap<NaiveDate, u32> {
    let seed = keyword_seed(keyword);
    let mut rng = seeded_rng(keyword, today);

    let base = 40.0 + (seed % 30) as f64;
    let drift = if seed % 2 == 0 { 0.08 } else { -0.05 };

    let mut series = BTreeMap::new();
    for offset in 0..=SERIES_DAYS {
        let day = today - Duration::days(SERIES_DAYS - offset);
        let t = offset as f64;

        let monthly = 12.0 * (t * std::f64::consts::TAU / 30.0).sin();
        let weekly = 5.0 * (t * std::f64::consts::TAU / 7.0).sin();
        let noise = rng.random_range(-5.0..=5.0);

        let value = (base + drift * t + monthly + weekly + noise).clamp(0.0, 100.0);
        series.insert(day, value.round() as u32);
    }
    series
}

/// Related queries a trend page would surface alongside the keyword.
pub fn related_queries(keyword: &str) -> Vec<RelatedQuery> {
    let seed = keyword_seed(keyword);
    const SUFFIXES: [&str; 6] = ["price", "review", "2025", "near me", "vs", "how to"];

    SUFFIXES
        .iter()
        .enumerate()
        .map(|(i, suffix)| RelatedQuery {
            query: format!("{keyword} {suffix}"),
            value: 100 - (i as i64 * 12) - ((seed >> i) % 7) as i64,
        })
        .collect()
}

/// Simulated social posts mentioning the keyword.
pub fn posts(keyword: &str, count: usize, today: NaiveDate) -> Vec<Value> {
    let mut rng = seeded_rng(keyword, today);
    const TEMPLATES: [&str; 5] = [
        "Just tried {}, honestly impressed",
        "Is anyone else seeing {} everywhere lately?",
        "Hot take: {} is overrated",
        "Finally got around to {} and it was worth it",
        "{} thread, what you need to know",
    ];

    (0..count)
        .map(|i| {
            let template = TEMPLATES[i % TEMPLATES.len()];
            let days_ago = rng.random_range(0..7);
            let likes: u64 = rng.random_range(10..5000);
            let reposts: u64 = rng.random_range(0..likes.max(1) / 2 + 1);
            let replies: u64 = rng.random_range(0..200);

            json!({
                "author": format!("user_{:04}", rng.random_range(0u32..10_000)),
                "text": template.replace("{}", keyword),
                "posted_at": (today - Duration::days(days_ago)).to_string(),
                "metrics": {
                    "replies": replies,
                    "reposts": reposts,
                    "likes": likes,
                    "views": likes * rng.random_range(8..40),
                },
            })
        })
        .collect()
}

/// Simulated payload in the shape the given source's live extraction would
/// produce.
pub fn source_payload(kind: SourceKind, keyword: &str, limit: usize, today: NaiveDate) -> Value {
    let mut rng = seeded_rng(keyword, today);

    match kind {
        SourceKind::GoogleTrends => {
            let series: BTreeMap<String, u32> = trend_series(keyword, today)
                .into_iter()
                .map(|(day, value)| (day.to_string(), value))
                .collect();
            json!(series)
        }
        SourceKind::Twitter => Value::Array(posts(keyword, limit, today)),
        SourceKind::Reddit => Value::Array(
            (0..limit)
                .map(|i| {
                    json!({
                        "title": format!("{keyword} discussion #{}", i + 1),
                        "subreddit": format!("r/{}", keyword.replace(' ', "")),
                        "score": rng.random_range(5u32..20_000),
                        "num_comments": rng.random_range(0u32..800),
                        "created": (today - Duration::days(rng.random_range(0..7))).to_string(),
                    })
                })
                .collect(),
        ),
        SourceKind::Hackernews => Value::Array(
            (0..limit)
                .map(|i| {
                    json!({
                        "title": format!("Show HN: {keyword} ({})", i + 1),
                        "points": rng.random_range(1u32..1200),
                        "num_comments": rng.random_range(0u32..400),
                        "url": format!("https://example.com/{}", keyword.replace(' ', "-")),
                        "created_at": (today - Duration::days(rng.random_range(0..14))).to_string(),
                    })
                })
                .collect(),
        ),
        SourceKind::Instagram => Value::Array(
            (0..limit)
                .map(|_| {
                    json!({
                        "author": format!("insta_{:04}", rng.random_range(0u32..10_000)),
                        "caption": format!("#{}", keyword.replace(' ', "")),
                        "likes": rng.random_range(50u32..100_000),
                        "comments": rng.random_range(0u32..2_000),
                    })
                })
                .collect(),
        ),
        SourceKind::Youtube => Value::Array(
            (0..limit)
                .map(|i| {
                    json!({
                        "title": format!("{keyword} explained (part {})", i + 1),
                        "channel": format!("channel_{:03}", rng.random_range(0u32..1_000)),
                        "views": rng.random_range(1_000u64..5_000_000),
                        "likes": rng.random_range(10u32..200_000),
                    })
                })
                .collect(),
        ),
        SourceKind::News => Value::Array(
            (0..limit)
                .map(|i| {
                    json!({
                        "headline": format!("What {keyword} means for the industry ({})", i + 1),
                        "outlet": format!("outlet_{:02}", rng.random_range(0u32..50)),
                        "published": (today - Duration::days(rng.random_range(0..3))).to_string(),
                    })
                })
                .collect(),
        ),
        SourceKind::Pinterest => {
            const CATEGORIES: [&str; 7] =
                ["fashion", "home", "food", "travel", "art", "design", "photography"];
            Value::Array(
                (0..limit)
                    .map(|i| {
                        json!({
                            "title": format!("{keyword} ideas ({})", i + 1),
                            "category": CATEGORIES[rng.random_range(0..CATEGORIES.len())],
                            "save_count": rng.random_range(100u32..10_000),
                            "comment_count": rng.random_range(0u32..500),
                            "link_clicks": rng.random_range(10u32..5_000),
                        })
                    })
                    .collect(),
            )
        }
        SourceKind::Linkedin => {
            const INDUSTRIES: [&str; 7] = [
                "Technology", "Finance", "Healthcare", "Education", "Marketing", "Retail",
                "Manufacturing",
            ];
            const TITLES: [&str; 7] =
                ["Manager", "Director", "CEO", "Developer", "Analyst", "Specialist", "Consultant"];
            Value::Array(
                (0..limit)
                    .map(|i| {
                        json!({
                            "title": format!("Lessons from {keyword} ({})", i + 1),
                            "author": format!("professional_{:04}", rng.random_range(0u32..10_000)),
                            "author_title": format!(
                                "{} at {} Company",
                                TITLES[rng.random_range(0..TITLES.len())],
                                INDUSTRIES[rng.random_range(0..INDUSTRIES.len())],
                            ),
                            "likes": rng.random_range(10u32..1_000),
                            "comments": rng.random_range(0u32..200),
                            "shares": rng.random_range(0u32..100),
                        })
                    })
                    .collect(),
            )
        }
        SourceKind::Amazon => Value::Array(
            (0..limit)
                .map(|i| {
                    let price = round2(rng.random_range(10.0..1000.0));
                    let markup = rng.random_range(1.1..1.5);
                    json!({
                        "title": format!("{keyword} ({})", i + 1),
                        "brand": format!("brand_{:02}", rng.random_range(0u32..50)),
                        "price": price,
                        "old_price": round2(price * markup),
                        "rating": round1(rng.random_range(1.0..5.0)),
                        "review_count": rng.random_range(0u32..5_000),
                    })
                })
                .collect(),
        ),
        SourceKind::Ebay => {
            const CONDITIONS: [&str; 4] = ["New", "Used", "Refurbished", "For parts"];
            const LISTING_TYPES: [&str; 3] = ["Auction", "Buy It Now", "Classified Ad"];
            Value::Array(
                (0..limit)
                    .map(|i| {
                        let listing_type = LISTING_TYPES[rng.random_range(0..LISTING_TYPES.len())];
                        let bids = if listing_type == "Auction" {
                            rng.random_range(0u32..30)
                        } else {
                            0
                        };
                        json!({
                            "title": format!("{keyword} listing ({})", i + 1),
                            "condition": CONDITIONS[rng.random_range(0..CONDITIONS.len())],
                            "price": round2(rng.random_range(5.0..500.0)),
                            "shipping": round2(rng.random_range(0.0..20.0)),
                            "listing_type": listing_type,
                            "bids": bids,
                            "seller_rating": round1(rng.random_range(1.0..100.0)),
                        })
                    })
                    .collect(),
            )
        }
        SourceKind::Otto => Value::Array(
            (0..limit)
                .map(|i| {
                    let price = round2(rng.random_range(10.0..1000.0));
                    let discount = rng.random_range(0.7..0.95);
                    let sale_price = if rng.random_range(0..2) == 0 {
                        json!(round2(price * discount))
                    } else {
                        Value::Null
                    };
                    json!({
                        "title": format!("{keyword} ({})", i + 1),
                        "brand": format!("marke_{:02}", rng.random_range(0u32..50)),
                        "price": price,
                        "sale_price": sale_price,
                        "rating": round1(rng.random_range(1.0..5.0)),
                        "review_count": rng.random_range(0u32..1_000),
                        "delivery_days": rng.random_range(1u32..10),
                    })
                })
                .collect(),
        ),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
