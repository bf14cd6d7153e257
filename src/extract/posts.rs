//! Social post extraction for timeline-style pages.

#[cfg(feature = "browser")]
use std::sync::LazyLock;

#[cfg(feature = "browser")]
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "browser")]
use super::simulate;
#[cfg(feature = "browser")]
use super::Extracted;
#[cfg(feature = "browser")]
use crate::models::ExtractionStrategy;

#[cfg(feature = "browser")]
use chromiumoxide::Page;
#[cfg(feature = "browser")]
use regex::Regex;
#[cfg(feature = "browser")]
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostMetrics {
    pub replies: u64,
    pub reposts: u64,
    pub likes: u64,
    pub views: u64,
}

/// One extracted post. Fields a strategy could not recover stay at their
/// defaults rather than dropping the post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub posted_at: String,
    #[serde(default)]
    pub metrics: PostMetrics,
}

/// Reads fully-hydrated timeline articles.
#[cfg(feature = "browser")]
const PRIMARY_SCRIPT: &str = r#"
(() => {
    try {
        const out = [];
        const tweets = document.querySelectorAll('article[data-testid="tweet"]');
        for (const t of tweets) {
            const author = t.querySelector('[data-testid="User-Name"] a[href^="/"]');
            const text = t.querySelector('[data-testid="tweetText"]');
            const time = t.querySelector('time');
            if (!text) continue;
            const metric = (name) => {
                const el = t.querySelector(`[data-testid="${name}"]`);
                const raw = el ? (el.getAttribute('aria-label') || el.textContent) : '';
                const m = raw.match(/[\d,.]+/);
                return m ? Math.round(parseFloat(m[0].replace(/,/g, ''))) : 0;
            };
            out.push({
                author: author ? author.getAttribute('href').slice(1) : 'unknown',
                text: text.textContent,
                posted_at: time ? (time.getAttribute('datetime') || '') : '',
                metrics: {
                    replies: metric('reply'),
                    reposts: metric('retweet'),
                    likes: metric('like'),
                    views: 0,
                },
            });
        }
        return out.length > 0 ? JSON.stringify(out) : null;
    } catch (e) {
        return null;
    }
})()
"#;

/// Looser pass for partially rendered or reskinned timelines.
#[cfg(feature = "browser")]
const ALTERNATE_SCRIPT: &str = r#"
(() => {
    try {
        const out = [];
        const articles = document.querySelectorAll('article, div[role="article"]');
        for (const a of articles) {
            const text = a.querySelector('div[lang], p');
            if (!text || !text.textContent.trim()) continue;
            const link = a.querySelector('a[href^="/"]');
            out.push({
                author: link ? link.getAttribute('href').split('/')[1] || 'unknown' : 'unknown',
                text: text.textContent.trim(),
                posted_at: '',
                metrics: { replies: 0, reposts: 0, likes: 0, views: 0 },
            });
        }
        return out.length > 0 ? JSON.stringify(out) : null;
    } catch (e) {
        return null;
    }
})()
"#;

/// Run the post fallback chain against a loaded timeline page.
#[cfg(feature = "browser")]
pub async fn extract(
    page: &Page,
    keyword: &str,
    limit: usize,
    today: NaiveDate,
) -> Extracted<Vec<Value>> {
    for (script, strategy) in [
        (PRIMARY_SCRIPT, ExtractionStrategy::PrimarySelectors),
        (ALTERNATE_SCRIPT, ExtractionStrategy::AlternateSelectors),
    ] {
        if let Some(posts) = run_script(page, script, limit).await {
            debug!("'{keyword}': {} posts via {:?}", posts.len(), strategy);
            return Extracted::new(posts, strategy);
        }
    }

    if let Ok(html) = page.content().await {
        let posts = parse_posts_html(&html, limit);
        if !posts.is_empty() {
            debug!("'{keyword}': {} posts via text pattern", posts.len());
            let values = posts
                .into_iter()
                .filter_map(|p| serde_json::to_value(p).ok())
                .collect();
            return Extracted::new(values, ExtractionStrategy::TextPattern);
        }
    }

    debug!("'{keyword}': no live posts, simulating");
    Extracted::new(
        simulate::posts(keyword, limit, today),
        ExtractionStrategy::Simulated,
    )
}

#[cfg(feature = "browser")]
async fn run_script(page: &Page, script: &str, limit: usize) -> Option<Vec<Value>> {
    let raw: Option<String> = page
        .evaluate(script.to_string())
        .await
        .ok()?
        .into_value()
        .ok()?;
    posts_from_json(&serde_json::from_str(&raw?).ok()?, limit)
}

/// Validate a strategy's JSON output into post values, truncated to the
/// requested count. `None` when nothing usable came back.
pub fn posts_from_json(value: &Value, limit: usize) -> Option<Vec<Value>> {
    let items = value.as_array()?;
    let posts: Vec<Value> = items
        .iter()
        .filter(|item| {
            item.get("text")
                .and_then(|t| t.as_str())
                .is_some_and(|t| !t.trim().is_empty())
        })
        .take(limit)
        .cloned()
        .collect();
    if posts.is_empty() {
        None
    } else {
        Some(posts)
    }
}

#[cfg(feature = "browser")]
static TEXT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-testid="tweetText"[^>]*>(?s)(.*?)</div>"#).unwrap()
});

#[cfg(feature = "browser")]
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Last live resort: pull post text blocks straight out of the HTML. Only
/// text and author survive this pass; metrics stay at zero.
#[cfg(feature = "browser")]
pub fn parse_posts_html(html: &str, limit: usize) -> Vec<Post> {
    TEXT_BLOCK
        .captures_iter(html)
        .filter_map(|cap| {
            let text = HTML_TAG.replace_all(&cap[1], "").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(Post {
                author: "unknown".to_string(),
                text,
                posted_at: String::new(),
                metrics: PostMetrics::default(),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn posts_from_json_keeps_only_textful_items() {
        let value = json!([
            {"author": "a", "text": "real post"},
            {"author": "b", "text": "   "},
            {"author": "c"},
            {"author": "d", "text": "another"},
        ]);
        let posts = posts_from_json(&value, 10).unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn posts_from_json_honors_the_limit() {
        let value = json!([
            {"text": "one"}, {"text": "two"}, {"text": "three"},
        ]);
        assert_eq!(posts_from_json(&value, 2).unwrap().len(), 2);
    }

    #[test]
    fn posts_from_json_rejects_empty_input() {
        assert!(posts_from_json(&json!([]), 5).is_none());
        assert!(posts_from_json(&json!({"text": "not an array"}), 5).is_none());
    }

    #[cfg(feature = "browser")]
    #[test]
    fn html_fallback_strips_markup() {
        let html = r#"
            <div data-testid="tweetText" dir="auto"><span>hello</span> <b>world</b></div>
            <div data-testid="tweetText"><span>second post</span></div>
        "#;
        let posts = parse_posts_html(html, 10);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text, "hello world");
        assert_eq!(posts[0].metrics.likes, 0);
    }
}
