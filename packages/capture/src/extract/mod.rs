//! Extraction engine: DOM snapshot in, ordered post records out.
//!
//! Pure and synchronous - no I/O, no clock reads, no global state. The
//! engine performs no deduplication; re-announcing already-known ids is
//! the relay hub's problem and is handled idempotently there.
//!
//! Deliberately narrow: one fixed source layout, probed through its
//! `data-testid` markers. This is not a selector-resilience framework.

mod article;
mod identity;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

pub use identity::normalize_handle;

use crate::types::{PageSnapshot, PostRecord};

lazy_static! {
    static ref ARTICLE: Selector = Selector::parse("article[data-testid='tweet']").unwrap();
    static ref OVERFLOW: Selector = Selector::parse("[data-testid='caret']").unwrap();
}

/// Extract every capturable post from a snapshot, in document order.
///
/// A record survives only if its author is the resolved viewer (handles
/// compared case-insensitively) or it is flagged as a repost. With the
/// viewer unknown, only reposts survive. With the viewer known but the
/// snapshot taken off the viewer's own profile page, nothing is extracted
/// at all - other people's timelines are not scraped.
pub fn scrape_snapshot(snapshot: &PageSnapshot) -> Vec<PostRecord> {
    let document = Html::parse_document(&snapshot.html);
    let viewer = identity::resolve_viewer_handle(&document);

    match &viewer {
        Some(handle) => {
            if !on_own_profile(&snapshot.path, handle) {
                warn!(
                    path = %snapshot.path,
                    viewer = %handle,
                    "not on the viewer's profile page; skipping scrape"
                );
                return Vec::new();
            }
            debug!(viewer = %handle, "resolved viewer handle");
        }
        None => warn!("could not resolve viewer handle; keeping reposts only"),
    }

    let articles: Vec<ElementRef<'_>> = document.select(&ARTICLE).collect();
    debug!(count = articles.len(), "visible articles");

    let mut records = Vec::new();
    for (index, article) in articles.iter().enumerate() {
        // No overflow affordance means no delete path later; not worth
        // capturing.
        if article.select(&OVERFLOW).next().is_none() {
            continue;
        }

        let Some(mut record) = article::extract_article(*article, snapshot.captured_at) else {
            continue;
        };

        let own_post = viewer
            .as_deref()
            .map(|handle| normalize_handle(&record.author_handle) == handle)
            .unwrap_or(false);
        if !own_post && !record.is_repost {
            continue;
        }

        // Adjacent articles ride along as inert display context, whether or
        // not they would pass the inclusion filter themselves.
        if index > 0 {
            record.thread_parent = context_snapshot(articles[index - 1], snapshot.captured_at);
        }
        if index + 1 < articles.len() {
            record.thread_child = context_snapshot(articles[index + 1], snapshot.captured_at);
        }

        records.push(record);
    }

    records
}

fn on_own_profile(path: &str, handle: &str) -> bool {
    let path = path.to_lowercase();
    path == format!("/{handle}") || path == format!("/{handle}/with_replies")
}

fn context_snapshot(article: ElementRef<'_>, captured_at: DateTime<Utc>) -> Option<String> {
    article::extract_article(article, captured_at)
        .and_then(|neighbor| serde_json::to_string(&neighbor).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostStatus;

    const SIDEBAR_ALICE: &str = concat!(
        "<div data-testid=\"SideNav_AccountSwitcher_Button\">",
        "<div dir=\"ltr\"><span>@alice</span></div>",
        "</div>"
    );

    fn article(id: &str, handle: &str, social_context: Option<&str>, caret: bool) -> String {
        format!(
            r#"<article data-testid="tweet">
                {context}
                <div data-testid="User-Name"><span>{name}</span><span>@{handle}</span></div>
                <a href="/{handle}/status/{id}"><time datetime="2024-03-01T10:00:00.000Z"></time></a>
                <div data-testid="tweetText">post {id}</div>
                {caret}
            </article>"#,
            context = social_context
                .map(|text| format!(r#"<div data-testid="socialContext">{text}</div>"#))
                .unwrap_or_default(),
            name = handle.to_uppercase(),
            caret = if caret {
                r#"<div data-testid="caret"></div>"#
            } else {
                ""
            },
        )
    }

    fn snapshot(path: &str, body: &str) -> PageSnapshot {
        PageSnapshot::new(format!("<html><body>{SIDEBAR_ALICE}{body}</body></html>"), path)
    }

    #[test]
    fn keeps_viewer_posts_and_drops_other_authors() {
        let body = format!(
            "{}{}",
            article("1", "alice", None, true),
            article("2", "bob", None, true)
        );
        let records = scrape_snapshot(&snapshot("/alice", &body));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].status, PostStatus::Pending);
    }

    #[test]
    fn reposts_survive_despite_authorship_mismatch() {
        let body = article("3", "bob", Some("Alice retweeted"), true);
        let records = scrape_snapshot(&snapshot("/alice", &body));
        assert_eq!(records.len(), 1);
        assert!(records[0].is_repost);
    }

    #[test]
    fn off_profile_page_yields_nothing() {
        let body = article("4", "alice", None, true);
        assert!(scrape_snapshot(&snapshot("/bob", &body)).is_empty());
    }

    #[test]
    fn with_replies_view_counts_as_own_profile() {
        let body = article("5", "alice", None, true);
        assert_eq!(
            scrape_snapshot(&snapshot("/alice/with_replies", &body)).len(),
            1
        );
    }

    #[test]
    fn unknown_viewer_degrades_to_reposts_only() {
        let body = format!(
            "{}{}",
            article("6", "alice", None, true),
            article("7", "bob", Some("Someone retweeted"), true)
        );
        let page = PageSnapshot::new(format!("<html><body>{body}</body></html>"), "/alice");
        let records = scrape_snapshot(&page);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7");
    }

    #[test]
    fn articles_without_overflow_affordance_are_skipped() {
        let body = article("8", "alice", None, false);
        assert!(scrape_snapshot(&snapshot("/alice", &body)).is_empty());
    }

    #[test]
    fn surviving_records_keep_document_order() {
        let body = format!(
            "{}{}{}",
            article("9", "alice", None, true),
            article("10", "bob", None, true),
            article("11", "alice", None, true)
        );
        let ids: Vec<String> = scrape_snapshot(&snapshot("/alice", &body))
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["9", "11"]);
    }

    #[test]
    fn thread_context_attaches_excluded_neighbors() {
        let body = format!(
            "{}{}{}",
            article("12", "bob", None, true),
            article("13", "alice", None, true),
            article("14", "carol", None, true)
        );
        let records = scrape_snapshot(&snapshot("/alice", &body));
        assert_eq!(records.len(), 1);

        let parent: PostRecord =
            serde_json::from_str(records[0].thread_parent.as_deref().unwrap()).unwrap();
        let child: PostRecord =
            serde_json::from_str(records[0].thread_child.as_deref().unwrap()).unwrap();
        assert_eq!(parent.id, "12");
        assert_eq!(child.id, "14");
    }

    #[test]
    fn edge_articles_have_one_sided_context() {
        let body = format!(
            "{}{}",
            article("15", "alice", None, true),
            article("16", "alice", None, true)
        );
        let records = scrape_snapshot(&snapshot("/alice", &body));
        assert_eq!(records.len(), 2);
        assert!(records[0].thread_parent.is_none());
        assert!(records[0].thread_child.is_some());
        assert!(records[1].thread_parent.is_some());
        assert!(records[1].thread_child.is_none());
    }
}
