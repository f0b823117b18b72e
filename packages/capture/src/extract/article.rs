//! Single-article field extraction.
//!
//! Every field here is best-effort: a selector that finds nothing degrades
//! to the documented default. The one exception is the post id - without
//! it the record cannot be deduplicated or targeted, so the article is
//! dropped.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::types::{LinkCard, PostMetrics, PostRecord, MEDIA_ONLY_PLACEHOLDER};

lazy_static! {
    static ref TIME: Selector = Selector::parse("time").unwrap();
    static ref ANCHOR: Selector = Selector::parse("a").unwrap();
    static ref POST_TEXT: Selector = Selector::parse("[data-testid='tweetText']").unwrap();
    static ref USER_NAME: Selector = Selector::parse("[data-testid='User-Name']").unwrap();
    static ref SPAN: Selector = Selector::parse("span").unwrap();
    static ref AVATAR: Selector = Selector::parse("img[src*='profile_images']").unwrap();
    static ref LIKE: Selector = Selector::parse("[data-testid='like']").unwrap();
    static ref REPOST: Selector = Selector::parse("[data-testid='retweet']").unwrap();
    static ref REPLY: Selector = Selector::parse("[data-testid='reply']").unwrap();
    static ref PHOTO_IMG: Selector = Selector::parse("[data-testid='tweetPhoto'] img").unwrap();
    static ref VIDEO: Selector = Selector::parse("[data-testid='videoPlayer'] video").unwrap();
    static ref VIDEO_POSTER_IMG: Selector =
        Selector::parse("[data-testid='videoComponent'] img").unwrap();
    static ref SOCIAL_CONTEXT: Selector =
        Selector::parse("[data-testid='socialContext']").unwrap();
    static ref CARD_WRAPPER: Selector = Selector::parse("[data-testid='card.wrapper']").unwrap();
    static ref IMG: Selector = Selector::parse("img").unwrap();
    static ref COUNT: Regex = Regex::new(r"\d+").unwrap();
}

/// Social-context phrases that mark a resharing record.
const REPOST_MARKERS: &[&str] = &["retweeted", "reposted", "retweetledi"];

/// Extract one article into a record, or `None` when no id is derivable.
pub(crate) fn extract_article(
    article: ElementRef<'_>,
    captured_at: DateTime<Utc>,
) -> Option<PostRecord> {
    let (id, created_at) = identify(article)?;

    let content = article
        .select(&POST_TEXT)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| MEDIA_ONLY_PLACEHOLDER.to_string());

    let mut record = PostRecord::new(id, content, created_at.unwrap_or(captured_at));
    extract_author(article, &mut record);
    record.metrics = PostMetrics {
        likes: metric(article, &LIKE),
        reposts: metric(article, &REPOST),
        replies: metric(article, &REPLY),
    };
    record.media = extract_media(article);
    record.is_repost = is_repost(article);
    record.link_card = extract_link_card(article);
    Some(record)
}

/// Derive the post id, preferring the timestamp's enclosing permalink and
/// falling back to the first status-shaped anchor that is not a photo
/// modal link. The origin timestamp rides along when readable.
fn identify(article: ElementRef<'_>) -> Option<(String, Option<DateTime<Utc>>)> {
    let mut id = None;
    let mut created_at = None;

    if let Some(time_el) = article.select(&TIME).next() {
        created_at = time_el
            .value()
            .attr("datetime")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        id = time_el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")
            .and_then(|permalink| permalink.value().attr("href"))
            .and_then(status_segment);
    }

    if id.is_none() {
        id = article
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.contains("/status/") && !href.contains("/photo/"))
            .and_then(status_segment);
    }

    id.map(|id| (id, created_at))
}

/// `/alice/status/123/analytics` -> `123`.
fn status_segment(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/status/")?;
    let id = rest.split('/').next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}

fn extract_author(article: ElementRef<'_>, record: &mut PostRecord) {
    if let Some(user_el) = article.select(&USER_NAME).next() {
        let spans: Vec<String> = user_el
            .select(&SPAN)
            .map(|span| span.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty() && text != "\u{b7}")
            .collect();

        if let Some(handle) = spans.iter().find(|text| text.starts_with('@')) {
            record.author_handle = handle.clone();
        }
        if let Some(name) = spans.iter().find(|text| !text.starts_with('@')) {
            record.author_name = name.clone();
        }
    }

    record.avatar_url = article
        .select(&AVATAR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();
}

/// First digit run in the control's aria-label, 0 when unreadable.
fn metric(article: ElementRef<'_>, selector: &Selector) -> u64 {
    article
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(|label| COUNT.find(label))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}

fn extract_media(article: ElementRef<'_>) -> Vec<String> {
    let mut media: Vec<String> = article
        .select(&PHOTO_IMG)
        .filter_map(|img| img.value().attr("src"))
        .map(str::to_string)
        .collect();

    let videos: Vec<ElementRef<'_>> = article.select(&VIDEO).collect();
    if videos.is_empty() {
        // Some embeds render a poster image without a video element.
        if let Some(poster) = article
            .select(&VIDEO_POSTER_IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
        {
            media.push(poster.to_string());
        }
    } else {
        media.extend(
            videos
                .iter()
                .filter_map(|video| video.value().attr("poster"))
                .map(str::to_string),
        );
    }

    media
}

fn is_repost(article: ElementRef<'_>) -> bool {
    article
        .select(&SOCIAL_CONTEXT)
        .next()
        .map(|el| el.text().collect::<String>().to_lowercase())
        .map(|context| REPOST_MARKERS.iter().any(|marker| context.contains(marker)))
        .unwrap_or(false)
}

/// Card layout varies; the domain is the short dotted span, the title the
/// first other non-empty span. The description is not derivable.
fn extract_link_card(article: ElementRef<'_>) -> Option<LinkCard> {
    let card = article.select(&CARD_WRAPPER).next()?;

    let image_url = card
        .select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    let spans: Vec<String> = card
        .select(&SPAN)
        .map(|span| span.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    let domain = spans
        .iter()
        .find(|text| text.contains('.') && text.len() < 30)
        .cloned();
    let title = spans
        .iter()
        .find(|text| domain.as_deref() != Some(text.as_str()))
        .cloned();

    Some(LinkCard {
        title,
        description: None,
        domain,
        image_url,
    })
}
