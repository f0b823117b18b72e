//! Viewer identity resolution.
//!
//! The inclusion filter and the page-scope guard both need to know who is
//! logged in. The handle is probed from an ordered chain of UI locations;
//! the first hit wins. All probes failing leaves the viewer unknown, which
//! degrades filtering to reposts-only.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

lazy_static! {
    static ref ACCOUNT_SWITCHER: Selector =
        Selector::parse("[data-testid='SideNav_AccountSwitcher_Button']").unwrap();
    static ref SWITCHER_HANDLE: Selector = Selector::parse("div[dir='ltr'] > span").unwrap();
    static ref PROFILE_TAB: Selector =
        Selector::parse("[data-testid='AppTabBar_Profile_Link']").unwrap();
    static ref MOBILE_PROFILE: Selector =
        Selector::parse("a[role='link'][aria-label*='Profile']").unwrap();
}

/// Strip the `@`/path prefix and lowercase, the form handles are compared in.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('/')
        .trim_start_matches('@')
        .to_lowercase()
}

/// Resolve the viewer's own handle from ambient UI markers.
pub(crate) fn resolve_viewer_handle(document: &Html) -> Option<String> {
    // Desktop/tablet: the sidebar account switcher shows the handle as text.
    if let Some(switcher) = document.select(&ACCOUNT_SWITCHER).next() {
        let handle = switcher
            .select(&SWITCHER_HANDLE)
            .map(|span| span.text().collect::<String>())
            .find(|text| text.trim().starts_with('@'))
            .map(|text| normalize_handle(&text));
        if let Some(handle) = handle.filter(|h| !h.is_empty()) {
            return Some(handle);
        }
    }

    // Sidebar profile tab: the handle is the link target.
    if let Some(handle) = href_handle(document, &PROFILE_TAB) {
        return Some(handle);
    }

    // Narrow screens: profile link in the bottom nav bar.
    href_handle(document, &MOBILE_PROFILE)
}

fn href_handle(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(normalize_handle)
        .filter(|handle| !handle.is_empty())
}
