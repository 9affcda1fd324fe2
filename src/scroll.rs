//! Smooth scrolling for in-page anchors, including footer links.

use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, KeyboardEvent};

use crate::dom;
use crate::error::Unavailable;

/// Selector to scroll to for an anchor's `href`, or `None` when the browser
/// should handle the click itself.
pub fn in_page_target(href: &str) -> Option<&str> {
    if href == "#" || href.starts_with("#!") {
        return None;
    }
    let page_link = href.starts_with("./")
        || href.starts_with('/')
        || href.starts_with("../")
        || href.contains(".html");
    if page_link || !href.starts_with('#') {
        return None;
    }
    Some(href)
}

fn scroll_on_click(document: &Document, anchor: &HtmlElement) -> Result<(), Unavailable> {
    let doc = document.clone();
    let link = anchor.clone();
    dom::listen(anchor, "click", move |e| {
        let Some(href) = link.get_attribute("href") else { return };
        if let Some(selector) = in_page_target(&href) {
            if doc.query_selector(selector).ok().flatten().is_some() {
                e.prevent_default();
                dom::smooth_scroll_to(&doc, selector);
            }
        }
    })
}

pub struct AnchorLinks {
    pub count: usize,
}

pub fn mount(document: &Document) -> Result<AnchorLinks, Unavailable> {
    let anchors = dom::query_all(document, r##"a[href^="#"]"##);
    if anchors.is_empty() {
        return Err(Unavailable::NoMatches("a[href^=\"#\"]"));
    }
    for anchor in &anchors {
        scroll_on_click(document, anchor.unchecked_ref())?;
    }
    info!("Smooth scrolling {} anchors", anchors.len());
    Ok(AnchorLinks {
        count: anchors.len(),
    })
}

pub const FOOTER_LINKS: &str = ".footer-links a, .footer-cta-button";

/// Footer links swallow every `#` click, even a bare `#` or a target that
/// is not on the page.
pub fn footer_should_prevent(href: &str) -> bool {
    href.starts_with('#')
}

fn scroll_footer_on_click(document: &Document, link: &HtmlElement) -> Result<(), Unavailable> {
    let doc = document.clone();
    let anchor = link.clone();
    dom::listen(link, "click", move |e| {
        let Some(href) = anchor.get_attribute("href") else { return };
        if footer_should_prevent(&href) {
            e.prevent_default();
            dom::smooth_scroll_to(&doc, &href);
        }
    })
}

/// Footer links also scroll smoothly and follow their target on Enter.
pub fn mount_footer(document: &Document) -> Result<AnchorLinks, Unavailable> {
    let links = dom::query_all(document, FOOTER_LINKS);
    if links.is_empty() {
        return Err(Unavailable::NoMatches(FOOTER_LINKS));
    }
    for link in &links {
        let Ok(link) = link.clone().dyn_into::<HtmlElement>() else { continue };
        scroll_footer_on_click(document, &link)?;

        let target = link.clone();
        dom::listen(&link, "keydown", move |e| {
            if e.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Enter") {
                target.click();
            }
        })?;
    }
    Ok(AnchorLinks { count: links.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_anchors_scroll() {
        assert_eq!(in_page_target("#services"), Some("#services"));
        assert_eq!(in_page_target("#contact-form"), Some("#contact-form"));
    }

    #[test]
    fn bare_and_hashbang_anchors_are_left_alone() {
        assert_eq!(in_page_target("#"), None);
        assert_eq!(in_page_target("#!/route"), None);
    }

    #[test]
    fn page_navigation_is_left_to_the_browser() {
        assert_eq!(in_page_target("./about.html"), None);
        assert_eq!(in_page_target("/gallery.html"), None);
        assert_eq!(in_page_target("../index.html"), None);
        assert_eq!(in_page_target("#faq.html"), None);
        assert_eq!(in_page_target("https://example.com"), None);
    }

    #[test]
    fn footer_swallows_every_hash_link() {
        assert!(footer_should_prevent("#"));
        assert!(footer_should_prevent("#!/route"));
        assert!(footer_should_prevent("#nowhere"));
        assert!(footer_should_prevent("#contact"));
        assert_eq!(in_page_target("#"), None);
    }

    #[test]
    fn footer_leaves_page_links_alone() {
        assert!(!footer_should_prevent("./about.html"));
        assert!(!footer_should_prevent("/gallery.html"));
        assert!(!footer_should_prevent("https://example.com"));
        assert!(!footer_should_prevent(""));
    }
}
