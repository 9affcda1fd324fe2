use log::info;
use web_sys::{Document, Window};

use crate::dom;
use crate::error::Unavailable;

pub const NAV_LINKS: &str = ".nav-links a, .mobile-menu nav a";
const HOME_PAGE: &str = "index.html";

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name of the page being viewed; the site root counts as `index.html`.
pub fn current_page(pathname: &str) -> &str {
    match last_segment(pathname) {
        "" => HOME_PAGE,
        page => page,
    }
}

pub fn is_active(current_page: &str, href: &str, link_text: &str) -> bool {
    if href.is_empty() {
        return false;
    }
    let link_page = last_segment(href);
    if link_page == "contact.html" {
        return false;
    }

    let on_home = current_page == HOME_PAGE || current_page.is_empty();
    let home_link = link_page == HOME_PAGE || href == "/" || href == "./";
    if on_home && home_link {
        return true;
    }
    if link_page == current_page {
        return true;
    }

    // The "Blog" entry points at the gallery.
    current_page == "gallery.html" && link_text.trim().to_lowercase() == "blog"
}

pub fn mount(window: &Window, document: &Document) -> Result<usize, Unavailable> {
    let links = dom::query_all(document, NAV_LINKS);
    if links.is_empty() {
        return Err(Unavailable::NoMatches(NAV_LINKS));
    }

    let pathname = window.location().pathname()?;
    let page = current_page(&pathname);
    let mut active = 0;
    for link in &links {
        let Some(href) = link.get_attribute("href") else { continue };
        let text = link.text_content().unwrap_or_default();
        if is_active(page, &href, &text) {
            dom::set_class(link, "active", true);
            active += 1;
        }
    }

    info!("Highlighted {} nav links for {}", active, page);
    Ok(active)
}
