use log::{debug, info, warn, Level};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

pub mod carousel;
pub mod clock;
pub mod config;
pub mod contact;
pub mod dom;
pub mod dropdown;
pub mod error;
pub mod faq;
pub mod hero;
pub mod map;
pub mod menu;
pub mod nav;
pub mod observe;
pub mod scroll;
pub mod typewriter;

use config::SiteConfig;
use error::Unavailable;

/// Every behavior that found its markup on this page.
pub struct Page {
    pub hero: Option<hero::HeroBackground>,
    pub menu: Option<menu::MobileMenu>,
    pub anchors: Option<scroll::AnchorLinks>,
    pub active_links: Option<usize>,
    pub typewriter: Option<typewriter::SectionTypewriter>,
    pub gallery: Option<usize>,
    pub image_fallback: Option<usize>,
    pub dropdowns: Option<dropdown::DropdownMenus>,
    pub carousel: Option<carousel::TestimonialCarousel>,
    pub contact: Option<contact::ContactForm>,
    pub faq: Option<faq::Faq>,
    pub faq_entrance: Option<usize>,
    pub footer_links: Option<scroll::AnchorLinks>,
    pub lazy_images: Option<usize>,
    pub touch_feedback: Option<usize>,
    pub map: Option<map::MapLoader>,
    pub preload: Option<usize>,
}

fn enabled<T>(name: &str, result: Result<T, Unavailable>) -> Option<T> {
    match result {
        Ok(mounted) => {
            debug!("{} enabled", name);
            Some(mounted)
        }
        Err(e) => {
            debug!("{} skipped: {}", name, e);
            None
        }
    }
}

impl Page {
    pub fn boot(window: &Window, document: &Document) -> Self {
        let config = SiteConfig::from_page(document);

        Page {
            hero: enabled("hero", hero::mount(document, &config)),
            menu: enabled("mobile menu", menu::mount(window, document, &config)),
            anchors: enabled("smooth scroll", scroll::mount(document)),
            active_links: enabled("active links", nav::mount(window, document)),
            typewriter: enabled("typewriter", typewriter::mount(window, document, &config)),
            gallery: enabled("gallery", observe::mount_gallery(window, document)),
            image_fallback: enabled("image fallback", observe::mount_image_fallback(document)),
            dropdowns: enabled("dropdowns", dropdown::mount(document)),
            carousel: enabled("testimonials", carousel::mount(window, document, &config)),
            contact: enabled("contact form", contact::mount(window, document, &config)),
            faq: enabled("faq", faq::mount(document)),
            faq_entrance: enabled("faq entrance", observe::mount_faq_entrance(window, document)),
            footer_links: enabled("footer links", scroll::mount_footer(document)),
            lazy_images: enabled("lazy images", observe::mount_lazy_images(window, document)),
            touch_feedback: enabled("touch feedback", faq::mount_touch_feedback(document)),
            map: enabled("map", map::mount(window, document, &config.map)),
            preload: enabled("preload", observe::mount_preload(window, &config.preload_images)),
        }
    }

    pub fn enabled_count(&self) -> usize {
        [
            self.hero.is_some(),
            self.menu.is_some(),
            self.anchors.is_some(),
            self.active_links.is_some(),
            self.typewriter.is_some(),
            self.gallery.is_some(),
            self.image_fallback.is_some(),
            self.dropdowns.is_some(),
            self.carousel.is_some(),
            self.contact.is_some(),
            self.faq.is_some(),
            self.faq_entrance.is_some(),
            self.footer_links.is_some(),
            self.lazy_images.is_some(),
            self.touch_feedback.is_some(),
            self.map.is_some(),
            self.preload.is_some(),
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }
}

fn boot() {
    let (Ok(window), Ok(document)) = (dom::window(), dom::document()) else {
        return;
    };
    let page = Page::boot(&window, &document);
    info!("Page enhanced with {} behaviors", page.enabled_count());
    // Behaviors stay mounted until the page unloads.
    std::mem::forget(page);
}

#[wasm_bindgen(start)]
pub fn start() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting site enhancements");
    let Ok(document) = dom::document() else { return };
    if document.ready_state() == "loading" {
        if let Err(e) = dom::listen(&document, "DOMContentLoaded", |_| boot()) {
            warn!("Could not wait for DOMContentLoaded: {}", e);
        }
    } else {
        boot();
    }
}
