use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use web_sys::{Document, HtmlElement};

use crate::clock::{BrowserClock, Clock, TimerHandle};
use crate::config::SiteConfig;
use crate::dom;
use crate::error::Unavailable;

/// Endless cycle over a non-empty list.
#[derive(Debug, Clone)]
pub struct Rotation<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Rotation<T> {
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, index: 0 })
    }

    /// Returns the current item and moves past it.
    pub fn advance(&mut self) -> &T {
        let current = self.index;
        self.index = (self.index + 1) % self.items.len();
        &self.items[current]
    }
}

pub fn background_image(path: &str) -> String {
    format!("url({})", path)
}

pub struct HeroBackground {
    _cadence: TimerHandle,
}

pub fn mount(document: &Document, config: &SiteConfig) -> Result<HeroBackground, Unavailable> {
    let hero = dom::html(dom::require_id(document, "hero")?)?;
    let rotation = Rotation::new(config.hero_images.clone())
        .ok_or(Unavailable::EmptyConfig("hero_images"))?;
    let rotation = Rc::new(RefCell::new(rotation));

    let show_next = move |hero: &HtmlElement| {
        let image = background_image(rotation.borrow_mut().advance());
        dom::set_style(hero, "background-image", &image);
    };
    show_next(&hero);

    let cadence = BrowserClock.every(config.hero_interval_ms, move || show_next(&hero));

    info!("Hero rotating {} images", config.hero_images.len());
    Ok(HeroBackground { _cadence: cadence })
}
