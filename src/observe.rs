//! Intersection-driven effects: gallery and FAQ entrances, lazy images,
//! plus the broken-image placeholder and image preloading.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Reflect};
use web_sys::{
    Document, Element, HtmlElement, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use crate::dom;
use crate::error::Unavailable;
use crate::faq::transition_delay;

const ENTRANCE_THRESHOLD: f64 = 0.1;
const ENTRANCE_ROOT_MARGIN: &str = "0px 0px -50px 0px";

const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg width="400" height="280" xmlns="http://www.w3.org/2000/svg">"#,
    r##"<rect width="400" height="280" fill="#f0f0f0"/>"##,
    r##"<text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" fill="#999">"##,
    "Image not found</text></svg>",
);

pub fn placeholder_data_uri() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
}

fn supports_observer(window: &Window) -> bool {
    Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// Calls `on_enter` for each observed element as it intersects.
fn observe(
    window: &Window,
    targets: &[Element],
    options: Option<&IntersectionObserverInit>,
    mut on_enter: impl FnMut(&Element, &IntersectionObserver) + 'static,
) -> Result<IntersectionObserver, Unavailable> {
    if !supports_observer(window) {
        return Err(Unavailable::Unsupported("IntersectionObserver"));
    }

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else { continue };
                if entry.is_intersecting() {
                    on_enter(&entry.target(), &observer);
                }
            }
        },
    );
    let observer = match options {
        Some(options) => {
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), options)?
        }
        None => IntersectionObserver::new(callback.as_ref().unchecked_ref())?,
    };
    callback.forget();

    for target in targets {
        observer.observe(target);
    }
    Ok(observer)
}

fn entrance_options() -> IntersectionObserverInit {
    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(ENTRANCE_THRESHOLD));
    options.set_root_margin(ENTRANCE_ROOT_MARGIN);
    options
}

/// Gallery items fade and slide up the first time they come into view.
pub fn mount_gallery(window: &Window, document: &Document) -> Result<usize, Unavailable> {
    let items = dom::query_all(document, ".gallery-item");
    if items.is_empty() {
        return Err(Unavailable::NoMatches(".gallery-item"));
    }

    let options = entrance_options();
    observe(window, &items, Some(&options), |item, _| {
        if let Some(item) = item.dyn_ref::<HtmlElement>() {
            dom::set_style(item, "opacity", "1");
            dom::set_style(item, "transform", "translateY(0)");
        }
    })?;

    for item in items.iter().filter_map(|el| el.dyn_ref::<HtmlElement>()) {
        dom::set_style(item, "opacity", "0");
        dom::set_style(item, "transform", "translateY(30px)");
        dom::set_style(item, "transition", "opacity 0.6s ease, transform 0.6s ease");
    }

    info!("Gallery entrance on {} items", items.len());
    Ok(items.len())
}

/// FAQ items enter one after another; the footer animates in as well.
pub fn mount_faq_entrance(window: &Window, document: &Document) -> Result<usize, Unavailable> {
    let mut targets = dom::query_all(document, ".faq-item");
    for (i, item) in targets.iter().enumerate() {
        if let Some(item) = item.dyn_ref::<HtmlElement>() {
            dom::set_style(item, "transition-delay", &transition_delay(i));
        }
    }
    if let Some(footer) = document.query_selector(".footer")? {
        targets.push(footer);
    }
    if targets.is_empty() {
        return Err(Unavailable::NoMatches(".faq-item, .footer"));
    }

    let options = entrance_options();
    observe(window, &targets, Some(&options), |el, _| {
        dom::set_class(el, "animate", true);
    })?;
    Ok(targets.len())
}

/// `img[data-src]` gets its real source once it scrolls into view.
pub fn mount_lazy_images(window: &Window, document: &Document) -> Result<usize, Unavailable> {
    let images = dom::query_all(document, "img[data-src]");
    if images.is_empty() {
        return Err(Unavailable::NoMatches("img[data-src]"));
    }

    observe(window, &images, None, |img, observer| {
        if let Some(src) = img.get_attribute("data-src") {
            let _ = img.set_attribute("src", &src);
        }
        dom::set_class(img, "lazy", false);
        observer.unobserve(img);
    })?;

    info!("Lazy loading {} images", images.len());
    Ok(images.len())
}

/// Swaps broken lazy images for an inline placeholder.
pub fn mount_image_fallback(document: &Document) -> Result<usize, Unavailable> {
    let images: Vec<HtmlImageElement> = dom::query_all(document, r#"img[loading="lazy"]"#)
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlImageElement>().ok())
        .collect();
    if images.is_empty() {
        return Err(Unavailable::NoMatches(r#"img[loading="lazy"]"#));
    }

    let placeholder = placeholder_data_uri();
    for img in &images {
        let broken = img.clone();
        let placeholder = placeholder.clone();
        dom::listen(img, "error", move |_| {
            if broken.src() != placeholder {
                broken.set_src(&placeholder);
            }
        })?;
    }
    Ok(images.len())
}

/// Warms the cache for the configured images once the page has loaded.
pub fn mount_preload(window: &Window, urls: &[String]) -> Result<usize, Unavailable> {
    if urls.is_empty() {
        return Err(Unavailable::EmptyConfig("preload_images"));
    }
    let urls = urls.to_vec();
    let count = urls.len();
    dom::listen(window, "load", move |_| {
        for url in &urls {
            if let Ok(img) = HtmlImageElement::new() {
                img.set_src(url);
            }
        }
    })?;
    Ok(count)
}
