//! Small helpers over `web_sys` shared by the page behaviors.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, NodeList,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::error::Unavailable;

pub fn window() -> Result<Window, Unavailable> {
    web_sys::window().ok_or(Unavailable::NoWindow)
}

pub fn document() -> Result<Document, Unavailable> {
    window()?.document().ok_or(Unavailable::NoDocument)
}

pub fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

pub fn require(document: &Document, selector: &'static str) -> Result<Element, Unavailable> {
    document
        .query_selector(selector)?
        .ok_or(Unavailable::MissingElement(selector))
}

pub fn require_id(document: &Document, id: &'static str) -> Result<Element, Unavailable> {
    document
        .get_element_by_id(id)
        .ok_or(Unavailable::MissingElement(id))
}

pub fn html(element: Element) -> Result<HtmlElement, Unavailable> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| Unavailable::Dom("element is not an HTMLElement".to_string()))
}

/// Attaches a listener for the lifetime of the page.
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), Unavailable> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Same as [`listen`] but tells the browser the handler never calls
/// `prevent_default`, which keeps touch scrolling smooth.
pub fn listen_passive(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), Unavailable> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.as_ref().unchecked_ref(),
        &options,
    )?;
    callback.forget();
    Ok(())
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

/// Scrolls smoothly to the element matching `selector`. Returns false when
/// the selector is invalid or matches nothing.
pub fn smooth_scroll_to(document: &Document, selector: &str) -> bool {
    let Ok(Some(target)) = document.query_selector(selector) else {
        return false;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    target.scroll_into_view_with_scroll_into_view_options(&options);
    true
}

pub fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}
