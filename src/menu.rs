use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, KeyboardEvent, Node, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::Unavailable;

pub const SCROLL_LOCK_CLASS: &str = "scroll-locked";
pub const OPEN_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    MenuButton,
    CloseButton,
    /// A click that landed on the overlay itself, not its content.
    Backdrop,
    Link,
    Escape,
    Resize { width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    open: bool,
    wide_breakpoint: f64,
}

impl MenuState {
    pub fn new(wide_breakpoint: f64) -> Self {
        Self {
            open: false,
            wide_breakpoint,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle(&mut self, event: MenuEvent) -> Option<MenuAction> {
        let action = match event {
            MenuEvent::MenuButton => Some(MenuAction::Open),
            MenuEvent::CloseButton | MenuEvent::Backdrop | MenuEvent::Link => {
                Some(MenuAction::Close)
            }
            MenuEvent::Escape if self.open => Some(MenuAction::Close),
            MenuEvent::Resize { width } if self.open && width > self.wide_breakpoint => {
                Some(MenuAction::Close)
            }
            MenuEvent::Escape | MenuEvent::Resize { .. } => None,
        };
        if let Some(action) = action {
            self.open = action == MenuAction::Open;
        }
        action
    }
}

#[derive(Clone)]
struct MenuElements {
    body: Option<HtmlElement>,
    menu_button: HtmlElement,
    menu: HtmlElement,
    close_button: HtmlElement,
}

#[derive(Clone)]
pub struct MobileMenu {
    state: Rc<RefCell<MenuState>>,
    elements: Rc<MenuElements>,
    focus_delay_ms: u32,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn dispatch(&self, event: MenuEvent) {
        let action = self.state.borrow_mut().handle(event);
        match action {
            Some(MenuAction::Open) => self.show(),
            Some(MenuAction::Close) => self.hide(),
            None => {}
        }
    }

    fn show(&self) {
        let el = &self.elements;
        if let Some(body) = &el.body {
            dom::set_class(body, SCROLL_LOCK_CLASS, true);
        }
        dom::set_class(&el.menu, OPEN_CLASS, true);

        let close_button = el.close_button.clone();
        Timeout::new(self.focus_delay_ms, move || {
            let _ = close_button.focus();
        })
        .forget();
    }

    fn hide(&self) {
        let el = &self.elements;
        if let Some(body) = &el.body {
            dom::set_class(body, SCROLL_LOCK_CLASS, false);
        }
        dom::set_class(&el.menu, OPEN_CLASS, false);
        let _ = el.menu_button.focus();
    }
}

pub fn mount(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
) -> Result<MobileMenu, Unavailable> {
    let elements = MenuElements {
        body: document.body(),
        menu_button: dom::html(dom::require_id(document, "menuBtn")?)?,
        menu: dom::html(dom::require_id(document, "mobileMenu")?)?,
        close_button: dom::html(dom::require_id(document, "closeBtn")?)?,
    };
    let links = dom::elements(elements.menu.query_selector_all("nav a")?);

    let menu = MobileMenu {
        state: Rc::new(RefCell::new(MenuState::new(config.wide_breakpoint))),
        elements: Rc::new(elements),
        focus_delay_ms: config.focus_delay_ms,
    };
    let el = menu.elements.clone();

    {
        let menu = menu.clone();
        dom::listen(&el.menu_button, "click", move |e| {
            e.prevent_default();
            menu.dispatch(MenuEvent::MenuButton);
        })?;
    }
    {
        let menu = menu.clone();
        dom::listen(&el.close_button, "click", move |e| {
            e.prevent_default();
            menu.dispatch(MenuEvent::CloseButton);
        })?;
    }
    {
        let menu = menu.clone();
        let overlay: Node = el.menu.clone().into();
        dom::listen(&el.menu, "click", move |e| {
            let on_overlay = e
                .target()
                .is_some_and(|t| t.unchecked_ref::<Node>().is_same_node(Some(&overlay)));
            if on_overlay {
                menu.dispatch(MenuEvent::Backdrop);
            }
        })?;
    }
    for link in &links {
        let menu = menu.clone();
        dom::listen(link, "click", move |_| menu.dispatch(MenuEvent::Link))?;
    }
    {
        let menu = menu.clone();
        dom::listen(document, "keydown", move |e| {
            if e.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Escape") {
                menu.dispatch(MenuEvent::Escape);
            }
        })?;
    }
    {
        let menu = menu.clone();
        let resized = window.clone();
        dom::listen(window, "resize", move |_| {
            if let Some(width) = resized.inner_width().ok().and_then(|w| w.as_f64()) {
                menu.dispatch(MenuEvent::Resize { width });
            }
        })?;
    }

    info!("Mobile menu ready with {} links", links.len());
    Ok(menu)
}
