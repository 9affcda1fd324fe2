use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use web_sys::{Document, Element};

use crate::dom;
use crate::error::Unavailable;

/// A set of dropdowns where at most one is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownGroup {
    open: Option<usize>,
}

impl DropdownGroup {
    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    /// Closes the others and flips `index`.
    pub fn toggle(&mut self, index: usize) {
        self.open = if self.is_open(index) { None } else { Some(index) };
    }

    pub fn close_all(&mut self) {
        self.open = None;
    }
}

struct Kind {
    root: &'static str,
    toggle: &'static str,
}

const DESKTOP: Kind = Kind {
    root: ".dropdown",
    toggle: ".dropdown-toggle",
};

const MOBILE: Kind = Kind {
    root: ".mobile-dropdown",
    toggle: ".mobile-dropdown-toggle",
};

#[derive(Clone)]
struct Dropdowns {
    kind: &'static Kind,
    elements: Rc<Vec<Element>>,
    group: Rc<RefCell<DropdownGroup>>,
}

impl Dropdowns {
    fn find(document: &Document, kind: &'static Kind) -> Self {
        Self {
            kind,
            elements: Rc::new(dom::query_all(document, kind.root)),
            group: Rc::default(),
        }
    }

    fn render(&self) {
        let group = self.group.borrow();
        for (i, el) in self.elements.iter().enumerate() {
            dom::set_class(el, "active", group.is_open(i));
        }
    }

    fn update(&self, f: impl FnOnce(&mut DropdownGroup)) {
        f(&mut *self.group.borrow_mut());
        self.render();
    }

    fn wire_toggles(&self) -> Result<(), Unavailable> {
        for (i, dropdown) in self.elements.iter().enumerate() {
            let Some(toggle) = dropdown.query_selector(self.kind.toggle)? else { continue };
            let this = self.clone();
            dom::listen(&toggle, "click", move |e| {
                e.stop_propagation();
                this.update(|g| g.toggle(i));
            })?;
        }
        Ok(())
    }

    /// Closes the whole group when a click lands outside every dropdown.
    fn close_on_outside_click(&self, document: &Document) -> Result<(), Unavailable> {
        let this = self.clone();
        dom::listen(document, "click", move |e| {
            let inside = dom::event_element(&e)
                .and_then(|el| el.closest(this.kind.root).ok().flatten())
                .is_some();
            if !inside {
                this.update(DropdownGroup::close_all);
            }
        })
    }
}

pub struct DropdownMenus {
    pub desktop: usize,
    pub mobile: usize,
}

pub fn mount(document: &Document) -> Result<DropdownMenus, Unavailable> {
    let desktop = Dropdowns::find(document, &DESKTOP);
    let mobile = Dropdowns::find(document, &MOBILE);
    if desktop.elements.is_empty() && mobile.elements.is_empty() {
        return Err(Unavailable::NoMatches(".dropdown, .mobile-dropdown"));
    }

    for dropdowns in [&desktop, &mobile] {
        dropdowns.wire_toggles()?;
        dropdowns.close_on_outside_click(document)?;
    }

    for link in dom::query_all(document, ".mobile-dropdown-menu a") {
        let mobile = mobile.clone();
        dom::listen(&link, "click", move |_| mobile.update(DropdownGroup::close_all))?;
    }

    info!(
        "Dropdowns ready: {} desktop, {} mobile",
        desktop.elements.len(),
        mobile.elements.len()
    );
    Ok(DropdownMenus {
        desktop: desktop.elements.len(),
        mobile: mobile.elements.len(),
    })
}
