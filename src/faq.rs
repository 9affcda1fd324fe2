//! FAQ accordion and the touch press feedback shared with the footer.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent};

use crate::dom;
use crate::error::Unavailable;

pub const QUESTIONS: &str = ".faq-question";
pub const PRESSABLE: &str = ".faq-question, .footer-cta-button, .footer-links a";
pub const PRESSED_TRANSFORM: &str = "scale(0.98)";

/// One open question at most.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accordion {
    open: Option<usize>,
}

impl Accordion {
    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    pub fn toggle(&mut self, index: usize) {
        self.open = if self.is_open(index) { None } else { Some(index) };
    }
}

pub fn is_toggle_key(key: &str) -> bool {
    key == "Enter" || key == " "
}

/// Stagger for the n-th item's entrance, in tenths of a second.
pub fn transition_delay(index: usize) -> String {
    format!("{}.{}s", index / 10, index % 10)
}

struct Entry {
    question: Element,
    answer: Option<Element>,
}

#[derive(Clone)]
pub struct Faq {
    entries: Rc<Vec<Entry>>,
    accordion: Rc<RefCell<Accordion>>,
}

impl Faq {
    pub fn toggle(&self, index: usize) {
        self.accordion.borrow_mut().toggle(index);
        self.render();
    }

    fn render(&self) {
        let accordion = self.accordion.borrow();
        for (i, entry) in self.entries.iter().enumerate() {
            let open = accordion.is_open(i);
            dom::set_class(&entry.question, "active", open);
            let _ = entry
                .question
                .set_attribute("aria-expanded", if open { "true" } else { "false" });
            if let Some(answer) = &entry.answer {
                dom::set_class(answer, "active", open);
            }
        }
    }
}

pub fn mount(document: &Document) -> Result<Faq, Unavailable> {
    let questions = dom::query_all(document, QUESTIONS);
    if questions.is_empty() {
        return Err(Unavailable::NoMatches(QUESTIONS));
    }

    let entries: Vec<Entry> = questions
        .into_iter()
        .map(|question| Entry {
            answer: question.next_element_sibling(),
            question,
        })
        .collect();
    let faq = Faq {
        entries: Rc::new(entries),
        accordion: Rc::default(),
    };

    for (i, entry) in faq.entries.iter().enumerate() {
        {
            let faq = faq.clone();
            dom::listen(&entry.question, "click", move |_| faq.toggle(i))?;
        }
        let faq = faq.clone();
        dom::listen(&entry.question, "keydown", move |e| {
            if e.dyn_ref::<KeyboardEvent>().is_some_and(|k| is_toggle_key(&k.key())) {
                e.prevent_default();
                faq.toggle(i);
            }
        })?;
    }

    info!("FAQ accordion with {} questions", faq.entries.len());
    Ok(faq)
}

pub fn mount_touch_feedback(document: &Document) -> Result<usize, Unavailable> {
    let elements: Vec<HtmlElement> = dom::query_all(document, PRESSABLE)
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect();
    if elements.is_empty() {
        return Err(Unavailable::NoMatches(PRESSABLE));
    }

    for el in &elements {
        let pressed = el.clone();
        dom::listen_passive(el, "touchstart", move |_| {
            dom::set_style(&pressed, "transform", PRESSED_TRANSFORM);
        })?;
        let released = el.clone();
        dom::listen_passive(el, "touchend", move |_| {
            dom::set_style(&released, "transform", "");
        })?;
    }
    Ok(elements.len())
}
