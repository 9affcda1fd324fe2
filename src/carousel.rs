//! Testimonial carousel: a window of one or two cards that advances on a
//! fixed cadence, with one navigation bubble per slide.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::clock::{BrowserClock, Clock};
use crate::config::SiteConfig;
use crate::dom;
use crate::error::Unavailable;

pub const BUBBLE_CLASS: &str = "testimonial-bubble";
pub const ACTIVE_CLASS: &str = "active";

/// Cards per slide for a viewport of `width` pixels.
pub fn visible_count(width: f64, wide_breakpoint: f64) -> usize {
    if width < wide_breakpoint {
        1
    } else {
        2
    }
}

pub fn slide_count(items: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    items.div_ceil(visible)
}

pub fn bubble_label(index: usize) -> String {
    format!("Go to testimonial set {}", index + 1)
}

/// What the carousel should look like for a given slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideFrame {
    pub slide: usize,
    pub active_bubble: Option<usize>,
}

impl SlideFrame {
    pub fn transform(&self) -> String {
        format!("translateX(-{}%)", self.slide * 100)
    }

    /// Active flag for each of `bubbles` bubbles.
    pub fn bubble_flags(&self, bubbles: usize) -> Vec<bool> {
        (0..bubbles).map(|i| self.active_bubble == Some(i)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideTrack {
    slide_count: usize,
    current: usize,
}

impl SlideTrack {
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_count,
            current: 0,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Jumps to `slide` as given; the active bubble wraps modulo the slide count.
    pub fn go_to(&mut self, slide: usize) -> SlideFrame {
        self.current = slide;
        self.frame()
    }

    /// Advances with wrap-around; `None` when there are no slides.
    pub fn next(&mut self) -> Option<SlideFrame> {
        if self.slide_count == 0 {
            return None;
        }
        Some(self.go_to((self.current + 1) % self.slide_count))
    }

    pub fn frame(&self) -> SlideFrame {
        SlideFrame {
            slide: self.current,
            active_bubble: (self.slide_count > 0).then(|| self.current % self.slide_count),
        }
    }
}

pub trait CarouselView {
    fn render(&self, frame: &SlideFrame);
}

struct State<C: Clock, V> {
    track: SlideTrack,
    view: V,
    clock: C,
    interval_ms: u32,
    cadence: Option<C::Handle>,
}

/// Drives a [`SlideTrack`] from a clock and bubble clicks.
pub struct Carousel<C: Clock, V> {
    state: Rc<RefCell<State<C, V>>>,
}

impl<C: Clock, V> Clone for Carousel<C, V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<C, V> Carousel<C, V>
where
    C: Clock + 'static,
    V: CarouselView + 'static,
{
    /// Shows slide 0 and arms the automatic cadence.
    pub fn new(slide_count: usize, view: V, clock: C, interval_ms: u32) -> Self {
        let carousel = Self {
            state: Rc::new(RefCell::new(State {
                track: SlideTrack::new(slide_count),
                view,
                clock,
                interval_ms,
                cadence: None,
            })),
        };
        carousel.go_to_slide(0);
        carousel.rearm();
        carousel
    }

    pub fn current_slide(&self) -> usize {
        self.state.borrow().track.current()
    }

    pub fn slide_count(&self) -> usize {
        self.state.borrow().track.slide_count()
    }

    pub fn go_to_slide(&self, slide: usize) {
        let mut state = self.state.borrow_mut();
        let frame = state.track.go_to(slide);
        state.view.render(&frame);
    }

    pub fn next_slide(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(frame) = state.track.next() {
            state.view.render(&frame);
        }
    }

    /// Bubble click: jump, then restart the cadence so the next automatic
    /// advance is a full interval away.
    pub fn select(&self, slide: usize) {
        self.go_to_slide(slide);
        self.rearm();
    }

    fn rearm(&self) {
        let mut state = self.state.borrow_mut();
        state.cadence = None;
        if state.track.slide_count() == 0 {
            return;
        }

        let weak = Rc::downgrade(&self.state);
        let handle = state.clock.every(state.interval_ms, move || {
            if let Some(state) = weak.upgrade() {
                Carousel { state }.next_slide();
            }
        });
        state.cadence = Some(handle);
    }
}

pub struct DomCarouselView {
    container: HtmlElement,
    bubbles: Vec<Element>,
}

impl CarouselView for DomCarouselView {
    fn render(&self, frame: &SlideFrame) {
        dom::set_style(&self.container, "transform", &frame.transform());
        let flags = frame.bubble_flags(self.bubbles.len());
        for (bubble, active) in self.bubbles.iter().zip(flags) {
            dom::set_class(bubble, ACTIVE_CLASS, active);
        }
    }
}

pub type TestimonialCarousel = Carousel<BrowserClock, DomCarouselView>;

pub fn mount(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
) -> Result<TestimonialCarousel, Unavailable> {
    let container = dom::html(dom::require(document, ".testimonial-cards")?)?;
    let cards = document.query_selector_all(".testimonial-card")?;
    let bubble_container = dom::require(document, ".testimonial-bubbles")?;

    let width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(config.wide_breakpoint);
    let visible = visible_count(width, config.wide_breakpoint);
    let slides = slide_count(cards.length() as usize, visible);

    bubble_container.set_inner_html("");
    let mut bubbles = Vec::with_capacity(slides);
    for i in 0..slides {
        let bubble = document.create_element("button")?;
        bubble.set_class_name(BUBBLE_CLASS);
        bubble.set_attribute("aria-label", &bubble_label(i))?;
        bubble_container.append_child(&bubble)?;
        bubbles.push(bubble);
    }

    let view = DomCarouselView {
        container,
        bubbles: bubbles.clone(),
    };
    let carousel = Carousel::new(slides, view, BrowserClock, config.carousel_interval_ms);

    for (i, bubble) in bubbles.iter().enumerate() {
        let carousel = carousel.clone();
        dom::listen(bubble.unchecked_ref(), "click", move |_| carousel.select(i))?;
    }

    info!(
        "Testimonial carousel: {} cards, {} per slide, {} slides",
        cards.length(),
        visible,
        slides
    );
    Ok(carousel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[derive(Clone, Default)]
    struct RecordingView {
        frames: Rc<RefCell<Vec<SlideFrame>>>,
    }

    impl RecordingView {
        fn last(&self) -> SlideFrame {
            self.frames.borrow().last().cloned().unwrap()
        }
    }

    impl CarouselView for RecordingView {
        fn render(&self, frame: &SlideFrame) {
            self.frames.borrow_mut().push(frame.clone());
        }
    }

    type Rig = (Carousel<ManualClock, RecordingView>, ManualClock, RecordingView);

    fn carousel(slides: usize) -> Rig {
        let clock = ManualClock::default();
        let view = RecordingView::default();
        let carousel = Carousel::new(slides, view.clone(), clock.clone(), 4000);
        (carousel, clock, view)
    }

    #[test]
    fn visible_count_follows_breakpoint() {
        assert_eq!(visible_count(500.0, 768.0), 1);
        assert_eq!(visible_count(767.9, 768.0), 1);
        assert_eq!(visible_count(768.0, 768.0), 2);
        assert_eq!(visible_count(1440.0, 768.0), 2);
    }

    #[test]
    fn five_cards_two_per_slide() {
        let slides = slide_count(5, 2);
        assert_eq!(slides, 3);
        assert_eq!(bubble_label(0), "Go to testimonial set 1");
        assert_eq!(bubble_label(2), "Go to testimonial set 3");

        let (carousel, _clock, view) = carousel(slides);
        carousel.go_to_slide(2);

        let frame = view.last();
        assert_eq!(frame.transform(), "translateX(-200%)");
        assert_eq!(frame.active_bubble, Some(2));
    }

    #[test]
    fn out_of_range_slide_wraps_the_bubble() {
        let (carousel, _clock, view) = carousel(3);
        carousel.go_to_slide(4);

        let frame = view.last();
        assert_eq!(frame.active_bubble, Some(1));
        assert_eq!(frame.transform(), "translateX(-400%)");
        assert_eq!(frame.bubble_flags(3), vec![false, true, false]);
    }

    #[test]
    fn exactly_one_bubble_is_active() {
        let mut track = SlideTrack::new(3);
        for slide in 0..9 {
            let flags = track.go_to(slide).bubble_flags(3);
            assert_eq!(flags.iter().filter(|on| **on).count(), 1);
            assert!(flags[slide % 3]);
        }
        assert_eq!(SlideTrack::new(0).frame().bubble_flags(0), Vec::<bool>::new());
    }

    #[test]
    fn starts_on_first_slide() {
        let (carousel, _clock, view) = carousel(3);
        assert_eq!(carousel.current_slide(), 0);
        assert_eq!(view.last().transform(), "translateX(-0%)");
        assert_eq!(view.last().active_bubble, Some(0));
    }

    #[test]
    fn next_slide_wraps_within_range() {
        let (carousel, _clock, view) = carousel(3);
        let mut seen = Vec::new();
        for _ in 0..10 {
            carousel.next_slide();
            let current = carousel.current_slide();
            assert!(current < 3);
            assert_eq!(view.last().active_bubble, Some(current));
            seen.push(current);
        }
        assert_eq!(&seen[..4], &[1, 2, 0, 1]);
    }

    #[test]
    fn cadence_advances_every_interval() {
        let (carousel, clock, _view) = carousel(3);
        clock.advance(3999);
        assert_eq!(carousel.current_slide(), 0);
        clock.advance(1);
        assert_eq!(carousel.current_slide(), 1);
        clock.advance(8000);
        assert_eq!(carousel.current_slide(), 0);
    }

    #[test]
    fn selecting_a_bubble_restarts_the_cadence() {
        let (carousel, clock, view) = carousel(3);
        clock.advance(3000);

        carousel.select(2);
        assert_eq!(clock.pending(), 1);
        let renders = view.frames.borrow().len();

        // The old cadence would have fired at 4000.
        clock.advance(3999);
        assert_eq!(carousel.current_slide(), 2);
        assert_eq!(view.frames.borrow().len(), renders);

        clock.advance(1);
        assert_eq!(carousel.current_slide(), 0);
        assert_eq!(view.frames.borrow().len(), renders + 1);
    }

    #[test]
    fn single_slide_stays_put() {
        let (carousel, clock, view) = carousel(slide_count(2, 2));
        clock.advance(12_000);
        assert_eq!(carousel.current_slide(), 0);
        assert_eq!(view.last().active_bubble, Some(0));
    }

    #[test]
    fn empty_carousel_never_arms_a_timer() {
        let (carousel, clock, view) = carousel(slide_count(0, 2));
        assert_eq!(carousel.slide_count(), 0);
        assert_eq!(clock.pending(), 0);

        carousel.next_slide();
        carousel.select(0);
        assert_eq!(clock.pending(), 0);
        assert_eq!(view.last().active_bubble, None);
    }

    #[test]
    fn dropping_the_carousel_stops_the_cadence() {
        let (carousel, clock, view) = carousel(3);
        drop(carousel);
        clock.advance(10_000);
        assert_eq!(view.frames.borrow().len(), 1);
    }
}
