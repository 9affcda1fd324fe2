//! Typewriter reveal for the `.anime` section.
//!
//! The headings are typed out one character at a time once the section
//! scrolls into view, then the companion card flies in. [`Reveal`] is the
//! state machine; [`Typewriter`] drives it from a [`Clock`].

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Window};

use crate::clock::{BrowserClock, Clock};
use crate::config::SiteConfig;
use crate::dom;
use crate::error::Unavailable;

pub const TYPING_CLASS: &str = "typewriter";
pub const FLY_IN_CLASS: &str = "fly-in";
pub const RESTART_HOOK: &str = "restartAnimation";

/// Vertical overlap between an element's box and the viewport.
pub fn overlaps_vertically(top: f64, bottom: f64, viewport_height: f64) -> bool {
    top <= viewport_height && bottom >= 0.0
}

pub trait Viewport {
    fn intersects(&self) -> bool;
}

pub trait RevealView {
    fn set_text(&self, block: usize, text: &str);
    fn push_char(&self, block: usize, ch: char);
    fn set_typing(&self, block: usize, on: bool);
    fn set_fly_in(&self, on: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing { block: usize, next_char: usize },
    /// Waiting between blocks; `block` is the one about to be typed.
    Pausing { block: usize },
    Terminal,
}

/// What the driver should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait(u32),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub per_char_ms: u32,
    pub between_blocks_ms: u32,
}

impl Cadence {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            per_char_ms: config.typing_delay_ms,
            between_blocks_ms: config.block_pause_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reveal {
    texts: Vec<Vec<char>>,
    phase: Phase,
    cadence: Cadence,
}

impl Reveal {
    pub fn new(texts: Vec<String>, cadence: Cadence) -> Self {
        Self {
            texts: texts.into_iter().map(|t| t.chars().collect()).collect(),
            phase: Phase::Idle,
            cadence,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn block_count(&self) -> usize {
        self.texts.len()
    }

    /// Leaves `Idle`, marks the first block and types its first character.
    pub fn begin(&mut self, view: &impl RevealView) -> Step {
        if self.has_started() {
            return Step::Done;
        }
        self.phase = Phase::Typing {
            block: 0,
            next_char: 0,
        };
        if !self.texts.is_empty() {
            view.set_typing(0, true);
        }
        self.tick(view)
    }

    /// Applies exactly one transition.
    pub fn tick(&mut self, view: &impl RevealView) -> Step {
        match self.phase {
            Phase::Idle | Phase::Terminal => Step::Done,
            Phase::Pausing { block } => {
                self.phase = Phase::Typing {
                    block,
                    next_char: 0,
                };
                self.tick(view)
            }
            Phase::Typing { block, .. } if block >= self.texts.len() => self.finish(view),
            Phase::Typing { block, next_char } => {
                if let Some(&ch) = self.texts[block].get(next_char) {
                    view.push_char(block, ch);
                    self.phase = Phase::Typing {
                        block,
                        next_char: next_char + 1,
                    };
                    return Step::Wait(self.cadence.per_char_ms);
                }

                view.set_typing(block, false);
                let next = block + 1;
                if next < self.texts.len() {
                    view.set_typing(next, true);
                    self.phase = Phase::Pausing { block: next };
                    Step::Wait(self.cadence.between_blocks_ms)
                } else {
                    self.finish(view)
                }
            }
        }
    }

    fn finish(&mut self, view: &impl RevealView) -> Step {
        self.phase = Phase::Terminal;
        view.set_fly_in(true);
        Step::Done
    }

    /// Back to `Idle` with every block hidden.
    pub fn reset(&mut self, view: &impl RevealView) {
        self.phase = Phase::Idle;
        for block in 0..self.texts.len() {
            view.set_text(block, "");
            view.set_typing(block, false);
        }
        view.set_fly_in(false);
    }
}

struct Driver<C: Clock, V, P> {
    reveal: Reveal,
    view: V,
    viewport: P,
    clock: C,
    pending: Option<C::Handle>,
}

pub struct Typewriter<C: Clock, V, P> {
    driver: Rc<RefCell<Driver<C, V, P>>>,
}

impl<C: Clock, V, P> Clone for Typewriter<C, V, P> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
        }
    }
}

impl<C, V, P> Typewriter<C, V, P>
where
    C: Clock + 'static,
    V: RevealView + 'static,
    P: Viewport + 'static,
{
    /// Hides every block. Nothing is typed until [`Self::check_visibility`].
    pub fn new(texts: Vec<String>, cadence: Cadence, view: V, viewport: P, clock: C) -> Self {
        let mut reveal = Reveal::new(texts, cadence);
        reveal.reset(&view);
        Self {
            driver: Rc::new(RefCell::new(Driver {
                reveal,
                view,
                viewport,
                clock,
                pending: None,
            })),
        }
    }

    pub fn phase(&self) -> Phase {
        self.driver.borrow().reveal.phase()
    }

    pub fn has_started(&self) -> bool {
        self.driver.borrow().reveal.has_started()
    }

    /// Starts the reveal the first time the section is visible.
    pub fn check_visibility(&self) {
        let mut driver = self.driver.borrow_mut();
        if driver.reveal.has_started() || !driver.viewport.intersects() {
            return;
        }
        let state = &mut *driver;
        let step = state.reveal.begin(&state.view);
        self.schedule(&mut driver, step);
    }

    /// Cancels any pending step, hides everything and checks visibility
    /// again, so a reset while visible restarts right away.
    pub fn reset(&self) {
        {
            let mut driver = self.driver.borrow_mut();
            driver.pending = None;
            let state = &mut *driver;
            state.reveal.reset(&state.view);
        }
        self.check_visibility();
    }

    fn run(&self) {
        let mut driver = self.driver.borrow_mut();
        driver.pending = None;
        let state = &mut *driver;
        let step = state.reveal.tick(&state.view);
        self.schedule(&mut driver, step);
    }

    fn schedule(&self, driver: &mut Driver<C, V, P>, step: Step) {
        driver.pending = match step {
            Step::Wait(millis) => {
                let weak = Rc::downgrade(&self.driver);
                Some(driver.clock.after(millis, move || {
                    if let Some(driver) = weak.upgrade() {
                        Typewriter { driver }.run();
                    }
                }))
            }
            Step::Done => None,
        };
    }
}

pub struct ElementViewport {
    element: Element,
    window: Window,
}

impl Viewport for ElementViewport {
    fn intersects(&self) -> bool {
        let rect = self.element.get_bounding_client_rect();
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .or_else(|| {
                self.window
                    .document()
                    .and_then(|d| d.document_element())
                    .map(|el| f64::from(el.client_height()))
            })
            .unwrap_or(0.0);
        overlaps_vertically(rect.top(), rect.bottom(), height)
    }
}

pub struct DomRevealView {
    blocks: Vec<Element>,
    card: Option<Element>,
}

impl RevealView for DomRevealView {
    fn set_text(&self, block: usize, text: &str) {
        if let Some(el) = self.blocks.get(block) {
            el.set_text_content(Some(text));
        }
    }

    fn push_char(&self, block: usize, ch: char) {
        if let Some(el) = self.blocks.get(block) {
            let mut text = el.text_content().unwrap_or_default();
            text.push(ch);
            el.set_text_content(Some(&text));
        }
    }

    fn set_typing(&self, block: usize, on: bool) {
        if let Some(el) = self.blocks.get(block) {
            dom::set_class(el, TYPING_CLASS, on);
        }
    }

    fn set_fly_in(&self, on: bool) {
        if let Some(card) = &self.card {
            dom::set_class(card, FLY_IN_CLASS, on);
        }
    }
}

pub type SectionTypewriter = Typewriter<BrowserClock, DomRevealView, ElementViewport>;

pub fn mount(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
) -> Result<SectionTypewriter, Unavailable> {
    let section = dom::require(document, ".anime")?;
    let blocks = dom::elements(section.query_selector_all("h2")?);
    let card = section.query_selector(".a-card")?;
    let texts: Vec<String> = blocks
        .iter()
        .map(|el| el.text_content().unwrap_or_default())
        .collect();

    let count = blocks.len();
    let typewriter = Typewriter::new(
        texts,
        Cadence::from_config(config),
        DomRevealView { blocks, card },
        ElementViewport {
            element: section,
            window: window.clone(),
        },
        BrowserClock,
    );

    {
        let typewriter = typewriter.clone();
        dom::listen(window, "scroll", move |_| typewriter.check_visibility())?;
    }
    typewriter.check_visibility();

    let restart = {
        let typewriter = typewriter.clone();
        Closure::<dyn Fn()>::new(move || typewriter.reset())
    };
    web_sys::js_sys::Reflect::set(
        window,
        &JsValue::from_str(RESTART_HOOK),
        restart.as_ref(),
    )?;
    restart.forget();

    info!("Typewriter armed for {} headings", count);
    Ok(typewriter)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::clock::ManualClock;

    #[derive(Clone, Default)]
    struct RecordingView {
        texts: Rc<RefCell<Vec<String>>>,
        typing: Rc<RefCell<Vec<bool>>>,
        fly_in: Rc<Cell<bool>>,
        fly_in_count: Rc<Cell<usize>>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingView {
        fn with_blocks(n: usize) -> Self {
            let view = Self::default();
            *view.texts.borrow_mut() = vec![String::new(); n];
            *view.typing.borrow_mut() = vec![false; n];
            view
        }

        fn texts(&self) -> Vec<String> {
            self.texts.borrow().clone()
        }

        fn typing(&self) -> Vec<bool> {
            self.typing.borrow().clone()
        }
    }

    impl RevealView for RecordingView {
        fn set_text(&self, block: usize, text: &str) {
            self.texts.borrow_mut()[block] = text.to_string();
        }

        fn push_char(&self, block: usize, ch: char) {
            self.texts.borrow_mut()[block].push(ch);
            self.log.borrow_mut().push(format!("{}:{}", block, ch));
        }

        fn set_typing(&self, block: usize, on: bool) {
            self.typing.borrow_mut()[block] = on;
        }

        fn set_fly_in(&self, on: bool) {
            if on && !self.fly_in.get() {
                self.fly_in_count.set(self.fly_in_count.get() + 1);
                self.log.borrow_mut().push("fly-in".to_string());
            }
            self.fly_in.set(on);
        }
    }

    #[derive(Clone, Default)]
    struct Visibility(Rc<Cell<bool>>);

    impl Viewport for Visibility {
        fn intersects(&self) -> bool {
            self.0.get()
        }
    }

    const CADENCE: Cadence = Cadence {
        per_char_ms: 40,
        between_blocks_ms: 200,
    };

    fn typewriter(
        texts: &[&str],
    ) -> (
        Typewriter<ManualClock, RecordingView, Visibility>,
        ManualClock,
        RecordingView,
        Visibility,
    ) {
        let clock = ManualClock::default();
        let view = RecordingView::with_blocks(texts.len());
        let visible = Visibility::default();
        let typewriter = Typewriter::new(
            texts.iter().map(|t| t.to_string()).collect(),
            CADENCE,
            view.clone(),
            visible.clone(),
            clock.clone(),
        );
        (typewriter, clock, view, visible)
    }

    #[test]
    fn overlap_test_matches_viewport_edges() {
        assert!(overlaps_vertically(0.0, 300.0, 800.0));
        assert!(overlaps_vertically(800.0, 1100.0, 800.0));
        assert!(overlaps_vertically(-300.0, 0.0, 800.0));
        assert!(!overlaps_vertically(801.0, 1100.0, 800.0));
        assert!(!overlaps_vertically(-300.0, -1.0, 800.0));
    }

    #[test]
    fn nothing_shows_before_the_section_is_visible() {
        let (typewriter, clock, view, _visible) = typewriter(&["Hi", "Yo"]);
        typewriter.check_visibility();
        clock.advance(10_000);

        assert_eq!(view.texts(), vec!["", ""]);
        assert_eq!(typewriter.phase(), Phase::Idle);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn types_blocks_in_order_then_flies_in_once() {
        let (typewriter, clock, view, visible) = typewriter(&["Hi", "Yo"]);
        visible.0.set(true);
        typewriter.check_visibility();

        // First character is typed on the trigger itself.
        assert_eq!(view.texts(), vec!["H", ""]);
        assert_eq!(view.typing(), vec![true, false]);

        clock.advance(40);
        assert_eq!(view.texts(), vec!["Hi", ""]);

        // Block 0 complete: marker moves, then the longer pause.
        clock.advance(40);
        assert_eq!(view.typing(), vec![false, true]);
        assert!(matches!(typewriter.phase(), Phase::Pausing { block: 1 }));

        clock.advance(199);
        assert_eq!(view.texts(), vec!["Hi", ""]);
        clock.advance(1);
        assert_eq!(view.texts(), vec!["Hi", "Y"]);
        assert!(!view.fly_in.get());

        clock.advance(10_000);
        assert_eq!(view.texts(), vec!["Hi", "Yo"]);
        assert_eq!(view.typing(), vec![false, false]);
        assert_eq!(typewriter.phase(), Phase::Terminal);
        assert_eq!(view.fly_in_count.get(), 1);
        assert_eq!(
            *view.log.borrow(),
            vec!["0:H", "0:i", "1:Y", "1:o", "fly-in"]
        );
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn repeated_visibility_checks_do_not_duplicate_work() {
        let (typewriter, clock, view, visible) = typewriter(&["Hello"]);
        visible.0.set(true);
        typewriter.check_visibility();
        for _ in 0..5 {
            typewriter.check_visibility();
            assert_eq!(clock.pending(), 1);
        }

        clock.advance(40);
        typewriter.check_visibility();
        assert_eq!(view.texts(), vec!["He"]);
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn reset_mid_animation_restarts_from_the_top() {
        let (typewriter, clock, view, visible) = typewriter(&["Hi", "Yo"]);
        visible.0.set(true);
        typewriter.check_visibility();
        assert_eq!(view.texts(), vec!["H", ""]);

        typewriter.reset();
        assert_eq!(
            typewriter.phase(),
            Phase::Typing {
                block: 0,
                next_char: 1
            }
        );
        assert_eq!(view.texts(), vec!["H", ""]);
        assert_eq!(view.typing(), vec![true, false]);
        assert_eq!(clock.pending(), 1);

        clock.advance(10_000);
        assert_eq!(view.texts(), vec!["Hi", "Yo"]);
        assert_eq!(view.fly_in_count.get(), 1);
    }

    #[test]
    fn reset_while_hidden_waits_for_visibility() {
        let (typewriter, clock, view, visible) = typewriter(&["Hi", "Yo"]);
        visible.0.set(true);
        typewriter.check_visibility();
        clock.advance(10_000);
        assert!(view.fly_in.get());

        visible.0.set(false);
        typewriter.reset();
        assert_eq!(view.texts(), vec!["", ""]);
        assert_eq!(view.typing(), vec![false, false]);
        assert!(!view.fly_in.get());
        assert!(!typewriter.has_started());
        assert_eq!(clock.pending(), 0);

        visible.0.set(true);
        typewriter.check_visibility();
        clock.advance(10_000);
        assert_eq!(view.texts(), vec!["Hi", "Yo"]);
        assert_eq!(view.fly_in_count.get(), 2);
    }

    #[test]
    fn reset_cancels_the_pending_step() {
        let (typewriter, clock, view, visible) = typewriter(&["abc"]);
        visible.0.set(true);
        typewriter.check_visibility();
        visible.0.set(false);
        typewriter.reset();

        clock.advance(1_000);
        assert_eq!(view.texts(), vec![""]);
        assert_eq!(*view.log.borrow(), vec!["0:a"]);
    }

    #[test]
    fn empty_section_goes_straight_to_fly_in() {
        let (typewriter, clock, view, visible) = typewriter(&[]);
        visible.0.set(true);
        typewriter.check_visibility();

        assert_eq!(typewriter.phase(), Phase::Terminal);
        assert_eq!(view.fly_in_count.get(), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn empty_block_is_skipped_with_a_pause() {
        let mut reveal = Reveal::new(vec![String::new(), "x".to_string()], CADENCE);
        let view = RecordingView::with_blocks(2);

        assert_eq!(reveal.begin(&view), Step::Wait(200));
        assert_eq!(reveal.phase(), Phase::Pausing { block: 1 });
        assert_eq!(reveal.tick(&view), Step::Wait(40));
        assert_eq!(reveal.tick(&view), Step::Done);
        assert_eq!(view.texts(), vec!["", "x"]);
    }

    #[test]
    fn types_multibyte_characters_whole() {
        let mut reveal = Reveal::new(vec!["né".to_string()], CADENCE);
        let view = RecordingView::with_blocks(1);
        reveal.begin(&view);
        reveal.tick(&view);
        assert_eq!(view.texts(), vec!["né"]);
    }
}
