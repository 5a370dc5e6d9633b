//! Game view controller: wires page events to `ViewState` transitions, the
//! network adapter and the reveal sequencer.
//!
//! State lives in a `RefCell` inside an `Rc<Controller>` that every listener
//! shares. Borrows are always released before an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

use crate::api::Api;
use crate::config::HiveConfig;
use crate::hive::geometry::HiveGeometry;
use crate::hive::sequencer::{RevealAction, Sequencer, StepExecutor, reveal_plan};
use crate::hive::shuffle::BrowserRandom;
use crate::state::{DefinitionToggle, KeyCommand, KeyContext, KeyOutcome, ModalKind, NewGameApplied, ViewState, interpret_key};
use crate::view::{DomSource, HiveBindings, ModalBindings, ViewError};

pub struct Controller {
    config: HiveConfig,
    api: Api,
    view: Rc<HiveBindings<Element>>,
    state: Rc<RefCell<ViewState>>,
    sequencer: Sequencer,
}

/// Applies reveal steps to the hive SVG.
struct Stage {
    view: Rc<HiveBindings<Element>>,
    state: Rc<RefCell<ViewState>>,
}

impl StepExecutor for Stage {
    fn perform(&self, action: &RevealAction) {
        match action {
            RevealAction::ClearHive => self.view.clear_hive(),
            RevealAction::StartSpin => self.view.set_spinning(true),
            RevealAction::StopSpin => self.view.set_spinning(false),
            RevealAction::Reveal(planned) => {
                // The ring may have been shuffled since the plan was made.
                let seg = match &self.state.borrow().hive {
                    Some(hive) => planned.with_current_letter(hive),
                    None => planned.clone(),
                };
                if let Err(e) = self.view.build_segment(&seg) {
                    console::warn!(format!("could not build segment {:?}: {e}", seg.slot));
                }
            }
        }
    }

    fn after_frame(&self, action: &RevealAction) {
        if let RevealAction::Reveal(seg) = action {
            self.view.show_label(seg.slot);
        }
    }
}

fn listen(target: &EventTarget, kind: &'static str, cb: impl FnMut(&Event) + 'static) {
    EventListener::new(target, kind, cb).forget();
}

fn log_render(result: Result<(), ViewError>) {
    if let Err(e) = result {
        console::error!(format!("render failed: {e}"));
    }
}

impl Controller {
    pub fn mount(config: HiveConfig) -> Result<Rc<Self>, JsValue> {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let view = HiveBindings::bind(&DomSource { doc: doc.clone() }).inspect_err(|e| {
            console::error!(format!("{e}"));
        })?;
        for w in &view.warnings {
            console::warn!(w.clone());
        }
        if view.dictionary.is_none() {
            view.disable_new_game();
        }

        let mut state = ViewState::new(&config);
        if let Some(hive) = view.read_hive() {
            state.seed_hive(hive);
        }
        state.total_words = view
            .total_words
            .as_ref()
            .and_then(|el| el.text_content())
            .and_then(|t| t.trim().parse().ok());

        let ctl = Rc::new(Self {
            api: Api::new(config.api_base.clone()),
            config,
            view: Rc::new(view),
            state: Rc::new(RefCell::new(state)),
            sequencer: Sequencer::new(),
        });
        ctl.wire(&doc)?;
        ctl.view.render_guess(&ctl.state.borrow());
        console::log!("Spelling Hive initialized.");
        Ok(ctl)
    }

    fn wire(self: &Rc<Self>, doc: &web_sys::Document) -> Result<(), JsValue> {
        let v = &self.view;

        {
            let this = self.clone();
            EventListener::new_with_options(doc, "keydown", EventListenerOptions::enable_prevent_default(), move |e| {
                if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                    this.on_key(key);
                }
            })
            .forget();
        }

        let this = self.clone();
        listen(&v.submit, "click", move |_| this.submit());
        let this = self.clone();
        listen(&v.delete, "click", move |_| this.delete_last());
        let this = self.clone();
        listen(&v.shuffle, "click", move |_| this.shuffle());

        let this = self.clone();
        listen(&v.hive_svg, "click", move |e| {
            let letter = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-letter]").ok().flatten())
                .and_then(|g| g.get_attribute("data-letter"))
                .and_then(|l| l.chars().next());
            if let Some(c) = letter {
                this.state.borrow_mut().push_clicked(c);
                this.view.render_guess(&this.state.borrow());
            }
        });

        if let Some(m) = &v.found_words {
            self.wire_modal(m, ModalKind::FoundWords);
            if let Some(list) = &m.content {
                let this = self.clone();
                listen(list, "click", move |e| {
                    let word = e
                        .target()
                        .and_then(|t| t.dyn_into::<Element>().ok())
                        .and_then(|el| el.closest("li[data-word]").ok().flatten())
                        .and_then(|li| li.get_attribute("data-word"));
                    if let Some(word) = word {
                        this.toggle_definition(word);
                    }
                });
            }
        }
        if let Some(m) = &v.ranks {
            self.wire_modal(m, ModalKind::Ranks);
        }
        if let Some(m) = &v.settings {
            self.wire_modal(m, ModalKind::Settings);
        }

        if let Some(d) = &v.dictionary {
            let this = self.clone();
            listen(&v.new_game, "click", move |e| {
                e.prevent_default();
                this.open_new_game();
            });
            let this = self.clone();
            listen(&d.close, "click", move |_| this.close_modal(ModalKind::Dictionary));
            self.wire_backdrop(&d.modal, ModalKind::Dictionary);
            let this = self.clone();
            listen(&d.confirm, "click", move |_| this.confirm_new_game());
        } else {
            console::warn!("New Game button disabled: modal flow cannot be initiated.");
        }
        Ok(())
    }

    fn wire_modal(self: &Rc<Self>, m: &ModalBindings<Element>, kind: ModalKind) {
        let this = self.clone();
        listen(&m.open, "click", move |_| this.open_modal(kind));
        let this = self.clone();
        listen(&m.close, "click", move |_| this.close_modal(kind));
        self.wire_backdrop(&m.modal, kind);
    }

    /// Clicks that land on the overlay itself, not its content, close the modal.
    fn wire_backdrop(self: &Rc<Self>, modal: &Element, kind: ModalKind) {
        let this = self.clone();
        let backdrop: EventTarget = modal.clone().into();
        listen(modal, "click", move |e| {
            if e.target().as_ref() == Some(&backdrop) {
                this.close_modal(kind);
            }
        });
    }

    fn open_modal(&self, kind: ModalKind) {
        if kind == ModalKind::Ranks {
            log_render(self.view.render_ranks(&self.state.borrow()));
        }
        self.state.borrow_mut().open_modal(kind);
        self.view.render_modals(&self.state.borrow());
    }

    fn close_modal(&self, kind: ModalKind) {
        self.state.borrow_mut().close_modal(kind);
        self.view.render_modals(&self.state.borrow());
    }

    // Guess composer ---------------------------------------------------------------

    fn on_key(self: &Rc<Self>, event: &KeyboardEvent) {
        let in_text_field = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| el.matches("input, textarea").unwrap_or(false));
        let ctx = KeyContext {
            modifier: event.meta_key() || event.ctrl_key() || event.alt_key(),
            in_text_field,
            modal_open: self.state.borrow().any_modal_open(),
        };
        match interpret_key(&event.key(), ctx) {
            KeyCommand::Submit => {
                event.prevent_default();
                self.submit();
            }
            KeyCommand::Delete => {
                event.prevent_default();
                self.delete_last();
            }
            KeyCommand::Letter(c) => {
                event.prevent_default();
                let outcome = self.state.borrow_mut().press_letter(c);
                if outcome == KeyOutcome::Rejected {
                    console::log!(format!("Ignoring key '{c}', not in puzzle letters."));
                    self.shake();
                }
                self.view.render_guess(&self.state.borrow());
            }
            KeyCommand::Ignore => {}
        }
    }

    fn shake(self: &Rc<Self>) {
        self.view.shake_guess(true);
        let view = self.view.clone();
        Timeout::new(self.config.timing.shake_ms, move || view.shake_guess(false)).forget();
    }

    fn delete_last(&self) {
        self.state.borrow_mut().delete_last();
        self.view.render_guess(&self.state.borrow());
    }

    fn shuffle(&self) {
        let mut rng = BrowserRandom::new();
        let shuffled = self.state.borrow_mut().shuffle(&mut rng);
        if !shuffled {
            console::warn!("Shuffle: no outer letters to shuffle.");
            return;
        }
        if let Some(hive) = &self.state.borrow().hive {
            self.view.apply_outer_letters(hive);
        }
    }

    // Submission --------------------------------------------------------------------

    fn submit(self: &Rc<Self>) {
        let Some(guess) = self.state.borrow_mut().begin_submit() else {
            return;
        };
        self.view.set_submit_busy(true);
        let this = self.clone();
        spawn_local(async move {
            let result = this.api.guess(&guess).await;
            let expire = {
                let mut st = this.state.borrow_mut();
                let expire = match &result {
                    Ok(resp) => {
                        console::log!(format!("Guess response: {resp:?}"));
                        st.apply_guess(&guess, resp).expire
                    }
                    Err(e) => {
                        console::error!(format!("Error submitting guess: {e}"));
                        st.fail_submit(e);
                        None
                    }
                };
                st.end_submit();
                expire
            };
            this.render_game();
            if let Some(serial) = expire {
                this.expire_banner(serial, this.config.timing.message_ms);
            }
            this.view.set_submit_busy(false);
        });
    }

    fn expire_banner(self: &Rc<Self>, serial: u64, after_ms: u32) {
        let this = self.clone();
        Timeout::new(after_ms, move || {
            let cleared = this.state.borrow_mut().expire_message(serial);
            if cleared {
                this.view.render_banner(&this.state.borrow());
            }
        })
        .forget();
    }

    /// Re-render everything a guess or a new game can change.
    fn render_game(&self) {
        let st = self.state.borrow();
        self.view.render_guess(&st);
        self.view.render_scoreboard(&st);
        self.view.render_banner(&st);
        log_render(self.view.render_found_words(&st));
        log_render(self.view.render_ticker(&st));
        if st.is_open(ModalKind::Ranks) {
            log_render(self.view.render_ranks(&st));
        }
    }

    // Definitions -------------------------------------------------------------------

    fn toggle_definition(self: &Rc<Self>, word: String) {
        let toggle = self.state.borrow_mut().toggle_definition(&word);
        log_render(self.view.render_found_words(&self.state.borrow()));
        let DefinitionToggle::Opened(word) = toggle else {
            return;
        };
        let this = self.clone();
        spawn_local(async move {
            let result = this.api.definition(&word).await;
            if let Err(e) = &result {
                console::error!(format!("Definition fetch error: {e}"));
            }
            let applied = this.state.borrow_mut().resolve_definition(&word, result);
            if applied {
                log_render(this.view.render_found_words(&this.state.borrow()));
            }
        });
    }

    // New-game flow -------------------------------------------------------------------

    fn open_new_game(self: &Rc<Self>) {
        self.state.borrow_mut().open_dictionary();
        {
            let st = self.state.borrow();
            log_render(self.view.render_dictionary_options(&st));
            self.view.render_dictionary_status(&st);
            self.view.render_modals(&st);
        }
        let this = self.clone();
        spawn_local(async move {
            let result = this.api.dictionary_options().await;
            if let Err(e) = &result {
                console::error!(format!("Error fetching dictionary options: {e}"));
            }
            this.state.borrow_mut().dictionary_loaded(result);
            let st = this.state.borrow();
            log_render(this.view.render_dictionary_options(&st));
            this.view.render_dictionary_status(&st);
        });
    }

    fn confirm_new_game(self: &Rc<Self>) {
        // Double click. Reopening the picker is what replaces a pending start.
        if self.state.borrow().dictionary.starting {
            return;
        }
        let checked = self.view.checked_options();
        let request = self.state.borrow_mut().confirm_selection(checked);
        let request = match request {
            Ok(req) => req,
            Err(serial) => {
                self.view.render_dictionary_status(&self.state.borrow());
                let this = self.clone();
                Timeout::new(self.config.timing.selection_error_ms, move || {
                    this.state.borrow_mut().expire_selection_error(serial);
                    this.view.render_dictionary_status(&this.state.borrow());
                })
                .forget();
                return;
            }
        };
        let ticket = self.state.borrow_mut().begin_new_game();
        self.view.render_dictionary_status(&self.state.borrow());
        console::log!(format!("Starting new game with lists: {:?}", request.selected_lists));

        let this = self.clone();
        spawn_local(async move {
            let result = this.api.start_game(request.selected_lists).await;
            match result {
                Ok(resp) => {
                    let applied = this.state.borrow_mut().apply_new_game(ticket, &resp);
                    match applied {
                        NewGameApplied::Stale => console::log!("Dropping superseded new-game response."),
                        NewGameApplied::Applied { hive, center_radius, banner_serial } => {
                            this.render_new_game();
                            match hive {
                                Some(hive) => {
                                    let geometry = HiveGeometry::with_inner_radius(center_radius);
                                    let steps = reveal_plan(&hive, &geometry, &this.config.timing);
                                    let stage = Stage { view: this.view.clone(), state: this.state.clone() };
                                    this.sequencer.run(steps, Rc::new(stage));
                                    this.expire_banner(banner_serial, this.config.timing.new_game_message_ms);
                                }
                                None => console::error!(format!(
                                    "Cannot run animation: invalid letter data (center {:?}, outer {:?})",
                                    resp.center_letter, resp.outer_letters
                                )),
                            }
                        }
                    }
                }
                Err(e) => {
                    console::error!(format!("Error starting game: {e}"));
                    if this.state.borrow_mut().new_game_failed(ticket, &e) {
                        this.view.render_dictionary_status(&this.state.borrow());
                    }
                }
            }
        });
    }

    fn render_new_game(&self) {
        self.render_game();
        let st = self.state.borrow();
        log_render(self.view.render_categories(&st));
        self.view.render_dictionary_status(&st);
        self.view.render_modals(&st);
    }
}
