//! Typed view bindings and render routines.
//!
//! Every element the controller touches is looked up once in `HiveBindings::bind`.
//! Core elements are mandatory and reported together when absent; each modal is
//! an all-or-nothing optional group. Render methods rewrite their elements from
//! a `ViewState` and never read game state back out of the DOM.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::api::Icon;
use crate::hive::Hive;
use crate::hive::geometry::{Segment, SegmentSlot};
use crate::ranks::{rank_rows, reached_index};
use crate::state::{CategoryStat, FoundWord, ModalKind, ViewState};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const MODAL_OPEN: &str = "modal-open";
pub const HIDDEN: &str = "hidden";
pub const SPINNING: &str = "spinning";
pub const SHAKE: &str = "shake";
pub const CONFIRM_LABEL: &str = "Start New Game";
pub const CONFIRM_BUSY_LABEL: &str = "Starting...";
pub const OPTION_INPUT_NAME: &str = "dictionary_selection";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("core game elements not found: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("DOM error: {0}")]
    Dom(String),
}

impl From<JsValue> for ViewError {
    fn from(v: JsValue) -> Self {
        ViewError::Dom(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

impl From<ViewError> for JsValue {
    fn from(e: ViewError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Where bindings come from. The DOM in the browser; a map in tests.
pub trait ElementSource<E> {
    fn by_id(&self, id: &str) -> Option<E>;
    fn within(&self, scope: &E, selector: &str) -> Option<E>;
}

pub struct DomSource {
    pub doc: Document,
}

impl ElementSource<Element> for DomSource {
    fn by_id(&self, id: &str) -> Option<Element> {
        self.doc.get_element_by_id(id)
    }

    fn within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }
}

#[derive(Clone, Debug)]
pub struct ModalBindings<E> {
    pub modal: E,
    pub open: E,
    pub close: E,
    /// List the modal renders into, when it has one.
    pub content: Option<E>,
}

#[derive(Clone, Debug)]
pub struct DictionaryBindings<E> {
    pub modal: E,
    pub close: E,
    pub confirm: E,
    pub options: E,
    pub loading: E,
    pub error: E,
}

#[derive(Clone, Debug)]
pub struct HiveBindings<E> {
    pub submit: E,
    pub message: E,
    pub score: E,
    pub rank: E,
    pub guess: E,
    pub delete: E,
    pub shuffle: E,
    pub hive_svg: E,
    pub outer_group: E,
    pub center_group: E,
    pub new_game: E,
    pub found_count: Option<E>,
    pub total_words: Option<E>,
    pub words_remaining: Option<E>,
    pub ticker: Option<E>,
    pub category_stats: Option<E>,
    pub found_words: Option<ModalBindings<E>>,
    pub ranks: Option<ModalBindings<E>>,
    pub settings: Option<ModalBindings<E>>,
    pub dictionary: Option<DictionaryBindings<E>>,
    /// Optional groups that were only partially present.
    pub warnings: Vec<String>,
}

struct Binder<'a, E, S: ElementSource<E>> {
    src: &'a S,
    missing: Vec<String>,
    warnings: Vec<String>,
    _e: std::marker::PhantomData<E>,
}

impl<E: Clone, S: ElementSource<E>> Binder<'_, E, S> {
    fn required(&mut self, id: &str) -> Option<E> {
        let found = self.src.by_id(id);
        if found.is_none() {
            self.missing.push(format!("#{id}"));
        }
        found
    }

    fn required_in(&mut self, scope: Option<&E>, selector: &str) -> Option<E> {
        let found = scope.and_then(|s| self.src.within(s, selector));
        if found.is_none() {
            self.missing.push(selector.to_string());
        }
        found
    }

    fn modal(&mut self, name: &str, modal: &str, open: &str, close: &str, content: Option<&str>) -> Option<ModalBindings<E>> {
        let modal_el = self.src.by_id(modal);
        let open_el = self.src.by_id(open);
        let close_el = modal_el.as_ref().and_then(|m| self.src.within(m, close));
        let content_el = content.and_then(|id| self.src.by_id(id));
        match (modal_el, open_el, close_el) {
            (Some(modal), Some(open), Some(close)) if content.is_none() || content_el.is_some() => {
                Some(ModalBindings { modal, open, close, content: content_el })
            }
            (None, None, _) => None,
            _ => {
                self.warnings.push(format!("{name} modal elements incomplete; modal disabled"));
                None
            }
        }
    }
}

impl<E: Clone> HiveBindings<E> {
    pub fn bind<S: ElementSource<E>>(src: &S) -> Result<Self, ViewError> {
        let mut b = Binder { src, missing: Vec::new(), warnings: Vec::new(), _e: std::marker::PhantomData };
        let submit = b.required("submit-guess");
        let message = b.required("message-area");
        let score = b.required("score");
        let rank = b.required("rank");
        let guess = b.required("current-guess-display");
        let delete = b.required("delete-char");
        let shuffle = b.required("shuffle-letters");
        let hive_svg = b.required("hive-svg");
        let outer_group = b.required_in(hive_svg.as_ref(), ".outer-segments-group");
        let center_group = b.required_in(hive_svg.as_ref(), ".center-group");
        let new_game = b.required("new-game-button");

        let found_words = b.modal(
            "found words",
            "found-words-modal",
            "show-found-words-button",
            ".modal-close-button",
            Some("modal-found-words-list"),
        );
        let ranks = b.modal("ranks", "ranks-modal", "ranks-button", ".ranks-close-button", Some("ranks-list"));
        let settings = b.modal("settings", "settings-modal", "settings-button", ".settings-close-button", None);

        let dictionary = {
            let parts = (
                src.by_id("dictionary-modal"),
                src.by_id("dictionary-modal-close-btn"),
                src.by_id("confirm-start-game-btn"),
                src.by_id("dictionary-options-container"),
                src.by_id("dictionary-options-loading"),
                src.by_id("dictionary-options-error"),
            );
            match parts {
                (Some(modal), Some(close), Some(confirm), Some(options), Some(loading), Some(error)) => {
                    Some(DictionaryBindings { modal, close, confirm, options, loading, error })
                }
                _ => {
                    b.warnings.push("dictionary modal elements are missing; new game disabled".into());
                    None
                }
            }
        };

        let (
            Some(submit),
            Some(message),
            Some(score),
            Some(rank),
            Some(guess),
            Some(delete),
            Some(shuffle),
            Some(hive_svg),
            Some(outer_group),
            Some(center_group),
            Some(new_game),
        ) = (submit, message, score, rank, guess, delete, shuffle, hive_svg, outer_group, center_group, new_game)
        else {
            return Err(ViewError::Missing(b.missing));
        };

        Ok(Self {
            submit,
            message,
            score,
            rank,
            guess,
            delete,
            shuffle,
            hive_svg,
            outer_group,
            center_group,
            new_game,
            found_count: src.by_id("found-words-count"),
            total_words: src.by_id("total-words"),
            words_remaining: src.by_id("words-remaining"),
            ticker: src.by_id("recent-words-ticker"),
            category_stats: src.by_id("category-stats"),
            found_words,
            ranks,
            settings,
            dictionary,
            warnings: b.warnings,
        })
    }
}

// --- Render models --------------------------------------------------------------

/// One row of the found-words list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundRow {
    pub word: String,
    pub text: String,
    pub pangram: bool,
    pub definition: Option<String>,
}

pub fn found_rows(state: &ViewState) -> Vec<FoundRow> {
    state
        .found
        .iter()
        .map(|FoundWord { word, pangram }| FoundRow {
            word: word.clone(),
            text: word.to_uppercase(),
            pangram: *pangram,
            definition: state.definition.as_ref().filter(|d| &d.word == word).map(|d| d.body.text()),
        })
        .collect()
}

pub fn ticker_words(state: &ViewState) -> Vec<String> {
    state.ticker.words().map(str::to_uppercase).collect()
}

pub fn category_line(cat: &CategoryStat) -> String {
    format!("{}: {}/{}", cat.label, cat.found, cat.total)
}

pub fn rank_lines(state: &ViewState) -> Vec<(String, bool)> {
    let score: u32 = state.score.trim().parse().unwrap_or(0);
    let reached = reached_index(score, state.total_score);
    rank_rows(state.total_score)
        .into_iter()
        .enumerate()
        .map(|(i, r)| (format!("{} ({})", r.name, r.points), i == reached))
        .collect()
}

// --- DOM rendering -------------------------------------------------------------------

fn set_shown(el: &Element, shown: bool, display: &str) {
    if let Some(h) = el.dyn_ref::<HtmlElement>() {
        let _ = h.style().set_property("display", if shown { display } else { "none" });
    }
}

fn set_disabled(el: &Element, disabled: bool) {
    let _ = if disabled { el.set_attribute("disabled", "") } else { el.remove_attribute("disabled") };
}

fn icon_node(doc: &Document, icon: &Icon) -> Result<Element, ViewError> {
    Ok(match icon {
        Icon::Emoji(e) => {
            let span = doc.create_element("span")?;
            span.set_class_name("list-icon");
            span.set_text_content(Some(e));
            span
        }
        Icon::Image(src) => {
            let img = doc.create_element("img")?;
            img.set_class_name("list-icon");
            img.set_attribute("src", src)?;
            img.set_attribute("alt", "")?;
            img
        }
    })
}

impl HiveBindings<Element> {
    fn doc(&self) -> Result<Document, ViewError> {
        self.guess.owner_document().ok_or_else(|| ViewError::Dom("element detached from document".into()))
    }

    pub fn render_guess(&self, state: &ViewState) {
        self.guess.set_text_content(Some(&state.guess_text()));
    }

    pub fn shake_guess(&self, on: bool) {
        let _ = self.guess.class_list().toggle_with_force(SHAKE, on);
    }

    pub fn set_submit_busy(&self, busy: bool) {
        set_disabled(&self.submit, busy);
    }

    pub fn render_scoreboard(&self, state: &ViewState) {
        self.score.set_text_content(Some(&state.score));
        self.rank.set_text_content(Some(&state.rank));
        if let Some(el) = &self.found_count {
            el.set_text_content(Some(&state.found_count.to_string()));
        }
        if let (Some(el), Some(total)) = (&self.total_words, state.total_words) {
            el.set_text_content(Some(&total.to_string()));
        }
        if let (Some(el), Some(left)) = (&self.words_remaining, state.words_remaining()) {
            el.set_text_content(Some(&left.to_string()));
        }
    }

    pub fn render_banner(&self, state: &ViewState) {
        match &state.banner {
            Some(b) => {
                self.message.set_text_content(Some(&b.text));
                self.message.set_class_name(&b.class);
            }
            None => {
                self.message.set_text_content(Some(""));
                self.message.set_class_name("");
            }
        }
    }

    pub fn render_found_words(&self, state: &ViewState) -> Result<(), ViewError> {
        let Some(list) = self.found_words.as_ref().and_then(|m| m.content.as_ref()) else {
            return Ok(());
        };
        let doc = self.doc()?;
        list.set_inner_html("");
        for row in found_rows(state) {
            let li = doc.create_element("li")?;
            li.set_attribute("data-word", &row.word)?;
            if row.pangram {
                li.set_class_name("pangram");
            }
            li.set_text_content(Some(&row.text));
            if let Some(text) = row.definition {
                let div = doc.create_element("div")?;
                div.set_class_name("definition-display");
                div.set_text_content(Some(&text));
                li.append_child(&div)?;
            }
            list.append_child(&li)?;
        }
        Ok(())
    }

    pub fn render_ticker(&self, state: &ViewState) -> Result<(), ViewError> {
        let Some(ticker) = &self.ticker else {
            return Ok(());
        };
        let words = ticker_words(state);
        if words.is_empty() {
            ticker.set_inner_html("<span class=\"ticker-placeholder\">&nbsp;</span>");
            return Ok(());
        }
        let doc = self.doc()?;
        ticker.set_inner_html("");
        for w in words {
            let span = doc.create_element("span")?;
            span.set_text_content(Some(&w));
            ticker.append_child(&span)?;
        }
        Ok(())
    }

    pub fn render_categories(&self, state: &ViewState) -> Result<(), ViewError> {
        let Some(panel) = &self.category_stats else {
            return Ok(());
        };
        let doc = self.doc()?;
        panel.set_inner_html("");
        for cat in &state.categories {
            let row = doc.create_element("div")?;
            row.set_class_name("category-stat");
            row.set_attribute("data-list", &cat.id)?;
            if let Some(icon) = &cat.icon {
                let icon_el = icon_node(&doc, icon)?;
                row.append_child(&icon_el)?;
            }
            let text = doc.create_element("span")?;
            text.set_text_content(Some(&category_line(cat)));
            row.append_child(&text)?;
            panel.append_child(&row)?;
        }
        Ok(())
    }

    pub fn render_ranks(&self, state: &ViewState) -> Result<(), ViewError> {
        let Some(list) = self.ranks.as_ref().and_then(|m| m.content.as_ref()) else {
            return Ok(());
        };
        let doc = self.doc()?;
        list.set_inner_html("");
        for (line, reached) in rank_lines(state) {
            let li = doc.create_element("li")?;
            if reached {
                li.set_class_name("current-rank");
            }
            li.set_text_content(Some(&line));
            list.append_child(&li)?;
        }
        Ok(())
    }

    pub fn render_modals(&self, state: &ViewState) {
        let toggle = |m: &Option<ModalBindings<Element>>, kind| {
            if let Some(m) = m {
                let _ = m.modal.class_list().toggle_with_force(MODAL_OPEN, state.is_open(kind));
            }
        };
        toggle(&self.found_words, ModalKind::FoundWords);
        toggle(&self.ranks, ModalKind::Ranks);
        toggle(&self.settings, ModalKind::Settings);
        if let Some(d) = &self.dictionary {
            set_shown(&d.modal, state.is_open(ModalKind::Dictionary), "flex");
        }
    }

    /// Rebuild the option checkboxes from state. Only call when the option
    /// list itself changed; it discards the user's current ticks.
    pub fn render_dictionary_options(&self, state: &ViewState) -> Result<(), ViewError> {
        let Some(d) = &self.dictionary else {
            return Ok(());
        };
        let doc = self.doc()?;
        d.options.set_inner_html("");
        for opt in &state.dictionary.options {
            let label = doc.create_element("label")?;
            let input = doc.create_element("input")?;
            input.set_attribute("type", "checkbox")?;
            input.set_attribute("name", OPTION_INPUT_NAME)?;
            input.set_attribute("value", &opt.id)?;
            input.set_id(&format!("dict-opt-{}", opt.id));
            if opt.selected {
                input.set_attribute("checked", "")?;
            }
            if !opt.optional {
                input.set_attribute("disabled", "")?;
            }
            label.append_child(&input)?;
            if let Some(icon) = &opt.icon {
                let icon_el = icon_node(&doc, icon)?;
                label.append_child(&icon_el)?;
            }
            label.append_child(&doc.create_text_node(&format!(" {}", opt.label)))?;
            d.options.append_child(&label)?;
        }
        Ok(())
    }

    pub fn render_dictionary_status(&self, state: &ViewState) {
        let Some(d) = &self.dictionary else {
            return;
        };
        let panel = &state.dictionary;
        set_shown(&d.loading, panel.loading, "block");
        match &panel.error {
            Some(msg) => {
                d.error.set_text_content(Some(msg));
                set_shown(&d.error, true, "block");
            }
            None => set_shown(&d.error, false, "block"),
        }
        set_disabled(&d.confirm, panel.starting || !panel.confirm_enabled);
        d.confirm.set_text_content(Some(if panel.starting { CONFIRM_BUSY_LABEL } else { CONFIRM_LABEL }));
    }

    /// Ids of the ticked checkboxes. Locked (disabled) lists still count.
    pub fn checked_options(&self) -> Vec<String> {
        let Some(d) = &self.dictionary else {
            return Vec::new();
        };
        let selector = format!("input[type=\"checkbox\"][name=\"{OPTION_INPUT_NAME}\"]:checked");
        let Ok(nodes) = d.options.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .filter_map(|el| el.get_attribute("value"))
            .collect()
    }

    pub fn disable_new_game(&self) {
        set_disabled(&self.new_game, true);
    }

    // Hive ---------------------------------------------------------------------

    /// Read a hive that the server already rendered into the page.
    pub fn read_hive(&self) -> Option<Hive> {
        let center = self.center_group.get_attribute("data-letter")?.chars().next()?;
        let nodes = self.outer_group.query_selector_all(".outer-segment-group[data-letter]").ok()?;
        let outer: Vec<char> = (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .filter_map(|el| el.get_attribute("data-letter"))
            .filter_map(|l| l.chars().next())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let hive = Hive::new(center.to_ascii_lowercase(), outer);
        hive.is_playable().then_some(hive)
    }

    pub fn clear_hive(&self) {
        self.outer_group.set_inner_html("");
        self.center_group.set_inner_html("");
        let _ = self.center_group.remove_attribute("data-letter");
    }

    pub fn set_spinning(&self, on: bool) {
        let _ = self.outer_group.class_list().toggle_with_force(SPINNING, on);
    }

    /// Create one cell with its label hidden.
    pub fn build_segment(&self, seg: &Segment) -> Result<(), ViewError> {
        let doc = self.doc()?;
        let letter = seg.letter.to_ascii_lowercase().to_string();
        let path = doc.create_element_ns(Some(SVG_NS), "path")?;
        path.set_attribute("d", &seg.path)?;
        if let Some(t) = seg.transform() {
            path.set_attribute("transform", &t)?;
        }
        let text = doc.create_element_ns(Some(SVG_NS), "text")?;
        text.set_attribute("x", &format!("{:.2}", seg.label.0))?;
        text.set_attribute("y", &format!("{:.2}", seg.label.1))?;
        text.set_attribute("text-anchor", "middle")?;
        text.set_attribute("dominant-baseline", "central")?;
        text.set_text_content(Some(&seg.label_text()));
        match seg.slot {
            SegmentSlot::Outer(i) => {
                let group = doc.create_element_ns(Some(SVG_NS), "g")?;
                group.set_attribute("class", "hive-cell-group outer-segment-group")?;
                group.set_attribute("data-letter", &letter)?;
                group.set_attribute("data-index", &i.to_string())?;
                path.set_attribute("class", "hive-segment outer-segment")?;
                text.set_attribute("class", "hive-letter outer-letter hidden")?;
                text.set_id(&format!("outer-letter-{i}"));
                group.append_child(&path)?;
                group.append_child(&text)?;
                self.outer_group.append_child(&group)?;
            }
            SegmentSlot::Center => {
                path.set_attribute("class", "hive-segment center-segment")?;
                text.set_attribute("class", "hive-letter center-letter hidden")?;
                self.center_group.append_child(&path)?;
                self.center_group.append_child(&text)?;
                self.center_group.set_attribute("data-letter", &letter)?;
            }
        }
        Ok(())
    }

    fn label_for(&self, slot: SegmentSlot) -> Option<Element> {
        let sel = match slot {
            SegmentSlot::Outer(i) => format!("#outer-letter-{i}"),
            SegmentSlot::Center => ".center-letter".to_string(),
        };
        let scope = match slot {
            SegmentSlot::Outer(_) => &self.outer_group,
            SegmentSlot::Center => &self.center_group,
        };
        scope.query_selector(&sel).ok().flatten()
    }

    pub fn show_label(&self, slot: SegmentSlot) {
        if let Some(label) = self.label_for(slot) {
            let _ = label.class_list().remove_1(HIDDEN);
        }
    }

    /// Push a reshuffled outer ring into the existing segments.
    pub fn apply_outer_letters(&self, hive: &Hive) {
        for (i, letter) in hive.outer.iter().enumerate() {
            let Some(text) = self.label_for(SegmentSlot::Outer(i)) else {
                continue;
            };
            text.set_text_content(Some(&letter.to_ascii_uppercase().to_string()));
            if let Ok(Some(group)) = text.closest(".outer-segment-group") {
                let _ = group.set_attribute("data-letter", &letter.to_ascii_lowercase().to_string());
            }
        }
    }
}
