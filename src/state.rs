//! View state owned by the controller.
//!
//! Nothing in here touches the DOM: handlers call a transition, then ask the
//! view layer to re-render from the resulting state. That keeps every rule
//! about guesses, banners, definitions and new games testable natively.

use std::collections::{BTreeSet, VecDeque};

use crate::api::{ApiError, DictionaryOption, GuessResponse, Icon, StartGameRequest, StartGameResponse};
use crate::config::HiveConfig;
use crate::hive::Hive;
use crate::hive::shuffle::IndexSource;
use crate::ranks::RANK_LADDER;

pub const EMPTY_GUESS: &str = "\u{a0}";
pub const SELECT_AT_LEAST_ONE: &str = "Please select at least one word list.";
pub const NO_WORD_LISTS: &str = "No word lists available.";
pub const NEW_GAME_STARTED: &str = "New game started!";
pub const DISPLAY_ERROR: &str = "Error updating display.";
pub const LOADING_DEFINITION: &str = "Loading definition...";
pub const NO_DEFINITION: &str = "Definition not available.";

// --- Guess outcome ----------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuessStatus {
    Valid,
    Finished,
    Invalid,
    Other(String),
}

impl GuessStatus {
    pub fn of(resp: &GuessResponse) -> Self {
        match resp.status.as_deref() {
            Some("valid") => GuessStatus::Valid,
            Some("finished") => GuessStatus::Finished,
            Some("invalid") => GuessStatus::Invalid,
            Some(other) => GuessStatus::Other(other.to_string()),
            None => match resp.valid {
                Some(true) if resp.all_found => GuessStatus::Finished,
                Some(true) => GuessStatus::Valid,
                _ => GuessStatus::Invalid,
            },
        }
    }

    pub fn accepted(&self) -> bool {
        matches!(self, GuessStatus::Valid | GuessStatus::Finished)
    }

    pub fn as_str(&self) -> &str {
        match self {
            GuessStatus::Valid => "valid",
            GuessStatus::Finished => "finished",
            GuessStatus::Invalid => "invalid",
            GuessStatus::Other(s) => s,
        }
    }

    pub fn class_name(&self) -> String {
        format!("message-{}", self.as_str())
    }
}

/// Decides whether a server answer empties the guess bar.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearPolicy {
    messages: Vec<String>,
}

impl ClearPolicy {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn should_clear(&self, status: &GuessStatus, message: &str) -> bool {
        status.accepted() || self.messages.iter().any(|m| m == message)
    }
}

// --- Keyboard ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Submit,
    Delete,
    Letter(char),
    Ignore,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KeyContext {
    pub modifier: bool,
    pub in_text_field: bool,
    pub modal_open: bool,
}

pub fn interpret_key(key: &str, ctx: KeyContext) -> KeyCommand {
    if ctx.modifier || ctx.in_text_field || ctx.modal_open {
        return KeyCommand::Ignore;
    }
    match key {
        "Enter" => KeyCommand::Submit,
        "Backspace" => KeyCommand::Delete,
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => KeyCommand::Letter(c.to_ascii_lowercase()),
                _ => KeyCommand::Ignore,
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Appended,
    Rejected,
}

// --- Ticker -----------------------------------------------------------------

/// Most-recent-first list of accepted words; the oldest falls off the end.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticker {
    words: VecDeque<String>,
    capacity: usize,
}

impl Ticker {
    pub fn new(capacity: usize) -> Self {
        Self { words: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, word: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.words.push_front(word.into());
        self.words.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// --- Found words & definitions ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundWord {
    pub word: String,
    pub pangram: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionBody {
    Loading,
    Text(String),
    Error(String),
}

impl DefinitionBody {
    pub fn text(&self) -> String {
        match self {
            DefinitionBody::Loading => LOADING_DEFINITION.to_string(),
            DefinitionBody::Text(t) if t.trim().is_empty() => NO_DEFINITION.to_string(),
            DefinitionBody::Text(t) => t.clone(),
            DefinitionBody::Error(e) => format!("Error: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionPanel {
    pub word: String,
    pub body: DefinitionBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionToggle {
    /// Panel opened; the caller should fetch this word.
    Opened(String),
    Closed,
}

// --- Modals & banner ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModalKind {
    FoundWords,
    Ranks,
    Dictionary,
    Settings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub class: String,
    pub serial: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryStat {
    pub id: String,
    pub label: String,
    pub icon: Option<Icon>,
    pub found: u32,
    pub total: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DictionaryPanel {
    pub loading: bool,
    pub options: Vec<DictionaryOption>,
    pub error: Option<String>,
    pub error_serial: u64,
    pub confirm_enabled: bool,
    pub starting: bool,
}

/// What `apply_guess` decided, for the controller to schedule follow-ups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessApplied {
    pub status: GuessStatus,
    pub cleared: bool,
    /// Serial of a banner that should auto-expire.
    pub expire: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NewGameApplied {
    /// A newer request superseded this one.
    Stale,
    Applied {
        hive: Option<Hive>,
        center_radius: Option<f64>,
        banner_serial: u64,
    },
}

// --- ViewState ----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ViewState {
    guess: String,
    valid_letters: BTreeSet<char>,
    pub hive: Option<Hive>,
    pub total_score: u32,
    pub total_words: Option<u32>,
    pub score: String,
    pub rank: String,
    pub found: Vec<FoundWord>,
    pub found_count: u32,
    pub ticker: Ticker,
    pub categories: Vec<CategoryStat>,
    pub definition: Option<DefinitionPanel>,
    modals: BTreeSet<ModalKind>,
    pub banner: Option<Banner>,
    next_serial: u64,
    submitting: bool,
    game_ticket: u64,
    pub dictionary: DictionaryPanel,
    clear_policy: ClearPolicy,
}

impl ViewState {
    pub fn new(config: &HiveConfig) -> Self {
        Self {
            guess: String::new(),
            valid_letters: BTreeSet::new(),
            hive: None,
            total_score: 0,
            total_words: None,
            score: "0".to_string(),
            rank: RANK_LADDER[0].0.to_string(),
            found: Vec::new(),
            found_count: 0,
            ticker: Ticker::new(config.ticker_capacity),
            categories: Vec::new(),
            definition: None,
            modals: BTreeSet::new(),
            banner: None,
            next_serial: 0,
            submitting: false,
            game_ticket: 0,
            dictionary: DictionaryPanel::default(),
            clear_policy: ClearPolicy::new(config.clear_on_messages.clone()),
        }
    }

    /// Adopt a hive that was already on the page when the controller mounted.
    pub fn seed_hive(&mut self, hive: Hive) {
        self.valid_letters = hive.letters();
        self.hive = Some(hive);
    }

    pub fn valid_letters(&self) -> &BTreeSet<char> {
        &self.valid_letters
    }

    // Guess composer -------------------------------------------------------

    pub fn guess(&self) -> &str {
        &self.guess
    }

    pub fn guess_text(&self) -> String {
        if self.guess.is_empty() {
            EMPTY_GUESS.to_string()
        } else {
            self.guess.to_uppercase()
        }
    }

    /// Clicks come from `data-letter` attributes, which only carry hive letters.
    pub fn push_clicked(&mut self, letter: char) {
        if letter.is_ascii_alphabetic() {
            self.guess.push(letter.to_ascii_lowercase());
        }
    }

    pub fn press_letter(&mut self, letter: char) -> KeyOutcome {
        let letter = letter.to_ascii_lowercase();
        if !letter.is_ascii_alphabetic() {
            return KeyOutcome::Rejected;
        }
        // No game loaded yet: accept everything.
        if !self.valid_letters.is_empty() && !self.valid_letters.contains(&letter) {
            return KeyOutcome::Rejected;
        }
        self.guess.push(letter);
        KeyOutcome::Appended
    }

    pub fn delete_last(&mut self) {
        self.guess.pop();
    }

    pub fn clear_guess(&mut self) {
        self.guess.clear();
    }

    /// Reorder the outer ring. Returns false when there is no hive to shuffle.
    pub fn shuffle(&mut self, rng: &mut impl IndexSource) -> bool {
        match self.hive.as_mut() {
            Some(hive) if hive.outer.len() > 1 => {
                hive.shuffle_outer(rng);
                true
            }
            _ => false,
        }
    }

    // Modals -----------------------------------------------------------------

    pub fn open_modal(&mut self, kind: ModalKind) {
        self.modals.insert(kind);
    }

    pub fn close_modal(&mut self, kind: ModalKind) {
        self.modals.remove(&kind);
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.modals.contains(&kind)
    }

    pub fn any_modal_open(&self) -> bool {
        !self.modals.is_empty()
    }

    // Banner -----------------------------------------------------------------

    pub fn set_message(&mut self, text: impl Into<String>, class: impl Into<String>) -> u64 {
        self.next_serial += 1;
        self.banner = Some(Banner { text: text.into(), class: class.into(), serial: self.next_serial });
        self.next_serial
    }

    /// Clears the banner only if it is still the one identified by `serial`.
    pub fn expire_message(&mut self, serial: u64) -> bool {
        if self.banner.as_ref().is_some_and(|b| b.serial == serial) {
            self.banner = None;
            true
        } else {
            false
        }
    }

    // Submission -------------------------------------------------------------

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Claim the single submission slot. `None` for an empty guess or while
    /// another submission is in flight.
    pub fn begin_submit(&mut self) -> Option<String> {
        let guess = self.guess.trim().to_ascii_lowercase();
        if guess.is_empty() || self.submitting {
            return None;
        }
        self.submitting = true;
        Some(guess)
    }

    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    pub fn apply_guess(&mut self, guess: &str, resp: &GuessResponse) -> GuessApplied {
        let status = GuessStatus::of(resp);
        let message = resp.message.clone().unwrap_or_default();

        if let Some(score) = &resp.score {
            self.score = score.clone();
        }
        if let Some(rank) = &resp.rank {
            self.rank = rank.clone();
        }

        let accepted_word = resp.word.clone().unwrap_or_else(|| guess.to_string());
        if let Some(list) = &resp.found_words {
            let previous = std::mem::take(&mut self.found);
            self.found = list
                .iter()
                .map(|w| FoundWord {
                    pangram: previous.iter().any(|p| p.word == *w && p.pangram)
                        || (resp.is_pangram && w.eq_ignore_ascii_case(&accepted_word)),
                    word: w.clone(),
                })
                .collect();
        } else if status.accepted() {
            self.found.push(FoundWord { word: accepted_word.clone(), pangram: resp.is_pangram });
        }

        if let (Some(list_id), Some(count)) = (&resp.updated_list_type, resp.new_found_count) {
            if let Some(cat) = self.categories.iter_mut().find(|c| &c.id == list_id) {
                cat.found = count;
            }
        }
        self.found_count = resp.found_words_count.unwrap_or(self.found.len() as u32);

        if status.accepted() {
            self.ticker.push(accepted_word);
        }

        let serial = self.set_message(message.clone(), status.class_name());
        let cleared = self.clear_policy.should_clear(&status, &message);
        if cleared {
            self.clear_guess();
        }
        let expire = (status != GuessStatus::Finished && !resp.all_found).then_some(serial);
        GuessApplied { status, cleared, expire }
    }

    pub fn fail_submit(&mut self, err: &ApiError) {
        self.set_message(format!("Error: {err}"), "message-error");
    }

    pub fn words_remaining(&self) -> Option<u32> {
        self.total_words.map(|t| t.saturating_sub(self.found_count))
    }

    // Definitions --------------------------------------------------------------

    pub fn toggle_definition(&mut self, word: &str) -> DefinitionToggle {
        if self.definition.as_ref().is_some_and(|d| d.word == word) {
            self.definition = None;
            return DefinitionToggle::Closed;
        }
        self.definition = Some(DefinitionPanel { word: word.to_string(), body: DefinitionBody::Loading });
        DefinitionToggle::Opened(word.to_string())
    }

    /// Fill in a fetched definition. Dropped if the panel was closed or moved.
    pub fn resolve_definition(&mut self, word: &str, result: Result<String, ApiError>) -> bool {
        match self.definition.as_mut() {
            Some(panel) if panel.word == word => {
                panel.body = match result {
                    Ok(text) => DefinitionBody::Text(text),
                    Err(e) => DefinitionBody::Error(e.to_string()),
                };
                true
            }
            _ => false,
        }
    }

    // New-game flow --------------------------------------------------------------

    /// Reopening the picker while a start request is still out abandons that
    /// request, so the next confirm supersedes it.
    pub fn open_dictionary(&mut self) {
        if self.dictionary.starting {
            self.game_ticket += 1;
            self.dictionary.starting = false;
        }
        self.open_modal(ModalKind::Dictionary);
        self.dictionary.loading = true;
        self.dictionary.error = None;
        self.dictionary.options.clear();
    }

    pub fn dictionary_loaded(&mut self, result: Result<Vec<DictionaryOption>, ApiError>) {
        self.dictionary.loading = false;
        match result {
            Ok(options) if options.is_empty() => {
                self.dictionary.error = Some(NO_WORD_LISTS.to_string());
                self.dictionary.confirm_enabled = false;
            }
            Ok(options) => {
                self.dictionary.options = options;
                self.dictionary.confirm_enabled = true;
            }
            Err(e) => {
                self.dictionary.error = Some(format!("Error loading word lists: {e}."));
                self.dictionary.confirm_enabled = false;
            }
        }
    }

    /// Validate the checked ids. On an empty selection the inline error is set
    /// and its serial returned so the caller can hide it later.
    pub fn confirm_selection(&mut self, checked: Vec<String>) -> Result<StartGameRequest, u64> {
        if checked.is_empty() {
            self.dictionary.error_serial += 1;
            self.dictionary.error = Some(SELECT_AT_LEAST_ONE.to_string());
            return Err(self.dictionary.error_serial);
        }
        self.dictionary.error = None;
        Ok(StartGameRequest { selected_lists: checked })
    }

    pub fn expire_selection_error(&mut self, serial: u64) {
        if self.dictionary.error_serial == serial && self.dictionary.error.as_deref() == Some(SELECT_AT_LEAST_ONE) {
            self.dictionary.error = None;
        }
    }

    /// Issue a ticket for a new `/start_game` request; only the newest ticket
    /// is allowed to change the board.
    pub fn begin_new_game(&mut self) -> u64 {
        self.game_ticket += 1;
        self.dictionary.starting = true;
        self.game_ticket
    }

    pub fn new_game_failed(&mut self, ticket: u64, err: &ApiError) -> bool {
        if ticket != self.game_ticket {
            return false;
        }
        self.dictionary.starting = false;
        self.dictionary.error = Some(format!("Error: {err}"));
        true
    }

    pub fn apply_new_game(&mut self, ticket: u64, resp: &StartGameResponse) -> NewGameApplied {
        if ticket != self.game_ticket {
            return NewGameApplied::Stale;
        }
        self.dictionary.starting = false;

        // 1. letter set and total score
        self.valid_letters = resp.letter_set();
        self.total_score = resp.total_score.unwrap_or(0);

        // 2. reset every per-game display
        self.clear_guess();
        self.score = resp.current_score.clone().unwrap_or_else(|| "0".to_string());
        self.rank = resp.rank.clone().unwrap_or_else(|| RANK_LADDER[0].0.to_string());
        self.found.clear();
        self.found_count = 0;
        self.ticker.clear();
        self.definition = None;

        // 3. category panel
        self.categories = category_stats(resp);
        self.total_words = if self.categories.is_empty() {
            None
        } else {
            Some(self.categories.iter().map(|c| c.total).sum())
        };

        self.close_modal(ModalKind::Dictionary);

        let hive = resp.hive().filter(Hive::is_playable);
        self.hive = hive.clone();
        let banner_serial = match &hive {
            Some(_) => self.set_message(resp.message.clone().unwrap_or_else(|| NEW_GAME_STARTED.into()), "message-valid"),
            None => self.set_message(DISPLAY_ERROR, "message-error"),
        };
        NewGameApplied::Applied { hive, center_radius: resp.center_radius, banner_serial }
    }
}

fn category_stats(resp: &StartGameResponse) -> Vec<CategoryStat> {
    let label_for = |id: &str| {
        resp.active_dict_metadata
            .get(id)
            .and_then(|m| m.label.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let icon_for = |id: &str| resp.active_dict_metadata.get(id).and_then(|m| m.icon());
    if resp.word_counts_by_type.is_empty() {
        return resp
            .active_dict_metadata
            .keys()
            .map(|id| CategoryStat { id: id.clone(), label: label_for(id), icon: icon_for(id), found: 0, total: 0 })
            .collect();
    }
    resp.word_counts_by_type
        .iter()
        .map(|(id, count)| CategoryStat {
            id: id.clone(),
            label: label_for(id),
            icon: icon_for(id),
            found: count.found,
            total: count.total,
        })
        .collect()
}
