// End-to-end guess handling against the view state, driven by server JSON.
// Native-friendly: nothing here touches wasm/browser APIs.

use spelling_hive::api::GuessResponse;
use spelling_hive::config::HiveConfig;
use spelling_hive::hive::Hive;
use spelling_hive::state::{EMPTY_GUESS, GuessStatus, KeyOutcome, ViewState};
use spelling_hive::view::{found_rows, ticker_words};

fn state() -> ViewState {
    ViewState::new(&HiveConfig::default())
}

fn type_word(s: &mut ViewState, word: &str) {
    for c in word.chars() {
        s.press_letter(c);
    }
}

#[test]
fn valid_guess_updates_score_rank_list_and_clears_bar() {
    let mut s = state();
    type_word(&mut s, "hive");
    let guess = s.begin_submit().expect("guess should be submittable");
    assert_eq!(guess, "hive");

    let resp: GuessResponse = serde_json::from_str(
        r#"{"status":"valid","score":12,"rank":"Good","found_words_count":3,"found_words":["hive","have","give"]}"#,
    )
    .unwrap();
    let applied = s.apply_guess(&guess, &resp);
    s.end_submit();

    assert_eq!(applied.status, GuessStatus::Valid);
    assert!(applied.cleared);
    assert_eq!(s.score, "12");
    assert_eq!(s.rank, "Good");
    assert_eq!(s.found_count, 3);
    assert_eq!(found_rows(&s).len(), 3);
    assert_eq!(s.guess(), "");
    assert_eq!(s.guess_text(), EMPTY_GUESS);
    assert_eq!(ticker_words(&s), vec!["HIVE"]);
    assert!(applied.expire.is_some());
}

#[test]
fn already_found_clears_but_does_not_grow_lists() {
    let mut s = state();
    type_word(&mut s, "hive");
    let guess = s.begin_submit().unwrap();
    let resp: GuessResponse =
        serde_json::from_str(r#"{"message":"Already found!","valid":false,"word":"hive"}"#).unwrap();
    let applied = s.apply_guess(&guess, &resp);
    assert_eq!(applied.status, GuessStatus::Invalid);
    assert!(applied.cleared);
    assert!(s.found.is_empty());
    assert!(s.ticker.is_empty());
    let banner = s.banner.as_ref().unwrap();
    assert_eq!(banner.text, "Already found!");
    assert_eq!(banner.class, "message-invalid");
}

#[test]
fn rejected_word_keeps_guess_for_editing() {
    let mut s = state();
    type_word(&mut s, "hvie");
    let guess = s.begin_submit().unwrap();
    let resp: GuessResponse = serde_json::from_str(r#"{"message":"Not a valid word.","valid":false}"#).unwrap();
    let applied = s.apply_guess(&guess, &resp);
    s.end_submit();
    assert!(!applied.cleared);
    assert_eq!(s.guess(), "hvie");
}

#[test]
fn per_category_counts_and_pangram_flag() {
    let mut s = state();
    let start: spelling_hive::api::StartGameResponse = serde_json::from_str(
        r#"{"success":true,"center_letter":"t","all_letters":["t","a","b","c","d","e","f"],
            "word_counts_by_type":{"animals":{"found":0,"total":4},"csw21":{"found":0,"total":20}},
            "active_dict_metadata":{"animals":{"label":"Animals","icon_type":"emoji","icon_value":"🐾"}}}"#,
    )
    .unwrap();
    let ticket = s.begin_new_game();
    s.apply_new_game(ticket, &start);
    assert_eq!(s.total_words, Some(24));

    let resp: GuessResponse = serde_json::from_str(
        r#"{"valid":true,"word":"fabcdet","score":17,"rank":"Sweet As","is_pangram":true,
            "updated_list_type":"animals","new_found_count":1}"#,
    )
    .unwrap();
    s.apply_guess("fabcdet", &resp);
    assert_eq!(s.categories.iter().find(|c| c.id == "animals").unwrap().found, 1);
    assert_eq!(s.found_count, 1);
    assert_eq!(s.words_remaining(), Some(23));
    assert!(s.found[0].pangram);
}

#[test]
fn finished_banner_does_not_expire() {
    let mut s = state();
    type_word(&mut s, "last");
    let guess = s.begin_submit().unwrap();
    let resp: GuessResponse = serde_json::from_str(
        r#"{"valid":true,"all_found":true,"message":"Congratulations! You found all the words!","word":"last"}"#,
    )
    .unwrap();
    let applied = s.apply_guess(&guess, &resp);
    assert_eq!(applied.status, GuessStatus::Finished);
    assert_eq!(applied.expire, None);
}

#[test]
fn keystroke_filter_against_loaded_puzzle() {
    let mut s = state();
    s.seed_hive(Hive::new('g', vec!['a', 'b', 'c', 'd', 'e', 'f']));
    assert_eq!(s.press_letter('x'), KeyOutcome::Rejected);
    assert_eq!(s.guess(), "");
    assert_eq!(s.press_letter('a'), KeyOutcome::Appended);
    assert_eq!(s.guess(), "a");
}

#[test]
fn any_key_accepted_before_a_game_loads() {
    let mut s = state();
    assert!(s.valid_letters().is_empty());
    assert_eq!(s.press_letter('x'), KeyOutcome::Appended);
    assert_eq!(s.press_letter('z'), KeyOutcome::Appended);
    assert_eq!(s.guess(), "xz");
}

#[test]
fn ticker_holds_seven_most_recent() {
    let mut s = state();
    let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india"];
    for w in words {
        let resp = GuessResponse { valid: Some(true), word: Some(w.to_string()), ..Default::default() };
        s.apply_guess(w, &resp);
    }
    assert_eq!(
        ticker_words(&s),
        vec!["INDIA", "HOTEL", "GOLF", "FOXTROT", "ECHO", "DELTA", "CHARLIE"]
    );
}

#[test]
fn definition_toggle_sequence() {
    let mut s = state();
    s.toggle_definition("hive");
    s.toggle_definition("hive");
    assert!(s.definition.is_none());
    s.toggle_definition("hive");
    s.toggle_definition("give");
    assert_eq!(s.definition.as_ref().unwrap().word, "give");
}
