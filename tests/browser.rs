// Browser-only checks for the DOM bindings (wasm-pack test --headless).
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;

use spelling_hive::view::{DomSource, HiveBindings, ViewError};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r#"
<button id="submit-guess"></button><div id="message-area"></div><span id="score"></span>
<span id="rank"></span><div id="current-guess-display"></div><button id="delete-char"></button>
<button id="shuffle-letters"></button><button id="new-game-button"></button>
<svg id="hive-svg">
  <g class="outer-segments-group">
    <g class="outer-segment-group" data-letter="a"><text id="outer-letter-0">A</text></g>
    <g class="outer-segment-group" data-letter="b"><text id="outer-letter-1">B</text></g>
    <g class="outer-segment-group" data-letter="c"><text id="outer-letter-2">C</text></g>
    <g class="outer-segment-group" data-letter="d"><text id="outer-letter-3">D</text></g>
    <g class="outer-segment-group" data-letter="e"><text id="outer-letter-4">E</text></g>
    <g class="outer-segment-group" data-letter="f"><text id="outer-letter-5">F</text></g>
  </g>
  <g class="center-group" data-letter="t"><text class="center-letter">T</text></g>
</svg>
<button id="show-found-words-button"></button>
<div id="found-words-modal">
  <div id="found-words-content"><button class="modal-close-button"></button><ul id="modal-found-words-list"></ul></div>
</div>
"#;

thread_local! {
    static MOUNTED: Cell<bool> = const { Cell::new(false) };
}

/// The page is mounted once per test binary; the controller is a singleton.
fn page() -> Document {
    let doc = web_sys::window().unwrap().document().unwrap();
    if !MOUNTED.with(|m| m.replace(true)) {
        doc.body().unwrap().set_inner_html(PAGE);
        spelling_hive::start_hive().unwrap();
    }
    doc
}

fn click(doc: &Document, id: &str) {
    doc.get_element_by_id(id).unwrap().dyn_into::<HtmlElement>().unwrap().click();
}

fn ring(doc: &Document) -> Vec<(String, String)> {
    let nodes = doc.query_selector_all(".outer-segment-group").unwrap();
    (0..nodes.length())
        .map(|i| nodes.get(i).unwrap().dyn_into::<Element>().unwrap())
        .map(|g| (g.get_attribute("data-letter").unwrap(), g.text_content().unwrap_or_default()))
        .collect()
}

#[wasm_bindgen_test]
fn empty_document_reports_missing_core_elements() {
    let doc = Document::new().unwrap();
    match HiveBindings::bind(&DomSource { doc }) {
        Err(ViewError::Missing(list)) => assert!(list.contains(&"#submit-guess".to_string())),
        other => panic!("expected missing elements, got {:?}", other.map(|_| ())),
    }
}

#[wasm_bindgen_test]
fn mounted_page_renders_guess_placeholder() {
    let doc = page();
    let guess = doc.get_element_by_id("current-guess-display").unwrap();
    assert_eq!(guess.text_content().as_deref(), Some("\u{a0}"));
}

#[wasm_bindgen_test]
fn shuffle_rewrites_labels_and_data_letters_together() {
    let doc = page();
    for _ in 0..5 {
        click(&doc, "shuffle-letters");
        let cells = ring(&doc);
        let mut letters: Vec<String> = cells.iter().map(|(l, _)| l.clone()).collect();
        letters.sort();
        assert_eq!(letters, vec!["a", "b", "c", "d", "e", "f"]);
        for (letter, label) in &cells {
            assert_eq!(label.trim(), letter.to_uppercase());
        }
    }
    let center = doc.query_selector(".center-group").unwrap().unwrap();
    assert_eq!(center.get_attribute("data-letter").as_deref(), Some("t"));
}

#[wasm_bindgen_test]
fn backdrop_click_closes_modal_but_content_click_does_not() {
    let doc = page();
    let modal = doc.get_element_by_id("found-words-modal").unwrap();
    click(&doc, "show-found-words-button");
    assert!(modal.class_list().contains("modal-open"));
    click(&doc, "found-words-content");
    assert!(modal.class_list().contains("modal-open"));
    click(&doc, "found-words-modal");
    assert!(!modal.class_list().contains("modal-open"));
}
