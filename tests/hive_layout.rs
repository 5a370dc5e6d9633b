// Shuffle and layout invariants for the letter hive.

use spelling_hive::api::StartGameResponse;
use spelling_hive::config::HiveConfig;
use spelling_hive::hive::Hive;
use spelling_hive::hive::geometry::{HiveGeometry, SegmentSlot};
use spelling_hive::hive::sequencer::{RevealAction, Step, reveal_plan};
use spelling_hive::hive::shuffle::Lcg;
use spelling_hive::state::{NewGameApplied, ViewState};

#[test]
fn repeated_shuffles_preserve_puzzle() {
    let mut hive = Hive::new('t', vec!['a', 'b', 'c', 'd', 'e', 'f']);
    let letters = hive.letters();
    let mut sorted_outer = hive.outer.clone();
    sorted_outer.sort_unstable();
    let mut rng = Lcg::new(2024);
    for _ in 0..200 {
        hive.shuffle_outer(&mut rng);
        assert_eq!(hive.center, 't');
        assert_eq!(hive.letters(), letters);
        let mut now = hive.outer.clone();
        now.sort_unstable();
        assert_eq!(now, sorted_outer);
    }
}

#[test]
fn segments_follow_outer_order_then_center() {
    let hive = Hive::new('t', vec!['a', 'b', 'c', 'd', 'e', 'f']);
    let segs = HiveGeometry::default().segments(&hive);
    assert_eq!(segs.len(), 7);
    for (i, seg) in segs.iter().take(6).enumerate() {
        assert_eq!(seg.slot, SegmentSlot::Outer(i));
        assert_eq!(seg.letter, hive.outer[i]);
    }
    assert_eq!(segs[6].slot, SegmentSlot::Center);
    assert_eq!(segs[6].label, (150.0, 150.0));
}

#[test]
fn label_radius_is_midway_between_rings() {
    let g = HiveGeometry::with_inner_radius(Some(40.0));
    assert_eq!(g.label_radius(), (40.0 + g.outer_radius) / 2.0);
    let (x, y) = g.outer_label(0);
    assert!((x - 150.0).abs() < 1e-9);
    assert!((y - (150.0 - g.label_radius())).abs() < 1e-9);
}

/// Fire the outer reveals whose time matches, the way the page's stage does.
fn draw(steps: &[Step], state: &ViewState, ring: &mut [Option<char>], due: impl Fn(u32) -> bool) {
    let hive = state.hive.as_ref().unwrap();
    for step in steps.iter().filter(|st| due(st.at_ms)) {
        if let RevealAction::Reveal(planned) = &step.action {
            if let SegmentSlot::Outer(i) = planned.slot {
                ring[i] = Some(planned.with_current_letter(hive).letter);
            }
        }
    }
}

#[test]
fn shuffle_during_reveal_keeps_every_letter_once() {
    let cfg = HiveConfig::default();
    let mut s = ViewState::new(&cfg);
    let resp: StartGameResponse = serde_json::from_str(
        r#"{"success":true,"center_letter":"t","outer_letters":["a","b","c","d","e","f"],"total_score":50}"#,
    )
    .unwrap();
    let ticket = s.begin_new_game();
    let NewGameApplied::Applied { hive: Some(hive), .. } = s.apply_new_game(ticket, &resp) else {
        panic!("playable hive expected");
    };
    let steps = reveal_plan(&hive, &HiveGeometry::default(), &cfg.timing);

    // Outer ring as drawn on the page; `None` until its reveal fires.
    let mut ring: Vec<Option<char>> = vec![None; 6];
    draw(&steps, &s, &mut ring, |t| t <= 1950);
    assert_eq!(ring.iter().filter(|c| c.is_some()).count(), 3);

    assert!(s.shuffle(&mut Lcg::new(11)));
    // A shuffle rewrites only the cells that already exist.
    let shuffled = s.hive.as_ref().unwrap().outer.clone();
    for (slot, cell) in ring.iter_mut().enumerate() {
        if cell.is_some() {
            *cell = Some(shuffled[slot]);
        }
    }

    draw(&steps, &s, &mut ring, |t| t > 1950);
    let drawn: Vec<char> = ring.iter().map(|c| c.expect("every slot revealed")).collect();
    assert_eq!(drawn, shuffled);
    let mut sorted = drawn.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!['a', 'b', 'c', 'd', 'e', 'f']);
}
