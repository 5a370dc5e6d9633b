//! Reveal animation as data.
//!
//! `reveal_plan` turns a hive into a list of timed steps; `Sequencer` plays a
//! plan on one-shot timers. Starting a new plan drops every pending timer and
//! animation frame of the previous one, so a second new game never interleaves
//! with a stale reveal.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;

use super::geometry::{HiveGeometry, Segment, SegmentSlot};
use super::Hive;
use crate::config::Timing;

#[derive(Clone, Debug, PartialEq)]
pub enum RevealAction {
    ClearHive,
    StartSpin,
    StopSpin,
    /// Build a segment with its label hidden; the label is shown one frame later.
    Reveal(Segment),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Offset from the start of the run.
    pub at_ms: u32,
    pub action: RevealAction,
}

pub fn reveal_plan(hive: &Hive, geometry: &HiveGeometry, timing: &Timing) -> Vec<Step> {
    let mut steps = vec![
        Step { at_ms: 0, action: RevealAction::ClearHive },
        Step { at_ms: 0, action: RevealAction::StartSpin },
        Step { at_ms: timing.spin_ms, action: RevealAction::StopSpin },
    ];
    let segments = geometry.segments(hive);
    let outer_count = segments.iter().filter(|s| s.slot != SegmentSlot::Center).count() as u32;
    for seg in segments {
        let at_ms = match seg.slot {
            SegmentSlot::Outer(i) => timing.spin_ms + i as u32 * timing.stagger_ms,
            SegmentSlot::Center => {
                timing.spin_ms + outer_count * timing.stagger_ms + timing.center_extra_ms
            }
        };
        steps.push(Step { at_ms, action: RevealAction::Reveal(seg) });
    }
    steps
}

/// Performs a step against the page. The second callback runs on the next
/// animation frame after a `Reveal` and un-hides its label.
pub trait StepExecutor {
    fn perform(&self, action: &RevealAction);
    fn after_frame(&self, action: &RevealAction);
}

#[derive(Default)]
struct Pending {
    timers: Vec<Timeout>,
    frames: Vec<AnimationFrame>,
}

#[derive(Default, Clone)]
pub struct Sequencer {
    pending: Rc<RefCell<Pending>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything still scheduled. Dropping a gloo handle cancels it.
    pub fn cancel(&self) {
        let mut p = self.pending.borrow_mut();
        p.timers.clear();
        p.frames.clear();
    }

    pub fn run(&self, steps: Vec<Step>, executor: Rc<dyn StepExecutor>) {
        self.cancel();
        // Zero-delay steps run synchronously so the hive is cleared before we return.
        let (now, later): (Vec<Step>, Vec<Step>) = steps.into_iter().partition(|s| s.at_ms == 0);
        for step in &now {
            self.fire(step.action.clone(), executor.clone());
        }
        let timers: Vec<Timeout> = later
            .into_iter()
            .map(|step| {
                let this = self.clone();
                let exec = executor.clone();
                Timeout::new(step.at_ms, move || this.fire(step.action, exec))
            })
            .collect();
        self.pending.borrow_mut().timers = timers;
    }

    fn fire(&self, action: RevealAction, executor: Rc<dyn StepExecutor>) {
        executor.perform(&action);
        if matches!(action, RevealAction::Reveal(_)) {
            let frame = request_animation_frame(move |_ts| executor.after_frame(&action));
            self.pending.borrow_mut().frames.push(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hive() -> Hive {
        Hive::new('t', vec!['a', 'b', 'c', 'd', 'e', 'f'])
    }

    #[test]
    fn plan_follows_spin_then_stagger_then_center() {
        let steps = reveal_plan(&hive(), &HiveGeometry::default(), &Timing::default());
        let times: Vec<u32> = steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(times, vec![0, 0, 1500, 1500, 1700, 1900, 2100, 2300, 2500, 2800]);
        assert_eq!(steps[0].action, RevealAction::ClearHive);
        assert_eq!(steps[1].action, RevealAction::StartSpin);
        assert_eq!(steps[2].action, RevealAction::StopSpin);
        match &steps.last().unwrap().action {
            RevealAction::Reveal(seg) => {
                assert_eq!(seg.slot, SegmentSlot::Center);
                assert_eq!(seg.label_text(), "T");
            }
            other => panic!("unexpected last step {other:?}"),
        }
    }

    #[test]
    fn outer_reveals_keep_index_order() {
        let steps = reveal_plan(&hive(), &HiveGeometry::default(), &Timing::default());
        let slots: Vec<SegmentSlot> = steps
            .iter()
            .filter_map(|s| match &s.action {
                RevealAction::Reveal(seg) => Some(seg.slot),
                _ => None,
            })
            .collect();
        let mut expected: Vec<SegmentSlot> = (0..6).map(SegmentSlot::Outer).collect();
        expected.push(SegmentSlot::Center);
        assert_eq!(slots, expected);
        assert!(steps.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
    }
}
