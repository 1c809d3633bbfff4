use super::test_support::*;
use crate::{Animatable, FadeIn, WorldClock};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(&'static str, f32)>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Animatable for Recorder {
    fn advance_time(&mut self, passed_time: f32) {
        self.log.borrow_mut().push((self.name, passed_time));
    }
}

fn recorder(name: &'static str, log: &Log) -> Rc<RefCell<Recorder>> {
    Rc::new(RefCell::new(Recorder {
        name,
        log: Rc::clone(log),
    }))
}

/// Edits clock membership from inside its own tick.
struct Meddler {
    clock: Rc<WorldClock>,
    remove: Option<Rc<RefCell<Recorder>>>,
    add: Option<Rc<RefCell<Recorder>>>,
}

impl Animatable for Meddler {
    fn advance_time(&mut self, _passed_time: f32) {
        if let Some(target) = self.remove.take() {
            self.clock.remove(&target);
        }
        if let Some(target) = self.add.take() {
            self.clock.add(target);
        }
    }
}

fn names(log: &Log) -> Vec<&'static str> {
    log.borrow().iter().map(|(name, _)| *name).collect()
}

#[test]
fn ticks_each_target_once_in_registration_order() {
    let log = Log::default();
    let clock = WorldClock::new();
    let a = recorder("a", &log);
    let b = recorder("b", &log);
    clock.add(a.clone());
    clock.add(b.clone());
    clock.set_time_scale(2.0);

    clock.advance_time(0.016);

    let entries = log.borrow().clone();
    assert_eq!(names(&log), ["a", "b"]);
    for (_, passed) in entries {
        assert_approx(passed, 0.032);
    }
    assert_approx(clock.time(), 0.032);
}

#[test]
fn ticks_registered_armatures() {
    let clock = WorldClock::new();
    let first = Rc::new(RefCell::new(standard_rig()));
    let second = Rc::new(RefCell::new(standard_rig()));
    let a = first.borrow_mut().fade_in("walk", FadeIn::default()).unwrap();
    let b = second.borrow_mut().fade_in("wave", FadeIn::default()).unwrap();
    clock.add(first.clone());
    clock.add(second.clone());

    clock.advance_time(0.25);

    let first = first.borrow();
    assert_approx(first.state(a).unwrap().current_time(), 0.25);
    assert_approx(second.borrow().state(b).unwrap().current_time(), 0.25);
    assert_approx(body_x(&first), 4.5);
}

#[test]
fn adding_twice_registers_once() {
    let log = Log::default();
    let clock = WorldClock::new();
    let a = recorder("a", &log);
    clock.add(a.clone());
    clock.add(a.clone());
    assert_eq!(clock.len(), 1);
    assert!(clock.contains(&a));

    clock.advance_time(0.1);
    assert_eq!(names(&log), ["a"]);
}

#[test]
fn removal_is_a_no_op_for_unknown_targets() {
    let log = Log::default();
    let clock = WorldClock::new();
    let a = recorder("a", &log);
    let stranger = recorder("x", &log);
    clock.add(a.clone());

    clock.remove(&stranger);
    assert_eq!(clock.len(), 1);
    clock.remove(&a);
    clock.remove(&a);
    assert!(clock.is_empty());

    clock.add(a.clone());
    clock.add(stranger.clone());
    clock.remove_all();
    clock.advance_time(0.1);
    assert!(log.borrow().is_empty());
}

#[test]
fn membership_changes_during_a_tick_apply_safely() {
    let log = Log::default();
    let clock = Rc::new(WorldClock::new());
    let doomed = recorder("doomed", &log);
    let late = recorder("late", &log);
    let meddler = Rc::new(RefCell::new(Meddler {
        clock: Rc::clone(&clock),
        remove: Some(doomed.clone()),
        add: Some(late.clone()),
    }));
    clock.add(meddler.clone());
    clock.add(doomed.clone());

    clock.advance_time(0.1);
    assert!(log.borrow().is_empty(), "removed target must not tick");
    assert!(clock.contains(&late));
    assert!(!clock.contains(&doomed));

    clock.advance_time(0.1);
    assert_eq!(names(&log), ["late"]);
}

#[test]
fn dropped_targets_are_pruned() {
    let log = Log::default();
    let clock = WorldClock::new();
    let a = recorder("a", &log);
    let b = recorder("b", &log);
    clock.add(a.clone());
    clock.add(b.clone());

    drop(a);
    assert_eq!(clock.len(), 1);
    clock.advance_time(0.1);
    assert_eq!(names(&log), ["b"]);
}

#[test]
fn busy_target_is_skipped() {
    let log = Log::default();
    let clock = WorldClock::new();
    let a = recorder("a", &log);
    let b = recorder("b", &log);
    clock.add(a.clone());
    clock.add(b.clone());

    let _guard = a.borrow_mut();
    clock.advance_time(0.1);
    assert_eq!(names(&log), ["b"]);
}

#[test]
fn invalid_time_scale_resets_to_one() {
    let log = Log::default();
    let clock = WorldClock::with_time(10.0);
    clock.add(recorder("a", &log));
    assert_eq!(clock.time(), 10.0);

    clock.set_time_scale(-1.0);
    assert_eq!(clock.time_scale(), 1.0);
    clock.set_time_scale(f32::NAN);
    assert_eq!(clock.time_scale(), 1.0);

    clock.set_time_scale(0.0);
    assert_eq!(clock.time_scale(), 0.0);
    clock.advance_time(0.5);
    assert_eq!(clock.time(), 10.0);
}

#[test]
fn nested_clocks_compose_time_scales() {
    let log = Log::default();
    let outer = WorldClock::new();
    let inner = Rc::new(RefCell::new(WorldClock::new()));
    let a = recorder("a", &log);
    inner.borrow().add(a.clone());
    inner.borrow().set_time_scale(0.5);
    outer.set_time_scale(2.0);
    outer.add(inner.clone());

    outer.advance_time(0.25);

    assert_eq!(names(&log), ["a"]);
    assert_approx(log.borrow()[0].1, 0.25);
    assert_approx(inner.borrow().time(), 0.25);
    assert_approx(outer.time(), 0.5);
}
