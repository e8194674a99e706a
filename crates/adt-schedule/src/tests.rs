//! Unit tests for adt-schedule.

use std::cell::RefCell;
use std::rc::Rc;

use adt_core::{ManualClock, SimDuration, SimTime};

use crate::{BoxedEffect, DelayedActionScheduler, ScheduleError};

// ── Helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<u32>>>;

fn clock_at(t: f64) -> Rc<ManualClock> {
    Rc::new(ManualClock::new(SimTime(t)))
}

fn scheduler(clock: &Rc<ManualClock>) -> DelayedActionScheduler<u32, Rc<ManualClock>> {
    DelayedActionScheduler::new(Rc::clone(clock))
}

/// Tick and collect the payloads that fired, in firing order.
fn fire(s: &mut DelayedActionScheduler<u32, Rc<ManualClock>>, now: f64) -> Vec<u32> {
    let mut fired = vec![];
    s.tick_with(SimTime(now), |_, id| {
        fired.push(id);
        Ok(())
    });
    fired
}

fn secs(s: f64) -> SimDuration {
    SimDuration(s)
}

// ── Scheduling and firing ─────────────────────────────────────────────────────

#[cfg(test)]
mod firing {
    use super::*;

    #[test]
    fn fires_at_first_tick_past_due_time() {
        let clock = clock_at(10.0);
        let mut s = scheduler(&clock);
        s.schedule(secs(2.0), 1).unwrap();

        assert!(fire(&mut s, 11.0).is_empty());
        assert!(fire(&mut s, 11.999).is_empty());
        assert_eq!(fire(&mut s, 12.0), vec![1]);
        assert!(fire(&mut s, 13.0).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn remaining_time_scenario() {
        let clock = clock_at(10.0);
        let mut s = scheduler(&clock);
        let h = s.schedule(secs(2.0), 7).unwrap();
        assert_eq!(h.due_at(), SimTime(12.0));

        clock.set(SimTime(11.0));
        let remaining = s.remaining_time(h).unwrap();
        assert!((remaining.secs() - 1.0).abs() < 1e-9);

        assert_eq!(fire(&mut s, 12.0), vec![7]);
        assert!(fire(&mut s, 13.0).is_empty());

        clock.set(SimTime(13.0));
        assert!(s.remaining_time(h).unwrap().is_elapsed());
        assert!(!s.is_pending(h));
    }

    #[test]
    fn zero_delay_fires_on_next_tick() {
        let clock = clock_at(5.0);
        let mut s = scheduler(&clock);
        s.schedule(SimDuration::ZERO, 3).unwrap();
        assert_eq!(fire(&mut s, 5.0), vec![3]);
    }

    #[test]
    fn fires_in_due_time_order() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        s.schedule(secs(3.0), 3).unwrap();
        s.schedule(secs(1.0), 1).unwrap();
        s.schedule(secs(2.0), 2).unwrap();
        assert_eq!(s.next_due(), Some(SimTime(1.0)));
        assert_eq!(fire(&mut s, 10.0), vec![1, 2, 3]);
    }

    #[test]
    fn equal_due_times_are_fifo() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        s.schedule(secs(1.0), 10).unwrap();
        s.schedule(secs(0.5), 5).unwrap();
        s.schedule(secs(1.0), 11).unwrap();
        s.schedule(secs(1.0), 12).unwrap();
        let queued: Vec<u32> = s.pending().map(|p| *p.payload()).collect();
        assert_eq!(queued, [5, 10, 11, 12]);
        assert_eq!(fire(&mut s, 1.0), vec![5, 10, 11, 12]);
    }

    #[test]
    fn due_time_uses_clock_at_call_time() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        s.schedule(secs(1.0), 1).unwrap(); // due 1.0
        clock.set(SimTime(5.0));
        s.schedule(secs(0.5), 2).unwrap(); // due 5.5
        assert_eq!(fire(&mut s, 5.0), vec![1]);
        assert_eq!(fire(&mut s, 5.5), vec![2]);
    }

    #[test]
    fn time_jump_fires_everything_expired_at_once() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        for i in 1..=5 {
            s.schedule(secs(f64::from(i) * 0.02), i).unwrap();
        }
        assert_eq!(fire(&mut s, 0.07), vec![1, 2, 3]);
        assert_eq!(fire(&mut s, 1.0), vec![4, 5]);
    }

    #[test]
    fn backwards_time_fires_nothing_early() {
        let clock = clock_at(10.0);
        let mut s = scheduler(&clock);
        s.schedule(secs(1.0), 1).unwrap();
        assert!(fire(&mut s, 9.0).is_empty());
        assert!(fire(&mut s, 0.0).is_empty());
        assert_eq!(fire(&mut s, 11.0), vec![1]);
    }

    #[test]
    fn negative_delay_is_rejected() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        let err = s.schedule(secs(-0.5), 1).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDelay(d) if d == -0.5));
        assert!(matches!(s.schedule(secs(f64::NAN), 1), Err(ScheduleError::InvalidDelay(_))));
        assert!(s.is_empty());
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cancellation {
    use super::*;

    #[test]
    fn cancel_removes_only_that_entry() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        let _a = s.schedule(secs(1.0), 1).unwrap();
        let b = s.schedule(secs(1.0), 2).unwrap();
        let _c = s.schedule(secs(1.0), 3).unwrap();

        assert!(s.cancel(b).unwrap());
        assert!(!s.is_pending(b));
        assert_eq!(fire(&mut s, 2.0), vec![1, 3]);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        let h = s.schedule(secs(1.0), 1).unwrap();
        assert_eq!(fire(&mut s, 1.0), vec![1]);
        assert!(!s.cancel(h).unwrap());
        assert!(!s.cancel(h).unwrap());
    }

    #[test]
    fn unknown_handle_is_not_found() {
        let clock = clock_at(0.0);
        let mut other = scheduler(&clock);
        other.schedule(secs(1.0), 1).unwrap();
        let foreign = other.schedule(secs(1.0), 2).unwrap(); // seq 1

        let mut s = scheduler(&clock);
        s.schedule(secs(1.0), 1).unwrap(); // only seq 0 issued here
        assert!(matches!(s.cancel(foreign), Err(ScheduleError::UnknownHandle(_))));
        assert!(matches!(s.remaining_time(foreign), Err(ScheduleError::UnknownHandle(_))));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn cancel_all_prevents_any_firing() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        for i in 0..4 {
            s.schedule(secs(f64::from(i)), i).unwrap();
        }
        assert_eq!(s.cancel_all(), 4);
        for t in 0..10 {
            assert!(fire(&mut s, f64::from(t)).is_empty());
        }
    }

    #[test]
    fn schedule_after_cancel_all_still_works() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        let old = s.schedule(secs(1.0), 1).unwrap();
        s.cancel_all();
        let new = s.schedule(secs(1.0), 2).unwrap();
        assert_ne!(old, new);
        assert_eq!(fire(&mut s, 1.0), vec![2]);
    }
}

// ── Effect isolation and boxed closures ───────────────────────────────────────

#[cfg(test)]
mod effects {
    use super::*;

    #[test]
    fn failing_effect_does_not_stop_siblings() {
        let clock = clock_at(0.0);
        let mut s = scheduler(&clock);
        for i in 1..=3 {
            s.schedule(secs(1.0), i).unwrap();
        }
        let mut ran = vec![];
        let report = s.tick_with(SimTime(1.0), |_, id| {
            ran.push(id);
            if id == 2 { Err("boom".into()) } else { Ok(()) }
        });
        assert_eq!(ran, vec![1, 2, 3]);
        assert_eq!(report.fired, 3);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn boxed_closures_fire_once() {
        let clock = clock_at(0.0);
        let log: Log = Rc::default();
        let mut s: DelayedActionScheduler<BoxedEffect, _> = DelayedActionScheduler::new(Rc::clone(&clock));
        for i in [2u32, 1] {
            let log = Rc::clone(&log);
            s.schedule_fn(secs(f64::from(i)), move || {
                log.borrow_mut().push(i);
                Ok(())
            })
            .unwrap();
        }
        assert_eq!(s.tick(SimTime(5.0)).fired, 2);
        assert_eq!(s.tick(SimTime(6.0)).fired, 0);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Every entry fires exactly once, at the first tick with now ≥ due,
        /// and a single tick fires in ascending due order with FIFO ties.
        #[test]
        fn fires_exactly_once_in_order(
            delays in prop::collection::vec(0u32..50, 1..40),
            step in 1u32..7,
        ) {
            let clock = clock_at(0.0);
            let mut s = scheduler(&clock);
            for (i, d) in delays.iter().enumerate() {
                s.schedule(secs(f64::from(*d)), i as u32).unwrap();
            }

            let mut fired_at: Vec<Option<u32>> = vec![None; delays.len()];
            let mut t = 0u32;
            while t <= 60 {
                let fired = fire(&mut s, f64::from(t));
                let mut last: Option<(u32, u32)> = None;
                for id in fired {
                    let slot = &mut fired_at[id as usize];
                    prop_assert!(slot.is_none(), "entry {} fired twice", id);
                    *slot = Some(t);
                    let key = (delays[id as usize], id);
                    if let Some(prev) = last {
                        prop_assert!(prev < key, "out of order: {:?} before {:?}", prev, key);
                    }
                    last = Some(key);
                }
                t += step;
            }

            for (i, d) in delays.iter().enumerate() {
                let at = fired_at[i].expect("every entry fires");
                prop_assert!(at >= *d);
                prop_assert!(at < d + step, "entry {} fired late at {}", i, at);
            }
        }

        #[test]
        fn cancel_all_silences_everything(delays in prop::collection::vec(0u32..20, 0..20)) {
            let clock = clock_at(0.0);
            let mut s = scheduler(&clock);
            for (i, d) in delays.iter().enumerate() {
                s.schedule(secs(f64::from(*d)), i as u32).unwrap();
            }
            prop_assert_eq!(s.cancel_all(), delays.len());
            for t in 0..25 {
                prop_assert!(fire(&mut s, f64::from(t)).is_empty());
            }
        }
    }
}
