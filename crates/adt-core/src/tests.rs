//! Unit tests for adt-core primitives.

#[cfg(test)]
mod ids {
    use crate::AgentId;

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert_eq!(AgentId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{CoreError, SimDuration, SimTime};

    #[test]
    fn instant_arithmetic() {
        let t = SimTime(10.0);
        assert_eq!(t + SimDuration(2.5), SimTime(12.5));
        assert_eq!(SimTime(12.0) - SimTime(10.0), SimDuration(2.0));
        assert_eq!(SimTime(10.0).since(SimTime(12.0)), SimDuration(-2.0));
    }

    #[test]
    fn ordering_is_total() {
        let mut times = vec![SimTime(3.0), SimTime(1.0), SimTime(2.0)];
        times.sort();
        assert_eq!(times, vec![SimTime(1.0), SimTime(2.0), SimTime(3.0)]);
        assert!(SimDuration(0.5) < SimDuration(1.0));
    }

    #[test]
    fn try_new_rejects_negative_and_nan() {
        assert!(matches!(SimDuration::try_new(-0.1), Err(CoreError::InvalidDuration(_))));
        assert!(matches!(SimDuration::try_new(f64::NAN), Err(CoreError::InvalidDuration(_))));
        assert_eq!(SimDuration::try_new(0.0).unwrap(), SimDuration::ZERO);
        assert_eq!(SimDuration::try_new(2.0).unwrap(), SimDuration(2.0));
    }

    #[test]
    fn elapsed_means_non_positive() {
        assert!(SimDuration(0.0).is_elapsed());
        assert!(SimDuration(-1.0).is_elapsed());
        assert!(!SimDuration(0.001).is_elapsed());
    }
}

#[cfg(test)]
mod clock {
    use std::rc::Rc;

    use crate::{ManualClock, ScaledClock, SimClock, SimDuration, SimTime, TIME_SCALE_UPPER_LIMIT};

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(SimTime(10.0));
        assert_eq!(clock.now(), SimTime(10.0));
        clock.advance(SimDuration(0.5));
        assert_eq!(clock.now(), SimTime(10.5));
        assert_eq!(clock.tick_delta(), SimDuration(0.5));
        clock.set(SimTime(9.0));
        assert_eq!(clock.now(), SimTime(9.0));
        assert_eq!(clock.tick_delta(), SimDuration(-1.5));
    }

    #[test]
    fn shared_clock_is_seen_through_rc() {
        let clock = Rc::new(ManualClock::default());
        let reader: Rc<ManualClock> = Rc::clone(&clock);
        clock.advance(SimDuration(3.0));
        assert_eq!(reader.now(), SimTime(3.0));
    }

    #[test]
    fn scaled_clock_applies_scale() {
        let clock = ScaledClock::new(SimDuration(0.02), 2.0);
        clock.step();
        clock.step();
        assert!((clock.now().secs() - 0.08).abs() < 1e-12);
        assert!((clock.tick_delta().secs() - 0.04).abs() < 1e-12);
        assert_eq!(clock.steps(), 2);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let clock = ScaledClock::new(SimDuration(0.5), 1.0);
        clock.step();
        clock.pause();
        assert_eq!(clock.tick_delta(), SimDuration::ZERO);
        clock.step();
        clock.step();
        assert_eq!(clock.now(), SimTime(0.5));
        clock.resume();
        clock.step();
        assert_eq!(clock.now(), SimTime(1.0));
        assert_eq!(clock.steps(), 4);
    }

    #[test]
    fn time_scale_is_clamped_and_reports_change() {
        let clock = ScaledClock::new(SimDuration(0.02), 1.0);
        assert!(!clock.set_time_scale(1.0));
        assert!(clock.set_time_scale(500.0));
        assert_eq!(clock.time_scale(), TIME_SCALE_UPPER_LIMIT);
        assert!(clock.set_time_scale(-3.0));
        assert_eq!(clock.time_scale(), 0.0);
        clock.step();
        assert_eq!(clock.now(), SimTime::ZERO);
    }
}

#[cfg(test)]
mod config {
    use crate::{ControlConfig, SimDuration};

    #[test]
    fn default_is_valid() {
        ControlConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            ControlConfig { fixed_delta_secs: 0.0, ..Default::default() },
            ControlConfig { fixed_delta_secs: f64::NAN, ..Default::default() },
            ControlConfig { time_scale: -1.0, ..Default::default() },
            ControlConfig { decision_period: 0, ..Default::default() },
            ControlConfig { flush_interval_secs: 0.0, ..Default::default() },
            ControlConfig { flush_interval_secs: f64::INFINITY, ..Default::default() },
            ControlConfig { fixed_delta_secs: f64::INFINITY, ..Default::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn max_jump_delay_leaves_two_steps() {
        let cfg = ControlConfig { decision_period: 5, fixed_delta_secs: 0.02, ..Default::default() };
        assert!((cfg.max_jump_delay().secs() - 0.06).abs() < 1e-12);

        let short = ControlConfig { decision_period: 1, ..Default::default() };
        assert_eq!(short.max_jump_delay(), SimDuration::ZERO);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            let a: u64 = r1.random();
            let b: u64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = AgentRng::new(0, AgentId(0));
        for _ in 0..1000 {
            let v = rng.gen_range(-1.0f32..1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }
    #[test]
    fn gen_bool_tolerates_out_of_range_and_nan() {
        let mut rng = AgentRng::new(7, AgentId(3));
        assert!((0..100).all(|_| !rng.gen_bool(f64::NAN)));
        assert!((0..100).all(|_| rng.gen_bool(2.5)));
        assert!((0..100).all(|_| !rng.gen_bool(-0.5)));

        let mut sim = SimRng::new(7);
        assert!(!sim.gen_bool(f64::NAN));
    }
}

#[cfg(test)]
mod action {
    use crate::ActionBuffers;

    #[test]
    fn short_buffers_fall_back_to_default() {
        let actions = ActionBuffers::new(vec![0.5], vec![]);
        assert_eq!(actions.continuous_or(0, -1.0), 0.5);
        assert_eq!(actions.continuous_or(3, -1.0), -1.0);
        assert_eq!(actions.discrete_or(0, 0), 0);
        assert!(ActionBuffers::default().is_empty());
    }
}
