//! Unit tests for adt-agent.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use adt_bus::{DecisionBus, EventKind};
use adt_core::{ActionBuffers, AgentId, ManualClock, SimDuration, SimTime};
use adt_stats::{Aggregation, EpisodeStatAggregator, MemorySink, TotalsReporter};

use crate::{
    AgentConfig, AgentError, Body, BodyEvent, DecisionRequester, DelayedAgent, JumpOutcome,
    delay_from_action, stat,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A body that jumps only when grounded and replays scripted step events.
#[derive(Default)]
struct ScriptedBody {
    airborne: bool,
    script:   VecDeque<Vec<BodyEvent>>,
    jumps:    Vec<SimTime>,
    resets:   usize,
}

impl Body for ScriptedBody {
    fn try_jump(&mut self, now: SimTime) -> JumpOutcome {
        if self.airborne {
            return JumpOutcome::Invalid;
        }
        self.airborne = true;
        self.jumps.push(now);
        JumpOutcome::Executed
    }

    fn step(&mut self, _now: SimTime, _dt: SimDuration) -> Vec<BodyEvent> {
        self.script.pop_front().unwrap_or_default()
    }

    fn observe(&self, _now: SimTime) -> Vec<f32> {
        vec![if self.airborne { 0.0 } else { 1.0 }]
    }

    fn reset(&mut self, _now: SimTime) {
        self.airborne = false;
        self.resets += 1;
    }
}

type TestAgent = DelayedAgent<ScriptedBody, MemorySink, Rc<ManualClock>>;

fn agent_with(config: AgentConfig, bus: &DecisionBus) -> (TestAgent, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(SimTime(0.0)));
    let agent = DelayedAgent::new(
        AgentId(0),
        ScriptedBody::default(),
        config,
        Rc::clone(&clock),
        MemorySink::new(),
        bus.clone(),
    )
    .unwrap();
    (agent, clock)
}

fn agent(bus: &DecisionBus) -> (TestAgent, Rc<ManualClock>) {
    agent_with(AgentConfig::default(), bus)
}

/// `discrete[0] = 1` with the given continuous delay action.
fn jump(action: f32) -> ActionBuffers {
    ActionBuffers::new(vec![action], vec![1])
}

fn idle() -> ActionBuffers {
    ActionBuffers::new(vec![0.0], vec![0])
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Delay mapping ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod delay {
    use super::*;

    #[test]
    fn maps_action_range_onto_zero_to_max() {
        let max = SimDuration(0.06);
        assert!(approx(delay_from_action(-1.0, max).secs(), 0.0));
        assert!(approx(delay_from_action(0.0, max).secs(), 0.03));
        assert!(approx(delay_from_action(1.0, max).secs(), 0.06));
    }

    #[test]
    fn clamps_out_of_range_actions() {
        let max = SimDuration(2.0);
        assert!(approx(delay_from_action(7.5, max).secs(), 2.0));
        assert!(approx(delay_from_action(-3.0, max).secs(), 0.0));
    }

    #[test]
    fn nan_action_gives_nan_delay() {
        assert!(delay_from_action(f32::NAN, SimDuration(1.0)).secs().is_nan());
    }

    #[test]
    fn max_delay_is_two_steps_short_of_the_decision_period() {
        let config = AgentConfig { decision_period: 5, fixed_delta_secs: 0.02, ..Default::default() };
        assert!(approx(config.max_jump_delay().secs(), 0.06));
        let config = AgentConfig { decision_period: 1, ..config };
        assert_eq!(config.max_jump_delay(), SimDuration::ZERO);
    }
}

// ── Requester and config ──────────────────────────────────────────────────────

#[cfg(test)]
mod cadence {
    use super::*;

    #[test]
    fn requests_every_period_starting_with_first_step() {
        let mut r = DecisionRequester::new(3);
        let due: Vec<bool> = (0..7).map(|_| r.on_step()).collect();
        assert_eq!(due, [true, false, false, true, false, false, true]);
        assert_eq!(r.steps(), 7);
    }

    #[test]
    fn zero_period_decides_every_step() {
        let mut r = DecisionRequester::new(0);
        assert_eq!(r.period(), 1);
        assert!(r.on_step() && r.on_step());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bus = DecisionBus::new();
        let clock = Rc::new(ManualClock::default());
        let config = AgentConfig { fixed_delta_secs: 0.0, ..Default::default() };
        let result = DelayedAgent::new(
            AgentId(0),
            ScriptedBody::default(),
            config,
            clock,
            MemorySink::new(),
            bus,
        );
        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}

// ── Decisions and delayed jumps ───────────────────────────────────────────────

#[cfg(test)]
mod jumps {
    use super::*;

    #[test]
    fn jump_fires_after_the_requested_delay() {
        let bus = DecisionBus::new();
        let (mut agent, clock) = agent(&bus);

        let handle = agent.on_action_received(&jump(1.0)).unwrap().expect("jump scheduled");
        assert!(approx(handle.due_at().secs(), 0.06));
        assert_eq!(agent.pending_jump(), Some(handle));

        clock.set(SimTime(0.04));
        assert_eq!(agent.fixed_update().fired, 0);
        clock.set(SimTime(0.06));
        assert_eq!(agent.fixed_update().fired, 1);
        assert_eq!(agent.body().jumps, vec![SimTime(0.06)]);
        assert_eq!(agent.pending_jump(), None);

        let stats = agent.stats();
        assert_eq!(stats.episode_value(stat::ATTEMPTED_JUMPS), Some(1.0));
        assert_eq!(stats.episode_value(stat::EXECUTED_JUMPS), Some(1.0));
        assert_eq!(stats.episode_value(stat::INVALID_JUMPS), None);
        assert!(approx(agent.cumulative_reward(), -0.01));
    }

    #[test]
    fn jump_while_airborne_is_invalid() {
        let bus = DecisionBus::new();
        let (mut agent, _clock) = agent(&bus);
        assert_eq!(agent.try_jump(), JumpOutcome::Executed);
        assert_eq!(agent.try_jump(), JumpOutcome::Invalid);

        let stats = agent.stats();
        assert_eq!(stats.episode_value(stat::ATTEMPTED_JUMPS), Some(2.0));
        assert_eq!(stats.episode_value(stat::INVALID_JUMPS), Some(1.0));
        assert!(approx(agent.cumulative_reward(), -0.11));
    }

    #[test]
    fn new_jump_replaces_pending_one() {
        let bus = DecisionBus::new();
        let (mut agent, clock) = agent(&bus);
        let first = agent.on_action_received(&jump(1.0)).unwrap().unwrap();
        clock.set(SimTime(0.01));
        let second = agent.on_action_received(&jump(-1.0)).unwrap().unwrap();

        assert!(!agent.scheduler().is_pending(first));
        assert!(agent.scheduler().is_pending(second));
        clock.set(SimTime(1.0));
        assert_eq!(agent.fixed_update().fired, 1);
    }

    #[test]
    fn without_replacement_every_jump_fires() {
        let bus = DecisionBus::new();
        let config = AgentConfig { replace_pending: false, ..Default::default() };
        let (mut agent, clock) = agent_with(config, &bus);
        agent.on_action_received(&jump(1.0)).unwrap();
        agent.on_action_received(&jump(-1.0)).unwrap();
        assert_eq!(agent.scheduler().len(), 2);

        clock.set(SimTime(1.0));
        let report = agent.fixed_update();
        assert_eq!(report.fired, 2);
        // The second one finds the body airborne.
        assert_eq!(agent.stats().episode_value(stat::INVALID_JUMPS), Some(1.0));
    }

    #[test]
    fn idle_decision_schedules_nothing_but_is_counted() {
        let bus = DecisionBus::new();
        let (mut agent, clock) = agent(&bus);
        clock.set(SimTime(0.5));
        assert_eq!(agent.on_action_received(&idle()).unwrap(), None);
        assert!(agent.scheduler().is_empty());
        assert_eq!(agent.stats().episode_value(stat::DECISIONS), Some(1.0));
        assert!(approx(agent.cumulative_reward(), 0.05));
        assert_eq!(agent.last_decision(), SimTime(0.5));
    }

    #[test]
    fn nan_action_is_reported_after_the_decision_is_counted() {
        let bus = DecisionBus::new();
        let (mut agent, _clock) = agent(&bus);
        let result = agent.on_action_received(&jump(f32::NAN));
        assert!(matches!(result, Err(AgentError::Schedule(_))));
        assert_eq!(agent.stats().episode_value(stat::DECISIONS), Some(1.0));
        assert!(agent.scheduler().is_empty());
    }

    #[test]
    fn rejected_action_keeps_the_pending_jump() {
        let bus = DecisionBus::new();
        let (mut agent, clock) = agent(&bus);
        let pending = agent.on_action_received(&jump(1.0)).unwrap().unwrap();

        assert!(agent.on_action_received(&jump(f32::NAN)).is_err());
        assert!(agent.scheduler().is_pending(pending));
        assert_eq!(agent.pending_jump(), Some(pending));

        clock.set(SimTime(10.0));
        assert_eq!(agent.fixed_update().fired, 1);
        assert_eq!(agent.body().jumps.len(), 1);
    }

    #[test]
    fn decision_is_published_with_elapsed_time() {
        let bus = DecisionBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = bus.on_decision(move |e| {
            log.borrow_mut().push((e.agent, e.elapsed_since_last_decision, e.actions.discrete_or(0, -1)));
            Ok(())
        });

        let (mut agent, clock) = agent(&bus);
        clock.set(SimTime(0.1));
        agent.on_action_received(&jump(0.0)).unwrap();
        clock.set(SimTime(0.3));
        agent.on_action_received(&idle()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, AgentId(0));
        assert!(approx(seen[0].1.secs(), 0.1));
        assert_eq!(seen[0].2, 1);
        assert!(approx(seen[1].1.secs(), 0.2));
    }
}

// ── Episode boundaries ────────────────────────────────────────────────────────

#[cfg(test)]
mod episodes {
    use super::*;

    #[test]
    fn episode_begin_cancels_flushes_and_resets() {
        let bus = DecisionBus::new();
        let (mut agent, clock) = agent(&bus);
        agent.on_episode_begin();

        clock.set(SimTime(1.0));
        agent.on_action_received(&jump(1.0)).unwrap();
        agent.on_obstacle_cleared();
        clock.set(SimTime(2.0));

        let summary = agent.on_episode_begin();
        assert_eq!(summary.episode, 1);
        assert_eq!(summary.cancelled_jumps, 1);
        assert!(approx(summary.previous_duration.secs(), 2.0));
        assert!(approx(summary.previous_reward, 1.1));

        assert!(agent.scheduler().is_empty());
        assert_eq!(agent.pending_jump(), None);
        assert_eq!(agent.cumulative_reward(), 0.0);
        assert_eq!(agent.episode_start(), SimTime(2.0));
        assert_eq!(agent.body().resets, 2);

        // A cancelled jump never fires, however late the tick.
        clock.set(SimTime(10.0));
        assert_eq!(agent.fixed_update().fired, 0);

        let sink = agent.stats().sink();
        assert_eq!(sink.values("PerEpisode/Decisions"), vec![1.0]);
        assert_eq!(sink.values("PerEpisode/SuccessfulJumpOvers"), vec![1.0]);
        let gameplay = sink.last("PerEpisode/GameplayTime").unwrap();
        assert!(approx(gameplay.value, 2.0));
        assert_eq!(gameplay.aggregation, Aggregation::Histogram);
    }

    #[test]
    fn episode_began_precedes_the_first_decision() {
        let bus = DecisionBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (o1, o2) = (Rc::clone(&order), Rc::clone(&order));
        let _a = bus.on_episode_began(move |e| {
            o1.borrow_mut().push(format!("episode {}", e.episode));
            Ok(())
        });
        let _b = bus.on_decision(move |_| {
            o2.borrow_mut().push("decision".to_owned());
            Ok(())
        });

        let (mut agent, _clock) = agent(&bus);
        agent.on_episode_begin();
        agent.on_action_received(&idle()).unwrap();
        agent.on_episode_begin();
        agent.on_action_received(&idle()).unwrap();
        assert_eq!(*order.borrow(), ["episode 0", "decision", "episode 1", "decision"]);
    }

    #[test]
    fn collision_ends_the_episode() {
        let bus = DecisionBus::new();
        let (mut agent, _clock) = agent(&bus);
        agent.body_mut().script = VecDeque::from([
            vec![BodyEvent::ObstacleCleared],
            vec![BodyEvent::Collision],
        ]);
        assert!(!agent.step_body(SimDuration(0.02)));
        assert!(agent.step_body(SimDuration(0.02)));
        assert!(agent.is_episode_over());
        assert!(approx(agent.cumulative_reward(), 0.0));

        agent.on_episode_begin();
        assert!(!agent.is_episode_over());
    }

    #[test]
    fn external_reward_counts_until_the_episode_ends() {
        let bus = DecisionBus::new();
        let (mut agent, _clock) = agent(&bus);
        agent.add_reward(0.25);
        agent.add_reward(-1.0);
        assert!(approx(agent.cumulative_reward(), -0.75));

        let summary = agent.on_episode_begin();
        assert!(approx(summary.previous_reward, -0.75));
        assert_eq!(agent.cumulative_reward(), 0.0);
    }

    #[test]
    fn totals_reporter_counts_agent_activity_through_the_bus() {
        let bus = DecisionBus::new();
        let reporter = TotalsReporter::attach(&bus, EpisodeStatAggregator::new(MemorySink::new()));
        let (mut agent, clock) = agent(&bus);

        agent.on_episode_begin();
        clock.set(SimTime(0.5));
        agent.on_action_received(&idle()).unwrap();
        clock.set(SimTime(1.5));
        agent.on_action_received(&idle()).unwrap();

        assert_eq!(reporter.lifetime_total("Episodes"), Some(1.0));
        assert_eq!(reporter.lifetime_total("Decisions"), Some(2.0));
        assert!(approx(reporter.lifetime_total("GameplaySeconds").unwrap(), 1.5));
        assert_eq!(bus.subscriber_count(EventKind::DecisionTaken), 1);
    }
}

// ── Observations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod observations {
    use super::*;

    struct NamedBody(ScriptedBody);

    impl Body for NamedBody {
        fn try_jump(&mut self, now: SimTime) -> JumpOutcome {
            self.0.try_jump(now)
        }

        fn step(&mut self, now: SimTime, dt: SimDuration) -> Vec<BodyEvent> {
            self.0.step(now, dt)
        }

        fn observe(&self, _now: SimTime) -> Vec<f32> {
            vec![0.25, 1.0, 7.0]
        }

        fn observation_names(&self) -> &[&'static str] {
            &["distance", "readiness"]
        }

        fn reset(&mut self, now: SimTime) {
            self.0.reset(now)
        }
    }

    #[test]
    fn observations_are_published_with_names() {
        let bus = DecisionBus::new();
        let seen: Rc<RefCell<Vec<(AgentId, String, f32)>>> = Rc::default();
        let log = Rc::clone(&seen);
        let _sub = bus.on_observations(move |e| {
            log.borrow_mut().extend(e.observations.iter().map(|&(n, v)| (e.agent, n.to_owned(), v)));
            Ok(())
        });

        let clock = Rc::new(ManualClock::default());
        let agent = DelayedAgent::new(
            AgentId(3),
            NamedBody(ScriptedBody::default()),
            AgentConfig::default(),
            clock,
            MemorySink::new(),
            bus.clone(),
        )
        .unwrap();

        assert_eq!(agent.observe(), vec![0.25, 1.0, 7.0]);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (AgentId(3), "distance".to_owned(), 0.25));
        assert_eq!(seen[1].1, "readiness");
        assert_eq!(seen[2].1, "unnamed");
    }

    #[test]
    fn observing_without_listeners_publishes_nothing() {
        let bus = DecisionBus::new();
        let (agent, _clock) = agent(&bus);
        assert_eq!(agent.observe(), vec![1.0]);
        assert_eq!(bus.subscriber_count(EventKind::ObservationsCollected), 0);
    }
}
