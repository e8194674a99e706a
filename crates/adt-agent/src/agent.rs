//! `DelayedAgent` — turns policy decisions into delayed jumps and keeps the
//! episode statistics for them.

use adt_bus::{BusEvent, DecisionBus, DecisionEvent, EpisodeEvent, EventKind, ObservationEvent};
use adt_core::{ActionBuffers, AgentId, SimClock, SimDuration, SimTime};
use adt_schedule::{ActionHandle, DelayedActionScheduler, TickReport};
use adt_stats::{EpisodeStatAggregator, StatsSink};
use tracing::{debug, info};

use crate::{AgentConfig, AgentResult, Body, BodyEvent, DecisionRequester, JumpOutcome, delay_from_action};

/// Names of the per-episode counters an agent records.
pub mod stat {
    pub const DECISIONS:              &str = "Decisions";
    pub const GAMEPLAY_TIME:          &str = "GameplayTime";
    pub const ATTEMPTED_JUMPS:        &str = "AttemptedJumps";
    pub const EXECUTED_JUMPS:         &str = "ExecutedJumps";
    pub const INVALID_JUMPS:          &str = "InvalidJumps";
    pub const SUCCESSFUL_JUMP_OVERS:  &str = "SuccessfulJumpOvers";
}

/// Payload of a scheduled jump.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DelayedJump {
    pub requested_at: SimTime,
    pub delay:        SimDuration,
}

/// What [`DelayedAgent::on_episode_begin`] closed out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    /// Zero-based index of the episode that is starting.
    pub episode:           u64,
    /// Cumulative reward of the episode that just ended.
    pub previous_reward:   f64,
    /// Simulated length of the episode that just ended.
    pub previous_duration: SimDuration,
    /// Jumps still pending when the episode ended.
    pub cancelled_jumps:   usize,
}

/// An agent whose jumps happen a policy-chosen delay after the decision.
///
/// `B` is the environment side, `S` the sink this agent's per-episode
/// statistics are flushed into, `C` the clock shared with the driver.
pub struct DelayedAgent<B: Body, S: StatsSink, C: SimClock> {
    id:            AgentId,
    body:          B,
    config:        AgentConfig,
    scheduler:     DelayedActionScheduler<DelayedJump, C>,
    stats:         EpisodeStatAggregator<S>,
    bus:           DecisionBus,
    requester:     DecisionRequester,
    /// Episodes begun so far.
    episode:       u64,
    episode_start: SimTime,
    last_decision: SimTime,
    reward:        f64,
    pending_jump:  Option<ActionHandle>,
    episode_over:  bool,
}

impl<B: Body, S: StatsSink, C: SimClock> DelayedAgent<B, S, C> {
    pub fn new(
        id:     AgentId,
        body:   B,
        config: AgentConfig,
        clock:  C,
        sink:   S,
        bus:    DecisionBus,
    ) -> AgentResult<Self> {
        config.validate()?;
        let now = clock.now();
        let scheduler = DelayedActionScheduler::new(clock).with_owner(id);
        let stats = EpisodeStatAggregator::with_config(sink, config.stats.clone()).with_owner(id);
        let requester = DecisionRequester::new(config.decision_period);
        Ok(Self {
            id,
            body,
            config,
            scheduler,
            stats,
            bus,
            requester,
            episode:       0,
            episode_start: now,
            last_decision: now,
            reward:        0.0,
            pending_jump:  None,
            episode_over:  false,
        })
    }

    // ── Episode boundary ──────────────────────────────────────────────────

    /// Close the current episode and start the next one.
    ///
    /// Order matters: the episode's length is recorded before the flush so
    /// it lands in the episode it describes; pending jumps are cancelled
    /// before the flush so none of them can fire into the new episode; and
    /// `EpisodeBegan` is published before any decision of the new episode.
    pub fn on_episode_begin(&mut self) -> EpisodeSummary {
        let now = self.now();
        let duration = now - self.episode_start;
        self.stats.increment(stat::GAMEPLAY_TIME, duration.secs());

        let cancelled = self.scheduler.cancel_all();
        self.pending_jump = None;
        self.stats.on_episode_begin();

        let summary = EpisodeSummary {
            episode:           self.episode,
            previous_reward:   self.reward,
            previous_duration: duration,
            cancelled_jumps:   cancelled,
        };
        self.bus.publish(&BusEvent::EpisodeBegan(EpisodeEvent {
            agent:   self.id,
            episode: self.episode,
            at:      now,
        }));

        self.episode += 1;
        self.episode_start = now;
        self.last_decision = now;
        self.reward = 0.0;
        self.episode_over = false;
        self.body.reset(now);

        info!(
            agent = %self.id,
            episode = summary.episode,
            previous_reward = summary.previous_reward,
            previous_duration = %summary.previous_duration,
            cancelled,
            "episode began"
        );
        summary
    }

    // ── Decisions ─────────────────────────────────────────────────────────

    /// Advance the decision requester one step; `true` if the policy should
    /// be queried on this step.
    pub fn wants_decision(&mut self) -> bool {
        self.requester.on_step()
    }

    /// Observation for the policy.
    ///
    /// Also published as `ObservationsCollected`, paired with the body's
    /// observation names, when anyone is listening.
    pub fn observe(&self) -> Vec<f32> {
        let now = self.now();
        let values = self.body.observe(now);
        if self.bus.subscriber_count(EventKind::ObservationsCollected) > 0 {
            let names = self.body.observation_names();
            let named: Vec<(&str, f32)> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| (names.get(i).copied().unwrap_or("unnamed"), v))
                .collect();
            self.bus.publish(&BusEvent::ObservationsCollected(ObservationEvent {
                agent:        self.id,
                observations: &named,
                at:           now,
            }));
        }
        values
    }

    /// Act on a policy decision.
    ///
    /// `discrete[0] == 1` requests a jump after
    /// [`delay_from_action`]`(continuous[0], max_jump_delay)`.  The decision
    /// is published and counted even when scheduling fails (a NaN action);
    /// the scheduling error is returned afterwards.
    pub fn on_action_received(&mut self, actions: &ActionBuffers) -> AgentResult<Option<ActionHandle>> {
        let now = self.now();
        let elapsed = now - self.last_decision;
        self.reward += elapsed.secs() * self.config.survival_reward_rate;

        let scheduled = if actions.discrete_or(0, 0) == 1 {
            self.schedule_jump(actions.continuous_or(0, 0.0), now).map(Some)
        } else {
            Ok(None)
        };

        self.bus.publish(&BusEvent::DecisionTaken(DecisionEvent {
            agent:   self.id,
            actions,
            elapsed_since_last_decision: elapsed,
            at:      now,
        }));
        self.stats.increment_one(stat::DECISIONS);
        self.last_decision = now;
        scheduled
    }

    fn schedule_jump(&mut self, action: f32, now: SimTime) -> AgentResult<ActionHandle> {
        let delay = delay_from_action(action, self.config.max_jump_delay());
        // A rejected delay leaves the pending jump untouched.
        let handle = self.scheduler.schedule(delay, DelayedJump { requested_at: now, delay })?;
        let previous = self.pending_jump.replace(handle);
        if self.config.replace_pending {
            if let Some(previous) = previous {
                self.scheduler.cancel(previous)?;
            }
        }
        Ok(handle)
    }

    // ── Per-step ──────────────────────────────────────────────────────────

    /// Fire every jump that has come due.
    pub fn fixed_update(&mut self) -> TickReport {
        let now = self.now();
        let Self { id, body, config, scheduler, stats, reward, pending_jump, .. } = self;
        scheduler.tick_with(now, |handle, jump| {
            if *pending_jump == Some(handle) {
                *pending_jump = None;
            }
            let outcome = resolve_jump(body, stats, reward, config, now);
            debug!(
                agent = %id,
                %handle,
                requested_at = %jump.requested_at,
                lateness = %(now - handle.due_at()),
                ?outcome,
                "delayed jump resolved"
            );
            Ok(())
        })
    }

    /// Jump right now, bypassing the scheduler.
    pub fn try_jump(&mut self) -> JumpOutcome {
        let now = self.now();
        resolve_jump(&mut self.body, &mut self.stats, &mut self.reward, &self.config, now)
    }

    /// Advance the body by `dt` and apply its events.  Returns `true` if the
    /// episode is over and [`on_episode_begin`][Self::on_episode_begin]
    /// should be called.
    pub fn step_body(&mut self, dt: SimDuration) -> bool {
        let now = self.now();
        for event in self.body.step(now, dt) {
            match event {
                BodyEvent::ObstacleCleared => self.on_obstacle_cleared(),
                BodyEvent::Collision       => self.on_collision(),
            }
        }
        self.episode_over
    }

    pub fn on_obstacle_cleared(&mut self) {
        self.stats.increment_one(stat::SUCCESSFUL_JUMP_OVERS);
        self.reward += self.config.obstacle_cleared_reward;
    }

    pub fn on_collision(&mut self) {
        self.reward += self.config.collision_reward;
        if !self.episode_over {
            debug!(agent = %self.id, at = %self.now(), "collision ends episode");
        }
        self.episode_over = true;
    }

    pub fn add_reward(&mut self, reward: f64) {
        self.reward += reward;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.scheduler.clock().now()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn stats(&self) -> &EpisodeStatAggregator<S> {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut EpisodeStatAggregator<S> {
        &mut self.stats
    }

    pub fn scheduler(&self) -> &DelayedActionScheduler<DelayedJump, C> {
        &self.scheduler
    }

    /// Handle of the most recently scheduled jump, while it is pending.
    pub fn pending_jump(&self) -> Option<ActionHandle> {
        self.pending_jump
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.reward
    }

    /// Number of episodes begun so far.
    pub fn episodes_begun(&self) -> u64 {
        self.episode
    }

    pub fn is_episode_over(&self) -> bool {
        self.episode_over
    }

    pub fn episode_start(&self) -> SimTime {
        self.episode_start
    }

    pub fn last_decision(&self) -> SimTime {
        self.last_decision
    }
}

fn resolve_jump<B: Body, S: StatsSink>(
    body:   &mut B,
    stats:  &mut EpisodeStatAggregator<S>,
    reward: &mut f64,
    config: &AgentConfig,
    now:    SimTime,
) -> JumpOutcome {
    stats.increment_one(stat::ATTEMPTED_JUMPS);
    let outcome = body.try_jump(now);
    match outcome {
        JumpOutcome::Executed => {
            *reward += config.executed_jump_reward;
            stats.increment_one(stat::EXECUTED_JUMPS);
        }
        JumpOutcome::Invalid => {
            *reward += config.invalid_jump_reward;
            stats.increment_one(stat::INVALID_JUMPS);
        }
    }
    outcome
}
