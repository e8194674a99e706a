//! Event payloads.  They live only for the duration of one dispatch.

use std::fmt;

use adt_core::{ActionBuffers, AgentId, SimDuration, SimTime};

/// Which channel an event is published on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    DecisionTaken,
    EpisodeBegan,
    ObservationsCollected,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::DecisionTaken => "decision_taken",
            EventKind::EpisodeBegan  => "episode_began",
            EventKind::ObservationsCollected => "observations_collected",
        };
        f.write_str(s)
    }
}

/// An agent acted on a policy decision.
#[derive(Clone, Copy, Debug)]
pub struct DecisionEvent<'a> {
    pub agent:   AgentId,
    /// The actions the policy chose, borrowed from the agent.
    pub actions: &'a ActionBuffers,
    /// Simulated time since this agent's previous decision (or episode start).
    pub elapsed_since_last_decision: SimDuration,
    pub at:      SimTime,
}

/// An agent reset and started a new episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeEvent {
    pub agent:   AgentId,
    /// Zero-based count of episodes this agent had begun before this one.
    pub episode: u64,
    pub at:      SimTime,
}

/// An agent collected the observations for its next decision.
#[derive(Clone, Copy, Debug)]
pub struct ObservationEvent<'a> {
    pub agent:        AgentId,
    /// `(name, value)` in the order the policy receives them.
    pub observations: &'a [(&'a str, f32)],
    pub at:           SimTime,
}

/// Anything that can be published on a [`DecisionBus`][crate::DecisionBus].
#[derive(Clone, Copy, Debug)]
pub enum BusEvent<'a> {
    DecisionTaken(DecisionEvent<'a>),
    EpisodeBegan(EpisodeEvent),
    ObservationsCollected(ObservationEvent<'a>),
}

impl BusEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            BusEvent::DecisionTaken(_) => EventKind::DecisionTaken,
            BusEvent::EpisodeBegan(_)  => EventKind::EpisodeBegan,
            BusEvent::ObservationsCollected(_) => EventKind::ObservationsCollected,
        }
    }

    pub fn agent(&self) -> AgentId {
        match self {
            BusEvent::DecisionTaken(e) => e.agent,
            BusEvent::EpisodeBegan(e)  => e.agent,
            BusEvent::ObservationsCollected(e) => e.agent,
        }
    }
}
