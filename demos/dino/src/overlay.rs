//! Debug overlay: follows one agent through the bus.

use std::cell::{Cell, RefCell};
use std::fmt::{self, Write as _};
use std::rc::{Rc, Weak};

use adt_bus::{DecisionBus, Subscription};
use adt_core::AgentId;
use adt_sim::SharedClock;
use tracing::{debug, info};

/// What the overlay has seen of the selected agent since it was selected.
#[derive(Debug, Default)]
struct Panel {
    decisions:    u64,
    continuous:   Vec<f32>,
    discrete:     Vec<i32>,
    observations: Vec<(String, f32)>,
}

/// Follows the selected agent's decisions, observations and episode starts.
///
/// Selecting another agent swaps the subscriptions and starts from an empty
/// panel.  With pause-on-decision on, each decision of the selected agent
/// pauses the shared clock until someone resumes it.
///
/// Dropping the overlay detaches it.
pub struct DebugOverlay {
    bus:           DecisionBus,
    clock:         SharedClock,
    pause:         Rc<Cell<bool>>,
    selected:      AgentId,
    panel:         Rc<RefCell<Panel>>,
    subscriptions: Vec<Subscription>,
}

impl DebugOverlay {
    pub fn attach(bus: &DecisionBus, clock: SharedClock, selected: AgentId) -> Self {
        let mut overlay = Self {
            bus: bus.clone(),
            clock,
            pause: Rc::default(),
            selected,
            panel: Rc::default(),
            subscriptions: Vec::new(),
        };
        overlay.subscribe();
        overlay
    }

    /// Follow `agent` from now on.
    ///
    /// Safe to call from inside a bus dispatch: callbacks of the previous
    /// selection that are still part of that dispatch write into the old
    /// panel, not the new one.
    pub fn select(&mut self, agent: AgentId) {
        self.subscriptions.clear();
        self.selected = agent;
        self.panel = Rc::default();
        self.subscribe();
        debug!(%agent, "overlay selection changed");
    }

    /// Move the selection `offset` places along `0..agent_count`, wrapping.
    pub fn cycle(&mut self, offset: i64, agent_count: u32) {
        if agent_count == 0 {
            return;
        }
        let next = (i64::from(self.selected.0) + offset).rem_euclid(i64::from(agent_count));
        // rem_euclid keeps it within 0..agent_count.
        self.select(AgentId(next as u32));
    }

    pub fn set_pause_on_decision(&self, on: bool) {
        self.pause.set(on);
    }

    pub fn pause_on_decision(&self) -> bool {
        self.pause.get()
    }

    pub fn selected(&self) -> AgentId {
        self.selected
    }

    /// Decisions of the selected agent seen since it was selected.
    pub fn decisions(&self) -> u64 {
        self.panel.borrow().decisions
    }

    /// Latest named observations of the selected agent.
    pub fn observations(&self) -> Vec<(String, f32)> {
        self.panel.borrow().observations.clone()
    }

    /// The panel as text: last actions, last observations, decision count.
    pub fn render(&self) -> String {
        let panel = self.panel.borrow();
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_panel(&mut out, self.selected, &panel);
        out
    }

    fn subscribe(&mut self) {
        let selected = self.selected;

        let panel = Rc::clone(&self.panel);
        let pause = Rc::clone(&self.pause);
        let clock = Rc::clone(&self.clock);
        let decision = self.bus.on_decision(move |event| {
            if event.agent != selected {
                return Ok(());
            }
            let Ok(mut panel) = panel.try_borrow_mut() else {
                return Err("overlay panel is borrowed".into());
            };
            panel.decisions += 1;
            panel.continuous.clone_from(&event.actions.continuous);
            panel.discrete.clone_from(&event.actions.discrete);
            debug!(
                agent = %event.agent,
                at = %event.at,
                since_last = %event.elapsed_since_last_decision,
                jump = event.actions.discrete_or(0, 0),
                delay_action = event.actions.continuous_or(0, 0.0),
                "decision"
            );
            if pause.get() {
                clock.pause();
                info!(agent = %event.agent, at = %event.at, "paused on decision");
            }
            Ok(())
        });

        let panel = Rc::clone(&self.panel);
        let observations = self.bus.on_observations(move |event| {
            if event.agent != selected {
                return Ok(());
            }
            let Ok(mut panel) = panel.try_borrow_mut() else {
                return Err("overlay panel is borrowed".into());
            };
            panel.observations = event.observations.iter().map(|&(n, v)| (n.to_owned(), v)).collect();
            Ok(())
        });

        let episode = self.bus.on_episode_began(move |event| {
            if event.agent == selected {
                debug!(agent = %event.agent, episode = event.episode, at = %event.at, "episode began");
            }
            Ok(())
        });

        self.subscriptions = vec![decision, observations, episode];
    }
}

fn write_panel(out: &mut String, agent: AgentId, panel: &Panel) -> fmt::Result {
    writeln!(out, "{agent}")?;
    writeln!(out, "Actions:")?;
    write!(out, "  Continuous:")?;
    if panel.continuous.is_empty() {
        write!(out, " N/A")?;
    }
    for a in &panel.continuous {
        write!(out, " {a}")?;
    }
    write!(out, "\n  Discrete:")?;
    if panel.discrete.is_empty() {
        write!(out, " N/A")?;
    }
    for a in &panel.discrete {
        write!(out, " {a}")?;
    }
    writeln!(out, "\nObservations:")?;
    for (name, value) in &panel.observations {
        writeln!(out, "  {name}: {value:.3}")?;
    }
    write!(out, "Decisions: {}", panel.decisions)
}

/// Moves a shared overlay on to the next agent each time the agent it
/// follows starts a new episode.
pub struct RoundRobinSelector {
    _episode: Subscription,
}

impl RoundRobinSelector {
    pub fn attach(bus: &DecisionBus, overlay: &Rc<RefCell<DebugOverlay>>, agent_count: u32) -> Self {
        let overlay: Weak<RefCell<DebugOverlay>> = Rc::downgrade(overlay);
        let episode = bus.on_episode_began(move |event| {
            let Some(overlay) = overlay.upgrade() else {
                return Ok(());
            };
            let Ok(mut overlay) = overlay.try_borrow_mut() else {
                return Err("overlay is borrowed".into());
            };
            // Episode 0 is the initial reset, not a finished run.
            if event.agent == overlay.selected() && event.episode > 0 {
                overlay.cycle(1, agent_count);
            }
            Ok(())
        });
        Self { _episode: episode }
    }
}
