//! `DinoBody` — a one-lane runner with obstacles sliding towards it.
//!
//! The body sits at x = 0.  Obstacles spawn at `SPAWN_X`, move left at a
//! constant speed and despawn past `DESPAWN_X`.  An obstacle that despawns
//! without touching the body counts as cleared.

use adt_agent::{Body, BodyEvent, JumpOutcome};
use adt_core::{SimDuration, SimRng, SimTime};

/// Farthest distance the body can observe.
pub const LEVEL_WIDTH: f64 = 33.0;
/// Time after a jump before the jump-readiness observation reads 1.
pub const DURATION_OF_JUMP: f64 = 2.0;

const SPAWN_X:          f64 = 30.0;
const DESPAWN_X:        f64 = -3.0;
const OBSTACLE_SPEED:   f64 = 8.0;
const OBSTACLE_HEIGHT:  f64 = 1.0;
/// Horizontal distance below which body and obstacle overlap.
const CONTACT_RANGE:    f64 = 0.75;
const GRAVITY:          f64 = -20.0;
const JUMP_VELOCITY:    f64 = 9.0;
const START_HEIGHT:     f64 = 0.5;
const SPAWN_DELAY_SECS: (f64, f64) = (1.5, 3.5);

struct Obstacle {
    x: f64,
}

pub struct DinoBody {
    rng:        SimRng,
    height:     f64,
    velocity:   f64,
    grounded:   bool,
    last_jump:  SimTime,
    obstacles:  Vec<Obstacle>,
    next_spawn: f64,
}

impl DinoBody {
    pub fn new(rng: SimRng) -> Self {
        let mut body = Self {
            rng,
            height:     START_HEIGHT,
            velocity:   0.0,
            grounded:   false,
            last_jump:  SimTime::ZERO,
            obstacles:  Vec::new(),
            next_spawn: 0.0,
        };
        body.reset(SimTime::ZERO);
        body
    }

    fn nearest_obstacle(&self) -> f64 {
        self.obstacles
            .iter()
            .map(|o| o.x)
            .filter(|&x| x > 0.0)
            .fold(LEVEL_WIDTH, f64::min)
    }
}

impl Body for DinoBody {
    fn try_jump(&mut self, now: SimTime) -> JumpOutcome {
        if !self.grounded {
            return JumpOutcome::Invalid;
        }
        self.velocity = JUMP_VELOCITY;
        self.grounded = false;
        self.last_jump = now;
        JumpOutcome::Executed
    }

    fn step(&mut self, _now: SimTime, dt: SimDuration) -> Vec<BodyEvent> {
        let dt = dt.secs();
        let mut events = Vec::new();

        if !self.grounded {
            self.velocity += GRAVITY * dt;
            self.height += self.velocity * dt;
            if self.height <= 0.0 {
                self.height = 0.0;
                self.velocity = 0.0;
                self.grounded = true;
            }
        }

        self.next_spawn -= dt;
        if self.next_spawn <= 0.0 {
            self.obstacles.push(Obstacle { x: SPAWN_X });
            self.next_spawn = self.rng.gen_range(SPAWN_DELAY_SECS.0..SPAWN_DELAY_SECS.1);
        }

        for obstacle in &mut self.obstacles {
            obstacle.x -= OBSTACLE_SPEED * dt;
        }
        if self
            .obstacles
            .iter()
            .any(|o| o.x.abs() < CONTACT_RANGE && self.height < OBSTACLE_HEIGHT)
        {
            events.push(BodyEvent::Collision);
            return events;
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.x > DESPAWN_X);
        events.extend((self.obstacles.len()..before).map(|_| BodyEvent::ObstacleCleared));
        events
    }

    /// `[distance to nearest obstacle / LEVEL_WIDTH, jump readiness]`.
    fn observe(&self, now: SimTime) -> Vec<f32> {
        let distance = self.nearest_obstacle() / LEVEL_WIDTH;
        let readiness = if self.grounded {
            1.0
        } else {
            (now.since(self.last_jump).secs() / DURATION_OF_JUMP).clamp(0.0, 1.0)
        };
        vec![distance as f32, readiness as f32]
    }

    fn observation_names(&self) -> &[&'static str] {
        &["distance", "readiness"]
    }

    fn reset(&mut self, now: SimTime) {
        self.height = START_HEIGHT;
        self.velocity = 0.0;
        self.grounded = false;
        self.last_jump = SimTime(now.secs() - DURATION_OF_JUMP);
        self.obstacles.clear();
        self.next_spawn = 0.0;
    }
}
