/// Requests a decision every `period` fixed steps, starting with the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionRequester {
    period: u32,
    step:   u64,
}

impl DecisionRequester {
    /// A `period` of 0 is treated as 1 (decide every step).
    pub fn new(period: u32) -> Self {
        Self { period: period.max(1), step: 0 }
    }

    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Advance one fixed step; `true` if a decision is due on this step.
    pub fn on_step(&mut self) -> bool {
        let due = self.step % u64::from(self.period) == 0;
        self.step += 1;
        due
    }

    /// Steps counted so far.
    pub fn steps(&self) -> u64 {
        self.step
    }
}
