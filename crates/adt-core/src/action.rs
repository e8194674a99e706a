//! Policy output passed from the decision source to the agent.

/// One decision's worth of actions: a continuous and a discrete branch.
///
/// Either branch may be empty.  Readers use the `_or` accessors so a short
/// buffer is treated as "no action" rather than a panic.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBuffers {
    pub continuous: Vec<f32>,
    pub discrete:   Vec<i32>,
}

impl ActionBuffers {
    pub fn new(continuous: Vec<f32>, discrete: Vec<i32>) -> Self {
        Self { continuous, discrete }
    }

    /// `continuous[i]`, or `default` when the branch is too short.
    #[inline]
    pub fn continuous_or(&self, i: usize, default: f32) -> f32 {
        self.continuous.get(i).copied().unwrap_or(default)
    }

    /// `discrete[i]`, or `default` when the branch is too short.
    #[inline]
    pub fn discrete_or(&self, i: usize, default: i32) -> i32 {
        self.discrete.get(i).copied().unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.continuous.is_empty() && self.discrete.is_empty()
    }
}
