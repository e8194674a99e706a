use adt_core::SimDuration;

/// Map a continuous policy output in `[-1, 1]` onto a jump delay in
/// `[0, max_delay]`.
///
/// Out-of-range actions are clamped first.  A NaN action yields a NaN delay,
/// which the scheduler rejects.
pub fn delay_from_action(action: f32, max_delay: SimDuration) -> SimDuration {
    let fraction = (f64::from(action.clamp(-1.0, 1.0)) + 1.0) / 2.0;
    SimDuration(max_delay.secs() * fraction)
}
