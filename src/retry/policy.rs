//! Backoff policy for the retry executor.

use std::time::Duration;

/// How long to wait between attempts of a retried operation.
///
/// Policies are pure data: they compute delays but never sleep. The total
/// time spent retrying is bounded separately by the `max_elapsed` argument
/// of the executor, so a policy only shapes the spacing of attempts.
///
/// # Examples
///
/// ```rust
/// use slackwater::retry::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::exponential(Duration::from_millis(100))
///     .with_max_delay(Duration::from_millis(500));
///
/// assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500)); // capped
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    strategy: BackoffStrategy,
    max_delay: Duration,
    jitter: JitterStrategy,
}

/// The shape of the delay sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay grows geometrically: initial * multiplier^attempt.
    Exponential {
        /// Delay before the first retry.
        initial: Duration,
        /// Growth factor applied per attempt.
        multiplier: u32,
    },
}

/// Randomization of computed delays, so that many controllers retrying
/// against the same control plane spread out.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// Delays are used as computed.
    #[default]
    None,
    /// Delays vary by up to this fraction either way.
    Proportional(f64),
    /// Delays are drawn uniformly from zero to the computed delay.
    Full,
}

impl Default for BackoffPolicy {
    /// 500ms doubling up to 10s, the usual pacing for control-plane calls.
    fn default() -> Self {
        Self::exponential(Duration::from_millis(500)).with_max_delay(Duration::from_secs(10))
    }
}

impl BackoffPolicy {
    /// Doubling delays starting at `initial`, capped at one minute.
    pub fn exponential(initial: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential {
                initial,
                multiplier: 2,
            },
            max_delay: Duration::from_secs(60),
            jitter: JitterStrategy::None,
        }
    }

    /// The same delay before every retry.
    ///
    /// ```rust
    /// use slackwater::retry::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::constant(Duration::from_millis(250));
    /// assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(250));
    /// assert_eq!(policy.delay_for_attempt(9), Duration::from_millis(250));
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Constant(delay),
            max_delay: delay,
            jitter: JitterStrategy::None,
        }
    }

    /// Change the growth factor of an exponential policy.
    ///
    /// Has no effect on a constant policy. A multiplier of 0 is treated as 1.
    pub fn with_multiplier(mut self, factor: u32) -> Self {
        if let BackoffStrategy::Exponential { multiplier, .. } = &mut self.strategy {
            *multiplier = factor.max(1);
        }
        self
    }

    /// Set the cap for a single delay.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Vary each delay by up to `factor` of itself, e.g. `0.2` for ±20%.
    ///
    /// Only takes effect with the `jitter` feature. The factor is clamped to
    /// `0.0..=1.0`; a NaN or infinite factor disables jitter.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = if factor.is_finite() {
            JitterStrategy::Proportional(factor.clamp(0.0, 1.0))
        } else {
            JitterStrategy::None
        };
        self
    }

    /// Draw each delay uniformly from zero up to the computed delay.
    ///
    /// Only takes effect with the `jitter` feature.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// The cap on a single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// How delays are randomized.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// The shape of the delay sequence.
    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    /// The delay to wait after failed attempt `attempt` (0-indexed), before jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = match &self.strategy {
            BackoffStrategy::Constant(d) => *d,
            BackoffStrategy::Exponential {
                initial,
                multiplier,
            } => initial.saturating_mul(multiplier.saturating_pow(attempt)),
        };
        base.min(self.max_delay)
    }

    /// The delay with jitter applied, still capped at `max_delay`.
    pub(crate) fn jittered_delay(&self, attempt: u32) -> Duration {
        self.jitter
            .apply(self.delay_for_attempt(attempt))
            .min(self.max_delay)
    }
}

impl JitterStrategy {
    /// Randomize `delay`. Without the `jitter` feature, returns it unchanged.
    pub fn apply(&self, delay: Duration) -> Duration {
        #[cfg(feature = "jitter")]
        {
            use rand::Rng;

            let secs = delay.as_secs_f64();
            match self {
                Self::None => delay,
                Self::Proportional(factor) if !factor.is_finite() => delay,
                Self::Proportional(factor) => {
                    let factor = factor.clamp(0.0, 1.0);
                    let low = secs * (1.0 - factor);
                    let high = secs * (1.0 + factor);
                    if high <= low {
                        delay
                    } else {
                        Duration::from_secs_f64(rand::rng().random_range(low..=high))
                    }
                }
                Self::Full if delay.is_zero() => Duration::ZERO,
                Self::Full => Duration::from_secs_f64(rand::rng().random_range(0.0..=secs)),
            }
        }
        #[cfg(not(feature = "jitter"))]
        {
            let _ = self;
            delay
        }
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_default_policy_paces_control_plane_calls() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(10));
    }

    #[test]
    fn test_multiplier() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(10)).with_multiplier(3);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(30));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(90));
    }

    #[test]
    fn test_zero_multiplier_is_constant() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(10)).with_multiplier(0);
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(10));
    }

    #[test]
    fn test_huge_attempt_saturates_to_cap() {
        let policy = BackoffPolicy::exponential(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_none_returns_base_delay() {
        let base = Duration::from_millis(100);
        assert_eq!(JitterStrategy::None.apply(base), base);
    }

    #[test]
    fn test_jittered_delay_never_exceeds_cap() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(150))
            .with_jitter(1.0);
        for attempt in 0..10 {
            assert!(policy.jittered_delay(attempt) <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_non_finite_jitter_factor_disables_jitter() {
        for factor in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let policy = BackoffPolicy::constant(Duration::from_millis(100)).with_jitter(factor);
            assert_eq!(policy.jitter(), &JitterStrategy::None);
            assert_eq!(policy.jittered_delay(0), Duration::from_millis(100));
        }
    }

    #[test]
    fn test_out_of_range_jitter_stays_within_bounds() {
        let base = Duration::from_millis(100);
        assert_eq!(JitterStrategy::Proportional(f64::NAN).apply(base), base);
        for _ in 0..20 {
            assert!(JitterStrategy::Proportional(5.0).apply(base) <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_policy_getters() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5))
            .with_full_jitter();

        assert_eq!(policy.max_delay(), Duration::from_secs(5));
        assert_eq!(policy.jitter(), &JitterStrategy::Full);
        assert!(matches!(
            policy.strategy(),
            BackoffStrategy::Exponential { multiplier: 2, .. }
        ));
    }
}
