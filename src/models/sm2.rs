//! SM-2 (SuperMemo 2) family spaced repetition scheduler.
//!
//! Computes a card's next review state from a four-level recall rating:
//! - Again: repetitions reset, interval drops to a short fixed value, EF is penalised
//! - Hard / Good / Easy: repetitions grow, interval goes 1 day → 6 days → previous × EF
//! - EF moves down for Hard, stays for Good, moves up for Easy
//! - EF is kept between a floor (1.3) and a ceiling
//!
//! The scheduler is pure: the same state, rating and `now` always give the same result.

use super::{Rating, SrsState, srs_state::MILLIS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Numeric constants of the scheduling policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrsPolicy {
    pub initial_ease: f64,
    pub min_ease: f64,
    pub max_ease: f64,
    pub failure_penalty: f64,
    pub hard_penalty: f64,
    pub easy_bonus: f64,
    pub failure_interval: u32,
    pub first_interval: u32,
    pub second_interval: u32,
    pub min_interval: u32,
}

impl Default for SrsPolicy {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            min_ease: 1.3,
            max_ease: 4.0,
            failure_penalty: 0.2,
            hard_penalty: 0.15,
            easy_bonus: 0.15,
            failure_interval: 1,
            first_interval: 1,
            second_interval: 6,
            min_interval: 1,
        }
    }
}

impl SrsPolicy {
    /// Brings any ease factor back into `[min_ease, max_ease]`.
    fn clamp_ease(&self, ease: f64) -> f64 {
        if !ease.is_finite() {
            return self.initial_ease.clamp(self.min_ease, self.max_ease);
        }
        ease.clamp(self.min_ease, self.max_ease)
    }
}

/// Calculates the review state that follows `rating` at time `now` (epoch millis).
pub fn calculate_next_review(
    state: &SrsState,
    rating: Rating,
    now: i64,
    policy: &SrsPolicy,
) -> SrsState {
    let ease = policy.clamp_ease(state.ease_factor);

    let (repetition, interval, ease_factor) = match rating {
        Rating::Again => (
            0,
            policy.failure_interval,
            policy.clamp_ease(ease - policy.failure_penalty),
        ),
        Rating::Hard | Rating::Good | Rating::Easy => {
            let new_ease = match rating {
                Rating::Hard => policy.clamp_ease(ease - policy.hard_penalty),
                Rating::Easy => policy.clamp_ease(ease + policy.easy_bonus),
                _ => ease,
            };
            let new_reps = state.repetition.saturating_add(1);
            let new_interval = match new_reps {
                1 => policy.first_interval,
                2 => policy.second_interval,
                // `as` saturates on overflow
                _ => (state.interval as f64 * new_ease).round() as u32,
            };
            (new_reps, new_interval.max(policy.min_interval), new_ease)
        }
    };

    SrsState {
        repetition,
        interval,
        ease_factor,
        next_review: now.saturating_add(i64::from(interval) * MILLIS_PER_DAY),
    }
}

/// Interval (days) each rating would produce, in [`Rating::ALL`] order.
pub fn preview_intervals(state: &SrsState, policy: &SrsPolicy) -> [u32; 4] {
    Rating::ALL.map(|rating| calculate_next_review(state, rating, 0, policy).interval)
}

/// Short human readable interval, e.g. `3d`, `2w`, `4mo`, `1y`.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    fn state(repetition: u32, interval: u32, ease_factor: f64) -> SrsState {
        SrsState {
            repetition,
            interval,
            ease_factor,
            next_review: 0,
        }
    }

    fn next(state: &SrsState, rating: Rating) -> SrsState {
        calculate_next_review(state, rating, T, &SrsPolicy::default())
    }

    #[test]
    fn test_first_review_good() {
        let result = next(&state(0, 0, 2.5), Rating::Good);
        assert_eq!(result.repetition, 1);
        assert_eq!(result.interval, 1);
        assert_eq!(result.ease_factor, 2.5);
        assert_eq!(result.next_review, T + MILLIS_PER_DAY);
    }

    #[test]
    fn test_second_review_good() {
        let result = next(&state(1, 1, 2.5), Rating::Good);
        assert_eq!(result.repetition, 2);
        assert_eq!(result.interval, 6);
        assert_eq!(result.ease_factor, 2.5);
        assert_eq!(result.next_review, T + 6 * MILLIS_PER_DAY);
    }

    #[test]
    fn test_third_review_easy_uses_raised_ease() {
        let result = next(&state(2, 6, 2.5), Rating::Easy);
        assert_eq!(result.repetition, 3);
        assert!((result.ease_factor - 2.65).abs() < 1e-9);
        assert_eq!(result.interval, (6.0_f64 * 2.65).round() as u32);
        assert_eq!(result.interval, 16);
    }

    #[test]
    fn test_lapse_resets_progress() {
        let result = next(&state(5, 40, 2.1), Rating::Again);
        assert_eq!(result.repetition, 0);
        assert_eq!(result.interval, 1);
        assert!((result.ease_factor - 1.9).abs() < 1e-9);
        assert_eq!(result.next_review, T + MILLIS_PER_DAY);
    }

    #[test]
    fn test_hard_lowers_ease_and_still_grows() {
        let result = next(&state(3, 20, 2.5), Rating::Hard);
        assert_eq!(result.repetition, 4);
        assert!((result.ease_factor - 2.35).abs() < 1e-9);
        assert_eq!(result.interval, 47);
    }

    #[test]
    fn test_rounding_avoids_stagnation() {
        // 2 * 1.3 truncates back to 2
        let result = next(&state(2, 2, 1.3), Rating::Good);
        assert_eq!(result.interval, 3);
    }

    #[test]
    fn test_again_always_resets_regardless_of_state() {
        for reps in [0, 1, 2, 7, 100] {
            for interval in [0, 1, 6, 365] {
                for ease in [1.3, 2.5, 3.9] {
                    let result = next(&state(reps, interval, ease), Rating::Again);
                    assert_eq!(result.repetition, 0);
                    assert_eq!(result.interval, 1);
                }
            }
        }
    }

    #[test]
    fn test_success_increments_repetition() {
        for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
            for reps in [0, 1, 2, 3, 50] {
                let result = next(&state(reps, 5, 2.5), rating);
                assert_eq!(result.repetition, reps + 1);
                assert!(result.interval >= 1);
            }
        }
    }

    #[test]
    fn test_ease_never_drops_below_floor() {
        let mut current = state(0, 0, 2.5);
        for _ in 0..200 {
            current = next(&current, Rating::Again);
            assert!(current.ease_factor >= 1.3);
        }
        for _ in 0..50 {
            current = next(&current, Rating::Hard);
            assert!(current.ease_factor >= 1.3);
        }
        assert_eq!(current.ease_factor, 1.3);
    }

    #[test]
    fn test_ease_is_capped() {
        let mut current = state(0, 0, 2.5);
        for _ in 0..40 {
            current = next(&current, Rating::Easy);
        }
        assert_eq!(current.ease_factor, 4.0);
    }

    #[test]
    fn test_out_of_range_ease_is_clamped() {
        let low = next(&state(3, 10, 0.2), Rating::Good);
        assert_eq!(low.ease_factor, 1.3);
        assert_eq!(low.interval, 13);

        let high = next(&state(3, 10, 9.0), Rating::Good);
        assert_eq!(high.ease_factor, 4.0);

        let nan = next(&state(3, 10, f64::NAN), Rating::Good);
        assert_eq!(nan.ease_factor, 2.5);
    }

    #[test]
    fn test_next_review_is_derived_from_interval() {
        let ratings = [Rating::Good, Rating::Good, Rating::Easy, Rating::Hard, Rating::Again];
        let mut current = state(0, 0, 2.5);
        for (i, rating) in ratings.into_iter().enumerate() {
            let now = T + i as i64 * 12_345;
            current = calculate_next_review(&current, rating, now, &SrsPolicy::default());
            assert_eq!(
                current.next_review,
                now + i64::from(current.interval) * MILLIS_PER_DAY
            );
        }
    }

    #[test]
    fn test_same_inputs_same_output() {
        let input = state(4, 17, 2.2);
        for rating in Rating::ALL {
            assert_eq!(next(&input, rating), next(&input, rating));
        }
    }

    #[test]
    fn test_custom_policy_constants() {
        let policy = SrsPolicy {
            failure_interval: 2,
            second_interval: 4,
            ..SrsPolicy::default()
        };
        let lapse = calculate_next_review(&state(3, 9, 2.5), Rating::Again, T, &policy);
        assert_eq!(lapse.interval, 2);
        let second = calculate_next_review(&state(1, 1, 2.5), Rating::Good, T, &policy);
        assert_eq!(second.interval, 4);
    }

    #[test]
    fn test_preview_intervals() {
        assert_eq!(
            preview_intervals(&state(2, 6, 2.5), &SrsPolicy::default()),
            [1, 14, 15, 16]
        );
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(800), "2y");
    }
}
