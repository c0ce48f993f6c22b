//! Weighted reward selection.
//!
//! The allocator is pure: it picks a winner from the pool it is given and
//! never touches stock. Committing the decrement is the ledger's job, see
//! [`crate::domain::ports::SpinLedger::record`].

use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::RewardDefinition;

/// Source of the uniform value used to walk the cumulative weights.
pub trait RewardDraw: Send + Sync {
    /// Return a value uniformly distributed over `[0, total)`.
    ///
    /// Callers guarantee `total` is finite and positive.
    fn draw(&self, total: f64) -> f64;
}

/// Draw backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl RewardDraw for ThreadRngDraw {
    fn draw(&self, total: f64) -> f64 {
        rand::thread_rng().gen_range(0.0..total)
    }
}

/// Reproducible draw for simulations and tests.
#[derive(Debug)]
pub struct SeededDraw {
    rng: Mutex<SmallRng>,
}

impl SeededDraw {
    /// Build a draw whose sequence depends only on `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RewardDraw for SeededDraw {
    fn draw(&self, total: f64) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0.0..total)
    }
}

/// Failure to select any reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// No entry in the pool carries positive weight.
    #[error("reward inventory is exhausted")]
    InventoryExhausted,
}

/// Walk `weights` in order and return the index whose cumulative interval
/// contains `r`.
///
/// Entries with zero, negative or NaN weight occupy no interval and are never
/// returned. When `r` falls at or past the end of the last interval the last
/// positive-weight entry is returned. `None` means nothing has weight.
///
/// # Examples
/// ```
/// use spinwin::domain::pick_index;
///
/// assert_eq!(pick_index(&[1.0, 3.0], 0.5), Some(0));
/// assert_eq!(pick_index(&[1.0, 3.0], 2.5), Some(1));
/// assert_eq!(pick_index(&[0.0, 0.0], 0.0), None);
/// ```
pub fn pick_index(weights: &[f64], r: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, weight) in weights.iter().copied().enumerate() {
        if weight.is_nan() || weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = Some(index);
        if r < cumulative {
            return Some(index);
        }
    }
    last_positive
}

/// Select one reward from `pool` proportionally to its weight.
///
/// Ineligible entries (prizes without stock) are skipped, and the walk keeps
/// the order of `pool`, which callers supply in creation order.
///
/// # Errors
/// [`AllocationError::InventoryExhausted`] when the eligible entries weigh
/// nothing in total.
pub fn select<'a>(
    pool: &'a [RewardDefinition],
    draw: &dyn RewardDraw,
) -> Result<&'a RewardDefinition, AllocationError> {
    let eligible: Vec<&RewardDefinition> =
        pool.iter().filter(|reward| reward.is_eligible()).collect();
    let weights: Vec<f64> = eligible.iter().map(|reward| reward.weight()).collect();
    let total: f64 = weights.iter().copied().filter(|weight| *weight > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(AllocationError::InventoryExhausted);
    }

    let r = draw.draw(total);
    pick_index(&weights, r)
        .and_then(|index| eligible.get(index).copied())
        .ok_or(AllocationError::InventoryExhausted)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{CouponCode, RewardDraft, RewardId, RewardKind, SliceWeight};

    struct FixedDraw(f64);

    impl RewardDraw for FixedDraw {
        fn draw(&self, _total: f64) -> f64 {
            self.0
        }
    }

    fn prize(name: &str, stock: u32, offset: i64) -> RewardDefinition {
        RewardDefinition::new(RewardDraft {
            id: RewardId::random(),
            name: name.to_owned(),
            description: String::new(),
            kind: RewardKind::Prize {
                coupon_code: CouponCode::new(name.to_uppercase()).expect("valid coupon"),
                stock,
            },
            expiry_days: None,
            requires_review: false,
            created_at: Utc::now() + Duration::seconds(offset),
        })
        .expect("valid prize")
    }

    fn try_again(weight: f64) -> RewardDefinition {
        RewardDefinition::new(RewardDraft {
            id: RewardId::random(),
            name: "Try again".to_owned(),
            description: String::new(),
            kind: RewardKind::TryAgain {
                weight: SliceWeight::new(weight).expect("valid weight"),
            },
            expiry_days: None,
            requires_review: false,
            created_at: Utc::now(),
        })
        .expect("valid slice")
    }

    #[rstest]
    #[case(0.5, "a")]
    #[case(0.999, "a")]
    #[case(1.0, "b")]
    #[case(2.5, "b")]
    fn walks_cumulative_weights(#[case] r: f64, #[case] expected: &str) {
        let pool = vec![prize("a", 1, 0), prize("b", 3, 1)];
        let winner = select(&pool, &FixedDraw(r)).expect("pool has stock");
        assert_eq!(winner.name(), expected);
    }

    #[rstest]
    #[case(4.0)]
    #[case(17.0)]
    fn falls_back_to_last_positive_entry_past_the_end(#[case] r: f64) {
        let pool = vec![prize("a", 1, 0), prize("b", 3, 1), try_again(0.0)];
        let winner = select(&pool, &FixedDraw(r)).expect("pool has stock");
        assert_eq!(winner.name(), "b");
    }

    #[rstest]
    fn skips_prizes_without_stock() {
        let pool = vec![prize("empty", 0, 0), prize("full", 2, 1)];
        let winner = select(&pool, &FixedDraw(0.0)).expect("pool has stock");
        assert_eq!(winner.name(), "full");
    }

    #[rstest]
    fn exhausted_pool_is_reported() {
        let pool = vec![prize("a", 0, 0), prize("b", 0, 1)];
        assert_eq!(
            select(&pool, &FixedDraw(0.0)).map(RewardDefinition::name),
            Err(AllocationError::InventoryExhausted)
        );
    }

    #[rstest]
    fn empty_pool_is_reported() {
        assert_eq!(
            select(&[], &ThreadRngDraw).map(RewardDefinition::name),
            Err(AllocationError::InventoryExhausted)
        );
    }

    #[rstest]
    fn zero_weight_slice_alone_is_exhausted() {
        let pool = vec![try_again(0.0)];
        assert!(select(&pool, &ThreadRngDraw).is_err());
    }

    #[rstest]
    fn zero_weight_entries_are_never_picked() {
        let weights = [0.0, 2.0, 0.0, 1.0, 0.0];
        for step in 0..300 {
            let r = f64::from(step) * 0.01;
            let picked = pick_index(&weights, r).expect("positive weights exist");
            assert!(picked == 1 || picked == 3, "picked zero-weight index {picked}");
        }
    }

    #[rstest]
    fn frequencies_converge_to_weights() {
        const DRAWS: u32 = 100_000;
        let pool = vec![prize("a", 1, 0), prize("b", 3, 1), prize("c", 0, 2), try_again(6.0)];
        let draw = SeededDraw::new(0x5eed);
        let mut counts = [0_u32; 4];
        for _ in 0..DRAWS {
            let winner = select(&pool, &draw).expect("pool has stock");
            let index = pool
                .iter()
                .position(|reward| reward.id() == winner.id())
                .expect("winner comes from the pool");
            if let Some(count) = counts.get_mut(index) {
                *count += 1;
            }
        }

        let expected = [0.1, 0.3, 0.0, 0.6];
        for (count, share) in counts.iter().zip(expected) {
            let observed = f64::from(*count) / f64::from(DRAWS);
            assert!(
                (observed - share).abs() < 0.01,
                "observed {observed} for expected share {share}"
            );
        }
        assert_eq!(counts.get(2), Some(&0));
    }

    #[rstest]
    fn thread_rng_draw_stays_in_range() {
        let draw = ThreadRngDraw;
        for _ in 0..1_000 {
            let r = draw.draw(2.5);
            assert!((0.0..2.5).contains(&r));
        }
    }
}
