//! Aggregations over spin outcomes and reviews.
//!
//! Everything here is a pure function of its inputs; the analytics service
//! loads the data and supplies the current time.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ParseLabelError, Rating, RewardId, SpinOutcome};

/// Number of entries kept by [`reward_tallies`].
pub const TOP_REWARDS: usize = 10;

/// Bucket width for [`spins_over_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    /// Last seven days, one bucket per day.
    #[default]
    Daily,
    /// Last 28 days, one bucket per ISO week.
    Weekly,
    /// Last twelve months, one bucket per month.
    Monthly,
}

impl AnalyticsPeriod {
    /// Earliest instant included in the report.
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Daily => now - Duration::days(7),
            Self::Weekly => now - Duration::days(28),
            Self::Monthly => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(now - Duration::days(365)),
        }
    }

    /// Label of the bucket containing `at`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use spinwin::domain::AnalyticsPeriod;
    ///
    /// let at = Utc.with_ymd_and_hms(2027, 1, 1, 12, 0, 0).unwrap();
    /// assert_eq!(AnalyticsPeriod::Daily.bucket_label(at), "2027-01-01");
    /// assert_eq!(AnalyticsPeriod::Weekly.bucket_label(at), "2026-W53");
    /// assert_eq!(AnalyticsPeriod::Monthly.bucket_label(at), "2027-01");
    /// ```
    pub fn bucket_label(self, at: DateTime<Utc>) -> String {
        let format = match self {
            Self::Daily => "%Y-%m-%d",
            Self::Weekly => "%G-W%V",
            Self::Monthly => "%Y-%m",
        };
        at.format(format).to_string()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for AnalyticsPeriod {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ParseLabelError::new("analytics period", other)),
        }
    }
}

/// Spin count for one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinBucket {
    pub label: String,
    pub count: u64,
}

/// Count outcomes created inside the period's window, grouped by bucket in
/// ascending label order. Empty buckets are omitted.
pub fn spins_over_time(
    outcomes: &[SpinOutcome],
    period: AnalyticsPeriod,
    now: DateTime<Utc>,
) -> Vec<SpinBucket> {
    let start = period.window_start(now);
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for outcome in outcomes {
        let created_at = outcome.created_at();
        if created_at < start || created_at > now {
            continue;
        }
        *buckets.entry(period.bucket_label(created_at)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(label, count)| SpinBucket { label, count })
        .collect()
}

/// Positive versus negative split of rated reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDistribution {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = part as f64 / total as f64;
    (ratio * 10_000.0).round() / 100.0
}

/// Summarise ratings; four and five stars are positive.
pub fn review_distribution(ratings: &[Rating]) -> ReviewDistribution {
    let positive = ratings.iter().filter(|rating| rating.is_positive()).count() as u64;
    let total = ratings.len() as u64;
    let negative = total - positive;
    ReviewDistribution {
        total,
        positive,
        negative,
        positive_percentage: percentage(positive, total),
        negative_percentage: percentage(negative, total),
    }
}

/// How often one reward was won and claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTally {
    pub reward_id: RewardId,
    pub name: String,
    pub awarded: u64,
    pub claimed: u64,
}

/// Tally awarded prizes per reward, most awarded first, keeping the top
/// [`TOP_REWARDS`]. Ties are broken by name.
pub fn reward_tallies(outcomes: &[SpinOutcome]) -> Vec<RewardTally> {
    let mut tallies: HashMap<RewardId, RewardTally> = HashMap::new();
    for outcome in outcomes {
        let Some(prize) = outcome.prize() else {
            continue;
        };
        let tally = tallies.entry(prize.reward_id).or_insert_with(|| RewardTally {
            reward_id: prize.reward_id,
            name: prize.name.clone(),
            awarded: 0,
            claimed: 0,
        });
        tally.awarded += 1;
        if outcome.claimed_at().is_some() {
            tally.claimed += 1;
        }
    }

    let mut ranked: Vec<RewardTally> = tallies.into_values().collect();
    ranked.sort_by(|a, b| b.awarded.cmp(&a.awarded).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_REWARDS);
    ranked
}

/// Everything the admin dashboard shows in one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub spins: Vec<SpinBucket>,
    pub reviews: ReviewDistribution,
    pub rewards: Vec<RewardTally>,
}
