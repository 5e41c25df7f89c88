use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// One normalized row of the channel table. Immutable after ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecord {
    pub channel_name: String,
    pub category: String,
    pub country: String,
    pub country_name: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    pub views_last_30_days: u64,
    pub videos_last_30_days: u64,
    pub created_date: NaiveDate,
    pub channel_age_years: f64,
    pub video_count_log1p: f64,
}

impl ChannelRecord {
    pub fn subscriber_tier(&self) -> SubscriberTier {
        SubscriberTier::from_count(self.subscriber_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SubscriberTier {
    #[serde(rename = "0-1K")]
    UpTo1K,
    #[serde(rename = "1K-10K")]
    UpTo10K,
    #[serde(rename = "10K-100K")]
    UpTo100K,
    #[serde(rename = "100K-1M")]
    UpTo1M,
    #[serde(rename = "1M+")]
    OneMillionPlus,
}

impl SubscriberTier {
    pub const ALL: [SubscriberTier; 5] = [
        SubscriberTier::UpTo1K,
        SubscriberTier::UpTo10K,
        SubscriberTier::UpTo100K,
        SubscriberTier::UpTo1M,
        SubscriberTier::OneMillionPlus,
    ];

    /// Bins are closed-open, so each boundary value lands in the upper tier.
    pub fn from_count(subscribers: u64) -> Self {
        match subscribers {
            0..=999 => SubscriberTier::UpTo1K,
            1_000..=9_999 => SubscriberTier::UpTo10K,
            10_000..=99_999 => SubscriberTier::UpTo100K,
            100_000..=999_999 => SubscriberTier::UpTo1M,
            _ => SubscriberTier::OneMillionPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubscriberTier::UpTo1K => "0-1K",
            SubscriberTier::UpTo10K => "1K-10K",
            SubscriberTier::UpTo100K => "10K-100K",
            SubscriberTier::UpTo1M => "100K-1M",
            SubscriberTier::OneMillionPlus => "1M+",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.label() == label)
    }
}

impl fmt::Display for SubscriberTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Filter selections for one tab. Dimensions combine with AND, values inside a
/// dimension with OR, and an empty set leaves that dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub categories: BTreeSet<String>,
    pub country_names: BTreeSet<String>,
    /// Inclusive; `None` means the full age range of the table.
    pub age_range: Option<(f64, f64)>,
    pub tiers: BTreeSet<SubscriberTier>,
}

/// Per-record derived metrics. Never written back to the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub growth_boost_score: f64,
    pub audience_interest_rate: f64,
    pub views_per_upload: f64,
    pub cost_effectiveness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    GrowthBoostScore,
    AudienceInterestRate,
    ViewsPerUpload,
    VideosLast30Days,
    SubscriberCount,
    ViewsLast30Days,
    VideoCount,
    CostEffectiveness,
}

impl MetricName {
    pub fn label(self) -> &'static str {
        match self {
            MetricName::GrowthBoostScore => "Growth Boost Score",
            MetricName::AudienceInterestRate => "Audience Interest Rate",
            MetricName::ViewsPerUpload => "Views per Upload",
            MetricName::VideosLast30Days => "Uploads (Last 30 Days)",
            MetricName::SubscriberCount => "Subscribers",
            MetricName::ViewsLast30Days => "Views (Last 30 Days)",
            MetricName::VideoCount => "Total Video Count",
            MetricName::CostEffectiveness => "Cost-Effectiveness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarAxis {
    pub metric: MetricName,
    pub channel: f64,
    pub peer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAggregate {
    pub label: &'static str,
    pub typical_views: f64,
    pub channel_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDifficulty {
    pub category: String,
    pub mean_subscribers: f64,
    pub mean_views: f64,
    pub channel_count: usize,
    pub band: DifficultyBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPerformance {
    pub country: String,
    pub country_name: String,
    pub category: String,
    pub mean_views: f64,
    pub mean_subscribers: f64,
    pub channel_count: usize,
    pub performance_score: f64,
}

/// Duplicate rows for one channel name collapsed: magnitudes by max, the
/// ratio metric by mean, descriptive fields from the first row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAggregate {
    pub channel_name: String,
    pub country: String,
    pub country_name: String,
    pub category: String,
    pub subscriber_count: u64,
    pub views_last_30_days: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub cost_effectiveness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricVersusAverage {
    pub metric: MetricName,
    pub channel: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub channel_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_map_to_the_upper_tier() {
        assert_eq!(SubscriberTier::from_count(0), SubscriberTier::UpTo1K);
        assert_eq!(SubscriberTier::from_count(999), SubscriberTier::UpTo1K);
        assert_eq!(SubscriberTier::from_count(1_000), SubscriberTier::UpTo10K);
        assert_eq!(SubscriberTier::from_count(10_000), SubscriberTier::UpTo100K);
        assert_eq!(SubscriberTier::from_count(100_000), SubscriberTier::UpTo1M);
        assert_eq!(SubscriberTier::from_count(1_000_000), SubscriberTier::OneMillionPlus);
    }

    #[test]
    fn labels_parse_back() {
        for tier in SubscriberTier::ALL {
            assert_eq!(SubscriberTier::parse(tier.label()), Some(tier));
        }
        assert_eq!(SubscriberTier::parse("10M+"), None);
    }

    proptest! {
        #[test]
        fn prop_tier_is_total_and_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(SubscriberTier::ALL.contains(&SubscriberTier::from_count(a)));
            prop_assert!(SubscriberTier::from_count(low) <= SubscriberTier::from_count(high));
        }
    }
}
