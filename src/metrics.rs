//! Derived per-channel metrics and the peer statistics built on them.
//!
//! Every function here is pure. Denominator guards are numeric policy, not
//! error conditions: they never log and never fail.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{BucketAggregate, ChannelRecord, DerivedMetrics, MetricName, RadarAxis};

/// Peers are channels in the same category within this many years of age.
pub const PEER_AGE_WINDOW_YEARS: f64 = 3.0;

pub const BUCKET_LABELS: [&str; 7] = ["0-4", "5-9", "10-14", "15-19", "20-24", "25-29", "30+"];
const BUCKET_WIDTH: u64 = 5;

pub fn growth_boost_score(record: &ChannelRecord) -> f64 {
    let recent = record.views_last_30_days as f64;
    let subscribers = record.subscriber_count.max(1) as f64;
    0.7 * (recent / subscribers) + 0.3 * (recent / (record.view_count as f64 + 1.0))
}

/// Zero uploads count as a single implicit upload.
pub fn views_per_upload(record: &ChannelRecord) -> f64 {
    let recent = record.views_last_30_days as f64;
    if record.videos_last_30_days > 0 {
        recent / record.videos_last_30_days as f64
    } else {
        recent
    }
}

pub fn audience_interest_rate(record: &ChannelRecord) -> f64 {
    (record.views_last_30_days as f64 / (record.subscriber_count as f64 + 1.0)) * 100.0
}

pub fn cost_effectiveness(record: &ChannelRecord) -> f64 {
    let reach = (record.views_last_30_days as f64 + 1.0) / (record.subscriber_count as f64 + 1.0);
    reach * (1.0 / (record.video_count_log1p + 1.0))
}

pub fn derive(record: &ChannelRecord) -> DerivedMetrics {
    DerivedMetrics {
        growth_boost_score: growth_boost_score(record),
        audience_interest_rate: audience_interest_rate(record),
        views_per_upload: views_per_upload(record),
        cost_effectiveness: cost_effectiveness(record),
    }
}

/// Median with the midpoint convention for even lengths; 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// `(value - reference) / reference * 100`, or 0 when the reference is not positive.
pub fn percent_difference(value: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        (value - reference) / reference * 100.0
    } else {
        0.0
    }
}

/// Percentile rank of every element, ties sharing their average rank.
pub fn rank_pct(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| series[a].total_cmp(&series[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && series[order[end + 1]] == series[order[start]] {
            end += 1;
        }
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            ranks[index] = average_rank / n as f64;
        }
        start = end + 1;
    }
    ranks
}

/// Percentile rank of `value` within `series`.
///
/// An exact match uses the tie-averaged rank. Otherwise the result is the
/// strict-less-than share, which ignores ties.
pub fn pct_norm(value: f64, series: &[f64]) -> f64 {
    if let Some(position) = series.iter().position(|v| *v == value) {
        return rank_pct(series)[position];
    }
    let below = series.iter().filter(|v| **v < value).count();
    below as f64 / series.len().max(1) as f64
}

/// Mean of every element's percentile rank. Not a constant 0.5 once ties exist.
pub fn mean_rank_pct(series: &[f64]) -> f64 {
    mean(&rank_pct(series))
}

/// Same-category channels within the age window around `entity`, falling back
/// to the whole category when the window is empty.
pub fn peer_group<'a>(records: &'a [ChannelRecord], entity: &ChannelRecord) -> Vec<&'a ChannelRecord> {
    let same_category: Vec<&ChannelRecord> = records
        .iter()
        .filter(|r| r.category == entity.category)
        .collect();

    let low = (entity.channel_age_years - PEER_AGE_WINDOW_YEARS).max(0.0);
    let high = entity.channel_age_years + PEER_AGE_WINDOW_YEARS;
    let windowed: Vec<&ChannelRecord> = same_category
        .iter()
        .copied()
        .filter(|r| low <= r.channel_age_years && r.channel_age_years <= high)
        .collect();

    let peers = if windowed.is_empty() { same_category } else { windowed };
    debug!(
        channel = %entity.channel_name,
        peers = peers.len(),
        "resolved peer group"
    );
    peers
}

pub fn series<F>(records: &[&ChannelRecord], metric: F) -> Vec<f64>
where
    F: Fn(&ChannelRecord) -> f64,
{
    records.iter().map(|r| metric(*r)).collect()
}

/// Three percentile-scaled axes: the channel against its peers, and the
/// peers' mean percentile rank.
pub fn radar(entity: &ChannelRecord, peers: &[&ChannelRecord]) -> [RadarAxis; 3] {
    let axis = |metric: MetricName, f: fn(&ChannelRecord) -> f64| {
        let values = series(peers, f);
        RadarAxis {
            metric,
            channel: pct_norm(f(entity), &values),
            peer: mean_rank_pct(&values),
        }
    };
    [
        axis(MetricName::GrowthBoostScore, growth_boost_score),
        axis(MetricName::AudienceInterestRate, audience_interest_rate),
        axis(MetricName::ViewsPerUpload, views_per_upload),
    ]
}

/// Index into [`BUCKET_LABELS`]; lower edges inclusive, the last bucket open.
pub fn bucket_index(videos_last_30_days: u64) -> usize {
    ((videos_last_30_days / BUCKET_WIDTH) as usize).min(BUCKET_LABELS.len() - 1)
}

pub fn bucket_label(videos_last_30_days: u64) -> &'static str {
    BUCKET_LABELS[bucket_index(videos_last_30_days)]
}

/// Median 30-day views and distinct channel count per upload bucket. All seven
/// buckets are always returned; empty ones carry zeros.
pub fn posting_buckets(records: &[ChannelRecord]) -> Vec<BucketAggregate> {
    let mut views: Vec<Vec<f64>> = vec![Vec::new(); BUCKET_LABELS.len()];
    let mut channels: Vec<HashSet<&str>> = vec![HashSet::new(); BUCKET_LABELS.len()];

    for record in records {
        let index = bucket_index(record.videos_last_30_days);
        views[index].push(record.views_last_30_days as f64);
        channels[index].insert(record.channel_name.as_str());
    }

    BUCKET_LABELS
        .iter()
        .zip(views.iter().zip(channels.iter()))
        .map(|(label, (views, channels))| BucketAggregate {
            label: *label,
            typical_views: median(views),
            channel_count: channels.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::record;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn growth_boost_guards_both_denominators() {
        let mut r = record("a", "Gaming", "US", 1.0);
        r.subscriber_count = 0;
        r.view_count = 0;
        r.views_last_30_days = 100;
        assert!(approx(growth_boost_score(&r), 100.0));
    }

    #[test]
    fn growth_boost_matches_formula() {
        let mut r = record("a", "Gaming", "US", 1.0);
        r.subscriber_count = 1_000;
        r.view_count = 9_999;
        r.views_last_30_days = 500;
        assert!(approx(growth_boost_score(&r), 0.7 * 0.5 + 0.3 * 0.05));
    }

    #[test]
    fn views_per_upload_treats_zero_uploads_as_one() {
        let mut r = record("a", "Gaming", "US", 1.0);
        r.views_last_30_days = 900;
        r.videos_last_30_days = 0;
        assert!(approx(views_per_upload(&r), 900.0));
        r.videos_last_30_days = 3;
        assert!(approx(views_per_upload(&r), 300.0));
    }

    #[test]
    fn interest_rate_and_cost_effectiveness() {
        let mut r = record("a", "Gaming", "US", 1.0);
        r.subscriber_count = 99;
        r.views_last_30_days = 50;
        r.video_count = 0;
        r.video_count_log1p = 0.0;
        assert!(approx(audience_interest_rate(&r), 50.0));
        assert!(approx(cost_effectiveness(&r), 51.0 / 100.0));
    }

    #[test]
    fn median_handles_even_odd_and_empty() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn percent_difference_guards_zero_reference() {
        assert_eq!(percent_difference(5.0, 0.0), 0.0);
        assert!(approx(percent_difference(5.0, 4.0), 25.0));
        assert!(approx(percent_difference(2.0, 4.0), -50.0));
    }

    #[test]
    fn rank_pct_averages_ties() {
        let ranks = rank_pct(&[10.0, 20.0, 20.0, 40.0]);
        assert_eq!(ranks, vec![0.25, 0.625, 0.625, 1.0]);
    }

    #[test]
    fn pct_norm_exact_match_uses_tie_rank() {
        let s = [10.0, 20.0, 20.0, 40.0];
        assert_eq!(pct_norm(20.0, &s), 0.625);
        assert_eq!(pct_norm(10.0, &s), 0.25);
        assert_eq!(pct_norm(40.0, &s), 1.0);
    }

    #[test]
    fn pct_norm_fallback_counts_strictly_less() {
        let s = [10.0, 20.0, 20.0, 40.0];
        assert_eq!(pct_norm(25.0, &s), 0.75);
        assert_eq!(pct_norm(5.0, &s), 0.0);
        assert_eq!(pct_norm(5.0, &[]), 0.0);
    }

    #[test]
    fn mean_rank_is_not_always_one_half() {
        assert!(approx(mean_rank_pct(&[1.0, 2.0, 3.0]), 2.0 / 3.0));
        assert!(approx(mean_rank_pct(&[5.0, 5.0]), 0.75));
        assert_eq!(mean_rank_pct(&[]), 0.0);
    }

    #[test]
    fn peer_group_prefers_age_window() {
        let table = vec![
            record("me", "Gaming", "US", 5.0),
            record("near", "Gaming", "US", 7.5),
            record("far", "Gaming", "US", 9.0),
            record("other", "Music", "US", 5.0),
        ];
        let peers = peer_group(&table, &table[0]);
        let names: Vec<&str> = peers.iter().map(|r| r.channel_name.as_str()).collect();
        assert_eq!(names, vec!["me", "near"]);
    }

    #[test]
    fn peer_group_falls_back_to_category() {
        let table = vec![
            record("old", "Gaming", "US", 20.0),
            record("young", "Gaming", "US", 1.0),
        ];
        let entity = record("outsider", "Gaming", "US", 10.0);
        assert_eq!(peer_group(&table, &entity).len(), 2);
    }

    #[test]
    fn radar_scales_against_peers() {
        let mut table = vec![
            record("a", "Gaming", "US", 1.0),
            record("b", "Gaming", "US", 1.0),
        ];
        table[1].views_last_30_days = 10_000;
        let peers: Vec<&ChannelRecord> = table.iter().collect();
        let axes = radar(&table[1], &peers);
        assert_eq!(axes[0].metric, MetricName::GrowthBoostScore);
        assert_eq!(axes[0].channel, 1.0);
        assert!(approx(axes[0].peer, 0.75));
    }

    #[test]
    fn bucket_edges_are_closed_open() {
        assert_eq!(bucket_label(0), "0-4");
        assert_eq!(bucket_label(4), "0-4");
        assert_eq!(bucket_label(5), "5-9");
        assert_eq!(bucket_label(29), "25-29");
        assert_eq!(bucket_label(30), "30+");
        assert_eq!(bucket_label(500), "30+");
    }

    #[test]
    fn posting_buckets_always_emit_seven() {
        let mut table = vec![
            record("a", "Gaming", "US", 1.0),
            record("a", "Gaming", "US", 1.0),
            record("b", "Gaming", "US", 1.0),
        ];
        table[0].views_last_30_days = 100;
        table[1].views_last_30_days = 300;
        table[2].videos_last_30_days = 31;
        let buckets = posting_buckets(&table);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].typical_views, 200.0);
        assert_eq!(buckets[0].channel_count, 1);
        assert_eq!(buckets[3].typical_views, 0.0);
        assert_eq!(buckets[3].channel_count, 0);
        assert_eq!(buckets[6].channel_count, 1);

        let empty = posting_buckets(&[]);
        assert_eq!(empty.len(), 7);
        assert!(empty.iter().all(|b| b.channel_count == 0 && b.typical_views == 0.0));
    }

    proptest! {
        #[test]
        fn prop_growth_boost_is_finite_and_non_negative(
            subscribers in any::<u32>(),
            views in any::<u32>(),
            recent in any::<u32>(),
        ) {
            let mut r = record("p", "Gaming", "US", 1.0);
            r.subscriber_count = subscribers as u64;
            r.view_count = views as u64;
            r.views_last_30_days = recent as u64;
            let score = growth_boost_score(&r);
            prop_assert!(score.is_finite());
            prop_assert!(score >= 0.0);
        }

        #[test]
        fn prop_pct_norm_is_a_fraction(
            value in -1.0e6f64..1.0e6,
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..40),
        ) {
            let p = pct_norm(value, &values);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn prop_every_upload_count_has_one_bucket(videos in any::<u64>()) {
            let index = bucket_index(videos);
            prop_assert!(index < BUCKET_LABELS.len());
            let mut r = record("p", "Gaming", "US", 1.0);
            r.videos_last_30_days = videos;
            let buckets = posting_buckets(&[r]);
            prop_assert_eq!(buckets.len(), 7);
            prop_assert_eq!(buckets.iter().map(|b| b.channel_count).sum::<usize>(), 1);
            prop_assert_eq!(buckets[index].channel_count, 1);
        }
    }
}
