use tracing::debug;

use crate::models::{ChannelRecord, FilterCriteria};

/// Inclusive min/max of `channel_age_years`, or `None` for an empty table.
pub fn age_bounds(records: &[ChannelRecord]) -> Option<(f64, f64)> {
    records.iter().map(|r| r.channel_age_years).fold(None, |acc, age| match acc {
        None => Some((age, age)),
        Some((lo, hi)) => Some((lo.min(age), hi.max(age))),
    })
}

/// Returns the records matching `criteria`, in source order. The age range is
/// always applied; when unset it defaults to the bounds of `records`.
pub fn apply(records: &[ChannelRecord], criteria: &FilterCriteria) -> Vec<ChannelRecord> {
    let Some((age_min, age_max)) = criteria.age_range.or_else(|| age_bounds(records)) else {
        return Vec::new();
    };

    let filtered: Vec<ChannelRecord> = records
        .iter()
        .filter(|r| criteria.categories.is_empty() || criteria.categories.contains(&r.category))
        .filter(|r| {
            criteria.country_names.is_empty() || criteria.country_names.contains(&r.country_name)
        })
        .filter(|r| criteria.tiers.is_empty() || criteria.tiers.contains(&r.subscriber_tier()))
        .filter(|r| age_min <= r.channel_age_years && r.channel_age_years <= age_max)
        .cloned()
        .collect();

    debug!(
        input = records.len(),
        output = filtered.len(),
        "applied filter criteria"
    );
    filtered
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::SubscriberTier;
    use chrono::NaiveDate;

    pub(crate) fn record(name: &str, category: &str, country: &str, age: f64) -> ChannelRecord {
        ChannelRecord {
            channel_name: name.to_string(),
            category: category.to_string(),
            country: country.to_string(),
            country_name: crate::countries::display_name(country)
                .unwrap_or(country)
                .to_string(),
            subscriber_count: 5_000,
            view_count: 100_000,
            video_count: 50,
            views_last_30_days: 2_000,
            videos_last_30_days: 4,
            created_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            channel_age_years: age,
            video_count_log1p: 51f64.ln(),
        }
    }

    fn table() -> Vec<ChannelRecord> {
        vec![
            record("a", "Gaming", "US", 1.0),
            record("b", "Music", "US", 3.0),
            record("c", "Gaming", "IN", 5.0),
            record("d", "Comedy", "GB", 8.0),
        ]
    }

    fn names(records: &[ChannelRecord]) -> Vec<&str> {
        records.iter().map(|r| r.channel_name.as_str()).collect()
    }

    #[test]
    fn empty_criteria_keeps_everything() {
        let table = table();
        assert_eq!(apply(&table, &FilterCriteria::default()), table);
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let criteria = FilterCriteria {
            categories: ["Gaming".to_string(), "Music".to_string()].into(),
            country_names: ["United States".to_string()].into(),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply(&table(), &criteria)), vec!["a", "b"]);
    }

    #[test]
    fn age_range_is_inclusive() {
        let criteria = FilterCriteria {
            age_range: Some((3.0, 5.0)),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply(&table(), &criteria)), vec!["b", "c"]);
    }

    #[test]
    fn tier_filter_uses_subscriber_bins() {
        let mut table = table();
        table[0].subscriber_count = 1_000_000;
        let criteria = FilterCriteria {
            tiers: [SubscriberTier::OneMillionPlus].into(),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&apply(&table, &criteria)), vec!["a"]);
    }

    #[test]
    fn empty_output_is_a_valid_result() {
        let criteria = FilterCriteria {
            categories: ["Cooking".to_string()].into(),
            ..FilterCriteria::default()
        };
        assert!(apply(&table(), &criteria).is_empty());
        assert!(apply(&[], &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn computes_age_bounds() {
        assert_eq!(age_bounds(&table()), Some((1.0, 8.0)));
        assert_eq!(age_bounds(&[]), None);
    }
}
