//! Grouped aggregations and their top-N selections.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::metrics::{self, mean};
use crate::models::{
    CategoryCount, CategoryDifficulty, ChannelAggregate, ChannelRecord, DifficultyBand,
    GeoPerformance, MetricName, MetricVersusAverage,
};

pub const DIFFICULTY_MIN_CHANNELS: usize = 10;
pub const DIFFICULTY_LIMIT: usize = 20;
pub const GEO_CATEGORY_LIMIT: usize = 10;
pub const GEO_LIMIT: usize = 25;
pub const COST_EFFECTIVE_LIMIT: usize = 15;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Categories with at least ten channels, ordered by ascending mean
/// subscribers, keeping the last twenty after that sort.
///
/// Known behavior: taking the tail keeps the twenty categories with the
/// HIGHEST mean subscribers (the hardest to enter), listed easiest-first
/// within that selection. Callers relying on "easy entry" framing get the
/// hardest categories.
pub fn category_difficulty(records: &[ChannelRecord]) -> Vec<CategoryDifficulty> {
    let mut groups: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.category.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.subscriber_count as f64;
        entry.2 += record.view_count as f64;
    }

    let mut ranked: Vec<(String, f64, f64, usize)> = groups
        .into_iter()
        .filter(|(_, (count, _, _))| *count >= DIFFICULTY_MIN_CHANNELS)
        .map(|(category, (count, subscribers, views))| {
            (
                category.to_string(),
                subscribers / count as f64,
                views / count as f64,
                count,
            )
        })
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    let tail = ranked.split_off(ranked.len().saturating_sub(DIFFICULTY_LIMIT));

    let low = tail.first().map(|row| row.1).unwrap_or(0.0);
    let high = tail.last().map(|row| row.1).unwrap_or(0.0);
    tail.into_iter()
        .map(|(category, mean_subscribers, mean_views, channel_count)| CategoryDifficulty {
            band: difficulty_band(mean_subscribers, low, high),
            category,
            mean_subscribers,
            mean_views,
            channel_count,
        })
        .collect()
}

/// Position of `value` between `low` and `high`, in thirds.
pub fn difficulty_band(value: f64, low: f64, high: f64) -> DifficultyBand {
    let range = high - low;
    if range == 0.0 {
        return DifficultyBand::Hard;
    }
    let normalized = (value - low) / range;
    if normalized < 0.33 {
        DifficultyBand::Easy
    } else if normalized < 0.66 {
        DifficultyBand::Medium
    } else {
        DifficultyBand::Hard
    }
}

/// Most frequent categories by row count; ties broken by name.
pub fn top_categories(records: &[ChannelRecord], limit: usize) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, channel_count)| CategoryCount {
            category: category.to_string(),
            channel_count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.channel_count
            .cmp(&a.channel_count)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked.truncate(limit);
    ranked
}

/// Scores each (country, category) pair within the ten most frequent
/// categories as `mean_views / 1e6 + mean_subscribers / 1e5`, best 25 first.
pub fn geographic_performance(records: &[ChannelRecord]) -> Vec<GeoPerformance> {
    let top: Vec<String> = top_categories(records, GEO_CATEGORY_LIMIT)
        .into_iter()
        .map(|c| c.category)
        .collect();

    let mut groups: BTreeMap<(&str, &str, &str), (usize, f64, f64)> = BTreeMap::new();
    for record in records.iter().filter(|r| top.contains(&r.category)) {
        let key = (
            record.country.as_str(),
            record.country_name.as_str(),
            record.category.as_str(),
        );
        let entry = groups.entry(key).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.view_count as f64;
        entry.2 += record.subscriber_count as f64;
    }

    let mut scored: Vec<GeoPerformance> = groups
        .into_iter()
        .map(|((country, country_name, category), (count, views, subscribers))| {
            let mean_views = views / count as f64;
            let mean_subscribers = subscribers / count as f64;
            GeoPerformance {
                country: country.to_string(),
                country_name: country_name.to_string(),
                category: category.to_string(),
                mean_views,
                mean_subscribers,
                channel_count: count,
                performance_score: mean_views / 1e6 + mean_subscribers / 1e5,
            }
        })
        .collect();
    scored.sort_by(|a, b| descending(a.performance_score, b.performance_score));
    scored.truncate(GEO_LIMIT);
    scored
}

/// Collapses duplicate rows per channel name, in name order.
pub fn aggregate_channels(records: &[ChannelRecord]) -> Vec<ChannelAggregate> {
    let mut groups: BTreeMap<&str, (ChannelAggregate, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let score = metrics::cost_effectiveness(record);
        match groups.get_mut(record.channel_name.as_str()) {
            Some((aggregate, scores)) => {
                aggregate.subscriber_count = aggregate.subscriber_count.max(record.subscriber_count);
                aggregate.views_last_30_days =
                    aggregate.views_last_30_days.max(record.views_last_30_days);
                aggregate.video_count = aggregate.video_count.max(record.video_count);
                aggregate.view_count = aggregate.view_count.max(record.view_count);
                scores.push(score);
            }
            None => {
                let aggregate = ChannelAggregate {
                    channel_name: record.channel_name.clone(),
                    country: record.country.clone(),
                    country_name: record.country_name.clone(),
                    category: record.category.clone(),
                    subscriber_count: record.subscriber_count,
                    views_last_30_days: record.views_last_30_days,
                    video_count: record.video_count,
                    view_count: record.view_count,
                    cost_effectiveness: 0.0,
                };
                groups.insert(record.channel_name.as_str(), (aggregate, vec![score]));
            }
        }
    }

    groups
        .into_values()
        .map(|(mut aggregate, scores)| {
            aggregate.cost_effectiveness = mean(&scores);
            aggregate
        })
        .collect()
}

/// Highest mean cost-effectiveness first.
pub fn most_cost_effective(aggregates: &[ChannelAggregate], limit: usize) -> Vec<ChannelAggregate> {
    let mut ranked = aggregates.to_vec();
    ranked.sort_by(|a, b| descending(a.cost_effectiveness, b.cost_effectiveness));
    ranked.truncate(limit);
    ranked
}

/// The channel's four marketer metrics against the mean over `population`.
pub fn compare_to_average(
    channel: &ChannelAggregate,
    population: &[ChannelAggregate],
) -> [MetricVersusAverage; 4] {
    let average = |f: fn(&ChannelAggregate) -> f64| {
        mean(&population.iter().map(f).collect::<Vec<_>>())
    };
    let row = |metric: MetricName, f: fn(&ChannelAggregate) -> f64| MetricVersusAverage {
        metric,
        channel: f(channel),
        average: average(f),
    };
    [
        row(MetricName::SubscriberCount, |c| c.subscriber_count as f64),
        row(MetricName::ViewsLast30Days, |c| c.views_last_30_days as f64),
        row(MetricName::VideoCount, |c| c.video_count as f64),
        row(MetricName::CostEffectiveness, |c| c.cost_effectiveness),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::record;
    use pretty_assertions::assert_eq;

    fn category(name: &str, members: usize, subscribers: u64) -> Vec<ChannelRecord> {
        (0..members)
            .map(|i| {
                let mut r = record(&format!("{name}-{i}"), name, "US", 2.0);
                r.subscriber_count = subscribers;
                r
            })
            .collect()
    }

    #[test]
    fn difficulty_requires_ten_channels() {
        let mut table = category("Nine", 9, 100);
        table.extend(category("Ten", 10, 200));
        let ranked = category_difficulty(&table);
        let names: Vec<&str> = ranked.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Ten"]);
        assert_eq!(ranked[0].channel_count, 10);
        assert_eq!(ranked[0].mean_subscribers, 200.0);
    }

    #[test]
    fn difficulty_keeps_the_hardest_twenty_ascending() {
        let mut table = Vec::new();
        for i in 0..25u64 {
            table.extend(category(&format!("cat{i:02}"), 10, (i + 1) * 1_000));
        }
        let ranked = category_difficulty(&table);
        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked.first().unwrap().category, "cat05");
        assert_eq!(ranked.last().unwrap().category, "cat24");
        assert_eq!(ranked.first().unwrap().band, DifficultyBand::Easy);
        assert_eq!(ranked.last().unwrap().band, DifficultyBand::Hard);
    }

    #[test]
    fn difficulty_band_thirds() {
        assert_eq!(difficulty_band(0.0, 0.0, 100.0), DifficultyBand::Easy);
        assert_eq!(difficulty_band(50.0, 0.0, 100.0), DifficultyBand::Medium);
        assert_eq!(difficulty_band(66.0, 0.0, 100.0), DifficultyBand::Hard);
        assert_eq!(difficulty_band(7.0, 7.0, 7.0), DifficultyBand::Hard);
    }

    #[test]
    fn top_categories_by_count() {
        let mut table = category("B", 2, 1);
        table.extend(category("A", 2, 1));
        table.extend(category("C", 3, 1));
        let top = top_categories(&table, 2);
        assert_eq!(
            top,
            vec![
                CategoryCount {
                    category: "C".to_string(),
                    channel_count: 3
                },
                CategoryCount {
                    category: "A".to_string(),
                    channel_count: 2
                },
            ]
        );
    }

    #[test]
    fn geographic_score_combines_views_and_subscribers() {
        let mut us = record("a", "Gaming", "US", 1.0);
        us.view_count = 2_000_000;
        us.subscriber_count = 100_000;
        let mut india = record("b", "Gaming", "IN", 1.0);
        india.view_count = 0;
        india.subscriber_count = 0;
        let scored = geographic_performance(&[india, us]);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].country_name, "United States");
        assert!((scored[0].performance_score - 3.0).abs() < 1e-12);
        assert_eq!(scored[1].performance_score, 0.0);
    }

    #[test]
    fn geographic_only_uses_top_ten_categories() {
        let mut table = Vec::new();
        for i in 0..11 {
            table.extend(category(&format!("cat{i:02}"), 11 - i, 1_000));
        }
        let scored = geographic_performance(&table);
        assert!(scored.iter().all(|g| g.category != "cat10"));
        assert_eq!(scored.len(), 10);
    }

    #[test]
    fn aggregates_collapse_duplicate_channels() {
        let mut first = record("dup", "Gaming", "US", 1.0);
        first.subscriber_count = 100;
        first.views_last_30_days = 10;
        let mut second = record("dup", "Music", "GB", 1.0);
        second.subscriber_count = 50;
        second.views_last_30_days = 40;
        let expected_ce =
            (metrics::cost_effectiveness(&first) + metrics::cost_effectiveness(&second)) / 2.0;

        let aggregates = aggregate_channels(&[first, second]);
        assert_eq!(aggregates.len(), 1);
        let dup = &aggregates[0];
        assert_eq!(dup.subscriber_count, 100);
        assert_eq!(dup.views_last_30_days, 40);
        assert_eq!(dup.category, "Gaming");
        assert!((dup.cost_effectiveness - expected_ce).abs() < 1e-12);
    }

    #[test]
    fn most_cost_effective_ranks_descending() {
        let mut table = Vec::new();
        for i in 0..20u64 {
            let mut r = record(&format!("ch{i:02}"), "Gaming", "US", 1.0);
            r.views_last_30_days = i * 100;
            table.push(r);
        }
        let top = most_cost_effective(&aggregate_channels(&table), COST_EFFECTIVE_LIMIT);
        assert_eq!(top.len(), 15);
        assert_eq!(top[0].channel_name, "ch19");
        assert_eq!(top[14].channel_name, "ch05");
    }

    #[test]
    fn compares_channel_against_population_mean() {
        let mut a = record("a", "Gaming", "US", 1.0);
        a.subscriber_count = 100;
        let mut b = record("b", "Gaming", "US", 1.0);
        b.subscriber_count = 300;
        let aggregates = aggregate_channels(&[a, b]);
        let rows = compare_to_average(&aggregates[0], &aggregates);
        assert_eq!(rows[0].metric, MetricName::SubscriberCount);
        assert_eq!(rows[0].channel, 100.0);
        assert_eq!(rows[0].average, 200.0);
        assert_eq!(rows[3].metric, MetricName::CostEffectiveness);
    }
}
