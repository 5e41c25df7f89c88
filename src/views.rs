//! Per-audience payloads handed to the presentation layer.
//!
//! Each call takes the loaded table and the tab's filter selections and
//! recomputes everything from scratch. Nothing is cached between calls.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::error::EngineError;
use crate::filter;
use crate::metrics::{self, mean};
use crate::models::{
    BucketAggregate, CategoryDifficulty, ChannelAggregate, ChannelRecord, DerivedMetrics,
    FilterCriteria, GeoPerformance, MetricVersusAverage, RadarAxis,
};
use crate::ranking;
use crate::recommend::{self, Comparison, Finding, PeerAggregate};

const SCOPE_PREVIEW: usize = 3;

/// `NoMatches` is the terminal state when the filters exclude every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum ViewState<T> {
    NoMatches,
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ViewState::Ready(view) => Some(view),
            ViewState::NoMatches => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorOverview {
    pub categories: usize,
    pub countries: usize,
    pub mean_growth_boost_score: f64,
    pub active_channels: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExistingCreatorsView {
    pub overview: CreatorOverview,
    pub channel: ChannelRecord,
    pub metrics: DerivedMetrics,
    pub radar: [RadarAxis; 3],
    pub peers: PeerAggregate,
    pub findings: Vec<Finding>,
    pub buckets: Vec<BucketAggregate>,
    pub selected_bucket: &'static str,
    pub selected_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewcomerOverview {
    pub categories: usize,
    pub countries: usize,
    pub mean_subscribers: f64,
    pub mean_video_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCreatorsView {
    pub overview: NewcomerOverview,
    pub difficulty: Vec<CategoryDifficulty>,
    pub geography: Vec<GeoPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketerOverview {
    pub channels: usize,
    pub countries: usize,
    pub categories: usize,
    pub mean_subscribers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelComparison {
    pub channel: ChannelAggregate,
    pub scope: String,
    pub compared_with: usize,
    pub metrics: [MetricVersusAverage; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketersView {
    pub overview: MarketerOverview,
    /// Ranked best first; doubles as the detail table.
    pub top: Vec<ChannelAggregate>,
    pub comparison: Option<ChannelComparison>,
    /// The filtered rows, for CSV export.
    #[serde(skip)]
    pub filtered: Vec<ChannelRecord>,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.collect::<HashSet<_>>().len()
}

/// Existing Creators tab. With no `channel`, the first filtered row is used.
pub fn existing_creators(
    records: &[ChannelRecord],
    criteria: &FilterCriteria,
    channel: Option<&str>,
) -> Result<ViewState<ExistingCreatorsView>, EngineError> {
    let filtered = filter::apply(records, criteria);
    let Some(first) = filtered.first() else {
        return Ok(ViewState::NoMatches);
    };

    let entity = match channel {
        Some(name) => filtered
            .iter()
            .find(|r| r.channel_name == name)
            .ok_or_else(|| EngineError::UnknownChannel(name.to_string()))?,
        None => first,
    };

    let growth: Vec<f64> = filtered.iter().map(metrics::growth_boost_score).collect();
    let overview = CreatorOverview {
        categories: distinct(filtered.iter().map(|r| r.category.as_str())),
        countries: distinct(filtered.iter().map(|r| r.country.as_str())),
        mean_growth_boost_score: mean(&growth),
        active_channels: filtered.iter().filter(|r| r.videos_last_30_days > 0).count(),
    };

    let peers = metrics::peer_group(&filtered, entity);
    let comparison = Comparison::new(entity, &peers);
    let findings = recommend::evaluate(&comparison);

    Ok(ViewState::Ready(ExistingCreatorsView {
        overview,
        metrics: comparison.entity.metrics,
        radar: metrics::radar(entity, &peers),
        peers: comparison.peers,
        findings,
        buckets: metrics::posting_buckets(&filtered),
        selected_bucket: metrics::bucket_label(entity.videos_last_30_days),
        selected_views: entity.views_last_30_days,
        channel: entity.clone(),
    }))
}

/// New Creators tab.
pub fn new_creators(records: &[ChannelRecord], criteria: &FilterCriteria) -> ViewState<NewCreatorsView> {
    let filtered = filter::apply(records, criteria);
    if filtered.is_empty() {
        return ViewState::NoMatches;
    }

    let subscribers: Vec<f64> = filtered.iter().map(|r| r.subscriber_count as f64).collect();
    let videos: Vec<f64> = filtered.iter().map(|r| r.video_count as f64).collect();
    ViewState::Ready(NewCreatorsView {
        overview: NewcomerOverview {
            categories: distinct(filtered.iter().map(|r| r.category.as_str())),
            countries: distinct(filtered.iter().map(|r| r.country.as_str())),
            mean_subscribers: mean(&subscribers),
            mean_video_count: mean(&videos),
        },
        difficulty: ranking::category_difficulty(&filtered),
        geography: ranking::geographic_performance(&filtered),
    })
}

/// Marketers tab. The comparison defaults to the top-ranked channel.
pub fn marketers(
    records: &[ChannelRecord],
    criteria: &FilterCriteria,
    channel: Option<&str>,
) -> Result<ViewState<MarketersView>, EngineError> {
    let filtered = filter::apply(records, criteria);
    if filtered.is_empty() {
        return Ok(ViewState::NoMatches);
    }

    let aggregates = ranking::aggregate_channels(&filtered);
    let top = ranking::most_cost_effective(&aggregates, ranking::COST_EFFECTIVE_LIMIT);

    let selected = match channel {
        Some(name) => Some(
            aggregates
                .iter()
                .find(|a| a.channel_name == name)
                .ok_or_else(|| EngineError::UnknownChannel(name.to_string()))?,
        ),
        None => top.first(),
    };
    let comparison = selected.map(|aggregate| ChannelComparison {
        channel: aggregate.clone(),
        scope: scope_label(criteria),
        compared_with: aggregates.len(),
        metrics: ranking::compare_to_average(aggregate, &aggregates),
    });

    let subscribers: Vec<f64> = aggregates.iter().map(|a| a.subscriber_count as f64).collect();
    let overview = MarketerOverview {
        channels: aggregates.len(),
        countries: distinct(filtered.iter().map(|r| r.country.as_str())),
        categories: distinct(filtered.iter().map(|r| r.category.as_str())),
        mean_subscribers: mean(&subscribers),
    };

    Ok(ViewState::Ready(MarketersView {
        overview,
        top,
        comparison,
        filtered,
    }))
}

/// Human-readable description of what a marketer comparison is averaged over.
pub fn scope_label(criteria: &FilterCriteria) -> String {
    fn preview(values: &BTreeSet<String>) -> String {
        let shown: Vec<&str> = values.iter().take(SCOPE_PREVIEW).map(String::as_str).collect();
        let ellipsis = if values.len() > SCOPE_PREVIEW { "..." } else { "" };
        format!("{}{}", shown.join(", "), ellipsis)
    }

    match (criteria.categories.is_empty(), criteria.country_names.is_empty()) {
        (true, true) => "All Channels in Dataset".to_string(),
        (false, true) => preview(&criteria.categories),
        (true, false) => preview(&criteria.country_names),
        (false, false) => format!(
            "{} in {}",
            preview(&criteria.categories),
            preview(&criteria.country_names)
        ),
    }
}
