//! Rule-based findings for one channel against its peer group.
//!
//! Rules are pure predicates over a [`Comparison`] evaluated in a fixed order.
//! Findings carry numbers only; wording belongs to the report layer.

use serde::Serialize;

use crate::metrics::{self, median, percent_difference};
use crate::models::{ChannelRecord, DerivedMetrics, MetricName};

/// Rate above `median * POSITIVE_MULTIPLIER` earns a positive finding.
pub const POSITIVE_MULTIPLIER: f64 = 1.2;
/// Upload counts below this (and below the peer median) suggest posting more.
pub const LOW_UPLOAD_THRESHOLD: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Important,
    Opportunity,
    Consider,
    Positive,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Important => "IMPORTANT",
            Severity::Opportunity => "OPPORTUNITY",
            Severity::Consider => "CONSIDER",
            Severity::Positive => "POSITIVE",
            Severity::Info => "INFO",
        }
    }

    fn needs_focus(self) -> bool {
        matches!(self, Severity::Critical | Severity::Important)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    OverallPositive,
    FocusAreas { count: usize },
    AudienceEngagement,
    ClickThrough { projected_monthly_gain: f64 },
    Growth,
    UploadFrequency,
    CategoryContext { category: String, peer_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: MetricName,
    pub value: f64,
    /// Peer median.
    pub reference: f64,
    /// Signed; 0 when the reference is 0.
    pub delta_pct: f64,
}

impl MetricDelta {
    fn new(metric: MetricName, value: f64, reference: f64) -> Self {
        Self {
            metric,
            value,
            reference,
            delta_pct: percent_difference(value, reference),
        }
    }

    pub fn gap_pct(&self) -> f64 {
        self.delta_pct.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: FindingKind,
    pub delta: Option<MetricDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub channel_name: String,
    pub category: String,
    pub metrics: DerivedMetrics,
    pub videos_last_30_days: u64,
}

/// Peer medians. All zero for an empty peer group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerAggregate {
    pub size: usize,
    pub growth_boost_score: f64,
    pub audience_interest_rate: f64,
    pub views_per_upload: f64,
    pub videos_last_30_days: f64,
}

impl PeerAggregate {
    pub fn from_peers(peers: &[&ChannelRecord]) -> Self {
        let median_of = |f: fn(&ChannelRecord) -> f64| median(&metrics::series(peers, f));
        Self {
            size: peers.len(),
            growth_boost_score: median_of(metrics::growth_boost_score),
            audience_interest_rate: median_of(metrics::audience_interest_rate),
            views_per_upload: median_of(metrics::views_per_upload),
            videos_last_30_days: median_of(|r| r.videos_last_30_days as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub entity: EntitySnapshot,
    pub peers: PeerAggregate,
}

impl Comparison {
    pub fn new(entity: &ChannelRecord, peers: &[&ChannelRecord]) -> Self {
        Self {
            entity: EntitySnapshot {
                channel_name: entity.channel_name.clone(),
                category: entity.category.clone(),
                metrics: metrics::derive(entity),
                videos_last_30_days: entity.videos_last_30_days,
            },
            peers: PeerAggregate::from_peers(peers),
        }
    }
}

type Rule = fn(&Comparison) -> Option<Finding>;

const RULES: [Rule; 5] = [
    audience_engagement,
    click_through,
    growth,
    upload_frequency,
    category_context,
];

fn audience_engagement(c: &Comparison) -> Option<Finding> {
    let value = c.entity.metrics.audience_interest_rate;
    let reference = c.peers.audience_interest_rate;
    let severity = if value < reference {
        Severity::Critical
    } else if value > reference * POSITIVE_MULTIPLIER {
        Severity::Positive
    } else {
        return None;
    };
    Some(Finding {
        severity,
        kind: FindingKind::AudienceEngagement,
        delta: Some(MetricDelta::new(MetricName::AudienceInterestRate, value, reference)),
    })
}

fn click_through(c: &Comparison) -> Option<Finding> {
    let value = c.entity.metrics.views_per_upload;
    let reference = c.peers.views_per_upload;
    (value < reference).then(|| Finding {
        severity: Severity::Important,
        kind: FindingKind::ClickThrough {
            projected_monthly_gain: (reference - value) * c.entity.videos_last_30_days as f64,
        },
        delta: Some(MetricDelta::new(MetricName::ViewsPerUpload, value, reference)),
    })
}

fn growth(c: &Comparison) -> Option<Finding> {
    let value = c.entity.metrics.growth_boost_score;
    let reference = c.peers.growth_boost_score;
    (value < reference).then(|| Finding {
        severity: Severity::Opportunity,
        kind: FindingKind::Growth,
        delta: Some(MetricDelta::new(MetricName::GrowthBoostScore, value, reference)),
    })
}

fn upload_frequency(c: &Comparison) -> Option<Finding> {
    let uploads = c.entity.videos_last_30_days;
    let reference = c.peers.videos_last_30_days;
    ((uploads as f64) < reference && uploads < LOW_UPLOAD_THRESHOLD).then(|| Finding {
        severity: Severity::Consider,
        kind: FindingKind::UploadFrequency,
        delta: Some(MetricDelta::new(
            MetricName::VideosLast30Days,
            uploads as f64,
            reference,
        )),
    })
}

fn category_context(c: &Comparison) -> Option<Finding> {
    Some(Finding {
        severity: Severity::Info,
        kind: FindingKind::CategoryContext {
            category: c.entity.category.clone(),
            peer_count: c.peers.size,
        },
        delta: None,
    })
}

/// Evaluates every rule in order and prepends the summary finding, so the
/// result always starts with either an overall-positive or a focus-areas entry.
pub fn evaluate(comparison: &Comparison) -> Vec<Finding> {
    let mut findings: Vec<Finding> = RULES.iter().filter_map(|rule| rule(comparison)).collect();

    let focus = findings.iter().filter(|f| f.severity.needs_focus()).count();
    let kind = if focus == 0 {
        FindingKind::OverallPositive
    } else {
        FindingKind::FocusAreas { count: focus }
    };
    findings.insert(
        0,
        Finding {
            severity: Severity::Info,
            kind,
            delta: None,
        },
    );
    findings
}

pub fn recommend(entity: &ChannelRecord, peers: &[&ChannelRecord]) -> Vec<Finding> {
    evaluate(&Comparison::new(entity, peers))
}
