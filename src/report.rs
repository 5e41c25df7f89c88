//! Markdown rendering of the engine's payloads. All wording lives here.

use std::fmt::Write;
use std::path::Path;

use num_format::{Locale, ToFormattedString};

use crate::error::LoadError;
use crate::ingest::{LoadReport, REQUIRED_COLUMNS};
use crate::models::{DifficultyBand, MetricName};
use crate::recommend::{Finding, FindingKind, Severity};
use crate::views::{ExistingCreatorsView, MarketersView, NewCreatorsView, ViewState};

const NO_MATCHES: &str = "No channels match your current filters. Please adjust your selection.";
const LISTED_REJECTIONS: usize = 5;

/// Integer rendering with thousands separators.
pub fn grouped(value: f64) -> String {
    (value.round() as i64).to_formatted_string(&Locale::en)
}

fn millions(value: f64) -> String {
    format!("{:.1}M", value / 1e6)
}

pub fn load_summary(report: &LoadReport, age_bounds: Option<(f64, f64)>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Channel Table");
    let _ = writeln!(
        output,
        "Data loaded from {}: {} records.",
        report.source,
        grouped(report.loaded as f64)
    );
    if let Some((low, high)) = age_bounds {
        let _ = writeln!(output, "Channel age range: {low:.1} to {high:.1} years.");
    }

    if report.unmapped_total > 0 {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Note: {} country code(s) not in mapping: {}",
            report.unmapped_total,
            report.unmapped_countries.join(", ")
        );
    }

    if !report.rejected.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Rejected Rows ({})", report.rejected.len());
        for err in report.rejected.iter().take(LISTED_REJECTIONS) {
            let _ = writeln!(output, "- {err}");
        }
        if report.rejected.len() > LISTED_REJECTIONS {
            let _ = writeln!(
                output,
                "- ... and {} more",
                report.rejected.len() - LISTED_REJECTIONS
            );
        }
    }
    output
}

pub fn no_data(path: &Path) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# No Data Available");
    let _ = writeln!(
        output,
        "The default dataset {} was not found. Supply a CSV file with --data.",
        path.display()
    );
    expected_columns(&mut output);
    output
}

/// Shown instead of a view when a supplied file could not be ingested.
pub fn load_failed(path: &Path, err: &LoadError) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# No Data Available");
    let _ = writeln!(output, "Could not load {}: {err}.", path.display());
    expected_columns(&mut output);
    output
}

fn expected_columns(output: &mut String) {
    let _ = writeln!(output);
    let _ = writeln!(output, "Expected columns:");
    for column in REQUIRED_COLUMNS {
        let _ = writeln!(output, "- {column}");
    }
    let _ = writeln!(output, "- video_count_log1p (optional)");
}

/// Text lines for one finding: a headline followed by indented details.
pub fn finding_lines(finding: &Finding) -> Vec<String> {
    let mut lines = Vec::new();
    let delta = finding.delta;
    match (&finding.kind, delta) {
        (FindingKind::OverallPositive, _) => lines.push(
            "OVERALL: Your channel is performing well. Keep refining based on these insights."
                .to_string(),
        ),
        (FindingKind::FocusAreas { count }, _) => lines.push(format!(
            "FOCUS AREAS: {count} key improvement(s) identified. Prioritize these first."
        )),
        (FindingKind::AudienceEngagement, Some(d)) if finding.severity == Severity::Critical => {
            lines.push(format!(
                "CRITICAL: Improve Audience Engagement (You're {:.1}% below peers)",
                d.gap_pct()
            ));
            lines.push(format!(
                "   • Your audience interest rate: **{:.2}%** vs peer median: **{:.2}%**",
                d.value, d.reference
            ));
            lines.push(format!(
                "   • Only **{:.1}%** of your subscribers watched your recent videos",
                d.value
            ));
        }
        (FindingKind::AudienceEngagement, Some(d)) => {
            lines.push(format!(
                "EXCELLENT: Strong Audience Engagement ({:+.1}% vs peers)",
                d.delta_pct
            ));
            lines.push(format!(
                "   • Your audience interest rate: **{:.2}%**",
                d.value
            ));
        }
        (FindingKind::ClickThrough { projected_monthly_gain }, Some(d)) => {
            lines.push(format!(
                "IMPORTANT: Optimize Click-Through Rate (You're {:.1}% below peers)",
                d.gap_pct()
            ));
            lines.push(format!(
                "   • Your views per upload: **{}** vs peer median: **{}**",
                grouped(d.value),
                grouped(d.reference)
            ));
            lines.push(format!(
                "   • Potential gain: **{}** extra views/month",
                grouped(*projected_monthly_gain)
            ));
        }
        (FindingKind::Growth, Some(d)) => lines.push(format!(
            "OPPORTUNITY: Accelerate Channel Growth (You're {:.1}% below peers)",
            d.gap_pct()
        )),
        (FindingKind::UploadFrequency, Some(d)) => {
            lines.push("CONSIDER: Increase Upload Frequency".to_string());
            lines.push(format!(
                "   • {} uploads in the last 30 days vs a peer median of {:.1}",
                d.value, d.reference
            ));
        }
        (FindingKind::CategoryContext { category, peer_count }, _) => {
            lines.push(format!("Category Context: {category}"));
            lines.push(format!(
                "   • Comparing against **{peer_count}** similar channels in your category"
            ));
        }
        (kind, None) => lines.push(format!("{}: {:?}", finding.severity.label(), kind)),
    }
    lines
}

fn metric_value(metric: MetricName, value: f64) -> String {
    match metric {
        MetricName::GrowthBoostScore => format!("{value:.3}"),
        MetricName::AudienceInterestRate => format!("{value:.2}%"),
        MetricName::CostEffectiveness => format!("{value:.6}"),
        _ => grouped(value),
    }
}

pub fn existing_creators(state: &ViewState<ExistingCreatorsView>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Existing Content Creators");
    let view = match state {
        ViewState::NoMatches => {
            let _ = writeln!(output, "{NO_MATCHES}");
            return output;
        }
        ViewState::Ready(view) => view,
    };

    let overview = &view.overview;
    let _ = writeln!(
        output,
        "{} categories, {} countries, average growth score {:.3}, {} active channels.",
        overview.categories,
        overview.countries,
        overview.mean_growth_boost_score,
        grouped(overview.active_channels as f64)
    );

    let channel = &view.channel;
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", channel.channel_name);
    let _ = writeln!(
        output,
        "- Subscribers: {}",
        grouped(channel.subscriber_count as f64)
    );
    let _ = writeln!(
        output,
        "- Views (Last 30 Days): {}",
        grouped(channel.views_last_30_days as f64)
    );
    let _ = writeln!(
        output,
        "- Growth Boost Score: {:.3}",
        view.metrics.growth_boost_score
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Peer Comparison (percentile)");
    let _ = writeln!(output, "| Metric | Your Channel | Peer Average |");
    let _ = writeln!(output, "|---|---|---|");
    for axis in &view.radar {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} |",
            axis.metric.label(),
            axis.channel,
            axis.peer
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for finding in &view.findings {
        for line in finding_lines(finding) {
            let _ = writeln!(output, "{line}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Posting Frequency Impact");
    let _ = writeln!(output, "| Uploads / 30 days | Typical Views | Channels |");
    let _ = writeln!(output, "|---|---|---|");
    for bucket in &view.buckets {
        let marker = if bucket.label == view.selected_bucket {
            " (you)"
        } else {
            ""
        };
        let _ = writeln!(
            output,
            "| {}{} | {} | {} |",
            bucket.label,
            marker,
            grouped(bucket.typical_views),
            bucket.channel_count
        );
    }
    let _ = writeln!(
        output,
        "Your channel: {} views in the {} bucket.",
        grouped(view.selected_views as f64),
        view.selected_bucket
    );
    output
}

pub fn new_creators(state: &ViewState<NewCreatorsView>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# New Content Creators");
    let view = match state {
        ViewState::NoMatches => {
            let _ = writeln!(output, "{NO_MATCHES}");
            return output;
        }
        ViewState::Ready(view) => view,
    };

    let overview = &view.overview;
    let _ = writeln!(
        output,
        "{} categories, {} countries, average subscribers {}, average videos {:.0}.",
        overview.categories,
        overview.countries,
        millions(overview.mean_subscribers),
        overview.mean_video_count
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Entry Difficulty");
    if view.difficulty.is_empty() {
        let _ = writeln!(output, "No category has at least 10 channels in this selection.");
    } else {
        let _ = writeln!(output, "| Category | Avg Subscribers | Avg Views | Channels | Difficulty |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for row in &view.difficulty {
            let band = match row.band {
                DifficultyBand::Easy => "easy",
                DifficultyBand::Medium => "medium",
                DifficultyBand::Hard => "hard",
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                row.category,
                grouped(row.mean_subscribers),
                grouped(row.mean_views),
                row.channel_count,
                band
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Geographic Success Patterns");
    let _ = writeln!(output, "| Country | Category | Score | Channels |");
    let _ = writeln!(output, "|---|---|---|---|");
    for row in &view.geography {
        let _ = writeln!(
            output,
            "| {} | {} | {:.2} | {} |",
            row.country_name, row.category, row.performance_score, row.channel_count
        );
    }
    output
}

pub fn marketers(state: &ViewState<MarketersView>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Marketers & Advertisers");
    let view = match state {
        ViewState::NoMatches => {
            let _ = writeln!(output, "{NO_MATCHES}");
            return output;
        }
        ViewState::Ready(view) => view,
    };

    let overview = &view.overview;
    let _ = writeln!(
        output,
        "{} channels, {} countries, {} categories, average subscribers {}.",
        grouped(overview.channels as f64),
        overview.countries,
        overview.categories,
        millions(overview.mean_subscribers)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top {} Channels by Cost-Effectiveness", view.top.len());
    let _ = writeln!(
        output,
        "| Channel | Country | Category | Subscribers | Views (30d) | Videos | Total Views | Score |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
    for row in &view.top {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} | {:.6} |",
            row.channel_name,
            row.country_name,
            row.category,
            grouped(row.subscriber_count as f64),
            grouped(row.views_last_30_days as f64),
            grouped(row.video_count as f64),
            grouped(row.view_count as f64),
            row.cost_effectiveness
        );
    }

    if let Some(comparison) = &view.comparison {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", comparison.channel.channel_name);
        let _ = writeln!(
            output,
            "Country: {}. Category: {}. Compared with the average of {} ({} channels).",
            comparison.channel.country_name,
            comparison.channel.category,
            comparison.scope,
            comparison.compared_with
        );
        let _ = writeln!(output, "| Metric | Channel | Average |");
        let _ = writeln!(output, "|---|---|---|");
        for row in &comparison.metrics {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                row.metric.label(),
                metric_value(row.metric, row.channel),
                metric_value(row.metric, row.average)
            );
        }
    }
    output
}
