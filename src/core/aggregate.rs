//! Descriptive statistics over a collected set of startups.
//!
//! Everything here is pure and never fails: missing industries, regions or
//! stages fall back to [`NOT_SPECIFIED`] (or are left out of averages) rather
//! than aborting the report.

use crate::domain::model::{StartupRecord, NOT_SPECIFIED};
use crate::domain::taxonomy::{FundingStage, DEFAULT_TECH_INDUSTRIES};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub top_industries: usize,
    pub top_regions: usize,
    pub heatmap_industries: usize,
    pub maturity_min_samples: usize,
    pub maturity_top: usize,
    pub growth_top: usize,
    pub tech_industries: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_industries: 15,
            top_regions: 10,
            heatmap_industries: 10,
            maturity_min_samples: 10,
            maturity_top: 12,
            growth_top: 10,
            tech_industries: DEFAULT_TECH_INDUSTRIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub stage: FundingStage,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crosstab {
    pub rows: Vec<String>,
    pub columns: Vec<FundingStage>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<usize>>,
}

impl Crosstab {
    pub fn max_cell(&self) -> usize {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaturityScore {
    pub industry: String,
    pub average: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupProfile {
    pub count: usize,
    pub percent: f64,
    pub average_maturity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechSplit {
    pub tech: GroupProfile,
    pub non_tech: GroupProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSplit {
    pub industry: String,
    pub early: usize,
    pub growth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EcosystemReport {
    pub total: usize,
    pub top_industries: Vec<CategoryCount>,
    pub stages: Vec<StageCount>,
    pub top_regions: Vec<CategoryCount>,
    pub industry_stage: Crosstab,
    pub status_flags: Vec<Share>,
    pub funnel: Vec<Share>,
    pub maturity: Vec<MaturityScore>,
    pub tech_split: TechSplit,
    pub early_vs_growth: Vec<StageSplit>,
    pub key_metrics: Vec<CategoryCount>,
}

impl EcosystemReport {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
    }
}

/// Frequency table, most frequent first, ties alphabetical.
pub fn rank<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *tally.entry(label).or_default() += 1;
    }
    let mut ranked: Vec<CategoryCount> = tally
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    // BTreeMap order is alphabetical and sort_by is stable.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

fn stage_of(record: &StartupRecord) -> FundingStage {
    FundingStage::from_code(record.stage.as_deref())
}

/// Maturity score with "Not Specified" counted as 0.
fn score_of(record: &StartupRecord) -> u8 {
    stage_of(record).maturity_score().unwrap_or(0)
}

pub fn industry_counts(records: &[StartupRecord]) -> Vec<CategoryCount> {
    rank(records.iter().map(StartupRecord::industry_label))
}

pub fn region_counts(records: &[StartupRecord]) -> Vec<CategoryCount> {
    rank(records.iter().map(StartupRecord::region_label))
}

/// Counts per normalized stage in funnel order; stages nobody is in are left out.
pub fn stage_counts(records: &[StartupRecord]) -> Vec<StageCount> {
    let mut tally: HashMap<FundingStage, usize> = HashMap::new();
    for record in records {
        *tally.entry(stage_of(record)).or_default() += 1;
    }
    FundingStage::ALL
        .iter()
        .filter_map(|stage| {
            tally.get(stage).map(|&count| StageCount {
                stage: *stage,
                count,
            })
        })
        .collect()
}

/// Industry × stage counts for the `top_n` most frequent industries.
pub fn industry_stage_crosstab(records: &[StartupRecord], top_n: usize) -> Crosstab {
    let rows: Vec<String> = industry_counts(records)
        .into_iter()
        .take(top_n)
        .map(|c| c.label)
        .collect();

    let mut tally: HashMap<(&str, FundingStage), usize> = HashMap::new();
    for record in records {
        let industry = record.industry_label();
        if rows.iter().any(|r| r == industry) {
            *tally.entry((industry, stage_of(record))).or_default() += 1;
        }
    }

    let columns: Vec<FundingStage> = FundingStage::ALL
        .iter()
        .copied()
        .filter(|stage| tally.keys().any(|(_, s)| s == stage))
        .collect();

    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| tally.get(&(row.as_str(), *col)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Crosstab {
        rows,
        columns,
        cells,
    }
}

pub fn status_flags(records: &[StartupRecord]) -> Vec<Share> {
    let total = records.len();
    let flags: [(&str, fn(&StartupRecord) -> Option<bool>); 4] = [
        ("Verified Startups", |r| r.is_verified),
        ("Digital Awards Participants", |r| {
            r.digital_startup_awards_participant
        }),
        ("Platform Members", |r| r.is_member),
        ("Tech Awards Winners", |r| r.tech_awards_winner),
    ];

    flags
        .iter()
        .map(|(label, flag)| {
            let count = records
                .iter()
                .filter(|r| flag(r).unwrap_or(false))
                .count();
            Share {
                label: label.to_string(),
                count,
                percent: percent(count, total),
            }
        })
        .collect()
}

/// The seven real stages in order, each with its share of all startups.
pub fn funnel(records: &[StartupRecord]) -> Vec<Share> {
    let counts = stage_counts(records);
    FundingStage::ORDERED
        .iter()
        .map(|stage| {
            let count = counts
                .iter()
                .find(|c| c.stage == *stage)
                .map(|c| c.count)
                .unwrap_or(0);
            Share {
                label: stage.label().to_string(),
                count,
                percent: percent(count, records.len()),
            }
        })
        .collect()
}

/// Average maturity score per industry, highest first.
///
/// Startups with a known industry and a stage code are sampled; unmapped codes
/// score 0. Industries with fewer than `min_samples` samples are left out.
pub fn industry_maturity(records: &[StartupRecord], min_samples: usize) -> Vec<MaturityScore> {
    let mut samples: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
    for record in records {
        if let (Some(industry), Some(_)) = (record.industry_name(), record.stage.as_deref()) {
            samples.entry(industry).or_default().push(score_of(record));
        }
    }

    let mut scores: Vec<MaturityScore> = samples
        .into_iter()
        .filter(|(_, scores)| scores.len() >= min_samples)
        .map(|(industry, scores)| MaturityScore {
            industry: industry.to_string(),
            average: mean(&scores),
            samples: scores.len(),
        })
        .collect();
    scores.sort_by(|a, b| b.average.total_cmp(&a.average));
    scores
}

pub fn tech_split(records: &[StartupRecord], tech_industries: &[String]) -> TechSplit {
    let mut tech = (0usize, Vec::new());
    let mut non_tech = (0usize, Vec::new());

    for record in records {
        let Some(industry) = record.industry_name() else {
            continue;
        };
        let group = if tech_industries.iter().any(|t| t == industry) {
            &mut tech
        } else {
            &mut non_tech
        };
        group.0 += 1;
        group.1.push(score_of(record));
    }

    let classified = tech.0 + non_tech.0;
    let profile = |(count, scores): (usize, Vec<u8>)| GroupProfile {
        count,
        percent: percent(count, classified),
        average_maturity: mean(&scores),
    };

    TechSplit {
        tech: profile(tech),
        non_tech: profile(non_tech),
    }
}

/// Early vs growth stage counts per industry, most growth-stage startups first.
pub fn early_vs_growth(records: &[StartupRecord], top_n: usize) -> Vec<StageSplit> {
    let mut splits: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let Some(industry) = record.industry_name() else {
            continue;
        };
        let stage = stage_of(record);
        let entry = splits.entry(industry).or_default();
        if stage.is_early() {
            entry.0 += 1;
        } else if stage.is_growth() {
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<StageSplit> = splits
        .into_iter()
        .map(|(industry, (early, growth))| StageSplit {
            industry: industry.to_string(),
            early,
            growth,
        })
        .collect();
    ranked.sort_by(|a, b| b.growth.cmp(&a.growth));
    ranked.truncate(top_n);
    ranked
}

pub fn key_metrics(records: &[StartupRecord], tech: &TechSplit) -> Vec<CategoryCount> {
    let industries: BTreeSet<&str> = records.iter().filter_map(|r| r.industry_name()).collect();
    let regions: BTreeSet<&str> = records.iter().filter_map(|r| r.region_name()).collect();
    let growth = records.iter().filter(|r| stage_of(r).is_growth()).count();
    let members = records
        .iter()
        .filter(|r| r.is_member.unwrap_or(false))
        .count();

    [
        ("Total Startups", records.len()),
        ("Active Industries", industries.len()),
        ("Covered Regions", regions.len()),
        ("Growth Stage Startups", growth),
        ("Tech Startups", tech.tech.count),
        ("Platform Members", members),
    ]
    .into_iter()
    .map(|(label, count)| CategoryCount {
        label: label.to_string(),
        count,
    })
    .collect()
}

pub fn analyze(records: &[StartupRecord], settings: &ReportSettings) -> EcosystemReport {
    let mut top_industries = industry_counts(records);
    top_industries.truncate(settings.top_industries);

    let mut top_regions = region_counts(records);
    top_regions.truncate(settings.top_regions);

    let mut maturity = industry_maturity(records, settings.maturity_min_samples);
    maturity.truncate(settings.maturity_top);

    let tech_split = tech_split(records, &settings.tech_industries);
    let key_metrics = key_metrics(records, &tech_split);

    EcosystemReport {
        total: records.len(),
        top_industries,
        stages: stage_counts(records),
        top_regions,
        industry_stage: industry_stage_crosstab(records, settings.heatmap_industries),
        status_flags: status_flags(records),
        funnel: funnel(records),
        maturity,
        tech_split,
        early_vs_growth: early_vs_growth(records, settings.growth_top),
        key_metrics,
    }
}

/// Logs the short breakdown printed after a collector run.
pub fn log_collection_summary(records: &[StartupRecord]) {
    tracing::info!("Total startups: {}", records.len());

    let mut stages = stage_counts(records);
    stages.sort_by(|a, b| b.count.cmp(&a.count));
    tracing::info!("Startups by stage:");
    for entry in stages {
        tracing::info!("  {}: {}", entry.stage, entry.count);
    }

    tracing::info!("Top 10 industries:");
    for entry in industry_counts(records)
        .into_iter()
        .filter(|c| c.label != NOT_SPECIFIED)
        .take(10)
    {
        tracing::info!("  {}: {}", entry.label, entry.count);
    }
}
