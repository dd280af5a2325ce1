//! Fixed lookup tables of the listing: funding stage codes and the industries
//! counted as "tech".

use crate::domain::model::NOT_SPECIFIED;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FundingStage {
    Idea,
    PreSeed,
    Seed,
    EarlyStageA,
    SeriesA,
    EarlyStageB,
    Expansion,
    NotSpecified,
}

/// Stage codes as the endpoint sends them (misspellings included) plus their
/// corrected forms.
const STAGE_CODES: &[(&str, FundingStage)] = &[
    ("idea", FundingStage::Idea),
    ("pre_seed", FundingStage::PreSeed),
    ("seed_", FundingStage::Seed),
    ("seed", FundingStage::Seed),
    ("early_a", FundingStage::EarlyStageA),
    ("serias_a", FundingStage::SeriesA),
    ("series_a", FundingStage::SeriesA),
    ("early_b", FundingStage::EarlyStageB),
    ("expension", FundingStage::Expansion),
    ("expansion", FundingStage::Expansion),
];

impl FundingStage {
    /// Stages in funnel order, without the catch-all.
    pub const ORDERED: [FundingStage; 7] = [
        FundingStage::Idea,
        FundingStage::PreSeed,
        FundingStage::Seed,
        FundingStage::EarlyStageA,
        FundingStage::SeriesA,
        FundingStage::EarlyStageB,
        FundingStage::Expansion,
    ];

    /// Every label in report column order, catch-all last.
    pub const ALL: [FundingStage; 8] = [
        FundingStage::Idea,
        FundingStage::PreSeed,
        FundingStage::Seed,
        FundingStage::EarlyStageA,
        FundingStage::SeriesA,
        FundingStage::EarlyStageB,
        FundingStage::Expansion,
        FundingStage::NotSpecified,
    ];

    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| {
            STAGE_CODES
                .iter()
                .find(|(known, _)| *known == c)
                .map(|(_, stage)| *stage)
        })
        .unwrap_or(FundingStage::NotSpecified)
    }

    pub fn label(self) -> &'static str {
        match self {
            FundingStage::Idea => "Idea",
            FundingStage::PreSeed => "Pre-Seed",
            FundingStage::Seed => "Seed",
            FundingStage::EarlyStageA => "Early Stage A",
            FundingStage::SeriesA => "Series A",
            FundingStage::EarlyStageB => "Early Stage B",
            FundingStage::Expansion => "Expansion",
            FundingStage::NotSpecified => NOT_SPECIFIED,
        }
    }

    /// Ordinal 1 (Idea) to 7 (Expansion); `None` for the catch-all.
    pub fn maturity_score(self) -> Option<u8> {
        match self {
            FundingStage::Idea => Some(1),
            FundingStage::PreSeed => Some(2),
            FundingStage::Seed => Some(3),
            FundingStage::EarlyStageA => Some(4),
            FundingStage::SeriesA => Some(5),
            FundingStage::EarlyStageB => Some(6),
            FundingStage::Expansion => Some(7),
            FundingStage::NotSpecified => None,
        }
    }

    pub fn is_early(self) -> bool {
        matches!(
            self,
            FundingStage::Idea | FundingStage::PreSeed | FundingStage::Seed
        )
    }

    pub fn is_growth(self) -> bool {
        matches!(
            self,
            FundingStage::EarlyStageA
                | FundingStage::SeriesA
                | FundingStage::EarlyStageB
                | FundingStage::Expansion
        )
    }
}

impl fmt::Display for FundingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_TECH_INDUSTRIES: &[&str] = &[
    "SaaS",
    "AI & ML",
    "EdTech",
    "FinTech",
    "HealthTech & MedTech",
    "E-commerce & Retail Tech",
    "HRTech",
    "Cybersecurity",
    "Blockchain & Cryptocurrency",
    "Cloud Computing & Infrastructure",
    "Data Analytics & Big Data",
    "IoT (Internet of Things)",
    "DevOps & Development Tools",
    "Automation & Robotics",
];
