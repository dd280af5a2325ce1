use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used wherever a categorical field is missing.
pub const NOT_SPECIFIED: &str = "Not Specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "county")]
    pub country: Option<String>,
    /// Coordinates arrive either as numbers or as numeric strings.
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub long: Option<Value>,
}

/// One startup as delivered by the listing endpoint.
///
/// Fields the listing does not document are kept in `extra` so the JSON dump
/// carries everything the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<IndustryRef>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub region: Option<RegionRef>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub digital_startup_awards_participant: Option<bool>,
    #[serde(default)]
    pub is_member: Option<bool>,
    #[serde(default)]
    pub tech_awards_winner: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StartupRecord {
    pub fn industry_name(&self) -> Option<&str> {
        self.industry.as_ref().and_then(|i| i.name.as_deref())
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region.as_ref().and_then(|r| r.name.as_deref())
    }

    pub fn industry_label(&self) -> &str {
        self.industry_name().unwrap_or(NOT_SPECIFIED)
    }

    pub fn region_label(&self) -> &str {
        self.region_name().unwrap_or(NOT_SPECIFIED)
    }
}

/// One response of the offset/limit listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub count: usize,
    pub results: Vec<StartupRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Everything gathered by one collector run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// `count` from the first successful page; `None` when no page arrived.
    pub reported_count: Option<usize>,
    pub startups: Vec<StartupRecord>,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.startups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.startups.is_empty()
    }
}

/// On-disk shape of `startups_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupsDump {
    pub total_count: usize,
    pub startups: Vec<StartupRecord>,
}

impl From<&Collection> for StartupsDump {
    fn from(collection: &Collection) -> Self {
        Self {
            total_count: collection.len(),
            startups: collection.startups.clone(),
        }
    }
}

impl From<StartupsDump> for Collection {
    fn from(dump: StartupsDump) -> Self {
        Self {
            reported_count: Some(dump.total_count),
            startups: dump.startups,
        }
    }
}

/// One row of `startups_data.csv`. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatStartupRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub image: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub industry_id: Option<i64>,
    pub industry_name: Option<String>,
    pub stage: Option<String>,
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
    pub region_country: Option<String>,
    pub region_lat: Option<String>,
    pub region_long: Option<String>,
    pub is_verified: Option<bool>,
    pub digital_startup_awards_participant: Option<bool>,
    pub is_member: Option<bool>,
    pub tech_awards_winner: Option<bool>,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl From<&StartupRecord> for FlatStartupRow {
    fn from(record: &StartupRecord) -> Self {
        let industry = record.industry.as_ref();
        let region = record.region.as_ref();
        Self {
            id: record.id,
            name: record.name.clone(),
            logo: record.logo.clone(),
            image: record.image.clone(),
            short_description: record.short_description.clone(),
            description: record.description.clone(),
            industry_id: industry.and_then(|i| i.id),
            industry_name: industry.and_then(|i| i.name.clone()),
            stage: record.stage.clone(),
            region_id: region.and_then(|r| r.id),
            region_name: region.and_then(|r| r.name.clone()),
            region_country: region.and_then(|r| r.country.clone()),
            region_lat: region.and_then(|r| r.lat.as_ref()).and_then(scalar_text),
            region_long: region.and_then(|r| r.long.as_ref()).and_then(scalar_text),
            is_verified: record.is_verified,
            digital_startup_awards_participant: record.digital_startup_awards_participant,
            is_member: record.is_member,
            tech_awards_winner: record.tech_awards_winner,
        }
    }
}
