use crate::domain::model::{Collection, FlatStartupRow, StartupsDump};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

/// Serialized forms of one collection, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistPayload {
    /// `None` when the collection is empty; an empty CSV is never written.
    pub csv: Option<Vec<u8>>,
    pub json: Vec<u8>,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub csv_path: Option<String>,
    pub json_path: String,
    pub records: usize,
}

/// Flattened CSV: header row plus one row per record, in collection order.
pub fn to_csv(collection: &Collection) -> Result<Option<Vec<u8>>> {
    if collection.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in &collection.startups {
        writer.serialize(FlatStartupRow::from(record))?;
    }
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV buffer: {}", e),
    })?;
    Ok(Some(bytes))
}

/// Pretty-printed `{total_count, startups}` document.
pub fn to_json(collection: &Collection) -> Result<Vec<u8>> {
    let dump = StartupsDump::from(collection);
    Ok(serde_json::to_vec_pretty(&dump)?)
}

pub fn from_json(bytes: &[u8]) -> Result<Collection> {
    let dump: StartupsDump = serde_json::from_slice(bytes)?;
    if dump.total_count != dump.startups.len() {
        tracing::warn!(
            "Data file declares {} startups but holds {}",
            dump.total_count,
            dump.startups.len()
        );
    }
    Ok(Collection::from(dump))
}

pub fn render(collection: &Collection) -> Result<PersistPayload> {
    Ok(PersistPayload {
        csv: to_csv(collection)?,
        json: to_json(collection)?,
        records: collection.len(),
    })
}

pub async fn write<S: Storage>(
    storage: &S,
    payload: &PersistPayload,
    csv_path: &str,
    json_path: &str,
) -> Result<PersistReport> {
    let csv_path = match &payload.csv {
        Some(bytes) => {
            storage.write_file(csv_path, bytes).await?;
            tracing::info!("Data saved to {}", csv_path);
            Some(csv_path.to_string())
        }
        None => {
            tracing::warn!("No data to save; {} not written", csv_path);
            None
        }
    };

    storage.write_file(json_path, &payload.json).await?;
    tracing::info!("Data saved to {}", json_path);

    Ok(PersistReport {
        csv_path,
        json_path: json_path.to_string(),
        records: payload.records,
    })
}

/// Flattens `collection` to CSV and dumps it to JSON through `storage`.
pub async fn persist<S: Storage>(
    storage: &S,
    collection: &Collection,
    csv_path: &str,
    json_path: &str,
) -> Result<PersistReport> {
    let payload = render(collection)?;
    write(storage, &payload, csv_path, json_path).await
}
