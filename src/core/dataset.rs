use crate::core::encoding::CategoryCodebook;
use crate::domain::model::{HistoricalRecord, Location, SoilType};
use crate::domain::ports::Storage;
use crate::utils::error::{AgriError, Result};
use std::io::Read;

/// 記憶體中的歷史資料集，載入後不再變動
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<HistoricalRecord>,
    codebook: CategoryCodebook,
}

impl Dataset {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        let codebook = CategoryCodebook::build(&records);
        Self { records, codebook }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<HistoricalRecord>() {
            records.push(row?);
        }

        tracing::debug!("Parsed {} historical records", records.len());
        Ok(Self::new(records))
    }

    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }

    /// 透過 Storage 讀取資料集
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        tracing::debug!("Loading dataset from: {}", path);
        let bytes = storage.read_file(path).await?;
        let dataset = Self::from_csv_bytes(&bytes)?;
        if dataset.is_empty() {
            return Err(AgriError::ConfigError {
                message: format!("Dataset '{}' contains no rows", path),
            });
        }
        tracing::info!(
            "📂 Loaded {} records (codebook {})",
            dataset.len(),
            dataset.codebook.version()
        );
        Ok(dataset)
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn codebook(&self) -> &CategoryCodebook {
        &self.codebook
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 依地點與土壤類型精確比對
    pub fn slice(&self, location: Location, soil_type: SoilType) -> Vec<&HistoricalRecord> {
        self.records
            .iter()
            .filter(|r| r.location == location.as_str() && r.soil_type == soil_type.as_str())
            .collect()
    }
}
