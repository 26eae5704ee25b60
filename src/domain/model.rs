use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 下拉選單的預設值，代表使用者尚未選擇
pub const UNSELECTED: &str = "Select...";

/// 歷史資料集中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Soil type")]
    pub soil_type: String,
    #[serde(rename = "Irrigation")]
    pub irrigation: String,
    #[serde(rename = "Crops")]
    pub crop: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Area")]
    pub area: f64,
    // 資料檔的欄位名稱本身就拼成 yeilds
    #[serde(rename = "yeilds")]
    pub yield_amount: f64,
    #[serde(rename = "price")]
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Mangalore,
    Udupi,
    Raichur,
    Gulbarga,
    Mysuru,
    Hassan,
    Kasaragodu,
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Mangalore,
        Location::Udupi,
        Location::Raichur,
        Location::Gulbarga,
        Location::Mysuru,
        Location::Hassan,
        Location::Kasaragodu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Mangalore => "Mangalore",
            Location::Udupi => "Udupi",
            Location::Raichur => "Raichur",
            Location::Gulbarga => "Gulbarga",
            Location::Mysuru => "Mysuru",
            Location::Hassan => "Hassan",
            Location::Kasaragodu => "Kasaragodu",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = InputIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Location::ALL
            .iter()
            .copied()
            .find(|loc| loc.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or(InputIssue::MissingSelection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    Alluvial,
    Loam,
    Laterite,
    Sandy,
    Red,
    Black,
    SandyLoam,
    Clay,
}

impl SoilType {
    pub const ALL: [SoilType; 8] = [
        SoilType::Alluvial,
        SoilType::Loam,
        SoilType::Laterite,
        SoilType::Sandy,
        SoilType::Red,
        SoilType::Black,
        SoilType::SandyLoam,
        SoilType::Clay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Alluvial => "Alluvial",
            SoilType::Loam => "Loam",
            SoilType::Laterite => "Laterite",
            SoilType::Sandy => "Sandy",
            SoilType::Red => "Red",
            SoilType::Black => "Black",
            SoilType::SandyLoam => "Sandy Loam",
            SoilType::Clay => "Clay",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = InputIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        SoilType::ALL
            .iter()
            .copied()
            .find(|soil| soil.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or(InputIssue::MissingSelection)
    }
}

/// 使用者原始輸入，尚未驗證
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    pub location: String,
    pub soil_type: String,
    pub area: String,
}

impl RawRequest {
    pub fn new(location: impl Into<String>, soil_type: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            soil_type: soil_type.into(),
            area: area.into(),
        }
    }
}

/// 批次請求檔中的一列。欄位數不符的列仍保留讀到的欄位，並記下原因
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRow {
    pub line: u64,
    pub request: RawRequest,
    pub malformed: Option<String>,
}

/// 已驗證的預測請求，area_acres 必為正數
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub location: Location,
    pub soil_type: SoilType,
    pub area_acres: f64,
}

impl TryFrom<&RawRequest> for PredictionRequest {
    type Error = InputIssue;

    fn try_from(raw: &RawRequest) -> Result<Self, Self::Error> {
        let location = raw.location.trim();
        let soil = raw.soil_type.trim();
        if location.is_empty() || soil.is_empty() || location == UNSELECTED || soil == UNSELECTED {
            return Err(InputIssue::MissingSelection);
        }
        let location: Location = location.parse()?;
        let soil_type: SoilType = soil.parse()?;

        let area = raw.area.trim();
        if area.is_empty() {
            return Err(InputIssue::MissingArea);
        }
        let area_acres: f64 = area
            .parse()
            .map_err(|_| InputIssue::InvalidArea(area.to_string()))?;
        if !area_acres.is_finite() || area_acres <= 0.0 {
            return Err(InputIssue::InvalidArea(area.to_string()));
        }

        Ok(Self {
            location,
            soil_type,
            area_acres,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_crop: String,
    pub estimated_yield: f64,
    pub estimated_price: f64,
    pub area_acres: f64,
}

impl PredictionResult {
    pub fn summary(&self) -> String {
        format!(
            "The predicted crop is {}. Estimated yield for {} acres is {:.2} quintals. Estimated price is {:.2} rupees.",
            self.predicted_crop, self.area_acres, self.estimated_yield, self.estimated_price
        )
    }
}

/// 使用者輸入層級的問題，以警告呈現而非錯誤
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputIssue {
    MissingSelection,
    MissingArea,
    InvalidArea(String),
}

impl InputIssue {
    pub fn message(&self) -> &'static str {
        match self {
            InputIssue::MissingSelection => "Please select a location and soil type.",
            InputIssue::MissingArea => "Please enter a valid area.",
            InputIssue::InvalidArea(_) => "Please enter a valid number for the Area.",
        }
    }
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Predicted(PredictionResult),
    NoData {
        location: Location,
        soil_type: SoilType,
    },
    Invalid {
        issue: InputIssue,
    },
}

impl PredictionOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            PredictionOutcome::Predicted(_) => "predicted",
            PredictionOutcome::NoData { .. } => "no_data",
            PredictionOutcome::Invalid { .. } => "invalid",
        }
    }

    pub fn message(&self) -> String {
        match self {
            PredictionOutcome::Predicted(result) => result.summary(),
            PredictionOutcome::NoData { .. } => {
                "No data available for the selected location and soil type.".to_string()
            }
            PredictionOutcome::Invalid { issue } => issue.message().to_string(),
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Predicted(result) => Some(result),
            _ => None,
        }
    }
}

/// 批次預測中單一列的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub row: usize,
    pub request: RawRequest,
    pub status: String,
    pub predicted_crop: Option<String>,
    pub estimated_yield: Option<f64>,
    pub estimated_price: Option<f64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub predicted: usize,
    pub no_data: usize,
    pub invalid: usize,
    pub failed: usize,
    pub dataset_fingerprint: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
    pub csv_output: String,
    pub json_output: String,
}
