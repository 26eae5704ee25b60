use crate::core::dataset::Dataset;
use crate::core::predictor::{CropPredictor, PredictorSettings};
use crate::core::{BatchEntry, BatchReport, ConfigProvider, Pipeline, RawRequest, RequestRow, Storage};
use crate::domain::model::{BatchSummary, PredictionOutcome};
use crate::utils::error::{AgriError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "predictions.zip";

/// 批次預測：讀取請求 CSV，逐列預測，輸出 zip 報表
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    dataset: Dataset,
    settings: PredictorSettings,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C, dataset: Dataset, settings: PredictorSettings) -> Self {
        Self {
            storage,
            config,
            dataset,
            settings,
        }
    }

    fn entry_for(row: usize, request: RawRequest, outcome: Result<PredictionOutcome>) -> BatchEntry {
        match outcome {
            Ok(outcome) => {
                let result = outcome.result();
                BatchEntry {
                    row,
                    status: outcome.status().to_string(),
                    predicted_crop: result.map(|r| r.predicted_crop.clone()),
                    estimated_yield: result.map(|r| r.estimated_yield),
                    estimated_price: result.map(|r| r.estimated_price),
                    message: outcome.message(),
                    request,
                }
            }
            Err(e) => {
                // 單列失敗不中斷整批
                tracing::error!("❌ Row {} failed: {} (Category: {:?})", row, e, e.category());
                BatchEntry {
                    row,
                    status: "error".to_string(),
                    predicted_crop: None,
                    estimated_yield: None,
                    estimated_price: None,
                    message: e.user_friendly_message(),
                    request,
                }
            }
        }
    }

    fn render_csv(entries: &[BatchEntry]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "row",
            "location",
            "soil_type",
            "area",
            "status",
            "predicted_crop",
            "estimated_yield",
            "estimated_price",
            "message",
        ])?;

        for entry in entries {
            writer.write_record([
                entry.row.to_string(),
                entry.request.location.clone(),
                entry.request.soil_type.clone(),
                entry.request.area.clone(),
                entry.status.clone(),
                entry.predicted_crop.clone().unwrap_or_default(),
                entry.estimated_yield.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                entry.estimated_price.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                entry.message.clone(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AgriError::IoError(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RequestRow>> {
        let path = self.config.requests_path();
        tracing::debug!("Reading batch requests from: {}", path);
        let bytes = self.storage.read_file(path).await?;

        // flexible：欄位數不符的列留到 transform 標成錯誤，不中斷整批
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let [Some(location), Some(soil_type), Some(area)] =
            [column("location"), column("soil_type"), column("area")]
        else {
            return Err(AgriError::ValidationError {
                message: format!(
                    "Request file '{}' must have the columns location, soil_type and area",
                    path
                ),
            });
        };

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let fallback_line = i as u64 + 2;
            match record {
                Ok(record) => {
                    let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
                    let malformed = (record.len() != headers.len()).then(|| {
                        format!("expected {} fields, found {}", headers.len(), record.len())
                    });
                    rows.push(RequestRow {
                        line: record.position().map_or(fallback_line, |p| p.line()),
                        request: RawRequest::new(field(location), field(soil_type), field(area)),
                        malformed,
                    });
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => rows.push(RequestRow {
                    line: e.position().map_or(fallback_line, |p| p.line()),
                    request: RawRequest::default(),
                    malformed: Some(e.to_string()),
                }),
            }
        }

        for row in rows.iter().filter(|r| r.malformed.is_some()) {
            tracing::warn!(
                "⚠️ Malformed request on line {}: {}",
                row.line,
                row.malformed.as_deref().unwrap_or_default()
            );
        }
        if rows.is_empty() {
            tracing::warn!("Request file '{}' has no rows", path);
        }
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<RequestRow>) -> Result<BatchReport> {
        let predictor = CropPredictor::new(&self.dataset, self.settings);

        let entries: Vec<BatchEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let outcome = match &row.malformed {
                    Some(reason) => Err(AgriError::processing(format!(
                        "line {}: {}",
                        row.line, reason
                    ))),
                    None => predictor.predict(&row.request),
                };
                Self::entry_for(i + 1, row.request, outcome)
            })
            .collect();

        let count = |status: &str| entries.iter().filter(|e| e.status == status).count();
        let summary = BatchSummary {
            total: entries.len(),
            predicted: count("predicted"),
            no_data: count("no_data"),
            invalid: count("invalid"),
            failed: count("error"),
            dataset_fingerprint: self.dataset.codebook().version().to_string(),
            generated_at: chrono::Utc::now(),
        };

        Ok(BatchReport {
            csv_output: Self::render_csv(&entries)?,
            json_output: serde_json::to_string_pretty(&entries)?,
            entries,
            summary,
        })
    }

    async fn load(&self, report: BatchReport) -> Result<String> {
        let output_path = Path::new(self.config.output_path()).join(ARCHIVE_NAME);
        let output_path = output_path.to_string_lossy().into_owned();

        // 建立 zip 檔
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("predictions.csv", FileOptions::default())?;
            zip.write_all(report.csv_output.as_bytes())?;

            zip.start_file::<_, ()>("predictions.json", FileOptions::default())?;
            zip.write_all(report.json_output.as_bytes())?;

            zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
            let summary = serde_json::to_string_pretty(&report.summary)?;
            zip.write_all(summary.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), output_path);
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}
