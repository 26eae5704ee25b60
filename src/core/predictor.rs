use crate::core::dataset::Dataset;
use crate::core::encoding::CategoricalColumn;
use crate::core::preprocessing::{train_test_split, StandardScaler};
use crate::core::svm::{LinearSvc, SvmParams};
use crate::domain::model::{
    HistoricalRecord, PredictionOutcome, PredictionRequest, PredictionResult, RawRequest,
};
use crate::utils::error::{AgriError, Result};
use ndarray::{aview1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FEATURE_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 每次請求在子集合上重新訓練線性 SVM
    #[default]
    Svm,
    /// 子集合中最常見的作物
    Majority,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictorSettings {
    pub strategy: Strategy,
    pub test_fraction: f64,
    pub seed: u64,
    pub svm: SvmParams,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Svm,
            test_fraction: 0.2,
            seed: 42,
            svm: SvmParams::default(),
        }
    }
}

/// 依地點 / 土壤篩選歷史資料後推薦作物並估算產量與價格
pub struct CropPredictor<'a> {
    dataset: &'a Dataset,
    settings: PredictorSettings,
}

impl<'a> CropPredictor<'a> {
    pub fn new(dataset: &'a Dataset, settings: PredictorSettings) -> Self {
        Self { dataset, settings }
    }

    /// 驗證原始輸入後預測。輸入問題與查無資料都是正常結果，不是錯誤。
    pub fn predict(&self, raw: &RawRequest) -> Result<PredictionOutcome> {
        match PredictionRequest::try_from(raw) {
            Ok(request) => self.predict_request(&request),
            Err(issue) => {
                tracing::debug!("Rejected request {:?}: {}", raw, issue);
                Ok(PredictionOutcome::Invalid { issue })
            }
        }
    }

    pub fn predict_request(&self, request: &PredictionRequest) -> Result<PredictionOutcome> {
        let slice = self.dataset.slice(request.location, request.soil_type);
        if slice.is_empty() {
            tracing::info!(
                "⚠️ No data for {} / {}",
                request.location,
                request.soil_type
            );
            return Ok(PredictionOutcome::NoData {
                location: request.location,
                soil_type: request.soil_type,
            });
        }
        tracing::debug!(
            "Slice {} / {} has {} rows",
            request.location,
            request.soil_type,
            slice.len()
        );

        let ratios = per_area_ratios(&slice)?;
        let (yield_per_area, price_per_area) = mean_ratios(&ratios);

        let predicted_crop = match self.settings.strategy {
            Strategy::Svm => self.fit_and_predict(&slice, &ratios)?,
            Strategy::Majority => majority_crop(&slice),
        };

        let result = PredictionResult {
            predicted_crop,
            estimated_yield: yield_per_area * request.area_acres,
            estimated_price: price_per_area * request.area_acres,
            area_acres: request.area_acres,
        };
        tracing::info!(
            "🌱 {} / {} ({} acres) -> {}",
            request.location,
            request.soil_type,
            request.area_acres,
            result.predicted_crop
        );
        Ok(PredictionOutcome::Predicted(result))
    }

    fn fit_and_predict(&self, slice: &[&HistoricalRecord], ratios: &[(f64, f64)]) -> Result<String> {
        let codebook = self.dataset.codebook();

        // 特徵欄位：Location, Soil type, Irrigation, Area, yeilds, price, yields/area, price/area
        let mut features = Array2::<f64>::zeros((slice.len(), FEATURE_COUNT));
        let mut targets = Vec::with_capacity(slice.len());
        for ((record, (ypa, ppa)), mut row) in slice.iter().zip(ratios).zip(features.rows_mut()) {
            row.assign(&aview1(&[
                codebook.encode(CategoricalColumn::Location, record)? as f64,
                codebook.encode(CategoricalColumn::SoilType, record)? as f64,
                codebook.encode(CategoricalColumn::Irrigation, record)? as f64,
                record.area,
                record.yield_amount,
                record.price,
                *ypa,
                *ppa,
            ]));
            targets.push(codebook.encode(CategoricalColumn::Crop, record)?);
        }

        let split = train_test_split(slice.len(), self.settings.test_fraction, self.settings.seed)?;
        let x_train = features.select(Axis(0), &split.train);
        let y_train: Vec<usize> = split.train.iter().map(|&i| targets[i]).collect();
        let x_test = features.select(Axis(0), &split.test);

        let (scaler, x_train) = StandardScaler::fit_transform(x_train.view())?;
        let x_test = scaler.transform(x_test.view())?;

        let model = LinearSvc::fit(x_train.view(), &y_train, self.settings.svm)?;
        let predictions = model.predict(x_test.view())?;

        // 取測試集的第一筆預測作為代表
        let first = predictions
            .first()
            .copied()
            .ok_or_else(|| AgriError::processing("classifier produced no predictions"))?;
        Ok(codebook.decode_crop(first)?.to_string())
    }
}

fn per_area_ratios(slice: &[&HistoricalRecord]) -> Result<Vec<(f64, f64)>> {
    slice
        .iter()
        .map(|record| {
            if record.area.is_nan() || record.area <= 0.0 {
                return Err(AgriError::processing(format!(
                    "record for {} ({}) has non-positive area {}",
                    record.crop, record.year, record.area
                )));
            }
            Ok((record.yield_amount / record.area, record.price / record.area))
        })
        .collect()
}

fn mean_ratios(ratios: &[(f64, f64)]) -> (f64, f64) {
    let n = ratios.len() as f64;
    let (y, p) = ratios
        .iter()
        .fold((0.0_f64, 0.0_f64), |(y, p), (ry, rp)| (y + ry, p + rp));
    (y / n, p / n)
}

/// 出現次數最多的作物，同數時取字母順序較前者
fn majority_crop(slice: &[&HistoricalRecord]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in slice {
        *counts.entry(record.crop.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (crop, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((crop, count));
        }
    }
    best.map(|(crop, _)| crop.to_string()).unwrap_or_default()
}
