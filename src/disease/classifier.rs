use crate::disease::labels::DiseaseLabels;
use crate::disease::precautions::{is_healthy, precaution_for, GENERAL_ADVICE};
use crate::disease::tensor::preprocess_image;
use crate::domain::ports::InferenceBackend;
use crate::utils::error::{AgriError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Vgg16,
    Vgg19,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Vgg16 => "vgg16",
            ModelId::Vgg19 => "vgg19",
        }
    }

    pub fn default_served_name(&self) -> &'static str {
        match self {
            ModelId::Vgg16 => "plant_disease_vgg16_e10",
            ModelId::Vgg19 => "plant_disease_vgg19_e10",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = AgriError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vgg16" => Ok(ModelId::Vgg16),
            "vgg19" => Ok(ModelId::Vgg19),
            other => Err(AgriError::ValidationError {
                message: format!("Unknown model '{}', expected vgg16 or vgg19", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub label: String,
    pub display_label: String,
    pub confidence_pct: f32,
    pub healthy: bool,
    pub precaution: Option<String>,
}

impl Diagnosis {
    /// 由模型輸出的機率向量取最大者
    pub fn from_probabilities(labels: &DiseaseLabels, probabilities: &[f32]) -> Result<Self> {
        if probabilities.len() != labels.len() {
            return Err(AgriError::inference(format!(
                "model returned {} scores but {} labels are configured",
                probabilities.len(),
                labels.len()
            )));
        }

        let (index, best) = probabilities
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .fold(None, |acc: Option<(usize, f32)>, (i, p)| match acc {
                Some((_, current)) if current >= p => acc,
                _ => Some((i, p)),
            })
            .ok_or_else(|| AgriError::inference("model returned no finite scores"))?;

        let label = labels
            .get(index)
            .ok_or_else(|| AgriError::inference(format!("no label for index {}", index)))?
            .to_string();
        let healthy = is_healthy(&label);
        let precaution = if healthy {
            None
        } else {
            Some(precaution_for(&label).unwrap_or(GENERAL_ADVICE).to_string())
        };

        Ok(Self {
            display_label: label.replace('_', " "),
            confidence_pct: best * 100.0,
            healthy,
            precaution,
            label,
        })
    }

    pub fn summary(&self) -> String {
        if self.healthy {
            format!(
                "The leaf looks healthy with {:.2} percent confidence. No action needed.",
                self.confidence_pct
            )
        } else {
            let mut text = format!(
                "The leaf appears to be affected by {} with {:.2} percent confidence.",
                self.display_label, self.confidence_pct
            );
            match self.precaution.as_deref() {
                // 一般建議本身已帶前綴
                Some(GENERAL_ADVICE) => {
                    text.push(' ');
                    text.push_str(GENERAL_ADVICE);
                }
                Some(precaution) => {
                    text.push_str(" Recommended precautions: ");
                    text.push_str(precaution);
                }
                None => {}
            }
            text
        }
    }
}

/// 葉片病害分類：前處理在本地完成，推論交給預訓練模型
pub struct LeafDiseaseClassifier<B: InferenceBackend> {
    backend: B,
    labels: DiseaseLabels,
    served_names: HashMap<ModelId, String>,
    image_size: u32,
}

impl<B: InferenceBackend> LeafDiseaseClassifier<B> {
    pub fn new(backend: B, labels: DiseaseLabels, image_size: u32) -> Self {
        let served_names = [ModelId::Vgg16, ModelId::Vgg19]
            .into_iter()
            .map(|id| (id, id.default_served_name().to_string()))
            .collect();
        Self {
            backend,
            labels,
            served_names,
            image_size,
        }
    }

    pub fn with_served_name(mut self, model: ModelId, name: impl Into<String>) -> Self {
        self.served_names.insert(model, name.into());
        self
    }

    pub fn labels(&self) -> &DiseaseLabels {
        &self.labels
    }

    pub async fn classify(&self, image_bytes: &[u8], model: ModelId) -> Result<Diagnosis> {
        let tensor = preprocess_image(image_bytes, self.image_size)?;
        let served_name = self
            .served_names
            .get(&model)
            .map(String::as_str)
            .unwrap_or_else(|| model.default_served_name());

        tracing::debug!("Running {} ({}) on {}x{} input", model, served_name, tensor.width, tensor.height);
        let probabilities = self.backend.predict(served_name, &tensor).await?;

        let diagnosis = Diagnosis::from_probabilities(&self.labels, &probabilities)?;
        tracing::info!(
            "🍃 {} -> {} ({:.2}%)",
            model,
            diagnosis.label,
            diagnosis.confidence_pct
        );
        Ok(diagnosis)
    }
}
