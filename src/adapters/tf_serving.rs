use crate::disease::ImageTensor;
use crate::domain::ports::InferenceBackend;
use crate::utils::error::{AgriError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Vec<Vec<[f32; 3]>>>,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// 透過 TensorFlow Serving REST API 呼叫預訓練模型
#[derive(Debug, Clone)]
pub struct TfServingBackend {
    client: Client,
    endpoint: String,
}

impl TfServingBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn predict_url(&self, model_name: &str) -> String {
        format!(
            "{}/v1/models/{}:predict",
            self.endpoint.trim_end_matches('/'),
            model_name
        )
    }
}

#[async_trait]
impl InferenceBackend for TfServingBackend {
    async fn predict(&self, model_name: &str, input: &ImageTensor) -> Result<Vec<f32>> {
        let url = self.predict_url(model_name);
        tracing::debug!("Making inference request to: {}", url);

        let body = PredictRequest {
            instances: vec![input.to_nested()],
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        tracing::debug!("Inference response status: {}", status);

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgriError::inference(format!(
                "model server returned {} for '{}': {}",
                status, model_name, detail
            )));
        }

        let payload: PredictResponse = response.json().await?;
        payload
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| AgriError::inference("model server returned an empty prediction list"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_url_trims_trailing_slash() {
        let backend = TfServingBackend::new("http://localhost:8501/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.predict_url("plant_disease_vgg16_e10"),
            "http://localhost:8501/v1/models/plant_disease_vgg16_e10:predict"
        );
    }
}
