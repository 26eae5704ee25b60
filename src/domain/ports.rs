use crate::domain::model::{BatchReport, RequestRow};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn requests_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RequestRow>>;
    async fn transform(&self, rows: Vec<RequestRow>) -> Result<BatchReport>;
    async fn load(&self, report: BatchReport) -> Result<String>;
}

/// 預訓練影像模型的推論介面，回傳每個類別的機率
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn predict(&self, model_name: &str, input: &crate::disease::ImageTensor) -> Result<Vec<f32>>;
}
