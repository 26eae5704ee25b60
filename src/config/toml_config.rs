use crate::core::predictor::{PredictorSettings, Strategy};
use crate::core::svm::SvmParams;
use crate::core::ConfigProvider;
use crate::disease::{DiseaseLabels, ModelId, DEFAULT_IMAGE_SIZE};
use crate::utils::error::{AgriError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgriConfig {
    pub dataset: DatasetConfig,
    pub predictor: PredictorConfig,
    pub classifier: ClassifierConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/Data1.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub strategy: Strategy,
    pub test_fraction: f64,
    pub seed: u64,
    pub svm_c: f64,
    pub svm_max_iter: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        let defaults = PredictorSettings::default();
        Self {
            strategy: defaults.strategy,
            test_fraction: defaults.test_fraction,
            seed: defaults.seed,
            svm_c: defaults.svm.c,
            svm_max_iter: defaults.svm.max_iter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub labels_dir: Option<String>,
    pub labels: Option<Vec<String>>,
    pub image_size: u32,
    pub timeout_seconds: u64,
    pub default_model: ModelId,
    pub models: HashMap<String, String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8501".to_string(),
            labels_dir: None,
            labels: None,
            image_size: DEFAULT_IMAGE_SIZE,
            timeout_seconds: 30,
            default_model: ModelId::Vgg16,
            models: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub requests: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            requests: "requests.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl AgriConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AgriError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AgriError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("dataset.path", &self.dataset.path)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_url("classifier.endpoint", &self.classifier.endpoint)?;

        // 測試集比例必須小於 1，否則沒有訓練資料
        validation::validate_range("predictor.test_fraction", self.predictor.test_fraction, 0.0, 0.99)?;
        validation::validate_positive_number("predictor.svm_max_iter", self.predictor.svm_max_iter, 1)?;
        validation::validate_positive_number("classifier.image_size", self.classifier.image_size as usize, 1)?;

        if self.predictor.svm_c.is_nan() || self.predictor.svm_c <= 0.0 {
            return Err(AgriError::InvalidConfigValueError {
                field: "predictor.svm_c".to_string(),
                value: self.predictor.svm_c.to_string(),
                reason: "Penalty must be positive".to_string(),
            });
        }

        Ok(())
    }

    pub fn predictor_settings(&self) -> PredictorSettings {
        PredictorSettings {
            strategy: self.predictor.strategy,
            test_fraction: self.predictor.test_fraction,
            seed: self.predictor.seed,
            svm: SvmParams {
                c: self.predictor.svm_c,
                max_iter: self.predictor.svm_max_iter,
                ..SvmParams::default()
            },
        }
    }

    /// 類別清單：優先使用明列的 labels，否則讀取訓練資料夾
    pub fn disease_labels(&self) -> Result<DiseaseLabels> {
        if let Some(labels) = &self.classifier.labels {
            return DiseaseLabels::from_names(labels.iter().cloned());
        }
        let dir = validation::validate_required_field("classifier.labels_dir", &self.classifier.labels_dir)?;
        DiseaseLabels::from_dir(dir)
    }

    pub fn served_model_name(&self, model: ModelId) -> String {
        self.classifier
            .models
            .get(model.as_str())
            .cloned()
            .unwrap_or_else(|| model.default_served_name().to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for AgriConfig {
    fn dataset_path(&self) -> &str {
        &self.dataset.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn requests_path(&self) -> &str {
        &self.batch.requests
    }
}

impl Validate for AgriConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[dataset]
path = "data/history.csv"

[predictor]
strategy = "majority"
test_fraction = 0.25
seed = 7

[classifier]
endpoint = "http://models.internal:8501"
labels = ["Tomato_healthy", "Tomato_Late_blight"]
default_model = "vgg19"

[classifier.models]
vgg19 = "leaf_vgg19_v2"

[output]
path = "./reports"

[monitoring]
enabled = true
"#;

        let config = AgriConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dataset_path(), "data/history.csv");
        assert_eq!(config.predictor.strategy, Strategy::Majority);
        assert_eq!(config.predictor_settings().seed, 7);
        assert_eq!(config.classifier.default_model, ModelId::Vgg19);
        assert_eq!(config.served_model_name(ModelId::Vgg19), "leaf_vgg19_v2");
        assert_eq!(config.served_model_name(ModelId::Vgg16), "plant_disease_vgg16_e10");
        assert_eq!(config.disease_labels().unwrap().len(), 2);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AgriConfig::from_toml_str("").unwrap();
        assert_eq!(config.predictor.test_fraction, 0.2);
        assert_eq!(config.predictor.seed, 42);
        assert_eq!(config.classifier.image_size, 224);
        assert_eq!(config.requests_path(), "requests.csv");
        assert!(!config.monitoring_enabled());
        // 沒有設定 labels 也沒有 labels_dir
        assert!(matches!(
            config.disease_labels(),
            Err(AgriError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("AGRI_TEST_DATASET", "/srv/agri/Data1.csv");

        let config = AgriConfig::from_toml_str(
            r#"
[dataset]
path = "${AGRI_TEST_DATASET}"
"#,
        )
        .unwrap();
        assert_eq!(config.dataset.path, "/srv/agri/Data1.csv");

        std::env::remove_var("AGRI_TEST_DATASET");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AgriConfig::default();
        config.predictor.test_fraction = 1.0;
        assert!(config.validate().is_err());

        let mut config = AgriConfig::default();
        config.classifier.endpoint = "invalid-url".to_string();
        assert!(config.validate().is_err());

        let mut config = AgriConfig::default();
        config.predictor.svm_c = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"./file-test\"\n")
            .unwrap();

        let config = AgriConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./file-test");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AgriConfig::from_file_or_default("/nonexistent/agrismart.toml").unwrap();
        assert_eq!(config.dataset_path(), "data/Data1.csv");
    }
}
