use crate::utils::error::{AgriError, Result};
use std::collections::HashSet;
use std::path::Path;

/// 模型輸出索引對應的類別名稱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseLabels {
    names: Vec<String>,
}

impl DiseaseLabels {
    /// 明列的類別清單，順序即模型輸出的索引順序，不重新排序
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(AgriError::ConfigError {
                message: "disease label set is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(AgriError::InvalidConfigValueError {
                    field: "classifier.labels".to_string(),
                    value: name.clone(),
                    reason: "Duplicate label would shift model output indices".to_string(),
                });
            }
        }
        Ok(Self { names })
    }

    /// 讀取訓練資料目錄下的子資料夾名稱。
    ///
    /// 訓練時以資料夾名稱排序決定類別順序，這裡用相同的排序。
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        tracing::debug!("Found {} class folders under {}", names.len(), dir.display());
        Self::from_names(names)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_labels_keep_given_order() {
        let labels = DiseaseLabels::from_names(["Tomato_healthy", "Apple_scab", "Corn_rust"]).unwrap();
        assert_eq!(labels.get(0), Some("Tomato_healthy"));
        assert_eq!(labels.get(1), Some("Apple_scab"));
        assert_eq!(labels.get(2), Some("Corn_rust"));
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let err = DiseaseLabels::from_names(["Corn_rust", "Apple_scab", "Corn_rust"]).unwrap_err();
        assert!(matches!(err, AgriError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_labels_from_directory_ignore_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Tomato_Leaf_Mold")).unwrap();
        std::fs::create_dir(dir.path().join("Apple_healthy")).unwrap();
        std::fs::write(dir.path().join("README.txt"), "notes").unwrap();

        let labels = DiseaseLabels::from_dir(dir.path()).unwrap();
        assert_eq!(labels.names(), &["Apple_healthy".to_string(), "Tomato_Leaf_Mold".to_string()]);
    }

    #[test]
    fn test_empty_label_set_is_rejected() {
        assert!(DiseaseLabels::from_names(Vec::<String>::new()).is_err());
    }
}
