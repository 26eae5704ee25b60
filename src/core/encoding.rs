use crate::domain::model::HistoricalRecord;
use crate::utils::error::{AgriError, Result};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// 將字串類別依排序後的順序對應到 0..n
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: Vec<String> = values
            .into_iter()
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();
        Self { classes, index }
    }

    pub fn transform(&self, value: &str) -> Result<usize> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| AgriError::processing(format!("unseen category '{}'", value)))
    }

    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| AgriError::processing(format!("unknown label code {}", code)))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalColumn {
    Location,
    SoilType,
    Irrigation,
    Crop,
}

impl CategoricalColumn {
    pub fn value<'a>(&self, record: &'a HistoricalRecord) -> &'a str {
        match self {
            CategoricalColumn::Location => &record.location,
            CategoricalColumn::SoilType => &record.soil_type,
            CategoricalColumn::Irrigation => &record.irrigation,
            CategoricalColumn::Crop => &record.crop,
        }
    }
}

/// 以完整資料集建立一次的全域類別編碼表。
///
/// 編碼不隨篩選後的子集合變動，同一個作物在不同請求間得到相同代碼。
/// `version()` 是依類別內容計算的指紋，類別集合改變時版本也跟著改變。
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCodebook {
    location: LabelEncoder,
    soil_type: LabelEncoder,
    irrigation: LabelEncoder,
    crop: LabelEncoder,
    version: String,
}

impl CategoryCodebook {
    pub fn build(records: &[HistoricalRecord]) -> Self {
        let fit = |column: CategoricalColumn| {
            LabelEncoder::fit(records.iter().map(|r| column.value(r)))
        };
        let location = fit(CategoricalColumn::Location);
        let soil_type = fit(CategoricalColumn::SoilType);
        let irrigation = fit(CategoricalColumn::Irrigation);
        let crop = fit(CategoricalColumn::Crop);

        let version = fingerprint([&location, &soil_type, &irrigation, &crop]);

        Self {
            location,
            soil_type,
            irrigation,
            crop,
            version,
        }
    }

    pub fn encoder(&self, column: CategoricalColumn) -> &LabelEncoder {
        match column {
            CategoricalColumn::Location => &self.location,
            CategoricalColumn::SoilType => &self.soil_type,
            CategoricalColumn::Irrigation => &self.irrigation,
            CategoricalColumn::Crop => &self.crop,
        }
    }

    pub fn encode(&self, column: CategoricalColumn, record: &HistoricalRecord) -> Result<usize> {
        self.encoder(column).transform(column.value(record))
    }

    pub fn decode_crop(&self, code: usize) -> Result<&str> {
        self.crop.inverse_transform(code)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// 類別內容的 SHA-256 前 16 個十六進位字元，跨平台與編譯器版本都相同
fn fingerprint(encoders: [&LabelEncoder; 4]) -> String {
    let mut hasher = Sha256::new();
    for encoder in encoders {
        for class in encoder.classes() {
            hasher.update(class.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("v1-{}", &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str, crop: &str) -> HistoricalRecord {
        HistoricalRecord {
            location: location.to_string(),
            soil_type: "Red".to_string(),
            irrigation: "Canal".to_string(),
            crop: crop.to_string(),
            year: 2020,
            area: 1.0,
            yield_amount: 1.0,
            price: 1.0,
        }
    }

    #[test]
    fn test_label_encoder_uses_sorted_order() {
        let encoder = LabelEncoder::fit(["Ragi", "Paddy", "Arecanut", "Paddy"]);
        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.transform("Arecanut").unwrap(), 0);
        assert_eq!(encoder.transform("Ragi").unwrap(), 2);
        assert_eq!(encoder.inverse_transform(1).unwrap(), "Paddy");
        assert!(encoder.transform("Maize").is_err());
        assert!(encoder.inverse_transform(7).is_err());
    }

    #[test]
    fn test_codebook_codes_do_not_depend_on_slice() {
        let records = vec![
            record("Udupi", "Paddy"),
            record("Hassan", "Arecanut"),
            record("Udupi", "Ragi"),
        ];
        let codebook = CategoryCodebook::build(&records);
        // Paddy 只出現在 Udupi，但代碼仍依全體資料排序
        assert_eq!(codebook.encode(CategoricalColumn::Crop, &records[0]).unwrap(), 1);
        assert_eq!(codebook.decode_crop(2).unwrap(), "Ragi");
    }

    #[test]
    fn test_codebook_version_tracks_categories() {
        let a = CategoryCodebook::build(&[record("Udupi", "Paddy")]);
        let b = CategoryCodebook::build(&[record("Udupi", "Paddy"), record("Udupi", "Paddy")]);
        let c = CategoryCodebook::build(&[record("Udupi", "Ragi")]);
        assert_eq!(a.version(), b.version());
        assert_ne!(a.version(), c.version());
    }

    #[test]
    fn test_codebook_version_is_content_digest() {
        let codebook = CategoryCodebook::build(&[record("Udupi", "Paddy")]);
        let version = codebook.version();
        assert!(version.starts_with("v1-"));
        assert_eq!(version.len(), 3 + 16);
        assert!(version[3..].chars().all(|c| c.is_ascii_hexdigit()));

        // 以固定的位元組序列重算，結果必須一致
        let mut hasher = Sha256::new();
        for class in ["Udupi", "Red", "Canal", "Paddy"] {
            hasher.update(class.as_bytes());
            hasher.update([0x1f]);
            hasher.update([0x1e]);
        }
        let expected = hex::encode(hasher.finalize());
        assert_eq!(&version[3..], &expected[..16]);

        // 類別之間的分隔讓 ["ab"] 與 ["a", "b"] 不會撞到同一個指紋
        let joined = CategoryCodebook::build(&[record("ab", "Paddy")]);
        let split = CategoryCodebook::build(&[record("a", "Paddy"), record("b", "Paddy")]);
        assert_ne!(joined.version(), split.version());
    }
}
