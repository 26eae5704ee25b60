const PRECAUTIONS: &[(&str, &str)] = &[
    (
        "early_blight",
        "Remove infected leaves, apply copper-based fungicide, and avoid overhead watering.",
    ),
    (
        "late_blight",
        "Destroy infected plants, use certified seeds, and apply recommended fungicide promptly.",
    ),
    (
        "leaf_mold",
        "Ensure good air circulation, remove affected foliage, and apply appropriate fungicides.",
    ),
    (
        "septoria_leaf_spot",
        "Avoid wet foliage, remove infected leaves, and use crop rotation.",
    ),
    (
        "bacterial_spot",
        "Use resistant varieties, avoid splashing water, and treat with copper spray.",
    ),
    (
        "powdery_mildew",
        "Increase airflow, use neem oil or sulfur spray, and keep foliage dry.",
    ),
    (
        "rust",
        "Remove infected leaves, water at the base, and apply sulfur or other fungicides.",
    ),
];

pub const GENERAL_ADVICE: &str =
    "General Advice: Remove the infected parts, isolate affected plants, and consult an agricultural expert.";

/// 依病名關鍵字找對應的防治建議，第一個命中者優先
pub fn precaution_for(label: &str) -> Option<&'static str> {
    let key = label.to_lowercase().replace(' ', "_");
    PRECAUTIONS
        .iter()
        .find(|(name, _)| key.contains(name))
        .map(|(_, advice)| *advice)
}

pub fn is_healthy(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precaution_matches_normalized_label() {
        assert_eq!(
            precaution_for("Tomato Late blight"),
            Some("Destroy infected plants, use certified seeds, and apply recommended fungicide promptly.")
        );
        assert!(precaution_for("Corn_(maize)___Common_rust_").unwrap().contains("sulfur"));
        assert_eq!(precaution_for("Tomato_mosaic_virus"), None);
    }

    #[test]
    fn test_healthy_detection() {
        assert!(is_healthy("Pepper__bell___healthy"));
        assert!(!is_healthy("Potato___Early_blight"));
    }
}
