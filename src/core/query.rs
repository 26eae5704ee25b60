use crate::domain::model::{Location, RawRequest, SoilType};
use regex::Regex;
use std::sync::OnceLock;

struct QueryPatterns {
    location: Regex,
    soil: Regex,
    area: Regex,
}

fn patterns() -> &'static QueryPatterns {
    static PATTERNS: OnceLock<QueryPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let locations: Vec<&str> = Location::ALL.iter().map(|l| l.as_str()).collect();

        // 較長的名稱先比對，讓 "Sandy Loam" 不會被 "Sandy" 搶先
        let mut soils: Vec<String> = SoilType::ALL
            .iter()
            .map(|s| s.as_str().replace(' ', r"\s+"))
            .collect();
        soils.sort_by(|a, b| b.len().cmp(&a.len()));

        QueryPatterns {
            location: Regex::new(&format!(r"(?i)\b({})\b", locations.join("|")))
                .expect("location pattern is valid"),
            soil: Regex::new(&format!(r"(?i)\b({})\b", soils.join("|"))).expect("soil pattern is valid"),
            area: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:acres?)?").expect("area pattern is valid"),
        }
    })
}

/// 從自由文字中取出地點、土壤類型與面積，三者都找到才回傳
pub fn extract_crop_details(query: &str) -> Option<RawRequest> {
    let patterns = patterns();

    let location = patterns.location.captures(query)?.get(1)?.as_str();
    let soil = patterns.soil.captures(query)?.get(1)?.as_str();
    let area = patterns.area.captures(query)?.get(1)?.as_str();

    let location = location.parse::<Location>().ok()?;
    let soil = soil.parse::<SoilType>().ok()?;

    tracing::debug!("Extracted {} / {} / {} from query", location, soil, area);
    Some(RawRequest::new(location.as_str(), soil.as_str(), area))
}

const FALLBACK_REPLIES: &[(&str, &str)] = &[
    ("hello", "Hello! How can I help you with agriculture today?"),
    ("hi", "Hi there! What agricultural information do you need?"),
    ("bye", "Goodbye! Happy farming!"),
    (
        "crop suggestion",
        "For crop suggestions, please tell me your location, soil type, and land area.",
    ),
    (
        "plant disease",
        "For plant disease detection, please upload an image of the affected plant.",
    ),
    ("fertilizer", "I can suggest fertilizers based on your soil type and crop."),
    ("weather", "Check local weather forecasts for accurate information."),
    (
        "market price",
        "Market prices vary daily. Check your nearest agricultural market.",
    ),
    (
        "thank you",
        "You're welcome! Is there anything else I can help with?",
    ),
];

pub const DEFAULT_REPLY: &str = "I'm an agriculture chatbot. I can help with crop suggestions, \
plant diseases, fertilizers, and more. Please ask specific questions.";

/// 無法取出預測欄位時的關鍵字回覆，以整個單字比對，依表格順序第一個命中者優先
pub fn fallback_reply(query: &str) -> &'static str {
    let words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let normalized = format!(" {} ", words.join(" "));

    FALLBACK_REPLIES
        .iter()
        .find(|(keyword, _)| normalized.contains(&format!(" {} ", keyword)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}
