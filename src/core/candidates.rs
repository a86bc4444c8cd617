use crate::domain::model::DomainCandidate;

/// 固定的候選後綴清單,順序即呈現順序
pub const DEFAULT_SUFFIXES: &[&str] = &[
    ".com", ".net", ".org", ".co", ".io", ".shop", ".online", ".store", ".site", ".website",
];

/// 單次週期最多檢查的候選數
pub const MAX_CANDIDATES: usize = 10;

/// 將使用者輸入正規化為可組合的關鍵字
///
/// 去除協定前綴與尾端斜線、移除所有空白、轉小寫;
/// 若仍含點號則只保留最左側的標籤。空輸入得到空關鍵字。
pub fn normalize(raw: &str) -> String {
    let mut keyword: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if let Some(rest) = keyword.strip_prefix("https://") {
        keyword = rest.to_string();
    } else if let Some(rest) = keyword.strip_prefix("http://") {
        keyword = rest.to_string();
    }

    if let Some(rest) = keyword.strip_suffix('/') {
        keyword = rest.to_string();
    }

    match keyword.split('.').next() {
        Some(label) => label.to_string(),
        None => keyword,
    }
}

/// 關鍵字 × 後綴清單的交叉組合,保留後綴順序並截斷在上限內
pub fn build_candidates(keyword: &str, suffixes: &[String]) -> Vec<DomainCandidate> {
    if keyword.is_empty() {
        return Vec::new();
    }

    suffixes
        .iter()
        .take(MAX_CANDIDATES)
        .map(|suffix| DomainCandidate {
            domain: format!("{}{}", keyword, suffix),
        })
        .collect()
}
