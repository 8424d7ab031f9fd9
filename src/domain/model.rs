use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 攤平後的一筆使用者資料，鍵為點號路徑（例如 `name.first`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }
}

/// Normalizer 的輸出：欄位順序為所有記錄鍵的聯集（依首次出現順序）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

pub type CategoryId = u32;

/// 類別欄位的字典編碼，編號依首次出現順序配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    values: Vec<String>,
    index: HashMap<String, CategoryId>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, value: &str) -> CategoryId {
        if let Some(id) = self.index.get(value) {
            return *id;
        }
        let id = self.values.len() as CategoryId;
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), id);
        id
    }

    pub fn decode(&self, id: CategoryId) -> Option<&str> {
        self.values.get(id as usize).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 年齡區間，排序即為自然順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-29")]
    From18To29,
    #[serde(rename = "30-39")]
    From30To39,
    #[serde(rename = "40-49")]
    From40To49,
    #[serde(rename = "50-59")]
    From50To59,
    #[serde(rename = "60-69")]
    From60To69,
    #[serde(rename = "70+")]
    From70,
}

impl AgeRange {
    pub const ALL: [AgeRange; 6] = [
        AgeRange::From18To29,
        AgeRange::From30To39,
        AgeRange::From40To49,
        AgeRange::From50To59,
        AgeRange::From60To69,
        AgeRange::From70,
    ];

    /// 區間邊界，左閉右開
    pub const EDGES: [i64; 7] = [18, 30, 40, 50, 60, 70, 100];

    /// 將年齡分箱；落在 [18, 100) 之外回傳 `None`
    pub fn from_age(age: i64) -> Option<Self> {
        Self::EDGES
            .windows(2)
            .position(|edge| edge[0] <= age && age < edge[1])
            .map(|index| Self::ALL[index])
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeRange::From18To29 => "18-29",
            AgeRange::From30To39 => "30-39",
            AgeRange::From40To49 => "40-49",
            AgeRange::From50To59 => "50-59",
            AgeRange::From60To69 => "60-69",
            AgeRange::From70 => "70+",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanRow {
    pub gender: Option<CategoryId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nationality: Option<CategoryId>,
    pub age: Option<i64>,
    pub country: Option<CategoryId>,
    pub age_range: Option<AgeRange>,
}

/// Transformer 的輸出；三個類別欄位各自持有字典
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanTable {
    pub rows: Vec<CleanRow>,
    pub genders: Dictionary,
    pub nationalities: Dictionary,
    pub countries: Dictionary,
}

impl CleanTable {
    pub const HEADERS: [&'static str; 7] = [
        "Gender",
        "FirstName",
        "LastName",
        "Nationality",
        "Age",
        "Country",
        "AgeRange",
    ];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn gender_of(&self, row: &CleanRow) -> Option<&str> {
        row.gender.and_then(|id| self.genders.decode(id))
    }

    pub fn nationality_of(&self, row: &CleanRow) -> Option<&str> {
        row.nationality.and_then(|id| self.nationalities.decode(id))
    }

    pub fn country_of(&self, row: &CleanRow) -> Option<&str> {
        row.country.and_then(|id| self.countries.decode(id))
    }

    /// 所有非空的年齡
    pub fn ages(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().filter_map(|row| row.age)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsSummary {
    pub average_age: Option<f64>,
    /// 依數量遞減排序，數量相同時依類別名稱排序
    pub gender_counts: Vec<(String, usize)>,
    /// 依類別名稱排序
    pub avg_age_by_gender: Vec<(String, Option<f64>)>,
}

/// 長格式統計表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticRow {
    #[serde(rename = "Metrica")]
    pub metric: String,
    #[serde(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "Valor")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub clean: CleanTable,
    pub statistics: StatisticsSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactOutcome {
    Written,
    Failed(String),
}

/// 單一輸出檔的寫入結果
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactReport {
    pub name: String,
    pub path: String,
    pub outcome: ArtifactOutcome,
}

impl ArtifactReport {
    pub fn written(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            outcome: ArtifactOutcome::Written,
        }
    }

    pub fn failed(name: &str, path: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            outcome: ArtifactOutcome::Failed(message),
        }
    }

    pub fn is_written(&self) -> bool {
        self.outcome == ArtifactOutcome::Written
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub output_path: String,
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub artifacts: Vec<ArtifactReport>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts.iter().filter(|a| !a.is_written())
    }

    pub fn artifact(&self, name: &str) -> Option<&ArtifactReport> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_range_edges() {
        assert_eq!(AgeRange::from_age(18), Some(AgeRange::From18To29));
        assert_eq!(AgeRange::from_age(29), Some(AgeRange::From18To29));
        assert_eq!(AgeRange::from_age(30), Some(AgeRange::From30To39));
        assert_eq!(AgeRange::from_age(49), Some(AgeRange::From40To49));
        assert_eq!(AgeRange::from_age(50), Some(AgeRange::From50To59));
        assert_eq!(AgeRange::from_age(69), Some(AgeRange::From60To69));
        assert_eq!(AgeRange::from_age(70), Some(AgeRange::From70));
        assert_eq!(AgeRange::from_age(99), Some(AgeRange::From70));
    }

    #[test]
    fn test_age_range_out_of_bounds() {
        assert_eq!(AgeRange::from_age(17), None);
        assert_eq!(AgeRange::from_age(100), None);
        assert_eq!(AgeRange::from_age(-5), None);
    }

    #[test]
    fn test_age_range_labels_follow_natural_order() {
        let labels: Vec<&str> = AgeRange::ALL.iter().map(AgeRange::label).collect();
        assert_eq!(labels, vec!["18-29", "30-39", "40-49", "50-59", "60-69", "70+"]);
        assert!(AgeRange::From18To29 < AgeRange::From70);
    }

    #[test]
    fn test_dictionary_encodes_by_first_appearance() {
        let mut dict = Dictionary::new();
        let female = dict.encode("female");
        let male = dict.encode("male");
        assert_eq!(dict.encode("female"), female);
        assert_eq!(female, 0);
        assert_eq!(male, 1);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.decode(male), Some("male"));
        assert_eq!(dict.decode(7), None);
    }
}
