use crate::domain::model::{AgeRange, CleanRow, CleanTable, Dictionary, RawTable, Record};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

pub const GENDER_COLUMN: &str = "gender";
pub const FIRST_NAME_COLUMN: &str = "name.first";
pub const LAST_NAME_COLUMN: &str = "name.last";
pub const NATIONALITY_COLUMN: &str = "nat";
pub const AGE_COLUMN: &str = "dob.age";
pub const COUNTRY_COLUMN: &str = "location.country";

/// 來源欄位與輸出標籤的一對一對應
pub const RENAME_COLUMNS: [(&str, &str); 6] = [
    (GENDER_COLUMN, "Gender"),
    (FIRST_NAME_COLUMN, "FirstName"),
    (LAST_NAME_COLUMN, "LastName"),
    (NATIONALITY_COLUMN, "Nationality"),
    (AGE_COLUMN, "Age"),
    (COUNTRY_COLUMN, "Country"),
];

/// 將原始表轉成乾淨表：每筆原始記錄恰好產生一列
pub fn transform(raw: &RawTable) -> Result<CleanTable> {
    let selected: Vec<&str> = RENAME_COLUMNS
        .iter()
        .map(|(source, _)| *source)
        .filter(|source| raw.has_column(source))
        .collect();

    if !selected.contains(&AGE_COLUMN) {
        tracing::error!("❌ Column '{}' (Age) was not found in the data", AGE_COLUMN);
        return Err(EtlError::MissingColumnError {
            column: AGE_COLUMN.to_string(),
        });
    }

    for (source, label) in RENAME_COLUMNS {
        if !selected.contains(&source) {
            tracing::warn!(
                "🔶 Column '{}' not found, {} will be empty",
                source,
                label
            );
        }
    }

    let mut clean = CleanTable {
        rows: Vec::with_capacity(raw.len()),
        ..CleanTable::default()
    };

    let mut missing_ages = 0usize;
    for record in &raw.rows {
        let row = clean_row(record, &mut clean);
        if row.age.is_none() {
            missing_ages += 1;
        }
        clean.rows.push(row);
    }

    if missing_ages > 0 {
        tracing::warn!(
            "🔶 {} of {} records have no usable age; they are kept with an empty age range",
            missing_ages,
            clean.len()
        );
    }

    tracing::debug!(
        "Categories: {} genders, {} nationalities, {} countries",
        clean.genders.len(),
        clean.nationalities.len(),
        clean.countries.len()
    );

    Ok(clean)
}

fn clean_row(record: &Record, clean: &mut CleanTable) -> CleanRow {
    let age = record.get(AGE_COLUMN).and_then(parse_age);

    CleanRow {
        gender: encode(&mut clean.genders, record.get(GENDER_COLUMN)),
        first_name: text_value(record.get(FIRST_NAME_COLUMN)),
        last_name: text_value(record.get(LAST_NAME_COLUMN)),
        nationality: encode(&mut clean.nationalities, record.get(NATIONALITY_COLUMN)),
        age,
        country: encode(&mut clean.countries, record.get(COUNTRY_COLUMN)),
        age_range: age.and_then(AgeRange::from_age),
    }
}

fn encode(dictionary: &mut Dictionary, value: Option<&Value>) -> Option<u32> {
    text_value(value).map(|text| dictionary.encode(&text))
}

fn text_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 年齡可能是整數、整數值的浮點數或數字字串，其餘視為缺值
pub fn parse_age(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;
    use serde_json::json;

    fn user(gender: &str, first: &str, nat: &str, age: Value, country: &str) -> Value {
        json!({
            "gender": gender,
            "name": {"title": "Mx", "first": first, "last": "Doe"},
            "nat": nat,
            "dob": {"date": "1980-05-01T00:00:00Z", "age": age},
            "location": {"city": "Somewhere", "country": country},
            "email": "someone@example.com"
        })
    }

    #[test]
    fn test_transform_renames_and_bins() {
        let raw = normalize(&json!({"results": [
            user("female", "Ana", "ES", json!(29), "Spain"),
            user("male", "Tom", "GB", json!(70), "United Kingdom"),
            user("female", "Eva", "ES", json!(17), "Spain"),
        ]}))
        .unwrap();

        let clean = transform(&raw).unwrap();

        assert_eq!(clean.len(), 3);
        let first = &clean.rows[0];
        assert_eq!(clean.gender_of(first), Some("female"));
        assert_eq!(first.first_name.as_deref(), Some("Ana"));
        assert_eq!(first.last_name.as_deref(), Some("Doe"));
        assert_eq!(clean.nationality_of(first), Some("ES"));
        assert_eq!(first.age, Some(29));
        assert_eq!(clean.country_of(first), Some("Spain"));
        assert_eq!(first.age_range, Some(AgeRange::From18To29));

        assert_eq!(clean.rows[1].age_range, Some(AgeRange::From70));
        assert_eq!(clean.rows[2].age_range, None);
    }

    #[test]
    fn test_categorical_columns_share_codes() {
        let raw = normalize(&json!({"results": [
            user("female", "Ana", "ES", json!(30), "Spain"),
            user("male", "Tom", "GB", json!(40), "United Kingdom"),
            user("female", "Eva", "ES", json!(50), "Spain"),
        ]}))
        .unwrap();

        let clean = transform(&raw).unwrap();

        assert_eq!(clean.genders.values(), &["female".to_string(), "male".to_string()]);
        assert_eq!(clean.rows[0].gender, clean.rows[2].gender);
        assert_eq!(clean.rows[0].country, clean.rows[2].country);
        assert_eq!(clean.countries.len(), 2);
    }

    #[test]
    fn test_missing_age_column_is_an_error() {
        let raw = normalize(&json!({"results": [
            {"gender": "female", "name": {"first": "Ana", "last": "Ruiz"}, "nat": "ES"}
        ]}))
        .unwrap();

        let err = transform(&raw).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { ref column } if column == "dob.age"));
    }

    #[test]
    fn test_empty_results_fail_on_age_column() {
        let raw = normalize(&json!({"results": []})).unwrap();
        assert!(matches!(
            transform(&raw),
            Err(EtlError::MissingColumnError { .. })
        ));
    }

    #[test]
    fn test_unusable_age_keeps_row() {
        let raw = normalize(&json!({"results": [
            user("female", "Ana", "ES", json!(null), "Spain"),
            user("male", "Tom", "GB", json!("45"), "United Kingdom"),
            user("male", "Max", "DE", json!(33.0), "Germany"),
        ]}))
        .unwrap();

        let clean = transform(&raw).unwrap();
        assert_eq!(clean.len(), 3);
        assert_eq!(clean.rows[0].age, None);
        assert_eq!(clean.rows[0].age_range, None);
        assert_eq!(clean.rows[1].age, Some(45));
        assert_eq!(clean.rows[2].age_range, Some(AgeRange::From30To39));
    }

    #[test]
    fn test_other_missing_columns_are_left_empty() {
        let raw = normalize(&json!({"results": [{"dob": {"age": 52}}]})).unwrap();
        let clean = transform(&raw).unwrap();

        let row = &clean.rows[0];
        assert_eq!(row.gender, None);
        assert_eq!(row.first_name, None);
        assert_eq!(row.age_range, Some(AgeRange::From50To59));
        assert!(clean.genders.is_empty());
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age(&json!(42)), Some(42));
        assert_eq!(parse_age(&json!(42.0)), Some(42));
        assert_eq!(parse_age(&json!(42.5)), None);
        assert_eq!(parse_age(&json!(" 61 ")), Some(61));
        assert_eq!(parse_age(&json!("n/a")), None);
        assert_eq!(parse_age(&json!(true)), None);
    }
}
