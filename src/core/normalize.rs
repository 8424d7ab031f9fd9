use crate::domain::model::{Record, RawTable};
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// API 回應中存放記錄陣列的欄位
pub const RECORDS_FIELD: &str = "results";

/// 將 API 回應攤平成原始表，巢狀鍵以 `.` 串接
pub fn normalize(body: &Value) -> Result<RawTable> {
    let items = body
        .as_object()
        .and_then(|obj| obj.get(RECORDS_FIELD))
        .ok_or_else(|| EtlError::MissingDataError {
            message: format!("response has no '{}' field", RECORDS_FIELD),
        })?
        .as_array()
        .ok_or_else(|| EtlError::MissingDataError {
            message: format!("'{}' is not an array", RECORDS_FIELD),
        })?;

    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| EtlError::MissingDataError {
            message: format!("record {} is not a JSON object", index),
        })?;

        let flat = flatten_object(obj);
        let mut data = HashMap::with_capacity(flat.len());
        for (key, value) in flat {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
            data.insert(key, value);
        }
        rows.push(Record { data });
    }

    tracing::debug!(
        "Normalized {} records into {} columns",
        rows.len(),
        columns.len()
    );

    Ok(RawTable { columns, rows })
}

/// 依鍵出現順序攤平單一物件；陣列與純量保留為葉節點
pub fn flatten_object(obj: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into("", obj, &mut out);
    out
}

fn flatten_into(prefix: &str, obj: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => flatten_into(&path, nested, out),
            other => out.push((path, other.clone())),
        }
    }
}
