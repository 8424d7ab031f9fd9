use crate::domain::model::{AgeRange, CleanTable, StatisticRow, StatisticsSummary};
use std::collections::{BTreeMap, HashMap};

pub const METRIC_AVERAGE_AGE: &str = "Edad_Media_Total";
pub const METRIC_GENDER_COUNT: &str = "Conteo_Genero";
pub const METRIC_AVERAGE_AGE_BY_GENDER: &str = "Edad_Media_Genero";
pub const GENERAL_CATEGORY: &str = "General";

pub fn summarize(clean: &CleanTable) -> StatisticsSummary {
    let average_age = mean(clean.ages());
    let gender_counts =
        value_counts(clean.rows.iter().filter_map(|row| clean.gender_of(row)));

    // 依性別分組；沒有任何年齡的組別平均為空值
    let mut groups: BTreeMap<&str, (i128, usize)> = BTreeMap::new();
    for row in &clean.rows {
        if let Some(gender) = clean.gender_of(row) {
            let entry = groups.entry(gender).or_insert((0, 0));
            if let Some(age) = row.age {
                entry.0 += i128::from(age);
                entry.1 += 1;
            }
        }
    }
    let avg_age_by_gender = groups
        .into_iter()
        .map(|(gender, (sum, count))| {
            let avg = (count > 0).then(|| sum as f64 / count as f64);
            (gender.to_string(), avg)
        })
        .collect();

    StatisticsSummary {
        average_age,
        gender_counts,
        avg_age_by_gender,
    }
}

/// 忽略缺值的平均；沒有任何值時回傳 `None`。以 i128 累加避免溢位
pub fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values.fold((0i128, 0usize), |(sum, count), v| {
        (sum + i128::from(v), count + 1)
    });
    (count > 0).then(|| sum as f64 / count as f64)
}

/// 類別計數，依數量遞減，數量相同時依名稱遞增以維持穩定輸出
pub fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

pub fn country_counts(clean: &CleanTable) -> Vec<(String, usize)> {
    value_counts(clean.rows.iter().filter_map(|row| clean.country_of(row)))
}

/// 六個年齡區間的計數（含零），依區間自然順序
pub fn age_range_counts(clean: &CleanTable) -> Vec<(AgeRange, usize)> {
    AgeRange::ALL
        .iter()
        .map(|range| {
            let count = clean
                .rows
                .iter()
                .filter(|row| row.age_range == Some(*range))
                .count();
            (*range, count)
        })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 長格式統計表：整體平均、各性別人數、各性別平均年齡
pub fn tidy_rows(summary: &StatisticsSummary) -> Vec<StatisticRow> {
    let mut rows = Vec::with_capacity(
        1 + summary.gender_counts.len() + summary.avg_age_by_gender.len(),
    );

    rows.push(StatisticRow {
        metric: METRIC_AVERAGE_AGE.to_string(),
        category: GENERAL_CATEGORY.to_string(),
        value: summary.average_age.map(round2),
    });

    for (gender, count) in &summary.gender_counts {
        rows.push(StatisticRow {
            metric: METRIC_GENDER_COUNT.to_string(),
            category: gender.clone(),
            value: Some(*count as f64),
        });
    }

    for (gender, avg) in &summary.avg_age_by_gender {
        rows.push(StatisticRow {
            metric: METRIC_AVERAGE_AGE_BY_GENDER.to_string(),
            category: gender.clone(),
            value: avg.map(round2),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CleanRow;

    fn table(rows: &[(&str, Option<i64>, &str)]) -> CleanTable {
        let mut clean = CleanTable::default();
        for (gender, age, country) in rows {
            let gender = clean.genders.encode(gender);
            let country = clean.countries.encode(country);
            clean.rows.push(CleanRow {
                gender: Some(gender),
                age: *age,
                country: Some(country),
                age_range: age.and_then(AgeRange::from_age),
                ..CleanRow::default()
            });
        }
        clean
    }

    #[test]
    fn test_summarize_counts_and_means() {
        let clean = table(&[
            ("male", Some(20), "Spain"),
            ("female", Some(31), "Spain"),
            ("female", Some(42), "France"),
            ("male", Some(60), "Spain"),
            ("female", Some(75), "Brazil"),
        ]);

        let summary = summarize(&clean);

        assert_eq!(summary.average_age, Some(45.6));
        assert_eq!(
            summary.gender_counts,
            vec![("female".to_string(), 3), ("male".to_string(), 2)]
        );
        let total: usize = summary.gender_counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total, clean.len());

        assert_eq!(summary.avg_age_by_gender[0].0, "female");
        assert!((summary.avg_age_by_gender[0].1.unwrap() - 49.333333).abs() < 1e-5);
        assert_eq!(summary.avg_age_by_gender[1], ("male".to_string(), Some(40.0)));
    }

    #[test]
    fn test_mean_ignores_missing_ages() {
        let clean = table(&[("male", Some(30), "Spain"), ("male", None, "Spain")]);
        let summary = summarize(&clean);
        assert_eq!(summary.average_age, Some(30.0));
        assert_eq!(summary.gender_counts, vec![("male".to_string(), 2)]);
    }

    #[test]
    fn test_empty_table_has_undefined_mean() {
        let summary = summarize(&CleanTable::default());
        assert_eq!(summary.average_age, None);
        assert!(summary.gender_counts.is_empty());
        assert!(summary.avg_age_by_gender.is_empty());
    }

    #[test]
    fn test_group_without_ages_has_undefined_mean() {
        let clean = table(&[("male", Some(30), "Spain"), ("female", None, "Spain")]);
        let summary = summarize(&clean);
        assert_eq!(
            summary.avg_age_by_gender,
            vec![("female".to_string(), None), ("male".to_string(), Some(30.0))]
        );
    }

    #[test]
    fn test_value_counts_break_ties_by_label() {
        let counts = value_counts(["b", "a", "c", "c"].into_iter());
        assert_eq!(
            counts,
            vec![
                ("c".to_string(), 2),
                ("a".to_string(), 1),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_age_range_counts_keep_natural_order() {
        let clean = table(&[
            ("male", Some(71), "Spain"),
            ("male", Some(71), "Spain"),
            ("male", Some(25), "Spain"),
            ("male", Some(10), "Spain"),
        ]);

        let counts = age_range_counts(&clean);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0], (AgeRange::From18To29, 1));
        assert_eq!(counts[1], (AgeRange::From30To39, 0));
        assert_eq!(counts[5], (AgeRange::From70, 2));
    }

    #[test]
    fn test_tidy_rows_round_to_two_decimals() {
        let summary = StatisticsSummary {
            average_age: Some(47.23456),
            gender_counts: vec![("female".to_string(), 3), ("male".to_string(), 2)],
            avg_age_by_gender: vec![
                ("female".to_string(), Some(49.333333)),
                ("male".to_string(), Some(40.005)),
            ],
        };

        let rows = tidy_rows(&summary);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].metric, METRIC_AVERAGE_AGE);
        assert_eq!(rows[0].category, GENERAL_CATEGORY);
        assert_eq!(rows[0].value, Some(47.23));
        assert_eq!(rows[1].metric, METRIC_GENDER_COUNT);
        assert_eq!(rows[1].value, Some(3.0));
        assert_eq!(rows[3].metric, METRIC_AVERAGE_AGE_BY_GENDER);
        assert_eq!(rows[3].value, Some(49.33));
    }

    #[test]
    fn test_huge_ages_do_not_overflow() {
        let raw = crate::core::normalize::normalize(&serde_json::json!({
            "results": [
                {"gender": "male", "dob": {"age": 9000000000000000000i64}},
                {"gender": "male", "dob": {"age": 9000000000000000000i64}}
            ]
        }))
        .unwrap();
        let clean = crate::core::transform::transform(&raw).unwrap();

        let summary = summarize(&clean);

        assert_eq!(summary.average_age, Some(9.0e18));
        assert_eq!(
            summary.avg_age_by_gender,
            vec![("male".to_string(), Some(9.0e18))]
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(45.678), 45.68);
        assert_eq!(round2(45.0), 45.0);
        assert_eq!(round2(-1.234), -1.23);
    }
}
