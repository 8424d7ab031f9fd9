use crate::core::aggregate::{age_range_counts, country_counts};
use crate::domain::model::{CleanTable, StatisticsSummary};
use anyhow::{anyhow, Result};
use plotters::prelude::*;

pub const AGE_HISTOGRAM_FILENAME: &str = "age_distribution.svg";
pub const COUNTRY_BARS_FILENAME: &str = "country_bars.svg";
pub const AGE_RANGE_BARS_FILENAME: &str = "age_range_bars.svg";

pub const HISTOGRAM_BINS: usize = 20;
pub const TOP_COUNTRIES: usize = 20;

const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const FONT: &str = "sans-serif";
const COUNTRY_LABEL_ANGLE: f64 = 75.0;
/// 標籤錨點與 x 軸之間的像素距離
const LABEL_OFFSET: i32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    /// `counts.len() + 1` 個邊界
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// 等寬分箱；最後一箱右側封閉。所有值相同時範圍前後各擴 0.5
pub fn histogram_bins(values: &[f64], bins: usize) -> Option<HistogramBins> {
    if values.is_empty() || bins == 0 {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (low, high) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (high - low) / bins as f64;

    let edges = (0..=bins).map(|i| low + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - low) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Some(HistogramBins { edges, counts })
}

/// 年齡直方圖，含平均年齡標記線
pub fn render_age_histogram(clean: &CleanTable, stats: &StatisticsSummary) -> Result<String> {
    let ages: Vec<f64> = clean.ages().map(|age| age as f64).collect();
    let bins =
        histogram_bins(&ages, HISTOGRAM_BINS).ok_or_else(|| anyhow!("no ages to plot"))?;

    let (first, last) = match (bins.edges.first(), bins.edges.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(anyhow!("histogram has no edges")),
    };
    let tallest = bins.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let y_max = tallest * 1.1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Age Distribution ({} Users)", clean.len()),
                (FONT, 26).into_font(),
            )
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(first..last, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Age")
            .y_desc("Frequency")
            .draw()?;

        let bars = bins.counts.iter().enumerate().map(|(i, count)| {
            [(bins.edges[i], 0.0), (bins.edges[i + 1], *count as f64)]
        });
        chart.draw_series(
            bars.clone()
                .map(|corners| Rectangle::new(corners, LIGHT_GREEN.filled())),
        )?;
        chart.draw_series(
            bars.map(|corners| Rectangle::new(corners, BLACK.stroke_width(1))),
        )?;

        if let Some(average) = stats.average_age {
            chart
                .draw_series(LineSeries::new(
                    vec![(average, 0.0), (average, y_max)],
                    RED.stroke_width(2),
                ))?
                .label(format!("Mean age: {:.2}", average))
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2))
                });

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
    }

    Ok(svg)
}

/// 人數最多的前 20 個國家
pub fn render_country_bars(clean: &CleanTable) -> Result<String> {
    let mut counts = country_counts(clean);
    counts.truncate(TOP_COUNTRIES);

    render_bar_chart(
        &format!("Users by Country (Top {})", TOP_COUNTRIES),
        "Country",
        "Number of Users",
        &counts,
        LIGHT_CORAL,
        true,
        (1200, 650),
    )
}

/// 年齡區間人數，依區間順序而非數量排序
pub fn render_age_range_bars(clean: &CleanTable) -> Result<String> {
    let counts: Vec<(String, usize)> = age_range_counts(clean)
        .into_iter()
        .map(|(range, count)| (range.label().to_string(), count))
        .collect();

    render_bar_chart(
        "Users by Age Range",
        "Age Range",
        "Number of Users",
        &counts,
        ORANGE,
        false,
        (800, 500),
    )
}

fn render_bar_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    bars: &[(String, usize)],
    color: RGBColor,
    rotate_labels: bool,
    size: (u32, u32),
) -> Result<String> {
    if bars.is_empty() {
        return Err(anyhow!("no categories to plot"));
    }

    let tallest = bars.iter().map(|(_, count)| *count).max().unwrap_or(0) as u32;
    let y_max = (tallest + tallest / 10).max(tallest + 1);

    // 旋轉的標籤由 tilted_labels 另外寫入
    let label_for = |value: &SegmentValue<i32>| match value {
        SegmentValue::CenterOf(index) if !rotate_labels => bars
            .get(*index as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let mut svg = String::new();
    let mut anchors = Vec::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 24).into_font())
            .margin(15)
            .x_label_area_size(if rotate_labels { 150 } else { 45 })
            .y_label_area_size(55)
            .build_cartesian_2d((0..bars.len() as i32).into_segmented(), 0u32..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_style((FONT, 13).into_font())
            .x_label_formatter(&label_for)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(6)
                .data(
                    bars.iter()
                        .enumerate()
                        .map(|(index, (_, count))| (index as i32, *count as u32)),
                ),
        )?;

        if rotate_labels {
            for (index, (label, _)) in bars.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(SegmentValue::CenterOf(index as i32), 0));
                anchors.push((label.as_str(), x, y + LABEL_OFFSET));
            }
        }

        root.present()?;
    }

    if rotate_labels {
        svg = tilted_labels(svg, &anchors, COUNTRY_LABEL_ANGLE)?;
    }

    Ok(svg)
}

/// 在 `</svg>` 前插入以錨點為右端、逆時針傾斜 `angle` 度的標籤
fn tilted_labels(svg: String, anchors: &[(&str, i32, i32)], angle: f64) -> Result<String> {
    let close = svg
        .rfind("</svg>")
        .ok_or_else(|| anyhow!("rendered chart has no closing </svg> tag"))?;

    let mut labels = String::new();
    for (label, x, y) in anchors {
        labels.push_str(&format!(
            "<text x=\"{x}\" y=\"{y}\" dy=\"0.5ex\" text-anchor=\"end\" \
             font-family=\"{FONT}\" font-size=\"{size}\" fill=\"#000000\" \
             transform=\"rotate({rotation}, {x}, {y})\">{text}</text>\n",
            size = 12.0 / 1.24,
            rotation = -angle,
            text = escape_xml(label),
        ));
    }

    let (head, tail) = svg.split_at(close);
    Ok(format!("{}{}{}", head, labels, tail))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
