use crate::core::aggregate::summarize;
use crate::core::normalize::normalize;
use crate::core::report::echo_statistics;
use crate::core::Pipeline;
use crate::domain::model::{ArtifactOutcome, RunReport, TransformResult};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    output_path: String,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P, output_path: impl Into<String>) -> Self {
        Self {
            pipeline,
            output_path: output_path.into(),
        }
    }

    /// 擷取與轉換失敗會中止流程；個別輸出檔失敗只記錄在報告中
    pub async fn run(&self) -> Result<RunReport> {
        println!("Starting ETL process...");
        let mut report = RunReport {
            output_path: self.output_path.clone(),
            ..RunReport::default()
        };

        // Extract
        let body = self.pipeline.extract().await?;

        // Normalize + raw
        println!("Normalizing and saving raw data...");
        let raw = normalize(&body)?;
        report.raw_rows = raw.len();
        println!("Extracted {} records", raw.len());
        report.artifacts.push(self.pipeline.load_raw(&raw).await);

        // Transform
        println!("Transforming data...");
        let clean = self.pipeline.transform(&raw).await?;
        report.clean_rows = clean.len();
        println!("Transformed {} records", clean.len());

        // Aggregate
        println!("Calculating statistics...");
        let statistics = summarize(&clean);
        echo_statistics(&statistics);
        let result = TransformResult { clean, statistics };

        // Load
        report.artifacts.extend(self.pipeline.load(&result).await);

        for artifact in &report.artifacts {
            match &artifact.outcome {
                ArtifactOutcome::Written => println!("Saved {}: {}", artifact.name, artifact.path),
                ArtifactOutcome::Failed(message) => {
                    println!("Could not save {}: {}", artifact.name, message)
                }
            }
        }

        let failures = report.failures().count();
        if failures > 0 {
            tracing::warn!(
                "🔶 ETL finished with {} of {} outputs failing",
                failures,
                report.artifacts.len()
            );
        }
        println!(
            "\nETL process completed. Files saved in '{}'.",
            self.output_path
        );

        Ok(report)
    }
}
