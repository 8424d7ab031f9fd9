use crate::adapters::http::UserApiClient;
use crate::core::aggregate::tidy_rows;
use crate::core::charts::{
    render_age_histogram, render_age_range_bars, render_country_bars, AGE_HISTOGRAM_FILENAME,
    AGE_RANGE_BARS_FILENAME, COUNTRY_BARS_FILENAME,
};
use crate::core::report::{
    clean_csv, raw_csv, statistics_csv, CLEAN_FILENAME, RAW_FILENAME, STATISTICS_FILENAME,
};
use crate::core::transform::transform;
use crate::core::{CleanTable, ConfigProvider, Pipeline, RawTable, Storage, TransformResult};
use crate::domain::model::ArtifactReport;
use crate::utils::error::{EtlError, Result};

pub struct UserPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) api: UserApiClient,
}

impl<S: Storage, C: ConfigProvider> UserPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            api: UserApiClient::new(),
        }
    }

    /// 每個產出獨立寫入：編碼或寫檔失敗只記錄，不影響其他產出
    async fn write_artifact(
        &self,
        name: &str,
        path: &str,
        data: Result<Vec<u8>>,
    ) -> ArtifactReport {
        let written = match data {
            Ok(bytes) => self.storage.write_file(path, &bytes).await,
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => {
                tracing::info!(
                    "💾 Saved {} to: {}/{}",
                    name,
                    self.config.output_path(),
                    path
                );
                ArtifactReport::written(name, path)
            }
            Err(e) => {
                tracing::error!("❌ Error saving {} ({}): {}", name, path, e);
                ArtifactReport::failed(name, path, e.to_string())
            }
        }
    }

    async fn write_chart(
        &self,
        name: &str,
        path: &str,
        rendered: anyhow::Result<String>,
    ) -> ArtifactReport {
        let data = rendered
            .map(String::into_bytes)
            .map_err(|e| EtlError::RenderError {
                chart: name.to_string(),
                message: e.to_string(),
            });
        self.write_artifact(name, path, data).await
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for UserPipeline<S, C> {
    async fn extract(&self) -> Result<serde_json::Value> {
        tracing::info!(
            "📡 Extracting {} users from {}",
            self.config.results(),
            self.config.api_endpoint()
        );
        let body = self.api.fetch(&self.config).await?;
        tracing::info!("📡 API request completed");
        Ok(body)
    }

    async fn transform(&self, raw: &RawTable) -> Result<CleanTable> {
        tracing::info!("🔄 Transforming {} records", raw.len());
        let clean = transform(raw)?;
        tracing::info!("🔄 Transform complete: {} clean rows", clean.len());
        Ok(clean)
    }

    async fn load_raw(&self, raw: &RawTable) -> ArtifactReport {
        self.write_artifact("raw data", RAW_FILENAME, raw_csv(raw)).await
    }

    async fn load(&self, result: &TransformResult) -> Vec<ArtifactReport> {
        let clean = &result.clean;
        let stats = &result.statistics;
        let mut reports = Vec::with_capacity(5);

        reports.push(
            self.write_artifact("clean data", CLEAN_FILENAME, clean_csv(clean))
                .await,
        );

        if self.config.write_statistics() {
            reports.push(
                self.write_artifact(
                    "statistics",
                    STATISTICS_FILENAME,
                    statistics_csv(&tidy_rows(stats)),
                )
                .await,
            );
        }

        tracing::info!("📈 Generating charts...");
        reports.push(
            self.write_chart(
                "age histogram",
                AGE_HISTOGRAM_FILENAME,
                render_age_histogram(clean, stats),
            )
            .await,
        );
        reports.push(
            self.write_chart(
                "country chart",
                COUNTRY_BARS_FILENAME,
                render_country_bars(clean),
            )
            .await,
        );
        reports.push(
            self.write_chart(
                "age range chart",
                AGE_RANGE_BARS_FILENAME,
                render_age_range_bars(clean),
            )
            .await,
        );

        reports
    }
}
