use crate::domain::model::{ArtifactReport, CleanTable, RawTable, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 以相對路徑寫出產出檔
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn results(&self) -> usize;
    fn seed(&self) -> &str;
    fn format(&self) -> &str {
        "json"
    }
    fn timeout_seconds(&self) -> Option<u64> {
        None
    }
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
    fn output_path(&self) -> &str;
    fn write_statistics(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// 擷取 API 回應本體
    async fn extract(&self) -> Result<serde_json::Value>;
    /// 選欄、改名、類別編碼與年齡分箱
    async fn transform(&self, raw: &RawTable) -> Result<CleanTable>;
    /// 寫出原始表；失敗只回報，不中斷
    async fn load_raw(&self, raw: &RawTable) -> ArtifactReport;
    /// 寫出乾淨表、統計表與圖表，每個產出各自隔離
    async fn load(&self, result: &TransformResult) -> Vec<ArtifactReport>;
}
