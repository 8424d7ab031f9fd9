use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;

/// 對使用者資料 API 發出單次 GET，不重試
#[derive(Debug, Clone, Default)]
pub struct UserApiClient {
    client: Client,
}

impl UserApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch<C: ConfigProvider>(&self, config: &C) -> Result<serde_json::Value> {
        let results = config.results().to_string();
        let mut request = self.client.get(config.api_endpoint()).query(&[
            ("results", results.as_str()),
            ("seed", config.seed()),
            ("format", config.format()),
        ]);

        // 添加自定義標頭
        for (key, value) in config.headers() {
            request = request.header(key, value);
        }

        // 設定超時，未設定時沿用 client 預設
        if let Some(timeout) = config.timeout_seconds() {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!(
            "Making API request to: {} (results={}, seed={})",
            config.api_endpoint(),
            results,
            config.seed()
        );

        let response = request.send().await.map_err(|e| {
            tracing::error!("❌ Error extracting data: {}", e);
            EtlError::ApiError(e)
        })?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!("❌ API request failed with status: {}", status);
            return Err(EtlError::HttpStatusError {
                status,
                url: config.api_endpoint().to_string(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    struct TestConfig {
        endpoint: String,
    }

    impl ConfigProvider for TestConfig {
        fn api_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn results(&self) -> usize {
            3
        }

        fn seed(&self) -> &str {
            "abc"
        }

        fn output_path(&self) -> &str {
            "unused"
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_query_parameters() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("results", "3")
                .query_param("seed", "abc")
                .query_param("format", "json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": [], "info": {"seed": "abc"}}));
        });

        let config = TestConfig {
            endpoint: server.url("/api"),
        };
        let body = UserApiClient::new().fetch(&config).await.unwrap();

        api_mock.assert();
        assert_eq!(body["info"]["seed"], "abc");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_an_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(503);
        });

        let config = TestConfig {
            endpoint: server.url("/api"),
        };
        let err = UserApiClient::new().fetch(&config).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, EtlError::HttpStatusError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200).body("<html>not json</html>");
        });

        let config = TestConfig {
            endpoint: server.url("/api"),
        };
        let result = UserApiClient::new().fetch(&config).await;

        assert!(matches!(result, Err(EtlError::ApiError(_))));
    }
}
