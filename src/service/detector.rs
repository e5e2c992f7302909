use axum::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::Detection;

/// 目标检测器 (外部协作方)
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> AppResult<Vec<Detection>>;
}

/// 固定返回预设检测结果，用于测试和离线演示
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<Detection>,
}

impl StaticDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

#[async_trait]
impl Detector for StaticDetector {
    async fn detect(&self, _image: &[u8]) -> AppResult<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

/// sidecar 返回的单条检测，类别可以是 id 或名称
#[derive(Debug, Clone, Deserialize)]
struct RawDetection {
    #[serde(default)]
    class_id: Option<u32>,
    #[serde(default)]
    class_name: Option<String>,
    confidence: f32,
}

/// 调用外部推理服务：POST 图片字节，返回 `[{class_id | class_name, confidence}]`
pub struct HttpDetector {
    client: Client,
    url: String,
    labels: Vec<String>,
}

impl HttpDetector {
    pub fn new(url: impl Into<String>, labels: Vec<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            labels,
        })
    }

    fn resolve(&self, raw: RawDetection) -> Detection {
        let class_name = match (raw.class_name, raw.class_id) {
            (Some(name), _) => name,
            (None, Some(id)) => label_for(&self.labels, id),
            (None, None) => String::new(),
        };
        Detection::new(class_name, raw.confidence)
    }
}

/// 类别 id -> 名称，超出标签表时返回 `class_<id>`
pub fn label_for(labels: &[String], class_id: u32) -> String {
    labels
        .get(class_id as usize)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, image: &[u8]) -> AppResult<Vec<Detection>> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Detector(format!("{}: {}", status, body)));
        }

        let raw: Vec<RawDetection> = response.json().await?;
        tracing::debug!("detector returned {} raw detections", raw.len());
        Ok(raw.into_iter().map(|r| self.resolve(r)).collect())
    }
}
