use axum::async_trait;
use rand::seq::SliceRandom;
use std::path::Path;
use std::time::Duration;

use crate::models::AgeRestriction;

/// 视频年龄分级能力
///
/// 目前只有固定结果和随机桩两种实现，没有真实模型。
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, video: &Path) -> AgeRestriction;
}

/// 总是返回同一个分级
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    label: AgeRestriction,
}

impl FixedClassifier {
    pub fn new(label: AgeRestriction) -> Self {
        Self { label }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _video: &Path) -> AgeRestriction {
        self.label
    }
}

/// 随机桩：人为延迟后均匀随机选择一个分级
#[derive(Debug, Clone, Copy)]
pub struct RandomClassifier {
    delay: Duration,
}

impl RandomClassifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Classifier for RandomClassifier {
    async fn classify(&self, video: &Path) -> AgeRestriction {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let label = *AgeRestriction::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&AgeRestriction::UR);
        tracing::debug!("stub classification {} -> {}", video.display(), label);
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_classifier_is_deterministic() {
        let classifier = FixedClassifier::new(AgeRestriction::AR18);
        for _ in 0..5 {
            assert_eq!(classifier.classify(Path::new("a.mp4")).await, AgeRestriction::AR18);
        }
    }

    #[tokio::test]
    async fn random_classifier_picks_a_known_label() {
        let classifier = RandomClassifier::new(Duration::ZERO);
        let label = classifier.classify(Path::new("a.mp4")).await;
        assert!(AgeRestriction::ALL.contains(&label));
    }
}
