use serde::{Deserialize, Serialize};
use std::fmt;

/// 视频年龄分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRestriction {
    AR13,
    AR18,
    UR,
}

impl AgeRestriction {
    pub const ALL: [AgeRestriction; 3] = [AgeRestriction::AR13, AgeRestriction::AR18, AgeRestriction::UR];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRestriction::AR13 => "AR13",
            AgeRestriction::AR18 => "AR18",
            AgeRestriction::UR => "UR",
        }
    }
}

impl fmt::Display for AgeRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoUpload {
    pub filename: String,
    pub age_restriction: AgeRestriction,
    pub message: String,
}

/// 视频列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoList {
    pub videos: Vec<String>,
}
