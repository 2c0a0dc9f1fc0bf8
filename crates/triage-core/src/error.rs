//! 错误定义模块

use thiserror::Error;

/// 分诊系统统一错误类型
///
/// 引擎操作只会产生 `NotFound` 与 `InvalidArgument`，其余变体仅供配置与服务层使用。
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效参数: {0}")]
    InvalidArgument(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

impl TriageError {
    /// 患者记录不存在
    pub fn patient_not_found(id: impl std::fmt::Display) -> Self {
        TriageError::NotFound(format!("Patient {} not found", id))
    }
}

/// 分诊系统统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
