//! 控制流程错误类型

use armloop_driver::SessionFault;
use armloop_tools::ConfigError;
use thiserror::Error;

/// 控制流程错误
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// 参数错误，在任何硬件交互之前检出
    #[error("Invalid parameter `{param}`: {reason}")]
    InvalidParameter { param: &'static str, reason: String },

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 会话故障（控制调用已终止）
    #[error(transparent)]
    Session(#[from] SessionFault),

    /// 遥测线程 panic
    #[error("Telemetry reporter thread panicked")]
    TelemetryPanicked,
}

impl WorkflowError {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidParameter {
            param,
            reason: reason.into(),
        }
    }

    /// 是否为使用错误（参数或配置问题）
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidParameter { .. } | WorkflowError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = WorkflowError::invalid("print_rate", "must be > 0");
        assert_eq!(err.to_string(), "Invalid parameter `print_rate`: must be > 0");
        assert!(err.is_usage_error());

        let err: WorkflowError = SessionFault::Network("unreachable".to_string()).into();
        assert_eq!(err.to_string(), "Network error: unreachable");
        assert!(!err.is_usage_error());
    }
}
