//! 会话层错误类型定义

use thiserror::Error;

/// 会话故障
///
/// 控制会话中的任何故障都会立即终止当前的控制调用，驱动不会再下发命令，也不会重试。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionFault {
    /// 网络 / 连接错误
    #[error("Network error: {0}")]
    Network(String),

    /// 控制器触发了安全反射（碰撞阈值、速度不连续等）
    #[error("Control reflex triggered: {reason}")]
    Reflex { reason: String },

    /// 协议错误（模式不匹配、会话状态错误）
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// 命令数值非法（非有限值、非刚体变换）
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    /// 动力学模型不可用
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

impl SessionFault {
    /// 会话本身是否已不可用
    ///
    /// `Reflex` 与 `InvalidCommand` 之后会话仍然可以重新进入控制模式；
    /// 其余故障需要重新建立连接。
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionFault::Network(_)
            | SessionFault::Protocol(_)
            | SessionFault::ModelUnavailable(_) => true,
            SessionFault::Reflex { .. } | SessionFault::InvalidCommand { .. } => false,
        }
    }

    pub(crate) fn invalid_command(reason: impl Into<String>) -> Self {
        SessionFault::InvalidCommand {
            reason: reason.into(),
        }
    }

    pub(crate) fn reflex(reason: impl Into<String>) -> Self {
        SessionFault::Reflex {
            reason: reason.into(),
        }
    }
}
