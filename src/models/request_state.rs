use std::fmt;

/// 单个工作流的请求状态
///
/// Idle → InFlight → Succeeded / Failed → （重置或再次提交）Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl RequestState {
    pub fn is_in_flight(self) -> bool {
        self == RequestState::InFlight
    }

    /// 是否已结算（成功或失败）
    pub fn is_settled(self) -> bool {
        matches!(self, RequestState::Succeeded | RequestState::Failed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestState::Idle => "空闲",
            RequestState::InFlight => "请求中",
            RequestState::Succeeded => "成功",
            RequestState::Failed => "失败",
        };
        f.write_str(label)
    }
}
