//! 通知中心 - 业务能力层
//!
//! 两个工作流共享的只追加通知面板。每条通知独立计时、到期自动移除，
//! 不排队、不限量、不合并重复内容。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::models::{Notification, Severity};

#[derive(Debug)]
struct Inner {
    entries: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
    ttl: Duration,
}

/// 通知中心
///
/// clone 后指向同一个面板。
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    /// 创建通知中心
    ///
    /// # 参数
    /// - `ttl`: 每条通知的存活时长
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                ttl,
            }),
        }
    }

    /// 发送通知，返回通知编号
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        match severity {
            Severity::Info => info!("🔔 {}", message),
            Severity::Error => error!("❌ {}", message),
        }

        self.lock().push(Notification {
            id,
            message,
            severity,
            created_at: chrono::Local::now(),
        });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move {
                    tokio::time::sleep(inner.ttl).await;
                    inner
                        .entries
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .retain(|n| n.id != id);
                });
            }
            Err(_) => warn!("没有可用的 tokio 运行时，通知 #{} 不会自动消失", id),
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Info)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }

    /// 当前仍在显示的通知（按创建顺序）
    pub fn active(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
