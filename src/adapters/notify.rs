use crate::domain::model::{Toast, ToastLevel};
use crate::domain::ports::Notifier;
use std::sync::{Arc, Mutex};

/// 把 toast 寫成 tracing 事件
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Info => tracing::info!("💬 {}", toast.message),
            ToastLevel::Warning => tracing::warn!("⚠️ {}", toast.message),
            ToastLevel::Alert => tracing::error!("🚨 {}", toast.message),
        }
    }
}

/// 保留所有 toast，方便測試或嵌入時檢查
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts().pop()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!("toast ({:?}): {}", toast.level, toast.message);
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}
