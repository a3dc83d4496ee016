//! Slint 计时器适配

use std::time::Duration;

use crate::model::deferred::{Callback, TimerFactory};

/// 在 Slint 事件循环上创建单次计时器
///
/// 计时器由 Slint 持有，触发后自动释放，必须在事件循环线程上使用。
#[derive(Debug, Default, Clone, Copy)]
pub struct SlintTimers;

impl TimerFactory for SlintTimers {
    fn single_shot(&self, delay: Duration, callback: Callback) {
        slint::Timer::single_shot(delay, callback);
    }
}
