//! 延迟调用：在同一事件循环上延时执行一次回调
//!
//! 宿主计时器通过 [`TimerFactory`] 注入，而不是全局创建。
//! 生产环境使用 `utils::timer::SlintTimers`，无界面环境和测试使用 [`VirtualTimers`]。

use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BinaryHeap,
    rc::Rc,
    time::Duration,
};

/// 零参数回调，所有权交给调度器
pub type Callback = Box<dyn FnOnce() + 'static>;

/// 宿主计时器能力：每次调用创建一个单次计时器
pub trait TimerFactory {
    /// 在 `delay` 之后于宿主事件循环上调用一次 `callback`
    fn single_shot(&self, delay: Duration, callback: Callback);
}

impl<T: TimerFactory + ?Sized> TimerFactory for &T {
    fn single_shot(&self, delay: Duration, callback: Callback) {
        (**self).single_shot(delay, callback)
    }
}

impl<T: TimerFactory + ?Sized> TimerFactory for Rc<T> {
    fn single_shot(&self, delay: Duration, callback: Callback) {
        (**self).single_shot(delay, callback)
    }
}

/// 延迟 `delay` 后执行一次 `f`
pub fn set_timeout<T, F>(timers: &T, delay: Duration, f: F)
where
    T: TimerFactory + ?Sized,
    F: FnOnce() + 'static,
{
    tracing::debug!("注册延迟回调: {}ms", delay.as_millis());
    timers.single_shot(delay, Box::new(f));
}

/// 毫秒版本的 [`set_timeout`]
pub fn set_timeout_ms<T, F>(timers: &T, delay_ms: u64, f: F)
where
    T: TimerFactory + ?Sized,
    F: FnOnce() + 'static,
{
    set_timeout(timers, Duration::from_millis(delay_ms), f);
}

/// 在当前事件处理完成后执行 `f`（零延迟）
pub fn call_later<T, F>(timers: &T, f: F)
where
    T: TimerFactory + ?Sized,
    F: FnOnce() + 'static,
{
    set_timeout(timers, Duration::ZERO, f);
}

struct PendingTimer {
    due: Duration,
    seq: u64,
    callback: Callback,
}

impl PartialEq for PendingTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for PendingTimer {}

impl PartialOrd for PendingTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTimer {
    // BinaryHeap 是最大堆，这里反转顺序让最早到期的排在堆顶
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct VirtualClock {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<PendingTimer>,
}

/// 虚拟时钟事件循环
///
/// 时间只在 [`advance`](Self::advance) / [`run_until_idle`](Self::run_until_idle) 时前进，
/// 到期回调按到期时间排序，同一时刻按注册顺序执行。回调内部可以继续注册新的计时器。
#[derive(Clone, Default)]
pub struct VirtualTimers {
    inner: Rc<RefCell<VirtualClock>>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前虚拟时间
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// 尚未触发的计时器数量
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// 时间前进 `by`，执行期间到期的所有回调，返回执行数量
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let fired = self.fire_until(Some(target));
        self.inner.borrow_mut().now = target;
        fired
    }

    /// 一直运行到队列为空，返回执行数量
    pub fn run_until_idle(&self) -> usize {
        self.fire_until(None)
    }

    fn fire_until(&self, limit: Option<Duration>) -> usize {
        let mut fired = 0;
        loop {
            // 取出回调后立即释放借用，回调里可能再次注册计时器
            let next = {
                let mut clock = self.inner.borrow_mut();
                let due_now = match clock.queue.peek() {
                    Some(top) => limit.map_or(true, |l| top.due <= l),
                    None => false,
                };
                if !due_now {
                    None
                } else {
                    clock.queue.pop().map(|timer| {
                        if timer.due > clock.now {
                            clock.now = timer.due;
                        }
                        timer.callback
                    })
                }
            };
            match next {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }
}

impl TimerFactory for VirtualTimers {
    fn single_shot(&self, delay: Duration, callback: Callback) {
        let mut clock = self.inner.borrow_mut();
        let due = clock.now.saturating_add(delay);
        let seq = clock.next_seq;
        clock.next_seq += 1;
        clock.queue.push(PendingTimer { due, seq, callback });
    }
}
