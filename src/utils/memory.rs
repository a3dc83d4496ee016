//! 进程内传输层：无需真实文件系统即可运行读写流程

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    io,
    rc::Rc,
};

use crate::model::deferred::{call_later, TimerFactory};
use crate::model::transport::{FileLocation, FileTransport, TransportStatus};

#[derive(Default)]
struct Files {
    contents: HashMap<FileLocation, String>,
    read_only: HashSet<FileLocation>,
}

/// 基于内存的文件传输
///
/// 可选的可见性延迟模拟宿主行为：PUT 立即返回状态码，
/// 内容要等事件循环处理下一轮事件时才生效。
pub struct MemoryTransport {
    files: Rc<RefCell<Files>>,
    lag: Option<Rc<dyn TimerFactory>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            files: Rc::new(RefCell::new(Files::default())),
            lag: None,
        }
    }

    /// 写入在下一轮事件循环才可见
    pub fn with_visibility_lag<T: TimerFactory + 'static>(timers: T) -> Self {
        Self {
            files: Rc::new(RefCell::new(Files::default())),
            lag: Some(Rc::new(timers)),
        }
    }

    /// 直接放入文件内容（立即可见）
    pub fn insert(&self, location: impl Into<FileLocation>, body: impl Into<String>) {
        self.files
            .borrow_mut()
            .contents
            .insert(location.into(), body.into());
    }

    /// 标记为只读，之后的写入返回 403
    pub fn set_read_only(&self, location: impl Into<FileLocation>) {
        self.files.borrow_mut().read_only.insert(location.into());
    }
}

impl FileTransport for MemoryTransport {
    fn get(&self, location: &FileLocation) -> io::Result<String> {
        self.files
            .borrow()
            .contents
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} 不存在", location)))
    }

    fn put(&self, location: &FileLocation, body: &str) -> TransportStatus {
        if self.files.borrow().read_only.contains(location) {
            return TransportStatus::FORBIDDEN;
        }
        match &self.lag {
            None => {
                self.insert(location.clone(), body);
            }
            Some(timers) => {
                let files = self.files.clone();
                let location = location.clone();
                let body = body.to_string();
                call_later(&**timers, move || {
                    files.borrow_mut().contents.insert(location, body);
                });
            }
        }
        TransportStatus::OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::deferred::VirtualTimers;

    #[test]
    fn test_put_then_get() {
        let t = MemoryTransport::new();
        let loc = FileLocation::new("mem://a.json");
        assert_eq!(t.put(&loc, "{}"), TransportStatus::OK);
        assert_eq!(t.get(&loc).unwrap(), "{}");

        // 覆盖语义
        t.put(&loc, "[]");
        assert_eq!(t.get(&loc).unwrap(), "[]");
    }

    #[test]
    fn test_read_only_location() {
        let t = MemoryTransport::new();
        t.insert("mem://locked.json", "1");
        t.set_read_only("mem://locked.json");

        let loc = FileLocation::new("mem://locked.json");
        assert_eq!(t.put(&loc, "2"), TransportStatus::FORBIDDEN);
        assert_eq!(t.get(&loc).unwrap(), "1", "只读文件内容不应改变");
    }

    #[test]
    fn test_visibility_lag() {
        let timers = VirtualTimers::new();
        let t = MemoryTransport::with_visibility_lag(timers.clone());
        let loc = FileLocation::new("mem://lagged.json");
        t.insert(loc.clone(), "old");

        assert_eq!(t.put(&loc, "new"), TransportStatus::OK);
        assert_eq!(t.get(&loc).unwrap(), "old", "事件循环未运行前应仍为旧内容");

        timers.run_until_idle();
        assert_eq!(t.get(&loc).unwrap(), "new");
    }
}
