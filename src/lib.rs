//! JSON文件与计时器工具库
//!
//! 提供延迟调用、同步JSON文件读取与写入功能
//! 宿主计时器与文件传输以能力接口注入，便于在没有界面的环境中测试

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::deferred::{call_later, set_timeout, set_timeout_ms, Callback, TimerFactory, VirtualTimers};
pub use model::json_io::{
    read_file, read_file_as, save_file, save_file_with, JsonUtilError, ReadOutcome, WriteOptions, WriteStyle,
    WriteTicket,
};
pub use model::transport::{FileLocation, FileTransport, TransportStatus};
pub use utils::{fs::LocalFileTransport, memory::MemoryTransport, timer::SlintTimers};
