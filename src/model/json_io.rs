//! JSON文件读写：基于注入的传输层完成同步读取、序列化与写入

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::deferred::{call_later, TimerFactory};
use crate::model::transport::{FileLocation, FileTransport, TransportStatus};

#[derive(Error, Debug)]
pub enum JsonUtilError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSON序列化失败: {0}")]
    Serialization(serde_json::Error),
}

impl JsonUtilError {
    /// 文件不存在（区别于文件存在但为空）
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// 读取结果：空文件与有内容的文件是两种不同的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Empty,
    Value(Value),
}

impl ReadOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// 序列化风格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStyle {
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub style: WriteStyle,
}

/// 写入回执
///
/// `put` 返回时宿主不一定已经让同一事件循环上的观察者看到新内容，
/// 依赖写入结果的逻辑必须通过 [`WriteTicket::when_visible`] 延后执行。
#[derive(Debug, Clone)]
#[must_use = "写入状态码需要调用方检查"]
pub struct WriteTicket {
    pub location: FileLocation,
    pub status: TransportStatus,
}

impl WriteTicket {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 等宿主处理完当前事件后再执行 `f`，此时写入已对读取可见
    pub fn when_visible<T, F>(self, timers: &T, f: F)
    where
        T: TimerFactory + ?Sized,
        F: FnOnce(WriteTicket) + 'static,
    {
        call_later(timers, move || f(self));
    }
}

/// 读取并解析JSON文件
pub fn read_file<T>(transport: &T, location: &FileLocation) -> Result<ReadOutcome, JsonUtilError>
where
    T: FileTransport + ?Sized,
{
    let body = transport.get(location).map_err(|e| {
        tracing::warn!("读取失败: {}: {}", location, e);
        e
    })?;
    if body.is_empty() {
        tracing::debug!("文件内容为空: {}", location);
        return Ok(ReadOutcome::Empty);
    }
    let value: Value = serde_json::from_str(&body)?;
    tracing::debug!("读取成功: {}，{} 字节", location, body.len());
    Ok(ReadOutcome::Value(value))
}

/// 读取并反序列化为指定类型，空文件返回 None
pub fn read_file_as<D, T>(transport: &T, location: &FileLocation) -> Result<Option<D>, JsonUtilError>
where
    D: DeserializeOwned,
    T: FileTransport + ?Sized,
{
    match read_file(transport, location)? {
        ReadOutcome::Empty => Ok(None),
        ReadOutcome::Value(v) => Ok(Some(serde_json::from_value(v)?)),
    }
}

/// 将值序列化为紧凑JSON并写入
pub fn save_file<T, S>(transport: &T, location: &FileLocation, value: &S) -> Result<WriteTicket, JsonUtilError>
where
    T: FileTransport + ?Sized,
    S: Serialize + ?Sized,
{
    save_file_with(transport, location, value, WriteOptions::default())
}

/// 按指定选项序列化并写入；序列化失败时不会调用传输层
pub fn save_file_with<T, S>(
    transport: &T,
    location: &FileLocation,
    value: &S,
    options: WriteOptions,
) -> Result<WriteTicket, JsonUtilError>
where
    T: FileTransport + ?Sized,
    S: Serialize + ?Sized,
{
    let body = match options.style {
        WriteStyle::Compact => serde_json::to_string(value),
        WriteStyle::Pretty => serde_json::to_string_pretty(value),
    }
    .map_err(JsonUtilError::Serialization)?;

    let status = transport.put(location, &body);
    if status.is_success() {
        tracing::debug!("写入完成: {}，状态码 {}", location, status);
    } else {
        tracing::warn!("写入返回非成功状态: {}，状态码 {}", location, status);
    }
    Ok(WriteTicket {
        location: location.clone(),
        status,
    })
}
