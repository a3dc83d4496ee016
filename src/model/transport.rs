//! 同步文件传输能力：GET 读取文本，PUT 写入文本并返回状态码

use std::{fmt, io, path::PathBuf};

use url::Url;

/// 文件位置：`file://` URL 或普通路径，具体寻址交给传输层
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocation(String);

impl FileLocation {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 解析为本地路径；非 `file` 协议的 URL 返回 None
    ///
    /// `file://` URL 按标准解析（百分号编码会被解码），无法解析为URL的按普通路径处理。
    pub fn to_local_path(&self) -> Option<PathBuf> {
        match Url::parse(&self.0) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
            // 单字母协议是 Windows 盘符，如 "C:\\data.json"
            Ok(url) if url.scheme().len() > 1 && !url.cannot_be_a_base() => None,
            _ => Some(PathBuf::from(&self.0)),
        }
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileLocation {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FileLocation {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&std::path::Path> for FileLocation {
    fn from(p: &std::path::Path) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

/// 写入操作返回的传输状态码，由调用方自行判断成功与否
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportStatus(pub u16);

impl TransportStatus {
    pub const OK: Self = Self(200);
    pub const BAD_REQUEST: Self = Self(400);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const INTERNAL_ERROR: Self = Self(500);

    pub fn code(self) -> u16 {
        self.0
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// 将写入时的IO错误映射为状态码
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NOT_FOUND,
            io::ErrorKind::PermissionDenied => Self::FORBIDDEN,
            io::ErrorKind::Unsupported | io::ErrorKind::InvalidInput => Self::BAD_REQUEST,
            _ => Self::INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 宿主的同步文件传输
pub trait FileTransport {
    /// 阻塞读取全部文本；空字符串表示没有内容
    fn get(&self, location: &FileLocation) -> io::Result<String>;

    /// 阻塞写入（覆盖语义），失败只通过状态码体现
    fn put(&self, location: &FileLocation, body: &str) -> TransportStatus;
}

impl<T: FileTransport + ?Sized> FileTransport for &T {
    fn get(&self, location: &FileLocation) -> io::Result<String> {
        (**self).get(location)
    }

    fn put(&self, location: &FileLocation, body: &str) -> TransportStatus {
        (**self).put(location, body)
    }
}
