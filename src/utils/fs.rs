//! IO helper: local file transport for `file://` locations

use std::{fs, io, path::PathBuf};

use crate::model::transport::{FileLocation, FileTransport, TransportStatus};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 本地文件系统传输
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileTransport;

fn resolve(location: &FileLocation) -> io::Result<PathBuf> {
    location.to_local_path().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("不支持的文件位置: {}", location),
        )
    })
}

impl FileTransport for LocalFileTransport {
    /// 读取整个文件为文本
    ///
    /// 去掉开头的 UTF-8 BOM；非法字节按替换字符解码，交给JSON解析报错
    fn get(&self, location: &FileLocation) -> io::Result<String> {
        let path = resolve(location)?;
        let raw = fs::read(path)?;
        let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
        Ok(String::from_utf8_lossy(body).into_owned())
    }

    /// 覆盖写入文件，IO错误映射为状态码
    fn put(&self, location: &FileLocation, body: &str) -> TransportStatus {
        let result = resolve(location).and_then(|path| fs::write(path, body));
        match result {
            Ok(()) => TransportStatus::OK,
            Err(e) => {
                tracing::warn!("写入文件失败: {}: {}", location, e);
                TransportStatus::from_io_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::json_io::{read_file, save_file, JsonUtilError, ReadOutcome};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// 创建临时JSON文件用于测试
    fn create_test_json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(content.as_bytes()).expect("写入临时文件失败");
        file
    }

    fn file_url(path: &std::path::Path) -> FileLocation {
        let url = url::Url::from_file_path(path).expect("临时文件应为绝对路径");
        FileLocation::new(url.as_str())
    }

    #[test]
    fn test_read_via_file_url() {
        let temp_file = create_test_json_file(r#"{"name": "测试", "value": 42}"#);
        let outcome = read_file(&LocalFileTransport, &file_url(temp_file.path())).unwrap();
        assert_eq!(outcome, ReadOutcome::Value(json!({"name": "测试", "value": 42})));
    }

    #[test]
    fn test_read_empty_file() {
        let temp_file = create_test_json_file("");
        let outcome = read_file(&LocalFileTransport, &temp_file.path().into()).unwrap();
        assert!(outcome.is_empty(), "空文件应返回 Empty");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loc = FileLocation::from(dir.path().join("missing.json").as_path());
        let err = read_file(&LocalFileTransport, &loc).unwrap_err();
        assert!(err.is_not_found(), "缺失文件应为 NotFound: {:?}", err);
    }

    #[test]
    fn test_unsupported_scheme() {
        let loc = FileLocation::new("http://example.com/a.json");
        let err = LocalFileTransport.get(&loc).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert_eq!(LocalFileTransport.put(&loc, "{}"), TransportStatus::BAD_REQUEST);
    }

    #[test]
    fn test_write_status_reachable_and_unreachable() {
        let dir = tempfile::tempdir().unwrap();

        let reachable = FileLocation::from(dir.path().join("out.json").as_path());
        let ticket = save_file(&LocalFileTransport, &reachable, &json!({"a": 1})).unwrap();
        assert_eq!(ticket.status, TransportStatus::OK);

        let unreachable = FileLocation::from(dir.path().join("no_such_dir").join("out.json").as_path());
        let ticket = save_file(&LocalFileTransport, &unreachable, &json!({"a": 1})).unwrap();
        assert_eq!(ticket.status, TransportStatus::NOT_FOUND);
    }

    #[test]
    fn test_write_replaces_content() {
        let temp_file = create_test_json_file(r#"{"old": true, "padding": "xxxxxxxxxxxxxxxx"}"#);
        let loc = file_url(temp_file.path());

        let _ = save_file(&LocalFileTransport, &loc, &json!([1])).unwrap();
        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "[1]", "写入应覆盖原有内容");
        assert_eq!(
            read_file(&LocalFileTransport, &loc).unwrap(),
            ReadOutcome::Value(json!([1]))
        );
    }

    #[test]
    fn test_read_percent_encoded_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my 设置.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();

        let url = url::Url::from_file_path(&path).expect("应为绝对路径");
        assert!(url.as_str().contains("%20"), "URL应包含百分号编码: {}", url);

        let outcome = read_file(&LocalFileTransport, &FileLocation::new(url.as_str())).unwrap();
        assert_eq!(outcome, ReadOutcome::Value(json!({"a": 1})));

        // 写入同样按解码后的路径进行
        let ticket = save_file(&LocalFileTransport, &FileLocation::new(url.as_str()), &json!([2])).unwrap();
        assert_eq!(ticket.status, TransportStatus::OK);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[2]");
    }

    #[test]
    fn test_read_invalid_utf8_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.json");
        fs::write(&path, [0xff, 0xfe, b'{']).unwrap();

        let err = read_file(&LocalFileTransport, &path.as_path().into()).unwrap_err();
        assert!(matches!(err, JsonUtilError::Parse(_)), "非法UTF-8应为解析错误: {:?}", err);
    }

    #[test]
    fn test_read_strips_utf8_bom() {
        let temp_file = create_test_json_file("\u{feff}{\"a\":1}");
        let outcome = read_file(&LocalFileTransport, &temp_file.path().into()).unwrap();
        assert_eq!(outcome, ReadOutcome::Value(json!({"a": 1})));

        // 只有BOM的文件视为空文件
        let bom_only = create_test_json_file("\u{feff}");
        let outcome = read_file(&LocalFileTransport, &bom_only.path().into()).unwrap();
        assert!(outcome.is_empty());
    }
}
