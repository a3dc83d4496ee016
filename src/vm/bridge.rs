//! VM桥接层：连接Slint UI与JSON读写操作
//!
//! 注意：此模块的具体实现在main.rs中，因为依赖于Slint生成的类型
//! 这里只提供公共常量与不依赖UI的辅助函数

use serde_json::Value;

use crate::model::json_io::ReadOutcome;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "文件加载完成";
pub const STATUS_EMPTY_FILE: &str = "文件为空";
pub const STATUS_SAVED_VERIFIED: &str = "保存成功，已重新读取确认";
pub const STATUS_SAVE_MISMATCH: &str = "保存后读取内容不一致";
pub const STATUS_NO_LOCATION: &str = "未指定文件位置";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 编辑器中显示的文本
pub fn editor_text(outcome: &ReadOutcome) -> String {
    match outcome {
        ReadOutcome::Empty => String::new(),
        ReadOutcome::Value(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
    }
}

/// 解析编辑器文本；空白内容视为 null
pub fn parse_editor_text(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
}
