//! 程序入口：初始化日志、加载 Slint UI，并绑定JSON读写回调

use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use slint::ComponentHandle;
use tracing_subscriber::fmt::SubscriberBuilder;

use json_timer_utils::{
    read_file, save_file, vm::bridge::*, FileLocation, LocalFileTransport, ReadOutcome, SlintTimers,
};

slint::include_modules!();

/// VM桥接器：管理UI与读写操作的交互
struct ViewModelBridge {
    transport: LocalFileTransport,
    timers: SlintTimers,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow) -> Self {
        let bridge = Self {
            transport: LocalFileTransport,
            timers: SlintTimers,
        };
        bridge.setup_callbacks(app_window);
        bridge
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        // === 浏览文件回调 ===
        {
            let app_window_weak = app_window.as_weak();
            app_window.on_browse_file(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    if let Some(path) = Self::show_file_dialog() {
                        app_window.set_file_location(path.to_string_lossy().to_string().into());
                    }
                }
            });
        }

        // === 加载文件回调 ===
        {
            let transport = self.transport;
            let app_window_weak = app_window.as_weak();
            app_window.on_load_file(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_load_file(&app_window, transport);
                }
            });
        }

        // === 保存文件回调 ===
        {
            let transport = self.transport;
            let timers = self.timers;
            let app_window_weak = app_window.as_weak();
            app_window.on_save_file(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_save_file(&app_window, transport, timers);
                }
            });
        }
    }

    /// 初始化UI状态
    fn initialize_ui(&self, app_window: &AppWindow, initial: Option<String>) {
        app_window.set_status_message(STATUS_READY.into());
        app_window.set_editor_text("".into());
        if let Some(location) = initial {
            app_window.set_file_location(location.into());
            Self::handle_load_file(app_window, self.transport);
        }
    }

    /// 显示文件选择对话框
    fn show_file_dialog() -> Option<PathBuf> {
        use rfd::FileDialog;

        let file_path = FileDialog::new()
            .add_filter("JSON文件", &["json"])
            .add_filter("所有文件", &["*"])
            .set_title("选择JSON文件")
            .pick_file();

        match file_path {
            Some(path) => {
                tracing::info!("用户选择了文件: {}", path.display());
                Some(path)
            }
            None => {
                tracing::info!("用户取消了文件选择");
                None
            }
        }
    }

    fn current_location(app_window: &AppWindow) -> Option<FileLocation> {
        let raw = app_window.get_file_location().to_string();
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(FileLocation::new(raw))
        }
    }

    /// 处理加载文件操作
    fn handle_load_file(app_window: &AppWindow, transport: LocalFileTransport) {
        let Some(location) = Self::current_location(app_window) else {
            app_window.set_status_message(STATUS_NO_LOCATION.into());
            return;
        };

        let start_time = Instant::now();
        match read_file(&transport, &location) {
            Ok(outcome) => {
                let status = if outcome.is_empty() { STATUS_EMPTY_FILE } else { STATUS_LOADED };
                app_window.set_editor_text(editor_text(&outcome).into());
                app_window.set_status_message(status.into());
                tracing::info!("文件加载成功: {}，耗时: {}ms", location, start_time.elapsed().as_millis());
            }
            Err(e) => {
                let error_msg = format!("{}{}", STATUS_ERROR_PREFIX, e);
                app_window.set_status_message(error_msg.into());
                tracing::error!("文件加载失败: {}: {}", location, e);
            }
        }
    }

    /// 处理保存文件操作
    ///
    /// 写入对本轮事件不一定可见，确认读取通过 `when_visible` 延后到下一轮
    fn handle_save_file(app_window: &AppWindow, transport: LocalFileTransport, timers: SlintTimers) {
        let Some(location) = Self::current_location(app_window) else {
            app_window.set_status_message(STATUS_NO_LOCATION.into());
            return;
        };

        let value = match parse_editor_text(&app_window.get_editor_text()) {
            Ok(v) => v,
            Err(e) => {
                let error_msg = format!("{}JSON格式错误: {}", STATUS_ERROR_PREFIX, e);
                app_window.set_status_message(error_msg.into());
                tracing::error!("编辑器内容不是有效JSON: {}", e);
                return;
            }
        };

        let ticket = match save_file(&transport, &location, &value) {
            Ok(ticket) => ticket,
            Err(e) => {
                let error_msg = format!("{}{}", STATUS_ERROR_PREFIX, e);
                app_window.set_status_message(error_msg.into());
                tracing::error!("文件保存失败: {}", e);
                return;
            }
        };

        if !ticket.is_success() {
            let error_msg = format!("{}保存失败，状态码 {}", STATUS_ERROR_PREFIX, ticket.status);
            app_window.set_status_message(error_msg.into());
            tracing::error!("文件保存失败: {}，状态码 {}", location, ticket.status);
            return;
        }

        let app_window_weak = app_window.as_weak();
        ticket.when_visible(&timers, move |ticket| {
            let Some(app_window) = app_window_weak.upgrade() else {
                return;
            };
            match read_file(&transport, &ticket.location) {
                Ok(ReadOutcome::Value(saved)) if saved == value => {
                    app_window.set_status_message(STATUS_SAVED_VERIFIED.into());
                    tracing::info!("文件保存成功: {}", ticket.location);
                }
                Ok(_) => {
                    app_window.set_status_message(STATUS_SAVE_MISMATCH.into());
                    tracing::warn!("保存后读取内容不一致: {}", ticket.location);
                }
                Err(e) => {
                    let error_msg = format!("{}{}", STATUS_ERROR_PREFIX, e);
                    app_window.set_status_message(error_msg.into());
                    tracing::error!("保存后重新读取失败: {}", e);
                }
            }
        });
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let app = AppWindow::new().context("UI 初始化失败")?;

    // 第一个命令行参数作为初始文件位置
    let initial = std::env::args().nth(1);

    let bridge = ViewModelBridge::new(&app);
    bridge.initialize_ui(&app, initial);

    tracing::info!("应用启动成功，UI已初始化");
    app.run().context("事件循环异常退出")?;
    Ok(())
}
