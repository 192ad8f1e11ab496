//! # 数据文件定位
//!
//! 在数据目录中查找最新的读板仪导出文件，可选轮询等待新文件出现。
//!
//! ## 功能
//! - glob 模式匹配（`glob::Pattern`）
//! - 可选递归搜索（`walkdir`）
//! - 按修改时间取最新文件
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `utils/progress.rs` 显示等待 spinner

use crate::error::{PlatenormError, Result};
use crate::utils::progress;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use walkdir::WalkDir;

/// 数据文件定位器
pub struct DataFileLocator {
    dir: PathBuf,
    pattern: glob::Pattern,
    recursive: bool,
}

impl DataFileLocator {
    pub fn new(dir: &Path, pattern: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| {
            PlatenormError::InvalidArgument(format!("invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            pattern,
            recursive: false,
        })
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 最新的匹配文件；`since` 给定时只接受此后修改的文件
    pub fn latest(&self, since: Option<SystemTime>) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(PlatenormError::DirectoryNotFound {
                path: self.dir.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        WalkDir::new(&self.dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| self.pattern.matches(name))
                    .unwrap_or(false)
            })
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                match since {
                    Some(t) if modified < t => None,
                    _ => Some((modified, e.into_path())),
                }
            })
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path)
            .ok_or_else(|| PlatenormError::NoFilesFound {
                dir: self.dir.display().to_string(),
                pattern: self.pattern.as_str().to_string(),
            })
    }

    /// 轮询直到出现新文件或超时
    pub fn wait_for_new(&self, timeout: Duration, poll: Duration) -> Result<PathBuf> {
        let started = SystemTime::now();
        let clock = Instant::now();
        let spinner = progress::create_spinner(&format!(
            "Waiting for '{}' in {}",
            self.pattern.as_str(),
            self.dir.display()
        ));

        loop {
            match self.latest(Some(started)) {
                Ok(path) => {
                    spinner.finish_and_clear();
                    return Ok(path);
                }
                Err(PlatenormError::NoFilesFound { .. }) if clock.elapsed() < timeout => {
                    thread::sleep(poll);
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e);
                }
            }
        }
    }
}
