//! # 甲板布局文件读写
//!
//! 布局以 `resource,slot` 两列 CSV 保存，调用方在两次调用之间持久化。
//!
//! ## 依赖关系
//! - 被 `commands/tier.rs` 调用
//! - 使用 `models/layout.rs` 的 Layout, LayoutEntry
//! - 使用 `csv` + `serde` 序列化

use crate::error::{PlatenormError, Result};
use crate::models::{Layout, LayoutEntry};

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// 从文件读取布局
pub fn read_layout(path: &Path) -> Result<Layout> {
    let file = File::open(path).map_err(|e| PlatenormError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    read_layout_from(file)
}

/// 从任意输入读取布局
pub fn read_layout_from<R: Read>(input: R) -> Result<Layout> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let entries = reader
        .deserialize::<LayoutEntry>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Layout::from_entries(entries)
}

/// 写入布局文件
pub fn write_layout(path: &Path, layout: &Layout) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    serialize_layout(&mut wtr, layout)?;
    wtr.flush().map_err(|e| PlatenormError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 写入任意输出（如标准输出）
pub fn write_layout_to<W: Write>(output: W, layout: &Layout) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(output);
    serialize_layout(&mut wtr, layout)?;
    wtr.flush().map_err(|e| PlatenormError::FileWriteError {
        path: "<output>".to_string(),
        source: e,
    })?;
    Ok(())
}

fn serialize_layout<W: Write>(wtr: &mut csv::Writer<W>, layout: &Layout) -> Result<()> {
    for entry in layout.to_entries() {
        wtr.serialize(entry)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_layout() {
        let content = "resource,slot\npartial_50, B3\ntips_1000,C4\n";
        let layout = read_layout_from(content.as_bytes()).unwrap();
        assert_eq!(layout.to_entries().len(), 2);
        assert_eq!(layout.slot_of("partial_50"), Some("B3"));
        assert_eq!(layout.occupant("C4"), Some("tips_1000"));
    }

    #[test]
    fn test_layout_file_round_trip() {
        let layout = Layout::new().with("partial_50", "B4").with("tips_1000", "B3");
        let mut buffer = Vec::new();
        write_layout_to(&mut buffer, &layout).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("resource,slot\n"));
        assert_eq!(read_layout_from(buffer.as_slice()).unwrap(), layout);
    }

    #[test]
    fn test_read_layout_conflict() {
        let content = "resource,slot\npartial_50,B3\ntips_1000,B3\n";
        assert!(matches!(
            read_layout_from(content.as_bytes()),
            Err(PlatenormError::SlotOccupied { .. })
        ));
    }
}
