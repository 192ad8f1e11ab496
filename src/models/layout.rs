//! # 甲板布局数据模型
//!
//! 资源（枪头盒等耗材）到甲板槽位的显式映射，由调用方持有并在调用之间传递。
//!
//! ## 依赖关系
//! - 被 `engine/tier.rs`, `engine/actuator.rs`, `parsers/layout.rs` 使用
//! - 使用 `serde` 派生 CSV 行结构

use crate::error::{PlatenormError, Result};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 布局文件中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub resource: String,
    pub slot: String,
}

/// 资源 → 槽位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    slots: BTreeMap<String, String>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加资源
    pub fn with(mut self, resource: impl Into<String>, slot: impl Into<String>) -> Self {
        self.set(resource, slot);
        self
    }

    pub fn set(&mut self, resource: impl Into<String>, slot: impl Into<String>) {
        self.slots.insert(resource.into(), slot.into());
    }

    pub fn slot_of(&self, resource: &str) -> Option<&str> {
        self.slots.get(resource).map(String::as_str)
    }

    /// 当前占用该槽位的资源
    pub fn occupant(&self, slot: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|(_, s)| s.as_str() == slot)
            .map(|(r, _)| r.as_str())
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(r, s)| (r.as_str(), s.as_str()))
    }

    /// 应用一次移动；资源必须位于 `from`，目标槽位必须空闲
    pub fn apply(&mut self, relocation: &Relocation) -> Result<()> {
        match self.slot_of(&relocation.resource) {
            None => return Err(PlatenormError::UnknownResource(relocation.resource.clone())),
            Some(slot) if slot != relocation.from => {
                return Err(PlatenormError::InvalidArgument(format!(
                    "'{}' is at {}, not {}",
                    relocation.resource, slot, relocation.from
                )));
            }
            Some(_) => {}
        }

        if let Some(occupant) = self.occupant(&relocation.to) {
            if occupant != relocation.resource {
                return Err(PlatenormError::SlotOccupied {
                    resource: relocation.resource.clone(),
                    slot: relocation.to.clone(),
                    occupant: occupant.to_string(),
                });
            }
        }

        self.set(relocation.resource.clone(), relocation.to.clone());
        Ok(())
    }

    pub fn from_entries(entries: Vec<LayoutEntry>) -> Result<Self> {
        let mut layout = Layout::new();
        for entry in entries {
            if layout.slot_of(&entry.resource).is_some() {
                return Err(PlatenormError::InvalidArgument(format!(
                    "resource '{}' listed twice",
                    entry.resource
                )));
            }
            if let Some(occupant) = layout.occupant(&entry.slot) {
                return Err(PlatenormError::SlotOccupied {
                    resource: entry.resource,
                    slot: entry.slot,
                    occupant: occupant.to_string(),
                });
            }
            layout.set(entry.resource, entry.slot);
        }
        Ok(layout)
    }

    pub fn to_entries(&self) -> Vec<LayoutEntry> {
        self.slots
            .iter()
            .map(|(resource, slot)| LayoutEntry {
                resource: resource.clone(),
                slot: slot.clone(),
            })
            .collect()
    }
}

/// 一次资源移动
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub resource: String,
    pub from: String,
    pub to: String,
}

impl Relocation {
    pub fn new(resource: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// 反向移动
    pub fn reversed(&self) -> Self {
        Self::new(self.resource.clone(), self.to.clone(), self.from.clone())
    }
}

impl fmt::Display for Relocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.resource, self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_relocation() {
        let mut layout = Layout::new().with("partial_50", "B3").with("tips_1000", "C4");

        // B3 被占用
        let blocked = Relocation::new("tips_1000", "C4", "B3");
        assert!(matches!(
            layout.apply(&blocked),
            Err(PlatenormError::SlotOccupied { .. })
        ));

        layout.apply(&Relocation::new("partial_50", "B3", "B4")).unwrap();
        layout.apply(&blocked).unwrap();
        assert_eq!(layout.slot_of("partial_50"), Some("B4"));
        assert_eq!(layout.slot_of("tips_1000"), Some("B3"));
        assert_eq!(layout.occupant("B3"), Some("tips_1000"));
    }

    #[test]
    fn test_apply_wrong_origin() {
        let mut layout = Layout::new().with("partial_50", "B3");
        assert!(layout.apply(&Relocation::new("partial_50", "A1", "B4")).is_err());
        assert!(layout.apply(&Relocation::new("ghost", "A1", "B4")).is_err());
    }

    #[test]
    fn test_entries_reject_duplicates() {
        let entries = vec![
            LayoutEntry {
                resource: "a".into(),
                slot: "B3".into(),
            },
            LayoutEntry {
                resource: "b".into(),
                slot: "B3".into(),
            },
        ];
        assert!(Layout::from_entries(entries).is_err());
    }
}
