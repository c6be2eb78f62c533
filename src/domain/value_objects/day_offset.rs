use serde::{Deserialize, Serialize};
use std::fmt;

/// 旅程内の日番号（0始まり）。-1は「未スケジュール（保存済みスポット）」を表す番兵値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayOffset(i32);

impl DayOffset {
    pub const UNSCHEDULED: DayOffset = DayOffset(-1);

    pub fn new(value: i32) -> Result<Self, String> {
        if value < -1 {
            return Err(format!("Day offset must be >= -1, got {value}"));
        }
        Ok(Self(value))
    }

    pub fn scheduled(index: u32) -> Self {
        Self(index as i32)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn is_unscheduled(&self) -> bool {
        self.0 < 0
    }

    /// スケジュール済みの場合のみ日インデックスを返す
    pub fn index(&self) -> Option<u32> {
        if self.is_unscheduled() {
            None
        } else {
            Some(self.0 as u32)
        }
    }
}

impl fmt::Display for DayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unscheduled() {
            write!(f, "unscheduled")
        } else {
            write!(f, "day {}", self.0)
        }
    }
}
