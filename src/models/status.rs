use crate::models::MergedRow;
use serde::{Deserialize, Serialize};

/// 字段比对状态, 排序即严重程度: Ok < Warn < Miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Ok,
    Warn,
    Miss,
}

impl FieldState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldState::Ok => "ok",
            FieldState::Warn => "warn",
            FieldState::Miss => "miss",
        }
    }
}

/// 五个比对字段的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStates {
    pub classification: FieldState,
    pub description: FieldState,
    pub quantity: FieldState,
    pub unit: FieldState,
    pub value: FieldState,
}

impl FieldStates {
    pub fn all(&self) -> [FieldState; 5] {
        [
            self.classification,
            self.description,
            self.quantity,
            self.unit,
            self.value,
        ]
    }

    /// 最坏状态
    pub fn worst(&self) -> FieldState {
        self.all().into_iter().max().unwrap_or(FieldState::Ok)
    }

    pub fn has_diff(&self) -> bool {
        self.all().iter().any(|s| *s != FieldState::Ok)
    }
}

/// 分组后的展示行 (与配对行同构)
pub type GroupedRow = MergedRow;

/// 带比对状态的展示行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    #[serde(flatten)]
    pub row: GroupedRow,
    pub states: FieldStates,
    pub severity: FieldState,
    pub has_diff: bool,
}
