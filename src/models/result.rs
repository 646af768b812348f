use crate::models::ClassifiedRow;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 全局字段状态计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub ok: usize,
    pub warn: usize,
    pub miss: usize,
    pub total: usize,
}

/// 某单位下的数量合计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTotal {
    pub unit: String,
    pub quantity: BigDecimal,
}

/// 单侧汇总 (总金额 / 按单位数量)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub currency: String,
    pub total_value: BigDecimal,
    /// 展示用金额, 没有任何金额时为 "—"
    pub total_display: String,
    pub items_with_value: usize,
    pub total_items: usize,
    pub quantities: Vec<UnitTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub co: SideSummary,
    pub fc: SideSummary,
}

/// 一次完整比对的输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows: Vec<ClassifiedRow>,
    pub counters: Counters,
    pub summary: ComparisonSummary,
    pub leftovers: usize,
}

impl Comparison {
    pub fn diff_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.has_diff).count()
    }
}
