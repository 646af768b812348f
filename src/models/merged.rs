use crate::models::{CanonicalRow, Cell};
use serde::{Deserialize, Serialize};

/// 配对方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Code,
    Classification,
    Description,
    Leftover,
}

/// 单侧字段 (某一侧缺失时全部为空)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideFields {
    pub classification_code: String,
    pub description: String,
    pub quantity: Cell,
    pub unit: String,
    pub value: Cell,
    pub internal_code: Option<String>,
}

impl SideFields {
    pub fn from_row(row: &CanonicalRow) -> Self {
        Self {
            classification_code: row.classification_code.clone(),
            description: row.description.clone(),
            quantity: row.quantity.clone(),
            unit: row.unit.clone(),
            value: row.value.clone(),
            internal_code: row.internal_code.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classification_code.trim().is_empty()
            && self.description.trim().is_empty()
            && self.quantity.is_blank()
            && self.unit.trim().is_empty()
            && self.value.is_blank()
            && self.internal_code.as_deref().map_or(true, |c| c.trim().is_empty())
    }

    /// 仅回填本侧为空的字段, 已有值不覆盖
    pub fn backfill_from(&mut self, other: &SideFields) {
        fill_text(&mut self.classification_code, &other.classification_code);
        fill_text(&mut self.description, &other.description);
        fill_text(&mut self.unit, &other.unit);
        if self.quantity.is_blank() && !other.quantity.is_blank() {
            self.quantity = other.quantity.clone();
        }
        if self.value.is_blank() && !other.value.is_blank() {
            self.value = other.value.clone();
        }
        let own_code_empty = self.internal_code.as_deref().map_or(true, |c| c.trim().is_empty());
        if own_code_empty {
            if let Some(code) = other.internal_code.as_deref().filter(|c| !c.trim().is_empty()) {
                self.internal_code = Some(code.to_string());
            }
        }
    }
}

fn fill_text(target: &mut String, source: &str) {
    if target.trim().is_empty() && !source.trim().is_empty() {
        *target = source.to_string();
    }
}

/// 配对结果行: 至多一条 CO 行 + 至多一条 FC 行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub key: String,
    pub order: String,
    pub co: SideFields,
    pub fc: SideFields,
    pub match_mode: MatchMode,
}

impl MergedRow {
    /// 主侧行 + 可选的次侧候选
    pub fn paired(co: &CanonicalRow, fc: Option<&CanonicalRow>, match_mode: MatchMode) -> Self {
        let key = if co.key.is_empty() {
            fc.map(|r| r.key.clone()).unwrap_or_default()
        } else {
            co.key.clone()
        };
        let order = if co.order.is_blank() {
            fc.map(|r| r.order.to_string()).unwrap_or_default()
        } else {
            co.order.to_string()
        };

        Self {
            key,
            order,
            co: SideFields::from_row(co),
            fc: fc.map(SideFields::from_row).unwrap_or_default(),
            match_mode,
        }
    }

    /// FC 剩余行 (没有 CO 对应)
    pub fn leftover(fc: &CanonicalRow) -> Self {
        Self {
            key: fc.key.clone(),
            order: fc.order.to_string(),
            co: SideFields::default(),
            fc: SideFields::from_row(fc),
            match_mode: MatchMode::Leftover,
        }
    }
}
