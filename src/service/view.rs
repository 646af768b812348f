use crate::models::{Cell, ClassifiedRow};
use crate::service::text::normalize_text;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 可排序的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Order,
    ClassificationCo,
    ClassificationFc,
    DescriptionCo,
    DescriptionFc,
    QuantityCo,
    QuantityFc,
    UnitCo,
    UnitFc,
    ValueCo,
    ValueFc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub key: SortKey,
    #[serde(default)]
    pub dir: SortDir,
}

fn sort_cell(row: &ClassifiedRow, key: SortKey) -> Cell {
    let r = &row.row;
    match key {
        SortKey::Order => Cell::Text(r.order.clone()),
        SortKey::ClassificationCo => Cell::Text(r.co.classification_code.clone()),
        SortKey::ClassificationFc => Cell::Text(r.fc.classification_code.clone()),
        SortKey::DescriptionCo => Cell::Text(r.co.description.clone()),
        SortKey::DescriptionFc => Cell::Text(r.fc.description.clone()),
        SortKey::QuantityCo => r.co.quantity.clone(),
        SortKey::QuantityFc => r.fc.quantity.clone(),
        SortKey::UnitCo => Cell::Text(r.co.unit.clone()),
        SortKey::UnitFc => Cell::Text(r.fc.unit.clone()),
        SortKey::ValueCo => r.co.value.clone(),
        SortKey::ValueFc => r.fc.value.clone(),
    }
}

/// 先尝试数值比较 (任一侧非零时), 否则按规范化文本比较
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    let na = a.to_number();
    let nb = b.to_number();
    if na != 0.0 || nb != 0.0 {
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    collate(&normalize_text(&a.to_string()), &normalize_text(&b.to_string()))
}

/// 排序层级: 空白与符号 < 数字 < 字母
fn collation_rank(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

/// 近似根排序规则的文本比较; 同一层级内按码位
fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(|c| (collation_rank(c), c))
        .cmp(b.chars().map(|c| (collation_rank(c), c)))
}

/// 稳定排序
pub fn sort_rows(rows: &mut [ClassifiedRow], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ord = compare_cells(&sort_cell(a, spec.key), &sort_cell(b, spec.key));
        match spec.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

/// "只看差异" 过滤
pub fn only_diffs(rows: &[ClassifiedRow]) -> Vec<ClassifiedRow> {
    rows.iter().filter(|r| r.has_diff).cloned().collect()
}

/// 过滤 + 排序, 生成新的视图, 不修改原结果
pub fn view(rows: &[ClassifiedRow], diffs_only: bool, sort: Option<SortSpec>) -> Vec<ClassifiedRow> {
    let mut out = if diffs_only { only_diffs(rows) } else { rows.to_vec() };
    if let Some(spec) = sort {
        sort_rows(&mut out, spec);
    }
    out
}
