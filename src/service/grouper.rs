use crate::models::{GroupedRow, MergedRow};
use crate::service::text::{canonical_name, normalize_code, normalize_text};
use indexmap::IndexMap;

/// 编码门: 两侧非空内部编码的有序去重集合
fn code_gate(row: &MergedRow) -> String {
    let mut codes: Vec<String> = [row.co.internal_code.as_deref(), row.fc.internal_code.as_deref()]
        .into_iter()
        .flatten()
        .map(normalize_code)
        .filter(|c| !c.is_empty())
        .collect();
    codes.sort();
    codes.dedup();

    if codes.is_empty() {
        String::new()
    } else {
        format!("|CODE:{}", codes.join("+"))
    }
}

/// 视觉合并用软键: 以 CO 侧 描述+NCM 为主, CO 侧为空时退回 FC 侧
pub fn soft_key(row: &MergedRow) -> String {
    let gate = code_gate(row);

    let name_co = canonical_name(&row.co.description);
    let ncm_co = normalize_text(&row.co.classification_code);
    if !name_co.is_empty() || !ncm_co.is_empty() {
        return format!("CO:{}|{}{}", name_co, ncm_co, gate);
    }

    let name_fc = canonical_name(&row.fc.description);
    let ncm_fc = normalize_text(&row.fc.classification_code);
    format!("FC:{}|{}{}", name_fc, ncm_fc, gate)
}

/// 逗号拼接, 重复值省略
fn join_distinct(kept: &str, incoming: &str) -> String {
    let kept = kept.trim();
    let incoming = incoming.trim();
    if kept.is_empty() {
        return incoming.to_string();
    }
    if incoming.is_empty() || kept.split(", ").any(|part| part == incoming) {
        return kept.to_string();
    }
    format!("{}, {}", kept, incoming)
}

/// 把 incoming 并入 kept: 只拼接 order/key, 只回填空字段, 不做任何求和
fn absorb(kept: &mut GroupedRow, incoming: &MergedRow) {
    kept.order = join_distinct(&kept.order, &incoming.order);
    kept.key = join_distinct(&kept.key, &incoming.key);
    kept.co.backfill_from(&incoming.co);
    kept.fc.backfill_from(&incoming.fc);
}

/// 视觉分组 (不求和、不丢行信息), 输出顺序为各组首次出现的顺序
pub fn group_rows(rows: &[MergedRow]) -> Vec<GroupedRow> {
    let mut groups: IndexMap<String, GroupedRow> = IndexMap::with_capacity(rows.len());

    for row in rows {
        match groups.entry(soft_key(row)) {
            indexmap::map::Entry::Occupied(mut slot) => absorb(slot.get_mut(), row),
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(row.clone());
            }
        }
    }

    tracing::debug!("[Grouper] {} 行合并为 {} 行", rows.len(), groups.len());
    groups.into_values().collect()
}
