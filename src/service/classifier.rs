use crate::models::row::decimal_from_f64;
use crate::models::{Cell, ClassifiedRow, FieldState, FieldStates, GroupedRow, MatchMode};
use crate::service::text::{normalize_code, normalize_text, strip_periods, tokens};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 数值比对容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub quantity: f64,
    pub value: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            quantity: 1e-6,
            value: 0.005,
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// 文本比对: 任一侧为空 -> miss; 规范化后相等 -> ok; 否则 warn
pub fn compare_text(a: &str, b: &str) -> FieldState {
    if is_blank(a) || is_blank(b) {
        return FieldState::Miss;
    }
    if normalize_text(a) == normalize_text(b) {
        FieldState::Ok
    } else {
        FieldState::Warn
    }
}

pub fn compare_code(a: Option<&str>, b: Option<&str>) -> FieldState {
    let a = a.unwrap_or("");
    let b = b.unwrap_or("");
    if is_blank(a) || is_blank(b) {
        return FieldState::Miss;
    }
    if normalize_code(a) == normalize_code(b) {
        FieldState::Ok
    } else {
        FieldState::Warn
    }
}

pub fn compare_unit(a: &str, b: &str) -> FieldState {
    compare_text(&strip_periods(a), &strip_periods(b))
}

/// 数值比对: 任一侧为空 -> miss; 十进制差值 <= 容差 -> ok; 否则 warn
pub fn compare_number(a: &Cell, b: &Cell, tolerance: f64) -> FieldState {
    if a.is_blank() || b.is_blank() {
        return FieldState::Miss;
    }
    // 无法解析的文本按 0 参与比较
    let a = a.to_decimal().unwrap_or_else(BigDecimal::zero);
    let b = b.to_decimal().unwrap_or_else(BigDecimal::zero);
    let tolerance = decimal_from_f64(tolerance).unwrap_or_else(BigDecimal::zero);
    if (a - b).abs() <= tolerance {
        FieldState::Ok
    } else {
        FieldState::Warn
    }
}

/// 描述比对: 前两个词元都存在且相同 -> ok, 否则 warn
pub fn compare_description(a: &str, b: &str) -> FieldState {
    if is_blank(a) || is_blank(b) {
        return FieldState::Miss;
    }
    let ta = tokens(a);
    let tb = tokens(b);
    let same = |pos: usize| matches!((ta.get(pos), tb.get(pos)), (Some(x), Some(y)) if x == y);

    if same(0) && same(1) {
        FieldState::Ok
    } else {
        FieldState::Warn
    }
}

/// 计算一行的五个字段状态
pub fn field_states(row: &GroupedRow, tolerances: &Tolerances) -> FieldStates {
    let description = match row.match_mode {
        MatchMode::Code => compare_code(row.co.internal_code.as_deref(), row.fc.internal_code.as_deref()),
        _ => compare_description(&row.co.description, &row.fc.description),
    };

    FieldStates {
        classification: compare_text(&row.co.classification_code, &row.fc.classification_code),
        description,
        quantity: compare_number(&row.co.quantity, &row.fc.quantity, tolerances.quantity),
        unit: compare_unit(&row.co.unit, &row.fc.unit),
        value: compare_number(&row.co.value, &row.fc.value, tolerances.value),
    }
}

pub fn classify_row(row: GroupedRow, tolerances: &Tolerances) -> ClassifiedRow {
    let states = field_states(&row, tolerances);
    ClassifiedRow {
        row,
        severity: states.worst(),
        has_diff: states.has_diff(),
        states,
    }
}

pub fn classify_rows(rows: Vec<GroupedRow>, tolerances: &Tolerances) -> Vec<ClassifiedRow> {
    rows.into_iter().map(|r| classify_row(r, tolerances)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MergedRow, SideFields};

    fn full_side(desc: &str, qty: &str, value: &str) -> SideFields {
        SideFields {
            classification_code: "73181500".to_string(),
            description: desc.to_string(),
            quantity: Cell::from(qty),
            unit: "UN".to_string(),
            value: Cell::from(value),
            internal_code: Some("42".to_string()),
        }
    }

    fn row(co: SideFields, fc: SideFields, mode: MatchMode) -> GroupedRow {
        MergedRow {
            key: "k".to_string(),
            order: "1".to_string(),
            co,
            fc,
            match_mode: mode,
        }
    }

    #[test]
    fn quantity_tolerance_boundary() {
        let tol = Tolerances::default();
        assert_eq!(compare_number(&Cell::from("0"), &Cell::from("0,000001"), tol.quantity), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("0"), &Cell::from("0,0000011"), tol.quantity), FieldState::Warn);
    }

    #[test]
    fn value_tolerance_boundary() {
        let tol = Tolerances::default();
        assert_eq!(compare_number(&Cell::from("0"), &Cell::from("0,005"), tol.value), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("0"), &Cell::from("0,0051"), tol.value), FieldState::Warn);
        assert_eq!(compare_number(&Cell::from("1.250,00"), &Cell::Number(1250.0), tol.value), FieldState::Ok);
    }

    #[test]
    fn value_boundary_holds_away_from_zero() {
        let tol = Tolerances::default();
        assert_eq!(compare_number(&Cell::from("1.234,56"), &Cell::from("1.234,565"), tol.value), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("1.234,565"), &Cell::Number(1234.56), tol.value), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("1.234,56"), &Cell::from("1.234,5651"), tol.value), FieldState::Warn);
        assert_eq!(compare_number(&Cell::from("R$ 99,99"), &Cell::from("99,995"), tol.value), FieldState::Ok);
    }

    #[test]
    fn quantity_boundary_holds_away_from_zero() {
        let tol = Tolerances::default();
        assert_eq!(compare_number(&Cell::from("10"), &Cell::from("10,000001"), tol.quantity), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("1.000,25"), &Cell::Number(1000.250001), tol.quantity), FieldState::Ok);
        assert_eq!(compare_number(&Cell::from("1.000,25"), &Cell::from("1.000,2500011"), tol.quantity), FieldState::Warn);
    }

    #[test]
    fn blank_numbers_are_missing() {
        assert_eq!(compare_number(&Cell::empty(), &Cell::Number(3.0), 1e-6), FieldState::Miss);
        assert_eq!(compare_number(&Cell::from(" "), &Cell::empty(), 1e-6), FieldState::Miss);
        assert_eq!(compare_number(&Cell::Number(0.0), &Cell::from("0"), 1e-6), FieldState::Ok);
    }

    #[test]
    fn units_ignore_periods_and_case() {
        assert_eq!(compare_unit("Un.", "UN"), FieldState::Ok);
        assert_eq!(compare_unit("KG", "UN"), FieldState::Warn);
        assert_eq!(compare_unit("", "UN"), FieldState::Miss);
    }

    #[test]
    fn description_token_rules() {
        assert_eq!(compare_description("Parafuso sextavado M8", "PARAFUSO SEXTAVADO M10"), FieldState::Ok);
        assert_eq!(compare_description("Parafuso allen", "Parafuso sextavado"), FieldState::Warn);
        assert_eq!(compare_description("Porca", "Arruela"), FieldState::Warn);
        // 只有一个词元时第二个词元不存在, 不算一致
        assert_eq!(compare_description("Porca", "porca"), FieldState::Warn);
        assert_eq!(compare_description("Porca M8", "porca m8"), FieldState::Ok);
        assert_eq!(compare_description("", "Porca"), FieldState::Miss);
        assert_eq!(compare_description("123456 Parafuso sextavado", "Parafuso sextavado"), FieldState::Ok);
    }

    #[test]
    fn code_mode_compares_internal_codes() {
        let mut fc = full_side("Algo totalmente diferente", "1", "1");
        fc.internal_code = Some("0042".to_string());
        let r = row(full_side("Parafuso", "1", "1"), fc, MatchMode::Code);
        let states = field_states(&r, &Tolerances::default());
        assert_eq!(states.description, FieldState::Ok);
    }

    #[test]
    fn severity_is_worst_state() {
        let tol = Tolerances::default();
        let all_ok = classify_row(row(full_side("Parafuso M8", "1", "2"), full_side("Parafuso M8", "1", "2"), MatchMode::Code), &tol);
        assert_eq!(all_ok.severity, FieldState::Ok);
        assert!(!all_ok.has_diff);

        let one_warn = classify_row(row(full_side("Parafuso M8", "1", "2"), full_side("Parafuso M8", "1", "3"), MatchMode::Code), &tol);
        assert_eq!(one_warn.states.value, FieldState::Warn);
        assert_eq!(one_warn.severity, FieldState::Warn);
        assert!(one_warn.has_diff);

        let mut missing_unit = full_side("Parafuso M8", "1", "2");
        missing_unit.unit.clear();
        let one_miss = classify_row(row(full_side("Parafuso M8", "1", "2"), missing_unit, MatchMode::Code), &tol);
        assert_eq!(one_miss.states.unit, FieldState::Miss);
        assert_eq!(one_miss.severity, FieldState::Miss);
    }

    #[test]
    fn leftover_rows_miss_everything() {
        let r = row(SideFields::default(), full_side("Valvula", "1", "1"), MatchMode::Leftover);
        let states = field_states(&r, &Tolerances::default());
        assert!(states.all().iter().all(|s| *s == FieldState::Miss));
    }
}
