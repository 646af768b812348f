use crate::models::{CanonicalRow, SideSummary, UnitTotal};
use bigdecimal::{BigDecimal, Zero};
use serde_json::Value;
use std::collections::BTreeMap;

const CURRENCY_KEYS: &[&str] = &["moeda", "currency", "moneda"];
const DEFAULT_CURRENCY: &str = "BRL";

/// 单位别名归一
pub fn normalize_unit(unit: &str) -> String {
    let u = unit.trim().to_uppercase();
    match u.as_str() {
        "UND" | "UNID" | "UN." | "UNIDADE" => "UN".to_string(),
        "MTS" | "MT" => "M".to_string(),
        "KILO" | "KILOS" => "KG".to_string(),
        _ => u,
    }
}

/// `meta.moeda|currency|moneda`, 默认 BRL
pub fn currency_of(payload: &Value) -> String {
    let metas = [payload.get("meta"), payload.get("data").and_then(|d| d.get("meta"))];
    metas
        .into_iter()
        .flatten()
        .flat_map(|meta| CURRENCY_KEYS.iter().filter_map(move |k| meta.get(*k)))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}

/// 单侧汇总: 金额合计 + 按单位的数量合计
pub fn summarize(rows: &[CanonicalRow], currency: String) -> SideSummary {
    let mut total_value = BigDecimal::zero();
    let mut items_with_value = 0;
    let mut by_unit: BTreeMap<String, BigDecimal> = BTreeMap::new();

    for row in rows {
        if let Some(v) = row.value.to_decimal() {
            total_value += v;
            items_with_value += 1;
        }

        let unit = normalize_unit(&row.unit);
        if unit.is_empty() {
            continue;
        }
        if let Some(q) = row.quantity.to_decimal() {
            *by_unit.entry(unit).or_insert_with(BigDecimal::zero) += q;
        }
    }

    let total_display = if items_with_value > 0 {
        format_brl(&total_value)
    } else {
        "—".to_string()
    };

    SideSummary {
        currency,
        total_value,
        total_display,
        items_with_value,
        total_items: rows.len(),
        quantities: by_unit
            .into_iter()
            .map(|(unit, quantity)| UnitTotal { unit, quantity })
            .collect(),
    }
}

/// pt-BR 货币格式, 例如 `R$ 1.234,50`
pub fn format_brl(amount: &BigDecimal) -> String {
    let fixed = amount.round(2).with_scale(2).to_string();
    let (negative, digits) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use serde_json::json;
    use std::str::FromStr;

    fn row(qty: Cell, unit: &str, value: Cell) -> CanonicalRow {
        CanonicalRow {
            key: String::new(),
            order: Cell::empty(),
            classification_code: String::new(),
            description: String::new(),
            quantity: qty,
            unit: unit.to_string(),
            value,
            internal_code: None,
        }
    }

    #[test]
    fn sums_values_exactly() {
        let rows = vec![
            row(Cell::from("2"), "und", Cell::from("0,10")),
            row(Cell::Number(3.0), "UN.", Cell::from("R$ 0,20")),
            row(Cell::from("1,5"), "Kilos", Cell::empty()),
            row(Cell::from("x"), "", Cell::from("abc")),
        ];
        let s = summarize(&rows, "BRL".to_string());

        assert_eq!(s.total_value, BigDecimal::from_str("0.30").unwrap());
        assert_eq!(s.items_with_value, 2);
        assert_eq!(s.total_display, "R$ 0,30");
        assert_eq!(s.total_items, 4);
        let units: Vec<_> = s.quantities.iter().map(|u| (u.unit.as_str(), u.quantity.to_string())).collect();
        assert_eq!(units, vec![("KG", "1.5".to_string()), ("UN", "5".to_string())]);
    }

    #[test]
    fn currency_from_meta_or_default() {
        assert_eq!(currency_of(&json!({ "meta": { "currency": "USD" } })), "USD");
        assert_eq!(currency_of(&json!({ "data": { "meta": { "moeda": "EUR" } } })), "EUR");
        assert_eq!(currency_of(&json!({ "meta": { "moeda": "" } })), "BRL");
        assert_eq!(currency_of(&json!({})), "BRL");
    }

    #[test]
    fn formats_brazilian_currency() {
        assert_eq!(format_brl(&BigDecimal::from_str("1234.5").unwrap()), "R$ 1.234,50");
        assert_eq!(format_brl(&BigDecimal::from_str("-987654.321").unwrap()), "-R$ 987.654,32");
        assert_eq!(format_brl(&BigDecimal::zero()), "R$ 0,00");
    }
}
