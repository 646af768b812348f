use crate::models::{CanonicalRow, Cell, Side};
use crate::service::text::{normalize_code, sanitize_classification};
use serde_json::{Map, Value};

const DESCRIPTION_KEYS: &[&str] = &["produto", "nomeProduto", "descricao"];
const CODE_KEYS: &[&str] = &["codigoInterno", "codigo", "cod", "codigo_produto"];
const QUANTITY_KEYS: &[&str] = &["qtd", "quantidade", "quantity", "qtde", "qty"];
const VALUE_KEYS: &[&str] = &["valor", "precoUnit", "preco_unit", "valorUnitario", "preco_total"];
const UNIT_KEYS: &[&str] = &["unidade", "un", "uni", "unidad"];
const ORDER_KEYS: &[&str] = &["ordem", "order"];

/// 原始明细 + 嵌套结构中继承的 ordem / ncm
struct RawItem<'a> {
    item: &'a Map<String, Value>,
    inherited_order: Option<&'a Value>,
    inherited_ncm: Option<&'a Value>,
}

/// 把任意形状的解析结果转为规范化明细行; 无法识别时返回空
pub fn normalize(payload: &Value, side: Side) -> Vec<CanonicalRow> {
    let items = collect_items(payload);
    tracing::debug!("[Normalizer] {:?}: 识别到 {} 条明细", side, items.len());
    items.iter().map(|raw| canonical_row(raw, side)).collect()
}

/// 支持 `{data:{itens|items}}`, `{itens|items}`, `{data:{ordens:[{ncms:[{itens}]}]}}`
fn collect_items(payload: &Value) -> Vec<RawItem<'_>> {
    let data = match payload.get("data") {
        Some(d) if !d.is_null() => d,
        _ => payload,
    };

    let flat = data.get("itens").or_else(|| data.get("items"));
    if let Some(Value::Array(list)) = flat {
        return list
            .iter()
            .filter_map(Value::as_object)
            .map(|item| RawItem {
                item,
                inherited_order: None,
                inherited_ncm: None,
            })
            .collect();
    }

    let mut out = Vec::new();
    let Some(Value::Array(orders)) = data.get("ordens") else {
        return out;
    };
    for order in orders {
        let Some(order) = order.as_object() else {
            continue;
        };
        let order_no = pick(order, ORDER_KEYS);
        let Some(Value::Array(ncms)) = order.get("ncms") else {
            continue;
        };
        for group in ncms.iter().filter_map(Value::as_object) {
            let ncm = pick(group, &["ncm"]);
            let Some(Value::Array(items)) = group.get("itens").or_else(|| group.get("items")) else {
                continue;
            };
            for item in items.iter().filter_map(Value::as_object) {
                out.push(RawItem {
                    item,
                    inherited_order: order_no,
                    inherited_ncm: ncm,
                });
            }
        }
    }
    out
}

/// 取第一个存在且非 null 的别名
fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn canonical_row(raw: &RawItem<'_>, side: Side) -> CanonicalRow {
    let item = raw.item;

    let code = normalize_code(&as_text(pick(item, CODE_KEYS)));
    let name = as_text(pick(item, DESCRIPTION_KEYS)).trim().to_string();
    let description = if side.prefixes_code() && !code.is_empty() {
        format!("{} {}", code, name).trim().to_string()
    } else {
        name
    };

    let order = pick(item, ORDER_KEYS).or(raw.inherited_order);
    let ncm = pick(item, &["ncm"]).or(raw.inherited_ncm);
    let classification_code = sanitize_classification(&as_text(ncm));

    CanonicalRow {
        key: row_key(item, &code, order, &classification_code, &description),
        order: Cell::from_json(order),
        classification_code,
        description,
        quantity: Cell::from_json(pick(item, QUANTITY_KEYS)),
        unit: as_text(pick(item, UNIT_KEYS)).trim().to_string(),
        value: Cell::from_json(pick(item, VALUE_KEYS)),
        internal_code: if code.is_empty() { None } else { Some(code) },
    }
}

/// 展示用主键: 内部编码 > id > ordem|ncm > page-y_line > 描述前缀
fn row_key(
    item: &Map<String, Value>,
    code: &str,
    order: Option<&Value>,
    classification_code: &str,
    description: &str,
) -> String {
    if !code.is_empty() {
        return code.to_string();
    }

    let id = as_text(item.get("id"));
    if !id.trim().is_empty() {
        return id.trim().to_string();
    }

    let order_text = as_text(order).trim().to_string();
    let by_order = [order_text.as_str(), classification_code]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    if !by_order.is_empty() {
        return by_order;
    }

    let page = as_text(item.get("page"));
    let line = as_text(item.get("y_line"));
    if !page.is_empty() || !line.is_empty() {
        return format!("{}-{}", page, line);
    }

    let prefix: String = description.chars().take(24).collect();
    if prefix.is_empty() {
        "row".to_string()
    } else {
        prefix
    }
}
