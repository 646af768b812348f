use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 原始单元格: 上游可能给字符串也可能给数字, 原样保留用于展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    /// 从 JSON 值构建; null / 对象 / 数组 视为空
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Text(n.to_string()),
            },
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(Value::Bool(b)) => Cell::Text(b.to_string()),
            _ => Cell::empty(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// 本地化数字解析 (千分位 `.` / 小数点 `,`), 无法解析时为 0
    pub fn to_number(&self) -> f64 {
        match self {
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Number(_) => 0.0,
            Cell::Text(s) => parse_locale_number(s).unwrap_or(0.0),
        }
    }

    /// 精确十进制; 空值或无法解析返回 None
    pub fn to_decimal(&self) -> Option<BigDecimal> {
        match self {
            Cell::Number(n) => decimal_from_f64(*n),
            Cell::Text(s) => numeric_text(s).and_then(|t| BigDecimal::from_str(&t).ok()),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// 把 `1.234,56` 这类字符串规整为 `1234.56` 形式, 空串规整为 `0`
pub fn locale_to_plain(s: &str) -> String {
    let without_thousands: String = s.trim().chars().filter(|c| *c != '.').collect();
    let plain = without_thousands.replacen(',', ".", 1);
    if plain.is_empty() {
        "0".to_string()
    } else {
        plain
    }
}

const CURRENCY_PREFIXES: &[&str] = &["R$", "US$", "$", "€"];

/// 去掉前导货币符号后规整为 `1234.56` 形式; 空白返回 None
pub fn numeric_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    let body = CURRENCY_PREFIXES
        .iter()
        .find_map(|p| trimmed.strip_prefix(p))
        .unwrap_or(trimmed)
        .trim_start();
    if body.is_empty() {
        return None;
    }
    Some(locale_to_plain(body))
}

/// 严格解析: 返回 None 表示不是数字
pub fn parse_locale_number(s: &str) -> Option<f64> {
    numeric_text(s)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// f64 按最短十进制表示转换, 非有限值返回 None
pub fn decimal_from_f64(n: f64) -> Option<BigDecimal> {
    if !n.is_finite() {
        return None;
    }
    BigDecimal::from_str(&n.to_string()).ok()
}

/// 比对的哪一侧 (A = CO 主侧, B = FC 次侧)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Co,
    Fc,
}

impl Side {
    /// CO 侧的描述带内部编码前缀
    pub fn prefixes_code(&self) -> bool {
        matches!(self, Side::Co)
    }
}

/// 规范化后的明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub key: String,
    pub order: Cell,
    pub classification_code: String,
    pub description: String,
    pub quantity: Cell,
    pub unit: String,
    pub value: Cell,
    pub internal_code: Option<String>,
}
