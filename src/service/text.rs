//! 文本规范化工具: 去重音、折叠空白、剥离前导编码、分词

use regex::Regex;
use std::sync::OnceLock;

/// 描述开头的长数字编码 (>= 5 位), 后面可跟 `:` 或 `-`
fn leading_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*0*\d{5,}\b[:\-]?\s*").expect("leading code regex"))
}

/// U+0100..=U+017F 的基字母, `.` 表示该字符没有规范分解, 原样保留
const LATIN_EXT_A_BASE: &[u8; 128] = b"AaAaAaCcCcCcCcDd..EeEeEeEeEeGgGgGgGgHh..IiIiIiIiI...JjKk.LlLlLl....NnNnNn...OoOoOo..RrRrRrSsSsSsSsTtTt..UuUuUuUuUuUuWwYyYZzZzZz.";

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ç' => 'C',
        'ç' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ý' => 'Y',
        'ý' | 'ÿ' => 'y',
        '\u{0100}'..='\u{017f}' => match LATIN_EXT_A_BASE[c as usize - 0x100] {
            b'.' => c,
            base => base as char,
        },
        // 组合附加符号直接丢弃
        '\u{0300}'..='\u{036f}'
        | '\u{1ab0}'..='\u{1aff}'
        | '\u{1dc0}'..='\u{1dff}'
        | '\u{20d0}'..='\u{20ff}'
        | '\u{fe20}'..='\u{fe2f}' => return None,
        other => other,
    };
    Some(folded)
}

/// 去重音 + 折叠空白 + 去首尾空白 + 大写
pub fn normalize_text(s: &str) -> String {
    let folded: String = s.chars().filter_map(fold_char).collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// 去掉描述开头的内部编码前缀
pub fn strip_leading_code(s: &str) -> &str {
    match leading_code_re().find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    }
}

/// 描述的全量规范名 (用于分组软键)
pub fn canonical_name(desc: &str) -> String {
    normalize_text(strip_leading_code(desc))
}

/// 按非字母数字切分的规范化词元
pub fn tokens(desc: &str) -> Vec<String> {
    canonical_name(desc)
        .split(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn first_token(desc: &str) -> String {
    tokens(desc).into_iter().next().unwrap_or_default()
}

/// 编码规范化: 去空白, 去前导零 (至少保留一位数字), 大写
pub fn normalize_code(s: &str) -> String {
    let trimmed = s.trim();
    let zeros = trimmed.chars().take_while(|c| *c == '0').count();
    let strip = match trimmed[zeros..].chars().next() {
        Some(c) if c.is_ascii_digit() => zeros,
        _ => zeros.saturating_sub(1),
    };
    trimmed[strip..].to_uppercase()
}

/// NCM 清洗: 去掉标点和空白
pub fn sanitize_classification(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .collect()
}

/// 单位比较前去掉句点
pub fn strip_periods(s: &str) -> String {
    s.replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_folds_accents_and_whitespace() {
        assert_eq!(normalize_text("  válvula   de  pressão "), "VALVULA DE PRESSAO");
        assert_eq!(normalize_text("Ação\tÇÃO"), "ACAO CAO");
        assert_eq!(normalize_text("e\u{0301}"), "E");
    }

    #[test]
    fn normalize_text_folds_latin_extended() {
        assert_eq!(normalize_text("Işık Gőz Āra"), "ISIK GOZ ARA");
        assert_eq!(normalize_text("Łódź Œuvre"), "ŁODZ ŒUVRE");
        assert_eq!(normalize_text("Štěpán Żółw"), "STEPAN ZOŁW");
    }

    #[test]
    fn strips_long_leading_codes_only() {
        assert_eq!(strip_leading_code("0012345: PARAFUSO"), "PARAFUSO");
        assert_eq!(strip_leading_code("123456 - PORCA"), "- PORCA");
        assert_eq!(strip_leading_code("123 PARAFUSO"), "123 PARAFUSO");
        assert_eq!(strip_leading_code("12345ABC"), "12345ABC");
    }

    #[test]
    fn tokens_split_on_punctuation() {
        assert_eq!(
            tokens("98765 Parafuso sextavado, M8x20"),
            vec!["PARAFUSO", "SEXTAVADO", "M8X20"]
        );
        assert_eq!(first_token("  "), "");
    }

    #[test]
    fn normalize_code_drops_leading_zeros() {
        assert_eq!(normalize_code(" 000123 "), "123");
        assert_eq!(normalize_code("000"), "0");
        assert_eq!(normalize_code("00ab1"), "0AB1");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn sanitize_classification_removes_punctuation() {
        assert_eq!(sanitize_classification("8471.30.12"), "84713012");
        assert_eq!(sanitize_classification("7318-15 00"), "73181500");
    }
}
