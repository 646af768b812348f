use crate::models::CanonicalRow;
use crate::service::text::{first_token, normalize_code, normalize_text};
use std::collections::HashMap;

/// 倒排索引: 规范化键 -> 行下标 (保持原始顺序)
#[derive(Debug, Default)]
pub struct RowIndex {
    by_classification: HashMap<String, Vec<usize>>,
    by_first_token: HashMap<String, Vec<usize>>,
    by_code: HashMap<String, Vec<usize>>,
}

impl RowIndex {
    pub fn build(rows: &[CanonicalRow]) -> Self {
        let mut index = Self::default();

        for (i, row) in rows.iter().enumerate() {
            let ncm = normalize_text(&row.classification_code);
            let token = first_token(&row.description);
            let code = row.internal_code.as_deref().map(normalize_code).unwrap_or_default();

            push(&mut index.by_classification, ncm, i);
            push(&mut index.by_first_token, token, i);
            push(&mut index.by_code, code, i);
        }

        index
    }

    pub fn by_classification(&self, key: &str) -> &[usize] {
        lookup(&self.by_classification, key)
    }

    pub fn by_first_token(&self, key: &str) -> &[usize] {
        lookup(&self.by_first_token, key)
    }

    pub fn by_code(&self, key: &str) -> &[usize] {
        lookup(&self.by_code, key)
    }
}

/// 空键不入索引
fn push(map: &mut HashMap<String, Vec<usize>>, key: String, row: usize) {
    if key.is_empty() {
        return;
    }
    map.entry(key).or_default().push(row);
}

fn lookup<'a>(map: &'a HashMap<String, Vec<usize>>, key: &str) -> &'a [usize] {
    if key.is_empty() {
        return &[];
    }
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn row(ncm: &str, desc: &str, code: Option<&str>) -> CanonicalRow {
        CanonicalRow {
            key: String::new(),
            order: Cell::empty(),
            classification_code: ncm.to_string(),
            description: desc.to_string(),
            quantity: Cell::empty(),
            unit: String::new(),
            value: Cell::empty(),
            internal_code: code.map(str::to_string),
        }
    }

    #[test]
    fn buckets_preserve_original_order() {
        let rows = vec![
            row("73181500", "Parafuso sextavado", Some("0042")),
            row("73181600", "Porca", None),
            row("73181500", "parafuso allen", Some("42")),
        ];
        let idx = RowIndex::build(&rows);

        assert_eq!(idx.by_classification("73181500"), &[0, 2]);
        assert_eq!(idx.by_first_token("PARAFUSO"), &[0, 2]);
        assert_eq!(idx.by_code("42"), &[0, 2]);
        assert_eq!(idx.by_code("0042"), &[] as &[usize]);
    }

    #[test]
    fn rows_without_attribute_are_not_indexed() {
        let rows = vec![row("", "", None)];
        let idx = RowIndex::build(&rows);

        assert!(idx.by_classification("").is_empty());
        assert!(idx.by_first_token("").is_empty());
        assert!(idx.by_code("").is_empty());
        assert!(idx.by_classification.is_empty());
        assert!(idx.by_first_token.is_empty());
        assert!(idx.by_code.is_empty());
    }
}
