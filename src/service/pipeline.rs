use crate::models::{Comparison, ComparisonSummary, Side};
use crate::service::aggregate::count_states;
use crate::service::classifier::{classify_rows, Tolerances};
use crate::service::grouper::group_rows;
use crate::service::matcher::match_rows;
use crate::service::normalizer::normalize;
use crate::service::summary::{currency_of, summarize};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 完整比对流水线: 规范化 -> 索引/匹配 -> 分组 -> 字段比对 -> 统计
///
/// 纯函数: 相同输入得到完全相同的输出 (包括行顺序)
pub fn compare(co: &Value, fc: &Value, tolerances: &Tolerances) -> Comparison {
    let co_rows = normalize(co, Side::Co);
    let fc_rows = normalize(fc, Side::Fc);

    let matched = match_rows(&co_rows, &fc_rows);
    let grouped = group_rows(&matched.rows);
    let rows = classify_rows(grouped, tolerances);
    let counters = count_states(&rows);

    tracing::debug!(
        "[Pipeline] CO {} / FC {} -> {} 行 (剩余 {}), ok={} warn={} miss={}",
        co_rows.len(),
        fc_rows.len(),
        rows.len(),
        matched.leftovers,
        counters.ok,
        counters.warn,
        counters.miss
    );

    Comparison {
        rows,
        counters,
        summary: ComparisonSummary {
            co: summarize(&co_rows, currency_of(co)),
            fc: summarize(&fc_rows, currency_of(fc)),
        },
        leftovers: matched.leftovers,
    }
}

/// 缓存项: 保留序列化后的输入, 哈希碰撞时可识别
struct CacheEntry {
    co: String,
    fc: String,
    tolerances: Tolerances,
    comparison: Arc<Comparison>,
}

/// 以两份输入的哈希为键的比对结果缓存
///
/// 不做隐式失效: 输入变化即键变化, 满了直接清空
pub struct ComparisonCache {
    entries: DashMap<u64, Arc<CacheEntry>>,
    max_entries: usize,
}

impl ComparisonCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    fn fingerprint(co: &str, fc: &str, tolerances: &Tolerances) -> u64 {
        let mut hasher = DefaultHasher::new();
        co.hash(&mut hasher);
        fc.hash(&mut hasher);
        tolerances.quantity.to_bits().hash(&mut hasher);
        tolerances.value.to_bits().hash(&mut hasher);
        hasher.finish()
    }

    /// 命中直接返回, 否则计算并写入
    pub fn get_or_compute(&self, co: &Value, fc: &Value, tolerances: &Tolerances) -> Arc<Comparison> {
        let co_text = co.to_string();
        let fc_text = fc.to_string();
        let key = Self::fingerprint(&co_text, &fc_text, tolerances);

        if let Some(entry) = self.entries.get(&key) {
            if entry.co == co_text && entry.fc == fc_text && entry.tolerances == *tolerances {
                tracing::debug!("[Cache] 命中 {:016x}", key);
                return Arc::clone(&entry.comparison);
            }
            tracing::warn!("[Cache] 哈希碰撞 {:016x}, 重新计算", key);
        }

        let comparison = Arc::new(compare(co, fc, tolerances));

        if self.entries.len() >= self.max_entries {
            tracing::debug!("[Cache] 已满 ({} 项), 清空", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(
            key,
            Arc::new(CacheEntry {
                co: co_text,
                fc: fc_text,
                tolerances: *tolerances,
                comparison: Arc::clone(&comparison),
            }),
        );

        comparison
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payloads() -> (Value, Value) {
        let co = json!({ "data": { "itens": [
            { "ordem": 1, "ncm": "7318.15.00", "nomeProduto": "Parafuso sextavado", "quantidade": 10, "unidade": "UN", "precoUnit": "1,50" }
        ]}});
        let fc = json!({ "itens": [
            { "ordem": 1, "ncm": "73181500", "descricao": "Parafuso sextavado", "qtd": "10", "unidade": "UN", "valor": 1.5 }
        ]});
        (co, fc)
    }

    #[test]
    fn cache_returns_same_result_for_same_input() {
        let cache = ComparisonCache::new(4);
        let (co, fc) = payloads();
        let tol = Tolerances::default();

        let first = cache.get_or_compute(&co, &fc, &tol);
        let second = cache.get_or_compute(&co, &fc, &tol);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.counters.ok, 5);
    }

    #[test]
    fn cache_recomputes_when_input_changes() {
        let cache = ComparisonCache::new(4);
        let (co, mut fc) = payloads();
        let tol = Tolerances::default();

        let first = cache.get_or_compute(&co, &fc, &tol);
        fc["itens"][0]["valor"] = json!(2.0);
        let second = cache.get_or_compute(&co, &fc, &tol);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.counters.warn, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn full_cache_is_cleared() {
        let cache = ComparisonCache::new(1);
        let (co, fc) = payloads();
        let tol = Tolerances::default();

        cache.get_or_compute(&co, &fc, &tol);
        cache.get_or_compute(&co, &json!({}), &tol);
        assert_eq!(cache.len(), 1);
    }
}
