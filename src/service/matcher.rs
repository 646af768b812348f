use crate::models::{CanonicalRow, MatchMode, MergedRow};
use crate::service::index::RowIndex;
use crate::service::score::{best_of, MatchScore};
use crate::service::text::{normalize_code, normalize_text, tokens};
use indexmap::IndexSet;

/// 参与评分的规范化特征 (每行只算一次)
#[derive(Debug, Clone)]
struct RowFeatures {
    classification: String,
    code: String,
    tokens: Vec<String>,
    quantity: f64,
    value: f64,
}

impl RowFeatures {
    fn of(row: &CanonicalRow) -> Self {
        Self {
            classification: normalize_text(&row.classification_code),
            code: row.internal_code.as_deref().map(normalize_code).unwrap_or_default(),
            tokens: tokens(&row.description),
            quantity: row.quantity.to_number(),
            value: row.value.to_number(),
        }
    }

    fn first_token(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// 两侧都没有 NCM 也算相同
    fn classification_equal(&self, other: &Self) -> bool {
        self.classification == other.classification
    }

    fn code_equal(&self, other: &Self) -> bool {
        !self.code.is_empty() && self.code == other.code
    }

    fn token_equal(&self, other: &Self, pos: usize) -> bool {
        match (self.tokens.get(pos), other.tokens.get(pos)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn score_against(&self, candidate: &Self) -> MatchScore {
        MatchScore::new(
            self.classification_equal(candidate),
            self.code_equal(candidate),
            [
                self.token_equal(candidate, 0),
                self.token_equal(candidate, 1),
                self.token_equal(candidate, 2),
            ],
            self.quantity - candidate.quantity,
            self.value - candidate.value,
        )
    }
}

/// 匹配结果
#[derive(Debug, Clone, Default)]
pub struct MatchOutput {
    pub rows: Vec<MergedRow>,
    pub matched: usize,
    pub leftovers: usize,
}

/// 次侧行的占用表 + 索引
pub struct MatchContext<'a> {
    secondary: &'a [CanonicalRow],
    features: Vec<RowFeatures>,
    index: RowIndex,
    used: Vec<bool>,
}

impl<'a> MatchContext<'a> {
    pub fn new(secondary: &'a [CanonicalRow]) -> Self {
        Self {
            secondary,
            features: secondary.iter().map(RowFeatures::of).collect(),
            index: RowIndex::build(secondary),
            used: vec![false; secondary.len()],
        }
    }

    /// 候选池: NCM ∪ 内部编码 ∪ 首词元 (去重、保序、仅未占用); 为空时退化为全部未占用行
    fn candidate_pool(&self, primary: &RowFeatures) -> IndexSet<usize> {
        let mut pool: IndexSet<usize> = IndexSet::new();
        let buckets = [
            self.index.by_classification(&primary.classification),
            self.index.by_code(&primary.code),
            self.index.by_first_token(primary.first_token()),
        ];
        for bucket in buckets {
            pool.extend(bucket.iter().copied().filter(|&i| !self.used[i]));
        }

        if pool.is_empty() {
            pool.extend(self.available());
        }
        pool
    }

    fn available(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(i, _)| i)
    }

    /// 为主侧行挑选最优候选并占用
    fn take_best(&mut self, primary: &RowFeatures) -> Option<(usize, MatchMode)> {
        let pool = self.candidate_pool(primary);
        let (best, _) = best_of(
            pool.iter()
                .map(|&i| (i, primary.score_against(&self.features[i]))),
        )?;

        self.used[best] = true;
        let chosen = &self.features[best];
        let mode = if primary.code_equal(chosen) {
            MatchMode::Code
        } else if primary.classification_equal(chosen) {
            MatchMode::Classification
        } else {
            MatchMode::Description
        };
        Some((best, mode))
    }

    /// 未被占用的次侧行, 按原始顺序
    fn leftovers(&self) -> Vec<&'a CanonicalRow> {
        let secondary = self.secondary;
        self.available().map(|i| &secondary[i]).collect()
    }
}

/// 主侧 (CO) -> 次侧 (FC) 一对一贪心匹配
pub fn match_rows(primary: &[CanonicalRow], secondary: &[CanonicalRow]) -> MatchOutput {
    let mut ctx = MatchContext::new(secondary);
    let mut rows = Vec::with_capacity(primary.len() + secondary.len());
    let mut matched = 0;

    for row in primary {
        let features = RowFeatures::of(row);
        match ctx.take_best(&features) {
            Some((idx, mode)) => {
                matched += 1;
                rows.push(MergedRow::paired(row, Some(&secondary[idx]), mode));
            }
            None => rows.push(MergedRow::paired(row, None, MatchMode::Description)),
        }
    }

    let leftover_rows = ctx.leftovers();
    let leftovers = leftover_rows.len();
    rows.extend(leftover_rows.into_iter().map(MergedRow::leftover));

    tracing::debug!(
        "[Matcher] CO {} 行, FC {} 行, 已配对 {}, FC 剩余 {}",
        primary.len(),
        secondary.len(),
        matched,
        leftovers
    );

    MatchOutput {
        rows,
        matched,
        leftovers,
    }
}
