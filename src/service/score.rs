use std::cmp::Ordering;

/// 候选评分, 按字段顺序做字典序比较:
/// NCM > 内部编码 > 词元(1,2,3) > -|Δ数量| > -|Δ金额|
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub classification_equal: bool,
    pub code_equal: bool,
    pub token_equal: [bool; 3],
    pub quantity_delta: f64,
    pub value_delta: f64,
}

impl MatchScore {
    pub fn new(
        classification_equal: bool,
        code_equal: bool,
        token_equal: [bool; 3],
        quantity_gap: f64,
        value_gap: f64,
    ) -> Self {
        Self {
            classification_equal,
            code_equal,
            token_equal,
            quantity_delta: -quantity_gap.abs(),
            value_delta: -value_gap.abs(),
        }
    }

    /// 字典序比较; NaN 视为相等
    pub fn compare(&self, other: &Self) -> Ordering {
        self.classification_equal
            .cmp(&other.classification_equal)
            .then(self.code_equal.cmp(&other.code_equal))
            .then(self.token_equal.cmp(&other.token_equal))
            .then(
                self.quantity_delta
                    .partial_cmp(&other.quantity_delta)
                    .unwrap_or(Ordering::Equal),
            )
            .then(
                self.value_delta
                    .partial_cmp(&other.value_delta)
                    .unwrap_or(Ordering::Equal),
            )
    }

    /// 严格更优才替换, 平局保留先出现的候选
    pub fn beats(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

/// 返回评分最高的下标; 平局取最早的
pub fn best_of<I>(scored: I) -> Option<(usize, MatchScore)>
where
    I: IntoIterator<Item = (usize, MatchScore)>,
{
    let mut best: Option<(usize, MatchScore)> = None;
    for (idx, score) in scored {
        let is_better = match &best {
            None => true,
            Some((_, best_score)) => score.beats(best_score),
        };
        if is_better {
            best = Some((idx, score));
        }
    }
    best
}
