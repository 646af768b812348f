use crate::models::{ClassifiedRow, Counters, FieldState};

/// 统计所有行所有字段的 ok / warn / miss 数量
pub fn count_states(rows: &[ClassifiedRow]) -> Counters {
    let mut counters = Counters::default();
    for state in rows.iter().flat_map(|r| r.states.all()) {
        match state {
            FieldState::Ok => counters.ok += 1,
            FieldState::Warn => counters.warn += 1,
            FieldState::Miss => counters.miss += 1,
        }
    }
    counters.total = counters.ok + counters.warn + counters.miss;
    counters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldStates, MatchMode, MergedRow, SideFields};

    fn classified(states: FieldStates) -> ClassifiedRow {
        ClassifiedRow {
            row: MergedRow {
                key: String::new(),
                order: String::new(),
                co: SideFields::default(),
                fc: SideFields::default(),
                match_mode: MatchMode::Description,
            },
            severity: states.worst(),
            has_diff: states.has_diff(),
            states,
        }
    }

    #[test]
    fn counts_every_field_of_every_row() {
        use FieldState::*;
        let rows = vec![
            classified(FieldStates { classification: Ok, description: Ok, quantity: Warn, unit: Ok, value: Miss }),
            classified(FieldStates { classification: Miss, description: Miss, quantity: Miss, unit: Miss, value: Miss }),
        ];
        let c = count_states(&rows);
        assert_eq!(c, Counters { ok: 3, warn: 1, miss: 6, total: 10 });
    }

    #[test]
    fn empty_input_counts_nothing() {
        assert_eq!(count_states(&[]), Counters::default());
    }
}
