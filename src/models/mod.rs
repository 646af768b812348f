pub mod merged;
pub mod result;
pub mod row;
pub mod status;

pub use merged::{MatchMode, MergedRow, SideFields};
pub use result::{Comparison, ComparisonSummary, Counters, SideSummary, UnitTotal};
pub use row::{CanonicalRow, Cell, Side};
pub use status::{ClassifiedRow, FieldState, FieldStates, GroupedRow};
