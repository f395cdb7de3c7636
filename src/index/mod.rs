//! FM 索引：SA/BWT 构建、rank 字典、采样 SA 与查询。

pub mod bwt;
pub mod fm;
pub mod rank;
pub mod reference;
pub mod sa;
pub mod ssa;

pub use fm::{DnaFmIndex, FmIndex, SaRange, BEFORE_START};
pub use rank::{BlockedRankDict, RankDictionary};
pub use ssa::{SampledSa, SampledSuffixArray};
