//! q-gram 索引：q-gram 提取、紧凑索引（排序 + 去重 + CSR + LUT）与过滤。

pub mod filter;
pub mod functor;
pub mod index;
pub mod reference;

pub use filter::{query_qgrams, sort_queries, QGramFilter};
pub use functor::{ConcatenatedStringSet, SetCoord, StringQGram, StringSet, StringSetQGram};
pub use index::{QGramIndex, QGramIndexCore, QGramSetIndex};
pub use reference::QGramReference;
