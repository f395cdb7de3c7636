//! 基于 q-gram 索引的过滤：把一批查询 q-gram 展开成 (索引坐标, 查询下标) 命中表。
//!
//! 只依赖索引的 `range()` 与 `locate()`。

use rayon::prelude::*;

use super::functor::StringQGram;
use super::index::QGramIndexCore;

/// 查询串上每个完整窗口的 q-gram，共 `len - q + 1` 个（不足 q 时为空）
pub fn query_qgrams(q: u32, symbol_size: u32, string: &[u8]) -> Vec<u64> {
    let n_windows = (string.len() + 1).saturating_sub(q as usize) as u32;
    let f = StringQGram::new(q, symbol_size, string);
    (0..n_windows).map(|i| f.at(i)).collect()
}

/// 按 q-gram 值排序，同时返回每个 q-gram 原来的下标。
/// 排序后的查询访问索引时局部性更好，且相同的 q-gram 相邻。
pub fn sort_queries(qgrams: &[u64]) -> (Vec<u64>, Vec<u32>) {
    let mut pairs: Vec<(u64, u32)> = qgrams.iter().enumerate().map(|(i, &g)| (g, i as u32)).collect();
    pairs.par_sort_unstable();
    pairs.into_iter().unzip()
}

/// 命中：索引中的坐标，以及产生它的查询下标
pub type Hit<C> = (C, u32);

#[derive(Debug, Clone, Default)]
pub struct QGramFilter<C> {
    ranges: Vec<(u32, u32)>,
    /// ranges 大小的排他前缀和，末尾为命中总数
    offsets: Vec<usize>,
    hits: Vec<Hit<C>>,
}

impl<C: Copy + Send + Sync> QGramFilter<C> {
    pub fn new() -> Self {
        Self { ranges: Vec::new(), offsets: Vec::new(), hits: Vec::new() }
    }

    /// 对 `qgrams[i]` 查询索引，每个出现记为 `(locate(slot), query_indices[i])`。
    /// 返回命中总数；结果按查询顺序分组，组内按 slot 顺序。
    ///
    /// 两个切片应等长；长度不同时只处理较短的那部分。
    pub fn enact(&mut self, index: &QGramIndexCore<C>, qgrams: &[u64], query_indices: &[u32]) -> usize {
        let n = qgrams.len().min(query_indices.len());
        let (qgrams, query_indices) = (&qgrams[..n], &query_indices[..n]);

        self.ranges = qgrams.par_iter().map(|&g| index.range(g)).collect();

        self.offsets.clear();
        self.offsets.reserve(self.ranges.len() + 1);
        let mut total = 0usize;
        for &(lo, hi) in &self.ranges {
            self.offsets.push(total);
            total += (hi - lo) as usize;
        }
        self.offsets.push(total);

        self.hits = self
            .ranges
            .par_iter()
            .zip(query_indices.par_iter())
            .flat_map_iter(|(&(lo, hi), &qi)| (lo..hi).map(move |slot| (index.locate(slot), qi)))
            .collect();
        debug_assert_eq!(self.hits.len(), total);

        log::debug!("q-gram filter: {} queries, {} hits", qgrams.len(), total);
        total
    }

    #[inline]
    pub fn n_hits(&self) -> usize {
        self.hits.len()
    }

    pub fn hits(&self) -> &[Hit<C>] {
        &self.hits
    }

    /// 第 i 个查询的 `[lo, hi)` 区间
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// 第 i 个查询产生的命中
    pub fn hits_of(&self, i: usize) -> &[Hit<C>] {
        &self.hits[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn into_hits(self) -> Vec<Hit<C>> {
        self.hits
    }
}

impl<C: Copy + Ord + Send + Sync> QGramFilter<C> {
    /// 排序并去除重复命中，返回剩余数量。此后 `hits_of` 不再有效。
    pub fn merge(&mut self) -> usize {
        self.hits.par_sort_unstable();
        self.hits.dedup();
        self.offsets.clear();
        self.hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qgram::functor::{ConcatenatedStringSet, SetCoord};
    use crate::qgram::index::{QGramIndex, QGramSetIndex};
    use crate::util::dna;

    fn make_text(len: usize, seed: u32) -> Vec<u8> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((x >> 16) % 4) as u8
            })
            .collect()
    }

    #[test]
    fn query_windows() {
        let s = dna::encode(b"ACGTAC");
        let g = query_qgrams(4, 2, &s);
        assert_eq!(g.len(), 3);
        assert_eq!(g[0], StringQGram::new(4, 2, &s).at(0));
        assert_eq!(g[2], StringQGram::new(4, 2, &s).at(2));
        assert!(query_qgrams(8, 2, &s).is_empty());
        assert_eq!(query_qgrams(6, 2, &s).len(), 1);
    }

    #[test]
    fn sorted_queries_keep_original_indices() {
        let g = vec![9u64, 3, 7, 3];
        let (sorted, idx) = sort_queries(&g);
        assert_eq!(sorted, vec![3, 3, 7, 9]);
        assert_eq!(idx, vec![1, 3, 2, 0]);
        for (s, &i) in sorted.iter().zip(&idx) {
            assert_eq!(*s, g[i as usize]);
        }
    }

    #[test]
    fn hits_match_naive_expansion() {
        let text = make_text(500, 8);
        let q = 6;
        let idx = QGramIndex::build(q, 2, &text, 3).unwrap();
        let read = [&text[100..130], &[1u8, 2, 3, 0, 0, 1][..], &text[400..420]].concat();

        let qgrams = query_qgrams(q, 2, &read);
        let (sorted, order) = sort_queries(&qgrams);
        let mut filter = QGramFilter::new();
        let n = filter.enact(&idx, &sorted, &order);
        assert_eq!(n, filter.n_hits());
        assert_eq!(filter.ranges().len(), sorted.len());
        assert_eq!(*filter.offsets().last().unwrap(), n);

        // 每个命中都是真实出现
        let f = StringQGram::new(q, 2, &text);
        for &(pos, qi) in filter.hits() {
            assert_eq!(f.at(pos), qgrams[qi as usize]);
        }
        // 每个真实出现都被报告
        let mut expected = 0usize;
        for (qi, &g) in qgrams.iter().enumerate() {
            for pos in 0..text.len() as u32 {
                if f.at(pos) == g {
                    expected += 1;
                    assert!(filter.hits().contains(&(pos, qi as u32)));
                }
            }
        }
        assert_eq!(expected, n);

        // 读段的前 25 个窗口都来自 text[100..]
        for i in 0..25 {
            let k = order.iter().position(|&o| o == i).unwrap();
            assert!(filter.hits_of(k).contains(&(100 + i, i)));
        }
    }

    #[test]
    fn absent_queries_produce_no_hits() {
        let text = dna::encode(b"AAAAAAAAAA");
        let idx = QGramIndex::build(4, 2, &text, 2).unwrap();
        let qgrams = query_qgrams(4, 2, &dna::encode(b"CCCCGG"));
        let order: Vec<u32> = (0..qgrams.len() as u32).collect();
        let mut filter = QGramFilter::new();
        assert_eq!(filter.enact(&idx, &qgrams, &order), 0);
        assert!(filter.ranges().iter().all(|&r| r == (0, 0)));
        assert!(filter.hits_of(1).is_empty());
    }

    #[test]
    fn set_index_hits_and_merge() {
        let set = ConcatenatedStringSet::from_strings([dna::encode(b"ACGTACGT"), dna::encode(b"GGACGTT")]).unwrap();
        let idx = QGramSetIndex::build(4, 2, &set, 0).unwrap();
        let acgt = query_qgrams(4, 2, &dna::encode(b"ACGT"))[0];

        let mut filter = QGramFilter::new();
        // 同一个查询下标出现两次，合并后去重
        assert_eq!(filter.enact(&idx, &[acgt, acgt], &[0, 0]), 6);
        assert_eq!(filter.merge(), 3);
        assert_eq!(
            filter.into_hits(),
            vec![(SetCoord::new(0, 0), 0), (SetCoord::new(0, 4), 0), (SetCoord::new(1, 2), 0)]
        );
    }

    #[test]
    fn mismatched_lengths_use_the_shorter_slice() {
        // AC 出现在 0，CG 出现在 1
        let idx = QGramIndex::build(2, 2, &[0, 1, 2, 3], 0).unwrap();
        let ac = StringQGram::new(2, 2, &[0, 1]).at(0);
        let cg = StringQGram::new(2, 2, &[1, 2]).at(0);

        let mut filter = QGramFilter::new();
        assert_eq!(filter.enact(&idx, &[ac, cg], &[7]), 1);
        assert_eq!(filter.ranges().len(), 1);
        assert_eq!(filter.offsets(), &[0, 1]);
        assert_eq!(filter.hits(), &[(0, 7)]);

        assert_eq!(filter.enact(&idx, &[cg], &[3, 4, 5]), 1);
        assert_eq!(filter.hits(), &[(1, 3)]);
    }
}
