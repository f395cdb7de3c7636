use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bwt::build_bwt;
use super::rank::{BlockedRankDict, RankDictionary};
use super::sa::build_sa;
use super::ssa::{SampledSa, SampledSuffixArray};
use crate::error::{IndexError, Result};
use crate::util::dna::SIGMA;

/// "在第 0 行之前" 的行号约定（即 -1）
pub const BEFORE_START: u32 = u32::MAX;

/// BWT 行上的闭区间 `[x, y]`。`x > y` 表示空，规范空区间为 `(1, 0)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaRange {
    pub x: u32,
    pub y: u32,
}

impl SaRange {
    pub const EMPTY: SaRange = SaRange { x: 1, y: 0 };

    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x > self.y
    }

    /// 区间内的行数
    #[inline]
    pub fn len(&self) -> u32 {
        if self.is_empty() { 0 } else { self.y - self.x + 1 }
    }
}

/// FM 索引：rank 字典 + 采样 SA + L2 表。
///
/// - 文本长度为 `length`，行号取值 `[0, length]`，其中第 0 行是 `$` 后缀。
/// - `$` 本身不存储在 BWT 中，它所在的行是 `primary`；所有 rank 与行号运算都要跳过它。
/// - `l2[c]` = 文本中小于 c 的符号个数，`l2[4] == length`。
///
/// 构建后只读，可被任意多个线程同时查询。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmIndex<R = BlockedRankDict, S = SampledSa> {
    length: u32,
    primary: u32,
    l2: [u32; SIGMA + 1],
    rank_dict: R,
    sa: S,
}

pub type DnaFmIndex = FmIndex<BlockedRankDict, SampledSa>;

impl FmIndex<BlockedRankDict, SampledSa> {
    /// 从编码文本（0..4）构建：SA -> BWT -> rank 字典 + 采样 SA。
    ///
    /// `sa_rate` 控制 SA 采样密度（locate 至多回溯 `sa_rate - 1` 步），
    /// `block` 为 Occ 采样间隔。
    pub fn build(text: &[u8], sa_rate: u32, block: u32) -> Result<Self> {
        if text.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        if text.len() >= (u32::MAX - 1) as usize {
            return Err(IndexError::TooLong(text.len()));
        }
        if let Some(pos) = text.iter().position(|&s| s > 3) {
            return Err(IndexError::InvalidSymbol { pos, symbol: text[pos] });
        }

        let start = std::time::Instant::now();
        let sa = build_sa(text);
        let (bwt, primary) = build_bwt(text, &sa);
        log::debug!("SA/BWT built in {:.2?} (primary row {})", start.elapsed(), primary);

        let mut l2 = [0u32; SIGMA + 1];
        for &s in text {
            l2[s as usize + 1] += 1;
        }
        for c in 0..SIGMA {
            l2[c + 1] += l2[c];
        }

        let rank_dict = BlockedRankDict::build(bwt, block)?;
        let ssa = SampledSa::build(&sa, sa_rate)?;
        log::info!(
            "FM index: {} symbols, {} SA samples, {} bytes",
            text.len(),
            ssa.n_samples(),
            rank_dict.used_memory() + ssa.used_memory()
        );
        Self::from_parts(rank_dict, ssa, primary, l2)
    }

    pub fn used_memory(&self) -> usize {
        self.rank_dict.used_memory() + self.sa.used_memory() + std::mem::size_of::<Self>()
    }
}

impl<R: RankDictionary, S: SampledSuffixArray> FmIndex<R, S> {
    /// 由外部产生的 BWT rank 字典、采样 SA、primary 与 L2 表装配索引，并做一致性检查。
    pub fn from_parts(rank_dict: R, sa: S, primary: u32, l2: [u32; SIGMA + 1]) -> Result<Self> {
        let length = rank_dict.len();
        if length >= u32::MAX - 1 {
            return Err(IndexError::TooLong(length as usize));
        }
        if l2[0] != 0 || l2[SIGMA] != length {
            return Err(IndexError::Inconsistent(format!(
                "L2 must span [0, {}], got [{}, {}]",
                length, l2[0], l2[SIGMA]
            )));
        }
        for c in 0..SIGMA {
            if l2[c + 1] < l2[c] || l2[c + 1] - l2[c] != rank_dict.count(c as u8) {
                return Err(IndexError::Inconsistent(format!(
                    "L2 disagrees with the rank dictionary for symbol {}",
                    c
                )));
            }
        }
        if primary > length || (length > 0 && primary == 0) {
            return Err(IndexError::Inconsistent(format!(
                "primary row {} is invalid for length {}",
                primary, length
            )));
        }
        Ok(Self { length, primary, l2, rank_dict, sa })
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn primary(&self) -> u32 {
        self.primary
    }

    #[inline]
    pub fn l2(&self, c: u8) -> u32 {
        self.l2[c as usize]
    }

    /// 文本中符号 c 的总数
    #[inline]
    pub fn count(&self, c: u8) -> u32 {
        self.l2[c as usize + 1] - self.l2[c as usize]
    }

    pub fn rank_dict(&self) -> &R {
        &self.rank_dict
    }

    pub fn sa(&self) -> &S {
        &self.sa
    }

    #[inline]
    fn totals(&self) -> [u32; 4] {
        [self.count(0), self.count(1), self.count(2), self.count(3)]
    }

    /// 行号 → 存储 BWT 下标（$ 不在 BWT 中）
    #[inline]
    fn stored(&self, k: u32) -> u32 {
        if k >= self.primary { k - 1 } else { k }
    }

    /// 行 `[0, k]` 中符号 c 的出现次数；`k == BEFORE_START` 时为 0。
    #[inline]
    pub fn rank(&self, k: u32, c: u8) -> u32 {
        if k == BEFORE_START {
            return 0;
        }
        if k == self.length {
            return self.count(c);
        }
        debug_assert!(k < self.length);
        self.rank_dict.rank(self.stored(k), c)
    }

    /// 同时求 `[0, x]` 与 `[0, y]` 上的 rank。x、y 各自独立做 primary 修正。
    #[inline]
    pub fn rank_range(&self, range: SaRange, c: u8) -> (u32, u32) {
        if range.x == range.y {
            let r = self.rank(range.x, c);
            return (r, r);
        }
        if range.x == BEFORE_START {
            return (0, self.rank(range.y, c));
        }
        if range.y == self.length {
            return (self.rank(range.x, c), self.count(c));
        }
        debug_assert!(range.x < self.length && range.y < self.length);
        self.rank_dict.rank_range(self.stored(range.x), self.stored(range.y), c)
    }

    /// 行 `[0, k]` 中四种符号的出现次数
    #[inline]
    pub fn rank4(&self, k: u32) -> [u32; 4] {
        if k == BEFORE_START {
            return [0; 4];
        }
        if k == self.length {
            return self.totals();
        }
        debug_assert!(k < self.length);
        self.rank_dict.rank4(self.stored(k))
    }

    #[inline]
    pub fn rank4_range(&self, range: SaRange) -> ([u32; 4], [u32; 4]) {
        if range.x == range.y {
            let r = self.rank4(range.x);
            return (r, r);
        }
        if range.x == BEFORE_START {
            return ([0; 4], self.rank4(range.y));
        }
        if range.y == self.length {
            return (self.rank4(range.x), self.totals());
        }
        debug_assert!(range.x < self.length && range.y < self.length);
        self.rank_dict.rank4_range(self.stored(range.x), self.stored(range.y))
    }

    /// 全部行组成的区间 `[0, length]`
    #[inline]
    pub fn full_range(&self) -> SaRange {
        SaRange::new(0, self.length)
    }

    /// 用符号 c 向左扩展一步
    #[inline]
    fn extend(&self, range: SaRange, c: u8) -> SaRange {
        let (lo, hi) = self.rank_range(SaRange::new(range.x.wrapping_sub(1), range.y), c);
        let base = self.l2(c);
        SaRange::new(base + lo + 1, base + hi)
    }

    /// 反向搜索精确匹配，pattern 为 0..4 编码。
    pub fn backward_search(&self, pattern: &[u8]) -> SaRange {
        self.backward_search_in(pattern, self.full_range())
    }

    /// 从给定区间出发继续反向扩展（用于增量搜索）。
    ///
    /// pattern 中出现 N（> 3）时直接返回规范空区间 `(1, 0)`，与 `in_range` 无关，
    /// 也不返回已部分收窄的区间。
    pub fn backward_search_in(&self, pattern: &[u8], in_range: SaRange) -> SaRange {
        let mut range = in_range;
        for &c in pattern.iter().rev() {
            if range.is_empty() {
                break;
            }
            if c > 3 {
                return SaRange::EMPTY;
            }
            range = self.extend(range, c);
        }
        range
    }

    /// 从左到右消耗 pattern。对反向文本建的索引而言，这相当于在原文本上做前向搜索。
    pub fn match_reverse(&self, pattern: &[u8]) -> SaRange {
        let mut range = self.full_range();
        for &c in pattern {
            if range.is_empty() {
                break;
            }
            if c > 3 {
                return SaRange::EMPTY;
            }
            range = self.extend(range, c);
        }
        range
    }

    /// 不借助采样 SA 的一步 inverse psi（LF 映射）：primary 行映射到第 0 行。
    #[inline]
    pub fn basic_inv_psi(&self, i: u32) -> u32 {
        debug_assert!(i <= self.length);
        if i == self.primary {
            return 0;
        }
        let k = self.stored(i);
        let c = self.rank_dict.symbol(k);
        self.l2(c) + self.rank_dict.rank(k, c)
    }

    /// 沿 LF 回溯直到 `sampled(j)` 为真，返回 (命中的行, 步数)
    #[inline]
    fn walk(&self, i: u32, sampled: impl Fn(u32) -> bool) -> (u32, u32) {
        let mut j = i;
        let mut t = 0u32;
        while !sampled(j) {
            j = self.basic_inv_psi(j);
            t += 1;
            debug_assert!(t <= self.length, "inverse psi walk did not reach a sample");
        }
        (j, t)
    }

    #[inline]
    fn wrap(&self, suffix: u32, t: u32) -> u32 {
        ((suffix as u64 + t as u64) % (self.length as u64 + 1)) as u32
    }

    /// 从行 i 回溯到最近的采样行，返回 (采样行, 步数)
    pub fn inv_psi(&self, i: u32) -> (u32, u32) {
        debug_assert!(i <= self.length);
        self.walk(i, |j| self.sa.fetch(j).is_some())
    }

    /// 行号 → 文本中的起始位置
    pub fn locate(&self, i: u32) -> u32 {
        debug_assert!(i <= self.length);
        let mut j = i;
        let mut t = 0u32;
        let suffix = loop {
            if let Some(s) = self.sa.fetch(j) {
                break s;
            }
            j = self.basic_inv_psi(j);
            t += 1;
            debug_assert!(t <= self.length, "inverse psi walk did not reach a sample");
        };
        self.wrap(suffix, t)
    }

    /// 带越界检查的 [`locate`](Self::locate)
    pub fn try_locate(&self, i: u32) -> Result<u32> {
        if i > self.length {
            return Err(IndexError::RowOutOfBounds { row: i, length: self.length });
        }
        Ok(self.locate(i))
    }

    /// locate 的拆分形式之一：只用 `has` 找到最近的采样行及偏移，稍后批量取值
    pub fn locate_ssa_iterator(&self, i: u32) -> (u32, u32) {
        debug_assert!(i <= self.length);
        self.walk(i, |j| self.sa.has(j))
    }

    /// locate 的拆分形式之二：SSA[row] + 步数。row 未被采样时返回 None
    pub fn lookup_ssa_iterator(&self, it: (u32, u32)) -> Option<u32> {
        self.sa.fetch(it.0).map(|s| self.wrap(s, it.1))
    }
}

impl<R, S> FmIndex<R, S>
where
    R: RankDictionary + Sync,
    S: SampledSuffixArray + Sync,
{
    /// 并行地对一批 pattern 做反向搜索
    pub fn match_batch<P: AsRef<[u8]> + Sync>(&self, patterns: &[P]) -> Vec<SaRange> {
        patterns.par_iter().map(|p| self.backward_search(p.as_ref())).collect()
    }

    /// 解析区间内所有行的文本位置（按行序）。
    ///
    /// 先并行找出每行最近的采样行，再统一取样本值。
    pub fn locate_range(&self, range: SaRange) -> Vec<u32> {
        if range.is_empty() {
            return Vec::new();
        }
        debug_assert!(range.y <= self.length);
        let iters: Vec<(u32, u32)> =
            (range.x..=range.y).into_par_iter().map(|i| self.locate_ssa_iterator(i)).collect();
        iters.par_iter().filter_map(|&it| self.lookup_ssa_iterator(it)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna;

    /// 逐个扫描的 rank 字典，用作参照
    struct NaiveRank(Vec<u8>);

    impl RankDictionary for NaiveRank {
        fn len(&self) -> u32 {
            self.0.len() as u32
        }
        fn symbol(&self, k: u32) -> u8 {
            self.0[k as usize]
        }
        fn rank(&self, k: u32, c: u8) -> u32 {
            self.0[..=k as usize].iter().filter(|&&s| s == c).count() as u32
        }
        fn rank4(&self, k: u32) -> [u32; 4] {
            [self.rank(k, 0), self.rank(k, 1), self.rank(k, 2), self.rank(k, 3)]
        }
        fn count(&self, c: u8) -> u32 {
            self.0.iter().filter(|&&s| s == c).count() as u32
        }
    }

    /// 只保存部分行的 SA，用来制造需要绕过 primary 的回溯
    struct RowsSa(Vec<Option<u32>>);

    impl SampledSuffixArray for RowsSa {
        fn fetch(&self, row: u32) -> Option<u32> {
            self.0.get(row as usize).copied().flatten()
        }
    }

    fn make_text(len: usize, seed: u32) -> Vec<u8> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((x >> 16) % 4) as u8
            })
            .collect()
    }

    fn naive_occurrences(text: &[u8], pat: &[u8]) -> Vec<u32> {
        if pat.len() > text.len() {
            return Vec::new();
        }
        (0..=text.len() - pat.len())
            .filter(|&i| &text[i..i + pat.len()] == pat)
            .map(|i| i as u32)
            .collect()
    }

    fn l2_of(text: &[u8]) -> [u32; 5] {
        let mut l2 = [0u32; 5];
        for &s in text {
            l2[s as usize + 1] += 1;
        }
        for c in 0..4 {
            l2[c + 1] += l2[c];
        }
        l2
    }

    #[test]
    fn rank_at_primary_adjusts_once() {
        // 手工构造 ACGTACGTTGCA 的完整 BWT（含 $ 行），与朴素的行计数对比
        let text = dna::encode(b"ACGTACGTTGCA");
        let n = text.len();
        let mut rows: Vec<usize> = (0..=n).collect();
        rows.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        const DOLLAR: u8 = 255;
        let full: Vec<u8> = rows.iter().map(|&p| if p == 0 { DOLLAR } else { text[p - 1] }).collect();
        let primary = full.iter().position(|&s| s == DOLLAR).unwrap() as u32;
        let stored: Vec<u8> = full.iter().copied().filter(|&s| s != DOLLAR).collect();

        let sa = RowsSa(rows.iter().map(|&p| Some(p as u32)).collect());
        let fm = FmIndex::from_parts(NaiveRank(stored), sa, primary, l2_of(&text)).unwrap();
        assert_eq!(fm.primary(), primary);

        for k in 0..=n {
            for c in 0..4u8 {
                let expect = full[..=k].iter().filter(|&&s| s == c).count() as u32;
                assert_eq!(fm.rank(k as u32, c), expect, "k={} c={}", k, c);
            }
        }
        // 正好在 primary 上：[0, primary] 与 [0, primary-1] 的计数相同
        for c in 0..4u8 {
            assert_eq!(fm.rank(primary, c), fm.rank(primary - 1, c));
        }
    }

    #[test]
    fn rank_boundaries_and_monotonicity() {
        let text = make_text(97, 11);
        let fm = FmIndex::build(&text, 4, 8).unwrap();
        for c in 0..4u8 {
            assert_eq!(fm.rank(BEFORE_START, c), 0);
            assert_eq!(fm.rank(fm.length(), c), fm.count(c));
            for k in 0..fm.length() {
                let a = fm.rank(k, c);
                let b = fm.rank(k + 1, c);
                assert!(a <= b && b <= a + 1, "k={} c={}", k, c);
            }
        }
        let total: u32 = (0..4u8).map(|c| fm.count(c)).sum();
        assert_eq!(total, fm.length());
    }

    #[test]
    fn range_rank_degenerate_cases() {
        let text = make_text(50, 3);
        let fm = FmIndex::build(&text, 3, 5).unwrap();
        let len = fm.length();
        let p = fm.primary();
        for c in 0..4u8 {
            assert_eq!(fm.rank_range(SaRange::new(7, 7), c), (fm.rank(7, c), fm.rank(7, c)));
            assert_eq!(fm.rank_range(SaRange::new(BEFORE_START, 9), c), (0, fm.rank(9, c)));
            assert_eq!(fm.rank_range(SaRange::new(4, len), c), (fm.rank(4, c), fm.count(c)));
            // x < primary <= y：只有 y 被修正
            let y = (p + 3).min(len - 1);
            let r = SaRange::new(p - 1, y);
            assert_eq!(fm.rank_range(r, c), (fm.rank(p - 1, c), fm.rank(y, c)));
        }

        assert_eq!(fm.rank4(BEFORE_START), [0; 4]);
        let totals = [fm.count(0), fm.count(1), fm.count(2), fm.count(3)];
        assert_eq!(fm.rank4(len), totals);
        let (lo, hi) = fm.rank4_range(SaRange::new(12, 12));
        assert_eq!(lo, hi);
        let (lo, hi) = fm.rank4_range(SaRange::new(BEFORE_START, 20));
        assert_eq!(lo, [0; 4]);
        assert_eq!(hi, fm.rank4(20));
        let (lo, hi) = fm.rank4_range(SaRange::new(3, len));
        assert_eq!(lo, fm.rank4(3));
        assert_eq!(hi, totals);
        let (lo, hi) = fm.rank4_range(SaRange::new(2, 30));
        for c in 0..4u8 {
            assert_eq!(lo[c as usize], fm.rank(2, c));
            assert_eq!(hi[c as usize], fm.rank(30, c));
        }
    }

    #[test]
    fn backward_search_counts_and_locates_every_occurrence() {
        let text = make_text(160, 42);
        for rate in [1u32, 4, 7] {
            let fm = FmIndex::build(&text, rate, 16).unwrap();
            for plen in 1..=6usize {
                for start in (0..text.len() - plen).step_by(13) {
                    let pat = &text[start..start + plen];
                    let expect = naive_occurrences(&text, pat);
                    let range = fm.backward_search(pat);
                    assert_eq!(range.len() as usize, expect.len(), "rate={} pat={:?}", rate, pat);
                    let mut got: Vec<u32> = (range.x..=range.y).map(|i| fm.locate(i)).collect();
                    got.sort_unstable();
                    assert_eq!(got, expect);
                }
            }
        }
    }

    #[test]
    fn absent_pattern_gives_empty_range() {
        let text = dna::encode(b"AAAAAAAAAA");
        let fm = FmIndex::build(&text, 2, 4).unwrap();
        let r = fm.backward_search(&dna::encode(b"AC"));
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(fm.backward_search(&dna::encode(b"AAAAAAAAAAA")).len(), 0);
        assert_eq!(fm.backward_search(&dna::encode(b"AAA")).len(), 8);
    }

    #[test]
    fn ambiguous_symbol_never_matches() {
        let text = make_text(64, 5);
        let fm = FmIndex::build(&text, 4, 8).unwrap();
        let mut pat = text[10..18].to_vec();
        assert!(!fm.backward_search(&pat).is_empty());
        pat[3] = dna::N;
        assert_eq!(fm.backward_search(&pat), SaRange::EMPTY);
        assert_eq!(fm.match_reverse(&pat), SaRange::EMPTY);
        let partial = fm.backward_search(&pat[4..]);
        assert_eq!(fm.backward_search_in(&pat[..4], partial), SaRange::EMPTY);
    }

    #[test]
    fn incremental_extension_equals_full_search() {
        let text = dna::encode(b"ACGTACGTTGCAACGTGGA");
        let fm = FmIndex::build(&text, 3, 4).unwrap();
        let suffix = fm.backward_search(&dna::encode(b"GT"));
        let extended = fm.backward_search_in(&dna::encode(b"AC"), suffix);
        assert_eq!(extended, fm.backward_search(&dna::encode(b"ACGT")));
        assert_eq!(extended.len(), 3);
    }

    #[test]
    fn match_reverse_consumes_left_to_right() {
        let text = make_text(120, 9);
        let fm = FmIndex::build(&text, 5, 16).unwrap();
        for start in (0..100).step_by(9) {
            let pat = &text[start..start + 5];
            let rev: Vec<u8> = pat.iter().rev().copied().collect();
            assert_eq!(fm.match_reverse(pat), fm.backward_search(&rev));
        }
    }

    #[test]
    fn locate_is_a_bijection_and_inv_psi_agrees() {
        let text = make_text(75, 77);
        let fm = FmIndex::build(&text, 6, 8).unwrap();
        let mut seen = vec![false; text.len() + 1];
        for i in 0..=fm.length() {
            let p = fm.locate(i);
            assert!(!seen[p as usize], "position {} located twice", p);
            seen[p as usize] = true;

            let (row, t) = fm.inv_psi(i);
            assert_eq!(fm.sa().fetch(row).unwrap() + t, p);
            let it = fm.locate_ssa_iterator(i);
            assert_eq!(it, (row, t));
            assert_eq!(fm.lookup_ssa_iterator(it), Some(p));
            assert!(t < 6);
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(fm.locate(0), fm.length());
        assert_eq!(fm.locate(fm.primary()), 0);
    }

    #[test]
    fn locate_wraps_through_primary() {
        // 只采样第 0 行（$ 后缀），任何回溯都要经过 primary 再跳回第 0 行
        let text = make_text(30, 123);
        let sa = build_sa(&text);
        let (bwt, primary) = build_bwt(&text, &sa);
        let mut rows = vec![None; sa.len()];
        rows[0] = Some(sa[0]);
        let fm = FmIndex::from_parts(NaiveRank(bwt), RowsSa(rows), primary, l2_of(&text)).unwrap();
        for (i, &p) in sa.iter().enumerate() {
            assert_eq!(fm.locate(i as u32), p);
        }
    }

    #[test]
    fn batch_operations_match_scalar_ones() {
        let text = make_text(200, 8);
        let fm = FmIndex::build(&text, 8, 32).unwrap();
        let patterns: Vec<Vec<u8>> = (0..20).map(|i| text[i * 7..i * 7 + 4].to_vec()).collect();
        let ranges = fm.match_batch(&patterns);
        for (p, r) in patterns.iter().zip(&ranges) {
            assert_eq!(*r, fm.backward_search(p));
            let located = fm.locate_range(*r);
            let scalar: Vec<u32> = (r.x..=r.y).map(|i| fm.locate(i)).collect();
            assert_eq!(located, scalar);
        }
        assert!(fm.locate_range(SaRange::EMPTY).is_empty());
    }

    #[test]
    fn checked_locate_and_construction_errors() {
        let fm = FmIndex::build(&dna::encode(b"GATTACA"), 2, 2).unwrap();
        assert!(fm.try_locate(fm.length()).is_ok());
        assert!(matches!(
            fm.try_locate(fm.length() + 1),
            Err(IndexError::RowOutOfBounds { row: 8, length: 7 })
        ));
        assert!(matches!(FmIndex::build(&[], 2, 2), Err(IndexError::EmptyInput)));
        assert!(matches!(
            FmIndex::build(&[0, 1, 4], 2, 2),
            Err(IndexError::InvalidSymbol { pos: 2, symbol: 4 })
        ));

        let bad_l2 = [0, 1, 2, 3, 9];
        let r = FmIndex::from_parts(NaiveRank(vec![0, 1, 2, 3]), RowsSa(vec![]), 1, bad_l2);
        assert!(matches!(r, Err(IndexError::Inconsistent(_))));
    }
}
