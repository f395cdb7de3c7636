use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::functor::{check_params, SetCoord, StringQGram, StringSet, StringSetQGram};
use crate::error::{IndexError, Result};

/// LUT 最多使用的前缀位数（2^24 + 1 个 u32）
pub const MAX_LUT_BITS: u32 = 24;

/// 紧凑 q-gram 索引。
///
/// - `qgrams`：去重后严格升序的 q-gram 字典
/// - `slots`：CSR 偏移，`slots[i]..slots[i+1]` 为 `qgrams[i]` 在 `index` 中的出现
/// - `index`：按 q-gram 分组的出现坐标（组内保持原始顺序）
/// - `lut`：可选的前缀表，`lut[p]` 为首个高 `QL*symbol_size` 位等于 p 的字典下标，
///   末尾多一项等于 `n_unique_qgrams`
///
/// 构建后只读，可被多个线程同时查询。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QGramIndexCore<C> {
    q: u32,
    symbol_size: u32,
    qgrams: Vec<u64>,
    slots: Vec<u32>,
    index: Vec<C>,
    /// LUT 覆盖的符号数
    ql: u32,
    /// 取出 LUT 前缀需要右移的位数
    qls: u32,
    lut: Vec<u32>,
}

/// 单条字符串上的索引，坐标为线性位置
pub type QGramIndex = QGramIndexCore<u32>;
/// 字符串集合上的索引，坐标为 (string-id, string-position)
pub type QGramSetIndex = QGramIndexCore<SetCoord>;

fn check_lut(q: u32, symbol_size: u32, lut_depth: u32) -> Result<()> {
    if lut_depth > q {
        return Err(IndexError::InvalidQGram { q, symbol_size, reason: "LUT depth exceeds q" });
    }
    let bits = lut_depth * symbol_size;
    if bits > MAX_LUT_BITS {
        return Err(IndexError::LutTooLarge { depth: lut_depth, bits, max_bits: MAX_LUT_BITS });
    }
    Ok(())
}

impl QGramIndexCore<u32> {
    /// 在字符串的每个位置（共 `text.len()` 个，末尾不足 q 的窗口以 0 填充）上建立索引。
    pub fn build(q: u32, symbol_size: u32, text: &[u8], lut_depth: u32) -> Result<Self> {
        check_params(q, symbol_size)?;
        check_lut(q, symbol_size, lut_depth)?;
        if text.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        let n = u32::try_from(text.len()).map_err(|_| IndexError::TooLong(text.len()))?;

        let f = StringQGram::new(q, symbol_size, text);
        let pairs: Vec<(u64, u32)> = (0..n).into_par_iter().map(|i| (f.at(i), i)).collect();
        Self::from_pairs(q, symbol_size, pairs, lut_depth)
    }
}

impl QGramIndexCore<SetCoord> {
    /// 在字符串集合中每条字符串的每个位置上建立索引，q-gram 不跨越字符串。
    pub fn build<S: StringSet + Sync + ?Sized>(q: u32, symbol_size: u32, set: &S, lut_depth: u32) -> Result<Self> {
        check_params(q, symbol_size)?;
        check_lut(q, symbol_size, lut_depth)?;
        let total = set.total_len();
        if total == 0 {
            return Err(IndexError::EmptyInput);
        }
        if total > u32::MAX as usize {
            return Err(IndexError::TooLong(total));
        }

        let f = StringSetQGram::new(q, symbol_size, set);
        let pairs: Vec<(u64, SetCoord)> = (0..set.n_strings() as u32)
            .into_par_iter()
            .flat_map_iter(|id| {
                let len = set.string(id).len() as u32;
                let f = &f;
                (0..len).map(move |pos| {
                    let coord = SetCoord::new(id, pos);
                    (f.at(coord), coord)
                })
            })
            .collect();
        Self::from_pairs(q, symbol_size, pairs, lut_depth)
    }
}

impl<C: Copy + Send + Sync> QGramIndexCore<C> {
    /// 排序、去重、生成 CSR 偏移并填充 LUT。每一步内部并行，步与步之间串行。
    fn from_pairs(q: u32, symbol_size: u32, mut pairs: Vec<(u64, C)>, lut_depth: u32) -> Result<Self> {
        let start = std::time::Instant::now();
        let n = pairs.len();

        // 稳定排序：同一 q-gram 的坐标保持原始顺序
        pairs.par_sort_by_key(|&(g, _)| g);

        let heads: Vec<u32> = (0..n)
            .into_par_iter()
            .filter(|&i| i == 0 || pairs[i].0 != pairs[i - 1].0)
            .map(|i| i as u32)
            .collect();
        let qgrams: Vec<u64> = heads.par_iter().map(|&h| pairs[h as usize].0).collect();
        let mut slots = heads;
        slots.push(n as u32);
        let index: Vec<C> = pairs.into_par_iter().map(|(_, c)| c).collect();

        let mut idx = Self { q, symbol_size, qgrams, slots, index, ql: 0, qls: 0, lut: Vec::new() };
        if lut_depth > 0 {
            idx.fill_lut(lut_depth);
        }
        log::debug!(
            "q-gram index: q={} {} positions, {} unique, LUT depth {}, built in {:.2?}",
            q,
            n,
            idx.n_unique_qgrams(),
            lut_depth,
            start.elapsed()
        );
        Ok(idx)
    }

    fn fill_lut(&mut self, lut_depth: u32) {
        let n_prefixes = 1u64 << (lut_depth * self.symbol_size);
        self.ql = lut_depth;
        self.qls = (self.q - lut_depth) * self.symbol_size;
        let n_unique = self.n_unique_qgrams();
        let qgrams = &self.qgrams;
        let qls = self.qls;
        self.lut = (0..=n_prefixes)
            .into_par_iter()
            .map(|p| {
                if p == n_prefixes {
                    n_unique
                } else {
                    qgrams.partition_point(|&g| g < (p << qls)) as u32
                }
            })
            .collect();
    }

    #[inline]
    pub fn q(&self) -> u32 {
        self.q
    }

    #[inline]
    pub fn symbol_size(&self) -> u32 {
        self.symbol_size
    }

    #[inline]
    pub fn n_unique_qgrams(&self) -> u32 {
        self.qgrams.len() as u32
    }

    /// 出现总数，即 `slots` 的最后一项
    #[inline]
    pub fn n_occurrences(&self) -> u32 {
        self.index.len() as u32
    }

    pub fn qgrams(&self) -> &[u64] {
        &self.qgrams
    }

    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    pub fn index(&self) -> &[C] {
        &self.index
    }

    pub fn lut(&self) -> Option<&[u32]> {
        (!self.lut.is_empty()).then_some(self.lut.as_slice())
    }

    pub fn lut_depth(&self) -> u32 {
        self.ql
    }

    /// 查询 q-gram g 在 `index` 中的出现区间 `[lo, hi)`；不存在时返回 `(0, 0)`。
    #[inline]
    pub fn range(&self, g: u64) -> (u32, u32) {
        let (lo, hi) = if self.lut.is_empty() {
            (0, self.qgrams.len())
        } else {
            let p = g >> self.qls;
            // 高位超出 q 个符号的值不可能在字典中
            if p >= (self.lut.len() - 1) as u64 {
                return (0, 0);
            }
            (self.lut[p as usize] as usize, self.lut[p as usize + 1] as usize)
        };

        let i = lo + self.qgrams[lo..hi].partition_point(|&x| x < g);
        if i >= self.qgrams.len() || self.qgrams[i] != g {
            return (0, 0);
        }
        (self.slots[i], self.slots[i + 1])
    }

    /// 第 slot 个出现的坐标
    #[inline]
    pub fn locate(&self, slot: u32) -> C {
        self.index[slot as usize]
    }

    pub fn try_locate(&self, slot: u32) -> Result<C> {
        self.index
            .get(slot as usize)
            .copied()
            .ok_or(IndexError::SlotOutOfBounds { slot, total: self.n_occurrences() })
    }

    /// 查询字符串第 i 个位置的 q-gram
    #[inline]
    pub fn search(&self, string: &[u8], i: u32) -> (u32, u32) {
        self.range(StringQGram::new(self.q, self.symbol_size, string).at(i))
    }

    /// 并行查询字符串上每个完整窗口的 q-gram
    pub fn search_all(&self, string: &[u8]) -> Vec<(u32, u32)> {
        let n_windows = (string.len() + 1).saturating_sub(self.q as usize) as u32;
        let f = StringQGram::new(self.q, self.symbol_size, string);
        (0..n_windows).into_par_iter().map(|i| self.range(f.at(i))).collect()
    }

    /// 占用的字节数
    pub fn used_memory(&self) -> usize {
        self.qgrams.len() * std::mem::size_of::<u64>()
            + self.slots.len() * std::mem::size_of::<u32>()
            + self.index.len() * std::mem::size_of::<C>()
            + self.lut.len() * std::mem::size_of::<u32>()
    }
}

impl<C: Serialize + for<'de> Deserialize<'de>> QGramIndexCore<C> {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(std::fs::File::create(path.as_ref())?);
        bincode::serialize_into(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(path.as_ref())?;
        Ok(bincode::deserialize_from(BufReader::new(f))?)
    }
}
