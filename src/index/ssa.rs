use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// 稀疏采样后缀数组：行号 → 文本位置，只对部分行有值。
///
/// `has(row)` 必须与 `fetch(row).is_some()` 一致。
pub trait SampledSuffixArray {
    fn fetch(&self, row: u32) -> Option<u32>;

    fn has(&self, row: u32) -> bool {
        self.fetch(row).is_some()
    }
}

/// 按文本位置采样：保留 `sa[row] % rate == 0` 的行。
///
/// 位置 0 总被采到，所以 primary 行一定可直接解析；任意行的 inverse-psi 回溯
/// 至多 `rate - 1` 步即可命中采样。行是否被采样记录在位向量中，
/// 配合每个字的前缀 popcount 映射到紧凑的 `values` 下标。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledSa {
    rate: u32,
    rows: u32,
    marks: Vec<u64>,
    /// word_rank[w] = marks[0..w] 中置位的个数
    word_rank: Vec<u32>,
    values: Vec<u32>,
}

impl SampledSa {
    pub fn build(sa: &[u32], rate: u32) -> Result<Self> {
        if rate == 0 {
            return Err(IndexError::ZeroSampleRate);
        }
        let rows = sa.len();
        let n_words = (rows + 63) / 64;
        let mut marks = vec![0u64; n_words];
        let mut values = Vec::with_capacity(rows / rate as usize + 1);
        for (row, &p) in sa.iter().enumerate() {
            if p % rate == 0 {
                marks[row / 64] |= 1u64 << (row % 64);
                values.push(p);
            }
        }
        let mut word_rank = Vec::with_capacity(n_words);
        let mut acc = 0u32;
        for &w in &marks {
            word_rank.push(acc);
            acc += w.count_ones();
        }
        log::debug!("sampled SA: {} of {} rows kept (rate {})", values.len(), rows, rate);
        Ok(Self { rate, rows: rows as u32, marks, word_rank, values })
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn n_samples(&self) -> usize {
        self.values.len()
    }

    pub fn used_memory(&self) -> usize {
        self.marks.len() * 8 + self.word_rank.len() * 4 + self.values.len() * 4
    }
}

impl SampledSuffixArray for SampledSa {
    #[inline]
    fn fetch(&self, row: u32) -> Option<u32> {
        if !self.has(row) {
            return None;
        }
        let (w, b) = (row as usize / 64, row % 64);
        let below = (self.marks[w] & ((1u64 << b) - 1)).count_ones();
        Some(self.values[(self.word_rank[w] + below) as usize])
    }

    #[inline]
    fn has(&self, row: u32) -> bool {
        row < self.rows && (self.marks[row as usize / 64] >> (row % 64)) & 1 == 1
    }
}
