use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// 存储 BWT（不含 `$` 行）上的 rank 查询接口。
///
/// 所有位置都是存储序列中的下标，区间 `[0, k]` 为闭区间。
/// FM 索引层负责处理 `$` 行的偏移，实现者无需关心 primary。
pub trait RankDictionary {
    /// 存储的符号数
    fn len(&self) -> u32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 第 k 个存储符号
    fn symbol(&self, k: u32) -> u8;

    /// `[0, k]` 中符号 c 的出现次数
    fn rank(&self, k: u32, c: u8) -> u32;

    /// `[0, k]` 中四种符号各自的出现次数
    fn rank4(&self, k: u32) -> [u32; 4];

    /// 同时计算 `[0, x]` 与 `[0, y]` 的 rank
    fn rank_range(&self, x: u32, y: u32, c: u8) -> (u32, u32) {
        (self.rank(x, c), self.rank(y, c))
    }

    fn rank4_range(&self, x: u32, y: u32) -> ([u32; 4], [u32; 4]) {
        (self.rank4(x), self.rank4(y))
    }

    /// 整个序列中符号 c 的总数
    fn count(&self, c: u8) -> u32;
}

/// 定长分块的 Occ 采样：每 `block` 个符号记录一次四种符号的累计计数，
/// 块内剩余部分顺序扫描补偿。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedRankDict {
    block: u32,
    bwt: Vec<u8>,
    /// occ[b][c] = bwt[0 .. b*block) 中 c 的个数
    occ: Vec<[u32; 4]>,
    totals: [u32; 4],
}

impl BlockedRankDict {
    pub fn build(bwt: Vec<u8>, block: u32) -> Result<Self> {
        if block == 0 {
            return Err(IndexError::Inconsistent("rank block size must be positive".into()));
        }
        if bwt.len() >= u32::MAX as usize {
            return Err(IndexError::TooLong(bwt.len()));
        }
        if let Some(pos) = bwt.iter().position(|&s| s > 3) {
            return Err(IndexError::InvalidSymbol { pos, symbol: bwt[pos] });
        }

        let block_us = block as usize;
        let mut occ = Vec::with_capacity(bwt.len() / block_us + 1);
        let mut running = [0u32; 4];
        for chunk in bwt.chunks(block_us) {
            occ.push(running);
            for &ch in chunk {
                running[ch as usize] += 1;
            }
        }
        // 末尾补一个完整计数，使 len 恰好为 block 整数倍时也不会越界
        occ.push(running);

        Ok(Self { block, bwt, occ, totals: running })
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn bwt(&self) -> &[u8] {
        &self.bwt
    }

    /// 占用的字节数
    pub fn used_memory(&self) -> usize {
        self.bwt.len() + self.occ.len() * std::mem::size_of::<[u32; 4]>()
    }
}

impl RankDictionary for BlockedRankDict {
    #[inline]
    fn len(&self) -> u32 {
        self.bwt.len() as u32
    }

    #[inline]
    fn symbol(&self, k: u32) -> u8 {
        self.bwt[k as usize]
    }

    #[inline]
    fn rank(&self, k: u32, c: u8) -> u32 {
        debug_assert!(k < self.len());
        let k = k as usize;
        let block = self.block as usize;
        let bi = k / block;
        let base = self.occ[bi][c as usize];
        let add = self.bwt[bi * block..=k].iter().filter(|&&ch| ch == c).count() as u32;
        base + add
    }

    #[inline]
    fn rank4(&self, k: u32) -> [u32; 4] {
        debug_assert!(k < self.len());
        let k = k as usize;
        let block = self.block as usize;
        let bi = k / block;
        let mut out = self.occ[bi];
        for &ch in &self.bwt[bi * block..=k] {
            out[ch as usize] += 1;
        }
        out
    }

    #[inline]
    fn count(&self, c: u8) -> u32 {
        self.totals[c as usize]
    }
}
