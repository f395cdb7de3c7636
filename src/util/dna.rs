//! 2-bit DNA 字母表：A=0, C=1, G=2, T=3，其余一律视为 N=4。

use crate::error::{IndexError, Result};

/// 索引使用的字母表大小（不含 N）
pub const SIGMA: usize = 4;
/// 模糊碱基的编码，> 3 的符号在检索时一律视为不匹配
pub const N: u8 = 4;
/// 每个碱基占用的比特数
pub const SYMBOL_BITS: u32 = 2;

#[inline]
pub fn to_alphabet(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' | b'U' => 3,
        _ => N,
    }
}

#[inline]
pub fn from_alphabet(a: u8) -> u8 {
    match a {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        3 => b'T',
        _ => b'N',
    }
}

pub fn encode(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| to_alphabet(b)).collect()
}

/// ASCII → 编码序列。空输入直接报错，而不是返回空向量。
pub fn from_string(s: &str) -> Result<Vec<u8>> {
    if s.is_empty() {
        return Err(IndexError::EmptyInput);
    }
    Ok(encode(s.as_bytes()))
}

/// 编码序列 → ASCII。
pub fn to_string(symbols: &[u8]) -> Result<String> {
    if symbols.is_empty() {
        return Err(IndexError::EmptyInput);
    }
    Ok(symbols.iter().map(|&a| from_alphabet(a) as char).collect())
}

/// 编码后的互补：N 保持不变
#[inline]
pub fn complement(a: u8) -> u8 {
    if a < 4 { 3 - a } else { a }
}

/// 编码序列的反向互补
pub fn revcomp(symbols: &[u8]) -> Vec<u8> {
    symbols.iter().rev().map(|&a| complement(a)).collect()
}

/// 用确定性的伪随机碱基替换参考序列中的 N，使其可以进入 4 字母 BWT。
/// 返回被替换的碱基数。
pub fn fill_ambiguous(symbols: &mut [u8], seed: u32) -> usize {
    let mut x = seed;
    let mut n = 0usize;
    for s in symbols.iter_mut() {
        if *s > 3 {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            *s = ((x >> 16) & 3) as u8;
            n += 1;
        }
    }
    n
}
