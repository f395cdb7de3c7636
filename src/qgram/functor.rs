//! 从字符串 / 字符串集合中提取打包后的 q-gram。
//!
//! 第 j 个符号占据 `[j*symbol_size, (j+1)*symbol_size)` 位；超出字符串末尾的位置按 0 填充，
//! 需要完整窗口语义的调用方应自行丢弃越界的 q-gram。

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// 字符串集合中的坐标 (string-id, string-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SetCoord {
    pub string_id: u32,
    pub pos: u32,
}

impl SetCoord {
    pub const fn new(string_id: u32, pos: u32) -> Self {
        Self { string_id, pos }
    }
}

/// 检查 q 与符号位宽：q >= 1，1 <= symbol_size <= 8，总位数不超过 64
pub fn check_params(q: u32, symbol_size: u32) -> Result<()> {
    let reason = if q == 0 {
        "q must be positive"
    } else if symbol_size == 0 || symbol_size > 8 {
        "symbol size must be within 1..=8 bits"
    } else if q as u64 * symbol_size as u64 > 64 {
        "q-gram does not fit in 64 bits"
    } else {
        return Ok(());
    };
    Err(IndexError::InvalidQGram { q, symbol_size, reason })
}

#[inline]
fn pack(q: u32, symbol_size: u32, mask: u64, window: &[u8]) -> u64 {
    let mut qgram = 0u64;
    for (j, &s) in window.iter().take(q as usize).enumerate() {
        qgram |= (s as u64 & mask) << (j as u32 * symbol_size);
    }
    qgram
}

/// 取字符串第 i 个位置开始的 q-gram
#[derive(Debug, Clone, Copy)]
pub struct StringQGram<'a> {
    q: u32,
    symbol_size: u32,
    symbol_mask: u64,
    string: &'a [u8],
}

impl<'a> StringQGram<'a> {
    pub fn new(q: u32, symbol_size: u32, string: &'a [u8]) -> Self {
        debug_assert!(check_params(q, symbol_size).is_ok());
        Self { q, symbol_size, symbol_mask: (1u64 << symbol_size) - 1, string }
    }

    #[inline]
    pub fn at(&self, i: u32) -> u64 {
        let start = (i as usize).min(self.string.len());
        pack(self.q, self.symbol_size, self.symbol_mask, &self.string[start..])
    }
}

/// 由多条字符串组成的集合
pub trait StringSet {
    fn n_strings(&self) -> usize;

    fn string(&self, id: u32) -> &[u8];

    fn total_len(&self) -> usize {
        (0..self.n_strings() as u32).map(|i| self.string(i).len()).sum()
    }
}

impl StringSet for Vec<Vec<u8>> {
    fn n_strings(&self) -> usize {
        self.len()
    }

    fn string(&self, id: u32) -> &[u8] {
        &self[id as usize]
    }
}

/// 所有字符串首尾相接存放，`offsets[i]..offsets[i+1]` 为第 i 条
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcatenatedStringSet {
    symbols: Vec<u8>,
    offsets: Vec<u32>,
}

impl ConcatenatedStringSet {
    pub fn new(symbols: Vec<u8>, offsets: Vec<u32>) -> Result<Self> {
        let ok = offsets.first() == Some(&0)
            && offsets.windows(2).all(|w| w[0] <= w[1])
            && offsets.last().map(|&e| e as usize) == Some(symbols.len());
        if !ok {
            return Err(IndexError::Inconsistent("string-set offsets must ascend from 0 to the symbol count".into()));
        }
        Ok(Self { symbols, offsets })
    }

    pub fn from_strings<I, S>(strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut symbols = Vec::new();
        let mut offsets = vec![0u32];
        for s in strings {
            symbols.extend_from_slice(s.as_ref());
            let end = u32::try_from(symbols.len()).map_err(|_| IndexError::TooLong(symbols.len()))?;
            offsets.push(end);
        }
        Ok(Self { symbols, offsets })
    }
}

impl StringSet for ConcatenatedStringSet {
    fn n_strings(&self) -> usize {
        self.offsets.len() - 1
    }

    fn string(&self, id: u32) -> &[u8] {
        let i = id as usize;
        &self.symbols[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    fn total_len(&self) -> usize {
        self.symbols.len()
    }
}

/// 取字符串集合中某个坐标开始的 q-gram；窗口不会跨越到下一条字符串
#[derive(Debug)]
pub struct StringSetQGram<'a, S: ?Sized> {
    q: u32,
    symbol_size: u32,
    symbol_mask: u64,
    set: &'a S,
}

impl<'a, S: StringSet + ?Sized> StringSetQGram<'a, S> {
    pub fn new(q: u32, symbol_size: u32, set: &'a S) -> Self {
        debug_assert!(check_params(q, symbol_size).is_ok());
        Self { q, symbol_size, symbol_mask: (1u64 << symbol_size) - 1, set }
    }

    #[inline]
    pub fn at(&self, coord: SetCoord) -> u64 {
        let string = self.set.string(coord.string_id);
        let start = (coord.pos as usize).min(string.len());
        pack(self.q, self.symbol_size, self.symbol_mask, &string[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna;

    #[test]
    fn packs_little_end_first() {
        let s = dna::encode(b"ACGT");
        let f = StringQGram::new(4, 2, &s);
        // A=0 在最低两位，T=3 在最高两位
        assert_eq!(f.at(0), 0b11_10_01_00);
        assert_eq!(f.at(1), 0b00_11_10_01);
        assert_eq!(f.at(3), 0b11);
        assert_eq!(f.at(4), 0);
        assert_eq!(f.at(100), 0);
    }

    #[test]
    fn symbols_are_masked() {
        let s = [0xffu8, 0x01];
        let f = StringQGram::new(2, 2, &s);
        assert_eq!(f.at(0), 0b01_11);
    }

    #[test]
    fn full_64_bit_qgrams() {
        let s = vec![3u8; 40];
        let f = StringQGram::new(32, 2, &s);
        assert_eq!(f.at(0), u64::MAX);
        assert_eq!(f.at(8), u64::MAX);
        assert_eq!(f.at(9), u64::MAX >> 2);
    }

    #[test]
    fn set_qgrams_stay_inside_one_string() {
        let set = ConcatenatedStringSet::from_strings([dna::encode(b"ACG"), dna::encode(b"TTT")]).unwrap();
        let f = StringSetQGram::new(3, 2, &set);
        assert_eq!(f.at(SetCoord::new(0, 0)), 0b10_01_00);
        // 第一条字符串的末尾不会读到 TTT
        assert_eq!(f.at(SetCoord::new(0, 2)), 0b10);
        assert_eq!(f.at(SetCoord::new(1, 0)), 0b11_11_11);

        let nested: Vec<Vec<u8>> = vec![dna::encode(b"ACG"), dna::encode(b"TTT")];
        let g = StringSetQGram::new(3, 2, &nested);
        assert_eq!(g.at(SetCoord::new(1, 1)), f.at(SetCoord::new(1, 1)));
        assert_eq!(nested.total_len(), set.total_len());
    }

    #[test]
    fn invalid_parameters() {
        assert!(check_params(0, 2).is_err());
        assert!(check_params(4, 0).is_err());
        assert!(check_params(4, 9).is_err());
        assert!(check_params(33, 2).is_err());
        assert!(check_params(32, 2).is_ok());
        assert!(ConcatenatedStringSet::new(vec![0, 1], vec![0, 3]).is_err());
        assert!(ConcatenatedStringSet::new(vec![0, 1], vec![0, 1, 2]).is_ok());
    }
}
