//! 索引构建与持久化的错误类型。
//!
//! 查询路径不产生错误：未命中以空区间表示。只有构建、装配和读写会返回 [`IndexError`]。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// 输入文本（或字符串集合）为空
    #[error("cannot build an index over empty input")]
    EmptyInput,

    /// 文本长度超出 32 位行号可表示的范围
    #[error("text of length {0} exceeds the 32-bit index range")]
    TooLong(usize),

    /// 文本中出现字母表之外的符号
    #[error("symbol {symbol} at position {pos} is outside the 4-letter alphabet")]
    InvalidSymbol { pos: usize, symbol: u8 },

    #[error("invalid q-gram parameters: q={q}, symbol_size={symbol_size} ({reason})")]
    InvalidQGram { q: u32, symbol_size: u32, reason: &'static str },

    #[error("LUT depth {depth} needs 2^{bits} entries, limit is 2^{max_bits}")]
    LutTooLarge { depth: u32, bits: u32, max_bits: u32 },

    #[error("row {row} is out of bounds (index length {length})")]
    RowOutOfBounds { row: u32, length: u32 },

    #[error("occurrence slot {slot} is out of bounds ({total} occurrences)")]
    SlotOutOfBounds { slot: u32, total: u32 },

    /// from_parts 装配时各组件互相矛盾
    #[error("inconsistent index parts: {0}")]
    Inconsistent(String),

    #[error("sample rate must be positive")]
    ZeroSampleRate,
}

pub type Result<T> = std::result::Result<T, IndexError>;
