use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::fm::{DnaFmIndex, SaRange};
use crate::io::fasta::{FastaReader, FastaRecord};
use crate::util::dna;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub len: u32,
    pub offset: u32,
}

/// 构建时的元信息
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

impl IndexMeta {
    pub fn now(reference_file: &str) -> Self {
        Self {
            reference_file: Some(reference_file.to_string()),
            build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
            build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// 多条 contig 首尾相接后的编码文本
#[derive(Debug, Clone, Default)]
pub struct Reference {
    pub text: Vec<u8>,
    pub contigs: Vec<Contig>,
    /// 每条 contig 独立的编码序列（q-gram 集合索引使用）
    pub sequences: Vec<Vec<u8>>,
}

impl Reference {
    /// 读入 FASTA 参考序列：编码为 2-bit，N 替换为确定性的伪随机碱基。
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let fh = std::fs::File::open(path)
            .with_context(|| format!("cannot open reference FASTA '{}'", path.display()))?;
        let mut reader = FastaReader::new(BufReader::new(fh));
        let mut reference = Reference::default();
        let mut rec = FastaRecord::default();
        let mut n_ambiguous = 0usize;
        while reader.read_record(&mut rec)? {
            let mut seq = dna::encode(&rec.seq);
            n_ambiguous += dna::fill_ambiguous(&mut seq, reference.contigs.len() as u32 + 11);
            reference.push(rec.id.clone(), seq)?;
        }
        if reference.contigs.is_empty() {
            bail!("FASTA file '{}' contains no sequences", path.display());
        }
        if reference.text.is_empty() {
            bail!("FASTA file '{}' contains only empty sequences", path.display());
        }
        log::info!(
            "reference '{}': {} sequences, {} bp ({} ambiguous bases replaced)",
            path.display(),
            reference.contigs.len(),
            reference.text.len(),
            n_ambiguous
        );
        Ok(reference)
    }

    pub fn push(&mut self, name: String, seq: Vec<u8>) -> Result<()> {
        let offset = u32::try_from(self.text.len()).context("reference too long")?;
        let len = u32::try_from(seq.len()).context("contig too long")?;
        self.text.extend_from_slice(&seq);
        self.contigs.push(Contig { name, len, offset });
        self.sequences.push(seq);
        Ok(())
    }
}

/// 将文本位置映射到 (contig 下标, contig 内偏移)
pub fn map_text_pos(contigs: &[Contig], pos: u32) -> Option<(usize, u32)> {
    let i = contigs.partition_point(|c| c.offset + c.len <= pos);
    let c = contigs.get(i)?;
    (pos >= c.offset).then(|| (i, pos - c.offset))
}

/// FM 索引 + contig 表，即 `.fm` 文件的内容
#[derive(Debug, Serialize, Deserialize)]
pub struct FmReference {
    pub fm: DnaFmIndex,
    pub contigs: Vec<Contig>,
    pub meta: IndexMeta,
}

impl FmReference {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(std::fs::File::create(path.as_ref())?);
        bincode::serialize_into(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(path.as_ref())?;
        let idx: Self = bincode::deserialize_from(BufReader::new(f))?;
        Ok(idx)
    }

    /// 区间内全部落在单条 contig 内的匹配 (contig, 偏移)，已排序；跨越 contig 边界的匹配被丢弃
    pub fn contig_hits(&self, range: SaRange, pattern_len: u32) -> Vec<(usize, u32)> {
        let mut out: Vec<(usize, u32)> = self
            .fm
            .locate_range(range)
            .into_iter()
            .filter_map(|pos| map_text_pos(&self.contigs, pos))
            .filter(|&(ci, off)| off as u64 + pattern_len as u64 <= self.contigs[ci].len as u64)
            .collect();
        out.sort_unstable();
        out
    }

    /// 同 [`contig_hits`](Self::contig_hits)，至多保留 `max_hits` 个
    pub fn hits(&self, range: SaRange, pattern_len: u32, max_hits: usize) -> Vec<(usize, u32)> {
        let mut out = self.contig_hits(range, pattern_len);
        out.truncate(max_hits);
        out
    }
}
