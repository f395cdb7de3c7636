use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::functor::SetCoord;
use super::index::QGramSetIndex;
use crate::index::reference::{Contig, IndexMeta, Reference};
use crate::util::dna;

/// q-gram 集合索引 + contig 表，即 `.qgi` 文件的内容。每条 contig 是集合中的一条字符串。
#[derive(Debug, Serialize, Deserialize)]
pub struct QGramReference {
    pub index: QGramSetIndex,
    pub contigs: Vec<Contig>,
    pub meta: IndexMeta,
}

impl QGramReference {
    pub fn build(reference: &Reference, q: u32, lut_depth: u32, meta: IndexMeta) -> Result<Self> {
        let index = QGramSetIndex::build(q, dna::SYMBOL_BITS, &reference.sequences, lut_depth)
            .context("failed to build q-gram index")?;
        log::info!(
            "q-gram index: q={} {} unique q-grams, {} occurrences, {:.1} MiB",
            q,
            index.n_unique_qgrams(),
            index.n_occurrences(),
            index.used_memory() as f64 / (1024.0 * 1024.0)
        );
        Ok(Self { index, contigs: reference.contigs.clone(), meta })
    }

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

    /// 命中坐标对应的 (contig, 偏移)；窗口超出 contig 末尾（0 填充）的命中返回 None
    pub fn contig_hit(&self, coord: SetCoord) -> Option<(usize, u32)> {
        let ci = coord.string_id as usize;
        let c = self.contigs.get(ci)?;
        (coord.pos as u64 + self.index.q() as u64 <= c.len as u64).then_some((ci, coord.pos))
    }
}
