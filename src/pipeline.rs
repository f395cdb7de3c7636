//! 命令行各子命令的实现：建索引、精确匹配搜索与 q-gram 过滤。

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::index::fm::FmIndex;
use crate::index::reference::{FmReference, IndexMeta, Reference};
use crate::io::fastq::{FastqReader, FastqRecord};
use crate::qgram::filter::{sort_queries, QGramFilter};
use crate::qgram::functor::StringQGram;
use crate::qgram::reference::QGramReference;
use crate::util::dna;

/// FM 索引构建参数
#[derive(Debug, Clone, Copy)]
pub struct FmBuildOpt {
    /// 每 sa_rate 个文本位置保留一个 SA 样本
    pub sa_rate: u32,
    /// Occ 采样间隔
    pub block: u32,
}

impl Default for FmBuildOpt {
    fn default() -> Self {
        Self { sa_rate: 32, block: 64 }
    }
}

/// q-gram 索引构建参数
#[derive(Debug, Clone, Copy)]
pub struct QGramOpt {
    pub q: u32,
    pub lut_depth: u32,
}

impl Default for QGramOpt {
    fn default() -> Self {
        Self { q: 16, lut_depth: 10 }
    }
}

/// search / filter 共用的运行参数
#[derive(Debug, Clone, Copy)]
pub struct SearchOpt {
    /// 每条读段（每条链）最多报告的匹配数
    pub max_hits: usize,
    /// filter 报告一条候选对角线所需的最少 q-gram 命中
    pub min_qgram_hits: u32,
    pub batch_size: usize,
}

impl Default for SearchOpt {
    fn default() -> Self {
        Self { max_hits: 16, min_qgram_hits: 2, batch_size: 4096 }
    }
}

fn open_output(out_path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(if let Some(p) = out_path {
        let f = std::fs::File::create(p).with_context(|| format!("cannot create output '{}'", p))?;
        Box::new(std::io::BufWriter::new(f))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    })
}

fn open_fastq(path: &str) -> Result<FastqReader<std::io::BufReader<std::fs::File>>> {
    let fq = std::fs::File::open(path).with_context(|| format!("cannot open reads FASTQ '{}'", path))?;
    Ok(FastqReader::new(std::io::BufReader::new(fq)))
}

/// 读入 FASTA 并写出 `<output>.fm`
pub fn build_fm_index(reference_path: &str, output: &str, opt: FmBuildOpt) -> Result<()> {
    let reference = Reference::from_fasta(reference_path)?;
    let start = std::time::Instant::now();
    let fm = FmIndex::build(&reference.text, opt.sa_rate, opt.block)
        .with_context(|| format!("failed to build FM index for '{}'", reference_path))?;
    log::info!("FM index built in {:.2?}", start.elapsed());

    let idx = FmReference { fm, contigs: reference.contigs, meta: IndexMeta::now(reference_path) };
    let out_path = format!("{}.fm", output);
    idx.save_to_file(&out_path)
        .with_context(|| format!("cannot write index to '{}'", out_path))?;
    log::info!("FM index saved: {}", out_path);
    Ok(())
}

/// 读入 FASTA 并写出 `<output>.qgi`
pub fn build_qgram_index(reference_path: &str, output: &str, opt: QGramOpt) -> Result<()> {
    let reference = Reference::from_fasta(reference_path)?;
    let start = std::time::Instant::now();
    let idx = QGramReference::build(&reference, opt.q, opt.lut_depth, IndexMeta::now(reference_path))?;
    log::info!("q-gram index built in {:.2?}", start.elapsed());

    let out_path = format!("{}.qgi", output);
    idx.save_to_file(&out_path)
        .with_context(|| format!("cannot write index to '{}'", out_path))?;
    log::info!("q-gram index saved: {}", out_path);
    Ok(())
}

/// 一条读段在正反两条链上的精确匹配，输出 TSV 行及是否匹配
fn search_read(idx: &FmReference, rec: &FastqRecord, max_hits: usize) -> (String, bool) {
    let fwd = dna::encode(&rec.seq);
    let rev = dna::revcomp(&fwd);
    let len = fwd.len() as u32;

    let mut out = String::new();
    for (strand, pattern) in [('+', &fwd), ('-', &rev)] {
        let range = idx.fm.backward_search(pattern);
        let hits = idx.contig_hits(range, len);
        for &(ci, off) in hits.iter().take(max_hits) {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                rec.id,
                strand,
                idx.contigs[ci].name,
                off + 1,
                hits.len()
            ));
        }
    }
    if out.is_empty() {
        return (format!("{}\t*\t*\t0\t0\n", rec.id), false);
    }
    (out, true)
}

/// 对 FASTQ 中每条读段做精确匹配（含反向互补）。
///
/// 输出列：read、strand、contig、1-based 位置、该链上 contig 内匹配总数。未匹配的读段输出一行 `*`。
pub fn search_fastq(index_path: &str, reads_path: &str, out_path: Option<&str>, opt: SearchOpt) -> Result<()> {
    let idx = FmReference::load_from_file(index_path)
        .with_context(|| format!("cannot load FM index '{}'", index_path))?;
    log::info!(
        "loaded FM index '{}': {} symbols, {} contigs",
        index_path,
        idx.fm.length(),
        idx.contigs.len()
    );

    let mut reader = open_fastq(reads_path)?;
    let mut out = open_output(out_path)?;
    let (mut n_reads, mut n_mapped) = (0usize, 0usize);
    loop {
        let batch = reader.read_batch(opt.batch_size.max(1))?;
        if batch.is_empty() {
            break;
        }
        let lines: Vec<(String, bool)> =
            batch.par_iter().map(|rec| search_read(&idx, rec, opt.max_hits)).collect();
        for (l, mapped) in &lines {
            n_reads += 1;
            n_mapped += *mapped as usize;
            out.write_all(l.as_bytes())?;
        }
    }
    out.flush()?;
    log::info!("search: {} reads, {} with exact matches", n_reads, n_mapped);
    Ok(())
}

/// 一条读段的 q-gram 及其起点（跳过含 N 的窗口），按 q-gram 值排序
fn read_qgrams(q: u32, seq: &[u8]) -> (Vec<u64>, Vec<u32>) {
    let enc = dna::encode(seq);
    let mut positions = Vec::with_capacity(enc.len());
    let mut last_n: Option<usize> = None;
    for (i, &s) in enc.iter().enumerate() {
        if s > 3 {
            last_n = Some(i);
        }
        // 以 i 结尾的窗口
        if let Some(start) = (i + 1).checked_sub(q as usize) {
            if last_n.map_or(true, |p| p < start) {
                positions.push(start as u32);
            }
        }
    }

    let f = StringQGram::new(q, dna::SYMBOL_BITS, &enc);
    let qgrams: Vec<u64> = positions.iter().map(|&p| f.at(p)).collect();
    let (sorted, order) = sort_queries(&qgrams);
    (sorted, order.into_iter().map(|k| positions[k as usize]).collect())
}

/// 对 FASTQ 中每条读段做 q-gram 过滤，按 (contig, 对角线) 统计命中。
///
/// 输出列：read、contig、候选起点（1-based，可能为非正数）、q-gram 命中数。
pub fn filter_fastq(index_path: &str, reads_path: &str, out_path: Option<&str>, opt: SearchOpt) -> Result<()> {
    let idx = QGramReference::load_from_file(index_path)
        .with_context(|| format!("cannot load q-gram index '{}'", index_path))?;
    let q = idx.index.q();
    if idx.index.symbol_size() != dna::SYMBOL_BITS {
        bail!("q-gram index '{}' was not built over the DNA alphabet", index_path);
    }
    log::info!(
        "loaded q-gram index '{}': q={} {} unique q-grams",
        index_path,
        q,
        idx.index.n_unique_qgrams()
    );

    let mut reader = open_fastq(reads_path)?;
    let mut out = open_output(out_path)?;
    let mut filter = QGramFilter::new();
    let (mut n_reads, mut n_candidates) = (0usize, 0usize);
    let mut rec = FastqRecord::default();
    while reader.read_record(&mut rec)? {
        n_reads += 1;
        let (qgrams, positions) = read_qgrams(q, &rec.seq);
        filter.enact(&idx.index, &qgrams, &positions);

        let mut diagonals: HashMap<(usize, i64), u32> = HashMap::new();
        for &(coord, qpos) in filter.hits() {
            if let Some((ci, off)) = idx.contig_hit(coord) {
                *diagonals.entry((ci, off as i64 - qpos as i64)).or_default() += 1;
            }
        }
        let mut candidates: Vec<((usize, i64), u32)> =
            diagonals.into_iter().filter(|&(_, n)| n >= opt.min_qgram_hits).collect();
        candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates.truncate(opt.max_hits);

        for ((ci, diag), n) in candidates {
            n_candidates += 1;
            writeln!(out, "{}\t{}\t{}\t{}", rec.id, idx.contigs[ci].name, diag + 1, n)?;
        }
    }
    out.flush()?;
    log::info!("filter: {} reads, {} candidate diagonals", n_reads, n_candidates);
    Ok(())
}

/// 输出文件名前缀默认取参考序列文件名去掉扩展名
pub fn default_prefix(reference_path: &str) -> String {
    let p = Path::new(reference_path);
    p.with_extension("").to_string_lossy().into_owned()
}
