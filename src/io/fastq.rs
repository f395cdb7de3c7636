use anyhow::{anyhow, bail, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Default)]
pub struct FastqRecord {
    pub id: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

/// 四行格式的 FASTQ 读取（不支持序列折行）。
pub struct FastqReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(0, |p| p + 1);
    &line[..end]
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: Vec::new(), line_no: 0 }
    }

    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_until(b'\n', &mut self.line)?;
        self.line_no += 1;
        Ok(n > 0)
    }

    fn expect_line(&mut self, what: &str) -> Result<()> {
        if !self.next_line()? {
            bail!("line {}: unexpected EOF, missing {}", self.line_no, what);
        }
        Ok(())
    }

    pub fn read_record(&mut self, rec: &mut FastqRecord) -> Result<bool> {
        // 跳过记录之间的空行
        loop {
            if !self.next_line()? {
                return Ok(false);
            }
            if !trim_end(&self.line).is_empty() {
                break;
            }
        }
        if self.line[0] != b'@' {
            bail!("line {}: FASTQ header not starting with '@'", self.line_no);
        }
        let header = String::from_utf8_lossy(trim_end(&self.line[1..])).into_owned();
        rec.id = header.split_whitespace().next().unwrap_or("").to_string();

        self.expect_line("sequence")?;
        rec.seq.clear();
        rec.seq.extend(trim_end(&self.line).iter().map(u8::to_ascii_uppercase));

        self.expect_line("'+' separator")?;
        if self.line.first() != Some(&b'+') {
            bail!("line {}: missing '+' line", self.line_no);
        }

        self.expect_line("quality")?;
        rec.qual.clear();
        rec.qual.extend_from_slice(trim_end(&self.line));
        if rec.qual.len() != rec.seq.len() {
            return Err(anyhow!(
                "line {}: read '{}' has {} bases but {} qualities",
                self.line_no,
                rec.id,
                rec.seq.len(),
                rec.qual.len()
            ));
        }
        Ok(true)
    }

    /// 一次读入至多 `n` 条记录
    pub fn read_batch(&mut self, n: usize) -> Result<Vec<FastqRecord>> {
        let mut out = Vec::with_capacity(n);
        let mut rec = FastqRecord::default();
        while out.len() < n && self.read_record(&mut rec)? {
            out.push(std::mem::take(&mut rec));
        }
        Ok(out)
    }
}
