use anyhow::{bail, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Default)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    /// 原始碱基（大写，去掉空白）
    pub seq: Vec<u8>,
}

/// 流式 FASTA 读取，按字节处理，允许多行序列和 CRLF。
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
    pending_header: Option<Vec<u8>>,
    done: bool,
}

fn split_header(header: &[u8]) -> (String, Option<String>) {
    let text = String::from_utf8_lossy(header);
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((id, desc)) => {
            let desc = desc.trim();
            (id.to_string(), (!desc.is_empty()).then(|| desc.to_string()))
        }
        None => (text.to_string(), None),
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: Vec::new(), line_no: 0, pending_header: None, done: false }
    }

    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_until(b'\n', &mut self.line)?;
        self.line_no += 1;
        Ok(n > 0)
    }

    /// 读入下一条记录到 `rec`（复用其缓冲区），到达末尾返回 false。
    pub fn read_record(&mut self, rec: &mut FastaRecord) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => loop {
                if !self.next_line()? {
                    self.done = true;
                    return Ok(false);
                }
                match self.line.first() {
                    Some(b'>') => break self.line[1..].to_vec(),
                    _ if self.line.iter().all(u8::is_ascii_whitespace) => continue,
                    _ => bail!("line {}: sequence data before the first FASTA header", self.line_no),
                }
            },
        };
        let (id, desc) = split_header(&header);
        if id.is_empty() {
            bail!("line {}: FASTA header without an identifier", self.line_no);
        }
        rec.id = id;
        rec.desc = desc;
        rec.seq.clear();

        while self.next_line()? {
            if self.line.first() == Some(&b'>') {
                self.pending_header = Some(self.line[1..].to_vec());
                return Ok(true);
            }
            rec.seq.extend(
                self.line.iter().filter(|b| !b.is_ascii_whitespace()).map(u8::to_ascii_uppercase),
            );
        }
        self.done = true;
        Ok(true)
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rec = FastaRecord::default();
        match self.read_record(&mut rec) {
            Ok(true) => Some(Ok(rec)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_multi_line_records() {
        let data = b">chr1 first contig\nACgT\nNN\n>chr2\nAAA\n";
        let recs: Vec<FastaRecord> = FastaReader::new(Cursor::new(&data[..])).collect::<Result<_>>().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "chr1");
        assert_eq!(recs[0].desc.as_deref(), Some("first contig"));
        assert_eq!(recs[0].seq, b"ACGTNN");
        assert_eq!(recs[1].id, "chr2");
        assert_eq!(recs[1].desc, None);
        assert_eq!(recs[1].seq, b"AAA");
    }

    #[test]
    fn crlf_blank_lines_and_inner_spaces() {
        let data = b"\r\n\n>chr1 desc\r\nAC g t\r\n acgt\r\n>chr2 \r\n N N N \r\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let mut rec = FastaRecord::default();
        assert!(r.read_record(&mut rec).unwrap());
        assert_eq!(rec.id, "chr1");
        assert_eq!(rec.seq, b"ACGTACGT");
        assert!(r.read_record(&mut rec).unwrap());
        assert_eq!(rec.id, "chr2");
        assert_eq!(rec.desc, None);
        assert_eq!(rec.seq, b"NNN");
        assert!(!r.read_record(&mut rec).unwrap());
    }

    #[test]
    fn sequence_before_header_is_an_error() {
        let data = b"ACGT\n>chr1\nAC\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let err = r.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
