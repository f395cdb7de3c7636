/// 根据 `text$` 的后缀数组构建 BWT。
///
/// 返回 `(bwt, primary)`：`$` 所在的那一行（即 `sa[i] == 0` 的行）不存储任何符号，
/// 因此 `bwt.len() == text.len()`，其余行按顺序依次写入。
pub fn build_bwt(text: &[u8], sa: &[u32]) -> (Vec<u8>, u32) {
    debug_assert_eq!(sa.len(), text.len() + 1);
    let mut bwt = Vec::with_capacity(text.len());
    let mut primary = 0u32;
    for (row, &p) in sa.iter().enumerate() {
        if p == 0 {
            primary = row as u32;
        } else {
            bwt.push(text[p as usize - 1]);
        }
    }
    (bwt, primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::sa::build_sa;

    #[test]
    fn bwt_skips_primary_row() {
        // ACGT$: 行 $ ACGT$ CGT$ GT$ T$ ，BWT = T $ A C G
        let text = [0u8, 1, 2, 3];
        let sa = build_sa(&text);
        let (bwt, primary) = build_bwt(&text, &sa);
        assert_eq!(primary, 1);
        assert_eq!(bwt, vec![3, 0, 1, 2]);
    }
}
