use rayon::prelude::*;

/// 构建 `text$` 的后缀数组（倍增法，每轮并行排序）。
///
/// `text` 为 0..SIGMA 编码，`$` 不出现在输入中，而是隐式追加在末尾并视为最小字符，
/// 因此返回值长度为 `text.len() + 1`，且 `sa[0] == text.len()`。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len() + 1;
    let mut sa: Vec<u32> = (0..n as u32).collect();
    // 符号整体右移一位，把 0 留给 $
    let mut rank: Vec<u32> = text.iter().map(|&b| b as u32 + 1).chain(std::iter::once(0)).collect();
    if n == 1 {
        return sa;
    }
    let mut tmp = vec![0u32; n];

    let mut k = 1usize;
    loop {
        let key = |i: u32| {
            let i = i as usize;
            let next = if i + k < n { rank[i + k] as i64 } else { -1 };
            (rank[i], next)
        };
        sa.par_sort_unstable_by_key(|&i| key(i));

        tmp[sa[0] as usize] = 0;
        for w in 1..n {
            let (a, b) = (sa[w - 1], sa[w]);
            tmp[b as usize] = tmp[a as usize] + u32::from(key(a) != key(b));
        }
        std::mem::swap(&mut rank, &mut tmp);

        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        k <<= 1;
    }
    sa
}
