//! # seqdex
//!
//! DNA 序列的两类全文索引及其并行构建与查询。
//!
//! - **FM 索引**：隐式 `$` 的 BWT + 分块 Occ rank 字典 + 采样 SA，
//!   支持反向搜索、rank / rank4、inverse-psi 与 locate
//! - **q-gram 索引**：打包 q-gram 的排序字典 + CSR 出现表 + 可选前缀 LUT，
//!   支持单条字符串与字符串集合
//! - **q-gram 过滤**：把一批查询 q-gram 展开成 (索引坐标, 查询下标) 命中表
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use seqdex::index::FmIndex;
//! use seqdex::qgram::{QGramIndex, StringQGram};
//! use seqdex::util::dna;
//!
//! let text = dna::encode(b"ACGTACGTAGCTGATCGTAG");
//!
//! // FM 索引精确匹配
//! let fm = FmIndex::build(&text, 4, 64).unwrap();
//! let range = fm.backward_search(&dna::encode(b"CGTA"));
//! for row in range.x..=range.y {
//!     println!("CGTA at {}", fm.locate(row));
//! }
//!
//! // q-gram 索引
//! let qi = QGramIndex::build(4, 2, &text, 2).unwrap();
//! let (lo, hi) = qi.range(StringQGram::new(4, 2, &dna::encode(b"ACGT")).at(0));
//! println!("ACGT occurs {} times", hi - lo);
//! ```
//!
//! ## 模块说明
//!
//! - [`index`]：FM 索引（后缀数组、BWT、rank 字典、采样 SA、查询）
//! - [`qgram`]：q-gram 提取、索引与过滤
//! - [`io`]：FASTA / FASTQ 文件解析
//! - [`pipeline`]：命令行子命令的实现
//! - [`util`]：DNA 编码 / 解码 / 反向互补等工具函数
//! - [`error`]：索引构建错误类型

pub mod error;
pub mod index;
pub mod io;
pub mod pipeline;
pub mod qgram;
pub mod util;
