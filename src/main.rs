use anyhow::Result;
use clap::{Parser, Subcommand};

use seqdex::pipeline::{self, FmBuildOpt, QGramOpt, SearchOpt};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seqdex", author, version, about = "FM-index and q-gram index search for DNA sequences", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an FM index (.fm) of the reference
    Index {
        /// Reference FASTA file
        reference: String,
        /// Output prefix (defaults to the reference path without extension)
        #[arg(short, long)]
        output: Option<String>,
        /// Keep one suffix array sample every N text positions
        #[arg(long = "sa-rate", default_value_t = FmBuildOpt::default().sa_rate)]
        sa_rate: u32,
        /// Occurrence sampling interval of the rank dictionary
        #[arg(long, default_value_t = FmBuildOpt::default().block)]
        block: u32,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Build a q-gram index (.qgi) of the reference, one string per contig
    Qgram {
        /// Reference FASTA file
        reference: String,
        #[arg(short, long)]
        output: Option<String>,
        /// q-gram length
        #[arg(short, default_value_t = QGramOpt::default().q)]
        q: u32,
        /// Number of leading symbols covered by the lookup table (0 disables it)
        #[arg(long = "lut", default_value_t = QGramOpt::default().lut_depth)]
        lut_depth: u32,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Exact matches of each read and its reverse complement against an FM index
    Search {
        /// Path to FM index (.fm)
        #[arg(short = 'i', long = "index")]
        index: String,
        /// Reads FASTQ file
        reads: String,
        /// Output TSV path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Maximum matches reported per read and strand
        #[arg(long = "max-hits", default_value_t = SearchOpt::default().max_hits)]
        max_hits: usize,
    },
    /// Candidate diagonals of each read from q-gram hits
    Filter {
        /// Path to q-gram index (.qgi)
        #[arg(short = 'i', long = "index")]
        index: String,
        /// Reads FASTQ file
        reads: String,
        #[arg(short, long)]
        out: Option<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Maximum candidate diagonals reported per read
        #[arg(long = "max-hits", default_value_t = SearchOpt::default().max_hits)]
        max_hits: usize,
        /// Minimum q-gram hits for a diagonal to be reported
        #[arg(long = "min-hits", default_value_t = SearchOpt::default().min_qgram_hits)]
        min_hits: u32,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn init_threads(threads: usize) {
    let n = threads.max(1);
    match rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        Ok(()) => log::debug!("rayon thread pool with {} threads", n),
        Err(e) => log::warn!("failed to configure thread pool: {}", e),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Index { reference, output, sa_rate, block, threads } => {
            init_threads(threads);
            let output = output.unwrap_or_else(|| pipeline::default_prefix(&reference));
            pipeline::build_fm_index(&reference, &output, FmBuildOpt { sa_rate, block })
        }
        Commands::Qgram { reference, output, q, lut_depth, threads } => {
            init_threads(threads);
            let output = output.unwrap_or_else(|| pipeline::default_prefix(&reference));
            pipeline::build_qgram_index(&reference, &output, QGramOpt { q, lut_depth })
        }
        Commands::Search { index, reads, out, threads, max_hits } => {
            init_threads(threads);
            let opt = SearchOpt { max_hits, ..SearchOpt::default() };
            pipeline::search_fastq(&index, &reads, out.as_deref(), opt)
        }
        Commands::Filter { index, reads, out, threads, max_hits, min_hits } => {
            init_threads(threads);
            let opt = SearchOpt { max_hits, min_qgram_hits: min_hits, ..SearchOpt::default() };
            pipeline::filter_fastq(&index, &reads, out.as_deref(), opt)
        }
    }
}
