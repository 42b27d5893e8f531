//! Benchmark harness and CSV pre-processing CLI for the correlation
//! index: query dispatch with timing/memory bracketing, on top of a
//! `clap`-derived command surface and `anyhow` at the process boundary.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use correlation_index::build::build_correlation_index;
use correlation_index::core::{CIConfig, ModelKind};
use correlation_index::preprocessing::csv::{preprocess_flight, preprocess_taxi};
use correlation_index::preprocessing::micro;
use correlation_index::search::QueryExecutor;
use correlation_index::store::{AttrId, HostIndex, OrderedMultiMap, PointerMode, PrimaryIndex, RowStore, TupleRef, TupleSchema};
use correlation_index::utils::TimeMeasurer;

#[derive(Parser)]
#[command(name = "ci-bench", about = "Correlation index benchmark harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a benchmark workload.
    Run(RunArgs),
    /// Pre-process a raw CSV dataset into the binary record format.
    Prep(PrepArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum AccessType {
    Primary,
    Secondary,
    Baseline,
    Correlation,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexPointer {
    Logical,
    Physical,
}

impl From<IndexPointer> for PointerMode {
    fn from(value: IndexPointer) -> Self {
        match value {
            IndexPointer::Logical => PointerMode::Logical,
            IndexPointer::Physical => PointerMode::Physical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BenchmarkType {
    Micro,
    Taxi,
    Flight,
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryType {
    Point,
    Range,
}

#[derive(Clone, Copy, ValueEnum)]
enum DistributionArg {
    Linear,
    Sigmoid,
}

#[derive(Clone, Copy, ValueEnum)]
enum ComputeArg {
    Interpolation,
    Regression,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, value_enum, default_value_t = AccessType::Correlation)]
    access: AccessType,
    #[arg(long, value_enum, default_value_t = IndexPointer::Logical)]
    index_pointer: IndexPointer,
    #[arg(long, value_enum, default_value_t = BenchmarkType::Micro)]
    benchmark: BenchmarkType,
    #[arg(long, value_enum, default_value_t = QueryType::Point)]
    query: QueryType,
    #[arg(long, default_value_t = 0.01)]
    selectivity: f64,
    #[arg(long, value_enum, default_value_t = DistributionArg::Sigmoid)]
    distribution: DistributionArg,
    #[arg(long, default_value_t = 0.0)]
    outlier_ratio: f64,
    #[arg(long, default_value_t = 100_000)]
    tuple_count: usize,
    #[arg(long, default_value_t = 1_000)]
    query_count: usize,
    #[arg(long, default_value_t = 2)]
    fanout: usize,
    #[arg(long, default_value_t = 4)]
    error_bound: u64,
    #[arg(long, default_value_t = 0.1)]
    outlier_threshold: f64,
    #[arg(long, default_value_t = 64)]
    min_node_size: usize,
    #[arg(long, default_value_t = 16)]
    max_height: usize,
    #[arg(long, value_enum, default_value_t = ComputeArg::Interpolation)]
    compute: ComputeArg,
    #[arg(long)]
    verbose: bool,
    /// Required for taxi/flight benchmarks; the pre-processed binary file.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct PrepArgs {
    #[command(subcommand)]
    dataset: PrepDataset,
}

#[derive(Subcommand)]
enum PrepDataset {
    Taxi { src: PathBuf, dst: PathBuf },
    Flight { src: PathBuf, dst: PathBuf },
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessType::Primary => "primary",
            AccessType::Secondary => "secondary",
            AccessType::Baseline => "baseline",
            AccessType::Correlation => "correlation",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BenchmarkType::Micro => "micro",
            BenchmarkType::Taxi => "taxi",
            BenchmarkType::Flight => "flight",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QueryType::Point => "point",
            QueryType::Range => "range",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for IndexPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IndexPointer::Logical => "logical",
            IndexPointer::Physical => "physical",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for DistributionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DistributionArg::Linear => "linear",
            DistributionArg::Sigmoid => "sigmoid",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ComputeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComputeArg::Interpolation => "interpolation",
            ComputeArg::Regression => "regression",
        };
        write!(f, "{s}")
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
        Command::Prep(args) => prep(args),
    }
}

fn prep(args: PrepArgs) -> Result<()> {
    match args.dataset {
        PrepDataset::Taxi { src, dst } => {
            let reader = BufReader::new(File::open(&src).with_context(|| format!("opening {src:?}"))?);
            let mut writer = BufWriter::new(File::create(&dst).with_context(|| format!("creating {dst:?}"))?);
            let n = preprocess_taxi(reader, &mut writer)?;
            println!("wrote {n} taxi records to {dst:?}");
        }
        PrepDataset::Flight { src, dst } => {
            let reader = BufReader::new(File::open(&src).with_context(|| format!("opening {src:?}"))?);
            let mut writer = BufWriter::new(File::create(&dst).with_context(|| format!("creating {dst:?}"))?);
            let n = preprocess_flight(reader, &mut writer)?;
            println!("wrote {n} flight records to {dst:?}");
        }
    }
    Ok(())
}

/// The populated row store, schema, and classical indices for the
/// requested benchmark data source. Primary key is always `AttrId(0)`.
struct Dataset {
    schema: TupleSchema,
    row_store: RowStore,
    primary_index: PrimaryIndex,
    host_index: HostIndex,
    guest_col: AttrId,
    host_col: AttrId,
}

fn build_dataset(args: &RunArgs, pointer_mode: PointerMode) -> Result<Dataset> {
    let mut schema = TupleSchema::new();
    schema.add_attr(8); // primary key, always AttrId(0)
    let guest_col = schema.add_attr(8);
    let host_col = schema.add_attr(8);

    let mut row_store = RowStore::new(&schema);
    let mut primary_index = PrimaryIndex::new();
    let mut host_index = HostIndex::new();

    let rows: Vec<(u64, u64)> = match args.benchmark {
        BenchmarkType::Micro => {
            let mut rng = StdRng::seed_from_u64(42);
            let distribution = match args.distribution {
                DistributionArg::Linear => micro::Distribution::Linear,
                DistributionArg::Sigmoid => micro::Distribution::Sigmoid,
            };
            micro::generate(args.tuple_count, distribution, args.outlier_ratio, &mut rng)
        }
        BenchmarkType::Taxi => {
            let path = args.input.as_ref().context("--input is required for the taxi benchmark")?;
            let mut reader = BufReader::new(File::open(path)?);
            let mut rows = Vec::new();
            // `fill_buf().is_empty()` is a clean end of file with no bytes
            // left; anything `read_from` fails on past that point is a
            // truncated or corrupt record, not EOF, and must not be
            // swallowed silently.
            while !reader.fill_buf()?.is_empty() {
                let record = correlation_index::preprocessing::records::TaxiRecord::read_from(&mut reader)
                    .context("truncated or corrupt taxi record")?;
                rows.push((record.fare, record.distance));
            }
            rows
        }
        BenchmarkType::Flight => {
            let path = args.input.as_ref().context("--input is required for the flight benchmark")?;
            let mut reader = BufReader::new(File::open(path)?);
            let mut rows = Vec::new();
            while !reader.fill_buf()?.is_empty() {
                let record = correlation_index::preprocessing::records::FlightRecord::read_from(&mut reader)
                    .context("truncated or corrupt flight record")?;
                rows.push((record.air_time, record.distance));
            }
            rows
        }
    };

    for (pk, (guest, host)) in rows.into_iter().enumerate() {
        let pk = pk as u64;
        let mut tuple = Vec::new();
        tuple.extend_from_slice(&pk.to_le_bytes());
        tuple.extend_from_slice(&guest.to_le_bytes());
        tuple.extend_from_slice(&host.to_le_bytes());
        let offset = row_store.append(&tuple);

        primary_index.insert(pk, offset);
        let tuple_ref = match pointer_mode {
            PointerMode::Physical => TupleRef::Physical(offset),
            PointerMode::Logical => TupleRef::Logical(pk),
        };
        host_index.insert(host, tuple_ref);
    }

    Ok(Dataset { schema, row_store, primary_index, host_index, guest_col, host_col })
}

fn run(args: RunArgs) -> Result<()> {
    let pointer_mode: PointerMode = args.index_pointer.into();
    let mut build_timer = TimeMeasurer::new();
    build_timer.tic();
    let dataset = build_dataset(&args, pointer_mode)?;
    build_timer.toc();

    println!("table build time: {:.3} ms", build_timer.elapsed_ms());
    if let Some(mb) = correlation_index::utils::memory::resident_mb() {
        println!("resident memory: {mb:.1} MB");
    }

    let config = CIConfig {
        fanout: args.fanout,
        error_bound: args.error_bound,
        outlier_threshold: args.outlier_threshold,
        min_node_size: args.min_node_size,
        max_height: args.max_height,
        model_kind: match args.compute {
            ComputeArg::Interpolation => ModelKind::Interpolation,
            ComputeArg::Regression => ModelKind::Regression,
        },
    };

    let pk_col_for_logical = Some(AttrId(0));

    match args.access {
        AccessType::Correlation => {
            let ci = build_correlation_index(
                &dataset.row_store,
                &dataset.schema,
                pk_col_for_logical,
                dataset.guest_col,
                dataset.host_col,
                pointer_mode,
                &config,
            )?;

            if args.verbose {
                let mut out = std::io::stdout();
                ci.print(true, &mut out)?;
            }

            let executor = QueryExecutor::new(
                &ci,
                &dataset.host_index,
                &dataset.primary_index,
                &dataset.row_store,
                &dataset.schema,
                dataset.guest_col,
                pointer_mode,
            );
            run_queries(&args, dataset.row_store.len(), |g_lo, g_hi| {
                if g_lo == g_hi {
                    executor.point_query(g_lo).len()
                } else {
                    executor.range_query(g_lo, g_hi).len()
                }
            });
        }
        AccessType::Secondary | AccessType::Baseline => {
            let mut dense = OrderedMultiMap::new();
            for (offset, tuple) in dataset.row_store.iter() {
                let guest = dataset.schema.read_u64(tuple, dataset.guest_col);
                dense.insert(guest, offset.0);
            }
            run_queries(&args, dataset.row_store.len(), |g_lo, g_hi| {
                if g_lo == g_hi {
                    dense.lookup_point(g_lo).len()
                } else {
                    dense.lookup_range(g_lo, g_hi).len()
                }
            });
        }
        AccessType::Primary => {
            run_queries(&args, dataset.row_store.len(), |lo, hi| {
                if lo == hi {
                    dataset.primary_index.lookup_point(lo).len()
                } else {
                    dataset.primary_index.lookup_range(lo, hi).len()
                }
            });
        }
    }

    Ok(())
}

fn run_queries(args: &RunArgs, tuple_count: usize, mut issue: impl FnMut(u64, u64) -> usize) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut query_timer = TimeMeasurer::new();
    let mut matched = 0usize;

    query_timer.tic();
    for _ in 0..args.query_count {
        let key_count = tuple_count.max(1) as u64;
        let lhs = rng.gen_range(0..key_count);

        if matches!(args.query, QueryType::Point) {
            matched += issue(lhs, lhs);
        } else {
            let window = ((1.0 - args.selectivity) * key_count as f64) as u64;
            let rhs = (lhs + window).min(key_count.saturating_sub(1));
            matched += issue(lhs.min(rhs), lhs.max(rhs));
        }
    }
    query_timer.toc();

    let ops_per_sec = args.query_count as f64 / (query_timer.elapsed_ms() / 1000.0).max(1e-9);
    println!("{:.1} K ops/sec, {matched} total matches", ops_per_sec / 1000.0);
}
