use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use brainscore_core::assembly::{Label, Selector};
use brainscore_core::io::{read_score, read_scores, to_json_string, write_score};
use brainscore_core::logging;
use brainscore_core::report::render_score_text;
use brainscore_core::score::{MergeOptions, Operation, RawPolicy, RawReport, Reducer, Score};

#[derive(Parser)]
#[command(name = "brainscore-core")]
#[command(about = "Inspect, reshape and merge score files with their raw companions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log raw companion diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge score files; raw companion keys come from the first file
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Fail when a raw companion cannot be merged
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Select by coordinate label (one label drops the dimension)
    Sel {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        dim: String,

        #[arg(long = "label", required = true, num_args = 1..)]
        labels: Vec<String>,

        #[command(flatten)]
        raw: RawArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Select by position (one index drops the dimension)
    Isel {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        dim: String,

        #[arg(long = "index", required = true, num_args = 1..)]
        indices: Vec<usize>,

        #[command(flatten)]
        raw: RawArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Drop size-1 dimensions (all of them unless --dim is given)
    Squeeze {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long = "dim")]
        dims: Vec<String>,

        #[command(flatten)]
        raw: RawArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Aggregate over dimensions (all of them unless --dim is given)
    Reduce {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum)]
        op: ReduceOp,

        #[arg(long = "dim")]
        dims: Vec<String>,

        /// Also aggregate raw companions
        #[arg(long)]
        apply_raw: bool,

        /// Fail when a raw companion cannot follow
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print a text summary of a score file
    Show {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct RawArgs {
    /// Leave raw companions untouched
    #[arg(long)]
    no_raw: bool,

    /// Fail when a raw companion cannot follow
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output file (`.gz` compresses); stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReduceOp {
    Mean,
    Sum,
    Std,
    Min,
    Max,
    Median,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Merge {
            inputs,
            strict,
            output,
        } => {
            let scores = read_scores(&inputs).map_err(|e| e.to_string())?;
            let options = if strict {
                MergeOptions::strict()
            } else {
                MergeOptions::tolerant()
            };
            let merged = Score::merge_with(&scores, options).map_err(|e| e.to_string())?;
            info!("merged {} score files", scores.len());
            log_report("merge", &merged.report);
            emit(&merged.score, &output)
        }
        Commands::Sel {
            input,
            dim,
            labels,
            raw,
            output,
        } => {
            let selector = label_selector(&labels);
            let op = Operation::sel(&[(dim.as_str(), selector)]);
            transform(&input, &op, raw_policy(!raw.no_raw, raw.strict), &output)
        }
        Commands::Isel {
            input,
            dim,
            indices,
            raw,
            output,
        } => {
            let selector = position_selector(&indices);
            let op = Operation::isel(&[(dim.as_str(), selector)]);
            transform(&input, &op, raw_policy(!raw.no_raw, raw.strict), &output)
        }
        Commands::Squeeze {
            input,
            dims,
            raw,
            output,
        } => {
            let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
            let op = Operation::squeeze(&dims);
            transform(&input, &op, raw_policy(!raw.no_raw, raw.strict), &output)
        }
        Commands::Reduce {
            input,
            op,
            dims,
            apply_raw,
            strict,
            output,
        } => {
            let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
            let op = reduce_operation(op, &dims);
            transform(&input, &op, raw_policy(apply_raw, strict), &output)
        }
        Commands::Show { input } => {
            let score = read_score(&input).map_err(|e| e.to_string())?;
            print!("{}", render_score_text(&score));
            Ok(())
        }
    }
}

fn transform(
    input: &std::path::Path,
    op: &Operation,
    policy: RawPolicy,
    output: &OutputArgs,
) -> Result<(), String> {
    let score = read_score(input).map_err(|e| e.to_string())?;
    let transformed = score.apply(op, policy).map_err(|e| e.to_string())?;
    log_report(op.name(), &transformed.report);
    emit(&transformed.score, output)
}

fn emit(score: &Score, output: &OutputArgs) -> Result<(), String> {
    match &output.out {
        Some(path) => {
            write_score(path, score, output.pretty).map_err(|e| e.to_string())?;
            info!("wrote {}", path.display());
        }
        None => {
            let json = to_json_string(score, output.pretty).map_err(|e| e.to_string())?;
            println!("{json}");
        }
    }
    Ok(())
}

fn log_report(operation: &str, report: &RawReport) {
    for (key, reason) in report.failures() {
        warn!("{operation}: raw companion '{key}' not updated: {reason}");
    }
}

fn label_selector(labels: &[String]) -> Selector<Label> {
    match labels {
        [single] => Selector::One(Label::parse(single)),
        _ => Selector::Many(labels.iter().map(|l| Label::parse(l)).collect()),
    }
}

fn position_selector(indices: &[usize]) -> Selector<usize> {
    match indices {
        [single] => Selector::One(*single),
        _ => Selector::Many(indices.to_vec()),
    }
}

fn raw_policy(apply_raw: bool, strict: bool) -> RawPolicy {
    RawPolicy { apply_raw, strict }
}

fn reduce_operation(op: ReduceOp, dims: &[&str]) -> Operation {
    match op {
        ReduceOp::Mean => Operation::mean(dims),
        ReduceOp::Sum => Operation::sum(dims),
        ReduceOp::Std => Operation::std(dims),
        ReduceOp::Min => Operation::min(dims),
        ReduceOp::Max => Operation::reduce(Reducer::max(), dims),
        ReduceOp::Median => Operation::reduce(Reducer::median(), dims),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
