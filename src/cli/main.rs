#![warn(clippy::all, clippy::pedantic)]
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use csv::Writer;
use log::LevelFilter;
use loan_finder::{
    Actor, ActorGraph, Arc, BinaryHeapLoanFinder, FibonacciHeapLoanFinder, LoanFinder, LoanResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

type AccountId = u64;
type Amount = f64;
type Graph = ActorGraph<AccountId, Amount>;

/// Most cost-effective loan finder
#[derive(Parser, Debug)]
#[command(name = "loan-finder-cli", version, about)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the cheapest lenders for one borrower in a graph read from CSV files
    Find {
        /// Actors CSV with columns `id,potential`
        #[arg(long)]
        actors: PathBuf,

        /// Arcs CSV with columns `source,target,interest_rate`
        #[arg(long)]
        arcs: PathBuf,

        /// The borrowing actor
        #[arg(long)]
        start: AccountId,

        /// Requested potential
        #[arg(long)]
        amount: Amount,

        /// Maximum affordable cumulative interest rate
        #[arg(long)]
        max_rate: Amount,

        #[arg(long, value_enum, default_value_t = HeapKind::Fibonacci)]
        heap: HeapKind,

        /// Where to write the loans as CSV; stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Time both heap backends on a random actor graph
    Bench {
        #[arg(long, default_value_t = 10_000)]
        actors: usize,

        #[arg(long, default_value_t = 50_000)]
        arcs: usize,

        /// Potential of every actor
        #[arg(long, default_value_t = 100.0)]
        potential: Amount,

        /// Arc rates are drawn uniformly from [0, max_arc_rate)
        #[arg(long, default_value_t = 0.01)]
        max_arc_rate: Amount,

        #[arg(long, default_value_t = 1_000_000.0)]
        amount: Amount,

        #[arg(long, default_value_t = 100.0)]
        max_rate: Amount,

        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        iterations: u32,

        /// RNG seed; derived from the clock if omitted
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HeapKind {
    Binary,
    Fibonacci,
}

fn lib_error(e: loan_finder::Error) -> Box<dyn Error> {
    e.to_string().into()
}

// Function to read validated records from a CSV file
fn read_csv<T: DeserializeOwned>(filepath: &Path) -> Result<Vec<T>, Box<dyn Error>> {
    let mut rdr = csv::Reader::from_path(filepath)?;
    let rows: Result<Vec<T>, _> = rdr.deserialize().collect();
    Ok(rows?)
}

fn load_graph(actors: &Path, arcs: &Path) -> Result<Graph, Box<dyn Error>> {
    let mut graph = Graph::new();
    for actor in read_csv::<Actor<AccountId, Amount>>(actors)? {
        graph.insert_actor(actor).map_err(lib_error)?;
    }
    for arc in read_csv::<Arc<AccountId, Amount>>(arcs)? {
        graph.insert_arc(arc).map_err(lib_error)?;
    }
    log::info!(
        "loaded {} actors and {} arcs",
        graph.actor_count(),
        graph.arc_count()
    );
    Ok(graph)
}

// Function to write the loans
fn write_csv<W: io::Write>(
    result: &LoanResult<AccountId, Amount>,
    wtr: W,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(wtr);
    for loan in result.loans() {
        wtr.serialize(loan)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_checked<F>(
    finder: &F,
    start: AccountId,
    amount: Amount,
    max_rate: Amount,
) -> Result<LoanResult<AccountId, Amount>, Box<dyn Error>>
where
    F: LoanFinder<AccountId = AccountId, Amount = Amount, Error = loan_finder::Error>,
{
    let result = finder
        .find_lenders(&start, amount, max_rate)
        .map_err(lib_error)?;
    finder.check(&result, max_rate).map_err(lib_error)?;
    Ok(result)
}

fn find(
    actors: &Path,
    arcs: &Path,
    start: AccountId,
    amount: Amount,
    max_rate: Amount,
    heap: HeapKind,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(actors, arcs)?;
    let result = match heap {
        HeapKind::Binary => run_checked(&BinaryHeapLoanFinder::new(&graph), start, amount, max_rate),
        HeapKind::Fibonacci => {
            run_checked(&FibonacciHeapLoanFinder::new(&graph), start, amount, max_rate)
        }
    }?;

    log::info!(
        "{}: borrowed {} of {} from {} lenders",
        result.status(),
        result.borrowed(),
        result.requested(),
        result.loans().len()
    );

    match output {
        Some(path) => write_csv(&result, std::fs::File::create(path)?),
        None => write_csv(&result, io::stdout().lock()),
    }
}

fn random_graph(
    rng: &mut StdRng,
    actors: usize,
    arcs: usize,
    potential: Amount,
    max_arc_rate: Amount,
) -> Result<Graph, Box<dyn Error>> {
    if actors < 2 {
        return Err("a random graph needs at least two actors".into());
    }
    let actors = AccountId::try_from(actors)?;

    let mut graph = Graph::new();
    for id in 0..actors {
        graph.add_actor(id, potential).map_err(lib_error)?;
    }
    while graph.arc_count() < arcs {
        let source = rng.gen_range(0..actors);
        let target = rng.gen_range(0..actors);
        if source != target {
            graph
                .add_arc(source, target, max_arc_rate * rng.gen::<Amount>())
                .map_err(lib_error)?;
        }
    }
    Ok(graph)
}

fn time_queries<F>(
    name: &str,
    finder: &F,
    start: AccountId,
    amount: Amount,
    max_rate: Amount,
    iterations: u32,
) -> Result<LoanResult<AccountId, Amount>, Box<dyn Error>>
where
    F: LoanFinder<AccountId = AccountId, Amount = Amount, Error = loan_finder::Error>,
{
    let begin = Instant::now();
    let mut last = None;
    for _ in 0..iterations {
        last = Some(
            finder
                .find_lenders(&start, amount, max_rate)
                .map_err(lib_error)?,
        );
    }
    let elapsed = begin.elapsed();
    let last = last.ok_or("no queries were run")?;
    finder.check(&last, max_rate).map_err(lib_error)?;

    log::info!(
        "{name:>9} heap: {:.3} ms per query ({iterations} queries)",
        elapsed.as_secs_f64() * 1e3 / f64::from(iterations)
    );
    Ok(last)
}

#[allow(clippy::too_many_arguments)]
fn bench(
    actors: usize,
    arcs: usize,
    potential: Amount,
    max_arc_rate: Amount,
    amount: Amount,
    max_rate: Amount,
    iterations: u32,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    });
    log::info!("seed = {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let graph = random_graph(&mut rng, actors, arcs, potential, max_arc_rate)?;
    let start = rng.gen_range(0..AccountId::try_from(actors)?);
    log::info!(
        "graph: {} actors, {} arcs; start actor {start}",
        graph.actor_count(),
        graph.arc_count()
    );

    let binary = time_queries(
        "binary",
        &BinaryHeapLoanFinder::new(&graph),
        start,
        amount,
        max_rate,
        iterations,
    )?;
    let fibonacci = time_queries(
        "fibonacci",
        &FibonacciHeapLoanFinder::new(&graph),
        start,
        amount,
        max_rate,
        iterations,
    )?;

    if binary != fibonacci {
        return Err("binary and Fibonacci heap backends returned different results".into());
    }
    log::info!(
        "{}: borrowed {} of {} from {} lenders",
        binary.status(),
        binary.borrowed(),
        binary.requested(),
        binary.loans().len()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    match cli.command {
        Command::Find {
            actors,
            arcs,
            start,
            amount,
            max_rate,
            heap,
            output,
        } => find(
            &actors,
            &arcs,
            start,
            amount,
            max_rate,
            heap,
            output.as_deref(),
        ),
        Command::Bench {
            actors,
            arcs,
            potential,
            max_arc_rate,
            amount,
            max_rate,
            iterations,
            seed,
        } => bench(
            actors,
            arcs,
            potential,
            max_arc_rate,
            amount,
            max_rate,
            iterations,
            seed,
        ),
    }
}
