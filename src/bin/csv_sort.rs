use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser;
use simple_logger::SimpleLogger;

use csv_file_sort::comparator::Comparator;
use csv_file_sort::sort::Sort;

#[derive(Parser)]
#[command(name = "csv-sort", about = "Sort a CSV file by a column")]
struct Cli {
    /// CSV file to sort
    path: PathBuf,

    /// Zero based index of the column to sort by
    column: usize,

    /// Comparison mode: string, int or float. Anything else sorts as string
    mode: Option<String>,

    /// Write the result here instead of <name>_sorted.<ext> next to the input
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory for intermediate run files
    #[arg(short = 'T', long = "tmp-dir", value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// In-memory batch size in MB
    #[arg(short = 'S', long = "chunk-size-mb", value_name = "MB")]
    chunk_size_mb: Option<u64>,

    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", default_value_t = ',')]
    delimiter: char,

    /// Check whether the file is already sorted; do not sort
    #[arg(short = 'c', long = "check")]
    check: bool,

    /// Log progress to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn run(cli: Cli) -> Result<(), anyhow::Error> {
    if !cli.delimiter.is_ascii() {
        return Err(anyhow!("delimiter must be a single ASCII character: {}", cli.delimiter));
    }

    let mut csv_sort = Sort::new(cli.path.clone(), cli.column);
    csv_sort.with_comparator(Comparator::from_mode(cli.mode.as_deref()));
    csv_sort.with_delimiter(cli.delimiter as u8);
    if let Some(output) = cli.output {
        csv_sort.with_output(output);
    }
    if let Some(tmp_dir) = cli.tmp_dir {
        csv_sort.with_tmp_dir(tmp_dir);
    }
    if let Some(chunk_size_mb) = cli.chunk_size_mb {
        csv_sort.with_chunk_size_mb(chunk_size_mb);
    }

    if cli.check {
        if csv_sort.check()? {
            println!("{}: sorted", cli.path.display());
            return Ok(());
        }
        return Err(anyhow!("{}: not sorted", cli.path.display()));
    }

    println!("{}", cli.path.display());
    let now = Instant::now();
    let summary = csv_sort.sort()?;
    for failure in summary.cleanup_failures() {
        eprintln!("csv-sort: {failure}");
    }
    println!("sorted to: {}", summary.output().display());
    println!("elapsed time: {:?}", now.elapsed());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        if let Err(e) = SimpleLogger::new().with_level(log::LevelFilter::Info).init() {
            eprintln!("csv-sort: {e}");
        }
    }

    if let Err(e) = run(cli) {
        eprintln!("csv-sort: {e:#}");
        process::exit(1);
    }
}
