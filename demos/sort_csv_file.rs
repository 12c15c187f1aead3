use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Error;
use csv_file_sort::comparator::Comparator;
use csv_file_sort::sort::Sort;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn create_input(path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for i in 0..1000_u64 {
        // scatter the keys so that the input is not sorted on any column
        let key = (i * 7919) % 1000;
        writeln!(writer, "name-{:04},{},{}.{}", (i * 131) % 1000, key, key / 10, key % 10)?;
    }
    writer.flush()?;
    Ok(())
}

fn sort_by_name(input_path: &Path) -> Result<PathBuf, Error> {
    // string comparison is the default
    let csv_sort = Sort::new(input_path.to_path_buf(), 0);
    Ok(csv_sort.sort()?.output().clone())
}

fn sort_by_integer(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut csv_sort = Sort::new(input_path.to_path_buf(), 1);
    csv_sort.with_comparator(Comparator::Integer);
    csv_sort.with_output(output_path.to_path_buf());
    csv_sort.sort()?;
    Ok(())
}

fn sort_by_float_in_small_batches(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut csv_sort = Sort::new(input_path.to_path_buf(), 2);
    csv_sort.with_comparator(Comparator::Float);
    csv_sort.with_chunk_size_bytes(1024);
    csv_sort.with_tmp_dir(PathBuf::from("./target"));
    csv_sort.with_output(output_path.to_path_buf());
    let summary = csv_sort.sort()?;
    println!("{} records merged from {} runs", summary.records(), summary.runs());
    Ok(())
}

// cargo run -r --example sort_csv_file
pub fn main() -> Result<(), Error> {
    fs::create_dir_all("./target")?;
    let input_path = PathBuf::from("./target/input-1000.csv");
    let integer_path = PathBuf::from("./target/integer-1000.csv");
    let float_path = PathBuf::from("./target/float-1000.csv");

    create_input(&input_path)?;
    let name_path = sort_by_name(&input_path)?;
    sort_by_integer(&input_path, &integer_path)?;
    sort_by_float_in_small_batches(&input_path, &float_path)?;
    println!("sorted to: {}, {}, {}", name_path.display(), integer_path.display(), float_path.display());

    Ok(())
}
