/// UID Scan — prints the target cache built from a directory.
///
/// Usage: uid_scan <dir> [--res-dir res://...] [--extension tres]
use clap::Parser;
use resource_linker::TargetCache;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "uid_scan", version, about = "List target documents and their stable identifiers")]
struct Args {
    dir: PathBuf,
    /// Project path of `dir`; defaults to `res://<dir>`.
    #[arg(long)]
    res_dir: Option<String>,
    #[arg(long, default_value = "tres")]
    extension: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let res_dir = args
        .res_dir
        .unwrap_or_else(|| format!("res://{}", args.dir.display()));

    let cache = match TargetCache::build(&args.dir, &res_dir, &args.extension) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (path, uid) in cache.sorted() {
        println!("{}\t{}", path, if uid.is_empty() { "-" } else { uid });
    }
    eprintln!("{} documents", cache.len());
    ExitCode::SUCCESS
}
