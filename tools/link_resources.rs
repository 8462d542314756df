/// Link Resources — wires authored documents to their target resources.
///
/// Usage: link_resources [--config <linker.ron>] [--targets <dir>] [--recursive] [--dry-run] <path>...
use clap::Parser;
use resource_linker::Linker;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "link_resources", version, about = "Inject target references into resource documents")]
struct Args {
    /// Link rule in RON; the built-in dice-grant rule when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the directory scanned for target documents.
    #[arg(long)]
    targets: Option<PathBuf>,
    /// Descend into sub-directories of directory arguments.
    #[arg(long)]
    recursive: bool,
    /// Report what would change without writing anything.
    #[arg(long)]
    dry_run: bool,
    /// Documents or directories of documents to patch.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Linker::builder().dry_run(args.dry_run);
    if let Some(path) = args.config {
        builder = builder.config_path(path);
    }
    if let Some(dir) = args.targets {
        builder = builder.targets_dir(dir);
    }

    let linker = match builder.build() {
        Ok(linker) => linker,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Loaded {} target documents", linker.cache().len());

    let summary = match linker.link(&args.paths, args.recursive) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (path, error) in &summary.failures {
        println!("FAILED: {}: {}", path.display(), error);
    }
    if args.dry_run {
        println!("(dry run, nothing written)");
    }
    println!("{}", summary);

    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
