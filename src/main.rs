//! # Picks - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione e validazione della configurazione
//! - Avvio dell'optimizer e mappatura degli errori sugli exit code
//!
//! ## Exit code:
//! - `0`: Run completata (anche con alcuni file falliti)
//! - `1`: Argomenti invalidi, cartelle inaccessibili o errore fatale
//!
//! ## Esempio di utilizzo:
//! ```bash
//! picks ~/Pictures/vacation ./out --format webp --quality 70 --max-size 1600 --processes 8
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use picks::{
    file_manager::FileManager, json_output::JsonMessage, Config, LayoutPolicy, MediaOptimizer,
    NamingPolicy, OutputFormat,
};

#[derive(Parser)]
#[command(name = "picks", version)]
#[command(about = "Optimize images by resizing and compressing to JPG or WebP format")]
struct Args {
    /// Source folder containing images to optimize
    source: PathBuf,

    /// Base destination folder for optimized images
    destination: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Jpg)]
    format: OutputFormat,

    /// Image quality 1-100 (default: 87 for jpg, 82 for webp)
    #[arg(long)]
    quality: Option<u8>,

    /// Maximum size for the widest dimension in pixels
    #[arg(long, default_value_t = picks::config::DEFAULT_MAX_SIZE)]
    max_size: u32,

    /// Number of parallel workers (1-16)
    #[arg(long, default_value_t = 1)]
    processes: usize,

    /// Keep original filenames (default: rename to folder-NNNN)
    #[arg(long)]
    keep_names: bool,

    /// Preview what would be processed without converting anything
    #[arg(long)]
    dry_run: bool,

    /// Skip files that already exist in destination (requires --keep-names)
    #[arg(long)]
    skip_existing: bool,

    /// Comma-separated list of extensions to include (e.g. jpg,png)
    #[arg(long)]
    include: Option<String>,

    /// Preserve subdirectory structure instead of flattening (requires --keep-names)
    #[arg(long)]
    preserve_dirs: bool,

    /// Output progress and results as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            source_dir: args.source,
            destination_base: args.destination,
            format: args.format,
            quality: args.quality.unwrap_or_else(|| args.format.default_quality()),
            max_size: args.max_size,
            workers: args.processes,
            naming: if args.keep_names {
                NamingPolicy::KeepNames
            } else {
                NamingPolicy::Sequential
            },
            layout: if args.preserve_dirs {
                LayoutPolicy::PreserveDirs
            } else {
                LayoutPolicy::Flatten
            },
            skip_existing: args.skip_existing,
            dry_run: args.dry_run,
            include: args.include.as_deref().map(FileManager::parse_include),
            json_output: args.json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help e --version non sono errori
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging (stderr, così lo stdout resta pulito per --json)
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(args);
    let json_output = config.json_output;

    let result = match MediaOptimizer::new(config) {
        Ok(optimizer) => optimizer.run().await.map(|_| ()),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {:#}", e);
            if json_output {
                JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
            }
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(extra: &[&str]) -> Config {
        let mut argv = vec!["picks", "vacation", "out"];
        argv.extend_from_slice(extra);
        Config::from(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_quality_defaults_follow_format() {
        let jpg = config_from(&[]);
        assert_eq!(jpg.format, OutputFormat::Jpg);
        assert_eq!(jpg.quality, 87);

        let webp = config_from(&["--format", "webp"]);
        assert_eq!(webp.format, OutputFormat::Webp);
        assert_eq!(webp.quality, 82);

        // Un valore esplicito vince sempre sul default del formato
        let explicit = config_from(&["--format", "webp", "--quality", "87"]);
        assert_eq!(explicit.quality, 87);
    }

    #[test]
    fn test_flags_map_to_policies() {
        let config = config_from(&[
            "--keep-names",
            "--preserve-dirs",
            "--skip-existing",
            "--include",
            "JPG,.png",
            "--processes",
            "4",
            "--max-size",
            "1600",
        ]);
        assert_eq!(config.naming, NamingPolicy::KeepNames);
        assert_eq!(config.layout, LayoutPolicy::PreserveDirs);
        assert!(config.skip_existing);
        assert_eq!(config.include, Some(vec!["jpg".to_string(), "png".to_string()]));
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_size, 1600);

        let defaults = config_from(&[]);
        assert_eq!(defaults.naming, NamingPolicy::Sequential);
        assert_eq!(defaults.layout, LayoutPolicy::Flatten);
        assert_eq!(defaults.workers, 1);
        assert_eq!(defaults.max_size, 2400);
    }

    #[test]
    fn test_rejects_malformed_arguments() {
        assert!(Args::try_parse_from(["picks", "vacation"]).is_err());
        assert!(Args::try_parse_from(["picks", "a", "b", "--format", "gif"]).is_err());
        assert!(Args::try_parse_from(["picks", "a", "b", "--quality", "300"]).is_err());
    }
}
