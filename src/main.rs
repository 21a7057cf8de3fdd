use clap::Parser;
use five_star_export::catalog::{self, MAX_EXPORT_COUNT, ShotwellCatalog};
use five_star_export::config::{CliOptions, FileConfig, RunConfig};
use five_star_export::export;
use five_star_export::imaging::RustBackend;
use five_star_export::output;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "five-star-export")]
#[command(about = "Populate a slideshow directory with your five-star Shotwell photos")]
#[command(long_about = "\
Populate a slideshow directory with your five-star Shotwell photos

Every photo rated five stars in the Shotwell catalog is copied into the
destination directory, split into numbered subdirectories:

  ~/Dropbox/five-star-pics/
  ├── subdir00/
  │   ├── 2019-07-14-img-0042.jpg    # <year>-<month>-<day>-<file name>
  │   └── ...                        # up to --pics-per-subdir files
  └── subdir01/

Photos already in the destination are skipped, so re-running is cheap.
Images with more pixels than --max-pix-count are shrunk in place.")]
#[command(version)]
struct Cli {
    /// Delete all images first (start fresh)
    #[arg(long)]
    clear_all: bool,

    /// Skip doing the resize (speeds up the run)
    #[arg(long)]
    resize_skip: bool,

    /// Maximum number of pixels in output images [default: 1900000]
    #[arg(long, value_name = "N")]
    max_pix_count: Option<u64>,

    /// Maximum number of files in output directories [default: 1024]
    #[arg(long, value_name = "N")]
    pics_per_subdir: Option<usize>,

    /// Destination root [default: ~/Dropbox/five-star-pics]
    #[arg(long, value_name = "PATH")]
    dest_dir: Option<PathBuf>,

    /// Shotwell database [default: ~/.local/share/shotwell/data/photo.db]
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// JPEG quality for resized images, 1-100 [default: 90]
    #[arg(long, value_name = "Q")]
    jpeg_quality: Option<u8>,

    /// TOML file with defaults for the options above
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> CliOptions {
        CliOptions {
            clear_all: self.clear_all,
            resize_skip: self.resize_skip,
            dest_dir: self.dest_dir.clone(),
            catalog: self.catalog.clone(),
            max_pix_count: self.max_pix_count,
            pics_per_subdir: self.pics_per_subdir,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time_start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let home = dirs::home_dir();
    let config = RunConfig::resolve(cli.options(), file_config, home.as_deref())?;
    tracing::debug!(?config, "resolved configuration");

    if config.clear_all {
        println!("clearing");
        export::clear_destination(&config.dest_root)?;
    }

    let sources = catalog::list_rated_photos(
        &ShotwellCatalog::new(&config.catalog_path),
        MAX_EXPORT_COUNT,
        &mut rand::thread_rng(),
    )?;

    let counts = export::copy_and_resize(
        &sources,
        &config,
        &RustBackend::new(),
        std::io::stdout().lock(),
    )?;

    for path in &counts.resized {
        tracing::info!(source = %path.display(), "resized");
    }
    output::print_summary(&counts, time_start.elapsed());

    Ok(())
}

/// Log to stderr; verbosity from `-v` count, or `RUST_LOG` when set.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
