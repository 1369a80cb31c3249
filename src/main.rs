use clap::{Parser, Subcommand};
use folio::content::Collection;
use folio::og::Route;
use folio::render::CardRenderer;
use folio::{config, generate, og, output, scan, serve};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Shared flags for commands that write images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the card cache and re-render every image
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("FOLIO_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("FOLIO_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Content collections and social-preview images for a personal site")]
#[command(long_about = "\
Content collections and social-preview images for a personal site

Entries are Markdown files with YAML front matter. Every published entry
gets a 1200x630 PNG card at /<collection-root>/<id>/index.png.

Site structure:

  site/
  ├── config.toml                       # Site config (optional)
  └── src/data/
      ├── blog/                         # Posts → /posts/<id>/index.png
      │   ├── hello-world.md
      │   ├── 2024/Year in Review.md    # id: 2024/year-in-review
      │   └── _draft-ideas.md           # Leading underscore = ignored
      └── projects/                     # Projects → /projects/<id>/index.png
          └── folio.md

An entry is published unless its front matter says `draft: true`.
Set `dynamic_og_image = false` in config.toml to turn image generation off.

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory for generated images
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load both collections and list their entries
    Scan,
    /// List every image route with its public URL
    Routes,
    /// Generate the image of every published entry
    Build(CacheArgs),
    /// Render the image of a single entry
    Render {
        /// Collection: blog (or posts) or projects
        collection: Collection,
        /// Entry identifier, e.g. hello-world or 2024/year-in-review
        id: String,
        /// Write here instead of the entry's path under --output
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve images on demand from a local preview server
    Serve {
        #[arg(long, default_value_t = serve::DEFAULT_PORT)]
        port: u16,
    },
    /// Validate config and content without generating anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let site = scan::scan(&cli.root)?;
            output::print_scan_output(&site);
        }
        Command::Routes => {
            let site = scan::scan(&cli.root)?;
            output::print_routes_output(&site);
        }
        Command::Build(cache_args) => {
            println!("==> Scanning {}", cli.root.display());
            let site = scan::scan(&cli.root)?;
            output::print_scan_output(&site);

            println!("==> Rendering images \u{2192} {}", cli.output.display());
            init_thread_pool(&site.config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::generate(&site, &cli.output, !cache_args.no_cache, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            println!("Cache: {}", result.cache_stats);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Render {
            collection,
            id,
            out,
        } => {
            let site = scan::scan(&cli.root)?;
            let entry = site
                .store
                .get(collection, &id)
                .ok_or_else(|| format!("No {collection} entry with id {id:?}"))?;
            let route = Route::new(entry);
            let renderer = CardRenderer::from_config(&site.config.og)?;
            let response = og::respond(entry, site.config.feature_flags(), &renderer)?;

            match response.bytes() {
                Some(bytes) => {
                    let path = out.unwrap_or_else(|| route.output_path(&cli.output));
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, bytes)?;
                    println!(
                        "{} \u{2192} {} ({} bytes)",
                        route.path(),
                        path.display(),
                        bytes.len()
                    );
                }
                None => {
                    println!(
                        "{} {}: dynamic_og_image is disabled",
                        response.status, response.status_text
                    );
                }
            }
        }
        Command::Serve { port } => {
            let site = scan::scan(&cli.root)?;
            let server = serve::bind(port)?;
            println!("==> Serving images on http://{}", server.addr());
            output::print_routes_output(&site);
            server.run(&site)?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site = scan::scan(&cli.root)?;
            output::print_scan_output(&site);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores: config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
