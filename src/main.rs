use clap::{Parser, Subcommand};
use lumalima::contact::{self, ServerConfig};
use lumalima::{config, generate, i18n, output, preload, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Flags for commands that write the final site.
#[derive(clap::Args, Clone)]
struct SiteArgs {
    /// Public reCAPTCHA v3 site key embedded in the contact page
    #[arg(long, env = "RECAPTCHA_SITE_KEY")]
    recaptcha_site_key: Option<String>,
}

impl SiteArgs {
    fn options(self) -> generate::Options {
        generate::Options {
            recaptcha_site_key: self.recaptcha_site_key,
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "lumalima")]
#[command(about = "Site builder and contact service for the Lumalima studio")]
#[command(long_about = "\
Site builder and contact service for the Lumalima studio

The content directory is the data source. Numbered folders become project
categories, their numbered sub-folders become galleries, and markdown files
become legal pages. Page copy comes from the built-in en/pt/de catalogs.

Content structure:

  content/
  ├── config.toml                  # Site config (optional, sparse overrides)
  ├── assets/                      # About, team and office images → dist/assets/
  ├── privacy.md                   # Legal page, linked from the footer
  ├── services/
  │   ├── 010-design.jpg           # One image per service, ordered by prefix
  │   └── 020-consultation.jpg
  ├── 010-housing/                 # Category: homepage card + housing.html
  │   ├── main.jpg                 # Card image
  │   ├── 010-residential/         # Gallery, looped strip on the category page
  │   │   ├── 1.jpg                # Numbered images, shown in number order
  │   │   └── 2.jpg
  │   └── 020-gardens/
  │       └── 1.jpg
  └── 020-comercial/
      └── ...

Translation keys derive from folder names: category.housing, housing.title,
housing.residential, housing.residential.desc. Missing keys fall back to the
folder name; 'lumalima check' lists them.

Run 'lumalima gen-config' to generate a documented config.toml.
Run 'lumalima serve' to accept contact form submissions.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifests)
    #[arg(long, default_value = ".lumalima-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Read every referenced image and record its dimensions
    Preload,
    /// Produce the final HTML site from the preloaded manifest
    Generate(SiteArgs),
    /// Run the full pipeline: scan → preload → generate
    Build(SiteArgs),
    /// Validate content and report translation gaps
    Check {
        /// Fail when any translation is missing
        #[arg(long)]
        strict: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Run the contact form service
    Serve {
        /// Service config file (TOML); environment variables take precedence
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_json(&cli.temp_dir.join("manifest.json"), &manifest)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Preload => {
            let manifest_content = std::fs::read_to_string(cli.temp_dir.join("manifest.json"))?;
            let manifest: scan::Manifest = serde_json::from_str(&manifest_content)?;
            let preloaded = run_preload(manifest, &cli.source)?;
            write_json(&cli.temp_dir.join("preloaded.json"), &preloaded)?;
        }
        Command::Generate(site_args) => {
            let generated = generate::generate(
                &cli.temp_dir.join("preloaded.json"),
                &cli.source,
                &cli.output,
                &site_args.options(),
            )?;
            output::print_generate_output(&generated);
        }
        Command::Build(site_args) => {
            let source = &cli.source;

            println!("==> Stage 1: Scanning {}", source.display());
            let manifest = scan::scan(source)?;
            write_json(&cli.temp_dir.join("manifest.json"), &manifest)?;
            output::print_scan_output(&manifest, source);

            println!("==> Stage 2: Preloading images");
            let preloaded = run_preload(manifest, source)?;
            let preloaded_path = cli.temp_dir.join("preloaded.json");
            write_json(&preloaded_path, &preloaded)?;

            println!("==> Stage 3: Generating HTML \u{2192} {}", cli.output.display());
            let generated = generate::generate(&preloaded_path, source, &cli.output, &site_args.options())?;
            output::print_generate_output(&generated);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check { strict } => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");

            println!("==> Translations");
            let coverage = i18n::Catalog::builtin().coverage(&generate::content_keys(&manifest));
            output::print_check_output(&coverage);
            if strict && !coverage.is_complete() {
                return Err("translation gaps found".into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Serve { config: config_path } => {
            init_tracing();
            let site = config::load_config(&cli.source)?;
            let server_config = ServerConfig::load(config_path.as_deref())?;
            runtime()?.block_on(contact::serve(server_config, &site.site))?;
        }
    }

    Ok(())
}

/// Run stage 2, printing each image as it completes.
fn run_preload(manifest: scan::Manifest, source: &Path) -> Result<preload::PreloadedManifest, Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            println!("{}", output::format_preload_event(&event));
        }
    });
    let preloaded = runtime()?.block_on(preload::preload_manifest(manifest, source, Some(tx)));
    printer.join().ok();
    output::print_preload_summary(&preloaded);
    Ok(preloaded)
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Service logs: `RUST_LOG` filter, `info` by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
