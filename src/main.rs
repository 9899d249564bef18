//! Mozilla Add-on Packager CLI

use addon_packager::models::{parse_contributors, parse_target_applications};
use addon_packager::packager::{MemoryArchive, Packager, PackagerOptions};
use addon_packager::template::{DirectoryTemplates, EmbeddedTemplates, TemplateStore};
use addon_packager::utils::SlugOptions;
use addon_packager::{FeatureSet, MetadataInput, MetadataRecord};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "addon-packager")]
#[command(about = "Create installable Mozilla add-on packages", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every written entry
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an add-on package
    Package(PackageArgs),

    /// List the templates available to the packager
    Templates {
        /// Read templates from this directory instead of the built-in set
        #[arg(long)]
        templates: Option<PathBuf>,
    },
}

#[derive(Args)]
struct PackageArgs {
    /// The path at which to place the final product
    output_path: PathBuf,

    /// A space-delimited list of features to include
    #[arg(short, long)]
    features: Option<String>,

    /// JSON file with the add-on metadata; flags override its values
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// The <em:id> value of the add-on
    #[arg(long)]
    id: Option<String>,

    /// The <em:version> value of the add-on
    #[arg(long = "version")]
    addon_version: Option<String>,

    /// The <em:name> value of the add-on
    #[arg(long)]
    name: Option<String>,

    /// Short package name used within the browser (e.g. "testextension")
    #[arg(long)]
    package_name: Option<String>,

    /// A description of the add-on
    #[arg(long)]
    description: Option<String>,

    /// The name of the add-on's author
    #[arg(long)]
    author_name: Option<String>,

    /// A comma-delimited list of contributor names
    #[arg(long)]
    contributors: Option<String>,

    /// Semicolon-delimited target applications, each as `guid,min,max`
    #[arg(long)]
    targetapps: Option<String>,

    /// Read templates from this directory instead of the built-in set
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Store entries without compression
    #[arg(long)]
    store: bool,

    /// Maximum slug length
    #[arg(long, conflicts_with = "no_slug_limit")]
    slug_max_len: Option<usize>,

    /// Do not cap the slug length
    #[arg(long)]
    no_slug_limit: bool,

    /// Render everything and list the entries without writing a package
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Package(args) => run_package(args),
        Commands::Templates { templates } => run_templates(templates.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("{}", "❌ Packaging failed!".red().bold());
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "addon_packager=debug" } else { "addon_packager=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_package(args: PackageArgs) -> Result<()> {
    let mut options = PackagerOptions {
        compress: !args.store,
        ..Default::default()
    };
    if args.no_slug_limit {
        options.slug = SlugOptions::uncapped();
    } else if let Some(max_len) = args.slug_max_len {
        options.slug = SlugOptions { max_len: Some(max_len) };
    }

    let features = args
        .features
        .as_deref()
        .map(FeatureSet::from_delimited)
        .unwrap_or_default();

    let input = metadata_input(&args)?;
    let record = MetadataRecord::from_input(input, &options.slug)?;

    let packager = match &args.templates {
        Some(dir) => Packager::with_store(DirectoryTemplates::new(dir)),
        None => Packager::default(),
    }
    .with_options(options);

    println!("{}", "Mozilla Add-on Packager".bold().blue());
    println!("{}", "=".repeat(50).blue());
    println!("Add-on: {} v{} ({})", record.name, record.version, record.slug);
    if !features.is_empty() {
        let names: Vec<&str> = features.iter().map(|f| f.as_str()).collect();
        println!("Features: {}", names.join(", "));
    }
    println!();

    if args.dry_run {
        let mut archive = MemoryArchive::new();
        packager.package_into(&record, &features, &mut archive)?;
        println!("{}", "📦 Package entries (dry run):".bold());
        for (path, content) in archive.entries() {
            println!("  - {} ({} bytes)", path, content.len());
        }
        return Ok(());
    }

    let output = packager
        .package(&record, &args.output_path, &features)
        .with_context(|| format!("Failed to build {}", args.output_path.display()))?;

    println!("{}", "✅ Package created successfully!".green().bold());
    println!("  - Output: {}", output.display());
    Ok(())
}

/// Merge the optional metadata file with command-line flags.
fn metadata_input(args: &PackageArgs) -> Result<MetadataInput> {
    let mut input: MetadataInput = match &args.metadata {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            MetadataInput::from_json(&raw)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => MetadataInput::default(),
    };

    if let Some(id) = &args.id {
        input.id = id.clone();
    }
    if let Some(version) = &args.addon_version {
        input.version = version.clone();
    }
    if let Some(name) = &args.name {
        input.name = name.clone();
    }
    if let Some(author) = &args.author_name {
        input.author_name = author.clone();
    }
    if args.description.is_some() {
        input.description = args.description.clone();
    }
    if args.package_name.is_some() {
        input.package_name = args.package_name.clone();
    }
    if let Some(contributors) = &args.contributors {
        input.contributors = parse_contributors(contributors);
    }
    if let Some(targetapps) = &args.targetapps {
        input.target_applications = parse_target_applications(targetapps)?;
    }

    Ok(input)
}

fn run_templates(dir: Option<&Path>) -> Result<()> {
    let paths = match dir {
        Some(dir) => {
            anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
            DirectoryTemplates::new(dir).logical_paths()
        }
        None => EmbeddedTemplates.logical_paths(),
    };

    println!("{}", format!("{} templates", paths.len()).bold());
    for path in paths {
        println!("  {}", path);
    }
    Ok(())
}
