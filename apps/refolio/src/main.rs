mod config;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use refolio_core::display::{format_name_list, strip_braces, NAME_CAP_LIST};
use refolio_core::labels::translate_entry_type;
use refolio_core::library::{bib_files, parse_file};
use refolio_core::{apply, load_collection, FilterCriteria, SortMode};

use config::SiteConfig;

#[derive(Parser)]
#[command(
    name = "refolio",
    about = "Static bibliography reference-site builder"
)]
struct Cli {
    /// Path to the site configuration
    #[arg(long, default_value = "refolio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the static site from the configured sections
    Build {
        /// Override the configured output folder
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Filter and print one collection folder in the terminal
    List {
        /// Folder of .bib files
        folder: PathBuf,

        /// Substring matched against title, author, editor, and abstract
        #[arg(long)]
        search: Option<String>,

        /// Keep only this entry-type code (e.g. article)
        #[arg(long = "type")]
        entry_type: Option<String>,

        /// Keep only this publication year
        #[arg(long)]
        year: Option<String>,

        #[arg(long, value_enum, default_value = "author-year")]
        sort: SortArg,
    },
    /// Parse every .bib file in a folder and report errors
    Check {
        /// Folder of .bib files
        folder: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    AuthorYear,
    YearAuthor,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::AuthorYear => SortMode::AuthorYear,
            SortArg::YearAuthor => SortMode::YearAuthor,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build { out } => build(&cli.config, out),
        Command::List {
            folder,
            search,
            entry_type,
            year,
            sort,
        } => {
            let criteria = FilterCriteria {
                search: search.unwrap_or_default(),
                entry_type,
                year,
                sort: sort.into(),
            };
            list(&folder, &criteria)
        }
        Command::Check { folder } => check(&folder),
    }
}

fn build(config_path: &Path, out_override: Option<PathBuf>) -> Result<()> {
    let mut site = SiteConfig::load(config_path)?;
    if let Some(out) = out_override {
        site.out_dir = out;
    }

    let data_out = site.out_dir.join("data");
    fs::create_dir_all(&data_out)
        .with_context(|| format!("could not create {}", data_out.display()))?;
    fs::write(site.out_dir.join("refolio.css"), render::STYLESHEET)?;
    fs::write(site.out_dir.join("refolio.js"), render::SCRIPT)?;

    let mut counts = Vec::new();
    for section in &site.sections {
        let collection = load_collection(&site.data_dir.join(section.folder()));
        tracing::info!(
            section = %section.slug,
            count = collection.len(),
            "building section"
        );

        let mut page = Vec::new();
        render::write_section_page(&mut page, &site, section, &collection)?;
        fs::write(site.out_dir.join(format!("{}.html", section.slug)), page)?;

        let json = serde_json::to_vec_pretty(&collection.references)?;
        fs::write(data_out.join(format!("{}.json", section.slug)), json)?;

        counts.push((section.slug.clone(), collection.len()));
    }

    let mut index = Vec::new();
    render::write_index(&mut index, &site, &counts)?;
    fs::write(site.out_dir.join("index.html"), index)?;

    println!("site written to {}", site.out_dir.display());
    Ok(())
}

fn list(folder: &Path, criteria: &FilterCriteria) -> Result<()> {
    let collection = load_collection(folder);
    let visible = apply(&collection.references, criteria);

    println!("{}", render::count_line(visible.len(), collection.len()));
    if visible.is_empty() {
        if collection.is_empty() {
            println!("{}", render::MSG_NO_REFERENCES);
        } else {
            println!("{}", render::MSG_NO_MATCHES);
        }
        return Ok(());
    }

    for r in visible {
        let title = r
            .title
            .as_deref()
            .map(|t| strip_braces(t))
            .unwrap_or_else(|| "Sin título".to_string());
        let year = r.extracted_year().unwrap_or("s.f.");
        let names = r
            .author
            .as_deref()
            .or(r.editor.as_deref())
            .map(|n| format_name_list(n, NAME_CAP_LIST))
            .unwrap_or_default();
        println!(
            "- {} ({}, {}) {}",
            title,
            translate_entry_type(&r.entry_type),
            year,
            names
        );
    }
    Ok(())
}

fn check(folder: &Path) -> Result<()> {
    let files = bib_files(folder);
    if files.is_empty() {
        println!("no .bib files in {}", folder.display());
        return Ok(());
    }

    let mut failures = 0usize;
    for path in files {
        match parse_file(&path) {
            Ok(references) => {
                println!("{}: {} entries", path.display(), references.len());
            }
            Err(err) => {
                failures += 1;
                match err {
                    refolio_core::LibraryError::Parse { ref source, .. } => {
                        println!("{}: {}", path.display(), source);
                    }
                    refolio_core::LibraryError::Io { ref source, .. } => {
                        println!("{}: {}", path.display(), source);
                    }
                }
            }
        }
    }

    if failures > 0 {
        bail!("{} file(s) failed to parse", failures);
    }
    Ok(())
}
