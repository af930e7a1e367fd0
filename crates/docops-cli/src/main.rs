use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use docops_config::{Config, resolve_storage_path};
use docops_engine::{
    Document, DocumentBackend, DocumentStore, JsonBackend, MarkdownBackend, OutlineEntry,
    backend_for_extension, parse_operations, planner, preview, redline,
};

#[derive(Parser)]
#[command(name = "docops", version, about = "Anchor-addressed document editing and redlines")]
struct Cli {
    /// Storage directory (overrides DOCOPS_STORAGE_DIR and the config file)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a document from a title and optional body lines
    Create {
        #[arg(long)]
        title: String,
        /// Body text; each line becomes a paragraph
        #[arg(long)]
        body: Option<String>,
    },
    /// Import a Markdown or JSON document
    Import { file: PathBuf },
    /// Write a stored document out as Markdown, JSON or HTML
    Export {
        id: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Md)]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the anchor outline of a document
    Outline { id: String },
    /// Apply a JSON array of operations and save a new version
    Apply { id: String, ops: PathBuf },
    /// Plan operations for an instruction without a language model
    Plan { instruction: String },
    /// Store a redline of two revisions (`id` or `id@version`)
    Redline { base: String, revised: String },
    /// List version snapshots of a document
    Versions { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Md,
    Json,
    Html,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let config = Config::load().with_context(|| {
        format!(
            "Failed to load config file {}",
            Config::config_path().display()
        )
    })?;
    let storage_path = resolve_storage_path(cli.storage, config.as_ref());
    log::debug!("Storage path: {}", storage_path.display());

    let store = DocumentStore::open(&storage_path)
        .with_context(|| format!("Failed to open storage at {}", storage_path.display()))?;

    match cli.command {
        Command::Create { title, body } => {
            let doc = Document::titled(&title, body.as_deref());
            println!("{}", store.create(&doc)?);
        }
        Command::Import { file } => {
            let doc = import_file(&file)?;
            println!("{}", store.create(&doc)?);
        }
        Command::Export { id, format, out } => {
            let doc = load_reference(&store, &id)?;
            let bytes = export(&doc, format)?;
            match out {
                Some(path) => fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", String::from_utf8_lossy(&bytes)),
            }
        }
        Command::Outline { id } => {
            let outline = read_outline(&store, &id)?;
            println!("{}", serde_json::to_string_pretty(&outline)?);
        }
        Command::Apply { id, ops } => {
            let mut doc = store.load(&id)?;
            let json = fs::read_to_string(&ops)
                .with_context(|| format!("Failed to read operations from {}", ops.display()))?;
            let batch = parse_operations(&json).context("Operations must be a JSON array")?;

            let report = doc.apply_validated(batch);
            for partial in report.partial() {
                log::warn!("operation {} ({}) not applied", partial.index, partial.kind);
            }
            let version = store.save(&id, &doc)?;

            let summary = serde_json::json!({
                "version": version,
                "operations": report.operations,
                "outline": doc.outline(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Plan { instruction } => {
            let ops = planner::plan(&instruction);
            println!("{}", serde_json::to_string_pretty(&ops)?);
        }
        Command::Redline { base, revised } => {
            let base_doc = load_reference(&store, &base)?;
            let revised_doc = load_reference(&store, &revised)?;
            let title = config
                .as_ref()
                .and_then(|c| c.redline_title.as_deref())
                .unwrap_or(redline::DEFAULT_TITLE);

            let annotated = redline::compare_with_title(&base_doc, &revised_doc, title);
            println!("{}", store.save_compare(&annotated)?);
        }
        Command::Versions { id } => {
            for version in store.list_versions(&id)? {
                println!("{version}");
            }
        }
    }

    Ok(())
}

/// Split `id@version` into its parts
fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('@') {
        Some((id, version)) if !version.is_empty() => (id, Some(version)),
        Some((id, _)) => (id, None),
        None => (reference, None),
    }
}

fn load_reference(store: &DocumentStore, reference: &str) -> Result<Document> {
    let doc = match split_reference(reference) {
        (id, Some(version)) => store.load_version(id, version)?,
        (id, None) => store.load(id)?,
    };
    Ok(doc)
}

/// Outline persisted by the last save, rebuilt from the document when the
/// file is missing or unreadable. Versioned references are always rebuilt.
fn read_outline(store: &DocumentStore, reference: &str) -> Result<Vec<OutlineEntry>> {
    if let (id, None) = split_reference(reference) {
        match store.load_outline(id) {
            Ok(outline) => return Ok(outline),
            Err(err) => log::debug!("Rebuilding outline for {id}: {err}"),
        }
    }
    Ok(load_reference(store, reference)?.outline())
}

fn import_file(path: &Path) -> Result<Document> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
    let Some(backend) = backend_for_extension(extension) else {
        bail!("Unsupported document format: .{extension}");
    };
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    backend
        .load(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn export(doc: &Document, format: ExportFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Md => MarkdownBackend.save(doc)?,
        ExportFormat::Json => JsonBackend.save(doc)?,
        ExportFormat::Html => preview::to_html(doc).into_bytes(),
    };
    Ok(bytes)
}
