use crate::{
    catalog::{ItemKind, Mod, Patch},
    config::AppConfig,
    loader,
    resolver::{ItemReport, ItemStatus, Resolver},
    template,
};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct GlobalOptions {
    format: Option<OutputFormat>,
    catalog: Option<PathBuf>,
    developer_mode: bool,
    log_level: Option<String>,
    selections: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    List,
    Show(String),
    Selection,
    Template {
        folder: PathBuf,
        root: Option<String>,
        output: PathBuf,
    },
    Help,
    Version,
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    global: GlobalOptions,
    command: CliCommand,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_args(&args)?;
    init_logging(invocation.global.log_level.as_deref());

    let Invocation { global, command } = invocation;
    let format = global.format.unwrap_or(OutputFormat::Text);
    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("modpicker v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Template {
            folder,
            root,
            output,
        } => {
            let config = AppConfig::load_or_create()?;
            let root = root.unwrap_or(config.template_root);
            let count = template::write_template(&folder, &root, &output)?;
            println!("Wrote {} with {count} asset path(s)", output.display());
            Ok(())
        }
        CliCommand::List => list_items(&open_session(&global)?, format),
        CliCommand::Show(id) => show_item(&open_session(&global)?, &id, format),
        CliCommand::Selection => show_selection(&open_session(&global)?, format),
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let (global, tokens) = parse_global_options(args)?;
    let command = parse_command(&tokens)?;
    Ok(Invocation { global, command })
}

fn parse_global_options(args: &[String]) -> Result<(GlobalOptions, Vec<String>)> {
    let mut global = GlobalOptions::default();
    let mut tokens = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            match inline.clone() {
                Some(value) => Ok(value),
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{name} requires a value")),
            }
        };
        match flag {
            "--format" => {
                let raw = value("--format")?;
                let parsed = OutputFormat::parse(&raw)
                    .ok_or_else(|| anyhow!("Unknown format: {raw} (use 'text' or 'json')"))?;
                global.format = Some(parsed);
            }
            "--catalog" | "-c" => global.catalog = Some(PathBuf::from(value("--catalog")?)),
            "--select" | "-s" => global.selections.push(value("--select")?),
            "--log-level" => global.log_level = Some(value("--log-level")?),
            "--dev" => global.developer_mode = true,
            _ => tokens.push(arg.to_string()),
        }
    }
    Ok((global, tokens))
}

fn parse_command(tokens: &[String]) -> Result<CliCommand> {
    let Some(head) = tokens.first() else {
        return Ok(CliCommand::Help);
    };
    match head.as_str() {
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        "--version" | "-V" | "version" => Ok(CliCommand::Version),
        "list" => Ok(CliCommand::List),
        "selection" => Ok(CliCommand::Selection),
        "show" => {
            let id = tokens
                .get(1)
                .ok_or_else(|| anyhow!("show requires an item id"))?;
            Ok(CliCommand::Show(id.to_string()))
        }
        "template" => parse_template(tokens.get(1..).unwrap_or(&[])),
        other => bail!("Unknown command: {other} (see 'modpicker help')"),
    }
}

fn parse_template(args: &[String]) -> Result<CliCommand> {
    let mut folder = None;
    let mut root = None;
    let mut output = PathBuf::from(template::DEFAULT_OUTPUT);
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--root" => {
                root = Some(
                    iter.next()
                        .cloned()
                        .ok_or_else(|| anyhow!("--root requires a value"))?,
                );
            }
            value if value.starts_with("--root=") => {
                root = Some(value.trim_start_matches("--root=").to_string());
            }
            "--out" | "-o" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--out requires a path"))?;
                output = PathBuf::from(value);
            }
            value if value.starts_with("--out=") => {
                output = PathBuf::from(value.trim_start_matches("--out="));
            }
            value if folder.is_none() && !value.starts_with('-') => {
                folder = Some(PathBuf::from(value));
            }
            value => bail!("Unexpected template argument: {value}"),
        }
    }
    let folder = folder.ok_or_else(|| anyhow!("template requires a source folder"))?;
    Ok(CliCommand::Template {
        folder,
        root,
        output,
    })
}

fn open_session(global: &GlobalOptions) -> Result<Resolver> {
    let config = AppConfig::load_or_create()?;
    open_resolver(global, &config)
}

fn open_resolver(global: &GlobalOptions, config: &AppConfig) -> Result<Resolver> {
    let dir = global
        .catalog
        .clone()
        .or_else(|| config.catalog_dir.clone())
        .context("no catalog directory (pass --catalog or set catalog_dir in config.json)")?;
    let catalog = loader::load_dir(&dir)?;
    if catalog.is_empty() {
        eprintln!("Catalog at {} is empty", dir.display());
    }
    let mut resolver = Resolver::new(catalog);
    resolver.set_developer_mode(global.developer_mode || config.developer_mode);
    apply_selections(&mut resolver, &global.selections);
    Ok(resolver)
}

fn apply_selections(resolver: &mut Resolver, ids: &[String]) {
    for id in ids {
        let Some(kind) = resolver.catalog().kind_of(id) else {
            eprintln!("Unknown item: {id}");
            continue;
        };
        if !resolver.toggle(kind, id) {
            eprintln!("Cannot select {id}: blocked by the current selection");
            continue;
        }
        for eviction in resolver.last_evictions() {
            eprintln!("Removed {}: {}", eviction.id, eviction.reason);
        }
    }
}

#[derive(Serialize)]
struct ListOutput {
    developer_mode: bool,
    mods: Vec<ItemReport>,
    patches: Vec<ItemReport>,
}

fn list_items(resolver: &Resolver, format: OutputFormat) -> Result<()> {
    let output = ListOutput {
        developer_mode: resolver.developer_mode(),
        mods: resolver
            .visible_mods()
            .into_iter()
            .filter_map(|mod_entry| resolver.report(&mod_entry.id))
            .collect(),
        patches: resolver
            .visible_patches()
            .into_iter()
            .filter_map(|patch| resolver.report(&patch.id))
            .collect(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Mods");
            if output.mods.is_empty() {
                println!("  (none)");
            }
            for report in &output.mods {
                print_list_line(report);
            }
            println!("Patches");
            if output.patches.is_empty() {
                println!("  (select a mod to see its patches)");
            }
            for report in &output.patches {
                print_list_line(report);
            }
        }
    }
    Ok(())
}

fn print_list_line(report: &ItemReport) {
    let mark = match report.status {
        ItemStatus::Selected | ItemStatus::SelectedWithWarning => "x",
        ItemStatus::Selectable => " ",
        ItemStatus::Unselectable => "-",
    };
    let mut line = format!("  [{mark}] {:<6} {}", report.id, report.name);
    if !report.description.is_empty() {
        line.push_str(&format!(": {}", report.description));
    }
    if report.dev_only {
        line.push_str(" [dev]");
    }
    if !report.unmet_requirements.is_empty() {
        let ids: Vec<&str> = report
            .unmet_requirements
            .iter()
            .map(|dep| dep.id.as_str())
            .collect();
        line.push_str(&format!("  requires: {}", ids.join(", ")));
    }
    if !report.soft_conflicts.is_empty() {
        let ids: Vec<&str> = report.soft_conflicts.iter().map(|c| c.id.as_str()).collect();
        line.push_str(&format!("  possible conflict: {}", ids.join(", ")));
    }
    println!("{line}");
}

fn show_item(resolver: &Resolver, id: &str, format: OutputFormat) -> Result<()> {
    let report = resolver
        .report(id)
        .ok_or_else(|| anyhow!("Unknown item: {id}"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{} ({}, {})", report.name, report.id, report.kind);
            println!("  status: {}", report.status.label());
            if !report.description.is_empty() {
                println!("  {}", report.description);
            }
            if !report.version.is_empty() {
                println!("  version: {}", report.version);
            }
            if !report.download.is_empty() {
                println!("  download: {}", report.download);
            }
            if !report.unmet_requirements.is_empty() {
                println!("  Required:");
                for dep in &report.unmet_requirements {
                    let name = dep.name.as_deref().unwrap_or("Unknown");
                    println!("    • {} ({}) version {}", name, dep.id, dep.version);
                }
            }
            if !report.hard_conflicts.is_empty() {
                println!("  Conflicts with:");
                for label in &report.hard_conflicts {
                    println!("    • {} ({})", label.name, label.id);
                }
            }
            if !report.soft_conflicts.is_empty() {
                println!("  Possible conflict with:");
                for label in &report.soft_conflicts {
                    println!("    • {} ({})", label.name, label.id);
                }
            }
            if report.status.is_selected() && !report.alternatives.is_empty() {
                println!("  Alternative versions:");
                for label in &report.alternatives {
                    println!("    • {} ({})", label.name, label.id);
                }
            }
            if !report.targets.is_empty() {
                println!("  Patches mods:");
                for target in &report.targets {
                    let name = target.name.as_deref().unwrap_or(&target.id);
                    let state = if target.selected { "selected" } else { "not selected" };
                    println!("    • {} ({}) {}", name, target.id, state);
                }
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SelectionEntry {
    id: String,
    kind: ItemKind,
    name: String,
    version: String,
    download: String,
    warnings: Vec<String>,
}

impl SelectionEntry {
    fn from_mod(resolver: &Resolver, mod_entry: &Mod) -> Self {
        let warnings = resolver
            .report(&mod_entry.id)
            .map(|report| {
                report
                    .soft_conflicts
                    .into_iter()
                    .map(|label| format!("possible conflict with {}", label.name))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: mod_entry.id.clone(),
            kind: ItemKind::Mod,
            name: mod_entry.display_name().to_string(),
            version: mod_entry.version.clone(),
            download: mod_entry.download.clone(),
            warnings,
        }
    }

    fn from_patch(patch: &Patch) -> Self {
        Self {
            id: patch.id.clone(),
            kind: ItemKind::Patch,
            name: patch.display_name().to_string(),
            version: patch.version.clone(),
            download: patch.download.clone(),
            warnings: Vec::new(),
        }
    }
}

fn show_selection(resolver: &Resolver, format: OutputFormat) -> Result<()> {
    let entries: Vec<SelectionEntry> = resolver
        .selected_mods()
        .into_iter()
        .map(|mod_entry| SelectionEntry::from_mod(resolver, mod_entry))
        .chain(
            resolver
                .selected_patches()
                .into_iter()
                .map(SelectionEntry::from_patch),
        )
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("Nothing selected.");
            }
            for entry in entries {
                let link = if entry.download.is_empty() {
                    "-".to_string()
                } else {
                    entry.download
                };
                println!("{:<6} {:<5} {}  {}", entry.id, entry.kind, entry.name, link);
                for warning in entry.warnings {
                    println!("       ! {warning}");
                }
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("modpicker v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  modpicker list                      List visible mods and patches");
    println!("  modpicker show <id>                 Show status and details for an item");
    println!("  modpicker selection                 Show the current selection");
    println!("  modpicker template <folder>         Generate a patch record from asset files");
    println!();
    println!("Global options:");
    println!("  -c, --catalog <dir>                 Catalog directory (index.json + <id>.json)");
    println!("  -s, --select <id>                   Toggle an item first (repeatable)");
    println!("  --dev                               Show developer-only items");
    println!("  --format <json|text>                Output format");
    println!("  --log-level <filter>                Log filter, e.g. debug or modpicker=trace");
    println!("  -h, --help                          Show help");
    println!("  -V, --version                       Show version");
    println!();
    println!("Template options:");
    println!("  --root <name>                       Virtual root prefix (default from config)");
    println!("  -o, --out <file>                    Output file (default P000.json)");
}
