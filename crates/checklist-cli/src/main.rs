//! `checklist` command line tool
//!
//! Loads a template and instance from JSON files, merges them with the local
//! completion cache and reports progress.

use anyhow::{bail, Context, Result};
use checklist_model::{
    extract_instance_id, is_valid_item_id, ChecklistInstance, ChecklistTemplate, ItemId, RawItemId,
};
use checklist_progress::{
    item_label, resolve_photo_url, FileAdapter, MemoryAdapter, PersistenceAdapter, PhotoValidator,
    ProgressConfig, ProgressStore, StepNavigator,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn input_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("template")
            .long("template")
            .short('t')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Template JSON file"),
    )
    .arg(
        Arg::new("instance")
            .long("instance")
            .short('i')
            .value_parser(value_parser!(PathBuf))
            .help("Instance JSON file"),
    )
    .arg(
        Arg::new("instance-id")
            .long("instance-id")
            .value_parser(value_parser!(u64))
            .help("Instance id; defaults to the id in the instance file"),
    )
}

fn cli() -> Command {
    Command::new("checklist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Photo checklist progress inspector")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Completion cache directory (overrides storage_dir)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(input_args(
            Command::new("summary").about("Show completion of every item"),
        ))
        .subcommand(input_args(
            Command::new("step")
                .about("Show the items of one wizard step")
                .arg(
                    Arg::new("step")
                        .long("step")
                        .short('s')
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("1-based step"),
                )
                .arg(
                    Arg::new("review")
                        .long("review")
                        .action(ArgAction::SetTrue)
                        .help("Show every item"),
                ),
        ))
        .subcommand(input_args(
            Command::new("payload").about("Print the instance update payload as JSON"),
        ))
        .subcommand(input_args(
            Command::new("verify")
                .about("Mark an item complete without photos and cache the result")
                .arg(
                    Arg::new("item")
                        .long("item")
                        .required(true)
                        .help("Compound item id, e.g. 15_950"),
                )
                .arg(Arg::new("note").long("note").help("Note to record")),
        ))
        .subcommand(input_args(
            Command::new("photos")
                .about("Check an item's photo count against its limits")
                .arg(
                    Arg::new("item")
                        .long("item")
                        .required(true)
                        .help("Compound item id, e.g. 15_950"),
                ),
        ))
        .subcommand(
            Command::new("decode-id")
                .about("Decode and validate an item id")
                .arg(Arg::new("id").required(true).help("Item id")),
        )
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<ProgressConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ProgressConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProgressConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
        config = config.with_storage_dir(dir.clone());
    }
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn open_store(
    args: &ArgMatches,
    config: &ProgressConfig,
) -> Result<(ProgressStore, ChecklistTemplate)> {
    let template_path = args
        .get_one::<PathBuf>("template")
        .context("--template is required")?;
    let template: ChecklistTemplate = read_json(template_path)?;
    let instance: Option<ChecklistInstance> = args
        .get_one::<PathBuf>("instance")
        .map(|path| read_json::<ChecklistInstance>(path))
        .transpose()?;

    let instance_id = args
        .get_one::<u64>("instance-id")
        .copied()
        .or(instance.as_ref().map(|i| i.id))
        .context("an instance id is required (--instance-id or --instance)")?;

    let adapter: Arc<dyn PersistenceAdapter> = match &config.storage_dir {
        Some(dir) => Arc::new(FileAdapter::new(dir.clone())),
        None => Arc::new(MemoryAdapter::new()),
    };
    let mut store = ProgressStore::new(adapter);
    store.load_instance(&template, instance.as_ref(), instance_id)?;
    Ok((store, template))
}

fn parse_item(args: &ArgMatches) -> Result<ItemId> {
    let text = args.get_one::<String>("item").context("--item is required")?;
    text.parse()
        .with_context(|| format!("invalid item id {text:?}"))
}

fn render_summary(store: &ProgressStore, template: &ChecklistTemplate) -> String {
    let mut out = String::new();
    let required = store.required_completion_status();
    let _ = writeln!(out, "{} (template {})", template.name, template.id);
    let _ = writeln!(
        out,
        "Progress: {}% ({}/{} items), required {}/{}",
        store.completion_percentage(),
        store.completed_items_count(),
        store.total_items_count(),
        required.completed,
        required.total
    );
    for (pos, progress) in store.item_progress().iter().enumerate() {
        let indent = if progress.item.is_sub_item() { "  " } else { "" };
        let _ = writeln!(
            out,
            "{indent}[{}] {} {} ({} photos){}",
            if progress.completed { "x" } else { " " },
            item_label(store.item_progress(), pos),
            progress.item.template.title,
            progress.photos.len(),
            if progress.notes.is_empty() {
                String::new()
            } else {
                format!(" - {}", progress.notes)
            }
        );
    }
    out
}

fn render_step(store: &ProgressStore, nav: &StepNavigator, config: &ProgressConfig) -> String {
    let items = store.item_progress();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Step {} of {}{}",
        nav.current_step(),
        items.len(),
        if nav.is_review_mode() { " (review)" } else { "" }
    );
    for progress in nav.items_to_show(items) {
        let pos = items
            .iter()
            .position(|p| p.id() == progress.id())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}: {} [{}]",
            item_label(items, pos),
            progress.item.template.title,
            if progress.completed { "complete" } else { "open" }
        );
        for photo in &progress.photos {
            let _ = writeln!(out, "    {}", resolve_photo_url(&config.photo_base_url, photo));
        }
    }
    out
}

fn decode_id(text: &str) -> String {
    let raw = text
        .parse::<i64>()
        .map_or_else(|_| RawItemId::from(text), RawItemId::from);
    if !is_valid_item_id(raw.clone()) {
        return format!("{text}: invalid");
    }
    match ItemId::try_from(&raw) {
        Ok(id) => match extract_instance_id(text) {
            Some(instance) => format!("{text}: instance {instance}, item {}", id.base_id()),
            None => format!("{text}: item {}", id.base_id()),
        },
        Err(e) => format!("{text}: invalid ({e})"),
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("summary", args)) => {
            let (store, template) = open_store(args, &config)?;
            print!("{}", render_summary(&store, &template));
        }
        Some(("step", args)) => {
            let (store, _) = open_store(args, &config)?;
            let mut nav = StepNavigator::new();
            if args.get_flag("review") {
                nav.enter_review();
            } else {
                let step = args.get_one::<usize>("step").copied().unwrap_or(1);
                nav.go_to(step, store.item_progress())?;
            }
            print!("{}", render_step(&store, &nav, &config));
        }
        Some(("payload", args)) => {
            let (store, _) = open_store(args, &config)?;
            println!("{}", serde_json::to_string_pretty(&store.update_payload())?);
        }
        Some(("verify", args)) => {
            let (mut store, _) = open_store(args, &config)?;
            let id = parse_item(args)?;
            let note = args
                .get_one::<String>("note")
                .map_or(config.verified_note.as_str(), String::as_str);
            if !store.mark_as_verified(&id, note)? {
                tracing::warn!("{id} stays incomplete until its sub-items are complete");
            }
            if config.storage_dir.is_some() {
                store.save_to_storage()?;
            } else {
                tracing::warn!("No cache directory configured; result not kept");
            }
            println!("{id} verified ({}% complete)", store.completion_percentage());
        }
        Some(("photos", args)) => {
            let (store, _) = open_store(args, &config)?;
            let id = parse_item(args)?;
            let Some(progress) = store.find_item_progress(&id) else {
                bail!("item {id} not found");
            };
            let validator = PhotoValidator::new();
            let item = &progress.item.template;
            let count = progress.photos.len();
            println!("{id}: {}", validator.photo_count_message(count, item));
            println!("status: {}", validator.photo_status(count, item));
            let completion = validator.can_complete_item(count, 0, item);
            match completion.error {
                Some(error) => println!("{error}"),
                None => println!("can be marked complete"),
            }
        }
        Some(("decode-id", args)) => {
            let text = args.get_one::<String>("id").context("id is required")?;
            println!("{}", decode_id(text));
        }
        _ => bail!("unknown command"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));
    run(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{
        "id": 1,
        "name": "Final inspection",
        "items": [
            {"id": 10, "order_index": 1, "title": "Housing", "level": 0},
            {"id": 11, "order_index": 2, "title": "Left seam", "level": 1, "parent_id": 1},
            {"id": 12, "order_index": 3, "title": "Label", "level": 0, "min_photos": 2, "is_required": "1"}
        ]
    }"#;

    const INSTANCE: &str = r#"{
        "id": 15,
        "template_id": 1,
        "items": [
            {"template_item_id": 12, "is_completed": 0, "photos": [{"id": 3, "file_url": "uploads/label.jpg"}]}
        ]
    }"#;

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let template = dir.join("template.json");
        let instance = dir.join("instance.json");
        std::fs::write(&template, TEMPLATE).unwrap();
        std::fs::write(&instance, INSTANCE).unwrap();
        (template, instance)
    }

    fn matches(args: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn summary_lists_items() {
        let dir = tempfile::tempdir().unwrap();
        let (template, instance) = write_inputs(dir.path());
        let m = matches(&[
            "checklist",
            "summary",
            "--template",
            template.to_str().unwrap(),
            "--instance",
            instance.to_str().unwrap(),
        ]);
        let (_, args) = m.subcommand().unwrap();
        let config = load_config(&m).unwrap();
        let (store, template) = open_store(args, &config).unwrap();

        let text = render_summary(&store, &template);
        assert!(text.contains("Progress: 0% (0/2 items), required 0/1"));
        assert!(text.contains("Sub-item 1.1 Left seam"));
        assert!(text.contains("Item 2 Label (1 photos)"));
    }

    #[test]
    fn step_resolves_photo_urls() {
        let dir = tempfile::tempdir().unwrap();
        let (template, instance) = write_inputs(dir.path());
        let m = matches(&[
            "checklist",
            "step",
            "-t",
            template.to_str().unwrap(),
            "-i",
            instance.to_str().unwrap(),
            "--step",
            "3",
        ]);
        let (_, args) = m.subcommand().unwrap();
        let config = load_config(&m).unwrap();
        let (store, _) = open_store(args, &config).unwrap();

        let mut nav = StepNavigator::new();
        nav.go_to(3, store.item_progress()).unwrap();
        let text = render_step(&store, &nav, &config);
        assert!(text.contains("Item 2: Label [open]"));
        assert!(text.contains("https://dashboard.eye-fi.com/uploads/label.jpg"));
    }

    #[test]
    fn verify_persists_to_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (template, _) = write_inputs(dir.path());
        let cache = dir.path().join("cache");
        let m = matches(&[
            "checklist",
            "verify",
            "--template",
            template.to_str().unwrap(),
            "--instance-id",
            "15",
            "--item",
            "15_12",
            "--cache-dir",
            cache.to_str().unwrap(),
        ]);
        run(&m).unwrap();
        assert!(cache.join("checklist_15_completion.json").exists());

        let (_, args) = m.subcommand().unwrap();
        let (store, _) = open_store(args, &load_config(&m).unwrap()).unwrap();
        let id: ItemId = "15_12".parse().unwrap();
        let progress = store.find_item_progress(&id).unwrap();
        assert!(progress.completed);
        assert_eq!(progress.notes, "Verified without photos");
    }

    #[test]
    fn missing_instance_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (template, _) = write_inputs(dir.path());
        let m = matches(&["checklist", "payload", "--template", template.to_str().unwrap()]);
        let (_, args) = m.subcommand().unwrap();
        assert!(open_store(args, &ProgressConfig::default()).is_err());
    }

    #[test]
    fn id_decoding() {
        assert_eq!(decode_id("15_950"), "15_950: instance 15, item 950");
        assert_eq!(decode_id("42"), "42: item 42");
        assert_eq!(decode_id("15_-3"), "15_-3: invalid");
        assert_eq!(decode_id("abc"), "abc: invalid");
    }
}
