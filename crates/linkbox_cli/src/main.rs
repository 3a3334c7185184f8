//! Command-line adapter over the link collection store.
//!
//! # Responsibility
//! - Map subcommands onto store operations.
//! - Act as copy sink (stdout) and notice sink (stderr).
//! - Flush pending debounced edits before exit.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use linkbox_core::db::open_db;
use linkbox_core::{
    default_log_level, init_logging, Clock, GroupField, GroupId, ImportOutcome, KvStore,
    LinkStore, NoticeLevel, SqliteKvStore, StoreConfig,
};
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const DB_FILE_NAME: &str = "linkbox.sqlite3";
const IMPORT_CONFIRM_PROMPT: &str =
    "Importing data will replace your current link collections. Re-run with --yes to proceed.";
const CLEAR_CONFIRM_PROMPT: &str =
    "Clearing removes all link collections and cannot be undone. Re-run with --yes to proceed.";

#[derive(Debug, Parser)]
#[command(name = "linkbox", version, about = "Organize links into labeled, reorderable boxes")]
struct Cli {
    /// SQLite database holding the saved boxes.
    #[arg(long, env = "LINKBOX_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "LINKBOX_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "LINKBOX_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new box.
    Add {
        #[arg(long, default_value = "")]
        label: String,
        /// Links, one per line.
        #[arg(long, default_value = "")]
        links: String,
    },
    /// List boxes in display order.
    List,
    /// Print one box.
    Show { id: String },
    /// Replace the label or links of a box.
    Edit(EditArgs),
    /// Delete a box.
    Delete { id: String },
    /// Set the box order; boxes not listed are dropped.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search labels and link lines.
    Search { query: String },
    /// Print the links of a box for copying.
    Copy {
        id: String,
        /// Apply the short redirect rewrite (`/r.php`).
        #[arg(long)]
        transform: bool,
    },
    /// Export all boxes to a timestamped JSON file.
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace all boxes with the contents of a JSON export.
    Import {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Remove all boxes and the saved snapshot.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List => "list",
            Self::Show { .. } => "show",
            Self::Edit(_) => "edit",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
            Self::Search { .. } => "search",
            Self::Copy { .. } => "copy",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Clear { .. } => "clear",
        }
    }
}

#[derive(Debug, Args)]
struct EditArgs {
    id: String,
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    links: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(cli: &Cli) {
    let Some(log_dir) = cli.log_dir.as_ref() else {
        return;
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let conn = open_db(&db_path)?;
    let kv = SqliteKvStore::new(&conn);
    let mut store = LinkStore::load(&kv, StoreConfig::default());

    let stdout = io::stdout();
    let stderr = io::stderr();
    run_command(&mut store, cli.command, &mut stdout.lock(), &mut stderr.lock())
}

/// Runs one command against a loaded store and settles its persistence.
///
/// `out` receives copyable results, `err` receives notices and prompts.
fn run_command<K: KvStore, C: Clock>(
    store: &mut LinkStore<K, C>,
    command: Command,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    // Load success is noise for one-shot commands; load errors still print.
    print_notices(store, false, err)?;

    let command_name = command.name();
    info!("event=cli_command module=cli status=start command={command_name}");
    let result = execute(store, command, out, err);
    store.flush_pending_save();
    info!(
        "event=cli_command module=cli status={} command={command_name}",
        if result.is_ok() { "ok" } else { "error" }
    );
    print_notices(store, true, err)?;

    result?;
    if store.last_save_failed() {
        return Err("changes were not saved".into());
    }
    Ok(())
}

fn execute<K: KvStore, C: Clock>(
    store: &mut LinkStore<K, C>,
    command: Command,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Add { label, links } => {
            let group = store.create(label, decode_escapes(&links));
            writeln!(out, "{}", group.id)?;
        }
        Command::List => {
            for group in store.groups() {
                let count = group.lines().filter(|line| !line.is_empty()).count();
                writeln!(out, "{}\t{}\t{count} links", group.id, group.label)?;
            }
        }
        Command::Show { id } => {
            let id = GroupId::new(id);
            let group = store
                .get(&id)
                .ok_or_else(|| format!("link group not found: {id}"))?;
            writeln!(out, "# {}", group.label)?;
            writeln!(out, "{}", group.links)?;
        }
        Command::Edit(args) => {
            if args.label.is_none() && args.links.is_none() {
                return Err("nothing to edit; pass --label and/or --links".into());
            }
            let id = GroupId::new(args.id);
            if let Some(label) = args.label {
                store.update(&id, GroupField::Label, label)?;
            }
            if let Some(links) = args.links {
                store.update(&id, GroupField::Links, decode_escapes(&links))?;
            }
        }
        Command::Delete { id } => {
            if !store.delete(&GroupId::new(id.as_str())) {
                writeln!(err, "no box with id {id}")?;
            }
        }
        Command::Reorder { ids } => {
            let order: Vec<GroupId> = ids.into_iter().map(GroupId::from).collect();
            store.reorder(&order);
        }
        Command::Search { query } => {
            let outcome = store.search(&query);
            if !outcome.is_active() {
                writeln!(err, "search inactive: empty query")?;
            }
            for hit in outcome.hits() {
                writeln!(out, "{}\t{}", hit.group_id, hit.display_label())?;
                for line in &hit.matched_lines {
                    writeln!(out, "  {line}")?;
                }
            }
        }
        Command::Copy { id, transform } => {
            let id = GroupId::new(id);
            let text = if transform {
                store.transformed_links(&id)
            } else {
                store.links(&id).map(str::to_string)
            }
            .ok_or_else(|| format!("link group not found: {id}"))?;
            writeln!(out, "{text}")?;
            writeln!(
                err,
                "{}",
                if transform {
                    "Manipulated links copied to clipboard!"
                } else {
                    "Links copied to clipboard!"
                }
            )?;
        }
        Command::Export { dir } => {
            let path = store.export_to_dir(dir, Utc::now())?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Import { file, yes } => {
            if !yes {
                writeln!(err, "{IMPORT_CONFIRM_PROMPT}")?;
            }
            if let ImportOutcome::Imported { groups } = store.import_from_file(file, yes)? {
                writeln!(out, "imported {groups} boxes")?;
            }
        }
        Command::Clear { yes } => {
            if yes {
                store.clear_all();
            } else {
                writeln!(err, "{CLEAR_CONFIRM_PROMPT}")?;
            }
        }
    }
    Ok(())
}

// Shells make real newlines awkward in arguments; accept `\n` instead.
fn decode_escapes(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn print_notices<K: KvStore, C: Clock>(
    store: &mut LinkStore<K, C>,
    include_success: bool,
    err: &mut dyn Write,
) -> io::Result<()> {
    for notice in store.take_notices() {
        match notice.level {
            NoticeLevel::Error => writeln!(err, "error: {}", notice.message)?,
            NoticeLevel::Success if include_success => writeln!(err, "{}", notice.message)?,
            NoticeLevel::Success => {}
        }
    }
    Ok(())
}

fn default_db_path() -> Result<PathBuf, Box<dyn Error>> {
    let dirs = ProjectDirs::from("", "", "linkbox")
        .ok_or("cannot resolve a data directory; pass --db")?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{run_command, Cli, Command};
    use clap::Parser;
    use linkbox_core::db::open_db_in_memory;
    use linkbox_core::{
        decode_snapshot, KvError, KvResult, KvStore, LinkStore, SqliteKvStore, StoreConfig,
    };
    use std::error::Error;

    const KEY: &str = "linkManagerData";

    struct Output {
        result: Result<(), Box<dyn Error>>,
        out: String,
        err: String,
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("linkbox").chain(args.iter().copied()))
            .expect("arguments should parse")
            .command
    }

    fn run<K: KvStore>(store: &mut LinkStore<K>, args: &[&str]) -> Output {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = run_command(store, parse(args), &mut out, &mut err);
        Output {
            result,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn add_decodes_escaped_newlines_and_prints_id() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());

        let output = run(&mut store, &["add", "--label", "L", "--links", r"a\nb"]);

        assert!(output.result.is_ok());
        assert_eq!(output.out, "box-1\n");
        assert_eq!(store.groups()[0].links, "a\nb");
    }

    #[test]
    fn edit_is_persisted_before_command_returns() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("old", "");

        let output = run(
            &mut store,
            &["edit", "box-1", "--label", "New", "--links", r"x\n\ny"],
        );

        assert!(output.result.is_ok());
        assert!(!store.has_pending_save());
        let saved = decode_snapshot(&kv.read(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved[0].label, "New");
        assert_eq!(saved[0].links, "x\n\ny");
    }

    #[test]
    fn edit_without_fields_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("same", "");

        let output = run(&mut store, &["edit", "box-1"]);

        let message = output.result.unwrap_err().to_string();
        assert!(message.contains("nothing to edit"));
        assert_eq!(store.groups()[0].label, "same");
    }

    #[test]
    fn clear_without_yes_prompts_and_keeps_everything() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("keep", "https://keep.example");

        let output = run(&mut store, &["clear"]);

        assert!(output.result.is_ok());
        assert!(output.err.contains("--yes"));
        assert_eq!(store.len(), 1);
        let saved = decode_snapshot(&kv.read(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved[0].label, "keep");
    }

    #[test]
    fn clear_with_yes_removes_the_saved_key() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("gone", "");

        let output = run(&mut store, &["clear", "--yes"]);

        assert!(output.result.is_ok());
        assert!(store.is_empty());
        assert_eq!(kv.read(KEY).unwrap(), None);
        assert!(output.err.contains("All data cleared successfully!"));
    }

    #[test]
    fn import_without_yes_prompts_and_changes_nothing() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("keep", "");

        let output = run(&mut store, &["import", "/no/such/export.json"]);

        assert!(output.result.is_ok());
        assert!(output.err.contains("--yes"));
        assert!(output.out.is_empty());
        assert_eq!(store.groups()[0].label, "keep");
    }

    #[test]
    fn load_success_notice_is_hidden_but_load_errors_print() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        kv.write(KEY, r#"[{"id":"box-1","label":"News","links":"a"}]"#)
            .unwrap();
        let mut store = LinkStore::load(&kv, StoreConfig::default());

        let output = run(&mut store, &["list"]);
        assert!(output.out.starts_with("box-1\tNews"));
        assert!(!output.err.contains("Data loaded"));

        kv.write(KEY, "{broken").unwrap();
        let mut broken = LinkStore::load(&kv, StoreConfig::default());
        let output = run(&mut broken, &["list"]);
        assert!(output.out.is_empty());
        assert!(output
            .err
            .contains("error: Error loading saved data. Starting with empty state."));
    }

    #[test]
    fn copy_with_transform_prints_rewritten_links() {
        let conn = open_db_in_memory().unwrap();
        let kv = SqliteKvStore::new(&conn);
        let mut store = LinkStore::load(&kv, StoreConfig::default());
        store.create("", "http://x.com/redirect.php?a=1\nhttp://x.com/page");

        let output = run(&mut store, &["copy", "box-1", "--transform"]);

        assert_eq!(output.out, "http://x.com/r.php?a=1\nhttp://x.com/page/r.php\n");
        assert_eq!(store.groups()[0].links, "http://x.com/redirect.php?a=1\nhttp://x.com/page");
    }

    struct FullKv;

    impl KvStore for FullKv {
        fn read(&self, _key: &str) -> KvResult<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> KvResult<()> {
            Err(KvError::Rejected("database or disk is full".to_string()))
        }

        fn remove(&self, _key: &str) -> KvResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn failed_save_makes_the_command_fail() {
        let mut store = LinkStore::load(FullKv, StoreConfig::default());

        let output = run(&mut store, &["add", "--label", "unsaved"]);

        assert!(output.err.contains("error: Error saving data. Please try again."));
        let message = output.result.unwrap_err().to_string();
        assert!(message.contains("changes were not saved"));
        assert_eq!(store.len(), 1);
    }
}
