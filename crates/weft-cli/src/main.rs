use anyhow::{Context, Result, bail};
use std::{
    env,
    path::{Path, PathBuf},
    process,
};
use weft_config::Config;
use weft_extensions::{DiffClasses, EditorStatus, FocusClasses, PlaceholderDecorations};
use weft_gapcursor::{GapCursor, GapCursorPlugin, ModelView, draw_gap_cursor};
use weft_model::{DecorationSet, Dir, EditorState, Node, Schema, Selection};

const USAGE: &str = "<doc.json> [--at POS] [--config PATH] [left|right|up|down|click:POS|compose ...]\n   or: --write-default-config [--config PATH]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Key(&'static str),
    Click(usize),
    Compose,
}

impl Event {
    fn parse(arg: &str) -> Result<Self> {
        let event = match arg {
            "left" => Event::Key("ArrowLeft"),
            "right" => Event::Key("ArrowRight"),
            "up" => Event::Key("ArrowUp"),
            "down" => Event::Key("ArrowDown"),
            "compose" => Event::Compose,
            _ => match arg.strip_prefix("click:") {
                Some(pos) => Event::Click(
                    pos.parse()
                        .with_context(|| format!("Invalid click position in '{arg}'"))?,
                ),
                None => bail!("Unknown event '{arg}'"),
            },
        };
        Ok(event)
    }
}

#[derive(Debug)]
struct Args {
    doc_path: Option<PathBuf>,
    at: Option<usize>,
    config_path: Option<PathBuf>,
    events: Vec<Event>,
    write_default_config: bool,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let mut iter = args.iter();
        let mut doc_path = None;
        let mut at = None;
        let mut config_path = None;
        let mut events = Vec::new();
        let mut write_default_config = false;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--at" => {
                    let pos = iter.next().context("--at needs a position")?;
                    at = Some(pos.parse().with_context(|| format!("Invalid position '{pos}'"))?);
                }
                "--config" => {
                    let path = PathBuf::from(iter.next().context("--config needs a path")?);
                    config_path = Some(Config::expand_path(&path).unwrap_or(path));
                }
                "--write-default-config" => write_default_config = true,
                other if doc_path.is_none() => doc_path = Some(PathBuf::from(other)),
                other => events.push(Event::parse(other)?),
            }
        }
        if doc_path.is_none() && !write_default_config {
            bail!("Missing document path");
        }

        Ok(Self {
            doc_path,
            at,
            config_path,
            events,
            write_default_config,
        })
    }
}

struct Session {
    state: EditorState,
    plugin: GapCursorPlugin,
    view: ModelView,
}

impl Session {
    fn new(doc: Node, at: Option<usize>, plugin: GapCursorPlugin) -> Result<Self> {
        let selection = match at {
            Some(pos) => {
                let rp = doc.resolve(pos)?;
                if GapCursor::valid(&rp) {
                    GapCursor::new(rp).into_selection()
                } else {
                    Selection::near(&rp, Dir::Forward)
                }
            }
            None => Selection::at_start(&doc),
        };
        Ok(Self {
            state: EditorState::new(doc, selection),
            plugin,
            view: ModelView::default(),
        })
    }

    /// Apply one event. Returns whether a handler produced a transaction.
    fn dispatch(&mut self, event: Event) -> Result<bool> {
        let tr = match event {
            Event::Key(key) => self.plugin.handle_key_down(&self.state, &self.view, key),
            Event::Click(pos) => self.plugin.handle_click(&self.state, &self.view, pos)?,
            Event::Compose => {
                self.plugin
                    .handle_before_input(&self.state, "insertCompositionText")?
                    .transaction
            }
        };
        let Some(tr) = tr else {
            log::info!("{event:?} declined");
            return Ok(false);
        };
        self.state = self.state.apply(tr)?;
        Ok(true)
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file '{}' not found", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    Ok(loaded)
}

fn load_doc(path: &Path) -> Result<Node> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document '{}'", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Document '{}' is not JSON", path.display()))?;
    Ok(Schema::basic().node_from_json(&json)?)
}

/// Write the default configuration to `path`, or to the user config file.
fn write_default_config(path: Option<&Path>) -> Result<PathBuf> {
    let config = Config::default();
    match path {
        Some(path) => {
            config.save_to_path(path)?;
            Ok(path.to_path_buf())
        }
        None => {
            config.save()?;
            Ok(Config::config_path())
        }
    }
}

/// Non-empty decoration sets for the final state, in print order.
fn decoration_sections(config: &Config, state: &EditorState) -> Vec<(&'static str, DecorationSet)> {
    let status = EditorStatus::default();
    let sections = [
        (
            "focus",
            Some(FocusClasses::new(config.focus_options()).decorations(state, status)),
        ),
        (
            "diff",
            Some(DiffClasses::new(config.diff_options()).decorations(state, status)),
        ),
        (
            "placeholder",
            PlaceholderDecorations::new(config.placeholder_options()).decorations(state, status),
        ),
        ("caret", draw_gap_cursor(state)),
    ];
    sections
        .into_iter()
        .filter_map(|(name, set)| set.filter(|set| !set.is_empty()).map(|set| (name, set)))
        .collect()
}

fn run(args: Args) -> Result<()> {
    let Some(doc_path) = args.doc_path else {
        let path = write_default_config(args.config_path.as_deref())?;
        println!("wrote default config to {}", path.display());
        return Ok(());
    };
    if args.write_default_config {
        bail!("--write-default-config does not take a document");
    }

    let config = load_config(args.config_path.as_deref())?;
    let doc = load_doc(&doc_path)?;
    let mut session = Session::new(doc, args.at, config.gap_cursor_plugin())?;

    println!("start: {}", session.state.selection().to_json());
    for event in args.events {
        if session.dispatch(event)? {
            println!("{event:?}: {}", session.state.selection().to_json());
        } else {
            println!("{event:?}: declined");
        }
    }
    println!("doc: {}", session.state.doc());

    for (name, set) in decoration_sections(&config, &session.state) {
        println!("{name}:\n{set}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("weft-cli");
    let parsed = match Args::parse(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    run(parsed)
}
