//! trellis: heading-tree restructuring for markdown outlines.
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use trellis::breadcrumb::{resolve_link, slugify, DisplayCrumb};
use trellis::config::Config;
use trellis::document::{Document, StableId};
use trellis::edit_plan::{insert_heading_with, HeadingSpec, InsertionPoint};
use trellis::formats::{markdown::MarkdownFormat, Format};
use trellis::navigator::{next_cursor_position, CollapsedSet, Direction, Navigation, Selection};
use trellis::section::{table_of_contents, Section};
use trellis::{classify, input, position};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Heading-tree restructuring for outline documents", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./trellis.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct Cursor {
    /// Put the cursor at the end of the text block on this line (1-based)
    #[arg(long)]
    line: Option<usize>,

    /// Put the cursor at this raw document position
    #[arg(long)]
    at: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the heading tree
    Outline {
        /// Markdown file
        path: PathBuf,
    },
    /// Show the breadcrumb for a position
    Breadcrumb {
        /// Markdown file
        path: PathBuf,
        #[command(flatten)]
        cursor: Cursor,
        /// Show every entry instead of the truncated view
        #[arg(long)]
        full: bool,
    },
    /// Insert a heading at a position
    Insert {
        /// Markdown file
        path: PathBuf,
        #[command(flatten)]
        cursor: Cursor,
        /// Heading rank, 1 to 6
        #[arg(long, short = 'l')]
        level: u8,
        /// Title of the new heading
        #[arg(long, default_value = "")]
        title: String,
        /// Write the result back to the file instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Where the cursor lands when leaving a heading title
    Navigate {
        /// Markdown file
        path: PathBuf,
        #[command(flatten)]
        cursor: Cursor,
        /// Arrow-key direction
        #[arg(long, short = 'd', value_enum)]
        direction: Direction,
        /// Stable id or slug of a collapsed heading
        #[arg(long = "collapse", value_name = "HEADING")]
        collapsed: Vec<String>,
    },
    /// Find the heading a deep link points at
    Resolve {
        /// Markdown file
        path: PathBuf,
        /// Deep link produced by `breadcrumb`
        url: String,
    },
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref()).map_err(io::Error::other)?;
    let format = MarkdownFormat;

    match args.command {
        Command::Outline { path } => outline(&path, &format, args.json),
        Command::Breadcrumb { path, cursor, full } => {
            breadcrumb(&path, &format, &cfg, &cursor, full, args.json)
        }
        Command::Insert {
            path,
            cursor,
            level,
            title,
            write,
        } => {
            let spec = HeadingSpec::new(level).with_title(&title);
            insert(&path, &format, &cfg, &cursor, &spec, write, args.json)
        }
        Command::Navigate {
            path,
            cursor,
            direction,
            collapsed,
        } => navigate(&path, &format, &cursor, direction, &collapsed, args.json),
        Command::Resolve { path, url } => resolve(&path, &format, &url, args.json),
    }
}

fn load(path: &Path, format: &impl Format) -> io::Result<Document> {
    input::read_document(path, format).map_err(io::Error::other)
}

fn cursor_position(doc: &Document, cursor: &Cursor) -> io::Result<usize> {
    match (cursor.at, cursor.line) {
        (Some(at), _) => Ok(at),
        (None, Some(line)) => doc.position_at_line(line).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no text block starts on or before line {line}"),
            )
        }),
        (None, None) => Ok(0),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

fn outline(path: &Path, format: &impl Format, json: bool) -> io::Result<()> {
    let doc = load(path, format)?;
    let sections = table_of_contents(&doc);
    if json {
        return print_json(&sections);
    }
    for (i, section) in sections.iter().enumerate() {
        println!(
            "{}{} {}  [{}]",
            get_tree_prefix(&sections, i),
            "#".repeat(usize::from(section.level)),
            section.title,
            section.stable_id
        );
    }
    Ok(())
}

fn is_last_child(sections: &[Section], index: usize) -> bool {
    match sections[index].parent_index {
        Some(parent) => sections[parent].children_indices.last() == Some(&index),
        None => !sections[index + 1..]
            .iter()
            .any(|s| s.parent_index.is_none()),
    }
}

/// Generate box-drawing prefix for tree structure
fn get_tree_prefix(sections: &[Section], index: usize) -> String {
    let mut continuing = Vec::new();
    let mut ancestor = sections[index].parent_index;
    while let Some(parent) = ancestor {
        continuing.push(!is_last_child(sections, parent));
        ancestor = sections[parent].parent_index;
    }

    let mut prefix = String::new();
    for open in continuing.into_iter().rev() {
        prefix.push_str(if open { "│   " } else { "    " });
    }
    prefix.push_str(if is_last_child(sections, index) {
        "└── "
    } else {
        "├── "
    });
    prefix
}

fn breadcrumb(
    path: &Path,
    format: &impl Format,
    cfg: &Config,
    cursor: &Cursor,
    full: bool,
    json: bool,
) -> io::Result<()> {
    let doc = load(path, format)?;
    let pos = cursor_position(&doc, cursor)?;
    let resolved = position::resolve(&doc, pos).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("position {pos} is out of range"))
    })?;
    let composer = cfg.composer().map_err(io::Error::other)?;
    let path = composer.compose(&classify(&doc, &resolved.chain));

    if json {
        return if full {
            print_json(&path)
        } else {
            print_json(&composer.display(&path))
        };
    }

    if path.is_empty() {
        println!("(document root)");
        return Ok(());
    }
    let shown: Vec<String> = if full {
        path.crumbs.iter().map(|c| c.title.clone()).collect()
    } else {
        composer
            .display(&path)
            .into_iter()
            .map(|crumb| match crumb {
                DisplayCrumb::Link(c) => c.title.clone(),
                DisplayCrumb::Ellipsis => cfg.ellipsis.clone(),
            })
            .collect()
    };
    println!("{}", shown.join(" / "));
    if let Some(current) = path.current() {
        println!("{}", current.url);
    }
    Ok(())
}

fn insert(
    path: &Path,
    format: &impl Format,
    cfg: &Config,
    cursor: &Cursor,
    spec: &HeadingSpec,
    write: bool,
    json: bool,
) -> io::Result<()> {
    let doc = load(path, format)?;
    let pos = cursor_position(&doc, cursor)?;
    let edit = insert_heading_with(&doc, InsertionPoint::at(&doc, pos), spec)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let rendered = format.render(&edit.document, cfg.write_ids);

    if write {
        fs::write(path, &rendered)?;
    }
    if json {
        return print_json(&serde_json::json!({
            "plan": edit.plan,
            "cursor": edit.cursor,
            "stable_id": edit.stable_id(),
            "revision": edit.document.revision(),
            "markdown": if write { None } else { Some(&rendered) },
        }));
    }
    if write {
        println!(
            "{:?}: inserted H{} in {}",
            edit.plan.strategy,
            spec.level,
            path.display()
        );
    } else {
        print!("{rendered}");
    }
    Ok(())
}

fn navigate(
    path: &Path,
    format: &impl Format,
    cursor: &Cursor,
    direction: Direction,
    collapsed: &[String],
    json: bool,
) -> io::Result<()> {
    let doc = load(path, format)?;
    let pos = cursor_position(&doc, cursor)?;
    let oracle: CollapsedSet = collapsed
        .iter()
        .filter_map(|name| heading_by_name(&doc, name))
        .collect();
    let navigation = next_cursor_position(&doc, Selection::cursor(pos), direction, &oracle);

    if json {
        return print_json(&navigation);
    }
    match navigation {
        Navigation::GapCursor(target) => println!("gap cursor at {target}"),
        Navigation::NoOp => println!("default movement"),
    }
    Ok(())
}

fn heading_by_name(doc: &Document, name: &str) -> Option<StableId> {
    let id = StableId::from(name);
    if doc.find_by_stable_id(&id).is_some() {
        return Some(id);
    }
    doc.headings()
        .into_iter()
        .find(|&h| doc.title(h).is_some_and(|t| slugify(t) == name))
        .and_then(|h| doc.stable_id(h).cloned())
}

fn resolve(path: &Path, format: &impl Format, url: &str, json: bool) -> io::Result<()> {
    let doc = load(path, format)?;
    let url = url::Url::parse(url).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let heading = resolve_link(&doc, &url).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no heading with that id")
    })?;
    let section = table_of_contents(&doc)
        .into_iter()
        .find(|s| s.node == heading)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "heading is detached"))?;

    if json {
        return print_json(&section);
    }
    println!(
        "{} {}  (position {})",
        "#".repeat(usize::from(section.level)),
        section.title,
        section.start
    );
    Ok(())
}
