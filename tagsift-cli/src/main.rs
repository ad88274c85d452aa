//! tagsift - parse HTML and search the resulting tree
//!
//! Usage:
//!   tagsift <FILE|URL>                       Print the parsed tree
//!   tagsift <FILE|URL> --tag a --attr href   List every link
//!   tagsift --html '<p>x</p>' --format html  Parse a string directly

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use tagsift_common::net::load_source;
use tagsift_dom::{DomTree, NodeId, TagKind, TagTable, debug_tree, summary};
use tagsift_html::HTMLParser;
use tagsift_query::{Cursor, Predicate, SearchOptions};
use tracing_subscriber::EnvFilter;

/// How each result is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented debug tree
    Tree,
    /// Markup
    Html,
    /// Concatenated text content
    Text,
    /// One line per result
    Summary,
    /// A JSON array of result records
    Json,
}

/// Parse HTML from a file, URL or string and search the resulting tree
#[derive(Parser, Debug)]
#[command(name = "tagsift")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the whole tree
    tagsift ./index.html

    # Every link with its target
    tagsift https://example.com --tag a --attr href --format summary

    # Text of the first paragraph inside body
    tagsift ./index.html --path html.body --tag p --first --format text

    # Only top-level divs, as JSON
    tagsift ./index.html --tag div --no-nest --format json

    # Parse inline HTML with a custom void tag
    tagsift --html '<x-icon>label' --void x-icon
"#)]
struct Cli {
    /// Path to an HTML file, or an http(s):// or data: URL
    #[arg(value_name = "FILE|URL")]
    source: Option<String>,

    /// Parse HTML string directly instead of file/URL
    #[arg(long, value_name = "HTML", conflicts_with = "source")]
    html: Option<String>,

    /// Size of the chunks fed to the parser
    #[arg(long, value_name = "BYTES", default_value_t = 8192)]
    chunk_size: usize,

    /// Match elements with this tag
    #[arg(long, value_name = "NAME")]
    tag: Option<String>,

    /// Match nodes carrying this attribute, optionally with this exact value (repeatable)
    #[arg(long, value_name = "NAME[=VALUE]")]
    attr: Vec<String>,

    /// Match elements whose text content contains TEXT
    #[arg(long, value_name = "TEXT")]
    contains: Option<String>,

    /// Start from the element reached by this dotted tag path (e.g. html.body)
    #[arg(long, value_name = "PATH")]
    path: Option<String>,

    /// Print only the first match; fail if there is none
    #[arg(long)]
    first: bool,

    /// Do not search inside matched nodes
    #[arg(long)]
    no_nest: bool,

    /// Minimum depth below the start node
    #[arg(long, value_name = "N", default_value_t = 1)]
    min_depth: usize,

    /// Maximum depth below the start node
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Visit nodes level by level instead of depth first
    #[arg(long)]
    breadth_first: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Treat TAG as a void element (repeatable)
    #[arg(long, value_name = "TAG")]
    void: Vec<String>,

    /// Treat TAG as suppressed from text and markup output (repeatable)
    #[arg(long, value_name = "TAG")]
    suppress: Vec<String>,

    /// Let a new TAG close an open TAG at the top of the stack (repeatable)
    #[arg(long, value_name = "TAG")]
    implicit_close: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    const fn has_criteria(&self) -> bool {
        self.tag.is_some() || !self.attr.is_empty() || self.contains.is_some()
    }
}

/// One search result in JSON output.
#[derive(Debug, Serialize)]
struct Record {
    path: Vec<usize>,
    depth: usize,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, Option<String>>,
    text: String,
    html: String,
}

impl Record {
    fn new(tree: &DomTree, cursor: &Cursor, tags: &TagTable) -> Self {
        let node = cursor.node();
        let attributes = tree
            .as_element(node)
            .map(|data| {
                data.attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: cursor.path(),
            depth: cursor.depth(),
            kind: tree
                .kind(node)
                .map(|kind| kind.to_string().to_ascii_lowercase())
                .unwrap_or_default(),
            tag: tree.as_element(node).map(|data| data.tag_name.clone()),
            attributes,
            text: cursor.text(tree, tags),
            html: cursor.render(tree, tags),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let html = read_input(&cli)?;
    let tags = tag_table(&cli);
    let tree = parse_in_chunks(&html, cli.chunk_size, &tags);

    let start = match &cli.path {
        Some(path) => Cursor::root(NodeId::ROOT)
            .descend(&tree, path)
            .with_context(|| format!("no element at path '{path}'"))?,
        None => Cursor::root(NodeId::ROOT),
    };

    let results: Vec<Cursor> = if cli.has_criteria() {
        let mut found = start.find_all(&tree, build_predicate(&cli, &tags), search_options(&cli));
        if cli.first {
            vec![found.next().context("no node matched the query")?]
        } else {
            found.collect()
        }
    } else {
        vec![start]
    };
    tracing::debug!(results = results.len(), "search finished");

    print_results(&tree, &results, &tags, cli.format)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the document from CLI arguments
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        Ok(html.clone())
    } else if let Some(ref source) = cli.source {
        load_source(source).with_context(|| format!("failed to load '{source}'"))
    } else {
        anyhow::bail!("expected a FILE|URL argument or --html")
    }
}

fn tag_table(cli: &Cli) -> TagTable {
    let overrides = [
        (&cli.void, TagKind::Void),
        (&cli.suppress, TagKind::Suppressed),
    ];
    let table = overrides
        .into_iter()
        .flat_map(|(names, kind)| names.iter().map(move |name| (name, kind)))
        .fold(TagTable::html(), |table, (name, kind)| {
            table.with_kind(&name.to_ascii_lowercase(), kind)
        });
    cli.implicit_close.iter().fold(table, |table, name| {
        table.with_implicit_close(&name.to_ascii_lowercase())
    })
}

fn parse_in_chunks(html: &str, chunk_size: usize, tags: &TagTable) -> DomTree {
    let mut parser = HTMLParser::new(tags);
    for chunk in split_chunks(html, chunk_size) {
        parser.feed(chunk);
    }
    let (tree, issues) = parser.finish_with_issues();
    for issue in &issues {
        tracing::debug!(token = issue.token_index, "{}", issue.message);
    }
    tree
}

/// Split `text` into pieces of about `size` bytes, never inside a character.
fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

fn build_predicate(cli: &Cli, tags: &TagTable) -> Predicate {
    let mut criteria = Vec::new();
    if let Some(ref tag) = cli.tag {
        criteria.push(Predicate::by_tag(tag.to_ascii_lowercase()));
    }
    criteria.extend(cli.attr.iter().map(String::as_str).map(attribute_predicate));
    if let Some(ref needle) = cli.contains {
        let (needle, tags) = (needle.clone(), tags.clone());
        criteria.push(Predicate::custom(move |tree, cursor| {
            tree.is_container(cursor.node()) && cursor.contains_text(tree, &tags, &needle)
        }));
    }
    Predicate::all_of(criteria)
}

/// `NAME` matches presence, `NAME=VALUE` an exact value.
fn attribute_predicate(spec: &str) -> Predicate {
    match spec.split_once('=') {
        Some((name, value)) => Predicate::by_attribute_value(name.to_ascii_lowercase(), value),
        None => Predicate::by_attribute(spec.to_ascii_lowercase()),
    }
}

fn search_options(cli: &Cli) -> SearchOptions {
    SearchOptions::new()
        .nest(!cli.no_nest)
        .min_depth(cli.min_depth)
        .max_depth(cli.max_depth.unwrap_or(usize::MAX))
        .depth_first(!cli.breadth_first)
}

fn print_results(tree: &DomTree, results: &[Cursor], tags: &TagTable, format: Format) -> Result<()> {
    let render: fn(&DomTree, &Cursor, &TagTable) -> String = match format {
        Format::Json => {
            let records: Vec<Record> = results
                .iter()
                .map(|cursor| Record::new(tree, cursor, tags))
                .collect();
            let json = serde_json::to_string_pretty(&records).context("failed to encode results")?;
            println!("{json}");
            return Ok(());
        }
        Format::Tree => |tree, cursor, _| debug_tree(tree, cursor.node()).trim_end().to_string(),
        Format::Html => |tree, cursor, tags| cursor.render(tree, tags),
        Format::Text => |tree, cursor, tags| cursor.text(tree, tags),
        Format::Summary => |tree, cursor, _| summary(tree, cursor.node()),
    };
    for cursor in results {
        println!("{}", render(tree, cursor, tags));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tagsift_html::parse;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_chunks_respects_characters() {
        assert_eq!(split_chunks("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(split_chunks("aé", 2), vec!["aé"]);
        assert_eq!(split_chunks("", 8), Vec::<&str>::new());
        assert_eq!(split_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_query_from_flags() {
        let cli = Cli::parse_from([
            "tagsift",
            "--html",
            "x",
            "--tag",
            "A",
            "--attr",
            "rel=next",
            "--contains",
            "more",
        ]);
        let tags = tag_table(&cli);
        let tree = parse(
            r#"<a rel="next">more</a><a rel="prev">more</a><a rel="next">less</a>"#,
            &tags,
        );

        let results: Vec<Cursor> = Cursor::root(NodeId::ROOT)
            .find_all(&tree, build_predicate(&cli, &tags), search_options(&cli))
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position(), 0);
    }

    #[test]
    fn test_tag_table_overrides() {
        let cli = Cli::parse_from([
            "tagsift",
            "--html",
            "x",
            "--void",
            "X-Icon",
            "--suppress",
            "nav",
            "--implicit-close",
            "section",
        ]);
        let tags = tag_table(&cli);
        assert!(tags.is_void("x-icon"));
        assert!(tags.is_suppressed("nav"));
        assert!(tags.closes_implicitly("section"));
    }

    #[test]
    fn test_chunked_parse_matches_whole() {
        let tags = TagTable::html();
        let html = "<ul><li>one<li>two &amp; three</ul><!-- end -->";
        let whole = parse(html, &tags);
        for size in 1..html.len() {
            let chunked = parse_in_chunks(html, size, &tags);
            assert!(whole.structurally_eq(NodeId::ROOT, &chunked, NodeId::ROOT));
        }
    }
}
