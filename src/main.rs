//! Purpose: `jsonview` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, loads one JSON document, answers one query.
//! Invariants: Query results go to stdout; logs and diagnostics go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`, except `truthy`.
//! Invariants: Lazy mode keeps going on malformed input with an absent root.
use std::error::Error as StdError;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod lookup_path;

use jsonview::api::{
    DEFAULT_MAX_DEPTH, Document, Error, ErrorKind, JsonParser, Node, ParseOptions, to_exit_code,
};
use lookup_path::LookupPath;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(cli.log.as_deref()).map_err(|err| (err, color_mode))?;
    dispatch(cli.command).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "jsonview",
    version,
    about = "Query one JSON document through typed, non-failing lookups",
    long_about = None,
    after_help = r#"EXAMPLES
  $ jsonview get data.json --path list.0.id --as text
  $ jsonview get data.json --path code --as int --default -1
  $ jsonview children data.json --path list
  $ echo '{"ok":true}' | jsonview truthy --path ok && echo yes

PATHS
  Segments are separated by dots. Numeric segments index arrays (and match
  numeric keys on objects). `\.` is a literal dot inside a key.

EXIT STATUS
  0 ok   2 usage   3 parse   4 absent   5 type mismatch   6 i/o   1 internal
  `truthy` exits 0 when the value is truthy and 1 otherwise."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        env = "JSONVIEW_LOG",
        value_name = "FILTER",
        help = "Log filter directive (falls back to RUST_LOG, then `warn`)"
    )]
    log: Option<String>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Args)]
struct InputArgs {
    #[arg(
        value_name = "FILE",
        help = "JSON document to read (default: stdin; `-` also reads stdin)",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        default_value = "",
        hide_default_value = true,
        help = "Dot-separated lookup path, e.g. `list.0.id` (default: the root)"
    )]
    path: String,
    #[arg(
        long,
        env = "JSONVIEW_MAX_DEPTH",
        default_value_t = DEFAULT_MAX_DEPTH,
        help = "Reject documents nested deeper than this"
    )]
    max_depth: usize,
    #[arg(
        long,
        env = "JSONVIEW_MAX_BYTES",
        help = "Reject documents larger than this many bytes"
    )]
    max_bytes: Option<usize>,
    #[arg(
        long,
        help = "Fail on malformed input instead of treating the root as absent"
    )]
    strict: bool,
}

impl InputArgs {
    fn path_label(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }

    fn options(&self) -> ParseOptions {
        let options = ParseOptions::new().with_max_depth(self.max_depth);
        match self.max_bytes {
            Some(max) => options.with_max_bytes(max),
            None => options,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Target {
    Int,
    Uint,
    Float,
    Bool,
    Text,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Print the value at --path, converted to --as",
        long_about = "Print the value at --path, converted to --as.\n\nIntegers saturate at 64-bit bounds and fractional numbers truncate toward zero. Text prints raw (not JSON-quoted)."
    )]
    Get {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long = "as", value_enum, help = "Result type: int|uint|float|bool|text")]
        target: Target,
        #[arg(
            long,
            allow_hyphen_values = true,
            help = "Printed when the node is absent or has the wrong kind"
        )]
        default: Option<String>,
    },
    #[command(about = "Print the kind (or `absent`) and child count at --path as JSON")]
    Kind {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(about = "Print one JSON line per child at --path (key or index, kind)")]
    Children {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(about = "Exit 0 when the value at --path is truthy, 1 otherwise")]
    Truthy {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn dispatch(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Get {
            input,
            target,
            default,
        } => {
            let fallback = default
                .as_deref()
                .map(|text| normalize_default(text, target))
                .transpose()?;
            let doc = load(&input)?;
            let node = LookupPath::parse(&input.path).resolve(doc.root());
            let rendered = match (render(node, target), fallback) {
                (Ok(rendered), _) => rendered,
                (Err(err), Some(fallback))
                    if matches!(err.kind(), ErrorKind::Absent | ErrorKind::TypeMismatch) =>
                {
                    tracing::debug!(error = %err, "using --default");
                    fallback
                }
                (Err(err), _) => return Err(add_lookup_context(err, &input, &doc)),
            };
            println!("{rendered}");
            Ok(RunOutcome::ok())
        }
        Command::Kind { input } => {
            let doc = load(&input)?;
            let node = LookupPath::parse(&input.path).resolve(doc.root());
            emit_json(json!({
                "path": input.path,
                "kind": kind_label(node),
                "size": node.size(),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Children { input } => {
            let doc = load(&input)?;
            let node = LookupPath::parse(&input.path).resolve(doc.root());
            if node.is_absent() {
                let err = Error::new(ErrorKind::Absent).with_message("no node to list children of");
                return Err(add_lookup_context(err, &input, &doc));
            }
            for (index, child) in node.children().enumerate() {
                let line = match child.key() {
                    Some(key) => json!({ "key": key, "kind": kind_label(child) }),
                    None => json!({ "index": index, "kind": kind_label(child) }),
                };
                println!("{line}");
            }
            Ok(RunOutcome::ok())
        }
        Command::Truthy { input } => {
            let doc = load(&input)?;
            let node = LookupPath::parse(&input.path).resolve(doc.root());
            Ok(RunOutcome::with_code(if node.truthy() { 0 } else { 1 }))
        }
    }
}

fn load(input: &InputArgs) -> Result<Document, Error> {
    let bytes = read_input(input.file.as_deref(), input.max_bytes)?;
    let parser = JsonParser::with_options(input.options());
    if input.strict {
        return Document::try_parse_bytes_with(&parser, &bytes)
            .map_err(|err| add_input_path(err, input));
    }
    let doc = Document::parse_bytes_with(&parser, &bytes);
    if let Some(err) = doc.parse_error() {
        tracing::warn!(error = %err, "input did not parse; treating the root as absent");
    }
    Ok(doc)
}

fn read_input(file: Option<&Path>, max_bytes: Option<usize>) -> Result<Vec<u8>, Error> {
    match file {
        Some(path) if path != Path::new("-") => fs::File::open(path)
            .and_then(|reader| read_limited(reader, max_bytes))
            .map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read input file")
                    .with_path(path)
                    .with_source(err)
            }),
        _ => read_limited(io::stdin().lock(), max_bytes).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        }),
    }
}

// Stops one byte past `max_bytes`; the parser reports the overflow.
fn read_limited(mut reader: impl Read, max_bytes: Option<usize>) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match max_bytes {
        Some(max) => {
            let cap = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
            reader.take(cap).read_to_end(&mut bytes)?
        }
        None => reader.read_to_end(&mut bytes)?,
    };
    Ok(bytes)
}

fn render(node: Node<'_>, target: Target) -> Result<String, Error> {
    Ok(match target {
        Target::Int => node.extract::<i64>()?.to_string(),
        Target::Uint => node.extract::<u64>()?.to_string(),
        Target::Float => node.extract::<f64>()?.to_string(),
        Target::Bool => node.extract::<bool>()?.to_string(),
        Target::Text => node.extract::<&str>()?.to_string(),
    })
}

fn normalize_default(text: &str, target: Target) -> Result<String, Error> {
    let normalized = match target {
        Target::Int => text.parse::<i64>().map(|v| v.to_string()).ok(),
        Target::Uint => text.parse::<u64>().map(|v| v.to_string()).ok(),
        Target::Float => text.parse::<f64>().map(|v| v.to_string()).ok(),
        Target::Bool => text.parse::<bool>().map(|v| v.to_string()).ok(),
        Target::Text => Some(text.to_string()),
    };
    normalized.ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("--default `{text}` is not a valid {}", target_label(target)))
            .with_hint("The default must have the same type as --as.")
    })
}

fn target_label(target: Target) -> &'static str {
    match target {
        Target::Int => "int",
        Target::Uint => "uint",
        Target::Float => "float",
        Target::Bool => "bool",
        Target::Text => "text",
    }
}

fn kind_label(node: Node<'_>) -> &'static str {
    node.kind().map_or("absent", |kind| kind.as_str())
}

fn add_input_path(err: Error, input: &InputArgs) -> Error {
    match &input.file {
        Some(path) if path != Path::new("-") => err.with_path(path),
        _ => err,
    }
}

fn add_lookup_context(err: Error, input: &InputArgs, doc: &Document) -> Error {
    let message = format!(
        "{} (at {})",
        err.message().unwrap_or("lookup failed"),
        input.path_label()
    );
    let err = add_input_path(err.with_message(message), input);
    match (err.kind(), doc.parse_error()) {
        (ErrorKind::Absent, Some(_)) => {
            err.with_hint("The input did not parse; rerun with --strict to see why.")
        }
        (ErrorKind::Absent, None) => {
            err.with_hint("Use `jsonview children` on the parent to list what is there.")
        }
        (ErrorKind::TypeMismatch, _) => {
            err.with_hint("Use `jsonview kind` to inspect the node, or pass --default.")
        }
        _ => err,
    }
}

fn init_tracing(directive: Option<&str>) -> Result<(), Error> {
    let env_filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid log filter `{directive}`"))
                .with_hint("Use a tracing directive such as `debug` or `jsonview=trace`.")
                .with_source(err)
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    println!(
        "{}",
        json.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    );
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Parse => "malformed JSON".to_string(),
        ErrorKind::Absent => "no such node".to_string(),
        ErrorKind::TypeMismatch => "node has the wrong kind".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    if let Some(category) = err.category() {
        inner.insert("category".to_string(), json!(category.label()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let (Some(line), Some(column)) = (err.line(), err.column()) {
        lines.push(format!(
            "{} line {line}, column {column}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let subcommand = usage.and_then(|usage| {
        let mut tokens = usage.split_whitespace();
        tokens.find(|token| *token == "jsonview")?;
        tokens
            .next()
            .filter(|token| !token.starts_with(['-', '<', '[']))
    });

    match subcommand {
        Some(subcommand) => format!("Try `jsonview {subcommand} --help`."),
        None => "Try `jsonview --help`.".to_string(),
    }
}
