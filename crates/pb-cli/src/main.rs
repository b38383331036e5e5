//! `pb`: page-builder schemas from the command line.
//!
//! Renders schema JSON to HTML, repairs untrusted payloads, generates the
//! deterministic fallback page for a prompt, lints, and builds or decodes
//! render links. Every command reads a file or `-` for stdin.

mod diagnostics;

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pb_core::id::{ClockIdGenerator, IdGenerator, SequentialIdGenerator};
use pb_core::transport::{DEFAULT_SCHEMA_PARAM, decode_schema_param, render_link};
use pb_core::{PageSchema, generate, normalize_str};
use pb_render::{PageOptions, RenderOptions, render_page, render_schema_html};

#[derive(Parser, Debug)]
#[command(name = "pb", version, about = "Page-builder schema tools")]
struct Cli {
    /// More logging: -v for debug, -vv for trace. RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Synthesize ids as `prefix-N` instead of timestamped ids.
    #[arg(long, global = true)]
    sequential_ids: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a schema to an HTML page (or fragment).
    Render {
        /// Schema file, or `-` for stdin
        input: String,
        /// Write output to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Emit only the rendered tree, without the document wrapper
        #[arg(long)]
        fragment: bool,
        /// Single-line output without `data-node-id` attributes
        #[arg(long)]
        compact: bool,
        /// CSS class prefix for semantic classes (empty for none)
        #[arg(long, default_value = "pb")]
        class_prefix: String,
    },
    /// Repair an untrusted payload into a canonical schema.
    Normalize {
        input: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Generate the fallback schema for a prompt.
    Generate {
        prompt: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Report schema problems. Exits 1 on errors, or on warnings with `--strict`.
    Lint {
        input: String,
        #[arg(long)]
        strict: bool,
    },
    /// Build a render-page URL carrying the schema.
    Link {
        input: String,
        /// Render page URL
        #[arg(long)]
        base: String,
        /// Query parameter name
        #[arg(long, default_value = DEFAULT_SCHEMA_PARAM)]
        param: String,
    },
    /// Decode a render-link parameter back to schema JSON.
    Decode {
        /// The encoded parameter value
        param: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("pb: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut ids: Box<dyn IdGenerator> = if cli.sequential_ids {
        Box::new(SequentialIdGenerator::new())
    } else {
        Box::new(ClockIdGenerator::new())
    };

    log::debug!("running {:?}", cli.command);
    match cli.command {
        Command::Render {
            input,
            output,
            fragment,
            compact,
            class_prefix,
        } => {
            let schema = normalize_str(&read_input(&input)?, ids.as_mut());
            let mut options = if compact {
                RenderOptions::compact()
            } else {
                RenderOptions::default()
            };
            options.class_prefix = class_prefix;
            write_output(output.as_deref(), &render_output(&schema, options, fragment))?;
        }
        Command::Normalize { input, output } => {
            let schema = normalize_str(&read_input(&input)?, ids.as_mut());
            write_output(output.as_deref(), &json_output(&schema))?;
        }
        Command::Generate { prompt, output } => {
            let schema = generate(&prompt, ids.as_mut());
            write_output(output.as_deref(), &json_output(&schema))?;
        }
        Command::Lint { input, strict } => {
            let lines = diagnostics::compute_diagnostics(&input, &read_input(&input)?);
            for line in &lines {
                println!("{line}");
            }
            let failed = diagnostics::has_errors(&lines) || (strict && !lines.is_empty());
            log::debug!("{} finding(s), failed: {failed}", lines.len());
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Link { input, base, param } => {
            let schema = PageSchema::from_json(&read_input(&input)?)?;
            println!("{}", render_link(&base, &schema, &param)?);
        }
        Command::Decode { param } => {
            let schema = decode_schema_param(param.trim(), ids.as_mut())?;
            write_output(None, &json_output(&schema))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render_output(schema: &PageSchema, render: RenderOptions, fragment: bool) -> String {
    if fragment {
        render_schema_html(schema, &render)
    } else {
        let options = PageOptions {
            render,
            ..PageOptions::default()
        };
        render_page(schema, &options)
    }
}

fn json_output(schema: &PageSchema) -> String {
    let mut json = schema.to_json_pretty();
    json.push('\n');
    json
}

fn read_input(input: &str) -> Result<String, Box<dyn Error>> {
    log::debug!("reading {}", if input == "-" { "stdin" } else { input });
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(input).map_err(|e| format!("cannot read '{input}': {e}").into())
    }
}

fn write_output(output: Option<&str>, contents: &str) -> Result<(), Box<dyn Error>> {
    log::debug!("writing {} byte(s) to {}", contents.len(), output.unwrap_or("stdout"));
    match output {
        Some(path) => fs::write(path, contents).map_err(|e| format!("cannot write '{path}': {e}"))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
