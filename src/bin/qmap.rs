//! qmap: compile and run structured query documents.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL and parameters for a request
//! qmap compile request.json --dialect pgsql
//!
//! # Execute against a database
//! QMAP_DATABASE_URL=mysql://app@localhost/shop qmap run request.json
//!
//! # Read the request from stdin
//! echo '{"op":"delete","table":"t","where":{"LIMIT":1}}' | qmap compile - -d sqlserver
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use qmap::prelude::*;
use serde_json::Value as Json;

#[derive(Parser)]
#[command(name = "qmap")]
#[command(version)]
#[command(about = "Compile structured query documents to parameterized SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    qmap compile select.json --dialect pgsql
    qmap compile - --format json < insert.json
    qmap run update.json --database-url mysql://app@localhost/shop -v")]
struct Cli {
    /// Verbose output (debug logging and the query log)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile request documents and print SQL with parameters
    Compile {
        /// Request file, or `-` for stdin
        input: String,

        /// Target dialect
        #[arg(short, long, default_value = "mysql")]
        dialect: String,

        /// Table name prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Compile and execute request documents
    Run {
        /// Request file, or `-` for stdin
        input: String,

        /// Database connection URL (overrides the config file)
        #[arg(long, env = "QMAP_DATABASE_URL")]
        database_url: Option<String>,

        /// Session config file (default: ./qmap.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the dialect capability table
    Dialects,
    /// Show the token reference
    Tokens,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match &cli.command {
        Commands::Compile {
            input,
            dialect,
            prefix,
            format,
        } => compile_requests(input, dialect, prefix, *format),
        Commands::Run {
            input,
            database_url,
            config,
            format,
        } => run_requests(input, database_url.as_deref(), config.as_ref(), *format, cli.verbose).await,
        Commands::Dialects => {
            show_dialects();
            Ok(())
        }
        Commands::Tokens => {
            show_tokens();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("qmap=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read one request object or an array of them.
fn read_requests(input: &str) -> Result<Vec<Request>> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };

    let document: Json = serde_json::from_str(&content).context("request is not valid JSON")?;
    let requests = match document {
        Json::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Request>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(requests)
}

fn compile_requests(input: &str, dialect: &str, prefix: &str, format: OutputFormat) -> Result<()> {
    let dialect: Dialect = dialect.parse()?;
    let compiler = Compiler::new(dialect).with_prefix(prefix);

    let mut compiled = Vec::new();
    for request in read_requests(input)? {
        compiled.push(compiler.compile(&request)?);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&compiled)?),
        OutputFormat::Text | OutputFormat::Table => {
            for (i, statement) in compiled.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_statement(statement);
            }
        }
    }
    Ok(())
}

fn print_statement(statement: &Statement) {
    match statement {
        Statement::Query(query) => {
            println!("{}", query.text().white().bold());
            print_params(query.params(), "  ");
        }
        Statement::Batch(batch) => {
            println!("{}", batch.text().white().bold());
            for (i, row) in batch.rows().iter().enumerate() {
                println!("  {} {}", "row".dimmed(), i.to_string().cyan());
                print_params(row, "    ");
            }
        }
    }
}

fn print_params(params: &Params, indent: &str) {
    for (name, value) in params.iter() {
        println!(
            "{}{} = {}",
            indent,
            format!(":{}", name).cyan(),
            value.to_display_literal().yellow()
        );
    }
}

async fn run_requests(
    input: &str,
    database_url: Option<&str>,
    config: Option<&PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let requests = read_requests(input)?;

    let mut config = match config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::discover()?,
    };
    if let Some(url) = database_url {
        config.url = Some(url.to_string());
        if let Some(dialect) = dialect_from_url(url) {
            config.server = dialect.id().to_string();
        }
    }

    let mut session = Session::connect(&config).await?;

    for request in &requests {
        let result = session.run(request).await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Table | OutputFormat::Text => {
                if result.data.is_empty() {
                    println!("{} {} rows affected", "✓".green(), result.affected_rows);
                } else {
                    print_table(&result.data);
                }
            }
        }
    }

    if verbose {
        println!();
        println!("{}", "Query log:".green().bold());
        for entry in session.log() {
            println!("  {}", entry.dimmed());
        }
    }
    Ok(())
}

fn dialect_from_url(url: &str) -> Option<Dialect> {
    let scheme = url.split("://").next()?;
    scheme.parse().ok()
}

fn print_table(rows: &[Row]) {
    let columns: Vec<&String> = rows[0].keys().collect();

    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(*c))
                .map(|v| val_to_string(v).len())
                .max()
                .unwrap_or(0)
                .max(c.len())
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let val = row.get(*c).map(val_to_string).unwrap_or_default();
                format!("{:width$}", val, width = *w)
            })
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", rows.len().to_string().cyan());
}

fn val_to_string(val: &Json) -> String {
    match val {
        Json::Null => "NULL".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn show_dialects() {
    println!("{}", "qmap dialects".cyan().bold());
    println!();
    println!(
        "{:10} {:8} {:13} {:5} {:10} {}",
        "Dialect".white().bold(),
        "Driver".white().bold(),
        "LIMIT/OFFSET".white().bold(),
        "TOP".white().bold(),
        "Date cast".white().bold(),
        "Status attributes".white().bold()
    );
    println!("{}", "─".repeat(90).dimmed());

    let flag = |b: bool| if b { "yes".green() } else { "no".dimmed() };
    for dialect in Dialect::ALL {
        let caps = dialect.capabilities();
        let attributes: Vec<&str> = caps.status_attributes.iter().map(|a| a.name()).collect();
        println!(
            "{:10} {:8} {:13} {:5} {:10} {}",
            dialect.id().cyan().bold(),
            caps.driver.yellow(),
            flag(caps.supports_limit_offset),
            flag(caps.supports_top),
            flag(caps.supports_native_date_cast),
            attributes.join(", ").dimmed()
        );
    }
}

fn show_tokens() {
    println!("{}", "qmap token reference".cyan().bold());
    println!();

    println!("{}", "Operators (condition keys)".green().bold());
    for op in Operator::ALL {
        let arity = match op.arity() {
            Arity::Unary => "no value",
            Arity::Binary => "one value",
            Arity::Ternary => "[low, high]",
            Arity::List => "[values...]",
        };
        println!(
            "  {:8} {:14} {}",
            format!("[{}]", op.token()).cyan(),
            op.keyword().white(),
            arity.dimmed()
        );
    }

    println!();
    println!("{}", "Aggregates (columns)".green().bold());
    for (token, agg) in [
        ("count", Aggregate::Count),
        ("sum", Aggregate::Sum),
        ("avg", Aggregate::Avg),
        ("min", Aggregate::Min),
        ("max", Aggregate::Max),
        ("group", Aggregate::GroupConcat),
    ] {
        println!("  {:8} {}", format!("[{}]", token).cyan(), agg.function().white());
    }

    println!();
    println!("{}", "Joins".green().bold());
    for token in [">", "<", "<>", "><"] {
        if let Some(kind) = JoinKind::from_token(token) {
            println!(
                "  {:8} {} JOIN",
                format!("[{}]", token).cyan(),
                kind.keyword().white()
            );
        }
    }

    println!();
    println!("{}", "Modifiers (where keys)".green().bold());
    let modifiers = [
        ("AND / OR / SINGLE", "{table: {column[op]: value}}"),
        ("MATCH", "{columns: {table: [cols]}, search, option}"),
        ("GROUP", "{table: [cols]}"),
        ("HAVING", "{table: [column, op, value]}"),
        ("ORDER", "{table: [col[ASC|DESC]]}"),
        ("LIMIT", "n | [n, offset]"),
    ];
    for (key, shape) in modifiers {
        println!("  {:18} {}", key.cyan(), shape.dimmed());
    }
}
