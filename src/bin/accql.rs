//! accql — Access SQL to PostgreSQL on the command line.
//!
//! # Usage
//!
//! ```bash
//! # Convert a statement
//! accql "SELECT IIF(x > 0, 'pos', 'neg') FROM t"
//!
//! # Convert a file, also writing the result
//! accql -f query.sql -o query.pg.sql
//!
//! # Show the parse tree
//! accql explain "SELECT Nz(a, 0) FROM t"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use accql::prelude::*;
use accql::rewriter::rule_table;

#[derive(Parser)]
#[command(name = "accql")]
#[command(version)]
#[command(about = "Access SQL → PostgreSQL transpiler", long_about = None)]
#[command(after_help = "EXAMPLES:
    accql \"SELECT IIF(a = 1, 'x', 'y') FROM t\"
    accql -f report.sql -o report.pg.sql --quiet
    accql --dialect mysql \"SELECT first & ' ' & last FROM people\"
    accql explain \"SELECT TOP 5 * FROM Orders\"")]
struct Cli {
    /// Access SQL text, or the path of a file containing it
    input: Option<String>,

    /// Read the SQL from this file
    #[arg(short, long, conflicts_with = "input")]
    file: Option<PathBuf>,

    /// Also write the converted SQL to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Don't print the converted SQL to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Target dialect (postgres, mysql, sqlite)
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Maximum nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Config file (default: ./accql.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parse tree and the converted SQL
    Explain {
        /// The Access SQL to explain
        query: String,

        /// Print the parse tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the node kind → rewrite rule table
    Rules,
    /// Show the function rename table for the target dialect
    Functions,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Explain { query, json }) => explain_query(&cli, query, *json),
        Some(Commands::Rules) => {
            show_rules();
            Ok(())
        }
        Some(Commands::Functions) => show_functions(&cli),
        None => run_convert(&cli),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "accql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(depth) = cli.max_depth {
        if depth == 0 {
            bail!("--max-depth must be at least 1");
        }
        config.max_depth = depth;
    }
    Ok(config)
}

fn read_input(cli: &Cli) -> Result<Option<String>> {
    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(Some(text));
    }
    match &cli.input {
        Some(text) if Path::new(text).is_file() => {
            let text = std::fs::read_to_string(text)
                .with_context(|| format!("failed to read {}", text))?;
            Ok(Some(text))
        }
        Some(text) => Ok(Some(text.clone())),
        None => Ok(None),
    }
}

fn run_convert(cli: &Cli) -> Result<()> {
    let Some(source) = read_input(cli)? else {
        println!("{}", "accql — Access SQL → PostgreSQL".cyan().bold());
        println!();
        println!("Usage: accql <SQL | FILE> [OPTIONS]");
        println!();
        println!("Try: accql --help");
        return Ok(());
    };

    let config = load_config(cli)?;
    if cli.verbose {
        eprintln!(
            "{} {} (max depth {})",
            "Target:".dimmed(),
            config.dialect.to_string().cyan(),
            config.max_depth
        );
    }

    // Nothing is emitted unless the whole conversion succeeded
    let sql = accql::convert_with(&source, &config)?;

    let mut emitter = Emitter::new().stdout(!cli.quiet);
    if let Some(path) = &cli.output {
        emitter = emitter.output(path);
    }
    emitter.emit(&sql)?;

    if let Some(path) = emitter.output_path() {
        eprintln!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
    }
    Ok(())
}

fn explain_query(cli: &Cli, query: &str, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    let tree = accql::parse(query, config.max_depth)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    println!("{}", "accql Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();
    println!("{}", "Parse Tree:".green().bold());
    print_tree(&tree, 1);
    println!();

    let rewriter = Rewriter::from_config(&config);
    match rewriter.rewrite(&tree) {
        Ok(sql) => {
            println!(
                "{} {}",
                "Converted SQL".green().bold(),
                format!("({}):", rewriter.dialect_name()).dimmed()
            );
            println!("  {}", sql.white());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_tree(node: &ParseNode, indent: usize) {
    let rule = rule_for(node.kind());
    println!(
        "{}{} {}",
        "  ".repeat(indent),
        node.label().white(),
        format!("[{}]", rule).dimmed()
    );
    for child in node.children() {
        print_tree(child, indent + 1);
    }
}

fn show_rules() {
    println!("{}", "accql Rewrite Rules".cyan().bold());
    println!();
    println!(
        "{:18} {:14} {}",
        "Kind".white().bold(),
        "Rule".white().bold(),
        "Effect".white().bold()
    );
    println!("{}", "─".repeat(72).dimmed());

    for (kind, rule) in rule_table() {
        let rule_name = format!("{:14}", rule.to_string());
        let rule_name = if rule == Rule::Unsupported {
            rule_name.red()
        } else {
            rule_name.yellow()
        };
        println!(
            "{:18} {} {}",
            kind.to_string().cyan().bold(),
            rule_name,
            rule.describe().dimmed()
        );
    }
}

fn show_functions(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let rewriter = Rewriter::from_config(&config);

    println!(
        "{} {}",
        "Function renames for".cyan().bold(),
        rewriter.dialect_name().cyan().bold()
    );
    println!();
    println!("{:16} {}", "Access".white().bold(), "Target".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (from, to) in rewriter.functions() {
        println!("{:16} {}", from.yellow(), to.white());
    }
    Ok(())
}
