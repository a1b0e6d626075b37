//! Command-line front end: `rpcgen generate [PROJECT_DIR] [options]`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use console::style;
use similar::{ChangeTag, TextDiff};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use rpcgen_core::{
    ConfigOverrides, GenerateError, GenerationReport, RpcGenConfig, StaleFile, WriteStatus,
};

#[derive(Parser)]
#[command(
    name = "rpcgen",
    version,
    about = "Generate a typed RPC client and server dispatch table from TypeScript API modules"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the frontend and backend RPC modules
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Project root searched for API modules
    #[arg(value_name = "PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,
    /// Endpoint the generated client posts to
    #[arg(long)]
    pub rpc_api_url: Option<String>,
    /// Output path of the client module, relative to the project root
    #[arg(long)]
    pub frontend_file: Option<PathBuf>,
    /// Output path of the server module, relative to the project root
    #[arg(long)]
    pub backend_file: Option<PathBuf>,
    /// Type name of the context parameter every API function takes first
    #[arg(long)]
    pub context_type: Option<String>,
    /// Module the server imports the context type from
    #[arg(long)]
    pub context_import: Option<String>,
    /// Fail with a diff instead of writing when generated files are out of date
    #[arg(long, conflicts_with = "watch")]
    pub check: bool,
    /// Regenerate whenever a TypeScript source changes
    #[arg(long)]
    pub watch: bool,
}

impl GenerateArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            rpc_api_url: self.rpc_api_url.clone(),
            frontend_file: self.frontend_file.clone(),
            backend_file: self.backend_file.clone(),
            context_type: self.context_type.clone(),
            context_import: self.context_import.clone(),
        }
    }
}

/// Run with the process arguments; returns the exit code.
pub fn run() -> i32 {
    run_from(std::env::args_os())
}

pub fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => {
                init_tracing();
                match run_generate(&args) {
                    Ok(code) => code,
                    Err(err) => {
                        eprintln!("{} {err}", style("error:").red().bold());
                        1
                    }
                }
            }
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn run_generate(args: &GenerateArgs) -> Result<i32, GenerateError> {
    let root = args.project_dir.as_path();
    let config = RpcGenConfig::load(root)?.apply(args.overrides())?;

    if args.check {
        let stale = rpcgen_core::check(root, &config)?;
        if stale.is_empty() {
            println!("{} Generated files are up to date", style("✓").green());
            return Ok(0);
        }
        for file in &stale {
            eprint!("{}", render_diff(file, root));
        }
        eprintln!(
            "{} {} generated file(s) out of date; run `rpcgen generate`",
            style("✗").red(),
            stale.len()
        );
        return Ok(1);
    }

    if args.watch {
        rpcgen_core::watch(root, &config, |result| match result {
            Ok(report) => print_report(&report, root),
            Err(err) => error!("{err}"),
        })?;
        return Ok(0);
    }

    let report = rpcgen_core::generate(root, &config)?;
    print_report(&report, root);
    Ok(0)
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn print_report(report: &GenerationReport, root: &Path) {
    println!(
        "{} {} function(s) in {} module(s), {} named type(s)",
        style("✓").green(),
        report.functions,
        report.modules.len(),
        report.named_types
    );
    for (path, status) in &report.files {
        let label = match status {
            WriteStatus::Written => style("wrote").green(),
            WriteStatus::Unchanged => style("unchanged").dim(),
        };
        println!("  {label} {}", display_path(path, root));
    }
    if !report.diagnostics.is_empty() {
        println!(
            "  {} {} type warning(s)",
            style("!").yellow(),
            report.diagnostics.len()
        );
    }
}

/// Unified diff between the file on disk and what would be generated.
fn render_diff(file: &StaleFile, root: &Path) -> String {
    let path = display_path(&file.path, root);
    let current = file.current.as_deref().unwrap_or_default();
    let diff = TextDiff::from_lines(current, &file.expected);
    let mut output = String::new();

    let state = if file.current.is_some() {
        "current"
    } else {
        "missing"
    };
    output.push_str(&format!("{}\n", style(format!("--- {path} ({state})")).bold()));
    output.push_str(&format!("{}\n", style(format!("+++ {path} (generated)")).bold()));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let line = match change.tag() {
                    ChangeTag::Delete => style(format!("-{}", change.value())).red(),
                    ChangeTag::Insert => style(format!("+{}", change.value())).green(),
                    ChangeTag::Equal => style(format!(" {}", change.value())),
                };
                output.push_str(&line.to_string());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    output
}

fn init_tracing() {
    // RPCGEN_LOG: "trace", "debug", "info", "warn", "error" or a full filter directive
    let filter = match std::env::var("RPCGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("rpcgen_core={level},rpcgen_cli={level}")
        }
        Ok(filter) => filter,
        Err(_) => "rpcgen_core=info,rpcgen_cli=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
