//! Oat frontend CLI

use clap::{Args, Parser, Subcommand, ValueEnum};
use oat_error::{DiagnosticRenderer, Diagnostics, SourceCache};
use oat_lexer::tokenize;
use oat_parser::{parse_file, Dialect, ForInits, ParseOptions, Program};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Oat language version
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum DialectArg {
    V1,
    /// Structs, nullable and function types (default)
    #[default]
    V2,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::V1 => Dialect::V1,
            DialectArg::V2 => Dialect::V2,
        }
    }
}

#[derive(Parser)]
#[command(name = "oatc")]
#[command(version = "0.1.0")]
#[command(about = "Oat language frontend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser activity to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Plain diagnostics without ANSI colors
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Args, Debug, Clone)]
struct ParseArgs {
    /// Input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Language dialect
    #[arg(short, long, value_enum, default_value_t = DialectArg::V2)]
    dialect: DialectArg,

    /// Allow at most one `var` in a `for` header
    #[arg(long)]
    single_for_init: bool,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        let for_inits = if self.single_for_init {
            ForInits::Single
        } else {
            ForInits::Multiple
        };
        ParseOptions::new(self.dialect.into()).with_for_inits(for_inits)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Shows file tokens (debug)
    Lex {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Shows file AST
    Parse {
        #[command(flatten)]
        args: ParseArgs,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Checks for syntax errors
    Check {
        #[command(flatten)]
        args: ParseArgs,
    },

    /// Prints the file in canonical form
    Fmt {
        #[command(flatten)]
        args: ParseArgs,

        /// Rewrite the file in place
        #[arg(short, long)]
        write: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize AST: {0}")]
    Json(#[from] serde_json::Error),
}

/// A loaded source file and the diagnostics renderer for it
struct Session {
    cache: SourceCache,
    file_id: u32,
    colors: bool,
}

impl Session {
    fn load(path: &Path, colors: bool) -> Result<(Self, String), CliError> {
        let source = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cache = SourceCache::new();
        let file_id = cache.add(path.display().to_string(), source.as_str());
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded source");
        Ok((
            Self {
                cache,
                file_id,
                colors,
            },
            source,
        ))
    }

    fn parse(&self, source: &str, options: ParseOptions) -> (Program, Diagnostics) {
        parse_file(source, self.file_id, options)
    }

    fn report(&self, diagnostics: &Diagnostics) {
        if diagnostics.is_empty() {
            return;
        }
        let mut renderer = DiagnosticRenderer::new(&self.cache);
        if !self.colors {
            renderer = renderer.without_colors();
        }
        eprint!("{}", diagnostics.render_with(&renderer));
        eprintln!("{} error(s) found", diagnostics.len());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "oat_parser=debug,oat_lexer=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Runs one command; `Ok(false)` means the input had errors
fn run(cli: Cli) -> Result<bool, CliError> {
    let colors = !cli.no_color;

    match cli.command {
        Commands::Lex { input } => {
            let (session, source) = Session::load(&input, colors)?;
            let mut diagnostics = Diagnostics::new();
            let mut count = 0usize;

            for item in tokenize(&source, session.file_id) {
                match item {
                    Ok(token) => {
                        count += 1;
                        println!(
                            "  {:4}:{:<3}  {:<14}  {}",
                            token.span.start.line,
                            token.span.start.column,
                            format!("{:?}", token.kind),
                            token
                        );
                    }
                    Err(err) => diagnostics.push(err),
                }
            }

            println!("\nTotal: {count} tokens");
            session.report(&diagnostics);
            Ok(diagnostics.is_empty())
        }

        Commands::Parse { args, json } => {
            let (session, source) = Session::load(&args.input, colors)?;
            let (program, diagnostics) = session.parse(&source, args.options());

            if json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                println!("{program:#?}");
            }
            session.report(&diagnostics);
            Ok(diagnostics.is_empty())
        }

        Commands::Check { args } => {
            let (session, source) = Session::load(&args.input, colors)?;
            let (program, diagnostics) = session.parse(&source, args.options());

            session.report(&diagnostics);
            if diagnostics.is_empty() {
                println!(
                    "{}: {} declaration(s), no errors ({})",
                    args.input.display(),
                    program.decls.len(),
                    args.options().dialect
                );
            }
            Ok(diagnostics.is_empty())
        }

        Commands::Fmt { args, write } => {
            let (session, source) = Session::load(&args.input, colors)?;
            let (program, diagnostics) = session.parse(&source, args.options());

            if !diagnostics.is_empty() {
                session.report(&diagnostics);
                return Ok(false);
            }

            let formatted = program.to_string();
            if write {
                fs::write(&args.input, formatted).map_err(|source| CliError::Write {
                    path: args.input.clone(),
                    source,
                })?;
            } else {
                print!("{formatted}");
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("oatc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_dialect_flag() {
        let parsed = cli(&["check", "--dialect", "v1", "--single-for-init", "a.oat"]);
        let Commands::Check { args } = parsed.command else {
            panic!("expected check");
        };
        let options = args.options();
        assert_eq!(options.dialect, Dialect::V1);
        assert_eq!(options.for_inits, ForInits::Single);
    }

    #[test]
    fn test_default_dialect_is_v2() {
        let Commands::Parse { args, json } = cli(&["parse", "--json", "a.oat"]).command else {
            panic!("expected parse");
        };
        assert!(json);
        assert_eq!(args.options().dialect, Dialect::V2);
    }

    #[test]
    fn test_check_reports_success_and_failure() {
        let good = source_file("int main(int argc, string[] argv) { return 0; }");
        let path = good.path().to_str().unwrap();
        assert!(run(cli(&["--no-color", "check", path])).unwrap());

        let bad = source_file("struct P { int x }");
        let path = bad.path().to_str().unwrap();
        assert!(!run(cli(&["--no-color", "check", "-d", "v1", path])).unwrap());
    }

    #[test]
    fn test_fmt_write_rewrites_file() {
        let file = source_file("int f(){return 1+2*3;}");
        let path = file.path().to_str().unwrap();
        assert!(run(cli(&["fmt", "--write", path])).unwrap());

        let formatted = fs::read_to_string(file.path()).unwrap();
        assert_eq!(formatted, "int f() {\n  return (1 + (2 * 3));\n}\n");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = run(cli(&["check", "/nonexistent/file.oat"]));
        assert!(matches!(result, Err(CliError::Read { .. })));
    }
}
