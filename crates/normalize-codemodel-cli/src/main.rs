//! `normalize-codemodel` - parse, render and translate code through the code model IR.

mod config;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::CodemodelConfig;
use normalize_codemodel::{
    Generator, Language, SourceFile, generator_for_language, generators, parser_for_extension,
    parser_for_language, parsers,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Translate between source code and the code model IR.
#[derive(Parser)]
#[command(name = "normalize-codemodel", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Project root used to find .normalize/codemodel.toml
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a source file and print its IR as JSON
    Parse {
        /// Input source file, use - for stdin
        input: PathBuf,

        /// Source language (required when using stdin)
        #[arg(short, long)]
        from: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Render an IR JSON file as source code
    Generate {
        /// IR file produced by `parse`, use - for stdin
        input: PathBuf,

        /// Target language (defaults to config, then the IR's own language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a source file and render it in another language
    Translate {
        /// Input source file, use - for stdin
        input: PathBuf,

        /// Source language (required when using stdin)
        #[arg(short, long)]
        from: Option<String>,

        /// Target language (defaults to config, then csharp)
        #[arg(short, long)]
        to: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered generators and parsers
    Languages,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CodemodelConfig::load(&cli.root)?;

    match cli.command {
        Command::Parse {
            input,
            from,
            pretty,
        } => {
            let file = parse_input(&input, from.as_deref(), &config)?;
            let json = if pretty {
                serde_json::to_string_pretty(&file)?
            } else {
                serde_json::to_string(&file)?
            };
            println!("{json}");
            Ok(())
        }
        Command::Generate {
            input,
            lang,
            output,
        } => {
            let content = read_input(&input)?;
            let file: SourceFile = serde_json::from_str(&content)
                .with_context(|| format!("invalid IR in {}", input.display()))?;
            let target = lang
                .or_else(|| config.generate.target.clone())
                .unwrap_or_else(|| file.language.id().to_string());
            let text = render(&file, &target, &config)?;
            write_output(output.as_deref(), &text)
        }
        Command::Translate {
            input,
            from,
            to,
            output,
        } => {
            let file = parse_input(&input, from.as_deref(), &config)?;
            let target = to
                .or_else(|| config.generate.target.clone())
                .unwrap_or_else(|| Language::CSharp.id().to_string());
            let text = render(&file, &target, &config)?;
            write_output(output.as_deref(), &text)
        }
        Command::Languages => {
            println!("Generators:");
            for generator in generators() {
                println!("  {} (.{})", generator.language().id(), generator.extension());
            }
            println!("Parsers:");
            for parser in parsers() {
                let exts: Vec<String> = parser.extensions().iter().map(|e| format!(".{e}")).collect();
                println!("  {} ({})", parser.language().id(), exts.join(", "));
            }
            Ok(())
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn parse_input(
    path: &Path,
    from: Option<&str>,
    config: &CodemodelConfig,
) -> anyhow::Result<SourceFile> {
    let parser = match from {
        Some(lang) => parser_for_language(lang)
            .with_context(|| format!("no parser available for language: {lang}"))?,
        None => {
            if is_stdin(path) {
                bail!("--from is required when reading from stdin");
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            parser_for_extension(ext).with_context(|| {
                format!(
                    "cannot detect language of {}; use --from to specify it",
                    path.display()
                )
            })?
        }
    };

    let content = read_input(path)?;
    let name = if is_stdin(path) {
        "stdin"
    } else {
        path.file_stem().and_then(|s| s.to_str()).unwrap_or("module")
    };
    parser
        .parse(&content, name, &config.parse_options())
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn render(file: &SourceFile, target: &str, config: &CodemodelConfig) -> anyhow::Result<String> {
    let generator: &dyn Generator = generator_for_language(target)
        .with_context(|| format!("no generator available for language: {target}"))?;
    generator
        .generate(file, &config.generate_options())
        .with_context(|| format!("failed to generate {target} for {}", file.file_name))
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => print!("{text}"),
    }
    Ok(())
}
