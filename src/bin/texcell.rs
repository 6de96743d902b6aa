//! Texcell CLI - evaluate LaTeX math spans with live variables

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, BufRead, Read, Write};
#[cfg(feature = "cli")]
use texcell::{format_result, DelimiterScheme, EngineOptions, PatternKind, Session};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "texcell")]
#[command(author = "SciPenAI")]
#[command(version)]
#[command(about = "Texcell - Reactive LaTeX expression engine", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Delimiter scheme for span recognition
    #[arg(short, long, value_enum, default_value_t = Scheme::Dollar)]
    delimiters: Scheme,

    /// Match block spans ($$..$$ / \[..\]) instead of inline spans
    #[arg(short, long)]
    block: bool,

    /// Evaluate a single expression and exit
    #[arg(short, long)]
    expr: Option<String>,

    /// Quiet mode: suppress warning output to stderr
    #[arg(short, long)]
    quiet: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Interactive session: one expression per line, dependents update live
    Repl,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scheme {
    Dollar,
    Bracket,
}

#[cfg(feature = "cli")]
impl From<Scheme> for DelimiterScheme {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Dollar => DelimiterScheme::Dollar,
            Scheme::Bracket => DelimiterScheme::Bracket,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Repl) = cli.command {
        return run_repl(cli.delimiters.into());
    }

    let mut session = Session::with_options(EngineOptions {
        evaluation: true,
        add_inline_math: true,
        delimiters: cli.delimiters.into(),
    });

    // One-shot expression evaluation
    if let Some(expr) = cli.expr {
        match session.evaluate(&expr) {
            Ok(eval) => {
                println!("{}", format_result(Some(eval.value)).trim_start_matches('='));
                return Ok(());
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
    }

    // Read input text
    let input = match cli.input_file {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let kind = if cli.block {
        PatternKind::Block
    } else {
        PatternKind::Inline
    };

    let outcomes = match session.process_text(&input, kind) {
        Ok(outcomes) => outcomes,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let mut result = String::new();
    if outcomes.is_empty() {
        result.push_str("no math spans found\n");
    }
    for outcome in &outcomes {
        let display = match &outcome.evaluation {
            Some(Ok(eval)) => {
                let marker = if eval.defined_variable.is_some() {
                    " (defines variable)"
                } else {
                    ""
                };
                format!("{}{}", format_result(Some(eval.value)), marker)
            }
            Some(Err(err)) => format!("{} ({})", format_result(None), err),
            None => String::new(),
        };
        result.push_str(&format!(
            "{:>4}..{:<4} {}  {}\n",
            outcome.span.start, outcome.span.end, outcome.span.latex, display
        ));
    }

    if !cli.quiet {
        for warning in session.warnings() {
            eprintln!("Warning: {}", warning);
        }
    }

    match cli.output {
        Some(path) => {
            let mut file = fs::File::create(&path)?;
            write!(file, "{}", result)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            print!("{}", result);
        }
    }

    Ok(())
}

/// Interactive loop: every line becomes a display site in one shared
/// session, so redefining a variable visibly updates earlier lines.
#[cfg(feature = "cli")]
fn run_repl(delimiters: DelimiterScheme) -> io::Result<()> {
    let mut session = Session::with_options(EngineOptions {
        evaluation: true,
        add_inline_math: true,
        delimiters,
    });
    let mut sites: Vec<(String, texcell::MathSite)> = Vec::new();

    eprintln!("texcell repl - one expression per line, empty line or 'quit' to exit");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == "quit" || line == "exit" {
            break;
        }

        let site = session.mount_site(line);
        sites.push((line.to_string(), site));

        for (source, site) in &sites {
            println!("  {}  {}", source, site.display());
        }
        println!();
    }

    for (_, site) in &sites {
        site.detach(&mut session.registry);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install texcell --features cli");
    eprintln!("  texcell [OPTIONS] [INPUT_FILE]");
}
