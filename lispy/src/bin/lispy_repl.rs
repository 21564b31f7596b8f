// Lispy Interactive REPL
// Read-eval-print loop plus a runner for strings, files and piped programs

use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use lispy::config::ReplConfig;
use lispy::input_handling::{read_input_content, InputConfig, InputSource};
use lispy::{parse_forms, Runtime};

#[derive(Parser)]
#[command(name = "lispy-repl")]
#[command(about = "Lispy interactive REPL with multi-source input support")]
struct Args {
    /// Input source type
    #[arg(short, long, value_enum, default_value_t = InputSource::Interactive)]
    input: InputSource,

    /// Input string (when using --input string)
    #[arg(short, long)]
    string: Option<String>,

    /// Input file path (when using --input file)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print elapsed time after each form
    #[arg(short, long)]
    time: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReplConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReplConfig::default(),
    };
    if args.time {
        config.show_timing = true;
    }
    init_tracing(&config, args.verbose);

    let runtime = Runtime::new();

    match args.input {
        InputSource::Interactive => run_interactive_repl(&runtime, &mut config)?,
        source => {
            let input_config = InputConfig::from_args(source, args.file, args.string, args.verbose)?;
            let input = read_input_content(&input_config)?;
            if !run_program(&runtime, &input.content, &config) {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn init_tracing(config: &ReplConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("lispy=debug")
        } else {
            EnvFilter::new(&config.log_filter)
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Evaluates every form of `source`, printing each result or error and, with
/// timing on, the time that form took. Returns false when anything failed.
fn run_program(runtime: &Runtime, source: &str, config: &ReplConfig) -> bool {
    let forms = match parse_forms(source) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("{} {}", "parse error:".red().bold(), e);
            return false;
        }
    };

    let mut ok = true;
    for form in &forms {
        let start = Instant::now();
        let result = runtime.evaluator().evaluate(form);
        let elapsed = start.elapsed();
        match result {
            Ok(value) => println!("{:.*}", config.float_digits, value),
            Err(e) => {
                ok = false;
                eprintln!("{} {}", "error:".red().bold(), e);
            }
        }
        if config.show_timing {
            println!("{}", format!("({:.3?})", elapsed).dim());
        }
    }
    ok
}

/// Drops a partially typed form after an interrupt.
fn discard_pending(buffer: &mut String) {
    // Paint also has a `clear`, and wins method resolution on `&String`
    String::clear(buffer);
}

fn run_interactive_repl(runtime: &Runtime, config: &mut ReplConfig) -> anyhow::Result<()> {
    println!("Lispy REPL. Type :help for commands, :quit to exit.");

    let mut rl = DefaultEditor::new().context("creating line editor")?;
    if let Some(history) = &config.history_file {
        // A missing history file is expected on first start
        let _ = rl.load_history(history);
    }

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            config.prompt.clone()
        } else {
            "  ".to_string()
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim_start().starts_with(':') {
                    let _ = rl.add_history_entry(line.trim());
                    if handle_repl_command(line.trim(), runtime, config) == Flow::Quit {
                        break;
                    }
                    continue;
                }

                buffer.push_str(&line);
                buffer.push('\n');
                if paren_depth(&buffer) > 0 {
                    continue;
                }

                let input = std::mem::take(&mut buffer);
                if input.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input.trim());
                run_program(runtime, &input, config);
            }
            Err(ReadlineError::Interrupted) => {
                discard_pending(&mut buffer);
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(history) = &config.history_file {
        if let Err(e) = rl.save_history(history) {
            tracing::warn!(error = %e, "could not save history");
        }
    }
    Ok(())
}

fn handle_repl_command(cmd: &str, runtime: &Runtime, config: &mut ReplConfig) -> Flow {
    match cmd.split_whitespace().next().unwrap_or("") {
        ":help" | ":h" => show_help(),
        ":env" => {
            let names = runtime.evaluator().env().symbol_names();
            println!("{}", names.join(" "));
        }
        ":time" => {
            config.show_timing = !config.show_timing;
            println!(
                "timing {}",
                if config.show_timing { "on" } else { "off" }
            );
        }
        ":quit" | ":q" => return Flow::Quit,
        other => println!("Unknown command {}. Type :help for commands.", other),
    }
    Flow::Continue
}

fn show_help() {
    println!("Commands:");
    println!("  :help, :h      Show this help");
    println!("  :env           List bindings of the root environment");
    println!("  :time          Toggle elapsed-time printing");
    println!("  :quit, :q      Exit the REPL");
    println!("Unbalanced input continues on the next line.");
}

/// Open-paren balance of `source`, ignoring strings and comments.
fn paren_depth(source: &str) -> i64 {
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut in_comment = false;

    for c in source.chars() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '"' => in_string = true,
            ';' => in_comment = true,
            _ => {}
        }
    }
    depth
}
