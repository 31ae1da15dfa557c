use clap::Parser;
use dirs::home_dir;
use log::{debug, info};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use resolution::{
    cli::{Args, Commands},
    environment::Environment,
    error::Result,
    parser,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    runtime::{self, Value},
    tokenizer::Lexer,
};
use std::{fs, io, path::PathBuf, process::ExitCode};

fn run_file(file: PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)?;
    let resolution = parser::parse(&source)?;
    runtime::eval(&resolution, &mut Environment::new(), &mut io::stdout())
}

fn check_file(file: PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)?;
    let resolution = parser::parse(&source)?;
    println!("{:#?}", resolution);
    Ok(())
}

// The REPL reads one expression per line.
fn eval_line(line: &str, env: &Environment) -> Result<Option<Value>> {
    let mut parser = parser::Parser::new(Lexer::new(line))?;
    let expr = parser.parse_expr(parser::Precedence::Lowest)?;
    Ok(runtime::eval_expr(&expr, env))
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".resolution_history"))
        .and_then(|path| FileBackedHistory::with_file(20, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let prompt = REPLPrompt;
    let env = Environment::new();

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => match eval_line(&buffer, &env) {
                Ok(Some(value)) => println!("{}", value),
                Ok(None) => {}
                Err(err) => eprintln!("{}", err),
            },
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run { file } => {
            info!("FILE MODE");
            debug!("file: {:?}", file);
            run_file(file)
        }
        Commands::Check { file } => {
            info!("CHECK MODE");
            debug!("file: {:?}", file);
            check_file(file)
        }
        Commands::Repl => {
            info!("REPL MODE");
            run_repl()
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
