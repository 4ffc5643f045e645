use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use todo_cli::app::{App, LineConfirm};
use todo_cli::cli::{Cli, collect_overrides};
use todo_cli::logging::init_logging;
use todo_core::Session;
use todo_core::config::{Config, load_config_with_fallback, merge_overrides};
use todo_core::error::AppError;
use todo_core::storage::FileStore;

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: {err}");
    }
    let overrides = collect_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn open_app(cli: &Cli) -> Result<App<FileStore>, AppError> {
    let config = load_config(&cli.config_override)?;
    let store = FileStore::open_default()?;
    log::debug!("using store at {}", store.root().display());
    Ok(App::new(Session::open(store), config, cli.json))
}

fn run_interactive(app: &mut App<FileStore>) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let stdout = io::stdout();

    app.execute(
        todo_cli::cli::Command::List { filter: None },
        &mut |_: &str| false,
        &mut stdout.lock(),
    )?;

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = app.config().expand_alias(input.trim());
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if app.filter_menu_open() {
            match app.choose_filter_option(line, &mut stdout.lock()) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    eprintln!("ERROR: {}", err);
                    continue;
                }
            }
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todo".to_string());
        argv.extend(args);

        let command = match Cli::try_parse_from(argv) {
            Ok(Cli {
                command: Some(command),
                ..
            }) => command,
            Ok(_) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let mut confirm = LineConfirm::new(&mut stdin_lock);
        if let Err(err) = app.execute(command, &mut confirm, &mut stdout.lock()) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut app = open_app(&cli)?;

    match cli.command {
        None => run_interactive(&mut app),
        Some(command) => {
            let stdin = io::stdin();
            let mut stdin_lock = stdin.lock();
            let mut confirm = LineConfirm::new(&mut stdin_lock);
            app.execute(command, &mut confirm, &mut io::stdout().lock())
        }
    }
}

fn main() {
    let _logger = match init_logging() {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("WARNING: logging disabled: {err}");
            None
        }
    };

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            print!("{err}");
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
