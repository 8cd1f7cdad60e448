//! gauge CLI
//!
//! Module-aware test runner for a Go-flavoured language.

mod commands;

use std::path::PathBuf;

use gauge_diagnostic::emitter::ColorMode;
use gaugec::test::WORK_DIR_ENV;
use gaugec::{Scope, TestRunnerConfig};

use commands::{explain_error, init_module, rename_module, run_tests};

/// Exit code for malformed command lines.
const USAGE_EXIT: i32 = 2;

fn main() {
    gaugec::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(USAGE_EXIT);
    }

    let command = &args[1];

    match command.as_str() {
        "test" => {
            let mut config = TestRunnerConfig {
                work_root: std::env::var_os(WORK_DIR_ENV).map(PathBuf::from),
                ..TestRunnerConfig::default()
            };
            let mut targets: Vec<String> = Vec::new();

            for arg in args.iter().skip(2) {
                if let Some(filter) = arg
                    .strip_prefix("--run=")
                    .or_else(|| arg.strip_prefix("--filter="))
                {
                    config.filter = Some(filter.to_string());
                } else if arg == "--verbose" || arg == "-v" {
                    config.verbose = true;
                } else if arg == "--no-parallel" {
                    config.parallel = false;
                } else if arg == "--work" {
                    config.keep_work = true;
                } else if let Some(mode) = arg.strip_prefix("--color=") {
                    let Ok(mode) = mode.parse::<ColorMode>() else {
                        usage_error(&format!("invalid color mode '{mode}' (auto, always, never)"));
                    };
                    config.color = mode;
                } else if arg.starts_with('-') {
                    usage_error(&format!("unknown flag '{arg}'"));
                } else {
                    targets.push(arg.clone());
                }
            }

            let scope = match scope_from_targets(targets) {
                Ok(scope) => scope,
                Err(message) => usage_error(&message),
            };
            run_tests(&scope, &config);
        }
        "mod" => {
            let Some(subcommand) = args.get(2) else {
                eprintln!("Usage: gauge mod <init|rename> <module path>");
                std::process::exit(USAGE_EXIT);
            };
            match subcommand.as_str() {
                "init" => {
                    let mut path = None;
                    let mut version = None;
                    for arg in args.iter().skip(3) {
                        if let Some(v) = arg.strip_prefix("--go=") {
                            version = Some(v.to_string());
                        } else if arg.starts_with('-') {
                            usage_error(&format!("unknown flag '{arg}'"));
                        } else if path.is_none() {
                            path = Some(arg.clone());
                        } else {
                            usage_error("gauge mod init takes one module path");
                        }
                    }
                    let Some(path) = path else {
                        usage_error("missing module path\nUsage: gauge mod init <module path> [--go=<version>]");
                    };
                    init_module(&path, version.as_deref());
                }
                "rename" => {
                    let (Some(path), None) = (args.get(3), args.get(4)) else {
                        usage_error("Usage: gauge mod rename <module path>");
                    };
                    rename_module(path);
                }
                other => {
                    usage_error(&format!("unknown subcommand 'mod {other}'\nValid subcommands: init, rename"));
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" => {
            println!("gauge {}", env!("CARGO_PKG_VERSION"));
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: gauge --explain <ERROR_CODE>");
                eprintln!("Example: gauge --explain E3001");
                std::process::exit(USAGE_EXIT);
            }
            explain_error(&args[2]);
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(USAGE_EXIT);
        }
    }
}

/// Split `gauge test` arguments into a scope.
///
/// Arguments ending in `.go` name files; anything else is a directory
/// pattern. The two kinds cannot be mixed. No arguments means `.`.
fn scope_from_targets(targets: Vec<String>) -> Result<Scope, String> {
    if targets.is_empty() {
        return Ok(Scope::Packages(vec![PathBuf::from(".")]));
    }
    let is_file = |t: &String| t.ends_with(".go");
    if targets.iter().all(is_file) {
        Ok(Scope::Files(targets.into_iter().map(PathBuf::from).collect()))
    } else if targets.iter().any(is_file) {
        Err("cannot mix .go files and package directories".to_string())
    } else {
        Ok(Scope::Packages(targets.into_iter().map(PathBuf::from).collect()))
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("error: {message}");
    eprintln!("Run 'gauge help' for usage.");
    std::process::exit(USAGE_EXIT);
}

fn print_usage() {
    println!("gauge - module-aware test runner");
    println!();
    println!("Usage: gauge <command> [options]");
    println!();
    println!("Commands:");
    println!("  test [packages|files]  Run tests (default: current directory)");
    println!("  mod init <path>        Create go.mod declaring <path>");
    println!("  mod rename <path>      Change the declared module path");
    println!("  --explain <code>       Explain an error code (e.g., E3001)");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    println!("Test options:");
    println!("  --run=<substr>         Only run tests whose name contains <substr>");
    println!("  --filter=<substr>      Same as --run");
    println!("  --verbose, -v          Show every test and its log output");
    println!("  --no-parallel          Test packages one at a time");
    println!("  --work                 Keep the work directory and print its path");
    println!("  --color=<mode>         Diagnostics color: auto, always, never");
    println!();
    println!("Mod init options:");
    println!("  --go=<version>         Toolchain version (default: 1.21)");
    println!();
    println!("Environment:");
    println!("  RUST_LOG               Enable tracing output (e.g. gaugec=debug)");
    println!("  GAUGE_LOG_TREE         Hierarchical tracing output when set");
    println!("  {WORK_DIR_ENV}         Parent directory for work directories");
    println!();
    println!("Examples:");
    println!("  gauge test                      # Test the package in .");
    println!("  gauge test ./...                # Test every package in the module");
    println!("  gauge test main.go main_test.go # Test named files, no import");
    println!("  gauge test --run=Add -v");
    println!("  gauge mod rename example.com/app");
    println!("  gauge --explain E3001");
}
