//! revbrowse - Revision-aware repository browsing
//!
//! This is the main entry point for the revbrowse command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use revbrowse::browse::{Listing, RowKind};
use revbrowse::browser::{BrowserConfig, RepoBrowser};
use revbrowse::storage::{CommitInfo, RevisionNumber};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut repo = PathBuf::from(".");
    let mut root_folder = String::new();
    let mut branch: Option<String> = None;
    let mut revision: Option<RevisionNumber> = None;
    let mut previous: Option<String> = None;
    let mut sanitize: Option<String> = None;
    let mut path = String::new();
    let mut json = false;
    let mut history = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--repository" => {
                i += 1;
                if i < args.len() {
                    repo = PathBuf::from(&args[i]);
                }
            }
            "--root" => {
                i += 1;
                if i < args.len() {
                    root_folder = args[i].clone();
                }
            }
            "--branch" => {
                i += 1;
                if i < args.len() {
                    branch = Some(args[i].clone());
                }
            }
            "-r" | "--revision" => {
                i += 1;
                match args.get(i).map(|s| s.parse::<u64>()) {
                    Some(Ok(n)) => revision = Some(RevisionNumber::new(n)),
                    _ => {
                        eprintln!("--revision expects a number");
                        return ExitCode::FAILURE;
                    }
                }
            }
            "--previous" => {
                i += 1;
                if i < args.len() {
                    previous = Some(args[i].clone());
                }
            }
            "--sanitize" => {
                i += 1;
                if i < args.len() {
                    sanitize = Some(args[i].clone());
                }
            }
            "--json" => {
                json = true;
            }
            "--history" => {
                history = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("revbrowse v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                // Treat as the path to list if no flag.
                if !arg.starts_with('-') {
                    path = arg.to_string();
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    init_logging(verbose);

    let mut config = BrowserConfig::new(&repo).root_folder(root_folder);
    if let Some(branch) = branch {
        config = config.branch(branch);
    }

    let browser = match RepoBrowser::open_with_config(config) {
        Ok(browser) => browser,
        Err(e) => {
            eprintln!("Error opening repository: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(name) = sanitize {
        println!("{}", browser.sanitize(Some(&name)));
        return ExitCode::SUCCESS;
    }

    if history {
        return match browser.history(None) {
            Ok(revisions) => {
                print_history(&revisions);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut request = browser.request(path);
    if let Some(previous) = previous {
        request = request.previous_path(previous);
    }

    match browser.listing(revision, &request) {
        Ok(listing) => {
            if json {
                match serde_json::to_string_pretty(&listing) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_listing(&listing);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "revbrowse=debug" } else { "revbrowse=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("revbrowse - Revision-aware repository browsing");
    println!();
    println!("Usage: revbrowse [OPTIONS] [PATH]");
    println!();
    println!("Options:");
    println!("  -d, --repository PATH  Repository to browse (default: .)");
    println!("      --root FOLDER      Folder that PATH is relative to");
    println!("      --branch NAME      Branch to number revisions along (default: main)");
    println!("  -r, --revision N       Revision to list (default: latest)");
    println!("      --previous PATH    Directory the \"go up\" row leads to (default: parent of PATH)");
    println!("      --sanitize NAME    Print NAME as a safe file name and exit");
    println!("      --json             Print the listing as JSON");
    println!("      --history          List the branch's revisions and exit");
    println!("  -v, --verbose          Enable debug logging");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  revbrowse -d group_0001 --root A1          List A1 at the latest revision");
    println!("  revbrowse -d group_0001 --root A1 -r 3 src List A1/src as of revision 3");
}

fn print_history(revisions: &[(RevisionNumber, CommitInfo)]) {
    for (number, info) in revisions {
        println!(
            "r{:<6} {} {} {:<20} {}",
            number,
            info.id.short(),
            info.timestamp.format("%Y-%m-%d %H:%M"),
            info.author_name,
            info.summary()
        );
    }
}

fn print_listing(listing: &Listing) {
    if let Some(missing) = listing.missing_metadata() {
        eprintln!("warning: {}", missing);
    }
    if listing.is_empty() {
        println!("(empty)");
        return;
    }

    for row in listing.rows() {
        let marker = match row.kind {
            RowKind::Exit => "^",
            RowKind::Directory => "d",
            RowKind::File => "-",
        };
        println!(
            "{} {:<32} r{:<6} {:<20} {}",
            marker,
            row.name,
            row.last_modified_revision,
            row.revision_by,
            row.last_revised_date.format("%Y-%m-%d %H:%M")
        );
    }
    println!("({} entries)", listing.len());
}
