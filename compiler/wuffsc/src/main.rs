//! Wuffs CLI

use wuffsc::commands::{check_files, gen, genlib, genrelease, lex_file, CliError};

fn main() {
    wuffsc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    let rest = &args[2..];

    let result = match command.as_str() {
        "gen" => gen(rest),
        "genlib" => genlib(rest),
        "genrelease" => genrelease(rest),
        "check" => {
            if rest.is_empty() {
                eprintln!("Usage: wuffs check <file.wuffs>...");
                std::process::exit(1);
            }
            check_files(rest)
        }
        "lex" => {
            if rest.len() != 1 {
                eprintln!("Usage: wuffs lex <file.wuffs>");
                std::process::exit(1);
            }
            lex_file(&rest[0])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-v" => {
            println!("wuffs {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => Err(CliError::UnknownCommand(command.clone())),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Wuffs is a tool for managing Wuffs source code.");
    eprintln!();
    eprintln!("Usage: wuffs <command> [arguments]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  gen         generate code for packages and their dependencies");
    eprintln!("  genlib      generate, then build software libraries");
    eprintln!("  genrelease  generate, then write single-file releases");
    eprintln!("  check       verify source files without generating");
    eprintln!("  lex         print a file's tokens");
    eprintln!("  help        show this message");
    eprintln!("  version     show the version");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  -langs c,go      target languages (default: c)");
    eprintln!("  -root DIR        tree holding std/ and gen/ (default: $WUFFS_ROOT,");
    eprintln!("                   else the directory holding wuffs-root-directory.txt)");
    eprintln!("  -skipgendeps     generate only the named packages");
    eprintln!("  -skipgen         genrelease: release the existing generated files");
    eprintln!("  -version V       genrelease: MAJOR.MINOR.PATCH[-ext]");
    eprintln!("  -revision R      genrelease: source revision");
    eprintln!("  -commitdate D    genrelease: source commit date");
    eprintln!();
    eprintln!("Packages default to std/...; a /... suffix includes sub-packages.");
}
