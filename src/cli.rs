use anyhow::{bail, Result};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub release_version: Option<String>,
    pub verbose: bool,
    pub help: bool,
}

/// Parse command-line arguments (without the program name).
///
/// Supported forms:
///   deliverynote
///   deliverynote --config ./deliverynote.toml
///   deliverynote -c ./deliverynote.toml --release-version 1.2.0 -v
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => parsed.config = Some(PathBuf::from(path)),
                    None => bail!("Missing value for -c/--config flag"),
                }
            }
            "-r" | "--release-version" => {
                i += 1;
                match args.get(i) {
                    Some(version) if !version.trim().is_empty() => {
                        parsed.release_version = Some(version.clone())
                    }
                    _ => bail!("Missing value for -r/--release-version flag"),
                }
            }
            "-v" | "--verbose" => parsed.verbose = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("Unknown argument '{other}'. Run with --help for usage."),
        }
        i += 1;
    }

    Ok(parsed)
}

pub fn print_help() {
    println!("deliverynote — publish HP ALM defects as release notes\n");
    println!("USAGE:");
    println!("  deliverynote [OPTIONS]\n");
    println!("OPTIONS:");
    println!("  -c, --config <path>            Config file (default: ~/.deliverynote/config.toml)");
    println!("  -r, --release-version <ver>    Release version written to changes.xml");
    println!("  -v, --verbose                  Debug logging (RUST_LOG overrides)");
    println!("  -h, --help                     Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  HPALM_USER, HPALM_PASSWORD                       HP ALM credentials");
    println!("  HPALM_CONFLUENCE_USER, HPALM_CONFLUENCE_PASSWORD Confluence credentials");
}
