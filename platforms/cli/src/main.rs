use bbsteps::{
    render_json, render_json_all, render_text, Champion, ChampionLoader, ChampionRegistry,
    ReportOptions, StepAccumulator, Summary, DEFAULT_DIAGNOSTIC_SWEEPS, DEFAULT_LINE_WIDTH,
};
use clap::{ArgAction, Parser};
use std::io::{self, Read};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Computes the exact number of steps Busy Beaver champions run for.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  bbsteps
  bbsteps 'BB(13,13) champion'
  bbsteps 2 --json
  bbsteps --file champions/bb12x14.bb
  bbsteps --file champions/
  bbsteps --search 13,13
  bbsteps --show 0
  cat my-champion.bb | bbsteps")]
struct Cli {
    /// Name or index of a built-in champion.
    /// If omitted, every built-in champion is computed, unless a descriptor
    /// is given with --file or piped via stdin.
    champion: Option<String>,

    /// Path to a champion descriptor file (.bb), or a directory of them
    #[clap(short, long, conflicts_with = "champion")]
    file: Option<String>,

    /// List the built-in champions and exit
    #[clap(short, long)]
    list: bool,

    /// List the built-in champions whose name contains QUERY and exit
    #[clap(short, long, value_name = "QUERY")]
    search: Option<String>,

    /// Print the descriptor of the built-in champion at INDEX and exit
    #[clap(long, value_name = "INDEX")]
    show: Option<usize>,

    /// Digits per line of the exact step count (0 disables wrapping)
    #[clap(short, long, default_value_t = DEFAULT_LINE_WIDTH)]
    width: usize,

    /// Print the results as JSON
    #[clap(long)]
    json: bool,

    /// Print the leading sweep values and the final sweep length
    #[clap(short = 'd', long, conflicts_with = "no_diagnostics")]
    diagnostics: bool,

    /// Never print sweep diagnostics, even if the descriptor asks for them
    #[clap(long)]
    no_diagnostics: bool,

    /// Give up once this many sweeps have passed without the glider loop exiting
    #[clap(long)]
    max_sweeps: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries nothing but the results.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    if cli.list {
        print_list(0..ChampionRegistry::count());
        return Ok(());
    }

    if let Some(query) = &cli.search {
        print_list(ChampionRegistry::search(query));
        return Ok(());
    }

    if let Some(index) = cli.show {
        let text = ChampionRegistry::text_by_index(index).map_err(|e| e.to_string())?;
        print!("{}", text);
        return Ok(());
    }

    let champions = select_champions(cli)?;
    let mut summaries = Vec::with_capacity(champions.len());

    for champion in &champions {
        let champion = apply_diagnostics(cli, champion);
        let summary =
            StepAccumulator::run_bounded(&champion, cli.max_sweeps).map_err(|e| e.to_string())?;
        summaries.push((champion.diagnostics > 0, summary));
    }

    if cli.json {
        let all: Vec<Summary> = summaries.into_iter().map(|(_, summary)| summary).collect();
        let json = match all.as_slice() {
            [summary] => render_json(summary),
            _ => render_json_all(&all),
        }
        .map_err(|e| format!("Failed to encode JSON: {}", e))?;

        println!("{}", json);
        return Ok(());
    }

    let multiple = summaries.len() > 1;
    for (diagnostics, summary) in &summaries {
        if multiple {
            println!("# {}", summary.name);
        }

        let options = ReportOptions {
            width: cli.width,
            diagnostics: *diagnostics,
        };
        println!("{}", render_text(summary, &options));
    }

    Ok(())
}

/// Resolves which champions to compute from the CLI arguments.
///
/// It tries an explicit name or index, then a descriptor file, then a
/// descriptor piped via stdin, and finally falls back to every built-in champion.
fn select_champions(cli: &Cli) -> Result<Vec<Champion>, String> {
    if let Some(query) = &cli.champion {
        return ChampionRegistry::lookup(query)
            .map(|champion| vec![champion])
            .map_err(|e| e.to_string());
    }

    if let Some(file_path) = &cli.file {
        let path = Path::new(file_path);
        if path.is_dir() {
            return ChampionLoader::load_champions(path)
                .into_iter()
                .map(|result| result.map(|(_, champion)| champion))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string());
        }

        return ChampionLoader::load_champion(path)
            .map(|champion| vec![champion])
            .map_err(|e| e.to_string());
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;

        if !buffer.trim().is_empty() {
            return ChampionLoader::load_champion_from_string(&buffer)
                .map(|champion| vec![champion])
                .map_err(|e| e.to_string());
        }
    }

    Ok(ChampionRegistry::champions())
}

/// Applies the diagnostics flags on top of the descriptor's own setting.
fn apply_diagnostics(cli: &Cli, champion: &Champion) -> Champion {
    let mut champion = champion.clone();

    if cli.no_diagnostics {
        champion.diagnostics = 0;
    } else if cli.diagnostics && champion.diagnostics == 0 {
        champion.diagnostics = DEFAULT_DIAGNOSTIC_SWEEPS;
    }

    champion
}

fn print_list(indices: impl IntoIterator<Item = usize>) {
    for index in indices {
        if let Ok(info) = ChampionRegistry::info(index) {
            println!(
                "{}: {} [{}]",
                info.index,
                info.name,
                info.program.as_deref().unwrap_or("-")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAMPIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../champions");

    #[test]
    fn test_file_accepts_directory() {
        let cli = Cli::try_parse_from(["bbsteps", "--file", CHAMPIONS_DIR]).unwrap();

        let champions = select_champions(&cli).unwrap();
        let names: Vec<&str> = champions.iter().map(|c| c.name.as_str()).collect();

        // File name order: bb12x14.bb, bb13x13-updated.bb, bb13x13.bb
        assert_eq!(
            names,
            vec![
                "BB(12,14) champion",
                "BB(13,13) updated champion",
                "BB(13,13) champion",
            ]
        );
    }

    #[test]
    fn test_file_accepts_single_descriptor() {
        let path = format!("{}/bb13x13.bb", CHAMPIONS_DIR);
        let cli = Cli::try_parse_from(["bbsteps", "--file", path.as_str()]).unwrap();

        let champions = select_champions(&cli).unwrap();
        assert_eq!(champions.len(), 1);
        assert_eq!(champions[0].name, "BB(13,13) champion");
    }

    #[test]
    fn test_search_and_show_flags() {
        let cli = Cli::try_parse_from(["bbsteps", "-s", "updated"]).unwrap();
        assert_eq!(cli.search.as_deref(), Some("updated"));

        let cli = Cli::try_parse_from(["bbsteps", "--show", "1"]).unwrap();
        assert_eq!(cli.show, Some(1));
        assert!(run(&cli).is_ok());

        let cli = Cli::try_parse_from(["bbsteps", "--show", "9"]).unwrap();
        assert!(run(&cli).is_err());
    }
}
