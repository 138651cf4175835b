use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use instant::Duration;
use log::info;

use crossword_csp::backtracking_search::{find_fill, FillFailure, FillOptions, Propagation};
use crossword_csp::grid_config::{generate_grid_config_from_grid, Grid, OPEN_CELL};
use crossword_csp::render::render_grid;
use crossword_csp::word_list::WordList;

#[derive(Parser)]
#[command(name = "fillgrid")]
#[command(version)]
#[command(about = "Fill a crossword grid from a word list")]
struct Cli {
    /// Grid structure file; the open-cell marker is a fillable cell, anything else is a block
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Character marking an open cell in the structure file
    #[arg(long, default_value_t = OPEN_CELL)]
    open_marker: char,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Run full arc consistency after every choice instead of plain forward checking
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let structure = fs::read_to_string(&cli.structure)
        .with_context(|| format!("reading structure file {}", cli.structure.display()))?;
    let words = fs::read_to_string(&cli.words)
        .with_context(|| format!("reading word list {}", cli.words.display()))?;

    let word_list = WordList::from_text(&words);
    info!("loaded {} words", word_list.len());

    let config = generate_grid_config_from_grid(
        word_list,
        Grid::from_template(&structure, cli.open_marker),
    ).with_context(|| format!("building slots for {}", cli.structure.display()))?;
    info!("grid is {}x{} with {} slots", config.grid.height, config.grid.width, config.slot_count());

    let options = FillOptions {
        timeout: cli.timeout_ms.map(Duration::from_millis),
        propagation: if cli.maintain_arc_consistency {
            Propagation::MaintainArcConsistency
        } else {
            Propagation::ForwardChecking
        },
        abort: None,
    };

    match find_fill(&config, &options) {
        Ok(result) => {
            info!("{:?}", result.statistics);
            println!("{}", render_grid(&config, &result.assignment));
        }
        Err(FillFailure::HardFailure(statistics)) => {
            info!("{:?}", statistics);
            println!("No solution.");
        }
        Err(FillFailure::Timeout) => println!("No solution found within the time limit."),
        Err(FillFailure::Abort) => println!("Search aborted."),
        Err(FillFailure::InvalidDomains) => anyhow::bail!("candidate words don't match the grid"),
    }

    Ok(())
}
