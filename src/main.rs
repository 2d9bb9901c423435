use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing_subscriber::filter::LevelFilter;

use evm_source_map::{CompilerConfig, PositionCatalog, Resolver, SolcRunner};

/// Print the source location of compiled instructions.
#[derive(Debug, Parser)]
#[command(name = "evm-source-map", version)]
struct Cli {
    /// Compiler command; `%s` is replaced by the source path.
    #[arg(long = "solc-cmd", value_name = "TEMPLATE")]
    solc_cmd: Option<String>,

    /// More logging on stderr (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit one JSON array instead of text blocks.
    #[arg(long)]
    json: bool,

    /// Contract identifier, `<file>:<Contract>`.
    contract: String,

    /// `PC=INDEX` associations; every position is listed when omitted.
    #[arg(value_name = "PC=INDEX")]
    pairs: Vec<String>,
}

fn parse_pair(pair: &str) -> Result<(usize, usize)> {
    let (pc, index) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PC=INDEX, got `{pair}`"))?;
    let pc = pc.trim().parse().with_context(|| format!("bad pc in `{pair}`"))?;
    let index = index
        .trim()
        .parse()
        .with_context(|| format!("bad position index in `{pair}`"))?;
    Ok((pc, index))
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.solc_cmd {
        Some(template) => CompilerConfig::new(template)?,
        None => CompilerConfig::default(),
    };
    let mut catalog = PositionCatalog::new(config);

    let mut resolver = Resolver::from_contract_id(&cli.contract, &mut catalog, &SolcRunner)
        .with_context(|| format!("failed to load `{}`", cli.contract))?;

    let pairs: Vec<(usize, usize)> = if cli.pairs.is_empty() {
        (0..resolver.positions().len()).map(|i| (i, i)).collect()
    } else {
        cli.pairs
            .iter()
            .map(String::as_str)
            .map(parse_pair)
            .collect::<Result<Vec<_>>>()?
    };

    for &(pc, index) in &pairs {
        resolver.register_position(pc, index)?;
    }

    let pcs = resolver.instr_positions().pcs();

    if cli.json {
        let entries = pcs
            .iter()
            .map(|&pc| -> Result<Value> {
                Ok(json!({
                    "pc": pc,
                    "position": resolver.instr_positions().get(pc)?,
                    "location": resolver.location(pc)?,
                    "source": resolver.source_text_for(pc)?,
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for pc in pcs {
        println!("pc {pc}:");
        println!("{}\n", resolver.formatted_location(pc)?);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let logger = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(logger).is_err() {
        eprintln!("failed to install logger");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pc_index_pairs() {
        assert_eq!(parse_pair("10=3").unwrap(), (10, 3));
        assert_eq!(parse_pair(" 7 = 0 ").unwrap(), (7, 0));
        assert!(parse_pair("10").is_err());
        assert!(parse_pair("x=1").is_err());
    }

    #[test]
    fn cli_accepts_template_and_pairs() {
        let cli = Cli::try_parse_from([
            "evm-source-map",
            "--solc-cmd",
            "solc --asm-json %s",
            "-vv",
            "--json",
            "Foo.sol:Foo",
            "0=0",
            "2=1",
        ])
        .unwrap();
        assert_eq!(cli.solc_cmd.as_deref(), Some("solc --asm-json %s"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert_eq!(cli.contract, "Foo.sol:Foo");
        assert_eq!(cli.pairs, ["0=0", "2=1"]);
    }
}
