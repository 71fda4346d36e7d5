use clap::Parser;
use contract_auditor::{
    analyzer::{
        display,
        security::{PatternCatalog, RuleSet},
        MultiChainAnalyzer, Severity,
    },
    cli::{Cli, Commands, NetworkArg, RuleSetArg, SeverityThreshold},
    config::{self, types::Config},
    fetcher::{self, known_contracts, ContractSourceFetcher},
    AuditorError,
};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Exit status when `--fail-on` finds something.
const FINDINGS_EXIT_CODE: i32 = 2;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            if let AuditorError::Fetch(fetch_error) = &e {
                if let Some(help) = fetch_error.help() {
                    eprintln!("Hint: {}", help);
                }
            }
            process::exit(1);
        }
    }
}

fn run() -> contract_auditor::Result<i32> {
    let cli = Cli::parse();
    cli.init_logging();

    let config = config::load_config(cli.config.as_deref())?;
    let catalog = PatternCatalog::new()?;
    let render = !cli.quiet;

    match cli.command {
        Commands::Analyze {
            file,
            url,
            min_severity,
            fail_on,
        } => handle_analyze(&config, &catalog, file, url, min_severity, fail_on, cli.json, render),
        Commands::Fetch {
            address,
            url,
            analyze,
            output,
            min_severity,
        } => handle_fetch(
            config,
            &catalog,
            address,
            url,
            analyze,
            output,
            min_severity,
            cli.json,
            render,
        ),
        Commands::Rules { set } => handle_rules(&catalog, set, cli.json),
        Commands::Networks => handle_networks(cli.json),
        Commands::Examples { network } => handle_examples(network, cli.json),
    }
}

fn threshold(config: &Config, flag: Option<SeverityThreshold>) -> Severity {
    flag.map(Severity::from).unwrap_or(config.analysis.min_severity)
}

#[allow(clippy::too_many_arguments)]
fn handle_analyze(
    config: &Config,
    catalog: &PatternCatalog,
    file: PathBuf,
    url: Option<String>,
    min_severity: Option<SeverityThreshold>,
    fail_on: Option<SeverityThreshold>,
    json: bool,
    render: bool,
) -> contract_auditor::Result<i32> {
    debug!("Reading {}", file.display());
    let code = fs::read_to_string(&file)?;
    let result = MultiChainAnalyzer::new(catalog).analyze(&code, url.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if render {
        print!("{}", display::render_analysis(&result, threshold(config, min_severity), true));
    }

    let failed = fail_on
        .map(Severity::from)
        .is_some_and(|gate| result.findings_at_least(gate).next().is_some());
    Ok(if failed { FINDINGS_EXIT_CODE } else { 0 })
}

#[allow(clippy::too_many_arguments)]
fn handle_fetch(
    config: Config,
    catalog: &PatternCatalog,
    address: String,
    url: Option<String>,
    analyze: bool,
    output: Option<PathBuf>,
    min_severity: Option<SeverityThreshold>,
    json: bool,
    render: bool,
) -> contract_auditor::Result<i32> {
    let threshold = threshold(&config, min_severity);
    let mut fetcher = ContractSourceFetcher::new(config)?;

    // An explorer page URL carries both the address and the network.
    let contract = match fetcher::parse_explorer_url(&address) {
        Some((addr, network)) => fetcher.fetch_from(network, &addr)?,
        None => fetcher.fetch_contract_source(&address, url.as_deref())?,
    };

    if let Some(path) = &output {
        fs::write(path, &contract.source_code)?;
        debug!("Wrote source to {}", path.display());
    }

    let skip_analysis = analyze && !contract.is_analyzable();
    let analysis = (analyze && contract.is_analyzable()).then(|| {
        MultiChainAnalyzer::new(catalog)
            .analyze(&contract.source_code, Some(contract.explorer_url.as_str()))
    });

    if json {
        let value = serde_json::json!({
            "contract": contract,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if render {
        print!("{}", display::render_contract(&contract));
        if skip_analysis {
            println!("\nNot analyzed: no Solana program source is available, only account metadata.");
        }
        if let Some(result) = &analysis {
            println!();
            print!("{}", display::render_analysis(result, threshold, true));
        }
    }
    Ok(0)
}

fn handle_rules(
    catalog: &PatternCatalog,
    set: Option<RuleSetArg>,
    json: bool,
) -> contract_auditor::Result<i32> {
    let only: Option<RuleSet> = set.map(Into::into);

    if json {
        let rules: Vec<_> = catalog
            .iter()
            .filter(|rule| only.map_or(true, |o| o == rule.set))
            .map(|rule| {
                serde_json::json!({
                    "id": rule.id,
                    "set": rule.set,
                    "vulnerabilityType": rule.vulnerability_type,
                    "severity": rule.severity,
                    "description": rule.description,
                    "cweId": rule.cwe_id,
                    "swcId": rule.swc_id,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else {
        print!("{}", display::render_rules(catalog, only));
    }
    Ok(0)
}

fn handle_networks(json: bool) -> contract_auditor::Result<i32> {
    if json {
        let networks: Vec<_> = fetcher::Network::ALL
            .iter()
            .map(|n| {
                serde_json::json!({
                    "network": n,
                    "description": n.description(),
                    "service": n.service_name(),
                    "explorer": n.explorer_url(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&networks)?);
    } else {
        print!("{}", display::render_networks());
    }
    Ok(0)
}

fn handle_examples(network: Option<NetworkArg>, json: bool) -> contract_auditor::Result<i32> {
    let network: Option<fetcher::Network> = network.map(Into::into);
    let contracts: Vec<_> = match network {
        Some(network) => known_contracts::contracts_on(network).collect(),
        None => known_contracts::known_contracts().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&contracts)?);
    } else {
        print!("{}", display::render_examples(contracts));
    }
    Ok(0)
}
