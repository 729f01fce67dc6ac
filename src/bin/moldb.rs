use std::path::Path;
use std::{env, fs, io};

use anyhow::{bail, Context};
use serde::Serialize;

use moldb::report::export_csv;
use moldb::{init_tracing, read_smiles_path, DroppedRow, FeatureTable, FilterCriteria, Family};
use moldb::{Pipeline, PipelineConfig};

fn usage() {
    eprintln!(
        "Usage:\n  \
  moldb [--config PATH] registry\n  \
  moldb [--config PATH] extract INPUT.csv\n  \
  moldb [--config PATH] report INPUT.csv '<criteria-json>'\n  \
  moldb [--config PATH] export INPUT.csv '<criteria-json>' [OUTPUT.csv]\n\n  \
  Criteria: {{\"include\": [..], \"exclude\": [..], \"molwt_cutoff\": f, \"logp_cutoff\": f}}\n  \
  Tip: pass @file.json instead of inline JSON\n  \
  Logging: MOLDB_LOG=moldb=debug"
    );
}

fn load_json_arg(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("could not read JSON file '{path}'"))
        }
        None => Ok(value.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn parse_global_config_arg(args: &[String]) -> anyhow::Result<(PipelineConfig, usize)> {
    if args.len() >= 3 && args[1] == "--config" {
        let config = PipelineConfig::load(Path::new(&args[2]))?;
        return Ok((config, 3));
    }
    Ok((PipelineConfig::default(), 1))
}

#[derive(Serialize)]
struct RegistryEntry<'a> {
    name: &'a str,
    label: &'a str,
    family: Family,
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    table: &'a FeatureTable,
    dropped: &'a [DroppedRow],
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        bail!("missing command");
    }

    let (config, cmd_idx) = parse_global_config_arg(&args)?;
    let Some(command) = args.get(cmd_idx) else {
        usage();
        bail!("missing command");
    };
    let rest = &args[cmd_idx + 1..];
    let pipeline = Pipeline::standard(config)?;

    match command.as_str() {
        "registry" => {
            let entries: Vec<RegistryEntry> = pipeline
                .registry()
                .descriptors()
                .iter()
                .map(|d| RegistryEntry {
                    name: d.name,
                    label: d.label,
                    family: d.family,
                })
                .collect();
            print_json(&entries)
        }
        "extract" => {
            let [input] = rest else {
                usage();
                bail!("extract takes exactly one INPUT.csv");
            };
            let rows = read_smiles_path(Path::new(input))?;
            let dataset = pipeline.build_dataset(&rows);
            print_json(&ExtractOutput {
                table: &dataset.table,
                dropped: &dataset.dropped,
            })
        }
        "report" | "export" => {
            let (input, criteria_arg, output) = match rest {
                [input, criteria] => (input, criteria, None),
                [input, criteria, output] if command == "export" => {
                    (input, criteria, Some(output))
                }
                _ => {
                    usage();
                    bail!("{command} takes INPUT.csv and a criteria JSON");
                }
            };
            let criteria_json = load_json_arg(criteria_arg)?;
            let criteria = FilterCriteria::from_json(&criteria_json, pipeline.config())?;

            let session = pipeline.session();
            let rows = read_smiles_path(Path::new(input))?;
            pipeline.upload(&session, &rows);
            let eval = pipeline.evaluate(&session, &criteria)?;

            if command == "report" {
                return print_json(&eval);
            }
            match output {
                Some(path) => {
                    let file = fs::File::create(path)
                        .with_context(|| format!("could not create '{path}'"))?;
                    export_csv(&eval.filtered, file)?;
                }
                None => export_csv(&eval.filtered, io::stdout().lock())?,
            }
            Ok(())
        }
        other => {
            usage();
            bail!("unknown command '{other}'")
        }
    }
}
