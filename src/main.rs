use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use seldon_naming::Result;
use seldon_naming::config::{ENV_DEPLOYMENT_NAME_AS_PREFIX, NamingConfig};
use seldon_naming::naming::NameDeriver;
use seldon_naming::spec::SeldonDeployment;
use seldon_naming::{graph, render, report};

#[derive(Parser)]
#[command(name = "seldon-names")]
#[command(about = "Derive resource names and inspect inference graphs of a SeldonDeployment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List every derived resource name of a deployment.
    Names {
        /// SeldonDeployment JSON file.
        #[arg(short, long)]
        file: String,

        /// Keep the deployment name in front of hashed pod-spec names when it
        /// fits. Also enabled by DEPLOYMENT_NAME_AS_PREFIX=true.
        #[arg(long)]
        deployment_name_as_prefix: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Write to this file instead of stdout.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Query one predictor's graph.
    Graph {
        #[arg(short, long)]
        file: String,

        #[arg(short, long)]
        predictor: String,

        /// Show the first unit with this name.
        #[arg(long, conflicts_with = "engine")]
        unit: Option<String>,

        /// Show the unit the engine runs beside.
        #[arg(long)]
        engine: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Names {
            file,
            deployment_name_as_prefix,
            format,
            out,
        } => {
            let config = NamingConfig::from_env().with_prefix_flag(deployment_name_as_prefix);
            info!(
                "{}={}",
                ENV_DEPLOYMENT_NAME_AS_PREFIX, config.deployment_name_as_prefix
            );

            let sdep = SeldonDeployment::from_path(&file)?;
            let data = report::build_report(&sdep, &NameDeriver::new(config));
            let text = match format {
                Format::Text => render::render_text_report(&data),
                Format::Json => render::render_json_report(&data)?,
            };

            match out {
                Some(out) => {
                    std::fs::write(&out, text)?;
                    println!("Wrote {}", out);
                }
                None => print!("{}", text),
            }
        }

        Commands::Graph {
            file,
            predictor,
            unit,
            engine,
        } => {
            let sdep = SeldonDeployment::from_path(&file)?;
            let Some(p) = sdep.predictor(&predictor) else {
                anyhow::bail!("deployment {} has no predictor {}", sdep.name(), predictor);
            };

            if let Some(name) = unit {
                match graph::find_unit_by_name(&p.graph, &name) {
                    Some(u) => println!("{}", serde_json::to_string_pretty(u)?),
                    None => anyhow::bail!("predictor {} has no unit named {}", predictor, name),
                }
            } else if engine {
                match graph::find_engine_unit(&p.graph) {
                    Some(u) => println!("{}", u.name),
                    None => println!("{} (no localhost endpoint, root)", p.graph.name),
                }
            } else {
                let view = report::build_predictor(&sdep, p, &NameDeriver::default());
                print!("{}", render::render_tree(&view.units, 0));
            }
        }
    }

    Ok(())
}
