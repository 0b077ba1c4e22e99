use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use newtonsim::config::{Overrides, RunConfig};
use newtonsim::io::FormatRegistry;
use newtonsim::report::Report;
use newtonsim::{scenario, server};

/// Newton's second law demo: acceleration, motion charts and animation.
#[derive(Parser)]
#[command(name = "newtonsim")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Inputs shared by the subcommands that run a recompute pass
#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
    /// Run configuration file (.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mass of the object in kg
    #[arg(short, long)]
    mass: Option<f64>,

    /// Applied force in N
    #[arg(short, long)]
    force: Option<f64>,

    /// Simulated duration in s
    #[arg(short, long)]
    duration: Option<f64>,

    /// Word problem id (switches to word-problem mode)
    #[arg(short, long)]
    problem: Option<String>,

    /// Animation frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Number of time samples for the charts
    #[arg(long)]
    samples: Option<usize>,

    /// Skip the animation
    #[arg(long)]
    no_animation: bool,
}

impl InputArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            mass: self.mass,
            force: self.force,
            duration: self.duration,
            problem: self.problem.clone(),
            fps: self.fps,
            sample_count: self.samples,
            no_animation: self.no_animation,
        }
    }

    fn load(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_path(path)?,
            None => RunConfig::default(),
        };
        config.apply(&self.overrides());
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pass and write the page and data files
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Output formats (html, json, csv)
        #[arg(long = "format", value_delimiter = ',', default_value = "html")]
        formats: Vec<String>,
    },
    /// Run a pass and print the results
    Compute {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the built-in word problems
    Problems,
    /// Start development server with hot reload
    Serve {
        /// Run configuration file (.yaml) to watch
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Skip the animation
        #[arg(long)]
        no_animation: bool,
    },
}

fn generate(inputs: &InputArgs, output: &Path, formats: &[String]) -> anyhow::Result<()> {
    let run = inputs.load()?.resolve()?;
    let report = Report::build(&run)?;

    let registry = FormatRegistry::with_defaults();
    for format in formats {
        registry.require_writer(format)?.write(&report, output)?;
    }

    println!("{}", report.summary());
    println!("Wrote {} to {}", formats.join(", "), output.display());
    Ok(())
}

fn compute(inputs: &InputArgs, json: bool) -> anyhow::Result<()> {
    let mut config = inputs.load()?;
    // The terminal has no use for frames
    config.animation.enabled = false;
    let report = Report::build(&config.resolve()?)?;

    if json {
        let summary = newtonsim::data_writer::Summary::from_report(&report);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

fn list_problems() {
    for problem in scenario::catalogue() {
        println!(
            "{:<12} {} ({} kg, {} N, {} s)",
            problem.id, problem.title, problem.mass, problem.force, problem.observation_time
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newtonsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate {
            inputs,
            output,
            formats,
        }) => {
            generate(&inputs, &output, &formats)?;
        }
        Some(Commands::Compute { inputs, json }) => {
            compute(&inputs, json)?;
        }
        Some(Commands::Problems) => list_problems(),
        Some(Commands::Serve {
            config,
            output,
            port,
            no_animation,
        }) => {
            let overrides = Overrides {
                no_animation,
                ..Default::default()
            };
            server::serve(&config, &overrides, &output, port).await?;
        }
        None => {
            println!("newtonsim: no command specified. Use --help for usage.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["newtonsim"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_generate_subcommand() {
        let cli = Cli::try_parse_from([
            "newtonsim",
            "generate",
            "--mass",
            "2.5",
            "--problem",
            "sled",
            "--output",
            "site",
            "--format",
            "html,json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate {
                inputs,
                output,
                formats,
            }) => {
                assert_eq!(inputs.mass, Some(2.5));
                assert_eq!(inputs.problem.as_deref(), Some("sled"));
                assert_eq!(output, PathBuf::from("site"));
                assert_eq!(formats, vec!["html", "json"]);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn cli_generate_defaults_to_html() {
        let cli = Cli::try_parse_from(["newtonsim", "generate"]).unwrap();
        match cli.command {
            Some(Commands::Generate {
                inputs,
                output,
                formats,
            }) => {
                assert!(inputs.config.is_none());
                assert!(!inputs.no_animation);
                assert_eq!(output, PathBuf::from("output"));
                assert_eq!(formats, vec!["html"]);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "newtonsim",
            "serve",
            "--config",
            "run.yaml",
            "--port",
            "8080",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve { config, port, .. }) => {
                assert_eq!(config, PathBuf::from("run.yaml"));
                assert_eq!(port, 8080);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn input_args_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "newtonsim", "compute", "-m", "4", "-f", "8", "-d", "3", "--samples", "10",
        ])
        .unwrap();
        let Some(Commands::Compute { inputs, json }) = cli.command else {
            panic!("Expected Compute command");
        };
        assert!(!json);

        let overrides = inputs.overrides();
        assert_eq!(overrides.mass, Some(4.0));
        assert_eq!(overrides.force, Some(8.0));
        assert_eq!(overrides.duration, Some(3.0));
        assert_eq!(overrides.sample_count, Some(10));
        assert!(overrides.problem.is_none());
    }

    #[test]
    fn input_args_load_default_config_without_file() {
        let inputs = InputArgs {
            problem: Some("cart".to_string()),
            ..Default::default()
        };
        let run = inputs.load().unwrap().resolve().unwrap();
        assert_eq!(run.input.acceleration(), 1.5);
    }
}
