use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for vista")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy and the full test suite
    Check,
    /// Run all tests
    Test,
    /// Run only the renderer integration scenarios
    Scenarios,
    /// Run the terrain meshing benchmark in release mode
    Bench,
    /// Render demo frames on the recording device and print the JSON report
    Smoke {
        /// Also render one frame through wgpu
        #[arg(long)]
        gpu: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            cargo(
                "clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )?;
            cargo("test", &["test", "--workspace"])?;
        }
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Scenarios => cargo(
            "scenarios",
            &["test", "-p", "vista-render", "--test", "scenarios"],
        )?,
        Commands::Bench => cargo(
            "terrain bench",
            &[
                "bench",
                "-p",
                "vista-terrain",
                "--bench",
                "bench_tile_mesh",
            ],
        )?,
        Commands::Smoke { gpu } => {
            cargo(
                "headless frame",
                &[
                    "run", "-p", "vista-cli", "--", "frame", "--frames", "3", "--lights", "3",
                    "--terrain", "2", "--json",
                ],
            )?;
            if gpu {
                cargo("gpu frame", &["run", "-p", "vista-cli", "--", "gpu"])?;
            }
        }
    }

    Ok(())
}

fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> {what}: cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed ({status})");
    }
    Ok(())
}
