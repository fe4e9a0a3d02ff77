use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::docker::DockerManager;

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct HostInfo {
    name: &'static str,
    version: &'static str,
    os: &'static str,
    arch: &'static str,
    docker_available: bool,
}

pub async fn run(args: InfoArgs) -> Result<()> {
    let info = HostInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        docker_available: DockerManager::is_available().await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{} {}", style(info.name).bold(), info.version);
        println!("os: {} ({})", info.os, info.arch);
        println!(
            "docker: {}",
            if info.docker_available {
                style("available").green()
            } else {
                style("unavailable").red()
            }
        );
    }
    Ok(())
}
