use clap::Parser;
use std::path::Path;

mod cli;

const BUNDLE_DIR: &str = "Tavern";

async fn run(cmd: &mut tokio::process::Command) -> Result<(), Box<dyn std::error::Error>> {
    let status = cmd.spawn()?.wait().await?;
    if !status.success() {
        return Err(format!("{:?} exited with {}", cmd.as_std().get_program(), status).into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Launch { args } => {
            let mut cmd = tokio::process::Command::new("trunk");
            cmd.current_dir(std::fs::canonicalize("frontend")?);
            cmd.arg("build");
            run(&mut cmd).await?;

            let mut cmd = tokio::process::Command::new("cargo");
            cmd.arg("run")
                .arg("--package")
                .arg("tavern-launcher")
                .arg("--")
                .arg("--dist-dir")
                .arg("frontend/dist")
                .args(args);
            run(&mut cmd).await?;

            Ok(())
        }
        cli::Command::Dist { target_triple } => {
            let mut cmd = tokio::process::Command::new("cargo");
            cmd.arg("build")
                .arg("--package")
                .arg("tavern-launcher")
                .arg("--release");
            if let Some(target_triple) = &target_triple {
                cmd.arg("--target").arg(target_triple);
            }
            run(&mut cmd).await?;

            let mut cmd = tokio::process::Command::new("trunk");
            cmd.current_dir(std::fs::canonicalize("frontend")?);
            cmd.arg("build").arg("--release");
            run(&mut cmd).await?;

            let binary = match &target_triple {
                Some(triple) => format!("target/{}/release/tavern-launcher", triple),
                None => "target/release/tavern-launcher".to_string(),
            };
            let dist = Path::new(BUNDLE_DIR).join("dist");
            tokio::fs::create_dir_all(&dist).await?;
            tokio::fs::copy(&binary, Path::new(BUNDLE_DIR).join("tavern-launcher")).await?;

            let mut entries = tokio::fs::read_dir("frontend/dist").await?;
            while let Some(file) = entries.next_entry().await? {
                if file.file_type().await?.is_file() {
                    tokio::fs::copy(file.path(), dist.join(file.file_name())).await?;
                }
            }

            Ok(())
        }
    }
}
