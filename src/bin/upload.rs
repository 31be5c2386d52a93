//! Create a Pages deployment from the static build and upload every file.

use std::io::Write;

use ops_dashboard_lib::cloudflare::client::CloudflareClient;
use ops_dashboard_lib::cloudflare::manifest::{
    build_manifest, collect_files, upload_files, UploadEvent, UploadTarget,
};
use ops_dashboard_lib::state::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?
        .cloudflare;
    let client = CloudflareClient::new(config.token()?);

    let account_id = match config.account_id.clone() {
        Some(id) => id,
        None => client.first_account().await?.id,
    };

    println!("Collecting files...");
    let files = collect_files(&config.dist_dir)?;
    println!("Found {} files", files.len());

    println!("Creating deployment...");
    let manifest = build_manifest(&files);
    let deployment = client
        .create_deployment(
            &account_id,
            &config.project_name,
            &config.production_branch,
            &manifest,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create deployment: {e}"))?;
    println!("Deployment created: {}", deployment.id);

    println!("Uploading files...");
    let target = UploadTarget {
        account_id: &account_id,
        project: &config.project_name,
        deployment_id: &deployment.id,
    };
    let mut stdout = std::io::stdout();
    let report = upload_files(&client, &target, files, |event| {
        match event {
            UploadEvent::Started(path) => {
                let _ = write!(stdout, "  Uploading {}... ", path);
                let _ = stdout.flush();
            }
            UploadEvent::Uploaded(_) => {
                let _ = writeln!(stdout, "OK");
            }
            UploadEvent::Failed(_, e) => {
                let _ = writeln!(stdout, "FAILED: {}", e);
            }
        }
    })
    .await;

    println!();
    println!(
        "Deployment complete! {} uploaded, {} failed",
        report.uploaded, report.failed
    );
    if let Some(url) = &deployment.url {
        println!("URL: {}", url);
    }

    Ok(())
}
