//! `swab build`: submit a job and follow it to a terminal state.

use crate::{
    bundler::{Artifact, JobStatus, PlatformOutcome},
    cli::BuildArgs,
    error::Result,
    service::SwabService,
};

pub async fn execute(service: &SwabService, args: &BuildArgs) -> Result<i32> {
    let id = service.submit(args.to_payload()?)?;
    println!("Build {id} accepted");

    let mut last = None;
    let job = loop {
        let job = service.status(&id)?;
        let line = format!("[{:>3}%] {}: {}", job.progress, job.status, job.message);
        if last.as_ref() != Some(&line) {
            println!("{line}");
            last = Some(line);
        }
        if job.is_terminal() {
            break job;
        }
        tokio::time::sleep(args.poll_interval()).await;
    };
    // Let the worker finish cleanup and webhook dispatch.
    service.wait(&id).await?;

    for (platform, outcome) in &job.outputs {
        match outcome {
            PlatformOutcome::Built(path) => match Artifact::describe(path).await {
                Ok(artifact) => println!(
                    "  {platform}: {} ({} bytes, sha256 {})",
                    artifact.path.display(),
                    artifact.size,
                    artifact.sha256
                ),
                Err(e) => println!("  {platform}: {} ({e})", path.display()),
            },
            PlatformOutcome::Failed(_) => println!("  {platform}: {outcome}"),
        }
    }
    if let Some(keystore) = &job.keystore_path {
        println!("  keystore: {}", keystore.display());
        if let Some(info) = &job.keystore_info_path {
            println!("  keystore credentials: {}", info.display());
        }
    }

    match job.status {
        JobStatus::Completed => Ok(0),
        _ => {
            if let Some(error) = &job.error {
                eprintln!("Error: {error}");
            }
            Ok(1)
        }
    }
}
