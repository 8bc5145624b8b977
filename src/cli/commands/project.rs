//! `swab save` and `swab open`.

use crate::{
    cli::{EXIT_WRONG_KEY, OpenArgs, SaveArgs},
    error::{CliError, Result},
    service::SwabService,
};

pub async fn save(service: &SwabService, args: &SaveArgs) -> Result<i32> {
    let saved = service.save_project(args.to_payload()?).await?;
    println!("{}", saved.path.display());
    Ok(0)
}

pub async fn open(service: &SwabService, args: &OpenArgs) -> Result<i32> {
    let opened = match service.open_project_file(&args.file).await {
        Ok(opened) => opened,
        Err(e) if e.is_wrong_key() => {
            eprintln!("Error: {e}");
            return Ok(EXIT_WRONG_KEY);
        }
        Err(e) => return Err(e),
    };

    let json = serde_json::to_string_pretty(&opened.to_json()?)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| CliError::ExecutionFailed {
                command: "open".into(),
                reason: format!("cannot write {}: {e}", path.display()),
            })?;
            println!("{}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(0)
}
