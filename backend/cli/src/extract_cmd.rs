//! CLI Extract Command
//!
//! Parses label text from a file or stdin into a single product record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::config::Settings;
use crate::terminal_output::{note_info, render_record};

pub async fn run(settings: &Settings, file: Option<PathBuf>, json: bool) -> Result<()> {
    let text = read_input(file.as_deref()).await?;
    let record = settings.extractor().extract(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print!("{}", render_record(&record));
    if record.is_all_default(settings.config.sentinel()) {
        note_info("No recognised fields in the input.");
    }
    Ok(())
}

/// Read `file`, or all of stdin when no file (or `-`) is given.
async fn read_input(file: Option<&Path>) -> Result<String> {
    match file.filter(|p| p.as_os_str() != "-") {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_label_file() {
        let path = std::env::temp_dir().join(format!("shelfscan-extract-{}.txt", std::process::id()));
        tokio::fs::write(&path, "1. Brand Name: Acme\n").await.unwrap();
        let text = read_input(Some(&path)).await.unwrap();
        assert_eq!(text, "1. Brand Name: Acme\n");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let err = read_input(Some(Path::new("/nonexistent/label.txt"))).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/label.txt"));
    }
}
