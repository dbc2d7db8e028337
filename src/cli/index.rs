//! `index build` and `index stats`.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::EdutorConfig;
use crate::db;
use crate::index::build::build_index;
use crate::index::types::ContentClass;

/// Build the index of `class`, or of every class when `None`.
pub fn build(config: &EdutorConfig, class: Option<ContentClass>) -> Result<()> {
    let provider = crate::embedding::create_provider(&config.embedding)?;
    let all = class.is_none();
    let classes: Vec<ContentClass> = match class {
        Some(c) => vec![c],
        None => ContentClass::ALL.to_vec(),
    };

    for class in classes {
        let source_dir = config.source_dir(class);
        if all && !source_dir.is_dir() {
            println!("Skipping {class}: no source directory at {}", source_dir.display());
            continue;
        }
        println!("Building {class} index from {}", source_dir.display());

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {pos}/{len} chunks ({eta})")?
                .progress_chars("##-"),
        );

        let report = build_index(
            &config.index_dir(class),
            class,
            &source_dir,
            *config.index.chunk_tokens.get(class),
            provider.as_ref(),
            &config.embedding.model,
            Some(&pb),
        )?;
        pb.finish_and_clear();

        println!(
            "  {} chunk(s) from {} file(s) -> {}",
            report.chunks,
            report.sources,
            report.path.display()
        );
    }
    Ok(())
}

/// Print a summary of every configured index.
pub fn stats(config: &EdutorConfig) -> Result<()> {
    println!("Index Statistics");
    println!("{}", "=".repeat(40));

    for class in ContentClass::ALL {
        let dir = config.index_dir(class);
        let path = db::index_file(&dir);
        println!();
        println!("{class}:");

        if !path.exists() {
            println!("  (not built) expected at {}", path.display());
            continue;
        }

        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let conn = db::open_index(&dir)?;
        let health = db::check_index_health(&conn)?;

        println!("  Path:            {}", path.display());
        println!("  Size:            {}", super::format_bytes(size));
        println!("  Chunks:          {}", health.chunk_count);
        println!("  Source files:    {}", health.source_count);
        println!(
            "  Model:           {}",
            health.embedding_model.as_deref().unwrap_or("(not set)")
        );
        println!(
            "  Built at:        {}",
            health.built_at.as_deref().unwrap_or("(unknown)")
        );
        if health.content_class.as_deref() != Some(class.as_str()) {
            println!(
                "  WARNING: index holds {} content",
                health.content_class.as_deref().unwrap_or("unknown")
            );
        }
    }
    Ok(())
}
