//! CLI `doctor` command: check that every piece a conversation needs is in place.

use anyhow::Result;

use crate::config::EdutorConfig;
use crate::db;
use crate::embedding::local::model_files;
use crate::index::types::ContentClass;
use crate::mailbox::{FileMailbox, Mailbox, ASSISTANT, USER};

/// Print a readiness report. Problems are reported, not returned as errors.
pub fn doctor(config: &EdutorConfig) -> Result<()> {
    let mut problems = 0;

    println!("Edutor Health Report");
    println!("====================");
    println!();

    println!("Mailboxes:");
    for (name, path) in [
        (USER, config.user_mailbox_path()),
        (ASSISTANT, config.assistant_mailbox_path()),
    ] {
        if !path.exists() {
            println!("  {name:<10} not created yet ({})", path.display());
            continue;
        }
        match FileMailbox::create(&path, name).and_then(|m| m.len()) {
            Ok(len) => println!("  {name:<10} {len} message(s) in {}", path.display()),
            Err(e) => {
                problems += 1;
                println!("  {name:<10} UNREADABLE: {e:#}");
            }
        }
    }
    println!();

    println!("Indexes:");
    for class in ContentClass::ALL {
        let dir = config.index_dir(class);
        if !db::index_file(&dir).exists() {
            problems += 1;
            println!("  {:<10} missing; run `edutor index build --class {class}`", class.as_str());
            continue;
        }
        let report = db::open_index(&dir).and_then(|conn| db::check_index_health(&conn));
        match report {
            Ok(h) if !h.integrity_ok => {
                problems += 1;
                println!("  {:<10} integrity check FAILED ({})", class.as_str(), h.integrity_details);
            }
            Ok(h) if h.content_class.as_deref() != Some(class.as_str()) => {
                problems += 1;
                println!(
                    "  {:<10} holds {} content; rebuild it",
                    class.as_str(),
                    h.content_class.as_deref().unwrap_or("unknown")
                );
            }
            Ok(h) => {
                let model = h.embedding_model.as_deref().unwrap_or("(not set)");
                let note = if model == config.embedding.model { "" } else { " (model mismatch: rebuild)" };
                println!("  {:<10} {} chunk(s), model {model}{note}", class.as_str(), h.chunk_count);
            }
            Err(e) => {
                problems += 1;
                println!("  {:<10} UNREADABLE: {e:#}", class.as_str());
            }
        }
    }
    println!();

    let (model_path, tokenizer_path) = model_files(&config.embedding);
    println!("Embedding model:");
    for path in [&model_path, &tokenizer_path] {
        if path.exists() {
            println!("  ok         {}", path.display());
        } else {
            problems += 1;
            println!("  missing    {}; run `edutor model download`", path.display());
        }
    }
    println!();

    println!("Language model:");
    println!("  {} via {}", config.llm.model, config.llm.base_url);
    if std::env::var_os(&config.llm.api_key_env).is_some() {
        println!("  API key    set ({})", config.llm.api_key_env);
    } else {
        problems += 1;
        println!("  API key    NOT SET; export {}", config.llm.api_key_env);
    }
    println!();

    if problems == 0 {
        println!("All checks passed.");
    } else {
        println!("{problems} problem(s) found.");
    }
    Ok(())
}
