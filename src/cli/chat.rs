//! Terminal front end: the UI side of the exchange on stdin/stdout.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::EdutorConfig;
use crate::mailbox::{reveal, Exchange};

/// Read user messages line by line and print each reply as it "streams".
/// Ends on EOF or `/sair`.
pub async fn chat(config: &EdutorConfig) -> Result<()> {
    let exchange = Exchange::open(config)?;
    let delay = config.stream_delay();

    println!("Assistente de HTML5. Escreva sua mensagem (/sair para terminar).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nvocê> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "/sair" {
            break;
        }

        let reply = exchange.submit(message).await?;
        print!("assistente> ");
        stream_out(&reply, delay).await?;
        println!();
    }
    Ok(())
}

async fn stream_out(text: &str, delay: Duration) -> Result<()> {
    let mut stdout = std::io::stdout();
    for piece in reveal(text) {
        stdout.write_all(piece.as_bytes())?;
        stdout.flush()?;
        tokio::time::sleep(delay).await;
    }
    Ok(())
}
