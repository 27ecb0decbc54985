//! CLI `chat` and `ask` commands — talk to the assistant from the terminal.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use larder::config::LarderConfig;
use larder::server::build_assistant;

/// Interactive conversation on stdin/stdout. One session lasts until EOF or `/quit`.
pub async fn chat(config: &LarderConfig) -> Result<()> {
    let mut assistant = build_assistant(config)?;

    println!("Cooking Assistant — ask for a recipe. Type /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nyou> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim_end();
        match text {
            "" => continue,
            "/quit" | "/exit" => break,
            "/prompt" => {
                println!("{}", assistant.last_prompt().unwrap_or("(no prompt yet)"));
                continue;
            }
            _ => {}
        }

        match assistant.query(text).await {
            Ok(response) => println!("\nassistant> {response}"),
            Err(e) => eprintln!("\nerror: {e}"),
        }
    }

    println!("Bye! {} exchange(s) this session.", assistant.history().len());
    Ok(())
}

/// Answer a single question and exit.
pub async fn ask(config: &LarderConfig, text: &str, show_prompt: bool) -> Result<()> {
    let mut assistant = build_assistant(config)?;
    let response = assistant.query(text).await?;

    if show_prompt {
        if let Some(prompt) = assistant.last_prompt() {
            eprintln!("{prompt}\n{}", "-".repeat(40));
        }
    }
    println!("{response}");
    Ok(())
}
