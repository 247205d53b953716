#![deny(clippy::all, clippy::pedantic)]

use std::io::{BufRead, Write};

use async_trait::async_trait;
use libris::application::{ConfirmGate, ConfirmPrompt, Notifier, NotifyKind};
use tracing::debug;

/// Asks on stderr and reads the answer from stdin. EOF or a read error
/// counts as a decline.
pub struct StdinConfirm;

#[async_trait]
impl ConfirmGate for StdinConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        let question = format!(
            "{}: {} [{}/{}] ",
            prompt.title, prompt.description, prompt.confirm_text, prompt.cancel_text
        );
        let confirm_text = prompt.confirm_text;

        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr().lock();
            stderr.write_all(question.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok::<_, std::io::Error>(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => accepts(&line, confirm_text),
            Ok(Err(err)) => {
                debug!(error = %err, "confirmation prompt failed");
                false
            }
            Err(err) => {
                debug!(error = %err, "confirmation task failed");
                false
            }
        }
    }
}

pub fn accepts(answer: &str, confirm_text: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || answer.eq_ignore_ascii_case(confirm_text)
}

/// Prints notifications on stderr so stdout stays machine readable.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        debug!(?kind, "notification");
        eprintln!("{message}");
    }
}
