//! Line-oriented terminal renderer
//!
//! Reads one message per line from stdin and prints assistant turns as the
//! runtime publishes them. `/new` starts a fresh chat, `/quit` exits.

use crate::llm::{Message, Role};
use crate::runtime::ConversationHandle;
use crate::view::{speaker_label, submit_label, Snapshot, ViewModel};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const BANNER: &str =
    "AI Study Copilot. Type a message and press Enter; /new starts over, /quit exits.";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Submit(&'a str),
    Reset,
    Quit,
}

fn parse_line(line: &str) -> Command<'_> {
    match line.trim() {
        "/new" => Command::Reset,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Submit(line),
    }
}

/// Turns in `snapshot` added since `shown` turns had been printed.
///
/// New turns always land at the back, so they are the last
/// `turns_added - shown` entries, capped at what is still in the history.
pub fn fresh_turns(shown: u64, snapshot: &Snapshot) -> &[Message] {
    let history = &snapshot.history;
    let added = usize::try_from(snapshot.turns_added.saturating_sub(shown))
        .map_or(history.len(), |added| added.min(history.len()));
    &history[history.len() - added..]
}

fn print_turn(turn: &Message) {
    println!("{}: {}", speaker_label(turn.role), turn.content);
}

async fn print_updates(mut updates: watch::Receiver<Snapshot>) {
    let initial = updates.borrow_and_update().clone();
    initial.history.iter().for_each(print_turn);
    let mut shown = initial.turns_added;

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();

        // The user's own lines are already on screen
        fresh_turns(shown, &snapshot)
            .iter()
            .filter(|turn| turn.role != Role::User)
            .for_each(print_turn);
        if snapshot.in_flight {
            println!("[{}]", submit_label(true));
        }

        shown = snapshot.turns_added;
    }
}

/// Drive a conversation from stdin until EOF or `/quit`
pub async fn run(handle: ConversationHandle) -> io::Result<()> {
    println!("{BANNER}");
    let printer = tokio::spawn(print_updates(handle.subscribe()));

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let sent = match parse_line(&line) {
            Command::Quit => break,
            Command::Reset => {
                println!("--- New chat ---");
                handle.reset().await
            }
            Command::Submit(text) => {
                let snapshot = handle.snapshot();
                let view = ViewModel::project(&snapshot, text);
                if view.can_submit {
                    handle.submit(text).await
                } else {
                    if snapshot.in_flight {
                        println!("(still waiting for the previous reply)");
                    }
                    Ok(())
                }
            }
        };

        if let Err(e) = sent {
            tracing::warn!(error = %e, "Stopping input loop");
            break;
        }
    }

    printer.abort();
    Ok(())
}
