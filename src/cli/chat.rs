//! Interactive chat loop and single-turn `ask`

use super::output::Output;
use crate::conversation::{ConversationApp, TurnOutput};
use crate::types::Result;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Blank line
    Empty,
    /// `quit` / `exit`
    Quit,
    /// `:state` - show the thread's checkpointed state
    State,
    /// `:facts` - list the user's long-term facts
    Facts,
    /// `:reset` - drop the thread's short-term state
    Reset,
    /// `:forget` - clear long-term facts and reset the thread
    Forget,
    /// `:help`
    Help,
    /// Unrecognized `:command`
    Unknown(String),
    /// Anything else is sent to the graph
    Message(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => ReplCommand::Empty,
            "quit" | "exit" => ReplCommand::Quit,
            ":state" => ReplCommand::State,
            ":facts" => ReplCommand::Facts,
            ":reset" => ReplCommand::Reset,
            ":forget" => ReplCommand::Forget,
            ":help" => ReplCommand::Help,
            cmd if cmd.starts_with(':') => ReplCommand::Unknown(cmd.to_string()),
            message => ReplCommand::Message(message.to_string()),
        }
    }
}

/// Run one turn and print its route and reply
pub async fn ask(
    app: &ConversationApp,
    thread_id: &str,
    message: &str,
    output: &Output,
) -> Result<TurnOutput> {
    let turn = app.invoke(thread_id, message).await?;
    output.reply(turn.route, &turn.response);
    Ok(turn)
}

/// Interactive loop over stdin until `quit`, `exit` or end of input
pub async fn run_chat(app: &ConversationApp, thread_id: &str, output: &Output) -> Result<()> {
    use std::io::BufRead;

    output.banner();
    output.kv("Session", thread_id);
    output.kv("User", app.user_id());
    print_help(output);
    output.newline();

    let stdin = std::io::stdin();

    loop {
        output.prompt();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            output.newline();
            break;
        }

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(output),
            ReplCommand::State => print_state(app, thread_id, output)?,
            ReplCommand::Facts => print_facts(app, output)?,
            ReplCommand::Reset => {
                let removed = app.reset_thread(thread_id)?;
                output.success(&format!("Thread reset ({} checkpoints removed)", removed));
            }
            ReplCommand::Forget => {
                let facts = app.forget_facts()?;
                app.reset_thread(thread_id)?;
                output.success(&format!("Forgot {} long-term facts", facts));
            }
            ReplCommand::Unknown(cmd) => {
                output.warning(&format!("Unknown command: {}", cmd));
                output.hint("Type :help for the list of commands");
            }
            ReplCommand::Message(message) => {
                // A failed turn leaves the thread at its previous checkpoint
                if let Err(e) = ask(app, thread_id, &message, output).await {
                    output.error(&e.to_string());
                }
            }
        }
    }

    Ok(())
}

fn print_help(output: &Output) {
    output.header("Commands");
    output.list_item(":state   show this thread's memory");
    output.list_item(":facts   list stored long-term facts");
    output.list_item(":reset   forget this thread's short-term memory");
    output.list_item(":forget  forget all long-term facts");
    output.list_item("quit     leave");
    output.hint("Messages containing \"remember\" or \"recall\" use long-term memory");
}

fn print_state(app: &ConversationApp, thread_id: &str, output: &Output) -> Result<()> {
    let Some(state) = app.state(thread_id)? else {
        output.info("No turns on this thread yet");
        return Ok(());
    };

    output.header("Thread state");
    output.kv("Turns", &app.history(thread_id)?.len().to_string());
    output.kv("Last message", &state.last_message);
    output.kv(
        "Route",
        state.route.map(|route| route.as_str()).unwrap_or("-"),
    );
    output.kv("Memory context", state.memory_context.trim_start());
    Ok(())
}

fn print_facts(app: &ConversationApp, output: &Output) -> Result<()> {
    let facts = app.facts()?;
    output.header(&format!("Facts ({}/{})", app.namespace(), app.user_id()));
    if facts.is_empty() {
        output.info("Nothing remembered yet");
    }
    for fact in &facts {
        output.list_item(&format!(
            "{}  {}",
            fact.created_at.format("%Y-%m-%d %H:%M"),
            fact.content
        ));
    }
    Ok(())
}
