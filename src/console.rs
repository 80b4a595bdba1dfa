use crate::sample_loop::LoopCommand;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Read console lines and turn them into loop commands.
///
/// Runs on a plain thread: a blocking stdin read cannot be cancelled, and
/// a detached thread does not hold up process exit the way a runtime
/// blocking task would.
pub fn spawn_zero_trigger(command_tx: mpsc::UnboundedSender<LoopCommand>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(?e, "Console read failed, zero trigger disabled");
                        return;
                    }
                };
                match parse_command(&line) {
                    Some(cmd) => {
                        if command_tx.send(cmd).is_err() {
                            return;
                        }
                    }
                    None => info!(input = line.trim(), "Unknown command (Enter or 'z' sets zero)"),
                }
            }
        })?;
    Ok(())
}

fn parse_command(line: &str) -> Option<LoopCommand> {
    match line.trim() {
        "" | "z" | "zero" => Some(LoopCommand::SetZero),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_or_z_sets_zero() {
        assert_eq!(parse_command(""), Some(LoopCommand::SetZero));
        assert_eq!(parse_command("  z \r"), Some(LoopCommand::SetZero));
        assert_eq!(parse_command("zero"), Some(LoopCommand::SetZero));
        assert_eq!(parse_command("q"), None);
    }
}
