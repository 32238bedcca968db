use crate::cli::{BillsCommand, Commands};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Bills { command } => match command {
            BillsCommand::Process { json, .. }
            | BillsCommand::Status { json, .. }
            | BillsCommand::Due { json, .. }
            | BillsCommand::Pay { json, .. } => *json,
        },
        Commands::Match { json, .. }
        | Commands::Reconcile { json, .. }
        | Commands::Payday { json, .. } => *json,
    };

    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
