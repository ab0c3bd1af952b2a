use anyhow::{Result, bail};

/// Where a picked object goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Hand the object over to the user.
    Hand,
    /// Put the object down on the table.
    Table,
}

/// A single pick-and-place task: which object to take and where to put it.
/// The special object id "hand" means "take whatever the user is holding".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub object: String,
    pub target: Target,
}

impl Instruction {
    pub fn takes_from_hand(&self) -> bool {
        self.object == "hand"
    }
}

/// A parsed text instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Task(Instruction),
}

impl Command {
    /// Parse an instruction of the form `"<object> <target>"` or `"exit"`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == "exit" {
            return Ok(Command::Exit);
        }
        let mut parts = text.split_whitespace();
        let (Some(object), Some(target), None) = (parts.next(), parts.next(), parts.next()) else {
            bail!("expected '<object> <target>' or 'exit', got '{}'", text);
        };
        let target = match target {
            "hand" => Target::Hand,
            "table" => Target::Table,
            other => bail!("unknown target '{}', expected 'hand' or 'table'", other),
        };
        Ok(Command::Task(Instruction { object: object.to_string(), target }))
    }
}
