#[cfg(test)]
#[path = "slash_command_test.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let args = parts.map(|e| return e.to_string()).collect();

        return Some(SlashCommand { command, args });
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_summary(&self) -> bool {
        return ["/s", "/summary", "/summarize"].contains(&self.command.as_str());
    }

    pub fn is_record(&self) -> bool {
        return ["/r", "/record"].contains(&self.command.as_str());
    }

    pub fn is_theme(&self) -> bool {
        return self.command == "/theme";
    }

    pub fn is_panel(&self) -> bool {
        return ["/p", "/panel"].contains(&self.command.as_str());
    }
}
