//! Slash-command parsing.

/// Commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/vincular <código>`
    Link(Option<String>),
    /// `/cambiar_org`
    SwitchOrg,
    /// `/help`
    Help,
    /// Anything else starting with `/`.
    Unknown(String),
}

impl Command {
    /// Parse command text. Matching ignores case, surrounding whitespace and
    /// a `@botname` suffix on the command word.
    pub fn parse(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        let (word, rest) = match normalized.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (normalized.as_str(), ""),
        };
        let word = word.split('@').next().unwrap_or(word);

        match word {
            "/start" => Command::Start,
            "/cambiar_org" => Command::SwitchOrg,
            "/help" => Command::Help,
            w if w.starts_with("/vincular") => {
                Command::Link(Some(rest.to_string()).filter(|code| !code.is_empty()))
            }
            _ => Command::Unknown(word.to_string()),
        }
    }
}
