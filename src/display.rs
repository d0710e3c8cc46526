//! Console status markers: emoji or bracketed text.

/// The handful of environment facts that decide whether icons are safe to print.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub ssh_connection: bool,
    pub ssh_client: bool,
    pub term: Option<String>,
    /// `std::env::consts::OS` style platform name.
    pub os: String,
}

impl EnvSnapshot {
    /// Capture the live process environment.
    pub fn capture() -> Self {
        Self {
            ssh_connection: std::env::var_os("SSH_CONNECTION").is_some(),
            ssh_client: std::env::var_os("SSH_CLIENT").is_some(),
            term: std::env::var("TERM").ok(),
            os: std::env::consts::OS.to_string(),
        }
    }
}

/// Decide whether the terminal is likely to render emoji.
///
/// Remote sessions and multiplexers/consoles always get plain text; macOS gets
/// icons; everything else defaults to plain.
pub fn detect_emoji_support(env: &EnvSnapshot) -> bool {
    if env.ssh_connection || env.ssh_client {
        return false;
    }

    let term = env.term.as_deref().unwrap_or("").to_lowercase();
    if ["screen", "tmux", "linux"].iter().any(|t| term.contains(t)) {
        return false;
    }

    env.os == "macos"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Failed,
    Timeout,
    Error,
    Testing,
    Results,
    Summary,
}

impl Marker {
    pub fn render(self, emoji: bool) -> &'static str {
        if emoji {
            match self {
                Marker::Success => "✅",
                Marker::Failed => "❌",
                Marker::Timeout => "⏰",
                Marker::Error => "💥",
                Marker::Testing => "🔧",
                Marker::Results => "📊",
                Marker::Summary => "📈",
            }
        } else {
            match self {
                Marker::Success => "[OK]",
                Marker::Failed => "[FAIL]",
                Marker::Timeout => "[TIMEOUT]",
                Marker::Error => "[ERROR]",
                Marker::Testing => "[TEST]",
                Marker::Results => "[RESULTS]",
                Marker::Summary => "[SUMMARY]",
            }
        }
    }
}

/// Marker printer bound to a single emoji decision for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct Markers {
    emoji: bool,
}

impl Markers {
    pub fn new(emoji: bool) -> Self {
        Self { emoji }
    }

    pub fn emoji(&self) -> bool {
        self.emoji
    }

    pub fn get(&self, marker: Marker) -> &'static str {
        marker.render(self.emoji)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> EnvSnapshot {
        EnvSnapshot {
            os: "macos".to_string(),
            term: Some("xterm-256color".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_macos_local_terminal_gets_icons() {
        assert!(detect_emoji_support(&mac()));
    }

    #[test]
    fn test_ssh_disables_icons() {
        let env = EnvSnapshot {
            ssh_client: true,
            ..mac()
        };
        assert!(!detect_emoji_support(&env));

        let env = EnvSnapshot {
            ssh_connection: true,
            ..mac()
        };
        assert!(!detect_emoji_support(&env));
    }

    #[test]
    fn test_multiplexer_term_disables_icons() {
        for term in ["screen-256color", "TMUX", "linux"] {
            let env = EnvSnapshot {
                term: Some(term.to_string()),
                ..mac()
            };
            assert!(!detect_emoji_support(&env), "term {term} should disable icons");
        }
    }

    #[test]
    fn test_linux_defaults_to_plain() {
        let env = EnvSnapshot {
            os: "linux".to_string(),
            term: Some("xterm".to_string()),
            ..Default::default()
        };
        assert!(!detect_emoji_support(&env));
    }

    #[test]
    fn test_plain_markers() {
        let m = Markers::new(false);
        assert_eq!(m.get(Marker::Success), "[OK]");
        assert_eq!(m.get(Marker::Timeout), "[TIMEOUT]");
        assert_eq!(Marker::Failed.render(true), "❌");
    }
}
