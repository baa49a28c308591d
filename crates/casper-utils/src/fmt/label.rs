use std::fmt;

use console::{style, Color};

/**
    Label enum used for consistent diagnostic output from the bootstrap.

    # Example usage

    ```rs
    use casper_utils::fmt::Label;

    eprintln!("{}", Label::Error.line("Unable to open file: missing.js"));
    // [ERROR] Unable to open file: missing.js
    ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Warn,
    Error,
}

impl Label {
    /**
        Returns the name of the label in all uppercase.
    */
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /**
        Returns the color of the label.
    */
    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
        }
    }

    /**
        Formats a single diagnostic line, prefixed with this label.
    */
    #[must_use]
    pub fn line(&self, message: impl fmt::Display) -> String {
        format!("{self} {message}")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            style("[").dim(),
            style(self.name()).fg(self.color()),
            style("]").dim()
        )
    }
}
