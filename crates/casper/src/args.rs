use std::{collections::BTreeMap, fmt};

/**
    The value of a `--name=value` or `--name` command line option.

    Values are cast when parsed: `true` and `false` become booleans,
    numeric text becomes a number, anything else is kept as a string.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl ArgValue {
    /**
        Casts raw option text into the most specific value it represents.
    */
    #[must_use]
    pub fn cast(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => Self::Number(n),
                _ => Self::String(raw.to_string()),
            },
        }
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Number(n) => n.fmt(f),
            Self::String(s) => s.fmt(f),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/**
    Command line arguments split into named options and ordered positionals.

    - `--name=value` sets the option `name` to the cast `value`
    - `--name` sets the option `name` to `true`
    - anything else is a positional argument, kept in order
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    options: BTreeMap<String, ArgValue>,
    args: Vec<String>,
}

impl ParsedArgs {
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();
        for arg in raw {
            let arg = arg.as_ref();
            match arg.strip_prefix("--").filter(|name| !name.is_empty()) {
                Some(option) => match option.split_once('=') {
                    Some((name, value)) => parsed.set_option(name, ArgValue::cast(value)),
                    None => parsed.set_option(option, true),
                },
                None => parsed.push(arg),
            }
        }
        parsed
    }

    /**
        Gets the positional argument at the given index.
    */
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ArgValue> {
        self.options.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    #[must_use]
    pub fn is_truthy(&self, name: &str) -> bool {
        self.option(name).is_some_and(ArgValue::is_truthy)
    }

    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.options.insert(name.into(), value.into());
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /**
        Removes the positional argument at the given index, shifting later ones down.
    */
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.args.len()).then(|| self.args.remove(index))
    }

    /**
        Removes every positional argument equal to the token, leaving options untouched.
    */
    pub fn drop_positional(&mut self, token: &str) {
        self.args.retain(|arg| arg != token);
    }

    /**
        Drops a consumed token.

        If an option with the given name exists it is removed, otherwise every
        positional argument equal to the token is removed. Dropping a token
        that is not present does nothing, and remaining positionals keep their order.
    */
    pub fn drop_token(&mut self, token: &str) {
        if self.options.remove(token).is_none() {
            self.drop_positional(token);
        }
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.options.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /**
        Re-encodes options and positionals as raw command line arguments,
        options first, in a form that [`ParsedArgs::parse`] reads back.
    */
    #[must_use]
    pub fn to_raw(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|(name, value)| match value {
                ArgValue::Bool(true) => format!("--{name}"),
                value => format!("--{name}={value}"),
            })
            .chain(self.args.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_options_and_positionals() {
        let args = ParsedArgs::parse([
            "test",
            "--verbose",
            "tests/suite.js",
            "--log-level=debug",
            "--fail-fast=false",
            "--timeout=2.5",
        ]);

        assert_eq!(args.args(), ["test", "tests/suite.js"]);
        assert_eq!(args.option("verbose"), Some(&ArgValue::Bool(true)));
        assert_eq!(args.option("log-level"), Some(&ArgValue::from("debug")));
        assert_eq!(args.option("fail-fast"), Some(&ArgValue::Bool(false)));
        assert_eq!(args.option("timeout"), Some(&ArgValue::Number(2.5)));
        assert!(!args.is_truthy("fail-fast"));
        assert!(args.is_truthy("verbose"));
        assert!(!args.is_truthy("missing"));
    }

    #[test]
    fn bare_double_dash_is_positional() {
        let args = ParsedArgs::parse(["--", "script.js"]);
        assert_eq!(args.args(), ["--", "script.js"]);
        assert!(!args.has(""));
    }

    #[test]
    fn empty_option_values_are_falsy_strings() {
        let args = ParsedArgs::parse(["--includes="]);
        assert_eq!(args.option("includes"), Some(&ArgValue::from("")));
        assert!(!args.is_truthy("includes"));
    }

    #[test]
    fn drop_token_removes_positionals_in_order() {
        let mut args = ParsedArgs::parse(["selftest", "a.js", "selftest", "b.js"]);
        args.drop_token("selftest");
        assert_eq!(args.args(), ["a.js", "b.js"]);
        args.drop_token("selftest");
        assert_eq!(args.args(), ["a.js", "b.js"]);
    }

    #[test]
    fn drop_token_prefers_options() {
        let mut args = ParsedArgs::parse(["--help", "help"]);
        args.drop_token("help");
        assert!(!args.has("help"));
        assert_eq!(args.args(), ["help"]);
    }

    #[test]
    fn remove_takes_positionals_by_index() {
        let mut args = ParsedArgs::parse(["test", "suite.js", "--test"]);
        assert_eq!(args.remove(0).as_deref(), Some("test"));
        assert_eq!(args.args(), ["suite.js"]);
        assert!(args.is_truthy("test"));
        assert_eq!(args.remove(3), None);
    }

    #[test]
    fn drop_positional_ignores_options() {
        let mut args = ParsedArgs::parse(["main.js", "--main.js", "main.js", "x"]);
        args.drop_positional("main.js");
        assert_eq!(args.args(), ["x"]);
        assert!(args.has("main.js"));
    }

    #[test]
    fn to_raw_reads_back_the_same() {
        let args = ParsedArgs::parse(["suite.js", "--xunit=log.xml", "--pre", "--retries=3"]);
        let raw = args.to_raw();
        assert_eq!(raw, ["--pre", "--retries=3", "--xunit=log.xml", "suite.js"]);
        assert_eq!(ParsedArgs::parse(raw), args);
    }
}
