//! # Command-Line Parameters
//!
//! `key=value` argument parsing in the style of seismic processing tools:
//! every argument after the program name is either `key=value` or a bare
//! `key`, which carries an empty value. When a key repeats, the last
//! occurrence wins. Typed getters fall back to a caller-supplied default
//! when the key is absent or does not parse.

use hashbrown::HashMap;

pub struct Params {
    command: String,
    values: HashMap<String, String>,
}

impl Params {
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = args.next().unwrap_or_default();
        let mut values = HashMap::new();
        for arg in args {
            match arg.split_once('=') {
                Some((key, value)) => values.insert(key.to_string(), value.to_string()),
                None => values.insert(arg, String::new()),
            };
        }
        Self { command, values }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// True when the value starts with `1`, `t`, `T`, `y` or `Y`. A bare key
    /// has an empty value and reads as false.
    pub fn boolean(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(v) => matches!(v.bytes().next(), Some(b'1' | b't' | b'T' | b'y' | b'Y')),
        }
    }
}
