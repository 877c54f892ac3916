use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

use crate::error::Error;

/// Settings read from a YAML file. Command line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of input bytes decoded; 0 means unlimited.
    pub capacity: usize,
    /// Print the address/bytes/text dump.
    pub dump: bool,
    /// Listing destination; stdout when absent.
    pub output: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| Error::Config(path.to_string(), e))
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_yaml::from_str(text).map_err(|e| Error::Config("<inline>".to_string(), e))
    }

    /// Bytes that fit in the configured capacity, and whether any were cut.
    pub fn clip<'a>(&self, bytes: &'a [u8]) -> (&'a [u8], bool) {
        if self.capacity == 0 || bytes.len() <= self.capacity {
            (bytes, false)
        } else {
            (&bytes[..self.capacity], true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_full() {
        let cfg = Config::parse(indoc! {"
            capacity: 128
            dump: true
            output: out.asm
        "})
        .unwrap();
        assert_eq!(
            cfg,
            Config {
                capacity: 128,
                dump: true,
                output: Some("out.asm".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(Config::parse("dump: true").unwrap().capacity, 0);
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::parse("capacity: lots"),
            Err(Error::Config(..))
        ));
    }

    #[test]
    fn test_clip() {
        let bytes = [1, 2, 3, 4];
        let unlimited = Config::default();
        assert_eq!(unlimited.clip(&bytes), (&bytes[..], false));
        let small = Config {
            capacity: 2,
            ..Config::default()
        };
        assert_eq!(small.clip(&bytes), (&bytes[..2], true));
        let exact = Config {
            capacity: 4,
            ..Config::default()
        };
        assert_eq!(exact.clip(&bytes), (&bytes[..], false));
    }
}
