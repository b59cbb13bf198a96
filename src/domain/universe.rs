//! Ticker universe: the static list of codes screened in one run.
//!
//! Codes come from configuration (`codes = A,B,C`) or from a universe file
//! with one or more comma-separated codes per line and `#` comments.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub codes: Vec<String>,
    pub exchange: String,
}

impl Universe {
    pub fn new(codes: Vec<String>, exchange: impl Into<String>) -> Result<Self, UniverseError> {
        if codes.is_empty() {
            return Err(UniverseError::Empty);
        }
        Ok(Self {
            codes,
            exchange: exchange.into(),
        })
    }

    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("universe contains no codes")]
    Empty,
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();
    push_codes(input, &mut codes, &mut seen)?;
    Ok(codes)
}

pub fn parse_universe_file(content: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for line in content.lines() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        };
        let line = line.trim().trim_end_matches(',');
        if line.is_empty() {
            continue;
        }
        push_codes(line, &mut codes, &mut seen)?;
    }

    if codes.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(codes)
}

fn push_codes(
    input: &str,
    codes: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> Result<(), UniverseError> {
    for token in input.split(',') {
        let trimmed = token.trim().trim_matches('"');
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_basic() {
        let result = parse_codes("INFY,TCS,WIPRO,SBIN").unwrap();
        assert_eq!(result, vec!["INFY", "TCS", "WIPRO", "SBIN"]);
    }

    #[test]
    fn test_parse_codes_with_whitespace() {
        let result = parse_codes("  INFY , TCS ,WIPRO,  SBIN  ").unwrap();
        assert_eq!(result, vec!["INFY", "TCS", "WIPRO", "SBIN"]);
    }

    #[test]
    fn test_parse_codes_uppercase_and_punctuation() {
        let result = parse_codes("m&m,bajaj-auto,infy.ns").unwrap();
        assert_eq!(result, vec!["M&M", "BAJAJ-AUTO", "INFY.NS"]);
    }

    #[test]
    fn test_parse_codes_empty_token() {
        assert!(matches!(parse_codes("INFY,,TCS"), Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn test_parse_codes_duplicate() {
        let result = parse_codes("INFY,TCS,infy");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "INFY"));
    }

    #[test]
    fn test_parse_universe_file() {
        let content = "# IT\nINFY\nTCS, WIPRO,\n\n# Banks\nSBIN  # state bank\n\"HDFCBANK\"\n";
        let result = parse_universe_file(content).unwrap();
        assert_eq!(result, vec!["INFY", "TCS", "WIPRO", "SBIN", "HDFCBANK"]);
    }

    #[test]
    fn test_parse_universe_file_duplicate_across_lines() {
        let result = parse_universe_file("INFY\nTCS\nINFY\n");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "INFY"));
    }

    #[test]
    fn test_parse_universe_file_only_comments() {
        let result = parse_universe_file("# nothing here\n\n");
        assert!(matches!(result, Err(UniverseError::Empty)));
    }

    #[test]
    fn test_universe_count() {
        let universe = Universe::new(vec!["INFY".to_string(), "TCS".to_string()], "NSE").unwrap();
        assert_eq!(universe.count(), 2);
        assert_eq!(universe.exchange, "NSE");
    }

    #[test]
    fn test_universe_rejects_empty() {
        assert!(matches!(Universe::new(vec![], "NSE"), Err(UniverseError::Empty)));
    }
}
