// Figment provider for flat libconfig files.
//
// The provisioning tool writes the credentials file in libconfig syntax:
// `name = value;` with `=` or `:` as separator and an optional `;` or `,`
// terminator. Only top-level scalar settings are understood (strings,
// integers, floats, booleans); groups, arrays and lists are rejected.
// `#`, `//` and `/* */` comments are skipped. Adjacent string literals are
// concatenated.

use figment::value::{Dict, Map, Value};
use figment::{Error, Metadata, Profile, Provider};

/// A libconfig document held in memory.
pub(crate) struct Libconfig<'a> {
    text: &'a str,
}

impl<'a> Libconfig<'a> {
    pub(crate) fn string(text: &'a str) -> Self {
        Self { text }
    }
}

impl Provider for Libconfig<'_> {
    fn metadata(&self) -> Metadata {
        Metadata::named("libconfig")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let dict = Parser::new(self.text).settings().map_err(Error::from)?;
        Ok(Profile::Default.collect(dict))
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn settings(mut self) -> Result<Dict, String> {
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek().is_none() {
                return Ok(dict);
            }
            let line = self.line;
            let name = self.name()?;
            self.skip_trivia()?;
            match self.bump() {
                Some('=' | ':') => {}
                _ => return Err(self.fail(&format!("expected '=' or ':' after '{name}'"))),
            }
            self.skip_trivia()?;
            let value = self.value()?;
            self.skip_trivia()?;
            if matches!(self.peek(), Some(';' | ',')) {
                self.pos += 1;
            }
            if dict.insert(name.clone(), value).is_some() {
                return Err(format!("line {line}: duplicate setting '{name}'"));
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn fail(&self, what: &str) -> String {
        format!("line {}: {what}", self.line)
    }

    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => return Err(self.fail("unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn name(&mut self) -> Result<String, String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '*' => {}
            _ => return Err(self.fail("expected a setting name")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*'))
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.peek() {
            Some('"') => {
                let mut out = self.string_literal()?;
                // "a" "b" is one string.
                loop {
                    let mark = (self.pos, self.line);
                    self.skip_trivia()?;
                    if self.peek() == Some('"') {
                        out.push_str(&self.string_literal()?);
                    } else {
                        (self.pos, self.line) = mark;
                        return Ok(Value::from(out));
                    }
                }
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.name()?;
                match word.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::from(true)),
                    "false" => Ok(Value::from(false)),
                    _ => Err(self.fail(&format!("unexpected value '{word}'"))),
                }
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some('{' | '[' | '(') => Err(self.fail("groups, arrays and lists are not supported")),
            _ => Err(self.fail("expected a value")),
        }
    }

    fn string_literal(&mut self) -> Result<String, String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('f') => out.push('\u{c}'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    _ => return Err(self.fail("invalid escape in string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.fail("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_hexdigit() || matches!(c, '-' | '+' | '.' | 'x' | 'X' | 'L'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let digits = raw.trim_end_matches('L');

        let (negative, unsigned) = match digits.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, digits.strip_prefix('+').unwrap_or(digits)),
        };
        let parsed = match unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16).ok(),
            None => unsigned.parse::<i64>().ok(),
        };
        if let Some(n) = parsed {
            return Ok(Value::from(if negative { -n } else { n }));
        }
        digits
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| self.fail(&format!("invalid number '{raw}'")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Figment;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        url: String,
        port: i64,
        ratio: f64,
        enabled: bool,
    }

    fn extract(text: &str) -> Result<Sample, figment::Error> {
        Figment::from(Libconfig::string(text)).extract()
    }

    #[test]
    fn reads_terminated_settings_with_comments() {
        let sample = extract(
            r#"
            # provisioning output
            url = "https://cloud.example.com";   // trailing comment
            port : 0x1F;
            /* block
               comment */
            ratio = 0.5,
            enabled = TRUE
            "#,
        )
        .unwrap();
        assert_eq!(
            sample,
            Sample {
                url: "https://cloud.example.com".into(),
                port: 31,
                ratio: 0.5,
                enabled: true,
            }
        );
    }

    #[test]
    fn concatenates_adjacent_strings_and_unescapes() {
        #[derive(Deserialize)]
        struct One {
            s: String,
        }
        let one: One = Figment::from(Libconfig::string(r#"s = "a\"b" "\\c";"#))
            .extract()
            .unwrap();
        assert_eq!(one.s, "a\"b\\c");
    }

    #[test]
    fn rejects_groups_and_duplicates() {
        let group = Figment::from(Libconfig::string("g = { a = 1; };")).extract::<Dict>();
        assert!(group.unwrap_err().to_string().contains("not supported"));

        let dup = Figment::from(Libconfig::string("a = 1;\na = 2;")).extract::<Dict>();
        assert!(dup.unwrap_err().to_string().contains("line 2: duplicate"));
    }

    #[test]
    fn negative_integers() {
        let dict: Dict = Figment::from(Libconfig::string("n = -42L;")).extract().unwrap();
        assert_eq!(dict.get("n").and_then(Value::to_i128), Some(-42));
    }
}
