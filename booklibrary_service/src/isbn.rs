use std::fmt;

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum InvalidIsbn {
    #[error("wrong length: expected 10 or 13 characters, got {0}")]
    WrongLength(usize),

    #[error("non-numeric character '{0}'")]
    NonNumericCharacter(char),

    #[error("bad checksum")]
    BadChecksum,
}

/// ISBN-10 or ISBN-13 that passed checksum validation.
/// Holds the normalized form: separators removed, ISBN-10 check character `X` upper-cased.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> Result<Self, InvalidIsbn> {
        let cleaned: Vec<char> = raw
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();

        match cleaned.len() {
            10 => validate_isbn10(&cleaned)?,
            13 => validate_isbn13(&cleaned)?,
            other => return Err(InvalidIsbn::WrongLength(other)),
        }

        Ok(Self(
            cleaned.iter().map(|c| c.to_ascii_uppercase()).collect(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn validate_isbn10(chars: &[char]) -> Result<(), InvalidIsbn> {
    let mut sum = 0;
    for (position, c) in chars.iter().enumerate() {
        let value = match c {
            'X' | 'x' if position == 9 => 10,
            c => c.to_digit(10).ok_or(InvalidIsbn::NonNumericCharacter(*c))?,
        };
        // weights run 10 down to 1
        sum += value * (10 - position as u32);
    }
    if sum % 11 == 0 {
        Ok(())
    } else {
        Err(InvalidIsbn::BadChecksum)
    }
}

fn validate_isbn13(chars: &[char]) -> Result<(), InvalidIsbn> {
    let mut sum = 0;
    for (position, c) in chars.iter().enumerate() {
        let digit = c.to_digit(10).ok_or(InvalidIsbn::NonNumericCharacter(*c))?;
        sum += if position % 2 == 0 { digit } else { digit * 3 };
    }
    if sum % 10 == 0 {
        Ok(())
    } else {
        Err(InvalidIsbn::BadChecksum)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
