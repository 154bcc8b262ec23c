use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Transition target that ends a name.
pub const NAME_END: char = '\n';

/// Byte written after the last letter of a name, and as padding.
pub const TERMINATOR_BYTE: u8 = 0x50;

/// Added to a character's code point to get its in-game byte.
pub const CHAR_OFFSET: u32 = 31;

pub const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Errors that can occur while loading a name table or generating names.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("name table is empty")]
    EmptyTable,

    #[error("name table row for {0:?} has zero total weight")]
    ZeroWeight(char),

    #[error("name table key {0:?} is not a single character")]
    InvalidKey(String),

    #[error("invalid name bounds: min {min}, max {max}")]
    InvalidBounds { min: usize, max: usize },

    #[error("no name of acceptable length after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error("character {0:?} has no in-game encoding")]
    Unencodable(char),

    #[error("failed to parse name table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Character transition weights: current char -> next char -> weight.
///
/// Rows keep the order they were inserted (or read from disk) in, which
/// fixes which character a given random draw lands on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    rows: IndexMap<char, IndexMap<char, u32>>,
}

fn single_char(key: String) -> Result<char, NameError> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(NameError::InvalidKey(key)),
    }
}

impl NameTable {
    pub fn from_rows<I, J>(rows: I) -> Self
    where
        I: IntoIterator<Item = (char, J)>,
        J: IntoIterator<Item = (char, u32)>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|(c, row)| (c, row.into_iter().collect()))
                .collect(),
        }
    }

    /// Parse the JSON object written by the corpus builder.
    pub fn from_json(text: &str) -> Result<Self, NameError> {
        let raw: IndexMap<String, IndexMap<String, u32>> = serde_json::from_str(text)?;
        let mut rows = IndexMap::with_capacity(raw.len());
        for (key, row) in raw {
            let mut next = IndexMap::with_capacity(row.len());
            for (next_key, weight) in row {
                next.insert(single_char(next_key)?, weight);
            }
            rows.insert(single_char(key)?, next);
        }
        Ok(Self { rows })
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Weighted draw of the character after `current`.
    ///
    /// A character with no row is a dead end and ends the name. The draw is
    /// taken from `1..=total` so it always lands on an entry, each with odds
    /// exactly proportional to its weight.
    fn next_char<R: Rng + ?Sized>(&self, current: char, rng: &mut R) -> Result<char, NameError> {
        let Some(row) = self.rows.get(&current) else {
            return Ok(NAME_END);
        };

        let total: u64 = row.values().map(|&w| u64::from(w)).sum();
        if total == 0 {
            return Err(NameError::ZeroWeight(current));
        }

        let mut draw = rng.gen_range(1..=total);
        for (&next, &weight) in row {
            let weight = u64::from(weight);
            if draw <= weight {
                return Ok(next);
            }
            draw -= weight;
        }

        Ok(NAME_END)
    }
}

/// A generated name: its letters plus the slot width it is padded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    letters: String,
    width: usize,
}

impl GeneratedName {
    pub fn letters(&self) -> &str {
        &self.letters
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// In-game bytes: each letter shifted by `CHAR_OFFSET`, then terminators
    /// up to the slot width.
    pub fn encode(&self) -> Result<Vec<u8>, NameError> {
        let mut out = Vec::with_capacity(self.width);
        for c in self.letters.chars() {
            let byte = u8::try_from(u32::from(c) + CHAR_OFFSET)
                .ok()
                .filter(|&b| b != TERMINATOR_BYTE)
                .ok_or(NameError::Unencodable(c))?;
            out.push(byte);
        }
        out.resize(self.width.max(out.len()), TERMINATOR_BYTE);
        Ok(out)
    }
}

impl fmt::Display for GeneratedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters.to_uppercase())
    }
}

/// Markov-chain name generator over a `NameTable`.
#[derive(Debug, Clone, Copy)]
pub struct NameGenerator<'a> {
    table: &'a NameTable,
    min_len: usize,
    max_len: usize,
}

impl<'a> NameGenerator<'a> {
    /// `max_len` is the full encoded width; at most `max_len - 1` letters
    /// fit before the terminator.
    pub fn new(table: &'a NameTable, min_len: usize, max_len: usize) -> Result<Self, NameError> {
        if min_len == 0 || max_len < 2 || min_len > max_len - 1 {
            return Err(NameError::InvalidBounds {
                min: min_len,
                max: max_len,
            });
        }
        Ok(Self {
            table,
            min_len,
            max_len,
        })
    }

    /// Generate a name from a uniformly chosen starting character.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GeneratedName, NameError> {
        let starts: Vec<char> = self
            .table
            .rows
            .keys()
            .copied()
            .filter(|&c| c != NAME_END)
            .collect();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let start = *starts.choose(rng).ok_or(NameError::EmptyTable)?;
            if let Some(name) = self.attempt(start, rng)? {
                return Ok(name);
            }
        }

        Err(NameError::Exhausted {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Generate a name that always begins with `start`.
    pub fn generate_from<R: Rng + ?Sized>(
        &self,
        start: char,
        rng: &mut R,
    ) -> Result<GeneratedName, NameError> {
        if self.table.is_empty() {
            return Err(NameError::EmptyTable);
        }

        for _ in 0..MAX_NAME_ATTEMPTS {
            if let Some(name) = self.attempt(start, rng)? {
                return Ok(name);
            }
        }

        Err(NameError::Exhausted {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    // None means the name ended before min_len and must be thrown away.
    fn attempt<R: Rng + ?Sized>(
        &self,
        start: char,
        rng: &mut R,
    ) -> Result<Option<GeneratedName>, NameError> {
        if start == NAME_END {
            return Ok(None);
        }

        let mut letters = String::new();
        letters.push(start);
        let mut current = start;
        let mut len = 1;

        while len < self.max_len - 1 {
            let next = self.table.next_char(current, rng)?;
            if next == NAME_END {
                if len < self.min_len {
                    return Ok(None);
                }
                break;
            }
            letters.push(next);
            current = next;
            len += 1;
        }

        Ok(Some(GeneratedName {
            letters,
            width: self.max_len,
        }))
    }
}
