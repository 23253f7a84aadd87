use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Token separators of the dialogue bank format.
const SEPARATORS: &[char] = &[' ', '=', ',', ';', '/', '\t'];

fn is_separator(ch: char) -> bool {
    SEPARATORS.contains(&ch)
}

/// Splits a bank line into its reference number and text payload.
///
/// The line starts (after any leading separators) with a token whose first
/// character must be a digit; the reference is the token's leading digit run.
/// The payload is everything after the token and one following separator.
/// Anything else is not a record.
pub fn parse_line(line: &str) -> Option<(u32, &str)> {
    let start = line.find(|ch| !is_separator(ch))?;
    let rest = &line[start..];

    let token_end = rest.find(is_separator).unwrap_or(rest.len());
    let token = &rest[..token_end];
    if !token.chars().next()?.is_ascii_digit() {
        return None;
    }

    let digits_end = token
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(token.len());
    let ref_id: u32 = token[..digits_end].parse().ok()?;

    let text = if token_end < rest.len() {
        &rest[token_end + 1..]
    } else {
        ""
    };
    Some((ref_id, text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SayRecord {
    pub ref_id: u32,
    pub text: String,
}

/// Iterates the records of a dialogue bank file in file order, skipping
/// lines that do not parse as records. Well-formed banks keep records
/// ordered by reference number; the runtime cache leans on that to stop
/// scanning early.
#[derive(Debug)]
pub struct SayReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl SayReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("opening dialogue bank {}", path.display()))?;
        Ok(SayReader {
            path,
            lines: BufReader::new(file).lines(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for SayReader {
    type Item = Result<SayRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    if let Some((ref_id, text)) = parse_line(&line) {
                        return Some(Ok(SayRecord {
                            ref_id,
                            text: text.to_string(),
                        }));
                    }
                }
                Err(err) => {
                    return Some(Err(err).with_context(|| {
                        format!("reading dialogue bank {}", self.path.display())
                    }));
                }
            }
        }
    }
}
