//! Numbered list prompts on a line-based console

use std::fmt::Display;
use std::io::{BufRead, Write};

use crate::Error;

/// Writes `items` to `output` as a numbered list, starting at 1.
pub fn print_numbered<T: Display, W: Write>(items: &[T], output: &mut W) -> Result<(), Error> {
    for (i, item) in items.iter().enumerate() {
        writeln!(output, "{}) {}", i + 1, item)?;
    }

    Ok(())
}

/// Reads one line from `input` with surrounding whitespace removed.
///
/// Bytes that are not valid UTF-8 are replaced, so such a line is just another invalid choice.
/// Returns `Error::InputClosed` when the input has reached its end.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<String, Error> {
    let mut line = Vec::new();

    if input.read_until(b'\n', &mut line)? == 0 {
        return Err(Error::InputClosed);
    }

    Ok(String::from_utf8_lossy(&line).trim().to_string())
}

/// Parses a 1-based `choice` into a 0-based index into a list of `len` items.
///
/// Only non-empty strings of ASCII digits that name an existing item are accepted.
pub fn parse_index(choice: &str, len: usize) -> Option<usize> {
    if choice.is_empty() || !choice.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

/// Prints `items` as a numbered list and prompts with `label` until a valid number is entered.
///
/// Returns `None` without prompting if `items` is empty.
pub fn choose_from_list<'a, T, R, W>(
    items: &'a [T],
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'a T>, Error>
where
    T: Display,
    R: BufRead,
    W: Write,
{
    if items.is_empty() {
        return Ok(None);
    }

    print_numbered(items, output)?;

    loop {
        write!(output, "{} [1-{}]: ", label, items.len())?;
        output.flush()?;

        let choice = read_line(input)?;

        if let Some(index) = parse_index(&choice, items.len()) {
            return Ok(Some(&items[index]));
        }

        writeln!(output, "Invalid choice, try again.")?;
    }
}
