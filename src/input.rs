//! Gathering the prompt from flags, trailing text and piped stdin

use crate::error::{Error, InputError, IoError};
use std::io::{self, IsTerminal, Read};

/// True when stdin is a pipe or file rather than a terminal
pub fn is_input_from_pipe() -> bool {
    !io::stdin().is_terminal()
}

/// Read all piped input
pub fn read_input<R: Read>(mut reader: R) -> Result<String, Error> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| Error::Io(IoError::StdinReadFailed(e)))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Combine the question with whatever data came with it.
///
/// Piped data takes precedence over trailing text. Without a question,
/// trailing text stands on its own as the prompt, but piped data never does.
pub fn resolve_prompt(
    question: Option<&str>,
    piped: Option<&str>,
    text: &[String],
) -> Result<String, Error> {
    let question = question.map(str::trim).filter(|q| !q.is_empty());
    let piped = piped.map(str::trim_end).filter(|p| !p.trim().is_empty());
    let text = text.join(" ");
    let text = Some(text.trim()).filter(|t| !t.is_empty());

    match (question, piped, text) {
        (Some(q), Some(data), _) => Ok(format!("{} {}", q, data)),
        (None, Some(_), _) => Err(InputError::NoQuestion.into()),
        (Some(q), None, Some(data)) => Ok(format!("{} {}", q, data)),
        (Some(_), None, None) => Err(InputError::NoData.into()),
        (None, None, Some(data)) => Ok(data.to_string()),
        (None, None, None) => Err(InputError::NoQuestion.into()),
    }
}
