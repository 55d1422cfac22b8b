//! Errors of the command line front-end.
//!
//! Generation itself cannot fail, only reading and parsing input trees can.

use std::io;
use std::path::PathBuf;

use chumsky::error::Rich;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid syntax:\n{}", .0.join("\n"))]
    Syntax(Vec<String>),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// Collects parser errors, which borrow the source, into an owned error.
    pub fn syntax<'src>(errors: impl IntoIterator<Item = Rich<'src, char>>) -> Self {
        Error::Syntax(errors.into_iter().map(|error| error.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, Parse};

    #[test]
    fn syntax_errors_are_owned() {
        let src = String::from("uint7;");
        let error = match Contract::parse(&src).into_result() {
            Ok(_) => panic!("uint7 parsed"),
            Err(errors) => Error::syntax(errors),
        };
        drop(src);
        assert!(error.to_string().starts_with("invalid syntax:\n"));
    }
}
