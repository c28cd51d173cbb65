//! Argument views
//!
//! A compile command is tokenized into [`ArgItem`]s so that a flag and its
//! separate value always travel together. Three views are derived from the
//! items:
//!
//! - `raw` - the command as recorded
//! - `no_output` - every `-o <value>` pair removed
//! - `compiler_only` - `no_output` without `-c` and without the token naming
//!   the translation unit's own source file
//!
//! Every view starts with the program token.

use std::path::Path;
use tracing::debug;

use crate::compdb::CompileCommand;
use crate::error::{Error, Result};
use crate::paths;

/// Flags whose value is passed as the following token
const SEPARATE_VALUE_FLAGS: &[&str] = &[
    "-D",
    "-U",
    "-I",
    "-L",
    "-MF",
    "-MQ",
    "-MT",
    "-Xassembler",
    "-Xclang",
    "-Xlinker",
    "-Xpreprocessor",
    "-arch",
    "-aux-info",
    "-idirafter",
    "-imacros",
    "-include",
    "-iprefix",
    "-iquote",
    "-isysroot",
    "-isystem",
    "-iwithprefix",
    "-target",
    "-x",
    "--sysroot",
];

/// One logical argument of a compile command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgItem {
    /// `-o <value>`; the value is absent only when `-o` ends the command
    Output(Option<String>),
    /// `-c`
    CompileOnly,
    /// Any other option, with its separate value if it takes one
    Flag { flag: String, value: Option<String> },
    /// A token that is neither an option nor an option's value
    Positional(String),
}

impl ArgItem {
    /// Tokens this item expands back into
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            ArgItem::Output(value) => {
                let mut tokens = vec!["-o"];
                tokens.extend(value.as_deref());
                tokens
            }
            ArgItem::CompileOnly => vec!["-c"],
            ArgItem::Flag { flag, value } => {
                let mut tokens = vec![flag.as_str()];
                tokens.extend(value.as_deref());
                tokens
            }
            ArgItem::Positional(token) => vec![token.as_str()],
        }
    }
}

/// Group argument tokens (program excluded) into items
pub fn tokenize(args: &[String]) -> Vec<ArgItem> {
    let mut items = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(token) = iter.next() {
        let item = match token.as_str() {
            "-o" => ArgItem::Output(iter.next().cloned()),
            "-c" => ArgItem::CompileOnly,
            flag if SEPARATE_VALUE_FLAGS.contains(&flag) => ArgItem::Flag {
                flag: flag.to_string(),
                value: iter.next().cloned(),
            },
            flag if flag.starts_with('-') && flag.len() > 1 => ArgItem::Flag {
                flag: flag.to_string(),
                value: None,
            },
            _ => ArgItem::Positional(token.clone()),
        };
        items.push(item);
    }

    items
}

/// Argument views of one compile command
#[derive(Debug, Clone)]
pub struct ArgumentViews<'a> {
    command: &'a CompileCommand,
    program: String,
    items: Vec<ArgItem>,
}

impl<'a> ArgumentViews<'a> {
    /// Tokenize a compile command
    pub fn new(command: &'a CompileCommand) -> Result<Self> {
        let tokens = command
            .tokens()
            .ok_or_else(|| Error::malformed(&command.file, "unbalanced quoting in command"))?;
        let (program, args) = tokens
            .split_first()
            .ok_or_else(|| Error::malformed(&command.file, "empty command"))?;

        Ok(Self {
            command,
            program: program.clone(),
            items: tokenize(args),
        })
    }

    /// The compiler (first token)
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The command as recorded
    pub fn raw(&self) -> Vec<String> {
        self.collect(|_, _| true)
    }

    /// The command with every `-o <value>` pair removed
    pub fn no_output(&self) -> Vec<String> {
        self.collect(|_, item| !matches!(item, ArgItem::Output(_)))
    }

    /// The command stripped down to a pure preprocessor invocation
    ///
    /// Fails with [`Error::UnmatchedSourceToken`] unless exactly one
    /// positional token resolves to the command's source file.
    pub fn compiler_only(&self) -> Result<Vec<String>> {
        let source_index = self.source_token_index()?;
        let view = self.collect(|index, item| {
            index != source_index && !matches!(item, ArgItem::Output(_) | ArgItem::CompileOnly)
        });
        debug!("compiler-only view for {:?}: {:?}", self.command.file, view);
        Ok(view)
    }

    /// Locate the positional item naming the source file
    ///
    /// Candidates must share the source's file name; each is then resolved
    /// against the command directory and compared by file identity.
    fn source_token_index(&self) -> Result<usize> {
        let source = self.command.source_path();
        let source_name = source.file_name();

        let matches: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                ArgItem::Positional(token) => Some((index, token)),
                _ => None,
            })
            .filter(|(_, token)| Path::new(token).file_name() == source_name)
            .filter(|(_, token)| {
                let candidate = paths::resolve_in(&self.command.directory, Path::new(token));
                paths::same_file(&candidate, &source)
            })
            .map(|(index, _)| index)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            _ => Err(Error::UnmatchedSourceToken {
                file: source,
                candidates: matches.len(),
            }),
        }
    }

    fn collect<F>(&self, keep: F) -> Vec<String>
    where
        F: Fn(usize, &ArgItem) -> bool,
    {
        let mut view = vec![self.program.clone()];
        for (index, item) in self.items.iter().enumerate() {
            if keep(index, item) {
                view.extend(item.tokens().into_iter().map(str::to_string));
            }
        }
        view
    }
}
