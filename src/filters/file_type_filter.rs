use crate::fs::{Entry, EntryKind};
use clap::{
    Arg, Command, Error,
    builder::{PossibleValue, TypedValueParser},
    error::{ContextKind, ContextValue, ErrorKind},
};
use std::ffi::OsStr;

/// Keeps only entries of `kind`, or everything when no kind is set
#[must_use]
pub fn filter_kind(entries: &[Entry], kind: Option<EntryKind>) -> Vec<Entry> {
    match kind {
        None => entries.to_vec(),
        Some(kind) => entries
            .iter()
            .filter(|entry| entry.kind() == kind)
            .cloned()
            .collect(),
    }
}

/// A struct to provide completions for entry type completions in CLI
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct EntryKindParser;

impl TypedValueParser for EntryKindParser {
    type Value = EntryKind;

    fn parse_ref(
        &self,
        cmd: &Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, Error> {
        let value_str = value
            .to_str()
            .ok_or_else(|| Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        match value_str.to_lowercase().as_str() {
            "f" | "file" | "files" => Ok(EntryKind::File),
            "d" | "dir" | "directory" | "directories" => Ok(EntryKind::Directory),
            _ => {
                let mut error = Error::new(ErrorKind::InvalidValue).with_cmd(cmd);

                error.insert(
                    ContextKind::InvalidValue,
                    ContextValue::String(format!("invalid entry type: '{value_str}'")),
                );

                error.insert(
                    ContextKind::ValidValue,
                    ContextValue::Strings(vec![
                        "f, file, files".into(),
                        "d, dir, directory, directories".into(),
                    ]),
                );

                Err(error)
            }
        }
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(
            [
                PossibleValue::new("f")
                    .aliases(["file", "files"])
                    .help("Regular file"),
                PossibleValue::new("d")
                    .aliases(["dir", "directory", "directories"])
                    .help("Directory"),
            ]
            .into_iter(),
        ))
    }
}
