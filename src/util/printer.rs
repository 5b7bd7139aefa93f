use crate::fs::{Entry, EntryKind};
use compile_time_ls_colours::file_type_colour;
use std::io::{self, BufWriter, IsTerminal as _, Write, stdout};

const NEWLINE: &[u8] = b"\n";
const NEWLINE_SLASH: &[u8] = b"/\n";
const NEWLINE_RESET: &[u8] = b"\x1b[0m\n";
const NEWLINE_SLASH_RESET: &[u8] = b"/\x1b[0m\n";
const NULL_TERMINATED: &[u8] = b"\0";
const NULL_TERMINATED_SLASH: &[u8] = b"/\0";

// lookup tables indexed by `is_dir`
const NEWLINES_RESET: [&[u8]; 2] = [NEWLINE_RESET, NEWLINE_SLASH_RESET];
const NEWLINES_PLAIN: [&[u8]; 2] = [NEWLINE, NEWLINE_SLASH];
const NULL_TERMINATED_PLAIN: [&[u8]; 2] = [NULL_TERMINATED, NULL_TERMINATED_SLASH];

const RESET: &[u8] = b"\x1b[0m";

/// Writes finder results to stdout, one per line
pub struct PrinterBuilder<I> {
    limit: usize,
    nocolour: bool,
    long: bool,
    null_terminated: bool,
    entries: I,
}

impl<'a, I> PrinterBuilder<I>
where
    I: Iterator<Item = &'a Entry>,
{
    #[inline]
    pub const fn new(entries: I) -> Self {
        Self {
            limit: usize::MAX,
            nocolour: false,
            long: false,
            null_terminated: false,
            entries,
        }
    }

    #[must_use]
    /// Limit the values to print to `limit`
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = match limit {
            Some(lim) => lim,
            None => usize::MAX,
        };
        self
    }

    #[must_use]
    /// Print with no colour if enabled (always disabled with "`NO_COLOUR`" or "`NO_COLOR`" environment variables)
    pub const fn nocolour(mut self, nocolour: bool) -> Self {
        self.nocolour = nocolour;
        self
    }

    #[must_use]
    /// Prefix each path with its visibility, size, modification time and MIME type
    pub const fn long(mut self, long: bool) -> Self {
        self.long = long;
        self
    }

    #[must_use]
    /// Print results being null terminated(useful for xargs)
    pub const fn null_terminated(mut self, null_terminated: bool) -> Self {
        self.null_terminated = null_terminated;
        self
    }

    /// Print the results
    ///
    /// # Errors
    /// Fails if stdout can't be written to.
    pub fn print(self) -> io::Result<()> {
        let std_out = stdout();
        let use_colour = std_out.is_terminal() && !colour_disabled(self.nocolour);
        let mut writer = BufWriter::new(std_out.lock());
        self.write_to(&mut writer, use_colour)?;
        writer.flush()
    }

    /// Writes the results to any writer
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_to<W: Write>(self, writer: &mut W, use_colour: bool) -> io::Result<()> {
        let terminators = match (use_colour, self.null_terminated) {
            (true, _) => NEWLINES_RESET,
            (false, true) => NULL_TERMINATED_PLAIN,
            (false, false) => NEWLINES_PLAIN,
        };

        for entry in self.entries.take(self.limit) {
            if self.long {
                write_long_prefix(writer, entry)?;
            }
            if use_colour {
                writer.write_all(entry_colour(entry))?;
            }
            writer.write_all(entry.path().as_bytes())?;
            writer.write_all(terminators[usize::from(entry.is_dir())])?;
        }
        Ok(())
    }
}

fn colour_disabled(nocolour: bool) -> bool {
    nocolour
        || std::env::var("NO_COLOUR").is_ok_and(|x| x.eq_ignore_ascii_case("TRUE"))
        || std::env::var("NO_COLOR").is_ok_and(|x| x.eq_ignore_ascii_case("TRUE"))
}

#[inline]
fn entry_colour(entry: &Entry) -> &[u8] {
    match entry.kind() {
        EntryKind::Directory => file_type_colour!(directory),
        EntryKind::File => {
            let ext = entry.extension().as_bytes();
            if ext.is_empty() {
                RESET
            } else {
                file_type_colour!(ext)
            }
        }
    }
}

/// `public       9 2024-01-01 12:00 text/plain  `
fn write_long_prefix<W: Write>(writer: &mut W, entry: &Entry) -> io::Result<()> {
    let size = entry
        .size()
        .map_or_else(|| "-".to_owned(), |size| size.to_string());
    let modified = entry.modified_time().map_or_else(
        || entry.last_modified().to_string(),
        |time| time.format("%Y-%m-%d %H:%M").to_string(),
    );
    write!(
        writer,
        "{:<7} {size:>10} {modified:<16} {:<24} ",
        entry.visibility().as_str(),
        entry.mime_type().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::Visibility;

    fn render(printer: PrinterBuilder<core::slice::Iter<'_, Entry>>) -> String {
        let mut out = Vec::new();
        printer.write_to(&mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry::file("cache/a.txt", 9, 0).with_mime_type("text/plain"),
            Entry::directory("cache/sub", 0).with_visibility(Visibility::Private),
        ]
    }

    #[test]
    fn plain_output_marks_directories() {
        let list = entries();
        assert_eq!(render(PrinterBuilder::new(list.iter())), "cache/a.txt\ncache/sub/\n");
        assert_eq!(
            render(PrinterBuilder::new(list.iter()).limit(Some(1))),
            "cache/a.txt\n"
        );
        assert_eq!(
            render(PrinterBuilder::new(list.iter()).null_terminated(true)),
            "cache/a.txt\0cache/sub/\0"
        );
    }

    #[test]
    fn long_output_has_metadata_columns() {
        let list = entries();
        let out = render(PrinterBuilder::new(list.iter()).long(true));
        let mut lines = out.lines();
        let file = lines.next().unwrap();
        assert!(file.starts_with("public "), "{file}");
        assert!(file.contains(" 9 1970-01-01 00:00 text/plain"), "{file}");
        assert!(file.ends_with("cache/a.txt"), "{file}");
        let dir = lines.next().unwrap();
        assert!(dir.starts_with("private"), "{dir}");
        assert!(dir.ends_with("cache/sub/"), "{dir}");
    }

    #[test]
    fn coloured_output_resets_each_line() {
        let mut out = Vec::new();
        PrinterBuilder::new(entries().iter())
            .write_to(&mut out, true)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[0m\n").count(), 2);
    }
}
