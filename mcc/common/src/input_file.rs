use crate::Span;

/// Index of a file inside of [`InputFiles`]
pub type CodeId = usize;

/// A single source file
#[derive(Debug, Eq, PartialEq, Hash)]
pub struct Code {
    pub source: Box<str>,
    pub path: Option<String>,
}

/// A reference to a file inside of [`InputFiles`], together with its global offset
#[derive(Debug, Clone, Copy)]
pub struct CodeRef<'a> {
    pub file: CodeId,
    offset: usize,
    code: &'a Code,
}

impl<'a> CodeRef<'a> {
    pub fn get_code(&self) -> &'a Code {
        self.code
    }

    /// Returns the global offset of this file
    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Converts a global span into a span which is local to this file
    pub fn get_relative_span(&self, span: Span) -> Option<Span> {
        let start = span.start().checked_sub(self.offset)?;
        if start + span.len() > self.code.source.len() {
            return None;
        }
        Some(Span::new(start, span.len()))
    }

    /// Returns the 1-based line of the global byte offset `position`
    pub fn line_at(&self, position: usize) -> usize {
        let local = position.saturating_sub(self.offset).min(self.code.source.len());
        self.code.source[..local].matches('\n').count() + 1
    }
}

/// Stores all input files of one compilation
///
/// Every file is assigned a unique global byte offset, so a [`Span`] alone
/// identifies the file it belongs to.
#[derive(Debug, Default)]
pub struct InputFiles {
    input_files: Vec<(Code, usize)>,
    offset: usize,
}

impl InputFiles {
    /// Adds a file and returns its id
    pub fn add_input(&mut self, code: Code) -> CodeId {
        let len = code.source.len();
        self.input_files.push((code, self.offset));
        // One extra byte so the end of a file never touches the start of the next one
        self.offset += len + 1;
        self.input_files.len() - 1
    }

    pub fn get_input(&self, id: CodeId) -> &Code {
        &self.input_files[id].0
    }

    pub fn get_code_ref(&self, id: CodeId) -> CodeRef {
        let (code, offset) = &self.input_files[id];
        CodeRef {
            file: id,
            offset: *offset,
            code,
        }
    }

    /// Returns the file which contains `span`
    pub fn get_span_code(&self, span: Span) -> CodeRef {
        let id = match self
            .input_files
            .binary_search_by_key(&span.start(), |(_, offset)| *offset)
        {
            Ok(id) => id,
            Err(id) => id.saturating_sub(1),
        };
        self.get_code_ref(id)
    }

    /// Returns the source text of `span`
    pub fn get_span_str(&self, span: Span) -> &str {
        let code = self.get_span_code(span);
        let local = code
            .get_relative_span(span)
            .expect("Span is not part of any input file");
        &code.get_code().source[local.start()..local.end()]
    }

    pub fn len(&self) -> usize {
        self.input_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_files.is_empty()
    }

    /// Returns the id of the first file whose path equals `name`
    pub fn find_by_filename(&self, name: &str) -> Option<CodeId> {
        self.input_files
            .iter()
            .position(|(code, _)| code.path.as_deref() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Code, InputFiles, Span};

    fn files() -> InputFiles {
        let mut files = InputFiles::default();
        files.add_input(Code {
            source: "mc \"say a\"\nmc \"say b\"".into(),
            path: Some("a.mcc".into()),
        });
        files.add_input(Code {
            source: "define int x".into(),
            path: None,
        });
        files
    }

    #[test]
    fn spans_resolve_to_their_file() {
        let files = files();
        let second = files.get_code_ref(1);
        assert_eq!(second.get_offset(), 22);

        let span = Span::new(29, 5);
        assert_eq!(files.get_span_code(span).file, 1);
        assert_eq!(files.get_span_str(span), "int x");
        assert_eq!(files.find_by_filename("a.mcc"), Some(0));
    }

    #[test]
    fn line_numbers() {
        let files = files();
        let first = files.get_code_ref(0);
        assert_eq!(first.line_at(0), 1);
        assert_eq!(first.line_at(12), 2);
    }
}
