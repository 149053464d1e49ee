//! Plain-text diagnostic rendering.

use crate::{Diagnostic, DiagnosticKind};
use sable_ir::StringInterner;
use std::io::{self, Write};

/// Renders diagnostics as `file:line: severity: message` lines, with a
/// follow-up note for redefinitions pointing at the first site.
pub struct Emitter<'a> {
    interner: &'a StringInterner,
}

impl<'a> Emitter<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        Emitter { interner }
    }

    /// Write one diagnostic.
    pub fn emit(&self, out: &mut impl Write, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(
            out,
            "{}:{}: {}: {}",
            self.interner.resolve(diagnostic.file),
            diagnostic.line,
            diagnostic.severity,
            diagnostic.message
        )?;
        if let DiagnosticKind::AlreadyDefined {
            first_file,
            first_line,
            ..
        } = &diagnostic.kind
        {
            writeln!(
                out,
                "{}:{}: note: first defined here",
                self.interner.resolve(*first_file),
                first_line
            )?;
        }
        Ok(())
    }

    /// Write a batch of diagnostics in order.
    pub fn emit_all(&self, out: &mut impl Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.emit(out, diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_ir::scoped;

    #[test]
    fn renders_file_line_and_note() {
        let interner = StringInterner::new();
        let file = interner.intern("x.cc");
        let name = interner.intern("A");
        let diag = Diagnostic::already_defined(file, 9, scoped(name), "A", file, 3);

        let emitter = Emitter::new(&interner);
        let mut out = Vec::new();
        emitter.emit(&mut out, &diag).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "x.cc:9: error: `A` is already defined\nx.cc:3: note: first defined here\n"
        );
    }
}
