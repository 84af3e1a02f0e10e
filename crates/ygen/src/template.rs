//! A minimal `$name` substitution engine for code templates.
//!
//! `$name` and `${name}` are placeholders, `$$` is a literal `$`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("line {}: unknown placeholder `${}'", line, name)]
    UnknownPlaceholder { name: String, line: usize },

    #[error("line {}: unterminated `${{'", line)]
    Unterminated { line: usize },

    #[error("line {}: `$' must be followed by a name, `{{' or `$'", line)]
    Stray { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'t> {
    Text(&'t str),
    Placeholder(&'t str, usize),
}

#[derive(Debug, Clone)]
pub struct Template<'t> {
    pieces: Vec<Piece<'t>>,
}

impl<'t> Template<'t> {
    pub fn parse(text: &'t str) -> Result<Self, TemplateError> {
        let mut pieces = vec![];
        let mut line = 1;
        let mut rest = text;
        while let Some(pos) = rest.find('$') {
            let (head, tail) = rest.split_at(pos);
            if !head.is_empty() {
                pieces.push(Piece::Text(head));
            }
            line += head.matches('\n').count();

            let tail = &tail[1..];
            if let Some(tail) = tail.strip_prefix('$') {
                pieces.push(Piece::Text("$"));
                rest = tail;
            } else if let Some(tail) = tail.strip_prefix('{') {
                let end = tail.find('}').ok_or(TemplateError::Unterminated { line })?;
                pieces.push(Piece::Placeholder(&tail[..end], line));
                rest = &tail[end + 1..];
            } else {
                let end = tail
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(tail.len());
                if end == 0 || tail.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(TemplateError::Stray { line });
                }
                pieces.push(Piece::Placeholder(&tail[..end], line));
                rest = &tail[end..];
            }
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest));
        }
        Ok(Self { pieces })
    }

    /// Fail on the first placeholder not listed in `known`.
    pub fn check(&self, known: &[&str]) -> Result<(), TemplateError> {
        for piece in &self.pieces {
            if let Piece::Placeholder(name, line) = *piece {
                if !known.contains(&name) {
                    return Err(TemplateError::UnknownPlaceholder {
                        name: name.to_owned(),
                        line,
                    });
                }
            }
        }
        Ok(())
    }

    /// Write the template, asking `provider` to write each placeholder.
    pub fn render<W, F>(&self, out: &mut W, mut provider: F) -> fmt::Result
    where
        W: fmt::Write,
        F: FnMut(&mut W, &str) -> fmt::Result,
    {
        for piece in &self.pieces {
            match *piece {
                Piece::Text(text) => out.write_str(text)?,
                Piece::Placeholder(name, _) => provider(out, name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn render(text: &str) -> String {
        let template = Template::parse(text).unwrap();
        let mut out = String::new();
        template
            .render(&mut out, |out, name| write!(out, "<{}>", name))
            .unwrap();
        out
    }

    #[test]
    fn substitution() {
        assert_eq!(render("a $x b ${y}c $$d $z"), "a <x> b <y>c $d <z>");
        assert_eq!(render("\"$start\";"), "\"<start>\";");
        assert_eq!(render("no placeholders"), "no placeholders");
    }

    #[test]
    fn errors() {
        assert_eq!(
            Template::parse("a\n${x").unwrap_err(),
            TemplateError::Unterminated { line: 2 }
        );
        assert_eq!(
            Template::parse("\n\n$ x").unwrap_err(),
            TemplateError::Stray { line: 3 }
        );
        let template = Template::parse("$start\n$oops").unwrap();
        assert_eq!(
            template.check(&["start"]).unwrap_err(),
            TemplateError::UnknownPlaceholder {
                name: "oops".into(),
                line: 2,
            }
        );
    }
}
