// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for writing output.

use std::{borrow::Cow, io, mem, str, str::FromStr};

use console::{Style, Term};
use derive_more::with_trait::{Deref, DerefMut, Display, From, Into};

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] and terminal detection decide
    /// whether output should be colored.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering successful events.
    pub ok: Style,

    /// [`Style`] for rendering skipped events.
    pub skipped: Style,

    /// [`Style`] for rendering errors and failed events.
    pub err: Style,

    /// [`Style`] for rendering header.
    pub header: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the terminal was detected.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            err: Style::new().red(),
            header: Style::new().blue(),
            bold: Style::new().bold(),
            is_present: Term::stdout().is_term() && console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the given [`Coloring`] policy to these [`Styles`].
    pub fn apply_coloring(&mut self, color: Coloring) {
        let force = match color {
            Coloring::Auto => return,
            Coloring::Always => true,
            Coloring::Never => false,
        };
        self.is_present = force;
        for style in [
            &mut self.ok,
            &mut self.skipped,
            &mut self.err,
            &mut self.header,
            &mut self.bold,
        ] {
            *style = mem::take(style).force_styling(force);
        }
    }

    /// If terminal is present colors `input` with [`Styles::ok`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.ok, input)
    }

    /// If terminal is present colors `input` with [`Styles::skipped`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn skipped<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.skipped, input)
    }

    /// If terminal is present colors `input` with [`Styles::err`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.err, input)
    }

    /// If terminal is present colors `input` with [`Styles::header`] color or
    /// leaves "as is" otherwise.
    #[must_use]
    pub fn header<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.header, input)
    }

    /// If terminal is present makes `input` __bold__ or leaves "as is"
    /// otherwise.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.bold, input)
    }

    fn apply<'a>(
        &self,
        style: &Style,
        input: impl Into<Cow<'a, str>>,
    ) -> Cow<'a, str> {
        if self.is_present {
            style.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }
}

/// [`io::Write`] extension for easier manipulation with strings.
pub trait WriteStrExt: io::Write {
    /// Writes the given `string` into this writer.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_str(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_all(string.as_ref().as_bytes())
    }

    /// Writes the given `string` into this writer followed by a newline.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_line(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_str(string.as_ref())
            .and_then(|()| self.write_str("\n"))
    }
}

impl<T: io::Write + ?Sized> WriteStrExt for T {}

/// [`String`] wrapper implementing [`io::Write`].
#[derive(
    Clone,
    Debug,
    Default,
    Deref,
    DerefMut,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct WritableString(pub String);

impl io::Write for WritableString {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.push_str(
            str::from_utf8(buf)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        );
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coloring() {
        assert_eq!("Always".parse(), Ok(Coloring::Always));
        assert_eq!("never".parse(), Ok(Coloring::Never));
        assert_eq!("auto".parse(), Ok(Coloring::Auto));
        assert!("rainbow".parse::<Coloring>().is_err());
    }

    #[test]
    fn never_leaves_text_as_is() {
        let mut styles = Styles::new();
        styles.apply_coloring(Coloring::Never);

        assert_eq!(styles.err("boom"), "boom");
        assert_eq!(styles.bold(styles.ok("fine")), "fine");
    }

    #[test]
    fn always_colors() {
        let mut styles = Styles::new();
        styles.apply_coloring(Coloring::Always);

        assert_ne!(styles.err("boom"), "boom");
        assert!(styles.err("boom").contains("boom"));
    }

    #[test]
    fn writes_lines_into_string() {
        let mut out = WritableString::default();
        out.write_str("a").unwrap();
        out.write_line("b").unwrap();

        assert_eq!(out.0, "ab\n");
    }
}
