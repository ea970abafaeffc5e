use std::{
    fmt::{Display, Formatter, Write},
    path::Path,
};

/// Line-oriented helper shared by the TSPLIB and parameter-file `Display` impls.
pub(crate) struct SpecWriter<'a, 'b>(&'a mut Formatter<'b>);

impl<'a, 'b> SpecWriter<'a, 'b> {
    pub(crate) fn new(f: &'a mut Formatter<'b>) -> Self {
        Self(f)
    }

    pub(crate) fn line<T: Display>(&mut self, value: T) -> std::fmt::Result {
        writeln!(self.0, "{value}")
    }

    /// Writes `header` followed by one value per line. Nothing is written for
    /// an empty section.
    pub(crate) fn section<T: Display>(&mut self, header: &str, values: &[T]) -> std::fmt::Result {
        if values.is_empty() {
            return Ok(());
        }
        self.line(header)?;
        for value in values {
            self.line(value)?;
        }
        Ok(())
    }

    pub(crate) fn kv_eq<T: Display>(&mut self, key: &str, value: T) -> std::fmt::Result {
        writeln!(self.0, "{key} = {value}")
    }

    pub(crate) fn opt_kv_eq<T: Display>(
        &mut self,
        key: &str,
        value: Option<T>,
    ) -> std::fmt::Result {
        match value {
            Some(value) => self.kv_eq(key, value),
            None => Ok(()),
        }
    }

    pub(crate) fn kv_colon<T: Display>(&mut self, key: &str, value: T) -> std::fmt::Result {
        writeln!(self.0, "{key}: {value}")
    }

    pub(crate) fn opt_kv_colon<T: Display>(
        &mut self,
        key: &str,
        value: Option<T>,
    ) -> std::fmt::Result {
        match value {
            Some(value) => self.kv_colon(key, value),
            None => Ok(()),
        }
    }

    pub(crate) fn opt_path_eq(&mut self, key: &str, value: Option<&Path>) -> std::fmt::Result {
        self.opt_kv_eq(key, value.map(Path::display))
    }

    pub(crate) fn row<T: Display>(&mut self, row: &[T]) -> std::fmt::Result {
        let Some((first, rest)) = row.split_first() else {
            return Ok(());
        };

        write!(self.0, "{first}")?;
        for value in rest {
            write!(self.0, " {value}")?;
        }
        self.0.write_char('\n')
    }
}
