use std::fmt::{self, Display};

/// Display adapter that cuts long text (queries, rendered values) down to a
/// readable size for error messages and logs.
pub struct Truncated<'a>(&'a str);

impl<'a> Truncated<'a> {
    pub const LIMIT: usize = 497;

    pub fn new(text: &'a str) -> Self {
        Self(text)
    }
}

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= Self::LIMIT {
            return f.write_str(self.0.trim_end());
        }
        let mut end = Self::LIMIT;
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        write!(f, "{}...", self.0[..end].trim_end())
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::Truncated::new(::std::convert::AsRef::<str>::as_ref(&$query))
    };
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}
