//! Rendering of field values to text.
//!
//! A [`Format`] is a small subset of printf conversions, enough to control how
//! numbers land in the log file. Values that have no use for a format (booleans,
//! strings) ignore it.

use std::{fmt, str::FromStr};

/// Decimal places used for floating point values without an explicit format.
pub const DEFAULT_PRECISION: usize = 3;

/// Largest precision accepted by [`Format`].
///
/// Seventeen decimals already exceed what an `f64` carries. Parsing rejects
/// anything above it and rendering clamps variants built with a larger value.
pub const MAX_PRECISION: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Fixed-point with the given number of decimals, `%.Nf`.
    Fixed(usize),
    /// Scientific notation with the given number of decimals, `%.Ne`.
    Scientific(usize),
    /// Decimal integer, `%d`. Floats are rounded.
    Integer,
    /// Lowercase hexadecimal, `%x`. Floats are rounded.
    Hex,
    /// The value's plain textual form, `%s`.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported format specifier: {0:?}")]
pub struct ParseFormatError(String);

impl FromStr for Format {
    type Err = ParseFormatError;

    /// Parse a printf style specifier such as `%.2f`, `%e`, `%d`, `%x` or `%s`.
    ///
    /// Without an explicit precision `%f` and `%e` use six decimals, like printf.
    /// The precision is plain ASCII digits no larger than [`MAX_PRECISION`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFormatError(s.to_owned());
        let body = s.trim().strip_prefix('%').ok_or_else(err)?;
        let (precision, conversion) = match body.strip_prefix('.') {
            Some(rest) => {
                let digits = rest.char_indices().last().map_or(0, |(i, _)| i);
                if digits == 0 {
                    return Err(err());
                }
                let digits = &rest[..digits];
                if !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                let precision = digits.parse::<usize>().map_err(|_| err())?;
                if precision > MAX_PRECISION {
                    return Err(err());
                }
                (Some(precision), &rest[digits.len()..])
            }
            None => (None, body),
        };
        let format = match (conversion, precision) {
            ("f" | "F", p) => Self::Fixed(p.unwrap_or(6)),
            ("e" | "E", p) => Self::Scientific(p.unwrap_or(6)),
            ("d" | "i", None) => Self::Integer,
            ("x" | "X", None) => Self::Hex,
            ("s", None) => Self::Verbatim,
            _ => return Err(err()),
        };
        Ok(format)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(p) => write!(f, "%.{p}f"),
            Self::Scientific(p) => write!(f, "%.{p}e"),
            Self::Integer => f.write_str("%d"),
            Self::Hex => f.write_str("%x"),
            Self::Verbatim => f.write_str("%s"),
        }
    }
}

/// A value that can be stored in a [`Field`](crate::Field).
pub trait FieldValue {
    /// Render the value, using `format` when the value kind supports it.
    fn render(&self, format: Option<Format>) -> String;
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn render(&self, format: Option<Format>) -> String {
        (**self).render(format)
    }
}

impl FieldValue for bool {
    fn render(&self, _format: Option<Format>) -> String {
        String::from(if *self { "1" } else { "0" })
    }
}

impl FieldValue for str {
    fn render(&self, _format: Option<Format>) -> String {
        self.to_owned()
    }
}

impl FieldValue for String {
    fn render(&self, _format: Option<Format>) -> String {
        self.clone()
    }
}

impl FieldValue for char {
    fn render(&self, _format: Option<Format>) -> String {
        self.to_string()
    }
}

macro_rules! impl_integer {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
            fn render(&self, format: Option<Format>) -> String {
                match format {
                    None | Some(Format::Integer | Format::Verbatim) => self.to_string(),
                    Some(Format::Fixed(p)) => {
                        let p = p.min(MAX_PRECISION);
                        format!("{:.p$}", *self as f64)
                    }
                    Some(Format::Scientific(p)) => {
                        let p = p.min(MAX_PRECISION);
                        format!("{:.p$e}", *self as f64)
                    }
                    Some(Format::Hex) => format!("{self:x}"),
                }
            }
        }
    )*};
}

impl_integer!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            #[allow(clippy::cast_possible_truncation)]
            fn render(&self, format: Option<Format>) -> String {
                match format.unwrap_or(Format::Fixed(DEFAULT_PRECISION)) {
                    Format::Fixed(p) => {
                        let p = p.min(MAX_PRECISION);
                        format!("{self:.p$}")
                    }
                    Format::Scientific(p) => {
                        let p = p.min(MAX_PRECISION);
                        format!("{self:.p$e}")
                    }
                    Format::Integer => format!("{}", self.round() as i64),
                    Format::Hex => format!("{:x}", self.round() as i64),
                    Format::Verbatim => self.to_string(),
                }
            }
        }
    )*};
}

impl_float!(f32, f64);
