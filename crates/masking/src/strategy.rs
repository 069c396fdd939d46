use std::fmt;

/// How a secret renders itself in `Debug` output.
pub trait Strategy<T> {
    /// Write the masked representation of `val`.
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Masks the value but shows its type, e.g. `*** alloc::string::String ***`.
#[derive(Debug)]
pub enum WithType {}

impl<T> Strategy<T> for WithType {
    fn fmt(_: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*** ")?;
        f.write_str(std::any::type_name::<T>())?;
        f.write_str(" ***")
    }
}

/// Masks the value without any type information.
#[derive(Debug)]
pub enum WithoutType {}

impl<T> Strategy<T> for WithoutType {
    fn fmt(_: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*** ***")
    }
}
