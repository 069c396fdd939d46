#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wrapper types that keep personally identifiable information (PSU
//! passwords, OTPs, PSU identifiers) out of logs and debug output.
//!
//! A [`Secret`] can only be read through [`PeekInterface::peek`] or consumed
//! through [`ExposeInterface::expose`], which keeps every access to the inner
//! value greppable.

pub use zeroize::Zeroize;

mod secret;
mod strategy;

pub use secret::Secret;
pub use strategy::{Strategy, WithType, WithoutType};

/// Read-only access to the inner secret value.
pub trait PeekInterface<S> {
    /// Borrow the inner value.
    fn peek(&self) -> &S;
}

/// Consuming access to the inner secret value.
pub trait ExposeInterface<S> {
    /// Take the inner value out of the wrapper.
    fn expose(self) -> S;
}

impl<S, I> ExposeInterface<S> for Secret<S, I>
where
    I: Strategy<S>,
{
    fn expose(self) -> S {
        self.inner_secret
    }
}

/// Expose helpers for optional secrets.
pub trait ExposeOptionInterface<S> {
    /// Take the inner value out, mapping `None` to the default.
    fn expose_option(self) -> S;
}

impl<S> ExposeOptionInterface<Option<S>> for Option<Secret<S>> {
    fn expose_option(self) -> Option<S> {
        self.map(ExposeInterface::expose)
    }
}
