#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Utilities shared by the SCA engine crates.

pub mod consts;
pub mod errors;

/// Date-time helpers.
pub mod date_time {
    use time::{OffsetDateTime, PrimitiveDateTime};

    /// Current date and time in UTC as a [`PrimitiveDateTime`].
    pub fn now() -> PrimitiveDateTime {
        let utc = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(utc.date(), utc.time())
    }
}

/// Generate an id of the given length with the given prefix.
#[inline]
pub fn generate_id(length: usize, prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid::nanoid!(length, &consts::ALPHABETS))
}

/// Generate an id with the default length and the given prefix.
#[inline]
pub fn generate_id_with_default_len(prefix: &str) -> String {
    generate_id(consts::ID_LENGTH, prefix)
}

#[cfg(test)]
mod tests {
    #[test]
    fn generated_ids_carry_prefix() {
        let id = super::generate_id_with_default_len("auth");
        assert!(id.starts_with("auth_"));
        assert_eq!(id.len(), "auth_".len() + super::consts::ID_LENGTH);
    }
}
