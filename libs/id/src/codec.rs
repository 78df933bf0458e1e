//! The canonical `{prefix}_{ulid}` text encoding shared by every ID type.
//!
//! Generated ID types never carry their own copy of these rules; they call
//! into this module with their `PREFIX` constant. The rules are:
//!
//! - Output is always lowercase: the prefix as declared (lowercase) followed
//!   by `_` and the 26-character Crockford base32 form of the ULID.
//! - Input prefixes and ULID characters are matched case-insensitively.
//! - The nil ULID is the empty sentinel and renders as 26 `0` characters.

use std::cell::RefCell;
use std::fmt;

use ulid::{Generator, Ulid};

use crate::IdError;

/// Separator between the prefix and the encoded value.
pub const SEPARATOR: char = '_';

/// Length of the encoded ULID segment.
pub const ENCODED_LEN: usize = 26;

thread_local! {
    static GENERATOR: RefCell<Generator> = RefCell::new(Generator::new());
}

/// Generates a fresh ULID.
///
/// The high 48 bits carry the current time in milliseconds, the low 80 bits
/// are random. Within one thread, values generated in the same millisecond
/// are strictly increasing. Across threads, ordering is only as good as the
/// clock resolution.
#[must_use]
pub fn generate() -> Ulid {
    GENERATOR
        .with(|generator| generator.borrow_mut().generate())
        // The random part overflows only after 2^80 IDs in one millisecond.
        .unwrap_or_else(|_| Ulid::new())
}

/// Writes `{prefix}_{ulid}` in canonical lowercase form.
pub fn write(f: &mut fmt::Formatter<'_>, prefix: &str, ulid: Ulid) -> fmt::Result {
    let mut buf = [0u8; ENCODED_LEN];
    let encoded = ulid.array_to_str(&mut buf);
    encoded.make_ascii_lowercase();
    write!(f, "{prefix}{SEPARATOR}{encoded}")
}

/// Formats `{prefix}_{ulid}` in canonical lowercase form.
#[must_use]
pub fn format(prefix: &str, ulid: Ulid) -> String {
    struct Canonical<'a>(&'a str, Ulid);

    impl fmt::Display for Canonical<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write(f, self.0, self.1)
        }
    }

    Canonical(prefix, ulid).to_string()
}

/// Parses `{prefix}_{ulid}` and returns the ULID.
///
/// The prefix comparison ignores ASCII case, so `USR_01HV...` parses for a
/// `usr` type and formats back as `usr_01hv...`.
pub fn parse(expected: &'static str, s: &str) -> Result<Ulid, IdError> {
    if s.trim().is_empty() {
        return Err(IdError::Empty);
    }

    let Some((prefix, encoded)) = s.split_once(SEPARATOR) else {
        return Err(IdError::MissingSeparator);
    };

    if prefix.is_empty() {
        return Err(IdError::MissingPrefix { expected });
    }

    if !prefix.eq_ignore_ascii_case(expected) {
        return Err(IdError::InvalidPrefix {
            expected,
            actual: prefix.to_string(),
        });
    }

    decode(encoded)
}

/// Decodes the 26-character value segment, ignoring ASCII case.
pub fn decode(encoded: &str) -> Result<Ulid, IdError> {
    if encoded.len() != ENCODED_LEN {
        return Err(IdError::InvalidUlid(format!(
            "expected {ENCODED_LEN} characters, got {}",
            encoded.len()
        )));
    }

    let mut buf = [0u8; ENCODED_LEN];
    buf.copy_from_slice(encoded.as_bytes());
    buf.make_ascii_uppercase();

    // 26 base32 characters hold 130 bits; anything above `7ZZZ...` overflows.
    if buf[0].is_ascii_alphanumeric() && buf[0] > b'7' {
        return Err(IdError::InvalidUlid("value overflows 128 bits".to_string()));
    }
    let upper = std::str::from_utf8(&buf).map_err(|e| IdError::InvalidUlid(e.to_string()))?;

    Ulid::from_string(upper).map_err(|e| IdError::InvalidUlid(e.to_string()))
}

/// Returns true if `ulid` is the empty sentinel.
#[must_use]
pub const fn is_empty(ulid: Ulid) -> bool {
    ulid.0 == 0
}
