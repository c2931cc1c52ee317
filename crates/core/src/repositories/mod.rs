//! Data access, one module per aggregate.
//!
//! Functions take the pool (or the connection of an open transaction) as
//! their first argument; the pool is constructed in the binaries and injected
//! from above. Rows are mapped explicitly and enum columns are parsed into
//! their closed domain types at this boundary.

pub mod appointments;
pub mod doctors;
pub mod medicines;
pub mod patients;
pub mod prescriptions;
pub mod users;

use crate::{HmsError, HmsResult};

/// Parse a stored enum column. A value outside the closed set means the
/// record is corrupt, not that the request was bad.
pub(crate) fn decode_enum<T>(value: &str) -> HmsResult<T>
where
    T: std::str::FromStr<Err = hms_types::UnknownValue>,
{
    value
        .parse()
        .map_err(|e: hms_types::UnknownValue| HmsError::CorruptRecord(e.to_string()))
}
