//! Utility functions for identifier generation, timestamps, and input
//! validation.

pub mod timestamps;
mod ids;
mod validation;

pub use ids::{generate_uuid, new_execution_ref};
pub use timestamps::{iso_timestamp, now_utc, whole_seconds_between, Timestamp};
pub use validation::require_field;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_is_valid() {
        let id = generate_uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
