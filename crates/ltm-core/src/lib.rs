//! Foundational utilities shared across the LTM-Bridge crates.
//!
//! Provides the atomic file-write helper used by ledger persistence and the
//! unix-time helpers used for snapshot file naming.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms};

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;

    #[test]
    fn timestamp_units_agree() {
        let seconds = current_unix_timestamp();
        let millis = current_unix_timestamp_ms();
        let millis_as_seconds = millis / 1_000;
        assert!(millis_as_seconds >= seconds);
        assert!(millis_as_seconds <= seconds.saturating_add(1));
    }

    #[test]
    fn atomic_write_round_trips() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("ledger").join("snapshot.json");
        write_text_atomic(&path, "{\"ST_H\":\"abc\"}").expect("write");
        assert_eq!(read_to_string(&path).expect("read"), "{\"ST_H\":\"abc\"}");
    }

    #[test]
    fn atomic_write_rejects_directory_target() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let error = write_text_atomic(tempdir.path(), "x").expect_err("should fail");
        assert!(error.to_string().contains("directory"));
    }
}
