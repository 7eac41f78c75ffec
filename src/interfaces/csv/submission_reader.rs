use crate::domain::receipt::PaymentSubmission;
use crate::error::{KeyraError, Result};
use std::io::Read;

/// Reads payment submissions from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<PaymentSubmission>`.
/// Handles whitespace trimming and flexible record lengths automatically;
/// empty `user_email`/`user_name` fields deserialize to `None`.
pub struct SubmissionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SubmissionReader<R> {
    /// Creates a new `SubmissionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes submissions.
    pub fn submissions(self) -> impl Iterator<Item = Result<PaymentSubmission>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(KeyraError::from))
    }
}
