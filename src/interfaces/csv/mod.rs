pub mod receipt_writer;
pub mod submission_reader;
