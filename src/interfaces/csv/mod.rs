pub mod notification_writer;
pub mod script_reader;
