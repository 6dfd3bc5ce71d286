//! Anchor-based extraction of the subject catalog and student records

pub mod catalog;
pub mod layout;
pub mod students;

pub use catalog::{Subject, SubjectCatalog, extract_catalog};
pub use layout::{FieldOffset, FieldParser, StudentField, StudentLayout};
pub use students::{StudentRecord, StudentScan, SubjectMark, extract_students};
