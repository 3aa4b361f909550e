pub mod anamnesis;
pub mod appointment;
pub mod budget;
pub mod enums;
pub mod image;
pub mod ledger;
pub mod patient;
pub mod record;
pub mod team;

pub use anamnesis::*;
pub use appointment::*;
pub use budget::*;
pub use enums::*;
pub use image::*;
pub use ledger::*;
pub use patient::*;
pub use record::*;
pub use team::*;
