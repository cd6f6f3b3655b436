// Page layout reconstruction: words -> reading order -> text lines.

pub mod lines;
pub mod reading_order;

pub use lines::LineAssembler;
pub use reading_order::ReadingOrderReconstructor;
