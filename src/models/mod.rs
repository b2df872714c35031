pub mod doctor;
pub mod enums;
pub mod lab;
pub mod medication;
pub mod observation;
pub mod patient;
pub mod visit;
pub mod diagnosis;

pub use doctor::*;
pub use enums::*;
pub use lab::*;
pub use medication::*;
pub use observation::*;
pub use patient::*;
pub use visit::*;
pub use diagnosis::*;
