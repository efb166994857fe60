pub mod blackout;
pub mod code;
pub mod discount;
pub mod item;
pub mod location;
pub mod reservation;
pub mod schedule;
