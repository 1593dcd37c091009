pub mod booked;
pub mod melt;

pub use booked::{assemble_booked, ultimate_loss_ratio};
pub use melt::melt_loss_ratios;
