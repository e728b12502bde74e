//! HTTP handlers for the Palm Oil Mill Management Platform

mod auth;
mod buyer;
mod health;
mod material;
mod payroll;
mod procurement;
mod production;
mod reporting;
mod shipment;
mod stock;
mod supplier;
mod tank;
mod weighbridge;

pub use auth::*;
pub use buyer::*;
pub use health::*;
pub use material::*;
pub use payroll::*;
pub use procurement::*;
pub use production::*;
pub use reporting::*;
pub use shipment::*;
pub use stock::*;
pub use supplier::*;
pub use tank::*;
pub use weighbridge::*;
