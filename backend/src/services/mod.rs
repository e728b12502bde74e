//! Business logic services for the Palm Oil Mill Management Platform

pub mod auth;
pub mod buyer;
pub mod material;
pub mod payroll;
pub mod procurement;
pub mod production;
pub mod reporting;
pub mod shipment;
pub mod stock;
pub mod supplier;
pub mod tank;
pub mod weighbridge;

pub use auth::AuthService;
pub use buyer::BuyerService;
pub use material::MaterialService;
pub use payroll::PayrollService;
pub use procurement::ProcurementService;
pub use production::ProductionService;
pub use reporting::ReportingService;
pub use shipment::ShipmentService;
pub use stock::StockLedgerService;
pub use supplier::SupplierService;
pub use tank::TankService;
pub use weighbridge::WeighbridgeService;
