// Domain layer: course models and the ports the adapters implement.

pub mod model;
pub mod ports;
