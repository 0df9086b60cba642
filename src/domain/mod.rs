// Domain layer: storage contract, option map and credentials. No cloud SDK types here.

pub mod model;
pub mod ports;
