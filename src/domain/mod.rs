// Domain layer: record model, money types and the line-deriving ports.

pub mod format;
pub mod model;
pub mod money;
pub mod name;
pub mod ports;
