// Domain layer: storage location models and ports (interfaces). No backend specifics here.

pub mod model;
pub mod ports;
