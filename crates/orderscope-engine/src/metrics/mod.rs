pub mod behavior;
pub mod cohorts;
pub mod details;
pub mod funnel;
pub mod geography;
pub mod methods;
pub mod products;
pub mod realtime;
pub mod revenue;
pub mod segmentation;
pub mod trends;
pub mod velocity;
