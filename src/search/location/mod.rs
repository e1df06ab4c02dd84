

pub mod gazetteer;
pub mod resolver;


pub use gazetteer::{Place, Region};
pub use resolver::LocationResolver;
