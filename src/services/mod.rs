pub mod bus_api;

pub use bus_api::BusApi;
