//! Shapes of Vanta API payloads the adapter inspects or rewrites

mod person;

pub use person::filter_people_response;
