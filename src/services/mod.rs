pub mod discharge;
pub mod doctor;
pub mod lab;
pub mod pharmacy;
pub mod registration;
