#![deny(unsafe_code)]

pub mod net;
