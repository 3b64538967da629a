#![forbid(unsafe_code)]

pub mod common;
pub mod firewall;
pub mod packet;
pub mod routing;
pub mod rule;
