#![forbid(unsafe_code)]

pub mod firewall_service_impl;
pub mod packet_pipeline;
pub mod routing_service_impl;
