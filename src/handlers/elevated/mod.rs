// handlers/elevated/mod.rs - Elevated handlers (service-role JWT required)
//
// Security Level: role = service_role
// Route Prefix: /api/ingest/*
//
// Called by schedulers to refresh shared market data.

pub mod ingest;

pub use ingest::{dune_post, market_data_post};
