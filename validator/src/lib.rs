pub mod authorizer;
pub mod block_validation;
pub mod controller;
pub mod signature;
pub mod update_builder;
