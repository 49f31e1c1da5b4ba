pub mod audit;
pub mod auth;
pub mod commands;
pub mod guilds;
pub mod interactions;
pub mod messages;
pub mod tenants;
