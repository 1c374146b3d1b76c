// Core modules shared by the value contract, the client facade and the CLI.
pub mod error;
