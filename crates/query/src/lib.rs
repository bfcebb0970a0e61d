pub mod autocomplete;
pub mod backend;
pub mod client;
pub mod dispatcher;
pub mod email;
pub mod parser;
pub mod prompt;
