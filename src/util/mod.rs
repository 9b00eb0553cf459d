pub mod xml;
pub mod xmlrpc;
