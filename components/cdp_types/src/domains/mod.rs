// Domain type definitions for the page-level protocol surface

pub mod dom;
