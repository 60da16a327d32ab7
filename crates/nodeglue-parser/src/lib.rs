//! Prototype parser for the nodeglue generator.
//!
//! Turns single-line C declaration strings into structured
//! [`Signature`](nodeglue_core::Signature) values. The grammar is the
//! narrow subset GObject-style APIs are written in; everything else is a
//! [`ParseError`](nodeglue_core::ParseError).

pub mod prototype;

pub use prototype::parse_prototype;
