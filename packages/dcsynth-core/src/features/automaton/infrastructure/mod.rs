/*
 * Automaton Infrastructure
 *
 * Text mini-language reader/writer.
 */

mod text_format;

pub use text_format::TextFormat;
