//! Runs the parsers generated from the grammars in `ygen/tests` and
//! `grammars`.
#![cfg(test)]

mod harness;

mod g_annot;
mod g_blocks;
mod g_calc;
mod g_families;
