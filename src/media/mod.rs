/// Media file handling module
///
/// This module handles:
/// - Local file handles and their format tags
/// - Process-local locators for live bytes
/// - Extracting preview frames and intrinsic metadata
/// - Importing files into the catalog

pub mod file;
pub mod import;
pub mod locator;
pub mod thumbnail;
