//! Production minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Comments are always
//! stripped; no separate license file is produced.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

/// A chunk or stylesheet the minifier could not parse.
#[derive(Debug, Error)]
#[error("failed to minify `{name}`: {message}")]
pub struct MinifyError {
    pub name: String,
    pub message: String,
}

impl MinifyError {
    fn new(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Minify a JavaScript chunk. `name` identifies it in errors.
pub fn minify_js(name: &str, source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(first) = ret.errors.first() {
        return Err(MinifyError::new(name, first.to_string()));
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS text.
pub fn minify_css(name: &str, source: &str) -> Result<String, MinifyError> {
    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| MinifyError::new(name, e.to_string()))?;
    // `/*! ... */` banners are kept by lightningcss unless cleared
    stylesheet.license_comments.clear();
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| MinifyError::new(name, e.to_string()))?;
    Ok(result.code)
}
