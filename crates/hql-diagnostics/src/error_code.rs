//! HQL error codes following a structured numbering system
//!
//! Error code ranges:
//! - HQL0001-HQL0099: Syntax errors (text rejected by the grammar)
//! - HQL0100-HQL0199: Semantic errors (resolution, typing, aliasing)
//! - HQL0200-HQL0299: Strict JPA compliance violations
//! - HQL0400-HQL0499: Internal errors (unexpected parse-tree shapes)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a syntax error (0001-0099)
    pub const fn is_syntax_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a semantic error (0100-0199)
    pub const fn is_semantic_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a compliance violation (0200-0299)
    pub const fn is_compliance_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is an internal error (0400-0499)
    pub const fn is_internal_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HQL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Syntax errors (0001-0099)
    map.insert(1, ErrorInfo::new("Unexpected token"));
    map.insert(2, ErrorInfo::new("Unexpected end of input"));
    map.insert(3, ErrorInfo::new("Unterminated string literal"));
    map.insert(4, ErrorInfo::new("Invalid number format"));
    map.insert(5, ErrorInfo::new("Expected expression"));
    map.insert(6, ErrorInfo::new("Expected identifier"));
    map.insert(7, ErrorInfo::new("Missing closing delimiter"));

    // Semantic errors (0100-0199)
    map.insert(100, ErrorInfo::new("Could not interpret token")
        .with_help("Check that the alias, entity name or constant is spelled correctly"));
    map.insert(101, ErrorInfo::new("Unknown entity"));
    map.insert(102, ErrorInfo::new("Unknown attribute"));
    map.insert(103, ErrorInfo::new("Not a collection"));
    map.insert(104, ErrorInfo::new("Ambiguous attribute reference")
        .with_help("Qualify the attribute with an identification variable"));
    map.insert(105, ErrorInfo::new("Alias collision"));
    map.insert(106, ErrorInfo::new("Malformed numeric literal"));
    map.insert(107, ErrorInfo::new("Invalid sort ordering"));
    map.insert(108, ErrorInfo::new("Unresolvable class"));
    map.insert(109, ErrorInfo::new("Invalid join"));
    map.insert(110, ErrorInfo::new("Unbound identification variable"));
    map.insert(111, ErrorInfo::new("Invalid treat target"));
    map.insert(112, ErrorInfo::new("Invalid map function argument"));
    map.insert(113, ErrorInfo::new("Invalid parameter"));
    map.insert(114, ErrorInfo::new("Invalid dynamic instantiation"));
    map.insert(115, ErrorInfo::new("Invalid collection function argument"));
    map.insert(116, ErrorInfo::new("Invalid from element space"));

    // Compliance violations (0200-0299)
    map.insert(200, ErrorInfo::new("Implicit select clause")
        .with_help("Add an explicit SELECT clause"));
    map.insert(201, ErrorInfo::new("Aliased fetch join"));
    map.insert(202, ErrorInfo::new("Unmapped polymorphic reference"));
    map.insert(203, ErrorInfo::new("Non-standard function call"));
    map.insert(204, ErrorInfo::new("HQL collection function"));
    map.insert(205, ErrorInfo::new("VALUE() applied to a non-map collection"));
    map.insert(206, ErrorInfo::new("Reserved word used as alias"));
    map.insert(207, ErrorInfo::new("ORDER BY in subquery"));
    map.insert(208, ErrorInfo::new("LIMIT/OFFSET clause"));

    // Internal errors (0400-0499)
    map.insert(400, ErrorInfo::new("Unexpected parse tree shape")
        .with_help("This indicates a mismatch between the parser and the analyzer"));
    map.insert(401, ErrorInfo::new("Invalid operand count"));
    map.insert(402, ErrorInfo::new("Invalid character literal"));

    map
});

// Syntax errors
pub const HQL0001: ErrorCode = ErrorCode::new(1);
pub const HQL0002: ErrorCode = ErrorCode::new(2);
pub const HQL0003: ErrorCode = ErrorCode::new(3);
pub const HQL0004: ErrorCode = ErrorCode::new(4);
pub const HQL0005: ErrorCode = ErrorCode::new(5);
pub const HQL0006: ErrorCode = ErrorCode::new(6);
pub const HQL0007: ErrorCode = ErrorCode::new(7);

// Semantic errors
pub const HQL0100: ErrorCode = ErrorCode::new(100);
pub const HQL0101: ErrorCode = ErrorCode::new(101);
pub const HQL0102: ErrorCode = ErrorCode::new(102);
pub const HQL0103: ErrorCode = ErrorCode::new(103);
pub const HQL0104: ErrorCode = ErrorCode::new(104);
pub const HQL0105: ErrorCode = ErrorCode::new(105);
pub const HQL0106: ErrorCode = ErrorCode::new(106);
pub const HQL0107: ErrorCode = ErrorCode::new(107);
pub const HQL0108: ErrorCode = ErrorCode::new(108);
pub const HQL0109: ErrorCode = ErrorCode::new(109);
pub const HQL0110: ErrorCode = ErrorCode::new(110);
pub const HQL0111: ErrorCode = ErrorCode::new(111);
pub const HQL0112: ErrorCode = ErrorCode::new(112);
pub const HQL0113: ErrorCode = ErrorCode::new(113);
pub const HQL0114: ErrorCode = ErrorCode::new(114);
pub const HQL0115: ErrorCode = ErrorCode::new(115);
pub const HQL0116: ErrorCode = ErrorCode::new(116);

// Compliance violations
pub const HQL0200: ErrorCode = ErrorCode::new(200);
pub const HQL0201: ErrorCode = ErrorCode::new(201);
pub const HQL0202: ErrorCode = ErrorCode::new(202);
pub const HQL0203: ErrorCode = ErrorCode::new(203);
pub const HQL0204: ErrorCode = ErrorCode::new(204);
pub const HQL0205: ErrorCode = ErrorCode::new(205);
pub const HQL0206: ErrorCode = ErrorCode::new(206);
pub const HQL0207: ErrorCode = ErrorCode::new(207);
pub const HQL0208: ErrorCode = ErrorCode::new(208);

// Internal errors
pub const HQL0400: ErrorCode = ErrorCode::new(400);
pub const HQL0401: ErrorCode = ErrorCode::new(401);
pub const HQL0402: ErrorCode = ErrorCode::new(402);
