//! HQL error types

use crate::{
    ErrorCode, HQL0105, HQL0106, HQL0200, HQL0201, HQL0202, HQL0203, HQL0204, HQL0205, HQL0206,
    HQL0207, HQL0208, SourceLocation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
///
/// Advisories never stop interpretation; failures are [`HqlError`]s instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Deprecated or non-portable construct
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// An advisory message collected during interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    /// Help text registered for `code`, if any
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            help: code.info().help.map(str::to_string),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }
        Ok(())
    }
}

/// The construct rejected by strict JPA compliance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceViolationKind {
    ImplicitSelect,
    AliasedFetchJoin,
    UnmappedPolymorphism,
    FunctionCall,
    HqlCollectionFunction,
    ValueFunctionOnNonMap,
    ReservedWordAsAlias,
    SubqueryOrderBy,
    LimitOffsetClause,
}

impl ComplianceViolationKind {
    /// Error code reported for this kind of violation
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ImplicitSelect => HQL0200,
            Self::AliasedFetchJoin => HQL0201,
            Self::UnmappedPolymorphism => HQL0202,
            Self::FunctionCall => HQL0203,
            Self::HqlCollectionFunction => HQL0204,
            Self::ValueFunctionOnNonMap => HQL0205,
            Self::ReservedWordAsAlias => HQL0206,
            Self::SubqueryOrderBy => HQL0207,
            Self::LimitOffsetClause => HQL0208,
        }
    }
}

impl fmt::Display for ComplianceViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ImplicitSelect => "implicit select clause",
            Self::AliasedFetchJoin => "aliased fetch join",
            Self::UnmappedPolymorphism => "unmapped polymorphism",
            Self::FunctionCall => "non-standard function call",
            Self::HqlCollectionFunction => "HQL collection function",
            Self::ValueFunctionOnNonMap => "VALUE() on non-map",
            Self::ReservedWordAsAlias => "reserved word used as alias",
            Self::SubqueryOrderBy => "subquery ORDER BY",
            Self::LimitOffsetClause => "LIMIT/OFFSET clause",
        };
        f.write_str(name)
    }
}

/// Main HQL error type
#[derive(Debug, Clone, Error)]
pub enum HqlError {
    /// The query text was rejected by the grammar
    #[error("{code}: {message}")]
    Syntax {
        code: ErrorCode,
        message: String,
        query: String,
        location: Option<SourceLocation>,
    },

    /// The analyzer met a parse-tree shape the grammar should have ruled out
    #[error("{code}: {message}")]
    Parsing { code: ErrorCode, message: String },

    /// Meaning-level failure (resolution, typing)
    #[error("{code}: {message}")]
    Semantic { code: ErrorCode, message: String },

    /// Malformed numeric literal
    #[error("{code}: could not interpret numeric literal '{text}': {cause}")]
    NumberFormat {
        code: ErrorCode,
        /// Literal text exactly as written, suffix included
        text: String,
        cause: String,
    },

    /// Two bindings claim the same alias in one scope
    #[error("{code}: {message}")]
    AliasCollision {
        code: ErrorCode,
        alias: String,
        message: String,
    },

    /// Construct rejected in strict JPA compliance mode
    #[error("{code}: strict JPQL compliance violation ({kind}): {message}")]
    ComplianceViolation {
        code: ErrorCode,
        kind: ComplianceViolationKind,
        message: String,
    },
}

impl HqlError {
    /// Create a syntax error
    pub fn syntax(code: ErrorCode, message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Syntax {
            code,
            message: message.into(),
            query: query.into(),
            location: None,
        }
    }

    /// Create a syntax error with location
    pub fn syntax_at(
        code: ErrorCode,
        message: impl Into<String>,
        query: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Syntax {
            code,
            message: message.into(),
            query: query.into(),
            location: Some(location),
        }
    }

    /// Create a parsing (internal shape) error
    pub fn parsing(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Parsing {
            code,
            message: message.into(),
        }
    }

    /// Create a semantic error
    pub fn semantic(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Semantic {
            code,
            message: message.into(),
        }
    }

    /// Create a number format error
    pub fn number_format(text: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::NumberFormat {
            code: HQL0106,
            text: text.into(),
            cause: cause.to_string(),
        }
    }

    /// Create an alias collision error
    pub fn alias_collision(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AliasCollision {
            code: HQL0105,
            alias: alias.into(),
            message: message.into(),
        }
    }

    /// Create a strict compliance violation
    pub fn compliance(kind: ComplianceViolationKind, message: impl Into<String>) -> Self {
        Self::ComplianceViolation {
            code: kind.code(),
            kind,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax { code, .. }
            | Self::Parsing { code, .. }
            | Self::Semantic { code, .. }
            | Self::NumberFormat { code, .. }
            | Self::AliasCollision { code, .. }
            | Self::ComplianceViolation { code, .. } => *code,
        }
    }

    /// Whether this error belongs to the user-facing semantic family
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::Semantic { .. }
                | Self::NumberFormat { .. }
                | Self::AliasCollision { .. }
                | Self::ComplianceViolation { .. }
        )
    }

    /// The violated compliance rule, if this is a compliance violation
    pub fn compliance_kind(&self) -> Option<ComplianceViolationKind> {
        match self {
            Self::ComplianceViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Syntax { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
