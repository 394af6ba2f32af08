//
//  codes.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Fixed short codes used by the compact format. Every encode function
//! has an exact inverse here so the decoder never guesses.

use crate::graph::types::*;

/// Compact format version written under `v`.
pub const FORMAT_VERSION: u64 = 1;

// ─── Top-level sections ─────────────────────────────────────────

pub const VERSION: &str = "v";
pub const INDEX: &str = "idx";
pub const METADATA: &str = "md";
pub const COMPONENTS: &str = "cmp";
pub const EDGES: &str = "edg";
pub const CROSSROADS: &str = "crd";
pub const CRITICAL_PATHS: &str = "cp";
pub const DIAGNOSTICS: &str = "dg";

// ─── Metadata keys ──────────────────────────────────────────────

pub const MD_FILES_DISCOVERED: &str = "fd";
pub const MD_FILES_ANALYZED: &str = "fa";
pub const MD_FILES_FAILED: &str = "ff";
pub const MD_COMPONENTS_FOUND: &str = "cf";
pub const MD_INTEGRATION_POINTS: &str = "tip";
pub const MD_CROSSROADS: &str = "crs";
pub const MD_CRITICAL_PATHS: &str = "tcp";
pub const MD_TIMESTAMP: &str = "ts";

// ─── Component keys ─────────────────────────────────────────────

pub const CMP_ID: &str = "i";
pub const CMP_TYPE: &str = "t";
pub const CMP_LINES: &str = "l";
pub const CMP_PATH: &str = "pa";
pub const CMP_DOC: &str = "d";
pub const CMP_CHILDREN: &str = "c";
pub const CMP_METHODS: &str = "m";
pub const CMP_BASES: &str = "b";
pub const CMP_ATTRIBUTES: &str = "at";
pub const CMP_PARAMETERS: &str = "pr";
pub const CMP_ASYNC: &str = "as";

// ─── Edge payload keys ──────────────────────────────────────────

pub const EDGE_ITEMS: &str = "it";
pub const EDGE_ARGS: &str = "a";
pub const EDGE_BASES: &str = "b";

/// Target slot value for targets without an index ID.
pub const NO_TARGET: i64 = -1;

/// Kind code of a symbol entry. Functions are split by scope.
pub fn kind_code(entry: &SymbolEntry) -> &'static str {
    match &entry.detail {
        SymbolDetail::Package => "pk",
        SymbolDetail::Module => "mo",
        SymbolDetail::Class(_) => "c",
        SymbolDetail::Function(info) => match info.scope {
            FunctionScope::ModuleLevel => "f",
            FunctionScope::Method => "m",
            FunctionScope::Nested => "nf",
        },
    }
}

/// Inverse of [`kind_code`]. The scope is `Some` for function codes.
pub fn parse_kind_code(code: &str) -> Option<(SymbolKind, Option<FunctionScope>)> {
    match code {
        "pk" => Some((SymbolKind::Package, None)),
        "mo" => Some((SymbolKind::Module, None)),
        "c" => Some((SymbolKind::Class, None)),
        "f" => Some((SymbolKind::Function, Some(FunctionScope::ModuleLevel))),
        "m" => Some((SymbolKind::Function, Some(FunctionScope::Method))),
        "nf" => Some((SymbolKind::Function, Some(FunctionScope::Nested))),
        _ => None,
    }
}

/// Edge type as it appears in compact edge arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCode {
    ImportModule,
    ImportFrom,
    Call,
    AttributeRead,
    AttributeWrite,
    Inheritance,
}

impl EdgeCode {
    pub fn of(edge: &Edge) -> Self {
        match &edge.detail {
            EdgeDetail::Import { form, .. } => match form {
                ImportForm::ImportModule => EdgeCode::ImportModule,
                ImportForm::ImportFrom => EdgeCode::ImportFrom,
            },
            EdgeDetail::Call { .. } => EdgeCode::Call,
            EdgeDetail::Attribute { access, .. } => match access {
                AttributeAccess::Read => EdgeCode::AttributeRead,
                AttributeAccess::Write => EdgeCode::AttributeWrite,
            },
            EdgeDetail::Inheritance { .. } => EdgeCode::Inheritance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeCode::ImportModule => "im",
            EdgeCode::ImportFrom => "imf",
            EdgeCode::Call => "c",
            EdgeCode::AttributeRead => "ar",
            EdgeCode::AttributeWrite => "aw",
            EdgeCode::Inheritance => "in",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "im" => Some(EdgeCode::ImportModule),
            "imf" => Some(EdgeCode::ImportFrom),
            "c" => Some(EdgeCode::Call),
            "ar" => Some(EdgeCode::AttributeRead),
            "aw" => Some(EdgeCode::AttributeWrite),
            "in" => Some(EdgeCode::Inheritance),
            _ => None,
        }
    }
}

pub fn severity_code(severity: Severity) -> &'static str {
    match severity {
        Severity::Medium => "m",
        Severity::High => "h",
    }
}

pub fn parse_severity_code(code: &str) -> Option<Severity> {
    match code {
        "m" => Some(Severity::Medium),
        "h" => Some(Severity::High),
        _ => None,
    }
}

pub fn phase_code(phase: Phase) -> &'static str {
    match phase {
        Phase::Discovery => "d",
        Phase::Hierarchy => "h",
        Phase::Integration => "i",
    }
}

pub fn parse_phase_code(code: &str) -> Option<Phase> {
    match code {
        "d" => Some(Phase::Discovery),
        "h" => Some(Phase::Hierarchy),
        "i" => Some(Phase::Integration),
        _ => None,
    }
}

pub fn diagnostic_code(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::ParseFailure => "pf",
        DiagnosticKind::StructuralInconsistency => "si",
    }
}

pub fn parse_diagnostic_code(code: &str) -> Option<DiagnosticKind> {
    match code {
        "pf" => Some(DiagnosticKind::ParseFailure),
        "si" => Some(DiagnosticKind::StructuralInconsistency),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_codes_are_bijective() {
        let all = [
            EdgeCode::ImportModule,
            EdgeCode::ImportFrom,
            EdgeCode::Call,
            EdgeCode::AttributeRead,
            EdgeCode::AttributeWrite,
            EdgeCode::Inheritance,
        ];
        for code in all {
            assert_eq!(EdgeCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(EdgeCode::parse("zz"), None);
    }

    #[test]
    fn test_kind_codes_cover_function_scopes() {
        let method = SymbolEntry::function(
            "m.C.run",
            "m.py",
            LineRange::new(2, 3),
            None,
            FunctionInfo {
                parameters: vec!["self".into()],
                scope: FunctionScope::Method,
                is_async: false,
            },
        );
        assert_eq!(kind_code(&method), "m");
        assert_eq!(
            parse_kind_code("m"),
            Some((SymbolKind::Function, Some(FunctionScope::Method)))
        );
        assert_eq!(parse_kind_code("mo"), Some((SymbolKind::Module, None)));
        assert_eq!(parse_kind_code("?"), None);
    }
}
