// ==========================================
// BOM Navigator - domain type definitions
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Node kind
// ==========================================
// Classification of a BOM tree node. AssemblyRef means the line's
// part number resolves to another indexed article with its own BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Article,
    AssemblyRef,
    Part,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Article => write!(f, "article"),
            NodeKind::AssemblyRef => write!(f, "assembly_ref"),
            NodeKind::Part => write!(f, "part"),
        }
    }
}

// ==========================================
// Order inclusion mode
// ==========================================
// What the order explosion emits for a selected tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncludeMode {
    /// Descend transparently, emit leaf parts only.
    PartsOnly,
    /// Emit only the selected node; the selection must be a leaf part.
    SelectedOnly,
    /// Emit every traversed line (sub-assembly lines included) plus the
    /// transparent explosion of referenced BOMs.
    SubsPlusParts,
}

impl fmt::Display for IncludeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeMode::PartsOnly => write!(f, "PARTS_ONLY"),
            IncludeMode::SelectedOnly => write!(f, "SELECTED_ONLY"),
            IncludeMode::SubsPlusParts => write!(f, "SUBS_PLUS_PARTS"),
        }
    }
}

// ==========================================
// Part type
// ==========================================
// Curated vocabulary; free-text values from imports are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Mechanical,
    Fastener,
    Packaging,
    Label,
    Documentation,
    Service,
    Other,
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartType::Mechanical => write!(f, "mechanical"),
            PartType::Fastener => write!(f, "fastener"),
            PartType::Packaging => write!(f, "packaging"),
            PartType::Label => write!(f, "label"),
            PartType::Documentation => write!(f, "documentation"),
            PartType::Service => write!(f, "service"),
            PartType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for PartType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mechanical" => Ok(PartType::Mechanical),
            "fastener" => Ok(PartType::Fastener),
            "packaging" => Ok(PartType::Packaging),
            "label" => Ok(PartType::Label),
            "documentation" => Ok(PartType::Documentation),
            "service" => Ok(PartType::Service),
            "other" => Ok(PartType::Other),
            other => Err(format!("invalid part_type: {other}")),
        }
    }
}

// ==========================================
// Document type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Pdf,
    Step,
    Dwg,
    Other,
}

impl DocType {
    /// Classify by file extension (lowercase, leading dot included).
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".pdf" => DocType::Pdf,
            ".step" | ".stp" => DocType::Step,
            ".dwg" | ".dxf" => DocType::Dwg,
            _ => DocType::Other,
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Pdf => write!(f, "pdf"),
            DocType::Step => write!(f, "step"),
            DocType::Dwg => write!(f, "dwg"),
            DocType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pdf" => Ok(DocType::Pdf),
            "step" => Ok(DocType::Step),
            "dwg" => Ok(DocType::Dwg),
            "other" => Ok(DocType::Other),
            other => Err(format!("invalid doc_type: {other}")),
        }
    }
}

// ==========================================
// Document link target
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTarget {
    Article,
    Part,
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Article => write!(f, "article"),
            LinkTarget::Part => write!(f, "part"),
        }
    }
}

impl FromStr for LinkTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "article" => Ok(LinkTarget::Article),
            "part" => Ok(LinkTarget::Part),
            other => Err(format!("invalid link target: {other}")),
        }
    }
}

// ==========================================
// Import run status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    CompletedWithWarnings,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::CompletedWithWarnings => write!(f, "completed_with_warnings"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "completed_with_warnings" => Ok(RunStatus::CompletedWithWarnings),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("invalid run status: {other}")),
        }
    }
}

// ==========================================
// Import issue severity
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Error => write!(f, "error"),
        }
    }
}
