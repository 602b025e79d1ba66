//! User-authored rules that steer the recommendation engine.
//!
//! Rules are structured records here; the engine consumes them as the
//! rendered natural-language lines produced by [`render_rules`]. Rule
//! interpretation itself belongs to the engine, not this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TankError};
use crate::model::asset::RemainingLife;

/// The asset columns a rule condition may reference. This is also the
/// documented column contract for imports: the serialized names are the
/// canonical field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetColumn {
    YearInstalled,
    Material,
    SystemType,
    AssetSubType,
    SetbackFromWaterSource,
    SetbackFromHouse,
    TankBuryDepth,
    OpeningSize,
    AboveGroundCollarHeight,
    SiteCondition,
    CoverCondition,
    CollarCondition,
    InteriorCondition,
    OverallCondition,
    FieldNotes,
}

/// Broad type of a column, which constrains the operators that apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Enumerated,
    Text,
}

impl AssetColumn {
    pub const ALL: [AssetColumn; 15] = [
        AssetColumn::YearInstalled,
        AssetColumn::Material,
        AssetColumn::SystemType,
        AssetColumn::AssetSubType,
        AssetColumn::SetbackFromWaterSource,
        AssetColumn::SetbackFromHouse,
        AssetColumn::TankBuryDepth,
        AssetColumn::OpeningSize,
        AssetColumn::AboveGroundCollarHeight,
        AssetColumn::SiteCondition,
        AssetColumn::CoverCondition,
        AssetColumn::CollarCondition,
        AssetColumn::InteriorCondition,
        AssetColumn::OverallCondition,
        AssetColumn::FieldNotes,
    ];

    /// The serialized camelCase field name.
    pub fn key(&self) -> &'static str {
        match self {
            AssetColumn::YearInstalled => "yearInstalled",
            AssetColumn::Material => "material",
            AssetColumn::SystemType => "systemType",
            AssetColumn::AssetSubType => "assetSubType",
            AssetColumn::SetbackFromWaterSource => "setbackFromWaterSource",
            AssetColumn::SetbackFromHouse => "setbackFromHouse",
            AssetColumn::TankBuryDepth => "tankBuryDepth",
            AssetColumn::OpeningSize => "openingSize",
            AssetColumn::AboveGroundCollarHeight => "aboveGroundCollarHeight",
            AssetColumn::SiteCondition => "siteCondition",
            AssetColumn::CoverCondition => "coverCondition",
            AssetColumn::CollarCondition => "collarCondition",
            AssetColumn::InteriorCondition => "interiorCondition",
            AssetColumn::OverallCondition => "overallCondition",
            AssetColumn::FieldNotes => "fieldNotes",
        }
    }

    /// Human-readable label, used in rendered rules and table headers.
    pub fn label(&self) -> &'static str {
        match self {
            AssetColumn::YearInstalled => "Year Installed",
            AssetColumn::Material => "Material",
            AssetColumn::SystemType => "System Type",
            AssetColumn::AssetSubType => "Sub-Type",
            AssetColumn::SetbackFromWaterSource => "Setback Water (m)",
            AssetColumn::SetbackFromHouse => "Setback House (m)",
            AssetColumn::TankBuryDepth => "Bury Depth (m)",
            AssetColumn::OpeningSize => "Opening Size (m)",
            AssetColumn::AboveGroundCollarHeight => "Collar Height (m)",
            AssetColumn::SiteCondition => "Site Condition",
            AssetColumn::CoverCondition => "Cover Condition",
            AssetColumn::CollarCondition => "Collar Condition",
            AssetColumn::InteriorCondition => "Interior Condition",
            AssetColumn::OverallCondition => "Overall Condition",
            AssetColumn::FieldNotes => "Field Notes",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            AssetColumn::Material | AssetColumn::SystemType | AssetColumn::AssetSubType => {
                ColumnKind::Enumerated
            }
            AssetColumn::FieldNotes => ColumnKind::Text,
            _ => ColumnKind::Numeric,
        }
    }
}

impl fmt::Display for AssetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AssetColumn {
    type Err = TankError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.key() == value)
            .ok_or_else(|| TankError::InvalidInput(format!("Unknown asset column: {}", value)))
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

impl Operator {
    /// Whether this operator is legal for a column of the given kind.
    pub fn applies_to(&self, kind: ColumnKind) -> bool {
        match kind {
            ColumnKind::Numeric => !matches!(self, Operator::Contains),
            ColumnKind::Enumerated => matches!(self, Operator::Eq | Operator::Neq),
            ColumnKind::Text => matches!(self, Operator::Contains),
        }
    }

    /// English phrasing used when rendering rules for the engine.
    pub fn phrase(&self) -> &'static str {
        match self {
            Operator::Eq => "is",
            Operator::Neq => "is not",
            Operator::Gt => "is greater than",
            Operator::Gte => "is at least",
            Operator::Lt => "is less than",
            Operator::Lte => "is at most",
            Operator::Contains => "contains",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Operator {
    type Err = TankError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "eq" => Ok(Operator::Eq),
            "neq" => Ok(Operator::Neq),
            "gt" => Ok(Operator::Gt),
            "gte" => Ok(Operator::Gte),
            "lt" => Ok(Operator::Lt),
            "lte" => Ok(Operator::Lte),
            "contains" => Ok(Operator::Contains),
            other => Err(TankError::InvalidInput(format!(
                "Unknown operator: {} (use eq/neq/gt/gte/lt/lte/contains)",
                other
            ))),
        }
    }
}

/// Comparison value or text fragment of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Number(value) => write!(f, "{}", value),
            ConditionValue::Text(value) => f.write_str(value),
        }
    }
}

/// One condition of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub column: AssetColumn,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn validate(&self) -> Result<()> {
        let kind = self.column.kind();
        if !self.operator.applies_to(kind) {
            return Err(TankError::Validation(format!(
                "Operator {} does not apply to column {}",
                self.operator, self.column
            )));
        }
        match (kind, &self.value) {
            (ColumnKind::Numeric, ConditionValue::Text(text)) => Err(TankError::Validation(
                format!("Column {} needs a numeric value, got {:?}", self.column, text),
            )),
            (ColumnKind::Enumerated | ColumnKind::Text, ConditionValue::Number(number)) => {
                Err(TankError::Validation(format!(
                    "Column {} needs a text value, got {}",
                    self.column, number
                )))
            }
            _ => Ok(()),
        }
    }
}

/// How a rule's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn joiner(&self) -> &'static str {
        match self {
            Combinator::And => " and ",
            Combinator::Or => " or ",
        }
    }
}

impl FromStr for Combinator {
    type Err = TankError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            other => Err(TankError::InvalidInput(format!(
                "Unknown combinator: {} (use and/or)",
                other
            ))),
        }
    }
}

/// Exactly one outcome per rule, tagged by rule type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ruleType", rename_all = "camelCase")]
pub enum RuleOutcome {
    /// Free-text repair recommendation the engine should emit verbatim.
    Recommendation { text: String },
    /// Remaining-life band the engine must use when the rule matches.
    RemainingLife { band: RemainingLife },
}

/// A user-authored conditional statement sent to the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub combinator: Combinator,
    pub outcome: RuleOutcome,
}

impl Rule {
    /// Check the rule invariants: at least one condition, every condition
    /// well-typed for its column, outcome text non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.conditions.is_empty() {
            return Err(TankError::Validation(
                "A rule needs at least one condition".to_string(),
            ));
        }
        for condition in &self.conditions {
            condition.validate()?;
        }
        if let RuleOutcome::Recommendation { text } = &self.outcome {
            if text.trim().is_empty() {
                return Err(TankError::Validation(
                    "A recommendation rule needs recommendation text".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Render this rule as one natural-language line for the engine prompt.
    pub fn render(&self) -> String {
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| {
                format!(
                    "{} {} {}",
                    condition.column.label(),
                    condition.operator.phrase(),
                    condition.value
                )
            })
            .collect();
        let body = clauses.join(self.combinator.joiner());
        match &self.outcome {
            RuleOutcome::Recommendation { text } => {
                format!("If {}, then recommend: {}", body, text)
            }
            RuleOutcome::RemainingLife { band } => {
                format!("If {}, then the remaining life is {}", body, band)
            }
        }
    }
}

/// Flatten rules into the newline-separated string the engine request
/// carries. Empty input renders as an empty string, which the engine
/// treats as "no user-defined rules".
pub fn render_rules(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(Rule::render)
        .collect::<Vec<_>>()
        .join("\n")
}
