use serde::{Deserialize, Serialize};

use crate::{CellRef, Color, RangeParseError, RangeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellIsOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    Between,
    NotBetween,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfvoType {
    Min,
    Max,
    Number,
    Percent,
    Percentile,
    Formula,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cfvo {
    #[serde(rename = "type")]
    pub type_: CfvoType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopBottomKind {
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CfRuleKind {
    CellIs {
        operator: CellIsOperator,
        formulas: Vec<String>,
    },
    Expression {
        formula: String,
    },
    DataBar {
        min: Cfvo,
        max: Cfvo,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    ColorScale {
        cfvos: Vec<Cfvo>,
        colors: Vec<Color>,
    },
    TopBottom {
        kind: TopBottomKind,
        rank: u32,
        #[serde(default)]
        percent: bool,
    },
    UniqueDuplicate {
        unique: bool,
    },
    /// Rule kinds this crate does not model; the payload is carried verbatim.
    Unsupported {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_name: Option<String>,
        raw: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CfRule {
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dxf_id: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stop_if_true: bool,
    pub kind: CfRuleKind,
}

impl CfRule {
    /// Mutable access to every formula string carried by the rule.
    pub fn formulas_mut(&mut self) -> Vec<&mut String> {
        match &mut self.kind {
            CfRuleKind::CellIs { formulas, .. } => formulas.iter_mut().collect(),
            CfRuleKind::Expression { formula } => vec![formula],
            CfRuleKind::DataBar { min, max, .. } => {
                cfvo_formula(min).into_iter().chain(cfvo_formula(max)).collect()
            }
            CfRuleKind::ColorScale { cfvos, .. } => {
                cfvos.iter_mut().filter_map(cfvo_formula).collect()
            }
            CfRuleKind::TopBottom { .. }
            | CfRuleKind::UniqueDuplicate { .. }
            | CfRuleKind::Unsupported { .. } => Vec::new(),
        }
    }
}

/// A `<conditionalFormatting>` block: a range set plus the rules applied to it.
///
/// The range set is kept as text because legacy files can carry references the
/// parser rejects; structural edits report (and drop) those instead of failing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFormatting {
    pub sqref: String,
    pub rules: Vec<CfRule>,
}

impl ConditionalFormatting {
    pub fn new(ranges: &RangeSet, rules: Vec<CfRule>) -> Self {
        Self {
            sqref: ranges.format(),
            rules,
        }
    }

    pub fn ranges(&self) -> Result<RangeSet, RangeParseError> {
        RangeSet::parse(&self.sqref)
    }

    /// Highest precedence (lowest number) among the block's rules.
    pub fn priority(&self) -> Option<u32> {
        self.rules.iter().map(|r| r.priority).min()
    }

    pub fn applies_to_cell(&self, cell: CellRef) -> bool {
        self.ranges().is_ok_and(|set| set.contains(cell))
    }
}

fn cfvo_formula(cfvo: &mut Cfvo) -> Option<&mut String> {
    match cfvo.type_ {
        CfvoType::Formula => cfvo.value.as_mut(),
        _ => None,
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
