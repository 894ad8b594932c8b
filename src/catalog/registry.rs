//! Operation registry
//!
//! The fixed catalog of advisory operations, built once at startup and shared
//! read-only by every dispatch.

use std::fmt;

use crate::bedrock::family::ModelFamily;
use crate::catalog::schema::InputSchema;
use crate::error::{ConfigError, DispatchError, Result};

/// Advisory operations offered to the calling agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AnalyzeInvestment,
    OptimizePortfolio,
    AssessRisk,
    GenerateReport,
}

impl Operation {
    /// Advertisement order
    pub const ALL: [Operation; 4] = [
        Operation::AnalyzeInvestment,
        Operation::OptimizePortfolio,
        Operation::AssessRisk,
        Operation::GenerateReport,
    ];

    /// Tool name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AnalyzeInvestment => "analyze-investment",
            Operation::OptimizePortfolio => "optimize-portfolio",
            Operation::AssessRisk => "assess-risk",
            Operation::GenerateReport => "generate-report",
        }
    }

    /// Heading placed above a successful result
    pub fn label(&self) -> &'static str {
        match self {
            Operation::AnalyzeInvestment => "Investment Analysis",
            Operation::OptimizePortfolio => "Portfolio Optimization",
            Operation::AssessRisk => "Risk Assessment",
            Operation::GenerateReport => "Investment Report",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::AnalyzeInvestment => "Analyze investment scenarios using AI",
            Operation::OptimizePortfolio => "Optimize portfolio allocation using AI",
            Operation::AssessRisk => "Assess investment risk using AI models",
            Operation::GenerateReport => "Generate comprehensive investment report",
        }
    }

    /// Model family that serves this operation by default
    pub fn default_family(&self) -> ModelFamily {
        match self {
            Operation::AnalyzeInvestment => ModelFamily::Titan,
            Operation::OptimizePortfolio => ModelFamily::Nova,
            Operation::AssessRisk => ModelFamily::Claude,
            Operation::GenerateReport => ModelFamily::Titan,
        }
    }

    pub fn input_schema(&self) -> InputSchema {
        match self {
            Operation::AnalyzeInvestment => analyze_investment_schema(),
            Operation::OptimizePortfolio => optimize_portfolio_schema(),
            Operation::AssessRisk => assess_risk_schema(),
            Operation::GenerateReport => generate_report_schema(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One advertised operation
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub operation: Operation,
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
    pub family: ModelFamily,
}

impl OperationSpec {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            name: operation.name().to_string(),
            description: operation.description().to_string(),
            input_schema: operation.input_schema(),
            family: operation.default_family(),
        }
    }

    /// Serve this operation with a different model family
    pub fn with_family(mut self, family: ModelFamily) -> Self {
        self.family = family;
        self
    }
}

/// Immutable catalog of operations
#[derive(Debug)]
pub struct Registry {
    specs: Vec<OperationSpec>,
}

impl Registry {
    /// Build a registry, rejecting duplicate names and malformed schemas
    pub fn from_specs(specs: Vec<OperationSpec>) -> Result<Self> {
        for (i, spec) in specs.iter().enumerate() {
            if specs[..i].iter().any(|other| other.name == spec.name) {
                return Err(ConfigError::DuplicateOperation {
                    name: spec.name.clone(),
                }
                .into());
            }
            spec.input_schema
                .verify()
                .map_err(|message| ConfigError::InvalidSchema {
                    operation: spec.name.clone(),
                    message,
                })?;
        }

        Ok(Self { specs })
    }

    /// The built-in advisory catalog
    pub fn builtin() -> Result<Self> {
        Self::from_specs(Operation::ALL.iter().copied().map(OperationSpec::new).collect())
    }

    /// All operations in advertisement order
    pub fn list(&self) -> &[OperationSpec] {
        &self.specs
    }

    /// Look up an operation by wire name
    pub fn get(&self, name: &str) -> std::result::Result<&OperationSpec, DispatchError> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| DispatchError::UnknownOperation {
                name: name.to_string(),
            })
    }
}

// ==================== Schemas ====================

fn analyze_investment_schema() -> InputSchema {
    InputSchema::object(
        vec![
            (
                "investment_amount",
                InputSchema::number().describe("Amount to invest, in dollars"),
            ),
            (
                "risk_tolerance",
                InputSchema::enumeration(&["conservative", "moderate", "aggressive"]),
            ),
            (
                "time_horizon",
                InputSchema::string().describe("Investment horizon, e.g. \"5 years\""),
            ),
            ("goals", InputSchema::array(InputSchema::string())),
        ],
        &["investment_amount", "risk_tolerance", "time_horizon"],
    )
}

fn optimize_portfolio_schema() -> InputSchema {
    InputSchema::object(
        vec![
            (
                "current_allocation",
                InputSchema::any_object().describe("Current holdings by asset class"),
            ),
            ("constraints", InputSchema::any_object()),
            ("objectives", InputSchema::array(InputSchema::string())),
        ],
        &["current_allocation"],
    )
}

fn assess_risk_schema() -> InputSchema {
    InputSchema::object(
        vec![
            ("portfolio", InputSchema::any_object()),
            ("market_conditions", InputSchema::any_object()),
            ("time_horizon", InputSchema::string()),
        ],
        &["portfolio"],
    )
}

fn generate_report_schema() -> InputSchema {
    InputSchema::object(
        vec![
            ("user_profile", InputSchema::any_object()),
            ("portfolio_data", InputSchema::any_object()),
            (
                "report_type",
                InputSchema::enumeration(&["summary", "detailed", "risk_analysis"]),
            ),
        ],
        &["user_profile", "portfolio_data"],
    )
}
