//! Prompt templates
//!
//! Each operation has a fixed template; argument values are substituted in.
//! Arguments have already been validated, so building a prompt cannot fail.
//! Absent optional arguments render as their defaults.

use serde_json::{Map, Value};

use crate::catalog::registry::Operation;

const DEFAULT_OBJECTIVES: &str = "maximize_return, minimize_risk";
const DEFAULT_TIME_HORIZON: &str = "Not specified";
const DEFAULT_REPORT_TYPE: &str = "summary";

/// Build the prompt text for `operation` from validated arguments
pub fn build_prompt(operation: Operation, args: &Map<String, Value>) -> String {
    match operation {
        Operation::AnalyzeInvestment => format!(
            "As an expert investment advisor, analyze the following investment scenario:\n\
             \n\
             Investment Amount: ${}\n\
             Risk Tolerance: {}\n\
             Time Horizon: {}\n\
             Goals: {}\n\
             \n\
             Provide a comprehensive analysis including:\n\
             1. Recommended asset allocation\n\
             2. Specific investment vehicles\n\
             3. Expected returns and risks\n\
             4. Tax considerations\n\
             5. Rebalancing strategy\n\
             \n\
             Format the response as structured recommendations.",
            args.get("investment_amount").map(format_amount).unwrap_or_default(),
            text(args.get("risk_tolerance")),
            text(args.get("time_horizon")),
            list(args.get("goals")).unwrap_or_default(),
        ),
        Operation::OptimizePortfolio => format!(
            "Optimize the following portfolio allocation:\n\
             \n\
             Current Allocation: {}\n\
             Constraints: {}\n\
             Objectives: {}\n\
             \n\
             Provide:\n\
             1. Optimized allocation percentages\n\
             2. Rationale for changes\n\
             3. Expected improvement metrics\n\
             4. Implementation timeline\n\
             5. Monitoring recommendations",
            pretty(args.get("current_allocation")),
            pretty(args.get("constraints")),
            list(args.get("objectives")).unwrap_or_else(|| DEFAULT_OBJECTIVES.to_string()),
        ),
        Operation::AssessRisk => format!(
            "Assess the risk profile of this investment portfolio:\n\
             \n\
             Portfolio: {}\n\
             Market Conditions: {}\n\
             Time Horizon: {}\n\
             \n\
             Provide:\n\
             1. Overall risk score (1-10)\n\
             2. Key risk factors\n\
             3. Diversification analysis\n\
             4. Stress test scenarios\n\
             5. Risk mitigation recommendations",
            pretty(args.get("portfolio")),
            pretty(args.get("market_conditions")),
            args.get("time_horizon")
                .map(|v| text(Some(v)))
                .unwrap_or_else(|| DEFAULT_TIME_HORIZON.to_string()),
        ),
        Operation::GenerateReport => format!(
            "Generate a {} investment report for:\n\
             \n\
             User Profile: {}\n\
             Portfolio Data: {}\n\
             \n\
             Include:\n\
             1. Executive summary\n\
             2. Current portfolio analysis\n\
             3. Performance metrics\n\
             4. Recommendations\n\
             5. Next steps\n\
             \n\
             Format as a professional investment report.",
            args.get("report_type")
                .map(|v| text(Some(v)))
                .unwrap_or_else(|| DEFAULT_REPORT_TYPE.to_string()),
            pretty(args.get("user_profile")),
            pretty(args.get("portfolio_data")),
        ),
    }
}

/// Strings verbatim, other values as compact JSON, absent as empty
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Array elements joined with ", "; `None` when absent
fn list(value: Option<&Value>) -> Option<String> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .map(|item| text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Two-space indented JSON; absent renders as an empty object
fn pretty(value: Option<&Value>) -> String {
    match value {
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        None => "{}".to_string(),
    }
}

/// Number with thousands separators, e.g. `100000` -> `100,000`
pub fn format_amount(value: &Value) -> String {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        other => return text(Some(other)),
    };

    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    // exponent forms like 1e21 are left alone
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return raw;
    }

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&json!(100000)), "100,000");
        assert_eq!(format_amount(&json!(999)), "999");
        assert_eq!(format_amount(&json!(1234567.5)), "1,234,567.5");
        assert_eq!(format_amount(&json!(-2500)), "-2,500");
    }

    #[test]
    fn test_analyze_prompt() {
        let prompt = build_prompt(
            Operation::AnalyzeInvestment,
            &args(json!({
                "investment_amount": 100000,
                "risk_tolerance": "moderate",
                "time_horizon": "5 years",
                "goals": ["retirement", "college"]
            })),
        );
        assert!(prompt.contains("Investment Amount: $100,000\n"));
        assert!(prompt.contains("Risk Tolerance: moderate\n"));
        assert!(prompt.contains("Time Horizon: 5 years\n"));
        assert!(prompt.contains("Goals: retirement, college\n"));
    }

    #[test]
    fn test_analyze_prompt_without_goals() {
        let prompt = build_prompt(
            Operation::AnalyzeInvestment,
            &args(json!({
                "investment_amount": 5000,
                "risk_tolerance": "conservative",
                "time_horizon": "1 year"
            })),
        );
        assert!(prompt.contains("Goals: \n"));
    }

    #[test]
    fn test_optimize_prompt_defaults() {
        let prompt = build_prompt(
            Operation::OptimizePortfolio,
            &args(json!({"current_allocation": {}})),
        );
        assert!(prompt.contains("Current Allocation: {}\n"));
        assert!(prompt.contains("Constraints: {}\n"));
        assert!(prompt.contains("Objectives: maximize_return, minimize_risk\n"));
    }

    #[test]
    fn test_assess_risk_prompt_pretty_prints() {
        let prompt = build_prompt(
            Operation::AssessRisk,
            &args(json!({"portfolio": {"stocks": 60}})),
        );
        assert!(prompt.contains("Portfolio: {\n  \"stocks\": 60\n}\n"));
        assert!(prompt.contains("Time Horizon: Not specified\n"));
    }

    #[test]
    fn test_pretty_keeps_caller_key_order() {
        let prompt = build_prompt(
            Operation::OptimizePortfolio,
            &args(json!({"current_allocation": {"stocks": 60, "bonds": 30, "cash": 10}})),
        );
        assert!(prompt.contains(
            "Current Allocation: {\n  \"stocks\": 60,\n  \"bonds\": 30,\n  \"cash\": 10\n}\n"
        ));
    }

    #[test]
    fn test_report_prompt_type() {
        let base = json!({"user_profile": {"age": 40}, "portfolio_data": {}});
        let prompt = build_prompt(Operation::GenerateReport, &args(base.clone()));
        assert!(prompt.starts_with("Generate a summary investment report for:"));

        let mut detailed = base;
        detailed["report_type"] = json!("risk_analysis");
        let prompt = build_prompt(Operation::GenerateReport, &args(detailed));
        assert!(prompt.starts_with("Generate a risk_analysis investment report for:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = args(json!({"portfolio": {"bonds": 40, "stocks": 60}}));
        assert_eq!(
            build_prompt(Operation::AssessRisk, &a),
            build_prompt(Operation::AssessRisk, &a)
        );
    }
}
