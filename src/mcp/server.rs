//! FLC MCP Server Implementation
//!
//! Implements the MCP server with all FLC tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::audit::Auditor;
use crate::build_info::BuildInfo;
use crate::nutrition::RawAmount;
use crate::tools::audit;
use crate::tools::status::StatusTracker;

/// FLC MCP Service
#[derive(Clone)]
pub struct FlcService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    auditor: Arc<Auditor>,
    tool_router: ToolRouter<FlcService>,
}

impl FlcService {
    pub fn new(auditor: Auditor) -> Self {
        let tracker = StatusTracker::new(BuildInfo::new(auditor.rules()), auditor.config().calorie_tolerance);
        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            auditor: Arc::new(auditor),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Audit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AuditLabelParams {
    /// Extracted label fields as a JSON object (see audit_instructions), or
    /// the raw extractor output as a string
    pub label: serde_json::Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegeneratePanelParams {
    /// Extracted label fields as a JSON object
    pub label: serde_json::Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RoundNutrientParams {
    /// Nutrient name or field (e.g. "sodium", "trans_fat_g", "Total Fat")
    pub nutrient: String,
    /// Amount as a number or text ("2.3", "142mg", "<1g")
    pub amount: serde_json::Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PercentDailyValueParams {
    /// Nutrient name or field
    pub nutrient: String,
    /// Amount in the nutrient's canonical unit (g, mg or mcg)
    pub amount: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertServingSizeParams {
    /// Metric serving text (e.g. "30g", "240 mL")
    pub serving_size: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckCaloriesParams {
    pub total_fat_g: f64,
    pub total_carb_g: f64,
    pub protein_g: f64,
    /// Declared calories per serving
    pub calories: f64,
    /// Tolerance fraction (default from server configuration, usually 0.15)
    pub tolerance: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DetectAllergensParams {
    /// Ingredient list text
    pub ingredients: String,
    /// The label's "Contains:" statement, if any
    pub allergen_statement: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClassifySweetenersParams {
    /// Ingredient list text
    pub ingredients: String,
    /// Extracted added sugars in grams
    pub added_sugars_g: f64,
    /// Extracted sugar alcohols in grams, if any
    pub sugar_alcohols_g: Option<f64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FlcService {
    // --- Status ---

    #[tool(description = "Get the current status of the FLC service including build info, rule table version, and process information")]
    async fn flc_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        to_json(&status)
    }

    #[tool(description = "Get the label field contract and how to read audit reports. Call this before extracting label data for audit_label.")]
    fn audit_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::AUDIT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(AUDIT_INSTRUCTIONS)]))
    }

    // --- Audit ---

    #[tool(description = "Audit an extracted food label against the nutrition labeling regulation. Returns a compliance report with score, status, issues by severity, detected allergens, corrections applied, and the regenerated nutrition panel.")]
    fn audit_label(&self, Parameters(p): Parameters<AuditLabelParams>) -> Result<CallToolResult, McpError> {
        let result = audit::audit_label(&self.auditor, p.label).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Regenerate a compliant Nutrition Facts panel (rounded amounts, %DV, household serving size) from extracted label fields")]
    fn regenerate_panel(&self, Parameters(p): Parameters<RegeneratePanelParams>) -> Result<CallToolResult, McpError> {
        let result = audit::regenerate_panel(&self.auditor, p.label).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    // --- Single Rules ---

    #[tool(description = "Round a nutrient amount to its mandated display value (e.g. trans fat 0.4g -> \"0\", sodium 142mg -> \"140\")")]
    fn round_nutrient(&self, Parameters(p): Parameters<RoundNutrientParams>) -> Result<CallToolResult, McpError> {
        let amount: RawAmount = serde_json::from_value(p.amount)
            .map_err(|e| McpError::invalid_params(format!("Invalid amount: {}", e), None))?;
        let result = audit::round_nutrient(&self.auditor, &p.nutrient, amount)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Compute percent daily value for a nutrient amount. Nutrients without a reference intake (trans fat, total sugars) return no percentage.")]
    fn percent_daily_value(&self, Parameters(p): Parameters<PercentDailyValueParams>) -> Result<CallToolResult, McpError> {
        let result = audit::percent_daily_value(&self.auditor, &p.nutrient, p.amount)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Convert a metric serving size to a household measure with the metric amount in parentheses (e.g. \"30g\" -> \"2 tbsp (30g)\")")]
    fn convert_serving_size(&self, Parameters(p): Parameters<ConvertServingSizeParams>) -> Result<CallToolResult, McpError> {
        let result = audit::convert_serving_size(&self.auditor, &p.serving_size)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Cross-check declared calories against fat*9 + carbohydrate*4 + protein*4. Advisory only.")]
    fn check_calories(&self, Parameters(p): Parameters<CheckCaloriesParams>) -> Result<CallToolResult, McpError> {
        let result = audit::check_calories(
            &self.auditor,
            p.total_fat_g,
            p.total_carb_g,
            p.protein_g,
            p.calories,
            p.tolerance,
        )
        .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Detect major food allergens in ingredient text and list those missing from the allergen statement")]
    fn detect_allergens(&self, Parameters(p): Parameters<DetectAllergensParams>) -> Result<CallToolResult, McpError> {
        let result = audit::detect_allergens(&self.auditor, &p.ingredients, p.allergen_statement.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Check whether extracted added sugars are really sugar alcohols (maltitol, sorbitol, E965, ...) and reclassify when unambiguous")]
    fn classify_sweeteners(&self, Parameters(p): Parameters<ClassifySweetenersParams>) -> Result<CallToolResult, McpError> {
        let result = audit::classify_sweeteners(&self.auditor, &p.ingredients, p.added_sugars_g, p.sugar_alcohols_g)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for FlcService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Food Label Compliance".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Food Label Compliance (FLC) - nutrition label audit and correction. \
                 IMPORTANT: Call audit_instructions before extracting label fields. \
                 Audit: audit_label (full report), regenerate_panel (rounded Nutrition Facts). \
                 Single rules: round_nutrient, percent_daily_value, convert_serving_size, \
                 check_calories, detect_allergens, classify_sweeteners. \
                 Status: flc_status."
                    .into(),
            ),
        }
    }
}
