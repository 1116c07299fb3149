//! Financial text generation

use crate::llm::{LlmFactory, LlmOptions};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::info;

const REPORT_SYSTEM_PROMPT: &str = "You are a professional financial analyst.
Generate a detailed financial report in a structured format including:
1. Executive Summary
2. Company Overview
3. Financial Performance Analysis
4. Key Metrics and Ratios
5. Recommendations and Outlook

Use financial terminology appropriately and maintain a professional tone.";

const INVESTMENT_SYSTEM_PROMPT: &str = "You are a financial investment expert.
Generate a comprehensive investment analysis based on the provided market data.
For each investment opportunity, provide:
1. The investment type/asset
2. Risk assessment
3. Potential returns
4. Market outlook

Order the recommendations from most attractive to least attractive.";

const RISK_SYSTEM_PROMPT: &str = "You are a financial risk management expert.
Generate a comprehensive risk assessment that includes:
1. Market risk analysis
2. Credit risk evaluation
3. Liquidity risk assessment
4. Operational risk factors
5. Risk mitigation strategies

Consider the portfolio composition and current market conditions in your analysis.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenMethod {
    #[default]
    GenerateFinancialReport,
    GenerateInvestmentAnalysis,
    GenerateRiskAssessment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<String>,
    #[serde(default)]
    pub financial_history: Option<String>,
}

impl fmt::Display for CompanyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}", self.name)?;
        if let Some(sector) = &self.sector {
            write!(f, "\nSector: {}", sector)?;
        }
        if let Some(market_cap) = &self.market_cap {
            write!(f, "\nMarket cap: {}", market_cap)?;
        }
        if let Some(history) = &self.financial_history {
            write!(f, "\nFinancial history: {}", history)?;
        }
        Ok(())
    }
}

/// Everything a generation request may carry; each method reads its own fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenRequest {
    pub company_info: CompanyInfo,
    pub financial_data: Vec<String>,
    pub analysis_type: String,
    pub recommendations: String,
    pub market_data: Vec<String>,
    pub portfolio_info: String,
    pub market_conditions: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenOutput {
    pub input: Value,
    pub output: String,
}

pub struct GenService {
    llms: Arc<dyn LlmFactory>,
}

impl GenService {
    pub fn new(llms: Arc<dyn LlmFactory>) -> Self {
        Self { llms }
    }

    pub async fn generate(&self, method: GenMethod, request: &GenRequest, llm_options: &LlmOptions) -> Result<GenOutput> {
        info!(?method, model = %llm_options.model, "financial generation");
        match method {
            GenMethod::GenerateFinancialReport => {
                self.generate_financial_report(
                    &request.company_info,
                    &request.financial_data,
                    &request.analysis_type,
                    &request.recommendations,
                    llm_options,
                )
                .await
            }
            GenMethod::GenerateInvestmentAnalysis => {
                self.generate_investment_analysis(&request.market_data, llm_options).await
            }
            GenMethod::GenerateRiskAssessment => {
                self.generate_risk_assessment(&request.portfolio_info, &request.market_conditions, llm_options)
                    .await
            }
        }
    }

    pub async fn generate_financial_report(
        &self,
        company_info: &CompanyInfo,
        financial_data: &[String],
        analysis_type: &str,
        recommendations: &str,
        llm_options: &LlmOptions,
    ) -> Result<GenOutput> {
        let llm = self.llms.client(llm_options)?;
        let prompt = format!(
            "Company Information:\n{}\n\nFinancial Data:\n{}\n\nAnalysis Type:\n{}\n\nRecommendations:\n{}",
            company_info,
            financial_data.join("\n"),
            analysis_type,
            recommendations
        );
        let output = llm.complete(REPORT_SYSTEM_PROMPT, &prompt).await?;

        Ok(GenOutput {
            input: serde_json::json!({
                "company_info": company_info,
                "financial_data": financial_data,
                "analysis_type": analysis_type,
                "recommendations": recommendations,
            }),
            output,
        })
    }

    pub async fn generate_investment_analysis(
        &self,
        market_data: &[String],
        llm_options: &LlmOptions,
    ) -> Result<GenOutput> {
        let llm = self.llms.client(llm_options)?;
        let prompt = format!("Market Data:\n{}", market_data.join("\n"));
        let output = llm.complete(INVESTMENT_SYSTEM_PROMPT, &prompt).await?;

        Ok(GenOutput {
            input: serde_json::json!({ "market_data": market_data }),
            output,
        })
    }

    pub async fn generate_risk_assessment(
        &self,
        portfolio_info: &str,
        market_conditions: &serde_json::Map<String, Value>,
        llm_options: &LlmOptions,
    ) -> Result<GenOutput> {
        let llm = self.llms.client(llm_options)?;
        let conditions = Value::Object(market_conditions.clone());
        let prompt = format!(
            "Portfolio Information: {}\nMarket Conditions: {}",
            portfolio_info, conditions
        );
        let output = llm.complete(RISK_SYSTEM_PROMPT, &prompt).await?;

        Ok(GenOutput {
            input: serde_json::json!({
                "portfolio_info": portfolio_info,
                "market_conditions": conditions,
            }),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoLlm;
    use crate::ServiceError;

    fn request() -> GenRequest {
        serde_json::from_value(serde_json::json!({
            "company_info": {"name": "Acme Corp", "sector": "Industrials"},
            "financial_data": ["Revenue: $10M", "Net income: $1M"],
            "analysis_type": "annual",
            "market_data": ["S&P 500 up 2%"],
            "portfolio_info": "60/40",
            "market_conditions": {"rates": "rising"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_financial_report() {
        let llm = Arc::new(EchoLlm::replying("Executive Summary ..."));
        let service = GenService::new(llm.clone());
        let output = service
            .generate(GenMethod::default(), &request(), &LlmOptions::default())
            .await
            .unwrap();

        assert_eq!(output.output, "Executive Summary ...");
        assert_eq!(output.input["company_info"]["name"], "Acme Corp");
        assert_eq!(output.input["financial_data"][1], "Net income: $1M");
        let prompt = llm.last_prompt();
        assert!(prompt.contains("Sector: Industrials"));
        assert!(prompt.contains("Revenue: $10M\nNet income: $1M"));
    }

    #[tokio::test]
    async fn test_investment_and_risk() {
        let llm = Arc::new(EchoLlm::replying("ok"));
        let service = GenService::new(llm.clone());

        let output = service
            .generate(GenMethod::GenerateInvestmentAnalysis, &request(), &LlmOptions::default())
            .await
            .unwrap();
        assert_eq!(output.input, serde_json::json!({"market_data": ["S&P 500 up 2%"]}));

        let output = service
            .generate(GenMethod::GenerateRiskAssessment, &request(), &LlmOptions::default())
            .await
            .unwrap();
        assert_eq!(output.input["market_conditions"]["rates"], "rising");
        assert!(llm.last_prompt().starts_with("Portfolio Information: 60/40"));
    }

    #[tokio::test]
    async fn test_unsupported_provider() {
        let service = GenService::new(Arc::new(EchoLlm::replying("ok")));
        let options = LlmOptions { provider: "palm".to_string(), ..LlmOptions::default() };
        let err = service.generate(GenMethod::default(), &request(), &options).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnsupportedProvider(_)));
    }
}
